use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a query document (JSON or YAML) against the registered providers.
    Run {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        registry: RegistryArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List the providers registered for each operation.
    Services {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// List the operations defined by the operation schema.
    Operations {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Load the registry and operation tables once and report the result.
    Refresh {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        registry: RegistryArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}
