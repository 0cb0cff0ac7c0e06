use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "wfr", version, about = "TRAPI workflow runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            path,
            output,
            registry,
            catalog,
            engine,
        } => cmd::run::run_cmd(&path, output, registry, catalog, engine).await,
        Command::Services { output, registry } => {
            cmd::services::services_cmd(output, registry).await
        }
        Command::Operations { output, catalog } => {
            cmd::operations::operations_cmd(output, catalog).await
        }
        Command::Refresh {
            output,
            registry,
            catalog,
        } => cmd::refresh::refresh_cmd(output, registry, catalog).await,
    }
}
