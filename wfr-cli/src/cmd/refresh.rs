use std::sync::Arc;

use wfr_exec::{CatalogStore, OperationCatalog, RegistryClient, ReqwestHttpClient, TableRefresh};

use crate::cmd::config::{catalog_config, registry_config};
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::{CatalogArgs, OutputArgs, RegistryArgs};

pub async fn refresh_cmd(output: OutputArgs, registry: RegistryArgs, catalog: CatalogArgs) -> i32 {
    let http = Arc::new(ReqwestHttpClient::default());
    let store = CatalogStore::new(
        RegistryClient::new(http.clone(), registry_config(&registry)),
        OperationCatalog::new(http, catalog_config(&catalog)),
    );
    let report = store.refresh().await;

    if output.format == OutputFormat::Text && !output.quiet {
        for (name, table) in [("services", &report.services), ("operations", &report.operations)] {
            match table {
                TableRefresh::Replaced { entries } => println!("{name}: loaded {entries}"),
                TableRefresh::Kept { error } => println!("{name}: failed: {error}"),
                TableRefresh::Static => println!("{name}: static"),
            }
        }
    } else {
        print_result(output.format, output.quiet, &report);
    }

    if report.services.is_replaced() && report.operations.is_replaced() {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUNTIME_ERROR
    }
}
