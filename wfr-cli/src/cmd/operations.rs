use std::sync::Arc;

use wfr_exec::{OperationCatalog, ReqwestHttpClient};

use crate::cmd::config::catalog_config;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{CatalogArgs, OutputArgs};

pub async fn operations_cmd(output: OutputArgs, catalog: CatalogArgs) -> i32 {
    let catalog = OperationCatalog::new(
        Arc::new(ReqwestHttpClient::default()),
        catalog_config(&catalog),
    );
    let table = match catalog.fetch().await {
        Ok(t) => t,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("operation schema fetch failed: {e}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        for kind in table.iter() {
            let marker = if kind.unique { " (unique)" } else { "" };
            println!("{}{marker}", kind.id);
        }
    } else {
        print_result(output.format, output.quiet, &table);
    }
    exit_codes::SUCCESS
}
