use std::sync::Arc;

use serde::Serialize;
use wfr_exec::{RegistryClient, ReqwestHttpClient};

use crate::cmd::config::registry_config;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, RegistryArgs};

#[derive(Serialize)]
struct ServiceRow<'a> {
    infores: &'a str,
    title: &'a str,
    url: String,
    version: &'a str,
}

pub async fn services_cmd(output: OutputArgs, registry: RegistryArgs) -> i32 {
    let client = RegistryClient::new(
        Arc::new(ReqwestHttpClient::default()),
        registry_config(&registry),
    );
    let table = match client.fetch().await {
        Ok(t) => t,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("registry fetch failed: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        for (operation, providers) in table.iter() {
            println!("{operation}");
            for p in providers {
                println!("  {}  {}  ({})", p.infores, p.base_url, p.title);
            }
        }
        return exit_codes::SUCCESS;
    }

    let rows: std::collections::BTreeMap<&str, Vec<ServiceRow<'_>>> = table
        .iter()
        .map(|(operation, providers)| {
            let rows = providers
                .iter()
                .map(|p| ServiceRow {
                    infores: &p.infores,
                    title: &p.title,
                    url: p.base_url.to_string(),
                    version: &p.version,
                })
                .collect();
            (operation.as_str(), rows)
        })
        .collect();
    print_result(output.format, output.quiet, &rows);
    exit_codes::SUCCESS
}
