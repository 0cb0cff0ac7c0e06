use std::path::Path;
use std::sync::Arc;

use tracing::info;
use wfr_core::{parse_query_str, DocumentFormat, ParseError};
use wfr_exec::{ReqwestHttpClient, Runner, TableRefresh};

use crate::cmd::config::runner_config;
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{CatalogArgs, EngineArgs, OutputArgs, RegistryArgs};

pub async fn run_cmd(
    path: &Path,
    output: OutputArgs,
    registry: RegistryArgs,
    catalog: CatalogArgs,
    engine: EngineArgs,
) -> i32 {
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let parsed = match parse_query_str(&content, DocumentFormat::Auto) {
        Ok(p) => p,
        Err(e) => {
            let message = match e {
                ParseError::Empty => "query document is empty".to_string(),
                ParseError::Json(e) => format!("JSON parse failed: {e}"),
                ParseError::Yaml(e) => format!("YAML parse failed: {e}"),
            };
            print_error(output.format, output.quiet, &message);
            return exit_codes::INVALID_REQUEST;
        }
    };

    let config = runner_config(&registry, &catalog, &engine);
    let runner = Runner::from_config(&config, Arc::new(ReqwestHttpClient::default()));
    let report = runner.refresh().await;
    for (name, table) in [("registry", &report.services), ("operation schema", &report.operations)] {
        if let TableRefresh::Kept { error } = table {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to load {name}: {error}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    }
    info!(
        services = runner.services().provider_count(),
        operations = runner.operations().len(),
        "tables loaded"
    );

    match runner.run(parsed.query).await {
        Ok(outcome) => {
            print_result(output.format, output.quiet, &outcome);
            if outcome.is_complete() {
                exit_codes::SUCCESS
            } else {
                exit_codes::RUN_INCOMPLETE
            }
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::INVALID_REQUEST
        }
    }
}
