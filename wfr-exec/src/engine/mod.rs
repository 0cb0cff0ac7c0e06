//! Runs a workflow step by step against the providers registered for each operation.

mod dispatch;
mod log;
mod normalize;
mod outcome;
mod select;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;
use wfr_core::{LogEntry, LogLevel, Merger, Message, Operation, Query, Response};

use crate::catalog::OperationTable;
use crate::config::EngineConfig;
use crate::http::HttpClient;
use crate::registry::Provider;
use crate::store::Snapshot;

pub use self::dispatch::{call_provider, summarize_payload, CallFailure, CallOutcome};
pub use self::log::LogCollector;
pub use self::normalize::{NormalizeError, Normalizer};
pub use self::outcome::{RunError, RunOutcome, RunStatus};
pub use self::select::{select_providers, ProviderFilter};

pub struct Engine {
    http: Arc<dyn HttpClient>,
    merger: Arc<dyn Merger>,
    normalizer: Option<Normalizer>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(http: Arc<dyn HttpClient>, merger: Arc<dyn Merger>, config: EngineConfig) -> Self {
        let normalizer = config
            .normalizer
            .clone()
            .map(|n| Normalizer::new(http.clone(), n, config.max_response_bytes));
        Self {
            http,
            merger,
            normalizer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `query` against one snapshot of the registry and operation tables.
    ///
    /// Malformed requests are rejected up front. Once dispatch starts the run always
    /// produces an outcome: provider failures are logged, and a step without eligible
    /// providers ends the run with [`RunStatus::Incomplete`].
    pub async fn run(&self, snapshot: &Snapshot, query: Query) -> Result<RunOutcome, RunError> {
        let Query {
            message,
            workflow,
            log_level,
            ..
        } = query;
        let workflow = workflow.unwrap_or_default();
        validate_workflow(&workflow, &snapshot.operations)?;

        let run_id = Uuid::new_v4();
        let span = info_span!("workflow_run", %run_id, steps = workflow.len());
        let outcome = self
            .execute(run_id, snapshot, message, workflow, log_level.unwrap_or_default())
            .instrument(span)
            .await;
        Ok(outcome)
    }

    async fn execute(
        &self,
        run_id: Uuid,
        snapshot: &Snapshot,
        mut message: Message,
        workflow: Vec<Operation>,
        log_level: LogLevel,
    ) -> RunOutcome {
        let mut log = LogCollector::new(run_id);
        let mut completed = Vec::with_capacity(workflow.len());
        let mut status = RunStatus::Complete;

        for (step, op) in workflow.into_iter().enumerate() {
            let candidates = select_providers(&snapshot.services, &op);
            if candidates.is_empty() {
                log.push(
                    LogEntry::new(
                        LogLevel::Error,
                        format!("No providers available for operation '{}'", op.id),
                    )
                    .with_code("NoProviders")
                    .with("step", json!(step)),
                );
                status = RunStatus::Incomplete;
                break;
            }

            let timeout = op.timeout().unwrap_or(self.config.default_timeout);
            let unique = snapshot.operations.is_unique(&op.id);
            log.info(format!(
                "Step {step}: '{}' with {} candidate provider(s)",
                op.id,
                candidates.len()
            ));

            let span = info_span!("workflow_step", step, operation = %op.id, unique);
            let responses = self
                .run_step(&message, &op, &candidates, timeout, unique, &mut log)
                .instrument(span)
                .await;

            if responses.is_empty() {
                log.warning(format!(
                    "Step {step}: no provider answered '{}'; message left unchanged",
                    op.id
                ));
            } else {
                message = self.merge_responses(&message, responses);
                log.info(format!(
                    "Step {step}: merged message has {} results",
                    message.result_count()
                ));
            }
            completed.push(resolve_runner_parameters(op, timeout));
        }

        let complete = status == RunStatus::Complete;
        info!(%run_id, steps = completed.len(), complete, "workflow run finished");
        RunOutcome {
            run_id,
            message,
            workflow: completed,
            logs: log.into_filtered(log_level),
            status,
        }
    }

    /// Query candidates in order. A non-unique operation stops at the first success.
    async fn run_step(
        &self,
        message: &Message,
        op: &Operation,
        candidates: &[Arc<Provider>],
        timeout: Duration,
        unique: bool,
        log: &mut LogCollector,
    ) -> Vec<Message> {
        let payload = json!({ "message": message, "workflow": [op] });
        let summary = summarize_payload(&payload);
        let mut collected = Vec::new();

        for provider in candidates {
            let url = provider.query_url();
            debug!(provider = %provider.infores, %url, "dispatching");
            let outcome = call_provider(
                self.http.as_ref(),
                url.clone(),
                &payload,
                timeout,
                self.config.max_response_bytes,
            )
            .await;

            match outcome {
                CallOutcome::Success(response) => {
                    let response = self.normalize(*response, &provider.infores, log).await;
                    log.debug(format!(
                        "{} returned {} results",
                        provider.infores,
                        response.result_count()
                    ));
                    collected.push(response);
                }
                CallOutcome::Failed(failure) => {
                    log.push(failure.log_entry(&provider.infores, &url, &summary));
                }
            }

            if !unique && !collected.is_empty() {
                break;
            }
        }
        collected
    }

    async fn normalize(
        &self,
        response: Response,
        provider: &str,
        log: &mut LogCollector,
    ) -> Message {
        let Some(normalizer) = &self.normalizer else {
            return response.message;
        };
        match normalizer.normalize(&response.message).await {
            Ok(normalized) => normalized,
            Err(e) => {
                log.push(
                    LogEntry::new(
                        LogLevel::Warning,
                        format!("Failed to normalize response from {provider}"),
                    )
                    .with_code("NormalizationFailed")
                    .with("error", json!(e.to_string())),
                );
                response.message
            }
        }
    }

    /// Fold responses into a fresh message that keeps only the current query graph.
    fn merge_responses(&self, current: &Message, responses: Vec<Message>) -> Message {
        let mut merged = Message::scoped_to(current.query_graph.clone());
        for mut partial in responses {
            partial.query_graph = current.query_graph.clone();
            merged = self.merger.merge(merged, partial);
        }
        merged
    }
}

fn validate_workflow(workflow: &[Operation], operations: &OperationTable) -> Result<(), RunError> {
    for (step, op) in workflow.iter().enumerate() {
        if !operations.contains(&op.id) {
            return Err(RunError::UnknownOperation {
                step,
                operation: op.id.clone(),
            });
        }
        let allow = op.allowlist().is_some_and(|l| !l.is_empty());
        let deny = op.denylist().is_some_and(|l| !l.is_empty());
        if allow && deny {
            return Err(RunError::ConflictingProviderFilters {
                step,
                operation: op.id.clone(),
            });
        }
    }
    Ok(())
}

/// The step as it ran: runner parameters are materialized and carry the effective timeout.
fn resolve_runner_parameters(mut op: Operation, timeout: Duration) -> Operation {
    let explicit = op.timeout().is_some();
    let params = op.runner_parameters.get_or_insert_with(Default::default);
    if !explicit {
        params.timeout = Some(timeout.as_secs_f64());
    }
    op
}
