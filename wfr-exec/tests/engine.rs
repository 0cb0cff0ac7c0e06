use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use wfr_core::{KnowledgeGraphMerger, LogLevel, Message, Operation, Query, RunnerParameters};
use wfr_exec::{
    BaseUrl, Engine, EngineConfig, HttpClient, HttpError, HttpRequest, HttpResponse,
    NormalizerConfig, OperationKind, OperationTable, Provider, RunError, RunStatus, ServiceTable,
    Snapshot,
};

enum Route {
    Respond(u16, String),
    Fail(HttpError),
}

#[derive(Debug, Clone)]
struct Call {
    url: String,
    body: Value,
    timeout: Duration,
}

/// Answers by exact URL and records every request it sees.
#[derive(Default)]
struct MockHttpClient {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<Call>>,
}

impl MockHttpClient {
    fn respond(mut self, url: &str, status: u16, body: Value) -> Self {
        self.routes
            .insert(url.to_string(), Route::Respond(status, body.to_string()));
        self
    }

    fn respond_raw(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(url.to_string(), Route::Respond(status, body.to_string()));
        self
    }

    fn fail(mut self, url: &str, error: HttpError) -> Self {
        self.routes.insert(url.to_string(), Route::Fail(error));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn called_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        req: HttpRequest,
        timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponse, HttpError> {
        let url = req.url.to_string();
        self.calls.lock().unwrap().push(Call {
            url: url.clone(),
            body: serde_json::from_slice(&req.body).unwrap_or(Value::Null),
            timeout,
        });
        match self.routes.get(&url) {
            Some(Route::Respond(status, body)) => Ok(HttpResponse {
                status: *status,
                headers: BTreeMap::new(),
                body: body.clone().into_bytes(),
            }),
            Some(Route::Fail(e)) => Err(e.clone()),
            None => Err(HttpError::Network(format!("no route for {url}"))),
        }
    }
}

const A: &str = "https://a.example.org/query";
const B: &str = "https://b.example.org/query";
const NORMALIZER: &str = "https://normalizer.example.org/query";

fn provider(name: &str, operations: &[&str]) -> Provider {
    Provider {
        infores: format!("infores:{name}"),
        title: name.to_uppercase(),
        base_url: BaseUrl::parse(&format!("https://{name}.example.org")).unwrap(),
        maturity: "production".to_string(),
        version: "1.4.0".to_string(),
        operations: operations.iter().map(|o| (*o).into()).collect::<BTreeSet<_>>(),
    }
}

fn kind(id: &str, unique: bool) -> OperationKind {
    OperationKind {
        id: id.into(),
        title: id.to_string(),
        description: None,
        properties: json!({}),
        additional_properties: true,
        unique,
    }
}

fn snapshot() -> Snapshot {
    Snapshot::new(
        ServiceTable::from_providers([
            provider("a", &["lookup", "score"]),
            provider("b", &["lookup", "score"]),
        ]),
        OperationTable::from_kinds([
            kind("lookup", true),
            kind("score", false),
            kind("fill", false),
        ]),
    )
}

fn query_graph() -> Value {
    json!({
        "nodes": {"n0": {"ids": ["MONDO:0005148"]}, "n1": {"categories": ["biolink:ChemicalEntity"]}},
        "edges": {"e0": {"subject": "n1", "object": "n0", "predicates": ["biolink:treats"]}}
    })
}

fn input_message() -> Message {
    serde_json::from_value(json!({ "query_graph": query_graph() })).unwrap()
}

fn answer(chemical: &str, source: &str) -> Value {
    json!({
        "message": {
            "query_graph": query_graph(),
            "knowledge_graph": {
                "nodes": {
                    "MONDO:0005148": {"categories": ["biolink:Disease"]},
                    chemical: {"categories": ["biolink:SmallMolecule"]}
                },
                "edges": {
                    format!("{source}-e0"): {
                        "subject": chemical,
                        "predicate": "biolink:treats",
                        "object": "MONDO:0005148",
                        "sources": [{"resource_id": source}]
                    }
                }
            },
            "results": [{
                "node_bindings": {"n0": [{"id": "MONDO:0005148"}], "n1": [{"id": chemical}]},
                "analyses": [{"resource_id": source, "edge_bindings": {"e0": [{"id": format!("{source}-e0")}]}}]
            }]
        }
    })
}

fn engine(http: &Arc<MockHttpClient>) -> Engine {
    Engine::new(
        http.clone(),
        Arc::new(KnowledgeGraphMerger),
        EngineConfig::default(),
    )
}

fn step(id: &str) -> Operation {
    Operation::new(id)
}

fn step_with(id: &str, params: RunnerParameters) -> Operation {
    Operation::new(id).with_runner_parameters(params)
}

fn kg_nodes(message: &Message) -> Vec<String> {
    message
        .knowledge_graph
        .as_ref()
        .map(|kg| kg.nodes.keys().cloned().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn non_unique_operation_stops_after_first_success() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("score")]))
        .await
        .unwrap();

    assert_eq!(http.called_urls(), [A]);
    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(kg_nodes(&outcome.message), ["CHEBI:1", "MONDO:0005148"]);
    assert_eq!(outcome.message.result_count(), 1);
    assert_eq!(outcome.workflow.len(), 1);
    assert_eq!(
        outcome.workflow[0]
            .runner_parameters
            .as_ref()
            .and_then(|p| p.timeout),
        Some(30.0)
    );
}

#[tokio::test]
async fn non_unique_operation_falls_back_past_failures() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond_raw(A, 503, "maintenance")
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("score")]))
        .await
        .unwrap();

    assert_eq!(http.called_urls(), [A, B]);
    assert_eq!(kg_nodes(&outcome.message), ["CHEBI:2", "MONDO:0005148"]);
    let failure = outcome
        .logs
        .iter()
        .find(|e| e.message == "Error response from infores:a")
        .expect("failure logged");
    assert_eq!(failure.level, LogLevel::Warning);
    assert_eq!(failure.extensions["response"]["status"], 503);
    assert_eq!(failure.extensions["request"]["url"], A);
}

#[tokio::test]
async fn unique_operation_queries_every_provider_and_merges() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("lookup")]))
        .await
        .unwrap();

    assert_eq!(http.called_urls(), [A, B]);
    assert_eq!(
        kg_nodes(&outcome.message),
        ["CHEBI:1", "CHEBI:2", "MONDO:0005148"]
    );
    assert_eq!(outcome.message.result_count(), 2);
    assert_eq!(outcome.message.query_graph, input_message().query_graph);
}

#[tokio::test]
async fn provider_receives_message_and_single_step_workflow() {
    let http = Arc::new(MockHttpClient::default().respond(A, 200, answer("CHEBI:1", "infores:a")));
    let op = step_with(
        "score",
        RunnerParameters {
            timeout: Some(2.5),
            ..Default::default()
        },
    );
    engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();

    let calls = http.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].timeout, Duration::from_millis(2500));
    assert_eq!(calls[0].body["message"]["query_graph"], query_graph());
    assert_eq!(calls[0].body["workflow"][0]["id"], "score");
    assert_eq!(calls[0].body["workflow"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_step_timeout_falls_back_to_default() {
    let http = Arc::new(MockHttpClient::default().respond(A, 200, answer("CHEBI:1", "infores:a")));
    let op: Operation = serde_json::from_value(json!({
        "id": "score",
        "runner_parameters": {"timeout": 1e20}
    }))
    .unwrap();
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(http.calls()[0].timeout, EngineConfig::default().default_timeout);
    assert_eq!(
        outcome.workflow[0]
            .runner_parameters
            .as_ref()
            .and_then(|p| p.timeout),
        Some(30.0)
    );
}

#[tokio::test]
async fn step_without_providers_ends_run_incomplete() {
    let http = Arc::new(MockHttpClient::default());
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("fill")]))
        .await
        .unwrap();

    assert!(http.calls().is_empty());
    assert_eq!(outcome.status, RunStatus::Incomplete);
    assert!(outcome.workflow.is_empty());
    assert_eq!(outcome.message, input_message());
    let entry = outcome
        .logs
        .iter()
        .find(|e| e.level == LogLevel::Error)
        .expect("error logged");
    assert_eq!(entry.code.as_deref(), Some("NoProviders"));
}

#[tokio::test]
async fn earlier_steps_survive_an_aborted_run() {
    let http = Arc::new(MockHttpClient::default().respond(A, 200, answer("CHEBI:1", "infores:a")));
    let outcome = engine(&http)
        .run(
            &snapshot(),
            Query::new(input_message(), vec![step("score"), step("fill"), step("score")]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Incomplete);
    assert_eq!(outcome.workflow.len(), 1);
    assert_eq!(outcome.workflow[0].id.as_str(), "score");
    assert_eq!(kg_nodes(&outcome.message), ["CHEBI:1", "MONDO:0005148"]);
    assert_eq!(http.calls().len(), 1);
}

#[tokio::test]
async fn all_providers_timing_out_leaves_message_unchanged() {
    let http = Arc::new(
        MockHttpClient::default()
            .fail(A, HttpError::Timeout)
            .fail(B, HttpError::Timeout),
    );
    let op = step_with(
        "lookup",
        RunnerParameters {
            timeout: Some(5.0),
            ..Default::default()
        },
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.message, input_message());
    assert_eq!(outcome.workflow.len(), 1);
    let timeouts: Vec<&str> = outcome
        .logs
        .iter()
        .filter(|e| e.code.as_deref() == Some("ProviderTimeout"))
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        timeouts,
        [
            "infores:a took >5 seconds to respond",
            "infores:b took >5 seconds to respond"
        ]
    );
}

#[tokio::test]
async fn allowlist_restricts_candidates() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let op = step_with(
        "lookup",
        RunnerParameters {
            allowlist: Some(vec!["infores:b".into()]),
            ..Default::default()
        },
    );
    engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();
    assert_eq!(http.called_urls(), [B]);
}

#[tokio::test]
async fn denylist_excludes_candidates() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let op = step_with(
        "lookup",
        RunnerParameters {
            denylist: Some(vec!["infores:a".into()]),
            ..Default::default()
        },
    );
    engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();
    assert_eq!(http.called_urls(), [B]);
}

#[tokio::test]
async fn allowlist_matching_nothing_aborts() {
    let http = Arc::new(MockHttpClient::default());
    let op = step_with(
        "lookup",
        RunnerParameters {
            allowlist: Some(vec!["infores:nobody".into()]),
            ..Default::default()
        },
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap();
    assert_eq!(outcome.status, RunStatus::Incomplete);
    assert!(http.calls().is_empty());
}

#[tokio::test]
async fn unknown_operation_is_rejected_before_dispatch() {
    let http = Arc::new(MockHttpClient::default().respond(A, 200, answer("CHEBI:1", "infores:a")));
    let err = engine(&http)
        .run(
            &snapshot(),
            Query::new(input_message(), vec![step("score"), step("bogus")]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RunError::UnknownOperation {
            step: 1,
            operation: "bogus".into()
        }
    );
    assert!(http.calls().is_empty());
}

#[tokio::test]
async fn allowlist_and_denylist_together_are_rejected() {
    let http = Arc::new(MockHttpClient::default());
    let op = step_with(
        "lookup",
        RunnerParameters {
            allowlist: Some(vec!["infores:a".into()]),
            denylist: Some(vec!["infores:b".into()]),
            ..Default::default()
        },
    );
    let err = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![op]))
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::ConflictingProviderFilters { step: 0, .. }));
}

#[tokio::test]
async fn bad_json_and_non_compliant_responses_are_skipped() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond_raw(A, 200, "<html>oops</html>")
            .respond(B, 200, json!({"results": []})),
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("lookup")]))
        .await
        .unwrap();

    assert_eq!(outcome.message, input_message());
    let messages: Vec<&str> = outcome.logs.iter().map(|e| e.message.as_str()).collect();
    assert!(messages.contains(&"Received bad JSON data from infores:a"));
    assert!(messages.contains(&"Received non-TRAPI compliant response from infores:b"));
}

#[tokio::test]
async fn unreachable_provider_is_logged_and_skipped() {
    let http = Arc::new(
        MockHttpClient::default()
            .fail(A, HttpError::Network("connection refused".into()))
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let outcome = engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("score")]))
        .await
        .unwrap();
    assert!(outcome
        .logs
        .iter()
        .any(|e| e.message == "Error contacting infores:a"));
    assert_eq!(outcome.message.result_count(), 1);
}

#[tokio::test]
async fn log_level_filters_returned_entries() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond_raw(A, 500, "boom")
            .respond(B, 200, answer("CHEBI:2", "infores:b")),
    );
    let mut query = Query::new(input_message(), vec![step("score")]);
    query.log_level = Some(LogLevel::Warning);
    let outcome = engine(&http).run(&snapshot(), query).await.unwrap();

    assert!(!outcome.logs.is_empty());
    assert!(outcome
        .logs
        .iter()
        .all(|e| matches!(e.level, LogLevel::Warning | LogLevel::Error)));
}

#[tokio::test]
async fn missing_workflow_runs_nothing() {
    let http = Arc::new(MockHttpClient::default());
    let query: Query = serde_json::from_value(json!({"message": {"query_graph": query_graph()}})).unwrap();
    let outcome = engine(&http).run(&snapshot(), query).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Complete);
    assert!(outcome.workflow.is_empty());
    assert_eq!(outcome.message, input_message());
}

fn normalizing_engine(http: &Arc<MockHttpClient>) -> Engine {
    Engine::new(
        http.clone(),
        Arc::new(KnowledgeGraphMerger),
        EngineConfig {
            normalizer: Some(NormalizerConfig {
                url: url::Url::parse(NORMALIZER).unwrap(),
                timeout: Duration::from_secs(3),
            }),
            ..EngineConfig::default()
        },
    )
}

#[tokio::test]
async fn normalized_message_replaces_provider_message() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond(NORMALIZER, 200, answer("CHEBI:9", "infores:a")),
    );
    let outcome = normalizing_engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("score")]))
        .await
        .unwrap();

    assert_eq!(http.called_urls(), [A, NORMALIZER]);
    assert_eq!(kg_nodes(&outcome.message), ["CHEBI:9", "MONDO:0005148"]);
    let sent = &http.calls()[1];
    assert_eq!(sent.timeout, Duration::from_secs(3));
    assert!(sent.body["message"]["knowledge_graph"]["nodes"]["CHEBI:1"].is_object());
}

#[tokio::test]
async fn normalizer_failure_keeps_provider_message() {
    let http = Arc::new(
        MockHttpClient::default()
            .respond(A, 200, answer("CHEBI:1", "infores:a"))
            .respond_raw(NORMALIZER, 502, "bad gateway"),
    );
    let outcome = normalizing_engine(&http)
        .run(&snapshot(), Query::new(input_message(), vec![step("score")]))
        .await
        .unwrap();

    assert_eq!(kg_nodes(&outcome.message), ["CHEBI:1", "MONDO:0005148"]);
    let warning = outcome
        .logs
        .iter()
        .find(|e| e.code.as_deref() == Some("NormalizationFailed"))
        .expect("normalization failure logged");
    assert_eq!(warning.level, LogLevel::Warning);
}

#[tokio::test]
async fn later_steps_see_merged_message() {
    let http = Arc::new(MockHttpClient::default().respond(A, 200, answer("CHEBI:1", "infores:a")));
    engine(&http)
        .run(
            &snapshot(),
            Query::new(input_message(), vec![step("score"), step("score")]),
        )
        .await
        .unwrap();

    let calls = http.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].body["message"].get("knowledge_graph").is_none());
    assert!(calls[1].body["message"]["knowledge_graph"]["nodes"]["CHEBI:1"].is_object());
}
