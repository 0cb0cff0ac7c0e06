use std::time::Duration;

use serde_json::{json, Value as JsonValue};
use url::Url;
use wfr_core::{drop_nulls, LogEntry, LogLevel, Response};

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

const BODY_EXCERPT_CHARS: usize = 500;
const MAX_LOGGED_CURIES: usize = 10;

/// The result of one provider call. Failures are values; they never abort a step.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Success(Box<Response>),
    Failed(CallFailure),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CallFailure {
    #[error("no response within {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {status}")]
    Status { status: u16, body: String },
    #[error("invalid JSON: {error}")]
    InvalidJson { error: String, body: String },
    #[error("response does not match the message schema: {0}")]
    NonCompliant(String),
}

impl CallFailure {
    pub fn code(&self) -> &'static str {
        match self {
            CallFailure::Timeout { .. } => "ProviderTimeout",
            CallFailure::Transport(_) => "ProviderUnreachable",
            CallFailure::Status { .. } => "ProviderHttpError",
            CallFailure::InvalidJson { .. } => "ProviderInvalidJson",
            CallFailure::NonCompliant(_) => "ProviderNonCompliant",
        }
    }

    /// The diagnostic line reported to the caller.
    pub fn describe(&self, provider: &str) -> String {
        match self {
            CallFailure::Timeout { timeout } => {
                format!(
                    "{provider} took >{} seconds to respond",
                    timeout.as_secs_f64()
                )
            }
            CallFailure::Transport(_) => format!("Error contacting {provider}"),
            CallFailure::Status { .. } => format!("Error response from {provider}"),
            CallFailure::InvalidJson { .. } => format!("Received bad JSON data from {provider}"),
            CallFailure::NonCompliant(_) => {
                format!("Received non-TRAPI compliant response from {provider}")
            }
        }
    }

    fn response_summary(&self) -> JsonValue {
        match self {
            CallFailure::Timeout { .. } | CallFailure::Transport(_) => JsonValue::Null,
            CallFailure::Status { status, body } => json!({"status": status, "data": body}),
            CallFailure::InvalidJson { body, .. } => json!({"status": 200, "data": body}),
            CallFailure::NonCompliant(_) => json!({"status": 200}),
        }
    }

    /// A WARNING entry carrying the target, the request summary, and what came back.
    pub fn log_entry(&self, provider: &str, url: &Url, request_summary: &JsonValue) -> LogEntry {
        let mut entry = LogEntry::new(LogLevel::Warning, self.describe(provider))
            .with_code(self.code())
            .with("error", json!(self.to_string()))
            .with(
                "request",
                json!({"url": url.as_str(), "data": request_summary}),
            );
        let response = self.response_summary();
        if !response.is_null() {
            entry = entry.with("response", response);
        }
        entry
    }
}

/// POST a single-step query to a provider and classify what comes back.
pub async fn call_provider(
    http: &dyn HttpClient,
    url: Url,
    payload: &JsonValue,
    timeout: Duration,
    max_response_bytes: usize,
) -> CallOutcome {
    let resp = match http
        .send(HttpRequest::post_json(url, payload), timeout, max_response_bytes)
        .await
    {
        Ok(resp) => resp,
        Err(HttpError::Timeout) => return CallOutcome::Failed(CallFailure::Timeout { timeout }),
        Err(e) => return CallOutcome::Failed(CallFailure::Transport(e.to_string())),
    };
    classify_response(&resp)
}

fn classify_response(resp: &HttpResponse) -> CallOutcome {
    if !resp.is_success() {
        return CallOutcome::Failed(CallFailure::Status {
            status: resp.status,
            body: resp.body_excerpt(BODY_EXCERPT_CHARS),
        });
    }
    let value: JsonValue = match serde_json::from_slice(&resp.body) {
        Ok(v) => v,
        Err(e) => {
            return CallOutcome::Failed(CallFailure::InvalidJson {
                error: e.to_string(),
                body: resp.body_excerpt(BODY_EXCERPT_CHARS),
            })
        }
    };
    match serde_json::from_value::<Response>(drop_nulls(value)) {
        Ok(response) => CallOutcome::Success(Box::new(response)),
        Err(e) => CallOutcome::Failed(CallFailure::NonCompliant(e.to_string())),
    }
}

/// A copy of an outgoing payload fit for logs: long query-node id lists are replaced by
/// their length.
pub fn summarize_payload(payload: &JsonValue) -> JsonValue {
    let mut summary = payload.clone();
    let Some(nodes) = summary
        .pointer_mut("/message/query_graph/nodes")
        .and_then(JsonValue::as_object_mut)
    else {
        return summary;
    };
    for node in nodes.values_mut() {
        let count = node
            .get("ids")
            .and_then(JsonValue::as_array)
            .map_or(0, Vec::len);
        if count > MAX_LOGGED_CURIES {
            node["ids"] = json!(format!("**{count} CURIEs not shown for brevity**"));
        }
    }
    summary
}
