use crate::types::{AnyValue, Extensions, LogLevel, Message, Operation};

/// A request to run a workflow: the starting message and the steps to apply to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Query {
    pub message: Message,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Vec<Operation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Query {
    pub fn new(message: Message, workflow: Vec<Operation>) -> Self {
        Self {
            message,
            workflow: Some(workflow),
            log_level: None,
            extensions: Extensions::new(),
        }
    }
}

/// What a provider returns for a single-step query.
///
/// Deserializing into this type is the structural check a provider response must pass.
/// Provider log entries are kept loosely typed; their timestamps and levels are not
/// consistently formatted across providers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    pub message: Message,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Vec<Operation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
