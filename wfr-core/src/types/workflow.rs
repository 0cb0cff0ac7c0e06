use std::fmt;
use std::time::Duration;

use crate::types::{AnyValue, Extensions};

/// Canonical id of an operation kind (e.g. `lookup`, `filter_results_top_n`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OperationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single workflow step.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Operation {
    pub id: OperationId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_parameters: Option<RunnerParameters>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Operation {
    pub fn new(id: impl Into<OperationId>) -> Self {
        Self {
            id: id.into(),
            parameters: None,
            runner_parameters: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_runner_parameters(mut self, params: RunnerParameters) -> Self {
        self.runner_parameters = Some(params);
        self
    }

    pub fn allowlist(&self) -> Option<&[String]> {
        self.runner_parameters
            .as_ref()
            .and_then(|p| p.allowlist.as_deref())
    }

    pub fn denylist(&self) -> Option<&[String]> {
        self.runner_parameters
            .as_ref()
            .and_then(|p| p.denylist.as_deref())
    }

    /// Per-call timeout for this step, if the caller set one.
    pub fn timeout(&self) -> Option<Duration> {
        self.runner_parameters
            .as_ref()
            .and_then(|p| p.timeout)
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Hints to the runner about how a step should be dispatched.
///
/// `timeout` is in seconds. `allowlist` and `denylist` hold provider infores ids and are
/// mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunnerParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denylist: Option<Vec<String>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
