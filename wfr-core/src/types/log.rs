use chrono::{DateTime, Utc};

use crate::types::{AnyValue, Extensions};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warning,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    fn severity(self) -> u8 {
        match self {
            LogLevel::Error => 3,
            LogLevel::Warning => 2,
            LogLevel::Info => 1,
            LogLevel::Debug => 0,
        }
    }

    /// Whether an entry at this level should be reported when `threshold` is requested.
    pub fn passes(self, threshold: LogLevel) -> bool {
        self.severity() >= threshold.severity()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A diagnostic entry returned to the caller alongside the final message.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            code: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach structured context (request/response summaries, error text).
    pub fn with(mut self, key: impl Into<String>, value: AnyValue) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}
