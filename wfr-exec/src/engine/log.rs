use uuid::Uuid;
use wfr_core::{LogEntry, LogLevel};

/// The diagnostic log of one run. Every entry is also forwarded to `tracing`.
#[derive(Debug)]
pub struct LogCollector {
    run_id: Uuid,
    entries: Vec<LogEntry>,
}

impl LogCollector {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        let run_id = self.run_id;
        let code = entry.code.as_deref().unwrap_or_default();
        match entry.level {
            LogLevel::Error => tracing::error!(%run_id, code, "{}", entry.message),
            LogLevel::Warning => tracing::warn!(%run_id, code, "{}", entry.message),
            LogLevel::Info => tracing::info!(%run_id, code, "{}", entry.message),
            LogLevel::Debug => tracing::debug!(%run_id, code, "{}", entry.message),
        }
        self.entries.push(entry);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Error, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Warning, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Info, message));
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Debug, message));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries at or above `threshold`, in the order they were recorded.
    pub fn into_filtered(self, threshold: LogLevel) -> Vec<LogEntry> {
        self.entries
            .into_iter()
            .filter(|e| e.level.passes(threshold))
            .collect()
    }
}
