use uuid::Uuid;
use wfr_core::{LogEntry, Message, Operation, OperationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum RunStatus {
    /// Every step ran, whether or not any provider answered.
    Complete,
    /// A step had no eligible provider and the run stopped there.
    Incomplete,
}

/// What a workflow run produced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunOutcome {
    #[serde(skip)]
    pub run_id: Uuid,
    pub message: Message,
    /// Completed steps with their resolved runner parameters.
    pub workflow: Vec<Operation>,
    pub logs: Vec<LogEntry>,
    pub status: RunStatus,
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}

/// Request-level rejections. These are raised before any provider is contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("workflow step {step} uses unknown operation '{operation}'")]
    UnknownOperation { step: usize, operation: OperationId },
    #[error("workflow step {step} ('{operation}') sets both allowlist and denylist")]
    ConflictingProviderFilters { step: usize, operation: OperationId },
}
