//! Error taxonomy for the factotum engine.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the orchestration engine and its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Execution queue is closed")]
    QueueClosed,

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures of the classification backend.
///
/// These surface to the caller as a processing failure and are not retried
/// by the engine.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Classification backend error: {0}")]
    Backend(String),

    #[error("Classification request timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed classification response: {0}")]
    MalformedResponse(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// A task handler's reported failure.
///
/// Handlers never panic across the dispatch boundary; they return this and
/// the engine records it on the task.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TaskFailure {
    pub message: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TaskFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}
