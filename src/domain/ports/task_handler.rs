use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::TaskFailure;
use crate::domain::models::TaskType;

/// Everything a handler gets to see about the task it is running.
#[derive(Debug, Clone)]
pub struct TaskRunContext {
    /// The task being executed.
    pub task_id: Uuid,
    /// Its type (handlers serving several types can branch on this).
    pub task_type: TaskType,
    /// The intent's action phrase.
    pub action: String,
    /// The intent's extracted slots, opaque to the engine.
    pub intent_context: HashMap<String, Value>,
    /// Results of this task's completed dependencies, keyed by task id.
    pub upstream: HashMap<Uuid, Value>,
}

/// Port for executing one task type.
///
/// Contract: attempt the side effect, return success-with-result or
/// failure-with-message. Errors stay inside the `Result`; the engine
/// contains panics at the dispatch boundary but a handler should never
/// rely on that.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure>;
}
