//! Dispatch table from task type to handler.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::models::TaskType;
use crate::domain::ports::TaskHandler;

/// Maps each [`TaskType`] to the handler that executes it.
///
/// A missing binding is a runtime condition, not a panic: the engine fails
/// the task with a diagnostic message.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TaskType, Arc<dyn TaskHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a task type, replacing any previous binding.
    pub fn register(&mut self, task_type: TaskType, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(task_type, handler);
    }

    /// Look up the handler for a task type.
    pub fn get(&self, task_type: TaskType) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(&task_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&'static str> = self.handlers.keys().map(TaskType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TaskFailure;
    use crate::domain::ports::TaskRunContext;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NullHandler;

    #[async_trait]
    impl TaskHandler for NullHandler {
        async fn run(&self, _ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
            Ok(json!(null))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register(TaskType::AnalyzeRequest, Arc::new(NullHandler));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(TaskType::AnalyzeRequest).is_some());
        assert!(registry.get(TaskType::JiraCreateTicket).is_none());
    }

    #[test]
    fn test_rebind_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register(TaskType::CreateSummary, Arc::new(NullHandler));
        registry.register(TaskType::CreateSummary, Arc::new(NullHandler));
        assert_eq!(registry.len(), 1);
    }
}
