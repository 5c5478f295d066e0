//! Factotum - Conversational Work Orchestrator
//!
//! Factotum turns a free-form natural-language request into a supervised,
//! trackable unit of asynchronous work: classify intent, decide whether work
//! is required, decompose it into a dependency-ordered set of tasks, execute
//! them off the caller's path, and keep progress poll-able throughout.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models (intent, task, workflow, config),
//!   ports (classifier, task handler), and the error taxonomy
//! - **Service Layer** (`services`): the decision table, handler registry,
//!   and the orchestration engine with its worker pool
//! - **Infrastructure Layer** (`infrastructure`): classifier backends,
//!   task handler adapters, and configuration loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use factotum::{EngineConfig, OrchestrationEngine, RuleClassifier};
//! use factotum::infrastructure::handlers::default_registry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = OrchestrationEngine::new(
//!         Arc::new(RuleClassifier::new()),
//!         default_registry(&Default::default()),
//!         &EngineConfig::default(),
//!     );
//!     let processed = engine.process_message("Create a ticket for the login bug").await?;
//!     println!("{}", processed.response);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ClassificationError, EngineError, EngineResult, TaskFailure};
pub use domain::models::{
    Config, EngineConfig, Intent, IntentCategory, Task, TaskStatus, TaskType, Workflow,
    WorkflowProjection, WorkflowStatus, WorkflowSummary, WorkflowType,
};
pub use domain::ports::{IntentClassifier, TaskHandler, TaskRunContext};
pub use infrastructure::classifier::{LlmClassifier, RuleClassifier};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{HandlerRegistry, OrchestrationEngine, ProcessedMessage};
