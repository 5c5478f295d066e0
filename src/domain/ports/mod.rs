//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that infrastructure
//! adapters implement: the intent classifier and the per-task-type handlers.

pub mod classifier;
pub mod task_handler;

pub use classifier::IntentClassifier;
pub use task_handler::{TaskHandler, TaskRunContext};
