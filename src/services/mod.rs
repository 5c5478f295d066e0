pub mod decision_table;
pub mod engine;
pub mod handler_registry;
pub mod responder;

pub use engine::{OrchestrationEngine, ProcessedMessage};
pub use handler_registry::HandlerRegistry;
