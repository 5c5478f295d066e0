//! Intent classifier adapters.
//!
//! Two backends implement the [`IntentClassifier`] port: a deterministic
//! keyword classifier (the default, no network) and an LLM-backed HTTP
//! adapter selected via `classifier.backend = "llm"`.
//!
//! [`IntentClassifier`]: crate::domain::ports::IntentClassifier

pub mod llm;
pub mod rules;

pub use llm::LlmClassifier;
pub use rules::RuleClassifier;
