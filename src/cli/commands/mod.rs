//! CLI command implementations.

pub mod classify;
pub mod process;
pub mod templates;

use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::Config;
use crate::domain::ports::IntentClassifier;
use crate::infrastructure::classifier::{LlmClassifier, RuleClassifier};

/// Build the classifier backend the config selects.
pub(crate) fn build_classifier(config: &Config) -> Result<Arc<dyn IntentClassifier>> {
    match config.classifier.backend.as_str() {
        "llm" => Ok(Arc::new(LlmClassifier::from_config(&config.classifier)?)),
        _ => Ok(Arc::new(RuleClassifier::new())),
    }
}
