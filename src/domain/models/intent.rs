//! Intent domain model.
//!
//! An intent is the immutable classification of one inbound message:
//! which kind of request it is, the action phrase naming it, and the
//! slots the classifier extracted along the way.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Category of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Do something with a side effect (create a ticket, file an issue).
    Execution,
    /// Answer a question about existing data.
    Analysis,
    /// Produce a new artifact (document, report, summary).
    Synthesis,
    /// Think through direction, priorities, plans.
    Strategy,
    /// Capture a pattern or feedback for later.
    Learning,
}

impl IntentCategory {
    /// All categories, in decision-table order.
    pub const ALL: [Self; 5] = [
        Self::Execution,
        Self::Analysis,
        Self::Synthesis,
        Self::Strategy,
        Self::Learning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Analysis => "analysis",
            Self::Synthesis => "synthesis",
            Self::Strategy => "strategy",
            Self::Learning => "learning",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "execution" => Some(Self::Execution),
            "analysis" => Some(Self::Analysis),
            "synthesis" => Some(Self::Synthesis),
            "strategy" => Some(Self::Strategy),
            "learning" => Some(Self::Learning),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable classification result for one inbound message.
///
/// Created once by the classifier, then only read. The `context` map is
/// opaque to the engine and passed through to task handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Which kind of request this is.
    pub category: IntentCategory,
    /// Short verb phrase naming what the user wants (e.g. "create ticket").
    pub action: String,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Free-form slots extracted from the message.
    #[serde(default)]
    pub context: HashMap<String, Value>,
}

impl Intent {
    /// Create an intent with an empty context. Confidence is clamped to `[0, 1]`.
    pub fn new(category: IntentCategory, action: impl Into<String>, confidence: f64) -> Self {
        Self {
            category,
            action: action.into(),
            confidence: confidence.clamp(0.0, 1.0),
            context: HashMap::new(),
        }
    }

    /// Add a context slot.
    pub fn with_context_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Whether the classifier marked this result as degraded
    /// (e.g. the backend answered with an unknown category).
    pub fn is_degraded(&self) -> bool {
        self.context
            .get("degraded")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
