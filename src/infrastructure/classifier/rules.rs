//! Deterministic keyword classifier.
//!
//! Scores each category by keyword hits and extracts a "verb object" action
//! phrase. The same message always yields the same intent, which makes this
//! the right backend for offline use and tests.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::errors::ClassificationError;
use crate::domain::models::{Intent, IntentCategory};
use crate::domain::ports::IntentClassifier;

const EXECUTION_KEYWORDS: &[&str] = &[
    "create", "make", "add", "file", "open", "fix", "implement", "build", "update", "assign",
    "close", "ticket", "task", "issue",
];

const ANALYSIS_KEYWORDS: &[&str] = &[
    "analyze", "analyse", "what", "why", "how", "trend", "metric", "kpi", "investigate",
    "compare", "review", "status",
];

const SYNTHESIS_KEYWORDS: &[&str] = &[
    "write", "draft", "generate", "document", "report", "summarize", "summarise", "compose",
    "prepare",
];

const STRATEGY_KEYWORDS: &[&str] = &[
    "plan", "strategy", "roadmap", "prioritize", "prioritise", "should", "direction", "goal",
];

const LEARNING_KEYWORDS: &[&str] = &[
    "learn", "pattern", "remember", "feedback", "retrospective", "lesson",
];

const VERBS: &[&str] = &[
    "create", "make", "add", "file", "open", "fix", "implement", "build", "update", "write",
    "draft", "generate", "analyze", "analyse", "review", "plan", "summarize", "summarise",
    "prepare", "investigate", "compare", "learn", "remember",
];

const OBJECTS: &[&str] = &[
    "ticket", "issue", "task", "bug", "feature", "report", "document", "summary", "plan",
    "roadmap", "metric", "metrics", "pattern", "message", "trend", "dashboard", "requirement",
    "requirements",
];

fn keywords_for(category: IntentCategory) -> &'static [&'static str] {
    match category {
        IntentCategory::Execution => EXECUTION_KEYWORDS,
        IntentCategory::Analysis => ANALYSIS_KEYWORDS,
        IntentCategory::Synthesis => SYNTHESIS_KEYWORDS,
        IntentCategory::Strategy => STRATEGY_KEYWORDS,
        IntentCategory::Learning => LEARNING_KEYWORDS,
    }
}

fn default_verb(category: IntentCategory) -> &'static str {
    match category {
        IntentCategory::Execution => "execute",
        IntentCategory::Analysis => "analyze",
        IntentCategory::Synthesis => "create",
        IntentCategory::Strategy => "plan",
        IntentCategory::Learning => "learn",
    }
}

/// Keyword-scoring implementation of the classifier port.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classify_text(text: &str) -> Intent {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        // Score categories; ties break in IntentCategory::ALL order.
        let mut best: Option<(IntentCategory, Vec<&str>)> = None;
        for category in IntentCategory::ALL {
            let keywords = keywords_for(category);
            let hits: Vec<&str> = words
                .iter()
                .copied()
                .filter(|w| keywords.contains(w))
                .collect();
            if hits.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |(_, b)| hits.len() > b.len()) {
                best = Some((category, hits));
            }
        }

        let Some((category, hits)) = best else {
            // Nothing matched at all: degraded fallback to Learning.
            return Intent::new(IntentCategory::Learning, "learn", 0.2)
                .with_context_value("degraded", json!(true));
        };

        let verb = words
            .iter()
            .copied()
            .find(|w| VERBS.contains(w))
            .unwrap_or_else(|| default_verb(category));
        let object = words.iter().copied().find(|w| OBJECTS.contains(w));
        let action = match object {
            Some(object) if object != verb => format!("{verb} {object}"),
            _ => verb.to_string(),
        };

        #[allow(clippy::cast_precision_loss)]
        let confidence = (0.35 + 0.15 * hits.len() as f64).min(0.95);

        let mut intent = Intent::new(category, action, confidence)
            .with_context_value("matched_keywords", json!(hits));
        if let Some(object) = object {
            intent = intent.with_context_value("object", json!(object));
        }
        intent
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    async fn classify(&self, text: &str) -> Result<Intent, ClassificationError> {
        Ok(Self::classify_text(text))
    }
}
