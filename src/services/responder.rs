//! Acknowledgement copy for processed messages.

use crate::domain::models::{Intent, IntentCategory};

/// Build the response text for a processed message: one phrasing when a
/// workflow was started, otherwise a category-specific acknowledgement.
pub fn acknowledge(intent: &Intent, workflow_started: bool) -> String {
    let lead = format!("I understand you want to {}.", intent.action);
    if workflow_started {
        return format!("{lead} I've started a workflow to handle this.");
    }

    let tail = match intent.category {
        IntentCategory::Execution => "I'll help you execute that task.",
        IntentCategory::Analysis => "Let me analyze that for you.",
        IntentCategory::Synthesis => "I'll help you create that.",
        IntentCategory::Strategy => "Let's think strategically about this.",
        IntentCategory::Learning => "I'll help you learn from this.",
    };
    format!("{lead} {tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_phrasing_mentions_the_action() {
        let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
        let text = acknowledge(&intent, true);
        assert!(text.contains("create ticket"));
        assert!(text.contains("started a workflow"));
    }

    #[test]
    fn test_each_category_has_distinct_phrasing() {
        let texts: Vec<String> = IntentCategory::ALL
            .iter()
            .map(|&category| acknowledge(&Intent::new(category, "do something", 0.5), false))
            .collect();
        for (i, a) in texts.iter().enumerate() {
            for b in texts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
