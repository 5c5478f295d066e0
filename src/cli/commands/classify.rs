//! `factotum classify` — show the intent for a message.

use anyhow::{bail, Context, Result};

use crate::cli::commands::build_classifier;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Intent;
use crate::domain::ports::IntentClassifier;
use crate::infrastructure::config::ConfigLoader;
use crate::services::decision_table;

#[derive(Debug, serde::Serialize)]
struct ClassifyOutput {
    intent: Intent,
    workflow_type: Option<String>,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Category:   {}", self.intent.category),
            format!("Action:     {}", self.intent.action),
            format!("Confidence: {:.2}", self.intent.confidence),
        ];
        if self.intent.is_degraded() {
            lines.push("Degraded:   yes".to_string());
        }
        match &self.workflow_type {
            Some(workflow_type) => lines.push(format!("Workflow:   {workflow_type}")),
            None => lines.push("Workflow:   none (answered synchronously)".to_string()),
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(message: String, json: bool) -> Result<()> {
    if message.trim().is_empty() {
        bail!("message cannot be empty");
    }

    let config = ConfigLoader::load()?;
    let classifier = build_classifier(&config)?;
    let intent = classifier
        .classify(message.trim())
        .await
        .context("classification failed")?;

    let workflow_type = decision_table::select_type(&intent).map(|t| t.as_str().to_string());
    output(&ClassifyOutput { intent, workflow_type }, json);
    Ok(())
}
