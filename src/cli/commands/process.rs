//! `factotum process` — run a message end to end.

use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;

use crate::cli::commands::build_classifier;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::WorkflowProjection;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::handlers::default_registry;
use crate::services::{OrchestrationEngine, ProcessedMessage};

#[derive(Debug, serde::Serialize)]
struct ProcessOutput {
    processed: ProcessedMessage,
    workflow: Option<WorkflowProjection>,
}

impl CommandOutput for ProcessOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            self.processed.response.clone(),
            format!(
                "Intent: {} / {} ({:.2})",
                self.processed.intent.category,
                self.processed.intent.action,
                self.processed.intent.confidence
            ),
        ];

        if let Some(workflow) = &self.workflow {
            lines.push(format!(
                "Workflow {} [{}] — {}",
                workflow.id, workflow.workflow_type, workflow.message
            ));

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Task", "Status", "Error"]);
            for task in &workflow.tasks {
                let status = match task.status.as_str() {
                    "completed" => style(task.status.as_str()).green().to_string(),
                    "failed" => style(task.status.as_str()).red().to_string(),
                    "skipped" => style(task.status.as_str()).yellow().to_string(),
                    other => other.to_string(),
                };
                table.add_row(vec![
                    task.task_type.as_str().to_string(),
                    status,
                    task.error.clone().unwrap_or_default(),
                ]);
            }
            lines.push(table.to_string());
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(message: String, wait_secs: u64, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let classifier = build_classifier(&config)?;
    let handlers = default_registry(&config.integrations);
    let engine = OrchestrationEngine::new(classifier, handlers, &config.engine);

    let processed = engine.process_message(&message).await?;

    let workflow = match processed.workflow_id {
        Some(id) => {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(wait_secs);
            let projection = loop {
                let projection = engine
                    .get_workflow(id)
                    .await
                    .context("workflow disappeared from the registry")?;
                if projection.status.is_terminal() || tokio::time::Instant::now() >= deadline {
                    break projection;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            };
            Some(projection)
        }
        None => None,
    };

    engine.shutdown().await;
    output(&ProcessOutput { processed, workflow }, json);
    Ok(())
}
