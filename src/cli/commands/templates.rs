//! `factotum templates` — show the decision table's workflow templates.

use anyhow::Result;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::WorkflowType;
use crate::services::decision_table;

#[derive(Debug, serde::Serialize)]
struct TemplateTask {
    task_type: String,
    depends_on: Vec<usize>,
}

#[derive(Debug, serde::Serialize)]
struct TemplateSummary {
    workflow_type: String,
    tasks: Vec<TemplateTask>,
}

#[derive(Debug, serde::Serialize)]
struct TemplatesOutput {
    templates: Vec<TemplateSummary>,
}

impl CommandOutput for TemplatesOutput {
    fn to_human(&self) -> String {
        let mut lines = vec!["Workflow templates:".to_string()];
        for template in &self.templates {
            lines.push(format!("\n  {}", template.workflow_type));
            for (i, task) in template.tasks.iter().enumerate() {
                let deps = if task.depends_on.is_empty() {
                    String::new()
                } else {
                    format!(
                        " (after {})",
                        task.depends_on
                            .iter()
                            .map(|&d| template.tasks[d].task_type.clone())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };
                lines.push(format!("    {}. {}{deps}", i + 1, task.task_type));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(json: bool) -> Result<()> {
    let templates = WorkflowType::ALL
        .iter()
        .map(|&workflow_type| {
            let blueprint = decision_table::template(workflow_type);
            TemplateSummary {
                workflow_type: workflow_type.as_str().to_string(),
                tasks: blueprint
                    .tasks
                    .iter()
                    .map(|t| TemplateTask {
                        task_type: t.task_type.as_str().to_string(),
                        depends_on: t.depends_on.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    output(&TemplatesOutput { templates }, json);
    Ok(())
}
