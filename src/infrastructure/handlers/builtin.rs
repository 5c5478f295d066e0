//! In-process handlers for the analysis, execution, and synthesis task
//! types. Each produces a structured JSON result derived from the intent
//! and the results of its upstream tasks.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::errors::TaskFailure;
use crate::domain::ports::{TaskHandler, TaskRunContext};

/// Keys of the intent slots, sorted for stable output.
fn entity_keys(ctx: &TaskRunContext) -> Vec<&str> {
    let mut keys: Vec<&str> = ctx.intent_context.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// Merge all upstream results into one array, dependency id order.
fn upstream_values(ctx: &TaskRunContext) -> Vec<&Value> {
    let mut entries: Vec<(&Uuid, &Value)> = ctx.upstream.iter().collect();
    entries.sort_by_key(|(id, _)| **id);
    entries.into_iter().map(|(_, v)| v).collect()
}

pub struct AnalyzeRequestHandler;

#[async_trait]
impl TaskHandler for AnalyzeRequestHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Ok(json!({
            "action": ctx.action,
            "entities": ctx.intent_context,
            "summary": format!("Analyzed request to {}", ctx.action),
        }))
    }
}

pub struct ExtractRequirementsHandler;

#[async_trait]
impl TaskHandler for ExtractRequirementsHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let requirements = vec![
            format!("Clarify scope of '{}'", ctx.action),
            "Identify acceptance criteria".to_string(),
            "Confirm affected stakeholders".to_string(),
        ];
        Ok(json!({
            "requirements": requirements,
            "derived_from": entity_keys(ctx),
        }))
    }
}

pub struct IdentifyDependenciesHandler;

#[async_trait]
impl TaskHandler for IdentifyDependenciesHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Ok(json!({
            "blocking": [],
            "related": entity_keys(ctx),
            "notes": "No blocking work identified",
        }))
    }
}

pub struct CreateWorkItemHandler;

#[async_trait]
impl TaskHandler for CreateWorkItemHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Ok(json!({
            "work_item_id": Uuid::new_v4(),
            "title": ctx.action,
            "created_at": Utc::now(),
        }))
    }
}

pub struct UpdateWorkItemHandler;

#[async_trait]
impl TaskHandler for UpdateWorkItemHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        // Update whichever work item an upstream task produced, if any.
        let target = upstream_values(ctx)
            .iter()
            .find_map(|v| v.get("work_item_id").cloned());
        Ok(json!({
            "updated": target,
            "fields": {"note": format!("Updated for '{}'", ctx.action)},
            "updated_at": Utc::now(),
        }))
    }
}

pub struct NotifyStakeholdersHandler;

#[async_trait]
impl TaskHandler for NotifyStakeholdersHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Ok(json!({
            "notified": ["stakeholders"],
            "subject": format!("Update on: {}", ctx.action),
            "sent_at": Utc::now(),
        }))
    }
}

pub struct GenerateDocumentHandler;

#[async_trait]
impl TaskHandler for GenerateDocumentHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let mut body = format!("# {}\n", ctx.action);
        for value in upstream_values(ctx) {
            if let Some(summary) = value.get("summary").and_then(Value::as_str) {
                body.push_str(&format!("\n{summary}\n"));
            }
        }
        Ok(json!({
            "document": body,
            "format": "markdown",
            "generated_at": Utc::now(),
        }))
    }
}

pub struct CreateSummaryHandler;

#[async_trait]
impl TaskHandler for CreateSummaryHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let upstream = upstream_values(ctx);
        Ok(json!({
            "summary": format!(
                "Summary of '{}' across {} input(s)",
                ctx.action,
                upstream.len()
            ),
        }))
    }
}
