//! Jira integration handler.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::domain::errors::TaskFailure;
use crate::domain::models::JiraConfig;
use crate::domain::ports::{TaskHandler, TaskRunContext};

/// HTTP client for the Jira REST API (v2), using email + API token
/// basic auth.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    api_token: String,
    project_key: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
            project_key: config.project_key.clone(),
        }
    }

    /// File a ticket and return its key.
    pub async fn create_ticket(&self, summary: &str, description: &str) -> Result<Value, TaskFailure> {
        let url = format!("{}/rest/api/2/issue", self.base_url);
        let payload = json!({
            "fields": {
                "project": {"key": self.project_key},
                "summary": summary,
                "description": description,
                "issuetype": {"name": "Task"},
            }
        });

        let response = self
            .http
            .post(url)
            .basic_auth(&self.email, Some(&self.api_token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaskFailure::new(format!(
                "Jira ticket creation failed ({status}): {body}"
            )));
        }
        Ok(response.json().await?)
    }
}

pub struct JiraCreateTicketHandler {
    client: Option<JiraClient>,
}

impl JiraCreateTicketHandler {
    pub fn new(client: Option<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskHandler for JiraCreateTicketHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TaskFailure::new("jira integration is not configured"))?;

        let description = ctx
            .upstream
            .values()
            .find_map(|v| v.get("summary").and_then(Value::as_str))
            .map_or_else(|| format!("Requested action: {}", ctx.action), String::from);

        let ticket = client.create_ticket(&ctx.action, &description).await?;
        Ok(json!({
            "key": ticket.get("key"),
            "id": ticket.get("id"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskType;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_unconfigured_handler_reports_not_configured() {
        let ctx = TaskRunContext {
            task_id: Uuid::new_v4(),
            task_type: TaskType::JiraCreateTicket,
            action: "create ticket".to_string(),
            intent_context: HashMap::new(),
            upstream: HashMap::new(),
        };
        let failure = JiraCreateTicketHandler::new(None).run(&ctx).await.unwrap_err();
        assert!(failure.message.contains("not configured"));
    }
}
