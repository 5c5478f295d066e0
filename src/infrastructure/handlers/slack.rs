//! Slack integration handler (incoming webhook).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::domain::errors::TaskFailure;
use crate::domain::models::SlackConfig;
use crate::domain::ports::{TaskHandler, TaskRunContext};

/// Minimal client for a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    webhook_url: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            http: Client::new(),
            webhook_url: config.webhook_url.clone(),
        }
    }

    pub async fn post_message(&self, text: &str) -> Result<(), TaskFailure> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&json!({"text": text}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskFailure::new(format!(
                "Slack webhook returned {status}"
            )));
        }
        Ok(())
    }
}

pub struct SlackSendMessageHandler {
    client: Option<SlackClient>,
}

impl SlackSendMessageHandler {
    pub fn new(client: Option<SlackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskHandler for SlackSendMessageHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TaskFailure::new("slack integration is not configured"))?;

        let text = ctx
            .upstream
            .values()
            .find_map(|v| v.get("summary").and_then(Value::as_str))
            .map_or_else(|| format!("Update on: {}", ctx.action), String::from);

        client.post_message(&text).await?;
        Ok(json!({"sent": true, "text": text}))
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
            task_type: TaskType::SlackSendMessage,
            action: "share report".to_string(),
            intent_context: HashMap::new(),
            upstream: HashMap::new(),
        };
        let failure = SlackSendMessageHandler::new(None).run(&ctx).await.unwrap_err();
        assert!(failure.message.contains("not configured"));
    }
}
