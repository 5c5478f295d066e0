//! LLM-backed intent classifier.
//!
//! Sends the message to a messages-style HTTP API with a system prompt that
//! demands a strict JSON verdict, then normalizes the verdict into an
//! [`Intent`]. Transport failures, non-success statuses, and unparseable
//! payloads surface as [`ClassificationError`]; a well-formed verdict with
//! an unknown category degrades to `Learning` with `context["degraded"]`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::errors::ClassificationError;
use crate::domain::models::{ClassifierConfig, Intent, IntentCategory};
use crate::domain::ports::IntentClassifier;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You classify product-management requests. \
Respond with a single JSON object and nothing else: \
{\"category\": one of \"execution\"|\"analysis\"|\"synthesis\"|\"strategy\"|\"learning\", \
\"action\": short verb phrase naming what the user wants, \
\"confidence\": number between 0 and 1, \
\"context\": object of extracted entities}";

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    category: String,
    action: String,
    confidence: f64,
    #[serde(default)]
    context: HashMap<String, Value>,
}

/// HTTP adapter for the classifier port.
#[derive(Debug)]
pub struct LlmClassifier {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl LlmClassifier {
    /// Create a classifier with explicit settings.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ClassificationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClassificationError::Backend(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs,
        })
    }

    /// Create a classifier from config, reading the API key from the
    /// environment variable the config names.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassificationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ClassificationError::MissingCredentials(format!(
                    "{} environment variable is not set",
                    config.api_key_env
                ))
            })?;

        Self::new(
            api_key,
            config.base_url.trim_end_matches('/'),
            config.model.clone(),
            config.timeout_secs,
        )
    }

    async fn send(&self, text: &str) -> Result<MessageResponse, ClassificationError> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: 512,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: text.to_string(),
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout(self.timeout_secs)
                } else {
                    ClassificationError::Backend(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(ClassificationError::Backend(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))
    }

    fn into_intent(verdict: Verdict) -> Intent {
        let mut context = verdict.context;
        let category = match IntentCategory::from_str(&verdict.category) {
            Some(category) => category,
            None => {
                warn!(
                    category = %verdict.category,
                    "backend returned unknown category, degrading to learning"
                );
                context.insert("degraded".to_string(), json!(true));
                IntentCategory::Learning
            }
        };

        let mut intent = Intent::new(category, verdict.action, verdict.confidence);
        intent.context = context;
        intent
    }
}

/// Pull the JSON object out of a model reply, tolerating code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<Intent, ClassificationError> {
        let response = self.send(text).await?;

        let reply = response
            .content
            .iter()
            .map(|block| block.text.as_str())
            .find(|text| !text.is_empty())
            .ok_or_else(|| {
                ClassificationError::MalformedResponse("response contained no text".to_string())
            })?;

        let verdict: Verdict = serde_json::from_str(extract_json(reply))
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        Ok(Self::into_intent(verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_strips_code_fences() {
        assert_eq!(extract_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_known_category_maps_cleanly() {
        let intent = LlmClassifier::into_intent(Verdict {
            category: "execution".to_string(),
            action: "create ticket".to_string(),
            confidence: 0.92,
            context: HashMap::new(),
        });
        assert_eq!(intent.category, IntentCategory::Execution);
        assert!(!intent.is_degraded());
    }

    #[test]
    fn test_unknown_category_degrades_to_learning() {
        let intent = LlmClassifier::into_intent(Verdict {
            category: "banter".to_string(),
            action: "chat".to_string(),
            confidence: 0.4,
            context: HashMap::new(),
        });
        assert_eq!(intent.category, IntentCategory::Learning);
        assert!(intent.is_degraded());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let intent = LlmClassifier::into_intent(Verdict {
            category: "analysis".to_string(),
            action: "analyze".to_string(),
            confidence: 3.5,
            context: HashMap::new(),
        });
        assert_eq!(intent.confidence, 1.0);
    }
}
