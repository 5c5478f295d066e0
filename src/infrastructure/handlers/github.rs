//! GitHub integration handlers.
//!
//! Wraps the GitHub REST API v3 for the two issue-facing task types.
//! All failures come back as [`TaskFailure`] messages — the engine's
//! failure cascade is the only propagation path.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::domain::errors::TaskFailure;
use crate::domain::models::GithubConfig;
use crate::domain::ports::{TaskHandler, TaskRunContext};

/// HTTP client for the GitHub REST API v3.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    token: String,
    repository: String,
    base_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            http: Client::new(),
            token: config.token.clone(),
            repository: config.repository.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "factotum")
    }

    /// Create an issue and return the API response body.
    pub async fn create_issue(&self, title: &str, body: &str) -> Result<Value, TaskFailure> {
        let url = format!("{}/repos/{}/issues", self.base_url, self.repository);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&json!({"title": title, "body": body}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaskFailure::new(format!(
                "GitHub issue creation failed ({status}): {body}"
            )));
        }
        Ok(response.json().await?)
    }

    /// Fetch an issue by number.
    pub async fn get_issue(&self, number: u64) -> Result<Value, TaskFailure> {
        let url = format!("{}/repos/{}/issues/{number}", self.base_url, self.repository);
        let response = self.request(reqwest::Method::GET, url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskFailure::new(format!(
                "GitHub issue lookup failed ({status})"
            )));
        }
        Ok(response.json().await?)
    }
}

/// Render upstream results into an issue body.
fn issue_body(ctx: &TaskRunContext) -> String {
    let mut body = format!("Requested action: {}\n", ctx.action);
    let mut entries: Vec<_> = ctx.upstream.iter().collect();
    entries.sort_by_key(|(id, _)| **id);
    for (_, value) in entries {
        if let Some(summary) = value.get("summary").and_then(Value::as_str) {
            body.push_str(&format!("\n{summary}"));
        }
        if let Some(requirements) = value.get("requirements").and_then(Value::as_array) {
            body.push_str("\n\nRequirements:");
            for requirement in requirements {
                if let Some(text) = requirement.as_str() {
                    body.push_str(&format!("\n- {text}"));
                }
            }
        }
    }
    body
}

pub struct GithubCreateIssueHandler {
    client: Option<GithubClient>,
}

impl GithubCreateIssueHandler {
    pub fn new(client: Option<GithubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskHandler for GithubCreateIssueHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TaskFailure::new("github integration is not configured"))?;

        let issue = client.create_issue(&ctx.action, &issue_body(ctx)).await?;
        Ok(json!({
            "number": issue.get("number"),
            "url": issue.get("html_url"),
        }))
    }
}

pub struct AnalyzeGithubIssueHandler {
    client: Option<GithubClient>,
}

impl AnalyzeGithubIssueHandler {
    pub fn new(client: Option<GithubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskHandler for AnalyzeGithubIssueHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TaskFailure::new("github integration is not configured"))?;

        let number = ctx
            .intent_context
            .get("issue_number")
            .and_then(Value::as_u64)
            .ok_or_else(|| TaskFailure::new("no issue_number in intent context"))?;

        let issue = client.get_issue(number).await?;
        Ok(json!({
            "number": number,
            "title": issue.get("title"),
            "state": issue.get("state"),
            "summary": format!(
                "Issue #{number}: {}",
                issue.get("title").and_then(Value::as_str).unwrap_or("untitled")
            ),
        }))
    }
}
