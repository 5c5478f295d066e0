use serde::{Deserialize, Serialize};

/// Main configuration structure for Factotum
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Orchestration engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Intent classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Integration endpoints and credentials
    #[serde(default)]
    pub integrations: IntegrationsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            classifier: ClassifierConfig::default(),
            integrations: IntegrationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Orchestration engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Number of workers draining the execution queue (1-64)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Capacity of the execution queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum concurrently running task handlers across all workflows
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for a single task handler (seconds)
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

const fn default_worker_count() -> usize {
    4
}

const fn default_queue_capacity() -> usize {
    64
}

const fn default_max_concurrency() -> usize {
    8
}

const fn default_task_timeout_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            max_concurrency: default_max_concurrency(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

/// Intent classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifierConfig {
    /// Backend: "rules" (deterministic, offline) or "llm"
    #[serde(default = "default_classifier_backend")]
    pub backend: String,

    /// Model identifier for the llm backend
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// Base URL of the llm backend
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the llm API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_classifier_backend() -> String {
    "rules".to_string()
}

fn default_classifier_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_classifier_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

const fn default_classifier_timeout_secs() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: default_classifier_backend(),
            model: default_classifier_model(),
            base_url: default_classifier_base_url(),
            timeout_secs: default_classifier_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Integration endpoints and credentials. Absent sections leave the
/// corresponding task handlers reporting "not configured" at run time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub github: Option<GithubConfig>,

    #[serde(default)]
    pub jira: Option<JiraConfig>,

    #[serde(default)]
    pub slack: Option<SlackConfig>,
}

/// GitHub REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GithubConfig {
    /// Personal access token or fine-grained token
    pub token: String,

    /// Repository in "owner/name" form
    pub repository: String,

    /// API base URL (override for GitHub Enterprise)
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

/// Jira REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JiraConfig {
    /// Site base URL, e.g. <https://example.atlassian.net>
    pub base_url: String,

    /// Account email for basic auth
    pub email: String,

    /// API token paired with the email
    pub api_token: String,

    /// Project key new tickets are filed under
    pub project_key: String,
}

/// Slack incoming-webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Incoming webhook URL
    pub webhook_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.worker_count, 4);
        assert_eq!(config.engine.queue_capacity, 64);
        assert_eq!(config.classifier.backend, "rules");
        assert_eq!(config.logging.level, "info");
        assert!(config.integrations.github.is_none());
        assert!(config.integrations.jira.is_none());
        assert!(config.integrations.slack.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "engine": {"worker_count": 2},
            "integrations": {"slack": {"webhook_url": "https://hooks.slack.example/T/B/x"}}
        }))
        .unwrap();
        assert_eq!(config.engine.worker_count, 2);
        assert_eq!(config.engine.queue_capacity, 64);
        assert!(config.integrations.slack.is_some());
    }
}
