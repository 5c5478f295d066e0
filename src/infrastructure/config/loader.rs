use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid worker_count: {0}. Must be between 1 and 64")]
    InvalidWorkerCount(usize),

    #[error("Invalid queue_capacity: {0}. Must be at least 1")]
    InvalidQueueCapacity(usize),

    #[error("Invalid max_concurrency: {0}. Must be between 1 and 128")]
    InvalidMaxConcurrency(usize),

    #[error("Invalid task_timeout_secs: {0}. Must be at least 1")]
    InvalidTaskTimeout(u64),

    #[error("Invalid classifier backend: {0}. Must be one of: rules, llm")]
    InvalidClassifierBackend(String),

    #[error("Invalid classifier timeout_secs: {0}. Must be at least 1")]
    InvalidClassifierTimeout(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .factotum/config.yaml (project config)
    /// 3. .factotum/local.yaml (project local overrides, optional)
    /// 4. Environment variables (FACTOTUM_* prefix, highest priority)
    ///
    /// Configuration is project-local (pwd/.factotum/) so several projects
    /// on one machine can carry different integration credentials.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".factotum/config.yaml"))
            .merge(Yaml::file(".factotum/local.yaml"))
            .merge(Env::prefixed("FACTOTUM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.engine.worker_count == 0 || config.engine.worker_count > 64 {
            return Err(ConfigError::InvalidWorkerCount(config.engine.worker_count));
        }

        if config.engine.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity(config.engine.queue_capacity));
        }

        if config.engine.max_concurrency == 0 || config.engine.max_concurrency > 128 {
            return Err(ConfigError::InvalidMaxConcurrency(config.engine.max_concurrency));
        }

        if config.engine.task_timeout_secs == 0 {
            return Err(ConfigError::InvalidTaskTimeout(config.engine.task_timeout_secs));
        }

        let valid_backends = ["rules", "llm"];
        if !valid_backends.contains(&config.classifier.backend.as_str()) {
            return Err(ConfigError::InvalidClassifierBackend(
                config.classifier.backend.clone(),
            ));
        }

        if config.classifier.timeout_secs == 0 {
            return Err(ConfigError::InvalidClassifierTimeout(
                config.classifier.timeout_secs,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if let Some(github) = &config.integrations.github {
            if github.token.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "github token cannot be empty".to_string(),
                ));
            }
            if !github.repository.contains('/') {
                return Err(ConfigError::ValidationFailed(format!(
                    "github repository '{}' must be in owner/name form",
                    github.repository
                )));
            }
        }

        if let Some(jira) = &config.integrations.jira {
            if jira.base_url.is_empty() || jira.project_key.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "jira base_url and project_key cannot be empty".to_string(),
                ));
            }
        }

        if let Some(slack) = &config.integrations.slack {
            if slack.webhook_url.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "slack webhook_url cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
