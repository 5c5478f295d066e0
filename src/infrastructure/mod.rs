//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports:
//! - Intent classifier backends (rule-based and LLM HTTP)
//! - Task handler implementations (in-process and HTTP integrations)
//! - Configuration management

pub mod classifier;
pub mod config;
pub mod handlers;

pub use classifier::{LlmClassifier, RuleClassifier};
pub use config::{ConfigError, ConfigLoader};
