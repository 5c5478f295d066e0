//! Task handler adapters.
//!
//! Analysis, execution, and synthesis task types run in-process
//! ([`builtin`]); the integration task types talk to GitHub, Jira, and
//! Slack over HTTP. [`default_registry`] wires all twelve bindings from
//! config — unconfigured integrations stay bound to handlers that report
//! "not configured" at run time, honoring the run-and-report contract.

pub mod builtin;
pub mod github;
pub mod jira;
pub mod slack;

use std::sync::Arc;

use crate::domain::models::{IntegrationsConfig, TaskType};
use crate::services::HandlerRegistry;

use builtin::{
    AnalyzeRequestHandler, CreateSummaryHandler, CreateWorkItemHandler, ExtractRequirementsHandler,
    GenerateDocumentHandler, IdentifyDependenciesHandler, NotifyStakeholdersHandler,
    UpdateWorkItemHandler,
};
use github::{AnalyzeGithubIssueHandler, GithubClient, GithubCreateIssueHandler};
use jira::{JiraClient, JiraCreateTicketHandler};
use slack::{SlackClient, SlackSendMessageHandler};

/// Build the full dispatch table for the given integration config.
pub fn default_registry(integrations: &IntegrationsConfig) -> HandlerRegistry {
    let github = integrations.github.as_ref().map(GithubClient::new);
    let jira = integrations.jira.as_ref().map(JiraClient::new);
    let slack = integrations.slack.as_ref().map(SlackClient::new);

    let mut registry = HandlerRegistry::new();
    registry.register(TaskType::AnalyzeRequest, Arc::new(AnalyzeRequestHandler));
    registry.register(TaskType::ExtractRequirements, Arc::new(ExtractRequirementsHandler));
    registry.register(TaskType::IdentifyDependencies, Arc::new(IdentifyDependenciesHandler));
    registry.register(TaskType::CreateWorkItem, Arc::new(CreateWorkItemHandler));
    registry.register(TaskType::UpdateWorkItem, Arc::new(UpdateWorkItemHandler));
    registry.register(TaskType::NotifyStakeholders, Arc::new(NotifyStakeholdersHandler));
    registry.register(TaskType::GenerateDocument, Arc::new(GenerateDocumentHandler));
    registry.register(TaskType::CreateSummary, Arc::new(CreateSummaryHandler));
    registry.register(
        TaskType::GithubCreateIssue,
        Arc::new(GithubCreateIssueHandler::new(github.clone())),
    );
    registry.register(
        TaskType::AnalyzeGithubIssue,
        Arc::new(AnalyzeGithubIssueHandler::new(github)),
    );
    registry.register(
        TaskType::JiraCreateTicket,
        Arc::new(JiraCreateTicketHandler::new(jira)),
    );
    registry.register(
        TaskType::SlackSendMessage,
        Arc::new(SlackSendMessageHandler::new(slack)),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_task_type() {
        let registry = default_registry(&IntegrationsConfig::default());
        assert_eq!(registry.len(), 12);
        for task_type in [
            TaskType::AnalyzeRequest,
            TaskType::ExtractRequirements,
            TaskType::IdentifyDependencies,
            TaskType::CreateWorkItem,
            TaskType::UpdateWorkItem,
            TaskType::NotifyStakeholders,
            TaskType::GenerateDocument,
            TaskType::CreateSummary,
            TaskType::GithubCreateIssue,
            TaskType::AnalyzeGithubIssue,
            TaskType::JiraCreateTicket,
            TaskType::SlackSendMessage,
        ] {
            assert!(registry.get(task_type).is_some(), "{task_type} unbound");
        }
    }
}
