//! Task domain model.
//!
//! Tasks are the individual steps of a workflow. They form a DAG through
//! `depends_on` and are mutated only by the orchestration engine's run loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// What kind of work a task performs. Dispatch to handlers is keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    // Analysis
    AnalyzeRequest,
    ExtractRequirements,
    IdentifyDependencies,
    // Execution
    CreateWorkItem,
    UpdateWorkItem,
    NotifyStakeholders,
    // Synthesis
    GenerateDocument,
    CreateSummary,
    // Integrations
    GithubCreateIssue,
    AnalyzeGithubIssue,
    JiraCreateTicket,
    SlackSendMessage,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeRequest => "analyze_request",
            Self::ExtractRequirements => "extract_requirements",
            Self::IdentifyDependencies => "identify_dependencies",
            Self::CreateWorkItem => "create_work_item",
            Self::UpdateWorkItem => "update_work_item",
            Self::NotifyStakeholders => "notify_stakeholders",
            Self::GenerateDocument => "generate_document",
            Self::CreateSummary => "create_summary",
            Self::GithubCreateIssue => "github_create_issue",
            Self::AnalyzeGithubIssue => "analyze_github_issue",
            Self::JiraCreateTicket => "jira_create_ticket",
            Self::SlackSendMessage => "slack_send_message",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "analyze_request" => Some(Self::AnalyzeRequest),
            "extract_requirements" => Some(Self::ExtractRequirements),
            "identify_dependencies" => Some(Self::IdentifyDependencies),
            "create_work_item" => Some(Self::CreateWorkItem),
            "update_work_item" => Some(Self::UpdateWorkItem),
            "notify_stakeholders" => Some(Self::NotifyStakeholders),
            "generate_document" => Some(Self::GenerateDocument),
            "create_summary" => Some(Self::CreateSummary),
            "github_create_issue" => Some(Self::GithubCreateIssue),
            "analyze_github_issue" => Some(Self::AnalyzeGithubIssue),
            "jira_create_ticket" => Some(Self::JiraCreateTicket),
            "slack_send_message" => Some(Self::SlackSendMessage),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a task in the execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Defined but not yet dispatched.
    Pending,
    /// Handler is currently executing.
    Running,
    /// Handler finished and reported a result.
    Completed,
    /// Handler finished and reported an error.
    Failed,
    /// Never dispatched because a dependency failed.
    Skipped,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Whether a dependency in this status allows a dependent to start.
    pub fn satisfies_dependency(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            Self::Pending => vec![Self::Running, Self::Skipped],
            Self::Running => vec![Self::Completed, Self::Failed],
            Self::Completed | Self::Failed | Self::Skipped => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step within a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the owning workflow.
    pub id: Uuid,
    /// What kind of work this task performs.
    pub task_type: TaskType,
    /// Current status.
    pub status: TaskStatus,
    /// Task IDs that must settle successfully before this task may start.
    pub depends_on: Vec<Uuid>,
    /// Result payload, set on completion.
    pub result: Option<Value>,
    /// Error message, set on failure.
    pub error: Option<String>,
    /// When created.
    pub created_at: DateTime<Utc>,
    /// When execution started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(task_type: TaskType) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type,
            status: TaskStatus::default(),
            depends_on: Vec::new(),
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Add a dependency.
    pub fn with_dependency(mut self, task_id: Uuid) -> Self {
        if !self.depends_on.contains(&task_id) && task_id != self.id {
            self.depends_on.push(task_id);
        }
        self
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to new status, updating timestamps.
    pub fn transition_to(&mut self, new_status: TaskStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        match new_status {
            TaskStatus::Running => self.started_at = Some(Utc::now()),
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped => {
                self.completed_at = Some(Utc::now());
            }
            TaskStatus::Pending => {}
        }

        Ok(())
    }

    /// Check if task is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
