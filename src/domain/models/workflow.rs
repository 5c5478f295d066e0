//! Workflow domain model.
//!
//! A `Workflow` is an ordered collection of tasks derived from one intent,
//! plus the aggregate status the engine maintains while running them. Tasks
//! are stored in template declaration order; execution order follows the
//! dependency graph. Readers only ever see snapshot projections — the engine
//! owns the mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::intent::Intent;
use super::task::{Task, TaskStatus, TaskType};
use crate::domain::errors::TaskFailure;

/// The shape of work a workflow carries out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    CreateFeature,
    AnalyzeMetrics,
    CreateTicket,
    CreateTask,
    ReviewItem,
    GenerateReport,
    PlanStrategy,
    LearnPattern,
}

impl WorkflowType {
    /// All workflow types, in decision-table order.
    pub const ALL: [Self; 8] = [
        Self::CreateFeature,
        Self::AnalyzeMetrics,
        Self::CreateTicket,
        Self::CreateTask,
        Self::ReviewItem,
        Self::GenerateReport,
        Self::PlanStrategy,
        Self::LearnPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFeature => "create_feature",
            Self::AnalyzeMetrics => "analyze_metrics",
            Self::CreateTicket => "create_ticket",
            Self::CreateTask => "create_task",
            Self::ReviewItem => "review_item",
            Self::GenerateReport => "generate_report",
            Self::PlanStrategy => "plan_strategy",
            Self::LearnPattern => "learn_pattern",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create_feature" => Some(Self::CreateFeature),
            "analyze_metrics" => Some(Self::AnalyzeMetrics),
            "create_ticket" => Some(Self::CreateTicket),
            "create_task" => Some(Self::CreateTask),
            "review_item" => Some(Self::ReviewItem),
            "generate_report" => Some(Self::GenerateReport),
            "plan_strategy" => Some(Self::PlanStrategy),
            "learn_pattern" => Some(Self::LearnPattern),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Registered but not yet picked up by a worker.
    Pending,
    /// A worker is dispatching its tasks.
    Running,
    /// Every task completed or was skipped, none failed.
    Completed,
    /// At least one task failed and no further progress was possible.
    Failed,
    /// Cancelled by explicit request.
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Data the engine needs to hand a task to its handler.
#[derive(Debug, Clone)]
pub struct TaskDispatch {
    pub task_id: Uuid,
    pub task_type: TaskType,
    /// Results of this task's completed dependencies.
    pub upstream: HashMap<Uuid, Value>,
}

/// A tracked unit of multi-step work derived from one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Which template this workflow was instantiated from.
    pub workflow_type: WorkflowType,
    /// Current aggregate status.
    pub status: WorkflowStatus,
    /// Tasks in template declaration order.
    pub tasks: Vec<Task>,
    /// The intent that produced this workflow.
    pub intent: Intent,
    /// First fatal failure message, if any.
    pub error: Option<String>,
    /// When created. Never mutated afterwards.
    pub created_at: DateTime<Utc>,
    /// When last updated.
    pub updated_at: DateTime<Utc>,
    /// When the workflow reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workflow {
    /// Create a new pending workflow over the given tasks.
    pub fn new(workflow_type: WorkflowType, intent: Intent, tasks: Vec<Task>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workflow_type,
            status: WorkflowStatus::Pending,
            tasks,
            intent,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Look up a task by id.
    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Move Pending → Running. Returns `false` when the workflow is not
    /// Pending, which makes duplicate triggers a no-op for the caller.
    pub fn begin(&mut self) -> bool {
        if self.status != WorkflowStatus::Pending {
            return false;
        }
        self.status = WorkflowStatus::Running;
        self.updated_at = Utc::now();
        true
    }

    /// Mark the workflow cancelled. Returns `false` when already terminal.
    /// Task records keep whatever status they had at that instant; results
    /// of tasks still in flight are discarded by the run loop.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = WorkflowStatus::Cancelled;
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
        true
    }

    /// Skip every pending task whose dependency chain contains a failure.
    ///
    /// Skipped status only arises from this cascade, so a skipped dependency
    /// is itself failure-tainted and propagates: the loop runs to fixpoint.
    pub fn cascade_skips(&mut self) {
        loop {
            let to_skip: Vec<Uuid> = self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .filter(|t| {
                    t.depends_on.iter().any(|dep| {
                        self.task(*dep).is_some_and(|d| {
                            matches!(d.status, TaskStatus::Failed | TaskStatus::Skipped)
                        })
                    })
                })
                .map(|t| t.id)
                .collect();

            if to_skip.is_empty() {
                break;
            }
            for id in to_skip {
                if let Some(task) = self.task_mut(id) {
                    let _ = task.transition_to(TaskStatus::Skipped);
                }
            }
            self.updated_at = Utc::now();
        }
    }

    /// Pending tasks whose dependencies are all settled successfully,
    /// in declaration order (the documented tie-break for simultaneous
    /// readiness).
    pub fn ready_tasks(&self) -> Vec<Uuid> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| {
                t.depends_on
                    .iter()
                    .all(|dep| self.task(*dep).is_some_and(|d| d.status.satisfies_dependency()))
            })
            .map(|t| t.id)
            .collect()
    }

    /// Transition a task to Running and collect what its handler needs.
    pub fn start_task(&mut self, id: Uuid) -> Result<TaskDispatch, String> {
        let (task_type, upstream) = {
            let task = self.task(id).ok_or_else(|| format!("unknown task {id}"))?;
            let upstream = task
                .depends_on
                .iter()
                .filter_map(|dep| {
                    self.task(*dep)
                        .and_then(|d| d.result.clone().map(|r| (*dep, r)))
                })
                .collect();
            (task.task_type, upstream)
        };

        let task = self.task_mut(id).ok_or_else(|| format!("unknown task {id}"))?;
        task.transition_to(TaskStatus::Running)?;
        self.updated_at = Utc::now();

        Ok(TaskDispatch {
            task_id: id,
            task_type,
            upstream,
        })
    }

    /// Record a handler's outcome: Completed with a result, or Failed with
    /// the reported message.
    pub fn apply_task_outcome(
        &mut self,
        id: Uuid,
        outcome: Result<Value, TaskFailure>,
    ) -> Result<(), String> {
        let task = self.task_mut(id).ok_or_else(|| format!("unknown task {id}"))?;
        match outcome {
            Ok(result) => {
                task.transition_to(TaskStatus::Completed)?;
                task.result = Some(result);
            }
            Err(failure) => {
                task.transition_to(TaskStatus::Failed)?;
                task.error = Some(failure.message);
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// First failed task in declaration order.
    pub fn first_failure(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Failed)
    }

    /// Whether no task is Pending or Running.
    pub fn all_tasks_settled(&self) -> bool {
        self.tasks.iter().all(Task::is_terminal)
    }

    /// Finalize the aggregate status once no further progress is possible:
    /// Failed with the first failure's message, or Completed.
    pub fn settle(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        if let Some(failed) = self.first_failure() {
            self.error = failed.error.clone();
            self.status = WorkflowStatus::Failed;
        } else {
            self.status = WorkflowStatus::Completed;
        }
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Abort the run after a broken invariant (e.g. an illegal task
    /// transition). The workflow still converges to a terminal state.
    pub fn abort(&mut self, reason: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.error = Some(reason.into());
        self.status = WorkflowStatus::Failed;
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Number of tasks that completed successfully.
    pub fn completed_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count()
    }

    /// Snapshot projection for clients.
    pub fn projection(&self) -> WorkflowProjection {
        let completed_tasks = self.completed_task_count();
        let total_tasks = self.tasks.len();
        let message = match self.status {
            WorkflowStatus::Completed => "Workflow completed successfully!".to_string(),
            WorkflowStatus::Running => format!(
                "Workflow in progress... ({completed_tasks}/{total_tasks} tasks completed)"
            ),
            WorkflowStatus::Failed => format!(
                "Workflow failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
            WorkflowStatus::Cancelled => "Workflow was cancelled".to_string(),
            WorkflowStatus::Pending => "Workflow is pending".to_string(),
        };

        WorkflowProjection {
            id: self.id,
            workflow_type: self.workflow_type,
            status: self.status,
            tasks: self
                .tasks
                .iter()
                .map(|t| TaskProjection {
                    id: t.id,
                    task_type: t.task_type,
                    status: t.status,
                    error: t.error.clone(),
                })
                .collect(),
            completed_tasks,
            total_tasks,
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            message,
        }
    }

    /// One-line summary for listings.
    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.id,
            workflow_type: self.workflow_type,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Read-only view of one task inside a projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProjection {
    pub id: Uuid,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub error: Option<String>,
}

/// Read-only snapshot of a workflow, sufficient for a client to render
/// progress without reaching into engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowProjection {
    pub id: Uuid,
    pub workflow_type: WorkflowType,
    pub status: WorkflowStatus,
    pub tasks: Vec<TaskProjection>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub message: String,
}

/// One row in a workflow listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: Uuid,
    pub workflow_type: WorkflowType,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}
