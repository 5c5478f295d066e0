//! The intent → workflow decision table.
//!
//! A fixed mapping keyed by `(category, action pattern)`. It is total over
//! [`IntentCategory`] — every category has at least a default outcome — and
//! deterministic: the same `(category, action)` always yields the same
//! workflow type and task template shape. An action that matches no known
//! pattern within its category falls back to the category default, which for
//! some categories is "no workflow" (the request is answered synchronously).
//!
//! Confidence never gates the decision: it is preserved and surfaced, but
//! nothing here branches on it.

use crate::domain::models::{Intent, IntentCategory, Task, TaskType, WorkflowType};

/// One task in a template. Dependencies are indices of earlier entries in
/// the same template, which makes cycles unrepresentable.
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    pub task_type: TaskType,
    pub depends_on: Vec<usize>,
}

/// The ordered task list instantiated for a workflow type.
#[derive(Debug, Clone)]
pub struct WorkflowBlueprint {
    pub workflow_type: WorkflowType,
    pub tasks: Vec<TaskTemplate>,
}

impl WorkflowBlueprint {
    fn new(workflow_type: WorkflowType) -> Self {
        Self {
            workflow_type,
            tasks: Vec::new(),
        }
    }

    /// Append a task template. Dependencies must reference earlier entries.
    fn task(mut self, task_type: TaskType, depends_on: &[usize]) -> Self {
        for &dep in depends_on {
            assert!(
                dep < self.tasks.len(),
                "task template dependency must reference an earlier task"
            );
        }
        self.tasks.push(TaskTemplate {
            task_type,
            depends_on: depends_on.to_vec(),
        });
        self
    }

    /// Instantiate the template into concrete tasks with fresh ids,
    /// resolving index dependencies to task ids. Declaration order is
    /// preserved.
    pub fn instantiate(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = Vec::with_capacity(self.tasks.len());
        for template in &self.tasks {
            let mut task = Task::new(template.task_type);
            for &dep in &template.depends_on {
                task = task.with_dependency(tasks[dep].id);
            }
            tasks.push(task);
        }
        tasks
    }
}

/// The fixed task template for each workflow type.
pub fn template(workflow_type: WorkflowType) -> WorkflowBlueprint {
    use TaskType::{
        AnalyzeGithubIssue, AnalyzeRequest, CreateSummary, CreateWorkItem, ExtractRequirements,
        GenerateDocument, GithubCreateIssue, IdentifyDependencies, JiraCreateTicket,
        NotifyStakeholders, SlackSendMessage, UpdateWorkItem,
    };

    match workflow_type {
        WorkflowType::CreateFeature => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(ExtractRequirements, &[0])
            .task(IdentifyDependencies, &[0])
            .task(GithubCreateIssue, &[1, 2])
            .task(NotifyStakeholders, &[3]),
        WorkflowType::AnalyzeMetrics => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(ExtractRequirements, &[0])
            .task(CreateSummary, &[1]),
        WorkflowType::CreateTicket => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(JiraCreateTicket, &[0]),
        WorkflowType::CreateTask => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(CreateWorkItem, &[0]),
        WorkflowType::ReviewItem => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeGithubIssue, &[])
            .task(CreateSummary, &[0])
            .task(UpdateWorkItem, &[1]),
        WorkflowType::GenerateReport => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(GenerateDocument, &[0])
            .task(CreateSummary, &[1])
            .task(SlackSendMessage, &[2]),
        WorkflowType::PlanStrategy => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(IdentifyDependencies, &[0])
            .task(GenerateDocument, &[1]),
        WorkflowType::LearnPattern => WorkflowBlueprint::new(workflow_type)
            .task(AnalyzeRequest, &[])
            .task(CreateSummary, &[0]),
    }
}

/// Pick a workflow type for the intent, or `None` when the request is
/// answered synchronously. Patterns are checked in a fixed order.
pub fn select_type(intent: &Intent) -> Option<WorkflowType> {
    let action = intent.action.to_lowercase();
    let matches = |patterns: &[&str]| patterns.iter().any(|p| action.contains(p));

    match intent.category {
        IntentCategory::Execution => {
            if matches(&["ticket", "bug", "jira"]) {
                Some(WorkflowType::CreateTicket)
            } else if matches(&["feature", "implement", "build"]) {
                Some(WorkflowType::CreateFeature)
            } else {
                Some(WorkflowType::CreateTask)
            }
        }
        IntentCategory::Analysis => {
            if matches(&["review", "pull request", "issue"]) {
                Some(WorkflowType::ReviewItem)
            } else if matches(&["metric", "kpi", "measure"]) {
                Some(WorkflowType::AnalyzeMetrics)
            } else {
                None
            }
        }
        IntentCategory::Synthesis => Some(WorkflowType::GenerateReport),
        IntentCategory::Strategy => {
            if matches(&["plan", "roadmap", "strateg", "prioriti"]) {
                Some(WorkflowType::PlanStrategy)
            } else {
                None
            }
        }
        IntentCategory::Learning => {
            if matches(&["pattern", "remember", "track"]) {
                Some(WorkflowType::LearnPattern)
            } else {
                None
            }
        }
    }
}

/// Full decision: workflow blueprint for the intent, or `None`.
pub fn plan(intent: &Intent) -> Option<WorkflowBlueprint> {
    select_type(intent).map(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(category: IntentCategory, action: &str) -> Intent {
        Intent::new(category, action, 0.9)
    }

    #[test]
    fn test_ticket_action_selects_create_ticket() {
        let blueprint = plan(&intent(IntentCategory::Execution, "create ticket")).unwrap();
        assert_eq!(blueprint.workflow_type, WorkflowType::CreateTicket);
        let types: Vec<TaskType> = blueprint.tasks.iter().map(|t| t.task_type).collect();
        assert_eq!(types, vec![TaskType::AnalyzeRequest, TaskType::JiraCreateTicket]);
        assert_eq!(blueprint.tasks[1].depends_on, vec![0]);
    }

    #[test]
    fn test_analysis_default_produces_no_workflow() {
        assert!(plan(&intent(IntentCategory::Analysis, "analyze trend")).is_none());
    }

    #[test]
    fn test_unmatched_execution_falls_back_to_create_task() {
        let blueprint = plan(&intent(IntentCategory::Execution, "do the thing")).unwrap();
        assert_eq!(blueprint.workflow_type, WorkflowType::CreateTask);
    }

    #[test]
    fn test_every_category_has_an_outcome() {
        // Totality: unmatched actions never panic in any category.
        for category in IntentCategory::ALL {
            let _ = plan(&intent(category, "zzz unmatched zzz"));
        }
    }

    #[test]
    fn test_decision_is_deterministic() {
        let a = intent(IntentCategory::Execution, "build the export feature");
        let first = plan(&a).unwrap();
        let second = plan(&a).unwrap();
        assert_eq!(first.workflow_type, second.workflow_type);
        let shape =
            |b: &WorkflowBlueprint| b.tasks.iter().map(|t| (t.task_type, t.depends_on.clone())).collect::<Vec<_>>();
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_confidence_does_not_gate_the_decision() {
        let low = Intent::new(IntentCategory::Execution, "create ticket", 0.01);
        let high = Intent::new(IntentCategory::Execution, "create ticket", 0.99);
        assert_eq!(plan(&low).unwrap().workflow_type, plan(&high).unwrap().workflow_type);
    }

    #[test]
    fn test_every_template_is_acyclic_and_ordered() {
        for workflow_type in WorkflowType::ALL {
            let blueprint = template(workflow_type);
            assert!(!blueprint.tasks.is_empty());
            for (i, task) in blueprint.tasks.iter().enumerate() {
                for &dep in &task.depends_on {
                    assert!(dep < i, "{workflow_type}: dependency must point backwards");
                }
            }
        }
    }

    #[test]
    fn test_every_task_type_appears_in_some_template() {
        let mut seen = std::collections::HashSet::new();
        for workflow_type in WorkflowType::ALL {
            for task in template(workflow_type).tasks {
                seen.insert(task.task_type);
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_instantiate_resolves_index_dependencies() {
        let tasks = template(WorkflowType::CreateFeature).instantiate();
        assert_eq!(tasks.len(), 5);
        // github issue depends on both middle tasks
        assert_eq!(tasks[3].depends_on, vec![tasks[1].id, tasks[2].id]);
        // fresh ids per instantiation
        let again = template(WorkflowType::CreateFeature).instantiate();
        assert_ne!(tasks[0].id, again[0].id);
    }
}
