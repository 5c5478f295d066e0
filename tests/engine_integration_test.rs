//! End-to-end tests for the orchestration engine: classification through
//! workflow execution, observed only through the public snapshot API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use factotum::{
    EngineConfig, EngineError, HandlerRegistry, Intent, IntentCategory, OrchestrationEngine,
    RuleClassifier, TaskFailure, TaskHandler, TaskRunContext, TaskStatus, TaskType,
    WorkflowProjection, WorkflowStatus, WorkflowType,
};

const ALL_TASK_TYPES: [TaskType; 12] = [
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
];

struct OkHandler;

#[async_trait]
impl TaskHandler for OkHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Ok(json!({"summary": format!("done: {}", ctx.task_type)}))
    }
}

struct FailingHandler(&'static str);

#[async_trait]
impl TaskHandler for FailingHandler {
    async fn run(&self, _ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        Err(TaskFailure::new(self.0))
    }
}

struct SlowHandler(u64);

#[async_trait]
impl TaskHandler for SlowHandler {
    async fn run(&self, _ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        tokio::time::sleep(Duration::from_millis(self.0)).await;
        Ok(json!(null))
    }
}

struct RecordingHandler {
    log: Arc<Mutex<Vec<TaskType>>>,
}

#[async_trait]
impl TaskHandler for RecordingHandler {
    async fn run(&self, ctx: &TaskRunContext) -> Result<Value, TaskFailure> {
        self.log.lock().await.push(ctx.task_type);
        Ok(json!(null))
    }
}

fn ok_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    for task_type in ALL_TASK_TYPES {
        registry.register(task_type, Arc::new(OkHandler));
    }
    registry
}

fn engine_with(registry: HandlerRegistry) -> OrchestrationEngine {
    OrchestrationEngine::new(Arc::new(RuleClassifier::new()), registry, &EngineConfig::default())
}

async fn wait_terminal(engine: &OrchestrationEngine, id: Uuid) -> WorkflowProjection {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let projection = engine.get_workflow(id).await.expect("workflow registered");
        if projection.status.is_terminal() {
            return projection;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "workflow did not reach a terminal state in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn task(projection: &WorkflowProjection, task_type: TaskType) -> TaskStatus {
    projection
        .tasks
        .iter()
        .find(|t| t.task_type == task_type)
        .unwrap_or_else(|| panic!("no {task_type} task"))
        .status
}

#[tokio::test(flavor = "multi_thread")]
async fn ticket_request_runs_a_create_ticket_workflow() {
    let engine = engine_with(ok_registry());

    let processed = engine
        .process_message("Create a ticket for the login bug")
        .await
        .unwrap();
    assert_eq!(processed.intent.category, IntentCategory::Execution);
    assert_eq!(processed.intent.action, "create ticket");
    assert!(processed.response.contains("started a workflow"));

    let id = processed.workflow_id.expect("workflow created");
    let projection = wait_terminal(&engine, id).await;

    assert_eq!(projection.workflow_type, WorkflowType::CreateTicket);
    assert_eq!(projection.status, WorkflowStatus::Completed);
    let types: Vec<TaskType> = projection.tasks.iter().map(|t| t.task_type).collect();
    assert_eq!(types, vec![TaskType::AnalyzeRequest, TaskType::JiraCreateTicket]);
    assert!(projection.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert_eq!(projection.message, "Workflow completed successfully!");

    engine.shutdown().await;
}

#[tokio::test]
async fn analysis_question_is_answered_without_a_workflow() {
    let engine = engine_with(ok_registry());

    let processed = engine
        .process_message("What's our retention trend?")
        .await
        .unwrap();
    assert_eq!(processed.intent.category, IntentCategory::Analysis);
    assert!(processed.workflow_id.is_none());
    assert!(processed.response.contains("analyze"));
    assert!(engine.list_workflows().await.is_empty());

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_task_skips_dependents_and_spares_independent_branches() {
    // CreateFeature: analyze -> {extract, identify} -> github -> notify
    let mut registry = ok_registry();
    registry.register(
        TaskType::ExtractRequirements,
        Arc::new(FailingHandler("requirements backend down")),
    );
    let engine = engine_with(registry);

    let processed = engine
        .process_message("Build the export feature")
        .await
        .unwrap();
    let id = processed.workflow_id.expect("workflow created");
    let projection = wait_terminal(&engine, id).await;

    assert_eq!(projection.workflow_type, WorkflowType::CreateFeature);
    assert_eq!(projection.status, WorkflowStatus::Failed);
    assert_eq!(projection.error.as_deref(), Some("requirements backend down"));
    assert_eq!(projection.message, "Workflow failed: requirements backend down");

    assert_eq!(task(&projection, TaskType::AnalyzeRequest), TaskStatus::Completed);
    assert_eq!(task(&projection, TaskType::ExtractRequirements), TaskStatus::Failed);
    // independent sibling still completes
    assert_eq!(task(&projection, TaskType::IdentifyDependencies), TaskStatus::Completed);
    // direct and transitive dependents are skipped, never run
    assert_eq!(task(&projection, TaskType::GithubCreateIssue), TaskStatus::Skipped);
    assert_eq!(task(&projection, TaskType::NotifyStakeholders), TaskStatus::Skipped);

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn jira_network_error_fails_the_workflow_with_that_message() {
    let mut registry = ok_registry();
    registry.register(
        TaskType::JiraCreateTicket,
        Arc::new(FailingHandler("network error: connection refused")),
    );
    let engine = engine_with(registry);

    let processed = engine
        .process_message("Create a ticket for the login bug")
        .await
        .unwrap();
    let id = processed.workflow_id.unwrap();
    let projection = wait_terminal(&engine, id).await;

    assert_eq!(projection.status, WorkflowStatus::Failed);
    assert_eq!(
        projection.error.as_deref(),
        Some("network error: connection refused")
    );
    assert_eq!(task(&projection, TaskType::JiraCreateTicket), TaskStatus::Failed);

    engine.shutdown().await;
}

#[tokio::test]
async fn unknown_workflow_id_is_a_lookup_miss_not_a_crash() {
    let engine = engine_with(ok_registry());
    let missing = Uuid::new_v4();

    assert!(engine.get_workflow(missing).await.is_none());
    assert!(matches!(
        engine.execute_workflow(missing).await,
        Err(EngineError::WorkflowNotFound(id)) if id == missing
    ));

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_trigger_runs_each_task_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    for task_type in ALL_TASK_TYPES {
        registry.register(task_type, Arc::new(RecordingHandler { log: Arc::clone(&log) }));
    }
    let engine = engine_with(registry);

    let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
    let workflow = engine.create_workflow_from_intent(&intent).await.unwrap();

    engine.execute_workflow(workflow.id).await.unwrap();
    engine.execute_workflow(workflow.id).await.unwrap();

    let projection = wait_terminal(&engine, workflow.id).await;
    assert_eq!(projection.status, WorkflowStatus::Completed);

    // let any duplicate run settle before counting
    tokio::time::sleep(Duration::from_millis(100)).await;
    let log = log.lock().await;
    assert_eq!(log.len(), 2, "each task must run exactly once: {log:?}");

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_stops_dispatch_and_discards_late_results() {
    let mut registry = ok_registry();
    registry.register(TaskType::AnalyzeRequest, Arc::new(SlowHandler(400)));
    let engine = engine_with(registry);

    let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
    let workflow = engine.create_workflow_from_intent(&intent).await.unwrap();
    engine.execute_workflow(workflow.id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let projection = engine.cancel_workflow(workflow.id).await.unwrap();
    assert_eq!(projection.status, WorkflowStatus::Cancelled);

    // the in-flight handler finishes, but its result is discarded
    tokio::time::sleep(Duration::from_millis(500)).await;
    let projection = engine.get_workflow(workflow.id).await.unwrap();
    assert_eq!(projection.status, WorkflowStatus::Cancelled);
    assert_eq!(task(&projection, TaskType::JiraCreateTicket), TaskStatus::Pending);
    assert_eq!(projection.completed_tasks, 0);

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn workflows_execute_in_parallel_across_the_pool() {
    let mut registry = HandlerRegistry::new();
    for task_type in ALL_TASK_TYPES {
        registry.register(task_type, Arc::new(SlowHandler(300)));
    }
    let engine = engine_with(registry);

    let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
    let first = engine.create_workflow_from_intent(&intent).await.unwrap();
    let second = engine.create_workflow_from_intent(&intent).await.unwrap();

    let started = tokio::time::Instant::now();
    engine.execute_workflow(first.id).await.unwrap();
    engine.execute_workflow(second.id).await.unwrap();

    let first = wait_terminal(&engine, first.id).await;
    let second = wait_terminal(&engine, second.id).await;
    let elapsed = started.elapsed();

    assert_eq!(first.status, WorkflowStatus::Completed);
    assert_eq!(second.status, WorkflowStatus::Completed);
    // two tasks of 300ms each per workflow: serial would be ~1200ms
    assert!(elapsed < Duration::from_millis(1100), "took {elapsed:?}");

    engine.shutdown().await;
}

#[tokio::test]
async fn simultaneously_ready_tasks_dispatch_in_declaration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    for task_type in ALL_TASK_TYPES {
        registry.register(task_type, Arc::new(RecordingHandler { log: Arc::clone(&log) }));
    }
    // max_concurrency 1 serializes handlers in dispatch order
    let config = EngineConfig {
        max_concurrency: 1,
        ..EngineConfig::default()
    };
    let engine = OrchestrationEngine::new(Arc::new(RuleClassifier::new()), registry, &config);

    let intent = Intent::new(IntentCategory::Execution, "build feature", 0.9);
    let workflow = engine.create_workflow_from_intent(&intent).await.unwrap();
    engine.execute_workflow(workflow.id).await.unwrap();
    let projection = wait_terminal(&engine, workflow.id).await;
    assert_eq!(projection.status, WorkflowStatus::Completed);

    let log = log.lock().await;
    assert_eq!(
        *log,
        vec![
            TaskType::AnalyzeRequest,
            TaskType::ExtractRequirements,
            TaskType::IdentifyDependencies,
            TaskType::GithubCreateIssue,
            TaskType::NotifyStakeholders,
        ]
    );

    engine.shutdown().await;
}

#[tokio::test]
async fn listing_returns_summaries_oldest_first() {
    let engine = engine_with(ok_registry());

    let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
    let first = engine.create_workflow_from_intent(&intent).await.unwrap();
    let second = engine.create_workflow_from_intent(&intent).await.unwrap();

    let summaries = engine.list_workflows().await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, first.id);
    assert_eq!(summaries[1].id, second.id);
    assert_eq!(summaries[0].workflow_type, WorkflowType::CreateTicket);

    engine.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_handler_fails_the_task_not_the_engine() {
    // bind nothing: every dispatch reports "no handler registered"
    let engine = engine_with(HandlerRegistry::new());

    let intent = Intent::new(IntentCategory::Execution, "create ticket", 0.9);
    let workflow = engine.create_workflow_from_intent(&intent).await.unwrap();
    engine.execute_workflow(workflow.id).await.unwrap();

    let projection = wait_terminal(&engine, workflow.id).await;
    assert_eq!(projection.status, WorkflowStatus::Failed);
    assert!(projection
        .error
        .as_deref()
        .unwrap()
        .contains("no handler registered"));

    engine.shutdown().await;
}
