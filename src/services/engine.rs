//! Orchestration engine: workflow registry, execution queue, and run loop.
//!
//! The engine owns the only shared mutable structure in the system — the
//! workflow registry. Each workflow sits behind its own lock, so one run
//! loop is the single writer for that workflow while other workflows
//! progress in parallel; readers take snapshot projections through the same
//! lock and never observe a half-applied task transition.
//!
//! Triggering execution is an explicit handoff, not a detached spawn: the
//! caller enqueues the workflow id on a bounded channel and returns, and a
//! worker pool owned by the engine drains the queue. Backpressure is the
//! channel bound; shutdown drops the sender and joins the workers, which
//! finish whatever is already queued.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult, TaskFailure};
use crate::domain::models::{
    EngineConfig, Intent, TaskDispatch, Workflow, WorkflowProjection, WorkflowStatus,
    WorkflowSummary,
};
use crate::domain::ports::{IntentClassifier, TaskHandler, TaskRunContext};
use crate::services::decision_table;
use crate::services::handler_registry::HandlerRegistry;
use crate::services::responder;

/// Outcome of [`OrchestrationEngine::process_message`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProcessedMessage {
    /// The trimmed inbound message.
    pub message: String,
    /// Its classification.
    pub intent: Intent,
    /// Acknowledgement text for the caller.
    pub response: String,
    /// Set when a workflow was created and triggered.
    pub workflow_id: Option<Uuid>,
}

struct EngineInner {
    workflows: RwLock<HashMap<Uuid, Arc<RwLock<Workflow>>>>,
    handlers: HandlerRegistry,
    dispatch_gate: Arc<Semaphore>,
    task_timeout: Duration,
}

/// The orchestration engine.
///
/// Create it inside a tokio runtime: construction starts the worker pool.
pub struct OrchestrationEngine {
    inner: Arc<EngineInner>,
    classifier: Arc<dyn IntentClassifier>,
    job_tx: Mutex<Option<mpsc::Sender<Uuid>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl OrchestrationEngine {
    /// Build the engine and start `worker_count` queue workers.
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        handlers: HandlerRegistry,
        config: &EngineConfig,
    ) -> Self {
        let inner = Arc::new(EngineInner {
            workflows: RwLock::new(HashMap::new()),
            handlers,
            dispatch_gate: Arc::new(Semaphore::new(config.max_concurrency)),
            task_timeout: Duration::from_secs(config.task_timeout_secs),
        });

        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity.max(1));
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers = (0..config.worker_count.max(1))
            .map(|worker| {
                let inner = Arc::clone(&inner);
                let job_rx = Arc::clone(&job_rx);
                tokio::spawn(async move {
                    loop {
                        let job = { job_rx.lock().await.recv().await };
                        match job {
                            Some(id) => run_workflow(&inner, id).await,
                            None => break,
                        }
                    }
                    debug!(worker, "engine worker stopped");
                })
            })
            .collect();

        Self {
            inner,
            classifier,
            job_tx: Mutex::new(Some(job_tx)),
            workers: Mutex::new(workers),
        }
    }

    /// Classify a message, create a workflow when the decision table
    /// warrants one, trigger it, and build the acknowledgement text.
    ///
    /// Empty or whitespace-only messages are rejected before the classifier
    /// is consulted.
    pub async fn process_message(&self, text: &str) -> EngineResult<ProcessedMessage> {
        let message = text.trim();
        if message.is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let intent = self.classifier.classify(message).await?;
        debug!(
            category = %intent.category,
            action = %intent.action,
            confidence = intent.confidence,
            "message classified"
        );

        match self.create_workflow_from_intent(&intent).await {
            Some(snapshot) => {
                self.execute_workflow(snapshot.id).await?;
                let response = responder::acknowledge(&intent, true);
                Ok(ProcessedMessage {
                    message: message.to_string(),
                    intent,
                    response,
                    workflow_id: Some(snapshot.id),
                })
            }
            None => {
                let response = responder::acknowledge(&intent, false);
                Ok(ProcessedMessage {
                    message: message.to_string(),
                    intent,
                    response,
                    workflow_id: None,
                })
            }
        }
    }

    /// Instantiate and register a workflow for this intent, if the decision
    /// table warrants one. Returns a snapshot of the registered workflow;
    /// callers never hold a reference into engine-owned state.
    pub async fn create_workflow_from_intent(&self, intent: &Intent) -> Option<Workflow> {
        let blueprint = decision_table::plan(intent)?;
        let workflow = Workflow::new(blueprint.workflow_type, intent.clone(), blueprint.instantiate());
        let snapshot = workflow.clone();

        self.inner
            .workflows
            .write()
            .await
            .insert(workflow.id, Arc::new(RwLock::new(workflow)));

        info!(
            workflow_id = %snapshot.id,
            workflow_type = %snapshot.workflow_type,
            tasks = snapshot.tasks.len(),
            "workflow registered"
        );
        Some(snapshot)
    }

    /// Enqueue a workflow for execution and return immediately.
    ///
    /// Duplicate triggers are tolerated: the run loop is a no-op for a
    /// workflow that is not Pending. Unknown ids are a lookup miss, never
    /// fatal to the engine.
    pub async fn execute_workflow(&self, id: Uuid) -> EngineResult<()> {
        if !self.inner.workflows.read().await.contains_key(&id) {
            return Err(EngineError::WorkflowNotFound(id));
        }

        let tx = self
            .job_tx
            .lock()
            .await
            .clone()
            .ok_or(EngineError::QueueClosed)?;
        tx.send(id).await.map_err(|_| EngineError::QueueClosed)?;
        Ok(())
    }

    /// Mark a workflow cancelled. Pending tasks stop being dispatched;
    /// in-flight task results are discarded for status purposes.
    pub async fn cancel_workflow(&self, id: Uuid) -> EngineResult<WorkflowProjection> {
        let handle = self
            .workflow_handle(id)
            .await
            .ok_or(EngineError::WorkflowNotFound(id))?;

        let mut workflow = handle.write().await;
        if workflow.cancel() {
            info!(workflow_id = %id, "workflow cancelled");
        }
        Ok(workflow.projection())
    }

    /// Snapshot of one workflow, or `None` for an unknown id.
    pub async fn get_workflow(&self, id: Uuid) -> Option<WorkflowProjection> {
        let handle = self.workflow_handle(id).await?;
        let workflow = handle.read().await;
        Some(workflow.projection())
    }

    /// Summaries of all registered workflows, oldest first.
    pub async fn list_workflows(&self) -> Vec<WorkflowSummary> {
        let handles: Vec<Arc<RwLock<Workflow>>> =
            self.inner.workflows.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(handle.read().await.summary());
        }
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// Close the queue and wait for the workers to drain outstanding jobs.
    pub async fn shutdown(&self) {
        self.job_tx.lock().await.take();
        let workers = {
            let mut guard = self.workers.lock().await;
            std::mem::take(&mut *guard)
        };
        for handle in workers {
            let _ = handle.await;
        }
    }

    async fn workflow_handle(&self, id: Uuid) -> Option<Arc<RwLock<Workflow>>> {
        self.inner.workflows.read().await.get(&id).cloned()
    }
}

/// Drive one workflow to a terminal state.
///
/// Each iteration: cascade skips from failed dependencies, dispatch every
/// ready task (declaration order), then apply the next finished handler's
/// outcome and re-evaluate readiness. A task handler doing I/O suspends
/// only its own future — other ready tasks in this and other workflows keep
/// dispatching.
async fn run_workflow(inner: &Arc<EngineInner>, id: Uuid) {
    let handle = match inner.workflows.read().await.get(&id).cloned() {
        Some(handle) => handle,
        None => {
            warn!(workflow_id = %id, "workflow vanished before execution");
            return;
        }
    };

    {
        let mut workflow = handle.write().await;
        if !workflow.begin() {
            debug!(workflow_id = %id, status = %workflow.status, "duplicate trigger ignored");
            return;
        }
        info!(workflow_id = %id, workflow_type = %workflow.workflow_type, "workflow started");
    }

    let mut in_flight: FuturesUnordered<BoxFuture<'static, (Uuid, Result<Value, TaskFailure>)>> =
        FuturesUnordered::new();

    loop {
        // Dispatch everything that is ready right now.
        let dispatches = {
            let mut workflow = handle.write().await;
            if workflow.status == WorkflowStatus::Cancelled {
                Vec::new()
            } else {
                workflow.cascade_skips();
                let ready = workflow.ready_tasks();
                let mut dispatches = Vec::with_capacity(ready.len());
                let mut aborted = false;
                for task_id in ready {
                    match workflow.start_task(task_id) {
                        Ok(dispatch) => dispatches.push(build_context(&workflow, dispatch)),
                        Err(reason) => {
                            // Broken invariant: fatal to this run, logged and aborted.
                            error!(
                                workflow_id = %id,
                                task_id = %task_id,
                                %reason,
                                "illegal task transition, aborting workflow run"
                            );
                            workflow.abort(format!("invalid transition for task {task_id}: {reason}"));
                            aborted = true;
                            break;
                        }
                    }
                }
                if aborted {
                    return;
                }
                dispatches
            }
        };

        for ctx in dispatches {
            let task_id = ctx.task_id;
            // Spawned eagerly: handlers start now, in declaration order, and a
            // panic is contained as a join error instead of escaping the loop.
            let join = tokio::spawn(dispatch_task(Arc::clone(inner), ctx));
            in_flight.push(Box::pin(async move {
                let outcome = match join.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(TaskFailure::new(format!(
                        "task handler panicked: {join_err}"
                    ))),
                };
                (task_id, outcome)
            }));
        }

        // No new work and nothing running: the workflow has converged.
        if in_flight.is_empty() {
            let mut workflow = handle.write().await;
            if workflow.status != WorkflowStatus::Cancelled {
                workflow.settle();
                match workflow.status {
                    WorkflowStatus::Completed => {
                        info!(workflow_id = %id, "workflow completed");
                    }
                    WorkflowStatus::Failed => {
                        warn!(
                            workflow_id = %id,
                            error = workflow.error.as_deref().unwrap_or("unknown"),
                            "workflow failed"
                        );
                    }
                    _ => {}
                }
            }
            return;
        }

        if let Some((task_id, outcome)) = in_flight.next().await {
            let mut workflow = handle.write().await;
            if workflow.status == WorkflowStatus::Cancelled {
                debug!(workflow_id = %id, task_id = %task_id, "result discarded after cancellation");
                continue;
            }
            match &outcome {
                Ok(_) => debug!(workflow_id = %id, task_id = %task_id, "task completed"),
                Err(failure) => {
                    warn!(workflow_id = %id, task_id = %task_id, error = %failure, "task failed");
                }
            }
            if let Err(reason) = workflow.apply_task_outcome(task_id, outcome) {
                error!(
                    workflow_id = %id,
                    task_id = %task_id,
                    %reason,
                    "illegal task transition, aborting workflow run"
                );
                workflow.abort(format!("invalid transition for task {task_id}: {reason}"));
                return;
            }
        }
    }
}

fn build_context(workflow: &Workflow, dispatch: TaskDispatch) -> TaskRunContext {
    TaskRunContext {
        task_id: dispatch.task_id,
        task_type: dispatch.task_type,
        action: workflow.intent.action.clone(),
        intent_context: workflow.intent.context.clone(),
        upstream: dispatch.upstream,
    }
}

/// Run one task handler under the engine-wide concurrency gate and timeout.
async fn dispatch_task(inner: Arc<EngineInner>, ctx: TaskRunContext) -> Result<Value, TaskFailure> {
    let _permit = inner
        .dispatch_gate
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| TaskFailure::new("engine dispatch gate closed"))?;

    let handler = inner.handlers.get(ctx.task_type).ok_or_else(|| {
        TaskFailure::new(format!(
            "no handler registered for task type {}",
            ctx.task_type.as_str()
        ))
    })?;

    match tokio::time::timeout(inner.task_timeout, handler.run(&ctx)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(TaskFailure::new(format!(
            "task timed out after {}s",
            inner.task_timeout.as_secs()
        ))),
    }
}
