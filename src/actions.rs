//! Bulk control actions over selected tasks
//!
//! Applies pause/resume/retry/cancel to a set of task identifiers, one
//! independent control call per identifier, dispatched all at once and
//! awaited together. Partial failure is aggregated into a report, never
//! rolled back; each control call is independently idempotent on the
//! backend.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use log::{info, warn};

use crate::api::backend::MonitorBackend;
use crate::api::models::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Pause,
    Resume,
    Retry,
    Cancel,
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Pause => "pause",
            BatchAction::Resume => "resume",
            BatchAction::Retry => "retry",
            BatchAction::Cancel => "cancel",
        }
    }

    /// Whether the backend's transition table accepts this action for a
    /// row in the given status.
    pub fn applies_to(&self, status: TaskStatus) -> bool {
        match self {
            BatchAction::Pause => status.can_transition_to(TaskStatus::Paused),
            BatchAction::Resume => status == TaskStatus::Paused,
            BatchAction::Retry => status.can_transition_to(TaskStatus::Queued),
            BatchAction::Cancel => status.can_transition_to(TaskStatus::Cancelled),
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision returned by a confirmation step before a multi-task action
/// runs. Decoupled from any particular prompt mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Abort,
}

pub trait ConfirmPolicy {
    fn confirm(&self, action: BatchAction, count: usize) -> Confirmation;
}

/// Always proceeds. For non-interactive callers and tests.
pub struct AutoConfirm;

impl ConfirmPolicy for AutoConfirm {
    fn confirm(&self, _action: BatchAction, _count: usize) -> Confirmation {
        Confirmation::Proceed
    }
}

#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub task_id: String,
    pub error: String,
}

/// Aggregate outcome of one batch action. Successes already applied by
/// the backend stay applied regardless of failures.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub action: BatchAction,
    pub attempted: usize,
    pub succeeded: Vec<String>,
    /// Failures in input order, with the server-provided error detail.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchActionCoordinator {
    backend: Arc<dyn MonitorBackend>,
}

impl BatchActionCoordinator {
    pub fn new(backend: Arc<dyn MonitorBackend>) -> Self {
        Self { backend }
    }

    /// Run one action over a non-empty identifier set. All calls are
    /// dispatched concurrently; ordering carries no semantic meaning.
    pub async fn execute(&self, action: BatchAction, task_ids: &[String]) -> Result<BatchReport> {
        if task_ids.is_empty() {
            anyhow::bail!("No tasks selected for {}", action);
        }

        info!("dispatching {} for {} task(s)", action, task_ids.len());
        let calls = task_ids.iter().map(|id| {
            let backend = Arc::clone(&self.backend);
            let id = id.clone();
            async move {
                let outcome = match action {
                    BatchAction::Pause => {
                        backend.pause_tasks(std::slice::from_ref(&id)).await.map(|_| ())
                    }
                    BatchAction::Resume => {
                        backend.resume_tasks(std::slice::from_ref(&id)).await.map(|_| ())
                    }
                    BatchAction::Retry => backend.retry_task(&id).await.map(|_| ()),
                    BatchAction::Cancel => backend.cancel_task(&id).await.map(|_| ()),
                };
                (id, outcome)
            }
        });

        let outcomes = join_all(calls).await;

        let mut report = BatchReport {
            action,
            attempted: task_ids.len(),
            succeeded: Vec::new(),
            failures: Vec::new(),
        };
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    warn!("{} failed for task {}: {:#}", action, id, e);
                    report.failures.push(BatchFailure {
                        task_id: id,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}
