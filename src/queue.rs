//! Local submission queue
//!
//! Tracks each submitted URL on the client before the backend's
//! authoritative record exists. Queue items are ephemeral, joined to a
//! server task by `server_task_id` once the creation response arrives,
//! and purged only by explicit user action.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;
use uuid::Uuid;

use crate::api::models::{CreateTasksResponse, TaskKind};

/// Client-local lifecycle, independent of the server task state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueItemStatus {
    Waiting,
    Processing,
    Completed,
    Failed,
}

impl QueueItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueItemStatus::Waiting => "waiting",
            QueueItemStatus::Processing => "processing",
            QueueItemStatus::Completed => "completed",
            QueueItemStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One locally tracked submission. The id is generated client-side and is
/// never the server task id.
#[derive(Debug, Clone)]
pub struct LocalQueueItem {
    pub id: Uuid,
    pub url: String,
    pub kind: TaskKind,
    pub status: QueueItemStatus,
    /// Foreign key to the server record, known once creation succeeds.
    pub server_task_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// In-memory, insertion-ordered store of local queue items. Both
/// submission flows append here; order within each flow is preserved.
#[derive(Debug, Default)]
pub struct TaskQueueStore {
    items: Vec<LocalQueueItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub waiting: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl TaskQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one waiting item per URL, returning the generated ids in
    /// the same order.
    pub fn enqueue(&mut self, urls: &[String], kind: TaskKind) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(urls.len());
        for url in urls {
            let id = Uuid::new_v4();
            self.items.push(LocalQueueItem {
                id,
                url: url.clone(),
                kind,
                status: QueueItemStatus::Waiting,
                server_task_id: None,
                error: None,
                created_at: Utc::now(),
            });
            ids.push(id);
        }
        debug!("enqueued {} {} item(s)", urls.len(), kind);
        ids
    }

    /// Move items to `processing` when their submission request goes out.
    pub fn mark_processing(&mut self, ids: &[Uuid]) {
        for item in self.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            item.status = QueueItemStatus::Processing;
        }
    }

    /// Reconcile in-flight items against the creation response: items whose
    /// URL got a server task id complete and link to it, items in
    /// `failed_urls` fail, anything the response does not mention fails
    /// with a generic error.
    pub fn resolve_submission(&mut self, ids: &[Uuid], response: &CreateTasksResponse) {
        for item in self.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            if let Some(task_id) = response.successful_tasks.get(&item.url) {
                item.status = QueueItemStatus::Completed;
                item.server_task_id = Some(task_id.clone());
            } else if response.failed_urls.contains(&item.url) {
                item.status = QueueItemStatus::Failed;
                item.error = Some("Rejected by backend".to_string());
            } else {
                item.status = QueueItemStatus::Failed;
                item.error = Some("Not acknowledged by backend".to_string());
            }
        }
    }

    /// Fail all given items with one error message (transport failures).
    pub fn fail_all(&mut self, ids: &[Uuid], error: &str) {
        for item in self.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            item.status = QueueItemStatus::Failed;
            item.error = Some(error.to_string());
        }
    }

    /// Drop completed items. Purging is always an explicit user action.
    pub fn clear_completed(&mut self) {
        self.items
            .retain(|i| i.status != QueueItemStatus::Completed);
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LocalQueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> QueueSummary {
        let mut summary = QueueSummary::default();
        for item in &self.items {
            match item.status {
                QueueItemStatus::Waiting => summary.waiting += 1,
                QueueItemStatus::Processing => summary.processing += 1,
                QueueItemStatus::Completed => summary.completed += 1,
                QueueItemStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn enqueue_preserves_insertion_order() {
        let mut store = TaskQueueStore::new();
        store.enqueue(&urls(&["u1", "u2"]), TaskKind::PostMonitor);
        store.enqueue(&urls(&["u3"]), TaskKind::InfluencerMonitor);
        let order: Vec<&str> = store.items().iter().map(|i| i.url.as_str()).collect();
        assert_eq!(order, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn resolve_distinguishes_accepted_and_rejected_urls() {
        let mut store = TaskQueueStore::new();
        let ids = store.enqueue(&urls(&["ok", "bad"]), TaskKind::ContentExtract);
        store.mark_processing(&ids);

        let response = CreateTasksResponse {
            total_successful: 1,
            total_failed: 1,
            failed_urls: vec!["bad".to_string()],
            successful_tasks: HashMap::from([("ok".to_string(), "t-1".to_string())]),
        };
        store.resolve_submission(&ids, &response);

        let ok = &store.items()[0];
        assert_eq!(ok.status, QueueItemStatus::Completed);
        assert_eq!(ok.server_task_id.as_deref(), Some("t-1"));

        let bad = &store.items()[1];
        assert_eq!(bad.status, QueueItemStatus::Failed);
        assert!(bad.error.is_some());
        assert!(bad.server_task_id.is_none());
    }

    #[test]
    fn clear_completed_keeps_failures() {
        let mut store = TaskQueueStore::new();
        let ids = store.enqueue(&urls(&["a", "b"]), TaskKind::PostMonitor);
        let response = CreateTasksResponse {
            total_successful: 1,
            total_failed: 1,
            failed_urls: vec!["b".to_string()],
            successful_tasks: HashMap::from([("a".to_string(), "t-a".to_string())]),
        };
        store.resolve_submission(&ids, &response);
        store.clear_completed();
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].url, "b");

        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn transport_failure_fails_whole_batch() {
        let mut store = TaskQueueStore::new();
        let ids = store.enqueue(&urls(&["a", "b"]), TaskKind::PostMonitor);
        store.mark_processing(&ids);
        store.fail_all(&ids, "connection refused");
        assert_eq!(store.summary().failed, 2);
        assert!(
            store
                .items()
                .iter()
                .all(|i| i.error.as_deref() == Some("connection refused"))
        );
    }
}
