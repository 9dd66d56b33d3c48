//! Selection model for task rows
//!
//! A set of server task identifiers constrained to the rows currently
//! visible under the active filter, and to an actionable status subset.
//! Non-actionable rows are rejected here, at the data model, not merely
//! hidden by a UI.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::api::models::{TaskRecord, TaskStatus};

/// Statuses selectable in a history view (export / retry targets).
pub const TERMINAL_ACTIONABLE: &[TaskStatus] = &[
    TaskStatus::Completed,
    TaskStatus::Failed,
    TaskStatus::Cancelled,
];

/// Statuses selectable in a monitoring view (pause / resume / cancel
/// targets).
pub const MONITOR_ACTIONABLE: &[TaskStatus] = &[
    TaskStatus::Pending,
    TaskStatus::Queued,
    TaskStatus::Processing,
    TaskStatus::Monitoring,
    TaskStatus::Paused,
    TaskStatus::Failed,
];

#[derive(Debug, Clone)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
    actionable: Vec<TaskStatus>,
}

impl SelectionSet {
    pub fn new(actionable: &[TaskStatus]) -> Self {
        Self {
            ids: BTreeSet::new(),
            actionable: actionable.to_vec(),
        }
    }

    pub fn is_actionable(&self, status: TaskStatus) -> bool {
        self.actionable.contains(&status)
    }

    /// Flip one row's membership. Errors when the row's status is outside
    /// the actionable subset. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &str, status: TaskStatus) -> Result<bool> {
        if !self.is_actionable(status) {
            anyhow::bail!("Task {} has status {} and cannot be selected", id, status);
        }
        if self.ids.remove(id) {
            Ok(false)
        } else {
            self.ids.insert(id.to_string());
            Ok(true)
        }
    }

    /// Select every visible row whose status is actionable; the rest are
    /// skipped silently.
    pub fn select_all<'a>(&mut self, rows: impl IntoIterator<Item = &'a TaskRecord>) {
        for row in rows {
            if self.is_actionable(row.status) {
                self.ids.insert(row.id.clone());
            }
        }
    }

    /// Intersect the selection with the identifiers that are currently
    /// visible. Called whenever the filtered collection changes so stale
    /// selections never reference hidden rows. Idempotent.
    pub fn reconcile(&mut self, visible_ids: &[String]) {
        self.ids.retain(|id| visible_ids.iter().any(|v| v == id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected identifiers in stable (lexicographic) order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}
