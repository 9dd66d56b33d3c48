//! View-session orchestration
//!
//! Wires the submission flow (gate -> queue -> backend -> reconcile), the
//! cached history views, the selection model, and the batch action flow
//! together the way a dashboard page uses them. One session corresponds to
//! one view instance: it owns the cache and the per-family selections.

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::actions::{
    BatchAction, BatchActionCoordinator, BatchReport, ConfirmPolicy, Confirmation,
};
use crate::api::backend::MonitorBackend;
use crate::api::models::{
    CreateTasksRequest, MonitorInterval, Page, ResourceFamily, TaskKind, TaskListQuery,
    TaskListResponse, TaskRecord, TaskStatus,
};
use crate::export::{self, ExportArtifact, ExportFormat};
use crate::history::{HistoryQuery, HistoryRepository};
use crate::queue::TaskQueueStore;
use crate::selection::{MONITOR_ACTIONABLE, SelectionSet};
use crate::validation::ValidationGate;

/// Outcome of one submission batch, spanning gate rejections and per-URL
/// backend rejections.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    /// URLs that passed the gate and were sent to the backend.
    pub submitted: Vec<String>,
    /// Lines the gate rejected against the domain allowlist.
    pub invalid: Vec<String>,
    /// Tasks the backend confirmed.
    pub created: usize,
    /// URLs the backend rejected despite overall HTTP success.
    pub failed_urls: Vec<String>,
}

/// Per-family view state: the active query, the rows it produced, and the
/// selection over them.
struct ViewState {
    query: HistoryQuery,
    rows: Vec<TaskRecord>,
    selection: SelectionSet,
}

impl ViewState {
    fn new() -> Self {
        Self {
            query: HistoryQuery::default(),
            rows: Vec::new(),
            selection: SelectionSet::new(MONITOR_ACTIONABLE),
        }
    }
}

pub struct MonitorSession {
    backend: Arc<dyn MonitorBackend>,
    platform: String,
    gate: ValidationGate,
    coordinator: BatchActionCoordinator,
    history: HistoryRepository,
    pub queue: TaskQueueStore,
    posts: ViewState,
    influencers: ViewState,
}

impl MonitorSession {
    pub fn new(backend: Arc<dyn MonitorBackend>, platform: String, cache_capacity: usize) -> Self {
        Self {
            coordinator: BatchActionCoordinator::new(Arc::clone(&backend)),
            history: HistoryRepository::new(Arc::clone(&backend), cache_capacity),
            backend,
            platform,
            gate: ValidationGate::default(),
            queue: TaskQueueStore::new(),
            posts: ViewState::new(),
            influencers: ViewState::new(),
        }
    }

    fn view(&self, family: ResourceFamily) -> &ViewState {
        match family {
            ResourceFamily::Posts => &self.posts,
            ResourceFamily::Influencers => &self.influencers,
        }
    }

    fn view_mut(&mut self, family: ResourceFamily) -> &mut ViewState {
        match family {
            ResourceFamily::Posts => &mut self.posts,
            ResourceFamily::Influencers => &mut self.influencers,
        }
    }

    /// Submit a batch of URLs for recurring monitoring.
    pub async fn submit_monitor_batch(
        &mut self,
        input: &str,
        kind: TaskKind,
        interval: MonitorInterval,
    ) -> Result<SubmissionReport> {
        if !kind.is_recurring() {
            anyhow::bail!("{} tasks cannot carry a monitor interval", kind);
        }
        self.submit_batch(input, kind, Some(interval)).await
    }

    /// Submit a batch of URLs for one-shot content extraction.
    pub async fn submit_extract_batch(&mut self, input: &str) -> Result<SubmissionReport> {
        self.submit_batch(input, TaskKind::ContentExtract, None).await
    }

    async fn submit_batch(
        &mut self,
        input: &str,
        kind: TaskKind,
        interval: Option<MonitorInterval>,
    ) -> Result<SubmissionReport> {
        let partition = self.gate.check_batch(input)?;

        let ids = self.queue.enqueue(&partition.valid, kind);
        self.queue.mark_processing(&ids);

        let request = CreateTasksRequest {
            platform: self.platform.clone(),
            urls: partition.valid.clone(),
            task_type: kind,
            monitor_interval: interval,
        };
        match self.backend.create_tasks(&request).await {
            Ok(response) => {
                self.queue.resolve_submission(&ids, &response);
                info!(
                    "submitted {} url(s): {} created, {} rejected",
                    partition.valid.len(),
                    response.total_successful,
                    response.total_failed
                );
                Ok(SubmissionReport {
                    submitted: partition.valid,
                    invalid: partition.invalid,
                    created: response.total_successful as usize,
                    failed_urls: response.failed_urls,
                })
            }
            Err(e) => {
                self.queue.fail_all(&ids, &format!("{:#}", e));
                Err(e.context("Task submission failed"))
            }
        }
    }

    /// List tasks directly from the backend. The monitor task table is
    /// always fetched fresh; only history views go through the cache.
    pub async fn list_tasks(&self, query: &TaskListQuery) -> Result<TaskListResponse> {
        self.backend.list_tasks(query).await
    }

    /// Load one history page into the family's view, consulting the cache
    /// unless told otherwise, then reconcile the selection against the new
    /// visible rows.
    pub async fn load_history(
        &mut self,
        family: ResourceFamily,
        query: &HistoryQuery,
        use_cache: bool,
    ) -> Result<Page> {
        let page = self.history.fetch(family, query, use_cache).await?;
        let view = self.view_mut(family);
        view.query = query.clone();
        view.rows = page.items.clone();
        let visible = page.visible_ids();
        view.selection.reconcile(&visible);
        Ok(page)
    }

    /// Cache-bypassing refresh of the family's current query.
    pub async fn refresh_history(&mut self, family: ResourceFamily) -> Result<Page> {
        let query = self.view(family).query.clone();
        self.load_history(family, &query, false).await
    }

    /// Lifecycle hook for view activation: serve the current key from
    /// cache when present, fetch it otherwise.
    pub async fn on_activate(&mut self, family: ResourceFamily) -> Result<Page> {
        let query = self.view(family).query.clone();
        self.load_history(family, &query, true).await
    }

    /// Rows of the family's last loaded page.
    pub fn rows(&self, family: ResourceFamily) -> &[TaskRecord] {
        &self.view(family).rows
    }

    pub fn selection(&self, family: ResourceFamily) -> &SelectionSet {
        &self.view(family).selection
    }

    /// Replace the family's selection policy (e.g. restrict a history view
    /// to terminal rows). Clears the current selection.
    pub fn restrict_selection(&mut self, family: ResourceFamily, actionable: &[TaskStatus]) {
        self.view_mut(family).selection = SelectionSet::new(actionable);
    }

    /// Flip one visible row's selection.
    pub fn toggle_selection(&mut self, family: ResourceFamily, id: &str) -> Result<bool> {
        let status = self
            .view(family)
            .rows
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
            .ok_or_else(|| anyhow::anyhow!("Task {} is not visible in the {} view", id, family))?;
        self.view_mut(family).selection.toggle(id, status)
    }

    /// Select all visible, actionable rows.
    pub fn select_all(&mut self, family: ResourceFamily) {
        let ViewState { rows, selection, .. } = self.view_mut(family);
        selection.select_all(rows.iter());
    }

    pub fn clear_selection(&mut self, family: ResourceFamily) {
        self.view_mut(family).selection.clear();
    }

    /// Run a batch action over the family's selection. Multi-task runs
    /// require the confirmation step to proceed; `Ok(None)` means the user
    /// aborted. Afterwards, clean or not, the selection is cleared and
    /// the family is refreshed once, bypassing the cache.
    pub async fn run_batch_action(
        &mut self,
        family: ResourceFamily,
        action: BatchAction,
        confirm: &dyn ConfirmPolicy,
    ) -> Result<Option<BatchReport>> {
        let ids = self.view(family).selection.ids();
        if ids.is_empty() {
            anyhow::bail!("No tasks selected for {}", action);
        }
        if ids.len() > 1 && confirm.confirm(action, ids.len()) == Confirmation::Abort {
            return Ok(None);
        }

        let report = self.coordinator.execute(action, &ids).await?;

        self.view_mut(family).selection.clear();
        self.refresh_history(family).await?;
        Ok(Some(report))
    }

    /// Export the family's selected rows, in row order.
    pub fn export_selection(
        &self,
        family: ResourceFamily,
        format: ExportFormat,
    ) -> Result<ExportArtifact> {
        let view = self.view(family);
        if view.selection.is_empty() {
            anyhow::bail!("No tasks selected for export");
        }
        let rows: Vec<TaskRecord> = view
            .rows
            .iter()
            .filter(|r| view.selection.contains(&r.id))
            .cloned()
            .collect();
        export::export(&rows, format)
    }
}
