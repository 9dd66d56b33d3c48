//! End-to-end orchestration tests against an in-memory backend fake:
//! submission batches, cache behavior, batch actions with partial failure,
//! and selection reconciliation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use watchdesk::actions::{AutoConfirm, BatchAction, ConfirmPolicy, Confirmation};
use watchdesk::api::backend::MonitorBackend;
use watchdesk::api::models::{
    ControlResponse, CreateTasksRequest, CreateTasksResponse, MonitorInterval, Page,
    ResourceFamily, TaskKind, TaskListQuery, TaskListResponse, TaskRecord, TaskStatus,
};
use watchdesk::history::HistoryQuery;
use watchdesk::selection::TERMINAL_ACTIONABLE;
use watchdesk::session::MonitorSession;
use watchdesk::validation::ValidationError;

fn record(id: &str, status: TaskStatus) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        kind: TaskKind::PostMonitor,
        url: format!("https://www.xiaohongshu.com/explore/{}", id),
        status,
        monitor_interval: Some(MonitorInterval::Daily),
        progress: if status.is_active() { 40 } else { 100 },
        error: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        result: None,
    }
}

/// Configurable backend fake. Control calls fail for ids in
/// `failing_ids`; every network round-trip is counted.
struct MockBackend {
    create_calls: AtomicUsize,
    history_calls: AtomicUsize,
    control_calls: Mutex<Vec<(&'static str, String)>>,
    failing_ids: HashSet<String>,
    rows: Mutex<Vec<TaskRecord>>,
    last_create: Mutex<Option<CreateTasksRequest>>,
}

impl MockBackend {
    fn new(rows: Vec<TaskRecord>) -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            control_calls: Mutex::new(Vec::new()),
            failing_ids: HashSet::new(),
            rows: Mutex::new(rows),
            last_create: Mutex::new(None),
        }
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    fn control(&self, verb: &'static str, id: &str) -> Result<ControlResponse> {
        self.control_calls.lock().unwrap().push((verb, id.to_string()));
        if self.failing_ids.contains(id) {
            anyhow::bail!("Task {} is in a terminal state", id);
        }
        Ok(ControlResponse {
            message: format!("{} accepted", verb),
            task_ids: vec![id.to_string()],
            status: None,
        })
    }
}

#[async_trait]
impl MonitorBackend for MockBackend {
    async fn create_tasks(&self, request: &CreateTasksRequest) -> Result<CreateTasksResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create.lock().unwrap() = Some(request.clone());
        let successful_tasks: HashMap<String, String> = request
            .urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), format!("t-{}", i + 1)))
            .collect();
        Ok(CreateTasksResponse {
            total_successful: successful_tasks.len() as u32,
            total_failed: 0,
            failed_urls: vec![],
            successful_tasks,
        })
    }

    async fn list_tasks(&self, query: &TaskListQuery) -> Result<TaskListResponse> {
        let rows = self.rows.lock().unwrap().clone();
        Ok(TaskListResponse {
            total: rows.len() as u64,
            tasks: rows,
            page: query.page,
            limit: query.limit,
            total_pages: 1,
        })
    }

    async fn pause_tasks(&self, task_ids: &[String]) -> Result<ControlResponse> {
        self.control("pause", &task_ids[0])
    }

    async fn resume_tasks(&self, task_ids: &[String]) -> Result<ControlResponse> {
        self.control("resume", &task_ids[0])
    }

    async fn retry_task(&self, task_id: &str) -> Result<ControlResponse> {
        self.control("retry", task_id)
    }

    async fn cancel_task(&self, task_id: &str) -> Result<ControlResponse> {
        self.control("cancel", task_id)
    }

    async fn fetch_history(
        &self,
        _family: ResourceFamily,
        query: &HistoryQuery,
    ) -> Result<Page> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        let items: Vec<TaskRecord> = rows
            .iter()
            .filter(|r| query.status_filter.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(Page {
            total: items.len() as u64,
            items,
            page: query.page,
            limit: query.limit,
            total_pages: 1,
        })
    }
}

fn session_over(backend: Arc<MockBackend>) -> MonitorSession {
    MonitorSession::new(backend, "xhs".to_string(), 8)
}

/// Scenario A: a mixed batch submits only its valid URLs and reports the
/// backend's success count.
#[tokio::test]
async fn mixed_batch_submits_only_valid_urls() -> Result<()> {
    let backend = Arc::new(MockBackend::new(vec![]));
    let mut session = session_over(Arc::clone(&backend));

    let input = "https://www.xiaohongshu.com/explore/1\n\
                 https://www.xiaohongshu.com/explore/2\n\
                 http://xhslink.com/3\n\
                 https://evil.example.com/4";
    let report = session
        .submit_monitor_batch(input, TaskKind::PostMonitor, MonitorInterval::Daily)
        .await?;

    assert_eq!(report.submitted.len(), 3);
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.created, 3);

    let request = backend.last_create.lock().unwrap().clone().unwrap();
    assert_eq!(request.urls.len(), 3);
    assert!(request.urls.iter().all(|u| !u.contains("evil")));
    Ok(())
}

/// Scenario B: an oversized batch is rejected before any network call,
/// with an error distinct from invalid-URL rejection.
#[tokio::test]
async fn oversized_batch_rejected_before_network() {
    let backend = Arc::new(MockBackend::new(vec![]));
    let mut session = session_over(Arc::clone(&backend));

    let input = (0..21)
        .map(|i| format!("https://www.xiaohongshu.com/explore/{}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let err = session
        .submit_monitor_batch(&input, TaskKind::PostMonitor, MonitorInterval::Hourly)
        .await
        .unwrap_err();

    match err.downcast_ref::<ValidationError>() {
        Some(ValidationError::BatchTooLarge { count, cap }) => {
            assert_eq!(*count, 21);
            assert_eq!(*cap, 20);
        }
        other => panic!("expected BatchTooLarge, got {:?}", other),
    }
    assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
}

/// Scenario C: partial failure in a cancel batch is reported per id,
/// the selection ends empty, and exactly one forced refresh runs.
#[tokio::test]
async fn partial_cancel_failure_is_aggregated() -> Result<()> {
    let rows: Vec<TaskRecord> = (1..=5)
        .map(|i| record(&format!("t-{}", i), TaskStatus::Monitoring))
        .collect();
    let backend = Arc::new(MockBackend::new(rows).failing("t-3"));
    let mut session = session_over(Arc::clone(&backend));

    session
        .load_history(ResourceFamily::Posts, &HistoryQuery::default(), true)
        .await?;
    session.select_all(ResourceFamily::Posts);
    assert_eq!(session.selection(ResourceFamily::Posts).len(), 5);

    let calls_before = backend.history_calls.load(Ordering::SeqCst);
    let report = session
        .run_batch_action(ResourceFamily::Posts, BatchAction::Cancel, &AutoConfirm)
        .await?
        .expect("action should not be aborted");

    assert_eq!(report.success_count(), 4);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].task_id, "t-3");
    assert!(report.failures[0].error.contains("terminal state"));

    assert!(session.selection(ResourceFamily::Posts).is_empty());
    assert_eq!(backend.history_calls.load(Ordering::SeqCst), calls_before + 1);
    Ok(())
}

/// Scenario D: a second fetch with the identical query key and caching
/// enabled issues zero network calls and returns the cached page.
#[tokio::test]
async fn identical_query_served_from_cache() -> Result<()> {
    let rows = vec![record("t-1", TaskStatus::Completed)];
    let backend = Arc::new(MockBackend::new(rows));
    let mut session = session_over(Arc::clone(&backend));

    let query = HistoryQuery::default();
    let first = session
        .load_history(ResourceFamily::Posts, &query, true)
        .await?;
    let second = session
        .load_history(ResourceFamily::Posts, &query, true)
        .await?;

    assert_eq!(backend.history_calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.total, second.total);
    assert_eq!(first.visible_ids(), second.visible_ids());

    // A user-triggered refresh bypasses the cache for the same key.
    session.refresh_history(ResourceFamily::Posts).await?;
    assert_eq!(backend.history_calls.load(Ordering::SeqCst), 2);
    Ok(())
}

/// Scenario E: a view restricted to terminal statuses never selects an
/// active row, even through select-all.
#[tokio::test]
async fn processing_rows_excluded_from_terminal_select_all() -> Result<()> {
    let rows = vec![
        record("t-1", TaskStatus::Completed),
        record("t-2", TaskStatus::Processing),
        record("t-3", TaskStatus::Cancelled),
    ];
    let backend = Arc::new(MockBackend::new(rows));
    let mut session = session_over(backend);

    session
        .load_history(ResourceFamily::Posts, &HistoryQuery::default(), true)
        .await?;
    session.restrict_selection(ResourceFamily::Posts, TERMINAL_ACTIONABLE);
    session.select_all(ResourceFamily::Posts);

    let selection = session.selection(ResourceFamily::Posts);
    assert_eq!(selection.len(), 2);
    assert!(!selection.contains("t-2"));
    assert!(
        session
            .toggle_selection(ResourceFamily::Posts, "t-2")
            .is_err()
    );
    Ok(())
}

/// Changing the status filter changes the visible set; stale selections
/// are reconciled away automatically.
#[tokio::test]
async fn filter_change_reconciles_selection() -> Result<()> {
    let rows = vec![
        record("t-1", TaskStatus::Monitoring),
        record("t-2", TaskStatus::Paused),
    ];
    let backend = Arc::new(MockBackend::new(rows));
    let mut session = session_over(backend);

    session
        .load_history(ResourceFamily::Posts, &HistoryQuery::default(), true)
        .await?;
    session.select_all(ResourceFamily::Posts);
    assert_eq!(session.selection(ResourceFamily::Posts).len(), 2);

    let paused_only = HistoryQuery {
        status_filter: Some(TaskStatus::Paused),
        ..HistoryQuery::default()
    };
    session
        .load_history(ResourceFamily::Posts, &paused_only, true)
        .await?;

    let selection = session.selection(ResourceFamily::Posts);
    assert_eq!(selection.ids(), vec!["t-2"]);
    Ok(())
}

/// An aborted confirmation leaves the selection and the backend untouched.
#[tokio::test]
async fn aborted_confirmation_issues_no_calls() -> Result<()> {
    struct AlwaysAbort;
    impl ConfirmPolicy for AlwaysAbort {
        fn confirm(&self, _action: BatchAction, _count: usize) -> Confirmation {
            Confirmation::Abort
        }
    }

    let rows = vec![
        record("t-1", TaskStatus::Monitoring),
        record("t-2", TaskStatus::Monitoring),
    ];
    let backend = Arc::new(MockBackend::new(rows));
    let mut session = session_over(Arc::clone(&backend));

    session
        .load_history(ResourceFamily::Posts, &HistoryQuery::default(), true)
        .await?;
    session.select_all(ResourceFamily::Posts);

    let outcome = session
        .run_batch_action(ResourceFamily::Posts, BatchAction::Pause, &AlwaysAbort)
        .await?;
    assert!(outcome.is_none());
    assert_eq!(session.selection(ResourceFamily::Posts).len(), 2);
    assert!(backend.control_calls.lock().unwrap().is_empty());
    Ok(())
}

/// The two resource families fetch and cache independently.
#[tokio::test]
async fn families_cache_independently() -> Result<()> {
    let rows = vec![record("t-1", TaskStatus::Monitoring)];
    let backend = Arc::new(MockBackend::new(rows));
    let mut session = session_over(Arc::clone(&backend));

    let query = HistoryQuery::default();
    session
        .load_history(ResourceFamily::Posts, &query, true)
        .await?;
    session
        .load_history(ResourceFamily::Influencers, &query, true)
        .await?;
    assert_eq!(backend.history_calls.load(Ordering::SeqCst), 2);

    // Re-activating either view is then free.
    session.on_activate(ResourceFamily::Posts).await?;
    session.on_activate(ResourceFamily::Influencers).await?;
    assert_eq!(backend.history_calls.load(Ordering::SeqCst), 2);
    Ok(())
}
