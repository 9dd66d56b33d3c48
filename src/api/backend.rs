//! Backend seam for the monitoring service
//!
//! Everything the orchestration core needs from the server goes through
//! this trait, so the submission/history/action flows can be exercised
//! against an in-memory fake.

use async_trait::async_trait;

use super::models::{
    ControlResponse, CreateTasksRequest, CreateTasksResponse, Page, ResourceFamily, TaskListQuery,
    TaskListResponse,
};
use crate::history::HistoryQuery;

#[async_trait]
pub trait MonitorBackend: Send + Sync {
    /// Submit a batch of URLs for monitoring or extraction.
    async fn create_tasks(&self, request: &CreateTasksRequest)
    -> anyhow::Result<CreateTasksResponse>;

    /// List tasks with pagination and optional kind/status filters.
    async fn list_tasks(&self, query: &TaskListQuery) -> anyhow::Result<TaskListResponse>;

    /// Pause the given monitoring tasks.
    async fn pause_tasks(&self, task_ids: &[String]) -> anyhow::Result<ControlResponse>;

    /// Resume the given paused tasks.
    async fn resume_tasks(&self, task_ids: &[String]) -> anyhow::Result<ControlResponse>;

    /// Re-queue one failed task.
    async fn retry_task(&self, task_id: &str) -> anyhow::Result<ControlResponse>;

    /// Cancel one non-terminal task.
    async fn cancel_task(&self, task_id: &str) -> anyhow::Result<ControlResponse>;

    /// Fetch one page of a history family.
    async fn fetch_history(
        &self,
        family: ResourceFamily,
        query: &HistoryQuery,
    ) -> anyhow::Result<Page>;
}
