//! API constants and endpoint builders for the monitoring backend

/// Monitoring backend API version
pub const API_VERSION: &str = "v1";

/// Base API path
pub const API_BASE_PATH: &str = "/api";

/// Platform identifier sent with every task-creating and task-listing call.
pub const DEFAULT_PLATFORM: &str = "xhs";

/// Hard cap on URLs per submission batch, enforced before any network call.
pub const MAX_BATCH_URLS: usize = 20;

/// Domain fragments that identify a submittable platform URL.
pub const PLATFORM_DOMAINS: &[&str] = &["xiaohongshu.com", "xhslink.com"];

/// Default page size for task and history listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default capacity of the query-keyed history cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Full API path with version
pub fn api_path() -> String {
    format!("{}/{}", API_BASE_PATH, API_VERSION)
}

/// Build the batch task creation endpoint URL
pub fn create_tasks_endpoint(base_url: &str) -> String {
    format!("{}{}/tasks/batch", base_url, api_path())
}

/// Build the task list endpoint URL
pub fn list_tasks_endpoint(base_url: &str) -> String {
    format!("{}{}/tasks", base_url, api_path())
}

/// Build a bulk control endpoint URL (`pause`, `resume`, `retry`)
pub fn control_endpoint(base_url: &str, verb: &str) -> String {
    format!("{}{}/tasks/{}", base_url, api_path(), verb)
}

/// Build the cancel endpoint URL for one task
pub fn cancel_endpoint(base_url: &str, task_id: &str) -> String {
    format!("{}{}/tasks/{}", base_url, api_path(), task_id)
}

/// Build a history endpoint URL (`posts`, `influencers`)
pub fn history_endpoint(base_url: &str, family: &str) -> String {
    format!("{}{}/history/{}", base_url, api_path(), family)
}
