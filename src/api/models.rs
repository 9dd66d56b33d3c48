//! Wire models for the monitoring backend API
//!
//! Task records are server-authoritative: the client never mutates a status
//! locally, it issues control requests and re-fetches to observe the result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Lifecycle status of a monitoring/extraction task.
///
/// `Completed` and `Cancelled` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Queued,
    Processing,
    Monitoring,
    Paused,
    Failed,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Statuses where `progress` is meaningful.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TaskStatus::Pending | TaskStatus::Queued | TaskStatus::Processing
        )
    }

    /// The backend's transition table. The client only consults this to
    /// decide which control requests make sense for a row.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Pending | Queued, Processing) => true,
            (Processing, Monitoring) => true,
            (Processing, Completed) => true,
            (Processing, Failed) => true,
            (Monitoring, Paused) => true,
            (Paused, Monitoring) => true,
            (Failed, Queued) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Queued => "QUEUED",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Monitoring => "MONITORING",
            TaskStatus::Paused => "PAUSED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Recurring collection of a single post's engagement data.
    #[value(name = "post_monitor")]
    PostMonitor,
    /// Recurring collection of an account's profile data.
    #[value(name = "influencer_monitor")]
    InfluencerMonitor,
    /// One-shot extraction of a post's content.
    #[value(name = "content_extract")]
    ContentExtract,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::PostMonitor => "post_monitor",
            TaskKind::InfluencerMonitor => "influencer_monitor",
            TaskKind::ContentExtract => "content_extract",
        }
    }

    /// One-shot kinds never carry a monitor interval.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, TaskKind::ContentExtract)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection interval for recurring monitors. `None` on a task means
/// one-shot extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum MonitorInterval {
    #[serde(rename = "1m")]
    #[value(name = "1m")]
    Minute,
    #[serde(rename = "1h")]
    #[value(name = "1h")]
    Hourly,
    #[serde(rename = "4h")]
    #[value(name = "4h")]
    FourHours,
    #[serde(rename = "24h")]
    #[value(name = "24h")]
    Daily,
    #[serde(rename = "7d")]
    #[value(name = "7d")]
    Weekly,
}

impl MonitorInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorInterval::Minute => "1m",
            MonitorInterval::Hourly => "1h",
            MonitorInterval::FourHours => "4h",
            MonitorInterval::Daily => "24h",
            MonitorInterval::Weekly => "7d",
        }
    }
}

impl fmt::Display for MonitorInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-authoritative record of one monitoring/extraction task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(rename = "task_type")]
    pub kind: TaskKind,
    pub url: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub monitor_interval: Option<MonitorInterval>,
    /// 0-100, meaningful only while the task is active.
    #[serde(default)]
    pub progress: u8,
    /// Present only when the task has failed.
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Opaque result payload, present once the backend has data for us.
    #[serde(default)]
    pub result: Option<Value>,
}

impl TaskRecord {
    /// Parse the result payload of a content task. Missing payloads and
    /// missing sub-fields degrade to `None`/empty rather than erroring.
    pub fn extracted_content(&self) -> Option<ExtractedContent> {
        let value = self.result.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Parse the result payload of an influencer task.
    pub fn influencer_snapshot(&self) -> Option<InfluencerSnapshot> {
        let value = self.result.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }
}

/// Author block attached to extracted content. Optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Structured payload of a completed post/extraction task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw engagement counts. Kept numeric here; human magnitude
    /// formatting ("2.3万") is presentation-only.
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub collect_count: u64,
    #[serde(default)]
    pub share_count: u64,
}

/// Structured payload of an influencer monitoring task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfluencerSnapshot {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub post_count: u64,
}

/// The two history resource families. Cache keys are namespaced by family
/// so the collections never cross-contaminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFamily {
    Posts,
    Influencers,
}

impl ResourceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFamily::Posts => "posts",
            ResourceFamily::Influencers => "influencers",
        }
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for batch task creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTasksRequest {
    pub platform: String,
    pub urls: Vec<String>,
    pub task_type: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_interval: Option<MonitorInterval>,
}

/// Response of batch task creation. The backend may reject a subset of
/// URLs even on overall HTTP success.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTasksResponse {
    pub total_successful: u32,
    pub total_failed: u32,
    #[serde(default)]
    pub failed_urls: Vec<String>,
    /// url -> server-assigned task id
    #[serde(default)]
    pub successful_tasks: HashMap<String, String>,
}

/// Query parameters for the task list endpoint.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub task_type: Option<TaskKind>,
    pub status: Option<TaskStatus>,
    pub page: u32,
    pub limit: u32,
}

impl TaskListQuery {
    pub fn to_params(&self, platform: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("platform", platform.to_string()),
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(kind) = self.task_type {
            params.push(("task_type", kind.as_str().to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Response of pause/resume/retry control calls. Cancel responds with a
/// bare message; the other fields default to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlResponse {
    pub message: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One fetched page of history rows. Replaced atomically in the cache,
/// never partially updated.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub items: Vec<TaskRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Page {
    pub fn visible_ids(&self) -> Vec<String> {
        self.items.iter().map(|r| r.id.clone()).collect()
    }
}
