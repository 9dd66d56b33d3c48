//! Monitoring backend Web API module
//!
//! Wire models, the backend trait seam, and the reqwest-based client for
//! the social-media monitoring service.

pub mod backend;
pub mod client;
pub mod constants;
pub mod models;

pub use backend::MonitorBackend;
pub use client::MonitorClient;
pub use models::{
    AuthorRef, ControlResponse, CreateTasksRequest, CreateTasksResponse, ExtractedContent,
    InfluencerSnapshot, MonitorInterval, Page, ResourceFamily, TaskKind, TaskListQuery,
    TaskListResponse, TaskRecord, TaskStatus,
};
