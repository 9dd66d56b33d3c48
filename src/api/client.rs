//! HTTP client for the monitoring backend with connection pooling

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::{Value, json};

use super::backend::MonitorBackend;
use super::constants;
use super::models::{
    ControlResponse, CreateTasksRequest, CreateTasksResponse, Page, ResourceFamily, TaskListQuery,
    TaskListResponse,
};
use crate::history::HistoryQuery;

/// Monitoring backend Web API client. Cloning shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct MonitorClient {
    base_url: String,
    platform: String,
    http_client: reqwest::Client,
    access_token: String,
}

impl MonitorClient {
    pub fn new(base_url: String, access_token: String, platform: String) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("watchdesk/1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url,
            platform,
            http_client,
            access_token,
        }
    }

    /// Create a client with custom HTTP client configuration
    pub fn with_custom_client(
        base_url: String,
        access_token: String,
        platform: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url,
            platform,
            http_client,
            access_token,
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Turn a non-2xx response into an error carrying the server-provided
    /// detail when present, else a generic "HTTP {status}" message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body).ok().and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("message"))
                .and_then(|d| d.as_str())
                .map(String::from)
        });

        match detail {
            Some(detail) => anyhow::bail!("{}", detail),
            None => anyhow::bail!("HTTP {}", status.as_u16()),
        }
    }

    async fn post_control(&self, verb: &str, task_ids: &[String]) -> Result<ControlResponse> {
        debug!("control call: {} for {} task(s)", verb, task_ids.len());
        let url = constants::control_endpoint(&self.base_url, verb);
        let body = if verb == "retry" {
            // Retry is a single-task endpoint on the wire.
            json!({ "task_id": task_ids.first() })
        } else {
            json!({ "task_ids": task_ids })
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", verb))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", verb))
    }
}

#[async_trait]
impl MonitorBackend for MonitorClient {
    async fn create_tasks(&self, request: &CreateTasksRequest) -> Result<CreateTasksResponse> {
        debug!(
            "creating {} {} task(s)",
            request.urls.len(),
            request.task_type
        );
        let url = constants::create_tasks_endpoint(&self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .context("Failed to send task creation request")?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .context("Failed to parse task creation response")
    }

    async fn list_tasks(&self, query: &TaskListQuery) -> Result<TaskListResponse> {
        let url = constants::list_tasks_endpoint(&self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query.to_params(&self.platform))
            .send()
            .await
            .context("Failed to send task list request")?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .context("Failed to parse task list response")
    }

    async fn pause_tasks(&self, task_ids: &[String]) -> Result<ControlResponse> {
        self.post_control("pause", task_ids).await
    }

    async fn resume_tasks(&self, task_ids: &[String]) -> Result<ControlResponse> {
        self.post_control("resume", task_ids).await
    }

    async fn retry_task(&self, task_id: &str) -> Result<ControlResponse> {
        let ids = [task_id.to_string()];
        self.post_control("retry", &ids).await
    }

    async fn cancel_task(&self, task_id: &str) -> Result<ControlResponse> {
        debug!("cancelling task {}", task_id);
        let url = constants::cancel_endpoint(&self.base_url, task_id);
        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to send cancel request")?;

        let response = Self::check_status(response).await?;
        response.json().await.context("Failed to parse cancel response")
    }

    async fn fetch_history(&self, family: ResourceFamily, query: &HistoryQuery) -> Result<Page> {
        let url = constants::history_endpoint(&self.base_url, family.as_str());
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query.to_params(family))
            .send()
            .await
            .with_context(|| format!("Failed to send {} history request", family))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} history response", family))
    }
}
