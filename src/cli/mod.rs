pub mod app;
pub mod commands;

pub use app::{Cli, Commands};

use std::sync::Arc;

use anyhow::Result;

use crate::api::MonitorClient;
use crate::config::{self, Config};
use crate::session::MonitorSession;

/// Build an authenticated session for the configured backend.
pub fn make_session() -> Result<MonitorSession> {
    let config = config::global();
    let token = Config::token()?;
    let client = MonitorClient::new(
        config.api_base_url.clone(),
        token,
        config.platform.clone(),
    );
    Ok(MonitorSession::new(
        Arc::new(client),
        config.platform.clone(),
        config.cache_capacity,
    ))
}
