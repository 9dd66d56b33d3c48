//! Paginated history fetches
//!
//! Issues filtered, paginated fetches for the two resource families and
//! populates the query-keyed cache. A fetch with `use_cache` serves a hit
//! without touching the network; a refresh bypasses the cache for its one
//! key and overwrites the entry unconditionally.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use crate::api::backend::MonitorBackend;
use crate::api::constants::DEFAULT_PAGE_SIZE;
use crate::api::models::{Page, ResourceFamily, TaskStatus};
use crate::cache::{QueryKeyedCache, QueryKey};

/// Filter and pagination state of one history view. Turning a query into
/// its cache key is the only canonicalization step; two queries with equal
/// fields are cache-equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
    /// Post note id or influencer account id, depending on family.
    pub id_filter: Option<String>,
    /// Post author name or influencer display name.
    pub author_filter: Option<String>,
    pub status_filter: Option<TaskStatus>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            id_filter: None,
            author_filter: None,
            status_filter: None,
        }
    }
}

impl HistoryQuery {
    pub fn key(&self, family: ResourceFamily) -> QueryKey {
        QueryKey {
            family,
            page: self.page,
            limit: self.limit,
            id_filter: self.id_filter.clone(),
            author_filter: self.author_filter.clone(),
            status_filter: self.status_filter,
        }
    }

    /// Wire query parameters. Filter names differ per family; values are
    /// shared.
    pub fn to_params(&self, family: ResourceFamily) -> Vec<(&'static str, String)> {
        let (id_name, author_name) = match family {
            ResourceFamily::Posts => ("note_id", "author"),
            ResourceFamily::Influencers => ("account_id", "name"),
        };
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(id) = &self.id_filter {
            params.push((id_name, id.clone()));
        }
        if let Some(author) = &self.author_filter {
            params.push((author_name, author.clone()));
        }
        if let Some(status) = self.status_filter {
            params.push(("status", status.as_str().to_string()));
        }
        params
    }
}

/// Fetches history pages and keeps the cache coherent. Both families share
/// one cache; their keys are namespaced by `ResourceFamily`.
pub struct HistoryRepository {
    backend: Arc<dyn MonitorBackend>,
    cache: QueryKeyedCache,
}

impl HistoryRepository {
    pub fn new(backend: Arc<dyn MonitorBackend>, cache_capacity: usize) -> Self {
        Self {
            backend,
            cache: QueryKeyedCache::new(cache_capacity),
        }
    }

    /// Fetch one page. With `use_cache`, a present entry is served without
    /// a network call; otherwise the backend is queried and the entry is
    /// overwritten atomically.
    pub async fn fetch(
        &mut self,
        family: ResourceFamily,
        query: &HistoryQuery,
        use_cache: bool,
    ) -> Result<Page> {
        let key = query.key(family);
        if use_cache {
            if let Some(page) = self.cache.get(&key) {
                debug!("cache hit for {} page {}", family, query.page);
                return Ok(page);
            }
        }

        let page = self
            .backend
            .fetch_history(family, query)
            .await
            .with_context(|| format!("Failed to fetch {} history", family))?;
        self.cache.put(key, page.clone());
        Ok(page)
    }

    /// Cache-bypassing refresh of one key.
    pub async fn refresh(&mut self, family: ResourceFamily, query: &HistoryQuery) -> Result<Page> {
        self.fetch(family, query, false).await
    }

    pub fn is_cached(&self, family: ResourceFamily, query: &HistoryQuery) -> bool {
        self.cache.contains(&query.key(family))
    }

    pub fn invalidate(&mut self, family: ResourceFamily, query: &HistoryQuery) {
        self.cache.invalidate(&query.key(family));
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
