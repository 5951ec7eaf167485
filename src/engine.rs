use std::sync::Arc;
use std::time::Duration;

use crate::cache::{RepoCache, Resident};
use crate::config::Config;
use crate::error::ContextError;
use crate::github::{fetch_all, list_files, parse_repo_identifier, RepoHost};
use crate::llm::Embedder;
use crate::models::{Excerpt, RepoKey};
use crate::rate_limit::{Admission, RateLimiter};
use crate::search::{build_index, retrieve, RepoIndexEntry};
use crate::summarize::summarize;

/// Limits applied while building one repository entry.
#[derive(Debug, Clone, Copy)]
struct BuildLimits {
    max_file_bytes: u64,
    max_concurrent_downloads: usize,
    download_timeout: Duration,
}

/// Repository context retrieval engine.
///
/// Owns the process-wide rate window and repository cache. Construct one per
/// process and share it by handle.
pub struct ContextEngine {
    limiter: RateLimiter,
    cache: RepoCache<RepoIndexEntry>,
    host: Arc<dyn RepoHost>,
    embedder: Arc<dyn Embedder>,
    limits: BuildLimits,
    top_k: usize,
    request_timeout: Duration,
}

impl ContextEngine {
    pub fn new(config: &Config, host: Arc<dyn RepoHost>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit_max_calls, config.rate_window()),
            cache: RepoCache::new(config.cache_capacity, config.cache_ttl()),
            host,
            embedder,
            limits: BuildLimits {
                max_file_bytes: config.max_file_bytes,
                max_concurrent_downloads: config.max_concurrent_downloads,
                download_timeout: config.download_timeout(),
            },
            top_k: config.top_k,
            request_timeout: config.request_timeout(),
        }
    }

    /// Return the files of `identifier` most relevant to `query`, nearest first.
    pub async fn get_context(
        &self,
        identifier: &str,
        query: &str,
    ) -> Result<Vec<Excerpt>, ContextError> {
        let key = parse_repo_identifier(identifier)?;

        if let Admission::Rejected { retry_after_secs } = self.limiter.try_admit() {
            tracing::warn!("Rate limit exceeded for {key}, retry after {retry_after_secs}s");
            return Err(ContextError::RateLimited { retry_after_secs });
        }
        tracing::info!("Context request for {key}: {query:?}");

        match tokio::time::timeout(self.request_timeout, self.resolve(&key, query)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Context request for {key} timed out");
                Err(ContextError::Timeout {
                    secs: self.request_timeout.as_secs(),
                })
            }
        }
    }

    async fn resolve(&self, key: &RepoKey, query: &str) -> Result<Vec<Excerpt>, ContextError> {
        let host = self.host.clone();
        let embedder = self.embedder.clone();
        let limits = self.limits;
        let build_key = key.clone();

        let entry = self
            .cache
            .get_or_build(key, move || async move {
                build_entry(host, embedder.as_ref(), &build_key, limits).await
            })
            .await?;

        retrieve(self.embedder.as_ref(), &entry, query, self.top_k).await
    }

    pub fn cache_size(&self) -> usize {
        self.cache.size()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Cached entry for `key`, without touching its recency.
    pub fn peek(&self, key: &RepoKey) -> Option<Arc<RepoIndexEntry>> {
        self.cache.peek(key)
    }

    pub fn resident(&self) -> Vec<Resident<RepoIndexEntry>> {
        self.cache.resident()
    }

    pub fn rate_window_used(&self) -> usize {
        self.limiter.in_window()
    }

    pub fn rate_limit(&self) -> usize {
        self.limiter.max_calls()
    }
}

/// List, download, summarize and index one repository.
async fn build_entry(
    host: Arc<dyn RepoHost>,
    embedder: &dyn Embedder,
    key: &RepoKey,
    limits: BuildLimits,
) -> Result<RepoIndexEntry, ContextError> {
    let tree = list_files(host.as_ref(), key, limits.max_file_bytes).await?;

    let files = fetch_all(
        host,
        key,
        &tree.branch,
        &tree.files,
        limits.max_concurrent_downloads,
        limits.download_timeout,
    )
    .await?;

    let summaries = files
        .iter()
        .map(|f| summarize(&f.path, &f.content))
        .collect();

    let entry = build_index(embedder, summaries).await?;
    tracing::info!("Built context index for {key} with {} files", entry.len());
    Ok(entry)
}
