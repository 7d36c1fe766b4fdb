//! Link liveness checking
//!
//! Every unique link discovered on a page is probed with a HEAD request. Verdicts
//! are memoized per checker so a URL seen by several crawls on the same engine is
//! probed once per cache lifetime.

use crate::crawler::AnalysisError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Status code recorded when a probe gets no HTTP response at all
pub const UNREACHABLE_STATUS: u16 = 0;

/// A link found broken during one engine invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkDetail {
    /// Absolute URL of the link
    pub url: String,

    /// HTTP status of the probe, 0 if the request failed outright
    pub status_code: u16,
}

/// Outcome of probing one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkVerdict {
    pub status_code: u16,
}

impl LinkVerdict {
    pub fn is_broken(&self) -> bool {
        is_broken_status(self.status_code)
    }
}

/// Returns true for statuses that mark a link broken (>= 400, or 0 for no response)
pub fn is_broken_status(status_code: u16) -> bool {
    status_code == UNREACHABLE_STATUS || status_code >= 400
}

/// A memoized verdict and when it was recorded
#[derive(Debug, Clone, Copy)]
struct CachedVerdict {
    verdict: LinkVerdict,
    checked_at: Instant,
}

impl CachedVerdict {
    fn new(verdict: LinkVerdict) -> Self {
        Self {
            verdict,
            checked_at: Instant::now(),
        }
    }

    /// A verdict never goes stale when no TTL is configured
    fn is_stale(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.checked_at.elapsed() > ttl)
    }
}

/// Concurrent link prober with a shared verdict cache
///
/// Cloning is cheap and clones share the same cache.
#[derive(Debug, Clone)]
pub struct LivenessChecker {
    client: Client,
    probe_timeout: Duration,
    cache_ttl: Option<Duration>,
    cache: Arc<RwLock<HashMap<String, CachedVerdict>>>,
}

impl LivenessChecker {
    /// Creates a checker
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the HEAD probes
    /// * `probe_timeout` - Timeout of each probe
    /// * `cache_ttl` - How long verdicts are reused, `None` for forever
    pub fn new(client: Client, probe_timeout: Duration, cache_ttl: Option<Duration>) -> Self {
        Self {
            client,
            probe_timeout,
            cache_ttl,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the cached verdict for a URL, if present and fresh
    pub fn cached(&self, url: &str) -> Option<LinkVerdict> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(url)
            .filter(|entry| !entry.is_stale(self.cache_ttl))
            .map(|entry| entry.verdict)
    }

    /// Number of URLs currently cached
    pub fn cache_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops every cached verdict
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Probes one link, consulting the cache first
    ///
    /// The verdict is cached before it is returned, including transport failures.
    /// Expired entries are evicted whenever a new verdict is written.
    pub async fn check(&self, url: &str) -> LinkVerdict {
        if let Some(verdict) = self.cached(url) {
            tracing::trace!("Cache hit for {}", url);
            return verdict;
        }

        let status_code = match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().as_u16(),
            Err(e) => {
                tracing::debug!("Probe failed for {}: {}", url, e);
                UNREACHABLE_STATUS
            }
        };

        let verdict = LinkVerdict { status_code };
        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            if self.cache_ttl.is_some() {
                cache.retain(|_, entry| !entry.is_stale(self.cache_ttl));
            }
            cache.insert(url.to_string(), CachedVerdict::new(verdict));
        }

        tracing::debug!("Probed {} -> {}", url, status_code);
        verdict
    }

    /// Probes every link concurrently and returns the broken ones
    ///
    /// One task is spawned per link, with at most `max_concurrent` probes in
    /// flight. The call returns only after every task has finished; the result is
    /// in completion order, not input order.
    pub async fn check_all(
        &self,
        links: &[String],
        max_concurrent: usize,
    ) -> Result<Vec<BrokenLinkDetail>, AnalysisError> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for link in links {
            let checker = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let link = link.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let verdict = checker.check(&link).await;
                (link, verdict)
            });
        }

        let mut broken = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (url, verdict) = joined?;
            if verdict.is_broken() {
                broken.push(BrokenLinkDetail {
                    url,
                    status_code: verdict.status_code,
                });
            }
        }

        Ok(broken)
    }
}
