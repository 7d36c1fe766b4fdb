//! Crawl orchestrator
//!
//! `CrawlService` owns the job lifecycle. Creating or rerunning a job returns the
//! PENDING record at once and hands the job to a detached background task, which
//! moves it through PROCESSING to COMPLETED or FAILED. Every transition is
//! pushed to the owner's session before it is persisted.

mod in_flight;

use crate::crawler::PageAnalyzer;
use crate::hub::Notifier;
use crate::state::{CrawlJob, JobId, UserId};
use crate::storage::JobStore;
use crate::url::validate_target_url;
use crate::{Result, SonarError};
use in_flight::{InFlight, InFlightGuard};
use std::sync::Arc;

/// Entry point for every job operation
///
/// Cloning is cheap; clones share the store, analyzer, notifier and in-flight set.
#[derive(Clone)]
pub struct CrawlService {
    store: Arc<dyn JobStore>,
    analyzer: Arc<dyn PageAnalyzer>,
    notifier: Arc<dyn Notifier>,
    in_flight: InFlight,
}

impl CrawlService {
    pub fn new(
        store: Arc<dyn JobStore>,
        analyzer: Arc<dyn PageAnalyzer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            analyzer,
            notifier,
            in_flight: InFlight::default(),
        }
    }

    /// Creates a PENDING job for `url` and starts analyzing it in the background
    ///
    /// Only the URL's shape is checked here; reachability problems surface later
    /// as a FAILED job.
    pub async fn start_crawl(&self, user_id: UserId, url: &str) -> Result<CrawlJob> {
        let target = validate_target_url(url)?;

        let mut job = CrawlJob::new(user_id, target.as_str());
        self.store.create(&mut job)?;

        let guard = self
            .in_flight
            .claim(job.id)
            .ok_or(SonarError::CrawlInProgress { id: job.id })?;

        tracing::info!(job_id = job.id, user_id, url = %job.url, "Crawl started");
        self.spawn_execution(job.clone(), guard);
        Ok(job)
    }

    /// Resets an owned job to PENDING and analyzes it again
    ///
    /// Fails with `CrawlInProgress` while an earlier execution of the same job is
    /// still running.
    pub async fn rerun_crawl(&self, id: JobId, user_id: UserId) -> Result<CrawlJob> {
        let mut job = self.store.find_by_id_and_owner(id, user_id)?;

        let guard = self
            .in_flight
            .claim(id)
            .ok_or(SonarError::CrawlInProgress { id })?;

        if job.status.is_active() {
            tracing::warn!(
                job_id = id,
                status = %job.status,
                "Rerunning crawl left without a running task"
            );
        }
        job.reset_for_rerun();
        self.store.update(&job)?;
        self.publish(&job);

        tracing::info!(job_id = id, user_id, url = %job.url, "Crawl rerun");
        self.spawn_execution(job.clone(), guard);
        Ok(job)
    }

    /// All jobs owned by the user, most recent first
    pub async fn get_crawl_history(&self, user_id: UserId) -> Result<Vec<CrawlJob>> {
        Ok(self.store.find_by_owner(user_id)?)
    }

    pub async fn get_crawl_result(&self, id: JobId, user_id: UserId) -> Result<CrawlJob> {
        Ok(self.store.find_by_id_and_owner(id, user_id)?)
    }

    pub async fn delete_crawl(&self, id: JobId, user_id: UserId) -> Result<()> {
        self.store.delete_by_id_and_owner(id, user_id)?;
        tracing::info!(job_id = id, user_id, "Crawl deleted");
        Ok(())
    }

    /// Deletes every listed job the user owns; returns how many were removed
    pub async fn delete_crawls_bulk(&self, ids: &[JobId], user_id: UserId) -> Result<usize> {
        let removed = self.store.delete_bulk_by_ids_and_owner(ids, user_id)?;
        tracing::info!(user_id, requested = ids.len(), removed, "Crawls deleted");
        Ok(removed)
    }

    /// True while a background execution of the job is running
    pub fn is_running(&self, id: JobId) -> bool {
        self.in_flight.contains(id)
    }

    fn spawn_execution(&self, job: CrawlJob, guard: InFlightGuard) {
        let service = self.clone();
        tokio::spawn(async move {
            service.execute(job, guard).await;
        });
    }

    /// Background half of StartCrawl and RerunCrawl
    ///
    /// Store failures here are logged and never undo the in-memory transition.
    async fn execute(&self, mut job: CrawlJob, _guard: InFlightGuard) {
        if let Err(e) = job.begin_processing() {
            tracing::error!(job_id = job.id, "Cannot start crawl: {}", e);
            return;
        }
        self.publish(&job);
        self.persist(&job);

        let transition = match self.analyzer.analyze(&job.url).await {
            Ok(analysis) => job.complete(analysis),
            Err(e) => {
                tracing::warn!(job_id = job.id, url = %job.url, "Crawl failed: {}", e);
                job.fail(e.to_string())
            }
        };
        if let Err(e) = transition {
            tracing::error!(job_id = job.id, "Cannot finish crawl: {}", e);
            return;
        }

        self.publish(&job);
        self.persist(&job);

        tracing::info!(
            job_id = job.id,
            status = %job.status,
            total_links = job.total_links,
            broken_links = job.broken_links,
            processing_time_ms = job.processing_time_ms,
            "Crawl finished"
        );
    }

    /// Pushes the full record to the owner's session, if connected
    fn publish(&self, job: &CrawlJob) {
        match serde_json::to_vec(job) {
            Ok(payload) => self.notifier.notify(job.user_id, payload),
            Err(e) => tracing::error!(job_id = job.id, "Cannot encode notification: {}", e),
        }
    }

    fn persist(&self, job: &CrawlJob) {
        if let Err(e) = self.store.update(job) {
            tracing::error!(
                job_id = job.id,
                status = %job.status,
                "Failed to persist crawl: {}",
                e
            );
        }
    }
}
