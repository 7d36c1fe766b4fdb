//! Storage traits and error types
//!
//! This module defines the job store interface the orchestrator consumes and
//! its error type.

use crate::state::{CrawlJob, JobId, UserId};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    /// The job does not exist or belongs to another user
    #[error("Crawl not found: {id}")]
    JobNotFound { id: JobId },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Job store used by the crawl orchestrator
///
/// Every lookup and mutation that takes an owner is scoped to that owner: a job
/// owned by someone else is indistinguishable from one that does not exist.
/// Implementations must be usable from several tasks at once.
pub trait JobStore: Send + Sync {
    /// Persists a new job
    ///
    /// Assigns `job.id` and stamps `created_at`/`updated_at`.
    fn create(&self, job: &mut CrawlJob) -> StorageResult<()>;

    /// Returns every job owned by `user_id`, most recent first
    fn find_by_owner(&self, user_id: UserId) -> StorageResult<Vec<CrawlJob>>;

    /// Returns one job, or `JobNotFound` if absent or not owned
    fn find_by_id_and_owner(&self, id: JobId, user_id: UserId) -> StorageResult<CrawlJob>;

    /// Overwrites the stored job with `job`, including the caller's `updated_at`
    fn update(&self, job: &CrawlJob) -> StorageResult<()>;

    /// Deletes one job, or returns `JobNotFound` if absent or not owned
    fn delete_by_id_and_owner(&self, id: JobId, user_id: UserId) -> StorageResult<()>;

    /// Deletes every listed job owned by `user_id` in one statement
    ///
    /// Ids the user does not own are skipped. Returns the number of rows removed.
    fn delete_bulk_by_ids_and_owner(&self, ids: &[JobId], user_id: UserId)
        -> StorageResult<usize>;
}
