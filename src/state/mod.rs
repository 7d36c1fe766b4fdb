//! State module for tracking crawl jobs
//!
//! This module provides the job record and its status state machine.
//!
//! # Components
//!
//! - `CrawlStatus`: lifecycle of one job (pending, processing, completed, failed)
//! - `CrawlJob`: the persisted and transmitted record for one user-submitted URL

mod crawl_status;
mod job;

// Re-export main types
pub use crawl_status::CrawlStatus;
pub use job::{CrawlJob, JobId, UserId};
