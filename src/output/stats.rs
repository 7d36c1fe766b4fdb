//! Statistics over a user's crawl history
//!
//! This module provides the aggregate figures shown under the history listing.

use crate::state::{CrawlJob, CrawlStatus};
use std::collections::HashMap;

/// Crawl history statistics summary
#[derive(Debug, Clone, Default)]
pub struct HistoryStatistics {
    /// Number of jobs in the history
    pub total_jobs: u64,

    /// Count of jobs by status (only statuses that occur)
    pub jobs_by_status: HashMap<CrawlStatus, u64>,

    /// Sum of unique links over completed jobs
    pub total_links: u64,

    /// Sum of broken links over completed jobs
    pub broken_links: u64,

    /// Completed jobs whose page holds a login form
    pub login_pages: u64,
}

/// Aggregates statistics from a list of jobs
pub fn summarize_history(jobs: &[CrawlJob]) -> HistoryStatistics {
    let mut stats = HistoryStatistics {
        total_jobs: jobs.len() as u64,
        ..Default::default()
    };

    for job in jobs {
        *stats.jobs_by_status.entry(job.status).or_insert(0) += 1;

        if job.status == CrawlStatus::Completed {
            stats.total_links += u64::from(job.total_links);
            stats.broken_links += u64::from(job.broken_links);
            if job.has_login_form {
                stats.login_pages += 1;
            }
        }
    }

    stats
}

/// Formats statistics as plain text
pub fn format_statistics(stats: &HistoryStatistics) -> String {
    let mut out = String::new();
    out.push_str("=== Crawl Statistics ===\n");
    out.push_str(&format!("  Total jobs: {}\n", stats.total_jobs));

    for status in CrawlStatus::all_states() {
        if let Some(count) = stats.jobs_by_status.get(&status) {
            let percentage = if stats.total_jobs > 0 {
                (*count as f64 / stats.total_jobs as f64) * 100.0
            } else {
                0.0
            };
            out.push_str(&format!("  {}: {} ({:.1}%)\n", status, count, percentage));
        }
    }

    out.push_str(&format!("  Links checked: {}\n", stats.total_links));
    out.push_str(&format!("  Broken links: {}\n", stats.broken_links));
    out.push_str(&format!("  Pages with login form: {}\n", stats.login_pages));
    out
}
