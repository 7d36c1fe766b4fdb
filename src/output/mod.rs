//! Output module for rendering crawl jobs in the terminal
//!
//! This module handles:
//! - Formatting a single job with its full analysis
//! - Formatting a user's history as a compact listing
//! - Aggregate statistics over that history

pub mod stats;

pub use stats::{format_statistics, summarize_history, HistoryStatistics};

use crate::state::{CrawlJob, CrawlStatus};

/// Formats one job with every result field
pub fn format_job(job: &CrawlJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Crawl #{} ===\n", job.id));
    out.push_str(&format!("  URL: {}\n", job.url));
    out.push_str(&format!("  Status: {}\n", job.status));
    out.push_str(&format!(
        "  Created: {}\n",
        job.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    match job.status {
        CrawlStatus::Completed => {
            out.push_str(&format!("  HTML version: {}\n", job.html_version));
            out.push_str(&format!("  Title: {}\n", job.title));

            if !job.heading_counts.is_empty() {
                let headings: Vec<String> = job
                    .heading_counts
                    .iter()
                    .map(|(tag, count)| format!("{}={}", tag, count))
                    .collect();
                out.push_str(&format!("  Headings: {}\n", headings.join(" ")));
            }

            out.push_str(&format!(
                "  Links: {} total ({} internal, {} external)\n",
                job.total_links, job.internal_links, job.external_links
            ));
            out.push_str(&format!("  Broken links: {}\n", job.broken_links));
            for detail in &job.broken_link_detail {
                out.push_str(&format!("    [{}] {}\n", detail.status_code, detail.url));
            }
            out.push_str(&format!(
                "  Login form: {}\n",
                if job.has_login_form { "yes" } else { "no" }
            ));
            out.push_str(&format!("  Processing time: {} ms\n", job.processing_time_ms));
        }
        CrawlStatus::Failed => {
            out.push_str(&format!(
                "  Error: {}\n",
                job.error_message.as_deref().unwrap_or("unknown error")
            ));
        }
        CrawlStatus::Pending | CrawlStatus::Processing => {}
    }

    out
}

/// Formats a history listing, one line per job, followed by statistics
pub fn format_history(jobs: &[CrawlJob]) -> String {
    if jobs.is_empty() {
        return "No crawls found.\n".to_string();
    }

    let mut out = String::new();
    for job in jobs {
        out.push_str(&format!(
            "{:>6}  {:<10}  {:>5} links  {:>4} broken  {}\n",
            job.id,
            job.status.to_db_string(),
            job.total_links,
            job.broken_links,
            job.url
        ));
    }
    out.push('\n');
    out.push_str(&format_statistics(&summarize_history(jobs)));
    out
}

/// Prints one job to stdout
pub fn print_job(job: &CrawlJob) {
    print!("{}", format_job(job));
}

/// Prints a history listing to stdout
pub fn print_history(jobs: &[CrawlJob]) {
    print!("{}", format_history(jobs));
}
