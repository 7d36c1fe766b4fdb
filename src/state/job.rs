use crate::crawler::{BrokenLinkDetail, PageAnalysis};
use crate::state::CrawlStatus;
use crate::SonarError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a crawl job in the job store
pub type JobId = i64;

/// Identifier of the user owning a job or a hub registration
pub type UserId = i64;

/// One user-submitted request to analyze a single URL
///
/// The same shape is persisted by the job store and pushed, JSON-encoded, with
/// every status notification. Result fields stay at their defaults while the job
/// is PENDING or PROCESSING, and after a FAILED run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: JobId,
    pub user_id: UserId,

    /// Target URL, never changed after creation
    pub url: String,
    pub status: CrawlStatus,

    pub html_version: String,
    pub title: String,

    /// Uppercase heading tag (`H1`..`H6`) to number of occurrences
    pub heading_counts: BTreeMap<String, u32>,

    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,
    pub broken_link_detail: Vec<BrokenLinkDetail>,
    pub total_links: u32,
    pub has_login_form: bool,
    pub processing_time_ms: u64,

    /// Present only when the job is FAILED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrawlJob {
    /// Creates a PENDING job with all result fields at their defaults
    ///
    /// The id stays 0 until the job store assigns one.
    pub fn new(user_id: UserId, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            url: url.into(),
            status: CrawlStatus::Pending,
            html_version: String::new(),
            title: String::new(),
            heading_counts: BTreeMap::new(),
            internal_links: 0,
            external_links: 0,
            broken_links: 0,
            broken_link_detail: Vec::new(),
            total_links: 0,
            has_login_form: false,
            processing_time_ms: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the job to `next`, rejecting transitions the state machine forbids
    ///
    /// A successful transition stamps `updated_at`.
    pub fn transition(&mut self, next: CrawlStatus) -> Result<(), SonarError> {
        if !self.status.can_transition_to(next) {
            return Err(SonarError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// PENDING → PROCESSING
    pub fn begin_processing(&mut self) -> Result<(), SonarError> {
        self.transition(CrawlStatus::Processing)
    }

    /// PROCESSING → COMPLETED, copying every result field from the analysis
    pub fn complete(&mut self, analysis: PageAnalysis) -> Result<(), SonarError> {
        self.transition(CrawlStatus::Completed)?;

        self.html_version = analysis.html_version;
        self.title = analysis.title;
        self.heading_counts = analysis.heading_counts;
        self.internal_links = analysis.internal_links;
        self.external_links = analysis.external_links;
        self.broken_links = analysis.broken_links;
        self.broken_link_detail = analysis.broken_link_detail;
        self.total_links = analysis.total_links;
        self.has_login_form = analysis.has_login_form;
        self.processing_time_ms = analysis.processing_time_ms;
        self.error_message = None;
        Ok(())
    }

    /// PROCESSING → FAILED with a human-readable message; results stay default
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), SonarError> {
        self.transition(CrawlStatus::Failed)?;
        self.clear_results();
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Resets the job to PENDING for a rerun, clearing results and error
    ///
    /// Terminal jobs take the regular rerun transition. Jobs persisted as PENDING or
    /// PROCESSING with no live execution (left behind by a restart) are reset too;
    /// the orchestrator guards against resetting a job that is still running.
    pub fn reset_for_rerun(&mut self) {
        self.clear_results();
        self.error_message = None;
        self.status = CrawlStatus::Pending;
        self.updated_at = Utc::now();
    }

    /// Checks the count invariants of the record
    ///
    /// `broken_links == broken_link_detail.len()` and
    /// `total_links == internal_links + external_links`.
    pub fn has_consistent_counts(&self) -> bool {
        self.broken_links as usize == self.broken_link_detail.len()
            && self.total_links == self.internal_links + self.external_links
    }

    fn clear_results(&mut self) {
        self.html_version.clear();
        self.title.clear();
        self.heading_counts.clear();
        self.internal_links = 0;
        self.external_links = 0;
        self.broken_links = 0;
        self.broken_link_detail.clear();
        self.total_links = 0;
        self.has_login_form = false;
        self.processing_time_ms = 0;
    }
}
