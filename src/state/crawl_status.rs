/// Crawl status definitions for tracking job progress
///
/// This module defines the states a crawl job moves through and which moves are legal.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a crawl job
///
/// ```text
/// PENDING -> PROCESSING -> COMPLETED
///                       \-> FAILED
/// COMPLETED | FAILED -> PENDING   (explicit rerun only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrawlStatus {
    // ===== Transient States =====
    /// Job has been created (or reset for a rerun) and waits for its background task
    #[default]
    Pending,

    /// Background task is analyzing the page
    Processing,

    // ===== Terminal States =====
    /// Analysis finished and the result fields are populated
    Completed,

    /// Analysis failed; result fields are default and an error message is set
    Failed,
}

impl CrawlStatus {
    /// Returns true if this is a terminal state (only a rerun moves it further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if a background execution is expected to move this job forward
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Terminal → Pending is the rerun transition; callers outside the
    /// orchestrator's rerun path should never request it.
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Completed, Self::Pending)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Converts the status to its database and wire representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Parses a status from its database representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
