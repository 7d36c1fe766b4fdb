//! Page-analysis engine
//!
//! This module contains everything one engine invocation needs:
//! - HTTP client construction, reachability preflight and page fetch
//! - HTML extraction (document version, title, headings, login form, links)
//! - Concurrent, memoized liveness checks of discovered links
//! - The `PageAnalyzer` seam the orchestrator drives

mod engine;
mod fetcher;
mod liveness;
mod parser;

pub use engine::{PageAnalysis, PageAnalyzer, WebAnalyzer};
pub use fetcher::{build_http_client, fetch_page, preflight, FetchedPage};
pub use liveness::{is_broken_status, BrokenLinkDetail, LinkVerdict, LivenessChecker};
pub use parser::{detect_html_version, parse_html, ParsedPage};

use thiserror::Error;

/// Errors that abort an engine invocation
///
/// The engine is all-or-nothing: any of these means no partial result is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to reach target URL {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },

    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("{url} responded with HTTP {status_code}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("liveness check aborted: {0}")]
    Probe(#[from] tokio::task::JoinError),
}
