//! URL handling module for Sumi-Sonar
//!
//! This module provides the link classifier helpers used by the analysis engine:
//! href filtering and resolution, deduplication, internal/external scoping, and
//! validation of crawl targets submitted by users.

mod domain;
mod resolve;
mod target;

use ::url::Url;

// Re-export main functions
pub use domain::authority;
pub use resolve::{dedupe_links, is_ignored_href, resolve_href};
pub use target::validate_target_url;

/// Whether a discovered link stays on the analyzed site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// No host, or the same host as the analyzed page
    Internal,
    /// Any other host, or a link that cannot be parsed
    External,
}

impl LinkScope {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a resolved link relative to the analyzed page
///
/// A link is internal if it has no host component or if its host (including an
/// explicit port) equals the base page's host. Links that fail to parse are
/// counted as external.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sonar::url::{classify_link, LinkScope};
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(classify_link(&base, "https://example.com/about"), LinkScope::Internal);
/// assert_eq!(classify_link(&base, "https://other.org/"), LinkScope::External);
/// ```
pub fn classify_link(base: &Url, link: &str) -> LinkScope {
    let parsed = match Url::parse(link) {
        Ok(parsed) => parsed,
        Err(_) => return LinkScope::External,
    };

    match authority(&parsed) {
        None => LinkScope::Internal,
        Some(host) if Some(&host) == authority(base).as_ref() => LinkScope::Internal,
        Some(_) => LinkScope::External,
    }
}
