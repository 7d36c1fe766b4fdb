use std::collections::HashSet;
use url::Url;

/// Href prefixes that never produce an inventoried link
const IGNORED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:"];

/// Returns true if an anchor href should be skipped entirely
///
/// Empty hrefs, same-page fragments, `javascript:` and `mailto:` links are
/// excluded from the link inventory.
pub fn is_ignored_href(href: &str) -> bool {
    href.is_empty() || IGNORED_PREFIXES.iter().any(|p| href.starts_with(p))
}

/// Resolves an href against the page's base URL
///
/// Absolute `http(s)` hrefs pass through unchanged. Anything else is joined
/// onto `base`; if joining fails the raw href is returned so it still shows up
/// in the inventory (and will be reported broken by the liveness check).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sonar::url::resolve_href;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(resolve_href(&base, "../about"), "https://example.com/about");
/// assert_eq!(resolve_href(&base, "https://other.org/x"), "https://other.org/x");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::debug!("Keeping unresolvable href {}: {}", href, e);
            href.to_string()
        }
    }
}

/// Reduces a list of links to its unique entries, keeping first-seen order
pub fn dedupe_links(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
