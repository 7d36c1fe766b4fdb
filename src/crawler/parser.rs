//! HTML parser for extracting page signals
//!
//! This module handles parsing HTML content to extract:
//! - Document version (doctype / DTD markers)
//! - Page title
//! - Heading counts (H1..H6)
//! - Login-form presence
//! - Links to inventory (from <a href> tags)

use crate::url::{is_ignored_href, resolve_href};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Doctype and DTD markers, checked in order against the lowercased markup
const HTML_VERSIONS: &[(&str, &str)] = &[
    ("<!doctype html>", "HTML5"),
    ("//dtd html 4.01 strict//en", "HTML 4.01 Strict"),
    ("//dtd html 4.01 transitional//en", "HTML 4.01 Transitional"),
    ("//dtd html 4.01 frameset//en", "HTML 4.01 Frameset"),
    ("//dtd html 3.2 final//en", "HTML 3.2"),
    ("//dtd html 2.0//en", "HTML 2.0"),
    ("//dtd xhtml 1.0 strict//en", "XHTML 1.0 Strict"),
    ("//dtd xhtml 1.0 transitional//en", "XHTML 1.0 Transitional"),
    ("//dtd xhtml 1.0 frameset//en", "XHTML 1.0 Frameset"),
    ("//dtd xhtml 1.1//en", "XHTML 1.1"),
];

/// Reported when no known marker is present
pub const UNKNOWN_HTML_VERSION: &str = "Unknown";

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Document version label, e.g. "HTML5"
    pub html_version: String,

    /// First non-empty <title> text
    pub title: Option<String>,

    /// Uppercase heading tag to number of occurrences (only levels that occur)
    pub heading_counts: BTreeMap<String, u32>,

    /// True if any form contains a password input
    pub has_login_form: bool,

    /// Resolved anchor links in document order, duplicates included
    pub links: Vec<String>,
}

/// Parses HTML content and extracts everything the engine reports
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, relative hrefs resolved against `base_url`
///
/// **Exclude:**
/// - empty hrefs and same-page fragments (`#...`)
/// - `javascript:` and `mailto:` links
///
/// Other schemes (`tel:`, `ftp:`) are kept; the liveness check reports them.
///
/// # Example
///
/// ```
/// use sumi_sonar::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<!DOCTYPE html><html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.html_version, "HTML5");
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        html_version: detect_html_version(html).to_string(),
        title: extract_title(&document),
        heading_counts: count_headings(&document),
        has_login_form: has_login_form(&document),
        links: extract_links(&document, base_url),
    }
}

/// Detects the document version from doctype / DTD markers
///
/// This is a case-insensitive substring scan, not a parse; the first table
/// entry found anywhere in the markup wins.
pub fn detect_html_version(html: &str) -> &'static str {
    let lowered = html.to_lowercase();
    HTML_VERSIONS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, version)| *version)
        .unwrap_or(UNKNOWN_HTML_VERSION)
}

/// Extracts the first non-empty page title
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|s| !s.is_empty())
}

/// Counts H1..H6 elements, keyed by uppercase tag name
fn count_headings(document: &Html) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();

    for level in 1..=6 {
        let tag = format!("h{}", level);
        let Ok(selector) = Selector::parse(&tag) else {
            continue;
        };

        let count = document.select(&selector).count() as u32;
        if count > 0 {
            counts.insert(tag.to_uppercase(), count);
        }
    }

    counts
}

/// Returns true if any form on the page holds a password input
fn has_login_form(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("form input[type]") else {
        return false;
    };

    document.select(&selector).any(|input| {
        input
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("password"))
    })
}

/// Extracts all inventoried links from the document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !is_ignored_href(href))
        .map(|href| resolve_href(base_url, href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_detect_html5_any_case() {
        assert_eq!(detect_html_version("<!DOCTYPE html><html></html>"), "HTML5");
        assert_eq!(detect_html_version("<!doctype HTML><html></html>"), "HTML5");
    }

    #[test]
    fn test_detect_html401_strict() {
        let html = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Strict//EN">"#;
        assert_eq!(detect_html_version(html), "HTML 4.01 Strict");
    }

    #[test]
    fn test_detect_xhtml_transitional() {
        let html = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#;
        assert_eq!(detect_html_version(html), "XHTML 1.0 Transitional");
    }

    #[test]
    fn test_detect_xhtml_11() {
        let html = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#;
        assert_eq!(detect_html_version(html), "XHTML 1.1");
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(
            detect_html_version("<html><body>no doctype</body></html>"),
            UNKNOWN_HTML_VERSION
        );
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_first_non_empty_title_wins() {
        let html = r#"<html><head><title>   </title><title>Second</title></head>
            <body><svg><title>Icon</title></svg></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.title, Some("Second".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_heading_counts() {
        let html = r#"<html><body>
            <h1>One</h1>
            <h2>Two</h2><h2>Two again</h2>
            <section><h3>Three</h3><h6>Six</h6></section>
        </body></html>"#;
        let parsed = parse_html(html, &base_url());

        assert_eq!(parsed.heading_counts.get("H1"), Some(&1));
        assert_eq!(parsed.heading_counts.get("H2"), Some(&2));
        assert_eq!(parsed.heading_counts.get("H3"), Some(&1));
        assert_eq!(parsed.heading_counts.get("H4"), None);
        assert_eq!(parsed.heading_counts.get("H6"), Some(&1));
    }

    #[test]
    fn test_login_form_detected() {
        let html = r#"<html><body><form><input type="password"></form></body></html>"#;
        assert!(parse_html(html, &base_url()).has_login_form);
    }

    #[test]
    fn test_login_form_type_is_case_insensitive() {
        let html = r#"<html><body><form action="/login">
            <input type="text" name="user"><input type="PASSWORD" name="pw">
        </form></body></html>"#;
        assert!(parse_html(html, &base_url()).has_login_form);
    }

    #[test]
    fn test_text_input_is_not_login_form() {
        let html = r#"<html><body><form><input type="text"></form></body></html>"#;
        assert!(!parse_html(html, &base_url()).has_login_form);
    }

    #[test]
    fn test_password_outside_form_is_not_login_form() {
        let html = r#"<html><body><input type="password"></body></html>"#;
        assert!(!parse_html(html, &base_url()).has_login_form);
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links, vec!["https://other.com/page".to_string()]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links, vec!["https://example.com/other".to_string()]);
    }

    #[test]
    fn test_skip_javascript_and_mailto_links() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
        </body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only_and_empty() {
        let html = r##"<html><body><a href="#section">Jump</a><a href="">Empty</a></body></html>"##;
        let parsed = parse_html(html, &base_url());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_for_later_dedup() {
        let html = r#"<html><body>
            <a href="/a">A</a>
            <a href="https://example.com/a">A again</a>
        </body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links.len(), 2);
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
                <a>No href</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links.len(), 2);
    }
}
