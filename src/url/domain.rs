use url::Url;

/// Extracts the authority (host plus any non-default port) from a URL
///
/// The host is lowercased by the URL parser; the port is only present when it
/// differs from the scheme's default. Returns `None` for URLs without a host,
/// such as `tel:` or `data:` links.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sonar::url::authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
