use crate::{UrlError, UrlResult};
use url::Url;

/// Validates a URL submitted as a crawl target
///
/// The target must parse, use the `http` or `https` scheme and carry a host.
/// Surrounding whitespace is trimmed and the URL is returned in the parser's
/// normalized form (lowercased scheme and host, `/` for an empty path). That
/// normalized form is what a job records.
///
/// # Examples
///
/// ```
/// use sumi_sonar::url::validate_target_url;
///
/// assert!(validate_target_url("https://example.com/").is_ok());
/// assert!(validate_target_url("ftp://example.com/").is_err());
/// assert!(validate_target_url("not a url").is_err());
/// ```
pub fn validate_target_url(target: &str) -> UrlResult<Url> {
    let url = Url::parse(target.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
