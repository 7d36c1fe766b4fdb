//! HTTP fetcher implementation
//!
//! This module handles the requests made for the analyzed page itself:
//! - Building the shared HTTP client with a proper user agent string
//! - HEAD preflight to confirm the target is reachable at all
//! - GET of the page body, with non-2xx responses treated as failures

use crate::config::UserAgentConfig;
use crate::crawler::AnalysisError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Raw page markup
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// The client follows up to 10 redirects. Timeouts are set per request by the
/// callers, since the preflight, the page fetch and liveness probes each use
/// their own.
///
/// # Example
///
/// ```no_run
/// use sumi_sonar::config::UserAgentConfig;
/// use sumi_sonar::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiSonar".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a HEAD request to confirm the target URL is reachable
///
/// Only transport failures (DNS, connection refused, TLS, timeout) fail the
/// preflight; any HTTP status, including 4xx/5xx, counts as reachable.
///
/// # Returns
///
/// * `Ok(StatusCode)` - The status the server answered with
/// * `Err(AnalysisError::Unreachable)` - No HTTP response at all
pub async fn preflight(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<StatusCode, AnalysisError> {
    let response = client
        .head(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| AnalysisError::Unreachable {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!("Preflight {} -> {}", url, response.status());
    Ok(response.status())
}

/// Fetches the page body
///
/// # Returns
///
/// * `Ok(FetchedPage)` - 2xx response with its body
/// * `Err(AnalysisError::HttpStatus)` - Server answered with a non-2xx status
/// * `Err(AnalysisError::Fetch)` - Transport failure or unreadable body
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<FetchedPage, AnalysisError> {
    let fetch_error = |source| AnalysisError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AnalysisError::HttpStatus {
            url: url.to_string(),
            status_code: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(fetch_error)?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}
