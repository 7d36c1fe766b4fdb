//! Single-page analysis engine
//!
//! Composes the fetcher, the HTML parser, the link classifier and the liveness
//! checker into one all-or-nothing invocation per job.

use crate::config::{Config, EngineConfig};
use crate::crawler::fetcher::{build_http_client, fetch_page, preflight};
use crate::crawler::liveness::{BrokenLinkDetail, LivenessChecker};
use crate::crawler::parser::parse_html;
use crate::crawler::AnalysisError;
use crate::url::{classify_link, dedupe_links};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use url::Url;

/// Result of one engine invocation
///
/// Owned by whoever requested the analysis and copied into the job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub url: String,
    pub html_version: String,
    pub title: String,
    pub heading_counts: BTreeMap<String, u32>,
    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,

    /// Broken links in probe completion order
    pub broken_link_detail: Vec<BrokenLinkDetail>,

    /// Number of unique resolved links
    pub total_links: u32,
    pub has_login_form: bool,

    /// Wall-clock time from preflight to the end of the liveness fan-out
    pub processing_time_ms: u64,
}

/// Anything that can turn a URL into a page analysis
///
/// The orchestrator only depends on this trait, so tests can substitute a stub.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<PageAnalysis, AnalysisError>;
}

/// The production analyzer: real HTTP, real HTML, shared liveness cache
#[derive(Debug, Clone)]
pub struct WebAnalyzer {
    client: Client,
    config: EngineConfig,
    liveness: LivenessChecker,
}

impl WebAnalyzer {
    /// Creates an analyzer with its own HTTP client and liveness cache
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::from_parts(client, config.engine.clone()))
    }

    /// Creates an analyzer around an existing client
    pub fn from_parts(client: Client, config: EngineConfig) -> Self {
        let liveness =
            LivenessChecker::new(client.clone(), config.probe_timeout(), config.cache_ttl());
        Self {
            client,
            config,
            liveness,
        }
    }

    /// The liveness checker shared by every invocation of this analyzer
    pub fn liveness(&self) -> &LivenessChecker {
        &self.liveness
    }

    /// Runs the full pipeline against one page
    ///
    /// Links are resolved and classified against the requested URL, not the URL
    /// reached after redirects.
    pub async fn crawl_page(&self, target: &str) -> Result<PageAnalysis, AnalysisError> {
        let started = Instant::now();
        let url = Url::parse(target)?;

        preflight(&self.client, &url, self.config.preflight_timeout()).await?;

        let page = fetch_page(&self.client, &url, self.config.fetch_timeout()).await?;
        if page.final_url != url.as_str() {
            tracing::debug!("{} redirected to {}", url, page.final_url);
        }

        let parsed = parse_html(&page.body, &url);
        let links = dedupe_links(parsed.links);

        let internal = links
            .iter()
            .filter(|link| classify_link(&url, link).is_internal())
            .count();
        let external = links.len() - internal;

        let broken_link_detail = self
            .liveness
            .check_all(&links, self.config.max_concurrent_probes)
            .await?;

        let processing_time_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            url = %url,
            total_links = links.len(),
            broken_links = broken_link_detail.len(),
            processing_time_ms,
            "Page analyzed"
        );

        Ok(PageAnalysis {
            url: url.to_string(),
            html_version: parsed.html_version,
            title: parsed.title.unwrap_or_default(),
            heading_counts: parsed.heading_counts,
            internal_links: internal as u32,
            external_links: external as u32,
            broken_links: broken_link_detail.len() as u32,
            broken_link_detail,
            total_links: links.len() as u32,
            has_login_form: parsed.has_login_form,
            processing_time_ms,
        })
    }
}

#[async_trait]
impl PageAnalyzer for WebAnalyzer {
    async fn analyze(&self, url: &str) -> Result<PageAnalysis, AnalysisError> {
        self.crawl_page(url).await
    }
}
