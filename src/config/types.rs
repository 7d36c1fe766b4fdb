use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sonar
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

/// Page-analysis engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Timeout for the HEAD reachability probe on the target page (seconds)
    #[serde(rename = "preflight-timeout-secs", default = "default_preflight_timeout")]
    pub preflight_timeout_secs: u64,

    /// Timeout for fetching the target page body (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Timeout for each link liveness probe (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Maximum number of liveness probes in flight per engine invocation
    #[serde(rename = "max-concurrent-probes", default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// How long a cached liveness verdict stays valid (seconds, 0 = forever)
    #[serde(rename = "cache-ttl-secs", default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl EngineConfig {
    pub fn preflight_timeout(&self) -> Duration {
        Duration::from_secs(self.preflight_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Cache expiry, or `None` when cached verdicts never expire
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preflight_timeout_secs: default_preflight_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            max_concurrent_probes: default_max_concurrent_probes(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_preflight_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_max_concurrent_probes() -> usize {
    10
}

fn default_cache_ttl() -> u64 {
    300
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Job store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Notification hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Outbound buffer size of each client session
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}
