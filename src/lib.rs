//! Sumi-Sonar: asynchronous single-page analysis
//!
//! This crate accepts a URL per user, analyzes that one page in the background
//! (document metadata, link inventory, broken links, login-form signal) and keeps
//! a persisted job record and the user's connected session in sync with progress.

pub mod config;
pub mod crawler;
pub mod hub;
pub mod output;
pub mod service;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sonar operations
#[derive(Debug, Error)]
pub enum SonarError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid crawl target: {0}")]
    InvalidTarget(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] crawler::AnalysisError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl {id} is still running")]
    CrawlInProgress { id: i64 },

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlStatus,
        to: state::CrawlStatus,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Sonar operations
pub type Result<T> = std::result::Result<T, SonarError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{PageAnalysis, PageAnalyzer, WebAnalyzer};
pub use hub::Hub;
pub use service::CrawlService;
pub use state::{CrawlJob, CrawlStatus};
