//! Configuration module for Sumi-Sonar
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sonar::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sonar.toml")).unwrap();
//! println!("Probing at most {} links at once", config.engine.max_concurrent_probes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, EngineConfig, HubConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
