use crate::config::types::{Config, EngineConfig, HubConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_hub_config(&config.hub)?;
    Ok(())
}

/// Validates engine timeouts and fan-out limits
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    validate_range("preflight_timeout_secs", config.preflight_timeout_secs, 1, 120)?;
    validate_range("fetch_timeout_secs", config.fetch_timeout_secs, 1, 300)?;
    validate_range("probe_timeout_secs", config.probe_timeout_secs, 1, 120)?;

    if config.max_concurrent_probes < 1 || config.max_concurrent_probes > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_probes must be between 1 and 256, got {}",
            config.max_concurrent_probes
        )));
    }

    // cache_ttl_secs = 0 disables expiry, any other value is accepted

    Ok(())
}

fn validate_range(name: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_hub_config(config: &HubConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 || config.channel_capacity > 65_536 {
        return Err(ConfigError::Validation(format!(
            "channel_capacity must be between 1 and 65536, got {}",
            config.channel_capacity
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
