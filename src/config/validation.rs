use crate::config::types::{Config, CrawlConfig, UserAgentConfig};
use crate::{ConfigError, HarvestError};
use std::path::Path;
use url::Url;

/// Upper bound on the worker pool size
const MAX_WORKER_COUNT: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawl engine tunables
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKER_COUNT {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKER_COUNT, config.worker_count
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1, got 0".to_string(),
        ));
    }

    if config.output_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request and connect timeouts must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Checks that downloads have somewhere to go
///
/// Dry runs never write, so the directory is not required to exist.
pub fn validate_output_directory(path: &Path, dry_run: bool) -> Result<(), HarvestError> {
    if dry_run {
        return Ok(());
    }

    let metadata = std::fs::metadata(path).map_err(|e| HarvestError::OutputDirectory {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if !metadata.is_dir() {
        return Err(HarvestError::OutputDirectory {
            path: path.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    Ok(())
}
