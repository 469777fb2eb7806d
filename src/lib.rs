//! Sumi-Harvest: a concurrent site harvester
//!
//! This crate crawls a site from a single seed URL, discovers linked pages and
//! leaf resources (images), downloads the leaves to disk, and optionally
//! recurses into pages on the seed's host. Scheduling is done by a single
//! scheduler task that feeds a bounded worker pool over channels.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Attempt on {url} did not finish: {message}")]
    AttemptPanicked { url: String, message: String },

    #[error("Failed to derive file name from {url}")]
    MalformedTask { url: String },

    #[error("Invalid state transition for {identifier}: {from:?} -> {to:?}")]
    InvalidTransition {
        identifier: String,
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Output directory {path} is not usable: {reason}")]
    OutputDirectory { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("URL must be absolute: {0}")]
    NotAbsolute(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig, QueueOrder};
pub use crawler::{crawl, start_crawl, CrawlBackend, HttpBackend, Task};
pub use output::CrawlReport;
pub use state::TaskState;
pub use crate::url::{canonicalize, parse_seed, resolve_link};
