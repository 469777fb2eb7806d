//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default, so a crawl can run from
//! command-line flags alone.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Workers: {}", config.crawler.worker_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, QueueOrder, UserAgentConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORKER_COUNT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_output_directory};
