use serde::Deserialize;
use std::path::PathBuf;

/// Default number of concurrent workers
pub const DEFAULT_WORKER_COUNT: usize = 20;

/// Default number of attempts a task gets before it is retired
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl engine tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Number of concurrent workers (and the in-flight bound)
    pub worker_count: usize,

    /// Attempts allowed per task before it is retired as failed
    pub max_attempts: usize,

    /// Follow `<a href>` links that stay on the seed's host
    pub recurse_same_host: bool,

    /// Log what would be downloaded instead of writing files
    pub dry_run: bool,

    /// Directory that receives downloaded leaf resources
    pub output_directory: PathBuf,

    /// Ordering policy of the retry queue
    pub queue_order: QueueOrder,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            recurse_same_host: false,
            dry_run: false,
            output_directory: PathBuf::from("."),
            queue_order: QueueOrder::default(),
        }
    }
}

/// How the retry queue decides which task is dispatched next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueOrder {
    /// A task goes first only if it was attempted earlier *and* has fewer
    /// errors than the other. Incomparable pairs keep their heap position.
    #[default]
    Conjunctive,

    /// Fewest errors first, then least recently attempted.
    FewestErrorsFirst,
}

/// User agent and HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// Optional URL with information about the crawler
    pub contact_url: Option<String>,

    /// Overall per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}
