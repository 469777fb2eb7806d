//! Collaborators invoked by the workers
//!
//! The scheduling engine only knows the [`CrawlBackend`] trait. The default
//! [`HttpBackend`] fetches pages with reqwest, extracts links with scraper
//! and streams leaves into the output directory.

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::crawler::downloader::download_to_directory;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::{parse_html, ExtractedLink, LinkKind};
use crate::crawler::task::Task;
use crate::url::same_host;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

/// Work performed for a dispatched task
///
/// Implementations are shared by every worker and must be safe to call
/// concurrently.
#[async_trait]
pub trait CrawlBackend: Send + Sync {
    /// Fetches a page and returns the tasks found on it
    async fn fetch_and_extract(&self, task: &Task) -> Result<Vec<Task>, HarvestError>;

    /// Retrieves a leaf resource and persists it
    async fn download_leaf(&self, task: &Task) -> Result<(), HarvestError>;
}

/// Network-backed implementation of [`CrawlBackend`]
pub struct HttpBackend {
    client: Client,
    seed: Url,
    recurse_same_host: bool,
    output_directory: PathBuf,
}

impl HttpBackend {
    /// Builds the backend and its HTTP client
    ///
    /// # Arguments
    ///
    /// * `seed` - The crawl seed; page links must stay on its host
    /// * `crawl` - Crawl settings (recursion and output directory)
    /// * `user_agent` - HTTP client identification and timeouts
    pub fn new(
        seed: Url,
        crawl: &CrawlConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            seed,
            recurse_same_host: crawl.recurse_same_host,
            output_directory: crawl.output_directory.clone(),
        })
    }

    /// Turns extracted links into tasks
    ///
    /// - anchors only when recursion is enabled
    /// - pages (anchors and frames) only on the seed's host
    /// - images on any host
    fn links_to_tasks(&self, links: Vec<ExtractedLink>) -> Vec<Task> {
        links
            .into_iter()
            .filter_map(|ExtractedLink { url, kind }| match kind {
                LinkKind::Image => Some(Task::leaf(url)),
                LinkKind::Anchor if !self.recurse_same_host => None,
                LinkKind::Anchor | LinkKind::Frame => {
                    if same_host(&url, &self.seed) {
                        Some(Task::page(url))
                    } else {
                        tracing::trace!("Skipping off-host page {}", url);
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl CrawlBackend for HttpBackend {
    async fn fetch_and_extract(&self, task: &Task) -> Result<Vec<Task>, HarvestError> {
        let body = fetch_page(&self.client, task.url()).await?;
        let parsed = parse_html(&body, task.url());
        let tasks = self.links_to_tasks(parsed.links);
        tracing::debug!(
            "Found {} link(s) on {} ({})",
            tasks.len(),
            task.url(),
            parsed.title.as_deref().unwrap_or("untitled")
        );
        Ok(tasks)
    }

    async fn download_leaf(&self, task: &Task) -> Result<(), HarvestError> {
        let path = download_to_directory(&self.client, task.url(), &self.output_directory).await?;
        tracing::info!("Downloaded {} to {}", task.url(), path.display());
        Ok(())
    }
}
