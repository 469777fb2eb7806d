//! HTTP fetcher implementation
//!
//! This module handles the HTTP requests for the crawler:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Error classification (transport failure vs. non-success status)

use crate::config::UserAgentConfig;
use crate::HarvestError;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
///     ..Default::default()
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET request and fails on anything but a 2xx status
///
/// Shared by page fetching and leaf downloads so both classify errors the
/// same way.
pub(crate) async fn get_success(client: &Client, url: &Url) -> Result<Response, HarvestError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Fetches a page body as text
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Connection refused, timeout, TLS, redirect loop | `HarvestError::Http` |
/// | Non-2xx status | `HarvestError::HttpStatus` |
/// | Body could not be read or decoded | `HarvestError::Http` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, HarvestError> {
    let response = get_success(client, url).await?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.is_empty() && !content_type.contains("html") {
        tracing::debug!("{} served {}, scanning anyway", url, content_type);
    }

    response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })
}
