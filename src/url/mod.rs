//! URL handling module for Sumi-Harvest
//!
//! This module provides seed validation, reference resolution, canonical
//! task identifiers and host comparison.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use ::url::Url;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use normalize::{canonicalize, canonicalize_url};

/// Parses the crawl seed
///
/// The seed must be an absolute `http`/`https` URL with a host.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::parse_seed;
///
/// assert!(parse_seed("https://example.com/gallery").is_ok());
/// assert!(parse_seed("/gallery").is_err());
/// ```
pub fn parse_seed(seed: &str) -> UrlResult<Url> {
    let url = Url::parse(seed.trim()).map_err(|e| match e {
        ::url::ParseError::RelativeUrlWithoutBase => UrlError::NotAbsolute(seed.to_string()),
        other => UrlError::Parse(other.to_string()),
    })?;
    canonicalize_url(url)
}

/// Resolves a link reference found on `base` into a canonical absolute URL
///
/// Returns None if the reference should be skipped:
/// - empty references and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - references that fail to resolve
/// - anything that is not HTTP(S) after resolution
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    canonicalize_url(absolute).ok()
}
