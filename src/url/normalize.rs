use crate::{UrlError, UrlResult};
use url::Url;

/// Produces the canonical form of a URL used as a task identifier
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host (the parser lowercases it)
/// 4. Remove the fragment (dot segments are already collapsed by the parser)
/// 5. Remove an empty query string
///
/// The path is otherwise left untouched, so the identifier is also the URL
/// that gets fetched.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::canonicalize;
///
/// let url = canonicalize("https://EXAMPLE.com/img/./a.png#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/a.png");
/// ```
pub fn canonicalize(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize_url(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
