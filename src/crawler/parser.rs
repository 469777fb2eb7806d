//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Page links (`<a href>`)
//! - Images, the leaf resources that get downloaded (`<img src>` / `<img data-src>`)
//! - Frames, which are scanned like pages (`<frame src>`, `<iframe src>`)
//! - The page title, for log lines

use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// What kind of element a link came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `<a href>`; followed only when recursion is enabled
    Anchor,
    /// `<img>`; downloaded as a leaf
    Image,
    /// `<frame>` or `<iframe>`; always scanned
    Frame,
}

/// A resolved link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: Url,
    pub kind: LinkKind,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Links in document order, resolved against the page URL
    pub links: Vec<ExtractedLink>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// | Element | Attribute | Kind |
/// |---------|-----------|------|
/// | `<a>` | `href` | Anchor |
/// | `<img>` | `src`, else `data-src` | Image |
/// | `<frame>`, `<iframe>` | `src` | Frame |
///
/// References that do not resolve to an HTTP(S) URL are dropped (see
/// [`resolve_link`]).
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::{parse_html, LinkKind};
/// use url::Url;
///
/// let html = r#"<html><body><img src="/cat.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].kind, LinkKind::Image);
/// assert_eq!(parsed.links[0].url.as_str(), "https://example.com/cat.png");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all links in document order
fn extract_links(document: &Html, base_url: &Url) -> Vec<ExtractedLink> {
    let Ok(selector) = Selector::parse("a[href], img, frame[src], iframe[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let (reference, kind) = classify_element(&element)?;
            let url = resolve_link(reference, base_url)?;
            Some(ExtractedLink { url, kind })
        })
        .collect()
}

/// Picks the reference attribute and link kind for a matched element
fn classify_element<'a>(element: &ElementRef<'a>) -> Option<(&'a str, LinkKind)> {
    let value = element.value();
    match value.name() {
        "a" => value.attr("href").map(|href| (href, LinkKind::Anchor)),
        "img" => value
            .attr("src")
            .filter(|src| !src.trim().is_empty())
            .or_else(|| value.attr("data-src"))
            .map(|src| (src, LinkKind::Image)),
        "frame" | "iframe" => value.attr("src").map(|src| (src, LinkKind::Frame)),
        _ => None,
    }
}
