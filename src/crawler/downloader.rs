//! Leaf downloads
//!
//! A leaf is saved as `{stem}-{uuid}{.ext}` inside the output directory, so
//! two images sharing a file name never overwrite each other.

use crate::crawler::fetcher::get_success;
use crate::HarvestError;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

/// Derives a unique file name from the last path segment of `url`
///
/// # Errors
///
/// Returns `HarvestError::MalformedTask` when the URL has no usable last
/// segment (e.g. `https://example.com/` or `https://example.com/dir/`).
pub fn derive_file_name(url: &Url) -> Result<String, HarvestError> {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .ok_or_else(|| HarvestError::MalformedTask {
            url: url.to_string(),
        })?;

    let as_path = Path::new(segment);
    let stem = as_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(segment);
    let id = Uuid::new_v4();

    Ok(match as_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, id, ext),
        None => format!("{}-{}", stem, id),
    })
}

/// Downloads `url` into `directory` and returns the written path
///
/// The request is made before the file is created, so a failed request
/// leaves nothing behind. The body is streamed to disk chunk by chunk; if
/// the body breaks off, the partial file is removed.
pub async fn download_to_directory(
    client: &Client,
    url: &Url,
    directory: &Path,
) -> Result<PathBuf, HarvestError> {
    let file_name = derive_file_name(url)?;
    let response = get_success(client, url).await?;

    let path = directory.join(file_name);
    let file = File::create(&path).await?;

    match write_body(response, file, url).await {
        Ok(written) => {
            tracing::trace!("Wrote {} bytes to {}", written, path.display());
            Ok(path)
        }
        Err(e) => {
            if let Err(remove_error) = tokio::fs::remove_file(&path).await {
                tracing::warn!(
                    "Could not remove partial download {}: {}",
                    path.display(),
                    remove_error
                );
            }
            Err(e)
        }
    }
}

/// Streams the response body into `file`, returning the byte count
async fn write_body(
    mut response: Response,
    mut file: File,
    url: &Url,
) -> Result<usize, HarvestError> {
    let mut written = 0usize;
    while let Some(chunk) = response.chunk().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;
    Ok(written)
}
