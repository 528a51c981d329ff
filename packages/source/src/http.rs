//! Single-attempt HTTP helpers with uniform logging.
//!
//! Every fetcher goes through [`get_json`] / [`get_text`] instead of
//! calling `reqwest` directly, so status handling and failure logging
//! stay in one place. There is no automatic retry: a failed call is a
//! `NotFound` for the surrounding fallback chain, and chains that want
//! another attempt do so with different parameters (different trade
//! type, different month), not by hammering the same request.

use std::path::Path;

use crate::SourceError;

/// Sends a GET request and parses the response body as JSON.
///
/// # Errors
///
/// Returns [`SourceError`] for connection failures, timeouts, non-2xx
/// statuses, and undecodable bodies.
pub async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value, SourceError> {
    let response = client.get(url).query(query).send().await?;
    let status = response.status();

    if !status.is_success() {
        log::warn!("GET {url} -> HTTP {status}");
        return Err(SourceError::Malformed {
            message: format!("HTTP {status}"),
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        log::warn!("GET {url} returned non-JSON body: {e} (preview: {preview})");
        SourceError::Json(e)
    })
}

/// Sends a GET request and returns the response body as text.
///
/// # Errors
///
/// Returns [`SourceError`] for connection failures, timeouts, and
/// non-2xx statuses.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, SourceError> {
    let response = client.get(url).query(query).send().await?;
    let status = response.status();

    if !status.is_success() {
        log::warn!("GET {url} -> HTTP {status}");
        return Err(SourceError::Malformed {
            message: format!("HTTP {status}"),
        });
    }

    Ok(response.text().await?)
}

/// Downloads `url` to `path`, short-circuiting when the file already
/// exists. Returns `true` when the file is present afterwards.
///
/// The existence check is the caching discipline for all fetched
/// images: a path is written at most once per run.
pub async fn download_cached(client: &reqwest::Client, url: &str, path: &Path) -> bool {
    if path.exists() {
        log::debug!("cache hit: {}", path.display());
        return true;
    }

    match fetch_bytes(client, url, path).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("download failed: {url} -> {e}");
            false
        }
    }
}

async fn fetch_bytes(client: &reqwest::Client, url: &str, path: &Path) -> Result<(), SourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Malformed {
            message: format!("HTTP {status}"),
        });
    }

    let bytes = response.bytes().await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_file_short_circuits_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aerial.png");
        std::fs::write(&path, b"cached").unwrap();

        // The URL is unroutable; a hit proves no request was made.
        let client = reqwest::Client::new();
        assert!(download_cached(&client, "http://invalid.localdomain/img.png", &path).await);
        assert_eq!(std::fs::read(&path).unwrap(), b"cached");
    }
}
