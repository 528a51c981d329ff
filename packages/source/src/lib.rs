#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! External data-source fetchers.
//!
//! One module per source: the server-rendered listing portal ([`ssr`]),
//! its mobile API ([`mobile`]), the government transaction API
//! ([`molit`]), the price trend-chart payload ([`trend`]), the national
//! school-information API ([`neis`]), and the directions API
//! ([`directions`]).
//!
//! Fetcher contract: the public `fetch_*` surfaces never fail for
//! source trouble — timeouts, non-2xx statuses, and malformed payloads
//! are logged and returned as `None` so the caller's fallback chain
//! moves on. [`SourceError`] exists for the internal `?` plumbing and
//! for callers that need to distinguish failure causes in logs.

pub mod directions;
pub mod http;
pub mod mobile;
pub mod molit;
pub mod neis;
pub mod politeness;
pub mod progress;
pub mod ssr;
pub mod trend;

use std::time::Duration;

/// Errors that can occur while talking to an external source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connect, timeout, non-2xx).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (cached file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response arrived but did not carry the expected structure.
    #[error("Malformed payload: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

/// Browser-like request headers expected by the listing portal.
pub const PORTAL_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    ("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("Referer", "https://new.land.naver.com/"),
    ("Accept", "*/*"),
];

/// Builds the shared HTTP client with the portal headers and a per-call
/// timeout. Source timeouts convert to `None` outcomes, never fatal
/// errors.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the TLS backend cannot initialize.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, SourceError> {
    let mut headers = reqwest::header::HeaderMap::new();
    for (name, value) in PORTAL_HEADERS {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_default_timeout() {
        assert!(build_client(30).is_ok());
    }

    #[test]
    fn portal_headers_include_user_agent() {
        assert!(PORTAL_HEADERS.iter().any(|(name, _)| *name == "User-Agent"));
    }
}
