#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fallback-chain resolvers.
//!
//! One resolver per logical fact — complex identity ([`complex`]),
//! transit/reference accessibility ([`location`]), transaction history
//! ([`price`]), assigned schools ([`school`]), and per-listing detail
//! ([`listing`]). Each resolver tries its sources in a fixed priority
//! order, stops at the first success, and always produces a record:
//! when every source fails, the defined placeholder comes back and the
//! degradation is logged, never raised.
//!
//! Sources are injected through per-resolver traits so tests can mock
//! them and assert that later chain steps are not invoked once an
//! earlier one succeeds. [`live::LiveSources`] wires the traits to the
//! real fetchers.

pub mod complex;
pub mod listing;
pub mod live;
pub mod location;
pub mod price;
pub mod school;
pub mod sidecar;

use std::path::PathBuf;

use apt_briefing_capture::capability::BrowserCapability;
use apt_briefing_models::ImageKind;
use apt_briefing_source::politeness::Politeness;
use chrono::NaiveDate;

/// Everything a resolver needs besides its sources: the shared HTTP
/// client, the explicitly-initialized browser capability, the working
/// directory, and the wall-clock date (injected so tests can pin it).
#[derive(Clone)]
pub struct ResolveContext {
    pub client: reqwest::Client,
    pub politeness: Politeness,
    pub capability: BrowserCapability,
    pub work_dir: PathBuf,
    /// Government transaction API key; absent means price falls back
    /// to mock data with an explicit log line.
    pub api_key: Option<String>,
    /// Reference point for the transit headline (default: 강남역).
    pub reference_point: (f64, f64),
    pub reference_name: String,
    pub today: NaiveDate,
}

impl ResolveContext {
    /// Per-complex cache directory.
    #[must_use]
    pub fn complex_dir(&self, complex_id: &str) -> PathBuf {
        self.work_dir.join(complex_id)
    }

    /// Canonical path for a cached image of `kind`.
    #[must_use]
    pub fn image_path(&self, complex_id: &str, kind: ImageKind) -> PathBuf {
        self.complex_dir(complex_id).join(format!("{kind}.png"))
    }

    /// Path for a listing-scoped image (floor plans are per article).
    #[must_use]
    pub fn article_image_path(&self, complex_id: &str, kind: ImageKind, article_no: &str) -> PathBuf {
        self.complex_dir(complex_id)
            .join(format!("{kind}_{article_no}.png"))
    }
}

/// Keeps a path only when a file actually exists there.
#[must_use]
pub(crate) fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use super::*;

    /// A context with everything external disabled, rooted in a temp
    /// dir the caller owns.
    #[must_use]
    pub fn offline_context(work_dir: &Path, today: NaiveDate) -> ResolveContext {
        ResolveContext {
            client: reqwest::Client::new(),
            politeness: Politeness::disabled(),
            capability: BrowserCapability::unavailable(),
            work_dir: work_dir.to_path_buf(),
            api_key: None,
            reference_point: (37.497_942, 127.027_621),
            reference_name: "강남역".to_string(),
            today,
        }
    }
}
