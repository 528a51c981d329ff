#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless-browser capture boundary.
//!
//! Screenshot capture is an external collaborator: the pipeline asks
//! for "page X, after steps Y, saved to Z" and only observes a
//! success/failure outcome. The [`engine::BrowserEngine`] trait is that
//! boundary; the embedding application supplies an implementation, and
//! when none is supplied every capture degrades to the defined
//! placeholder behavior.
//!
//! Browser sessions are scarce: [`capability::BrowserCapability`] hands
//! out semaphore-scoped [`capability::BrowserSession`]s so one session
//! serves all captures for one complex and is released even when a
//! mid-sequence step fails.

pub mod capability;
pub mod engine;
pub mod placeholder;
pub mod scripts;

use thiserror::Error;

/// Errors from a capture attempt.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The engine could not complete the interaction script.
    #[error("browser interaction failed: {message}")]
    Interaction {
        /// Engine-reported failure description.
        message: String,
    },

    /// Writing the screenshot or placeholder failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one capture request. Never an error: failures are a
/// recorded outcome the caller degrades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The engine produced a fresh screenshot.
    Captured,
    /// The target path already existed; the engine was not invoked.
    Cached,
    /// The engine failed; no file was produced.
    Failed,
}

impl CaptureOutcome {
    /// Whether an image file exists at the target after this outcome.
    #[must_use]
    pub const fn produced_file(self) -> bool {
        matches!(self, Self::Captured | Self::Cached)
    }
}
