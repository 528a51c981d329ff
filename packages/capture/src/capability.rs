//! Browser capability object and scoped sessions.
//!
//! Whether a browser engine is available is decided once, explicitly,
//! when the capability is constructed — resolvers receive the
//! capability by reference instead of consulting ambient state, so
//! tests can force either branch.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::CaptureOutcome;
use crate::engine::{BrowserEngine, CaptureScript};

/// Explicitly-initialized capability handle. Cheap to clone.
#[derive(Clone)]
pub struct BrowserCapability {
    engine: Option<Arc<dyn BrowserEngine>>,
    sessions: Arc<Semaphore>,
}

impl BrowserCapability {
    /// A capability backed by a real engine with at most
    /// `max_sessions` concurrent sessions.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn BrowserEngine>, max_sessions: usize) -> Self {
        Self {
            engine: Some(engine),
            sessions: Arc::new(Semaphore::new(max_sessions.max(1))),
        }
    }

    /// The no-browser capability: every acquire returns `None` and
    /// captures degrade to placeholders downstream.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            engine: None,
            sessions: Arc::new(Semaphore::new(1)),
        }
    }

    /// Whether an engine is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Acquires a session scoped to one complex's captures. Returns
    /// `None` immediately when no engine is available; otherwise waits
    /// for a free slot. The session's permit is released on drop, even
    /// when a capture sequence fails midway.
    pub async fn acquire(&self) -> Option<BrowserSession> {
        let engine = self.engine.clone()?;
        let permit = self.sessions.clone().acquire_owned().await.ok()?;
        Some(BrowserSession {
            engine,
            _permit: permit,
        })
    }
}

/// One scoped browser session.
pub struct BrowserSession {
    engine: Arc<dyn BrowserEngine>,
    _permit: OwnedSemaphorePermit,
}

impl BrowserSession {
    /// Runs a capture script, short-circuiting when `output` already
    /// exists — re-capturing the same target path is never worth the
    /// cost. Engine failures are logged and reported, not raised.
    pub async fn capture(&self, script: &CaptureScript, output: &Path) -> CaptureOutcome {
        if output.exists() {
            log::debug!("capture cache hit: {}", output.display());
            return CaptureOutcome::Cached;
        }

        if let Some(parent) = output.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            log::warn!("capture dir create failed for {}: {e}", output.display());
            return CaptureOutcome::Failed;
        }

        match self.engine.capture(script, output).await {
            Ok(()) => CaptureOutcome::Captured,
            Err(e) => {
                log::warn!("capture failed for {}: {e}", output.display());
                CaptureOutcome::Failed
            }
        }
    }
}
