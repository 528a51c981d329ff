//! Randomized pauses between consecutive calls to the same host.
//!
//! A courtesy, not a correctness requirement — tests disable it.

use std::time::Duration;

/// Politeness delay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    enabled: bool,
    min_ms: u64,
    max_ms: u64,
}

impl Politeness {
    /// The production default: 1–3 seconds between calls.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            enabled: true,
            min_ms: 1_000,
            max_ms: 3_000,
        }
    }

    /// A shorter pause for the paginated transaction API.
    #[must_use]
    pub const fn short() -> Self {
        Self {
            enabled: true,
            min_ms: 500,
            max_ms: 1_500,
        }
    }

    /// No pause at all (tests, mock mode).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            min_ms: 0,
            max_ms: 0,
        }
    }

    /// Whether pauses are active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sleeps for a random duration in the configured range.
    pub async fn pause(&self) {
        if !self.enabled {
            return;
        }
        let ms = if self.max_ms > self.min_ms {
            fastrand::u64(self.min_ms..=self.max_ms)
        } else {
            self.min_ms
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
