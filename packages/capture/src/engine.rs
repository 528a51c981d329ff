//! The browser-engine trait and the capture-script data model.
//!
//! A [`CaptureScript`] is a fixed, declarative interaction sequence:
//! navigate, perform steps, screenshot a target. Scripts are plain
//! data so the builders in [`crate::scripts`] can be unit-tested
//! without any browser.

use std::path::Path;

use async_trait::async_trait;

use crate::CaptureError;

/// Default viewport for capture pages.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 900);

/// One interaction step performed after navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Sleep for the given milliseconds (tile/asset settling).
    WaitMs(u64),
    /// Wait until a selector is present.
    WaitForSelector(String),
    /// Fill a form field.
    Fill {
        selector: String,
        value: String,
    },
    /// Press a keyboard key (e.g. `"Enter"`).
    Press(String),
    /// Click an element.
    Click(String),
    /// Run a script in the page (layer toggles, panel hiding).
    Evaluate(String),
}

/// What part of the page to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The full viewport.
    Viewport,
    /// A single element.
    Element(String),
    /// A clipped region, in CSS pixels.
    Clip { x: u32, y: u32, width: u32, height: u32 },
}

/// A full capture request: page, steps, and screenshot target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureScript {
    pub url: String,
    pub steps: Vec<ScriptStep>,
    pub target: CaptureTarget,
    pub viewport: (u32, u32),
}

impl CaptureScript {
    /// A viewport capture of `url` with no interaction steps.
    #[must_use]
    pub fn page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            steps: Vec::new(),
            target: CaptureTarget::Viewport,
            viewport: DEFAULT_VIEWPORT,
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: ScriptStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the screenshot target.
    #[must_use]
    pub fn target(mut self, target: CaptureTarget) -> Self {
        self.target = target;
        self
    }
}

/// The external headless-browser collaborator.
///
/// Implementations drive a real browser; the shipped pipeline also
/// runs with no engine at all, degrading every capture to the defined
/// placeholder behavior.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Runs the script and writes the screenshot to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] when navigation, any step, or the
    /// screenshot itself fails. Implementations must not leave a
    /// partial file at `output` on failure.
    async fn capture(&self, script: &CaptureScript, output: &Path) -> Result<(), CaptureError>;
}

/// Percent-encodes a URL path component (RFC 3986 unreserved set kept).
#[must_use]
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 3);
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_steps_in_order() {
        let script = CaptureScript::page("https://example.com")
            .step(ScriptStep::WaitMs(500))
            .step(ScriptStep::Press("Enter".to_string()))
            .target(CaptureTarget::Element("#map".to_string()));
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0], ScriptStep::WaitMs(500));
        assert_eq!(script.target, CaptureTarget::Element("#map".to_string()));
    }

    #[test]
    fn encodes_korean_component() {
        assert_eq!(encode_component("강남역"), "%EA%B0%95%EB%82%A8%EC%97%AD");
        assert_eq!(encode_component("abc-123_~."), "abc-123_~.");
        assert_eq!(encode_component("a b"), "a%20b");
    }
}
