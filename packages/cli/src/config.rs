//! Configuration and input loading.
//!
//! Settings live in a TOML file; every field has a default so the tool
//! runs out of the box (in mock mode, with no API key, against the
//! bundled reference point). The agent profile is a second small TOML
//! with the same missing-file tolerance.

use std::path::{Path, PathBuf};

use apt_briefing_models::{AgentProfile, BriefingInput};
use serde::Deserialize;

/// The reference point transit times are quoted against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Default for ReferencePoint {
    fn default() -> Self {
        Self {
            name: "강남역".to_string(),
            lat: 37.497_942,
            lng: 127.027_621,
        }
    }
}

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Government transaction API key; absent means mock price data.
    pub public_data_api_key: Option<String>,
    pub reference_point: ReferencePoint,
    pub output_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    /// Skip all crawling and build the deck from sample data.
    pub mock: bool,
    /// Randomized pauses between same-host calls.
    pub politeness: bool,
    pub browser_sessions: Option<usize>,
    pub http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_data_api_key: None,
            reference_point: ReferencePoint::default(),
            output_dir: None,
            work_dir: None,
            mock: false,
            politeness: true,
            browser_sessions: None,
            http_timeout_secs: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| "output".into())
    }

    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| "work".into())
    }

    #[must_use]
    pub fn browser_sessions(&self) -> usize {
        self.browser_sessions.unwrap_or(2)
    }

    #[must_use]
    pub fn http_timeout_secs(&self) -> u64 {
        self.http_timeout_secs.unwrap_or(30)
    }
}

/// Loads the config, defaulting everything when the file is absent.
#[must_use]
pub fn load_config(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::de::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("config {} unreadable, using defaults: {e}", path.display());
                Config::default()
            }
        },
        Err(_) => {
            log::info!("no config at {}, using defaults", path.display());
            Config::default()
        }
    }
}

/// Loads the agent profile, with built-in defaults when absent.
#[must_use]
pub fn load_agent_profile(path: &Path) -> AgentProfile {
    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct RawProfile {
        name: Option<String>,
        company: Option<String>,
        qualifications: Option<Vec<String>>,
        phone: Option<String>,
        email: Option<String>,
        slogan: Option<String>,
    }

    let raw: RawProfile = std::fs::read_to_string(path)
        .ok()
        .and_then(|text| toml::de::from_str(&text).ok())
        .unwrap_or_default();

    let defaults = AgentProfile::default();
    AgentProfile {
        name: raw.name.unwrap_or(defaults.name),
        company: raw.company.unwrap_or(defaults.company),
        qualifications: raw.qualifications.unwrap_or(defaults.qualifications),
        phone: raw.phone.unwrap_or(defaults.phone),
        email: raw.email.unwrap_or(defaults.email),
        slogan: raw.slogan.unwrap_or(defaults.slogan),
    }
}

/// Loads a briefing input JSON file.
///
/// # Errors
///
/// Returns an error string suitable for operator display when the file
/// is missing or malformed — unlike source trouble, bad input is fatal.
pub fn load_input(path: &Path) -> Result<BriefingInput, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read input {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("input {} is not valid: {e}", path.display()))
}
