//! Directions API client for the reference-point transit time.
//!
//! The directions service has answered at least three response shapes
//! over time. Each recognized shape is normalized through one adapter;
//! an unrecognized shape is `None`, never a partially-populated guess.
//!
//! Units are not declared in the payload: durations above 300 are
//! taken to be seconds and converted, anything else is already minutes.

use serde_json::Value;

use crate::http;

const DIRECTIONS_URL: &str = "https://map.naver.com/p/api/directions/transit";

/// Threshold above which a raw duration is interpreted as seconds.
const SECONDS_THRESHOLD: f64 = 300.0;

/// Fetches the transit duration in minutes between two points.
/// Source trouble or an unrecognized payload → `None`.
pub async fn fetch_transit_minutes(
    client: &reqwest::Client,
    from: (f64, f64),
    to: (f64, f64),
) -> Option<u32> {
    let start = format!("{},{}", from.1, from.0);
    let goal = format!("{},{}", to.1, to.0);

    let body = match http::get_json(
        client,
        DIRECTIONS_URL,
        &[("start", start.as_str()), ("goal", goal.as_str())],
    )
    .await
    {
        Ok(body) => body,
        Err(e) => {
            log::warn!("directions request failed: {e}");
            return None;
        }
    };

    let minutes = duration_minutes(&body);
    if minutes.is_none() {
        log::warn!("directions response shape not recognized");
    }
    minutes
}

/// Normalizes any recognized response shape to minutes.
///
/// Shapes tried in order:
/// 1. `{"route": {"<mode>": [{"summary": {"duration": X}}]}}`
/// 2. `{"routes": [{"duration": X}]}`
/// 3. `{"duration": X}`
#[must_use]
pub fn duration_minutes(body: &Value) -> Option<u32> {
    raw_duration(body).map(normalize_duration)
}

fn raw_duration(body: &Value) -> Option<f64> {
    if let Some(route) = body["route"].as_object() {
        for candidates in route.values() {
            if let Some(duration) = candidates
                .as_array()
                .and_then(|list| list.first())
                .and_then(|first| first["summary"]["duration"].as_f64())
            {
                return Some(duration);
            }
        }
    }

    if let Some(duration) = body["routes"]
        .as_array()
        .and_then(|list| list.first())
        .and_then(|first| first["duration"].as_f64())
    {
        return Some(duration);
    }

    body["duration"].as_f64()
}

/// Durations above the threshold are seconds; convert and round.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_duration(raw: f64) -> u32 {
    if raw > SECONDS_THRESHOLD {
        (raw / 60.0).round() as u32
    } else {
        raw.round() as u32
    }
}
