#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text place name → coordinates.
//!
//! Resolves school names and addresses against the OpenStreetMap
//! search endpoint, trying several query variants in order:
//!
//! 1. the raw name,
//! 2. the name with the `서울` prefix stripped (re-suffixed with
//!    ` 서울` so the search stays scoped),
//! 3. the raw address, when one is available.
//!
//! The first result with non-zero coordinates wins. Every failure mode
//! (HTTP, parse, empty result set) degrades to `None` with a warning —
//! geocoding is always a best-effort step in a fallback chain.

use thiserror::Error;

/// Public OSM search endpoint.
const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Identifying agent string requested by the endpoint's usage policy.
const USER_AGENT: &str = "apt-briefing/0.1 (briefing deck generator)";

/// Prefix stripped for the second query variant.
const CITY_PREFIX: &str = "서울";

/// Errors from a single geocoding request.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response was not the expected JSON array.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// A resolved coordinate pair (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Builds the ordered query variants for a place lookup.
#[must_use]
pub fn query_variants(name: &str, address: Option<&str>) -> Vec<String> {
    let mut variants = vec![name.to_string()];

    if let Some(stripped) = name.strip_prefix(CITY_PREFIX)
        && !stripped.is_empty()
    {
        variants.push(format!("{stripped} {CITY_PREFIX}"));
    }

    if let Some(addr) = address
        && !addr.trim().is_empty()
    {
        variants.push(addr.trim().to_string());
    }

    variants
}

/// Resolves a place name to coordinates, trying each variant in order.
///
/// Returns `None` when every variant fails or resolves to zero
/// coordinates.
pub async fn geocode_place(
    client: &reqwest::Client,
    name: &str,
    address: Option<&str>,
) -> Option<Coordinates> {
    for query in query_variants(name, address) {
        match search_once(client, &query).await {
            Ok(Some(coords)) => {
                log::debug!("geocoded '{query}' -> ({}, {})", coords.lat, coords.lng);
                return Some(coords);
            }
            Ok(None) => log::debug!("no geocode result for '{query}'"),
            Err(e) => log::warn!("geocode request failed for '{query}': {e}"),
        }
    }

    log::warn!("geocoding exhausted all variants for '{name}'");
    None
}

/// A named place returned by the bounded nearby search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Half-width of the nearby-search bounding box, in degrees.
const NEARBY_BOX_DEG: f64 = 0.02;

/// Marker identifying station names.
const STATION_MARKER: &str = "역";

/// Searches for a subway station near a coordinate, bounded to a small
/// box around it. Returns the first result whose name carries the
/// station marker; everything else is `None`.
pub async fn search_nearby_station(
    client: &reqwest::Client,
    lat: f64,
    lng: f64,
) -> Option<NearbyPlace> {
    let viewbox = format!(
        "{},{},{},{}",
        lng - NEARBY_BOX_DEG,
        lat + NEARBY_BOX_DEG,
        lng + NEARBY_BOX_DEG,
        lat - NEARBY_BOX_DEG
    );

    let resp = client
        .get(SEARCH_URL)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .query(&[
            ("q", STATION_MARKER),
            ("format", "jsonv2"),
            ("limit", "5"),
            ("countrycodes", "kr"),
            ("viewbox", viewbox.as_str()),
            ("bounded", "1"),
        ])
        .send()
        .await
        .map_err(|e| log::warn!("nearby station search failed: {e}"))
        .ok()?;

    let body: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| log::warn!("nearby station response unreadable: {e}"))
        .ok()?;

    parse_nearby_station(&body)
}

/// Picks the first station-marked result with usable coordinates.
fn parse_nearby_station(body: &serde_json::Value) -> Option<NearbyPlace> {
    let results = body.as_array()?;
    results.iter().find_map(|entry| {
        let name = entry["name"]
            .as_str()
            .or_else(|| entry["display_name"].as_str())?;
        if !name.contains(STATION_MARKER) {
            return None;
        }
        let lat = entry["lat"].as_str().and_then(|s| s.parse::<f64>().ok())?;
        let lng = entry["lon"].as_str().and_then(|s| s.parse::<f64>().ok())?;
        if lat == 0.0 || lng == 0.0 {
            return None;
        }
        Some(NearbyPlace {
            name: name.to_string(),
            lat,
            lng,
        })
    })
}

/// One search request for one query string.
async fn search_once(
    client: &reqwest::Client,
    query: &str,
) -> Result<Option<Coordinates>, GeocodeError> {
    let resp = client
        .get(SEARCH_URL)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .query(&[
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", "kr"),
        ])
        .send()
        .await?;

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses the search response into coordinates, rejecting zero points.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "search response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing lat in search result".to_string(),
        })?;

    let lng = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing lon in search result".to_string(),
        })?;

    if lat == 0.0 || lng == 0.0 {
        return Ok(None);
    }

    Ok(Some(Coordinates { lat, lng }))
}
