//! Server-rendered listing-portal extractor.
//!
//! The complex detail page embeds its data as streamed push chunks;
//! [`apt_briefing_extract`] digs the JSON back out by required-field
//! fingerprint:
//!
//! - complex facts: the first object carrying `"totalHouseholdNumber"`,
//! - nearest transit: the first object carrying `"walkTime"`,
//! - assigned schools: every object carrying `"walkingMinute"`.
//!
//! The page `<title>` is kept as the very last resort for a complex
//! name when no structured payload survives.

use serde_json::Value;

use crate::{SourceError, http};

/// Complex detail page, keyed by complex id.
const COMPLEX_PAGE_URL: &str = "https://fin.land.naver.com/complexes";

/// Fingerprint key identifying the complex-facts payload.
pub const COMPLEX_FINGERPRINT: &str = "totalHouseholdNumber";

/// Fingerprint key identifying embedded transit entries.
pub const TRANSIT_FINGERPRINT: &str = "walkTime";

/// Fingerprint key identifying assigned-school entries.
pub const SCHOOL_FINGERPRINT: &str = "walkingMinute";

/// Complex facts extracted from the server-rendered payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SsrComplex {
    pub name: String,
    /// Joined non-empty address components, road address parenthesized.
    pub address: String,
    pub total_units: u32,
    pub parking_total: u32,
    /// Four-digit approval year; `0` when unparseable.
    pub built_year: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Ten-digit legal division code; the first five digits key the
    /// government transaction API.
    pub legal_division_code: String,
    pub construction_company: String,
}

/// Nearest-station facts embedded in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrTransit {
    pub station_name: String,
    pub line: String,
    pub walk_minutes: u32,
}

/// One assigned-school row embedded in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrSchool {
    pub name: String,
    pub walk_minutes: u32,
    pub distance_m: u32,
}

/// Fetches the raw complex detail page. Source trouble → `None`.
pub async fn fetch_complex_page(client: &reqwest::Client, complex_id: &str) -> Option<String> {
    let url = format!("{COMPLEX_PAGE_URL}/{complex_id}");
    match http::get_text(client, &url, &[]).await {
        Ok(html) => Some(html),
        Err(e) => {
            log::warn!("complex page fetch failed for {complex_id}: {e}");
            None
        }
    }
}

/// Extracts the complex-facts payload from a fetched page.
#[must_use]
pub fn parse_complex(html: &str) -> Option<SsrComplex> {
    let value = apt_briefing_extract::extract_from_page(html, COMPLEX_FINGERPRINT)?;
    match complex_from_value(&value) {
        Ok(complex) => Some(complex),
        Err(e) => {
            log::warn!("embedded complex payload rejected: {e}");
            None
        }
    }
}

/// Maps the fingerprinted object onto [`SsrComplex`].
///
/// Observed payload shape (abridged):
///
/// ```json
/// {
///   "complexName": "중계그린",
///   "totalHouseholdNumber": 3481,
///   "parkingCount": 1311,
///   "useApproveYmd": "19901128",
///   "latitude": 37.6447, "longitude": 127.0641,
///   "legalDivisionCode": "1135010500",
///   "constructionCompany": "한신공영",
///   "address": {
///     "city": "서울시", "division": "노원구",
///     "sector": "중계동", "jibun": "509",
///     "roadName": "동일로 지하 123"
///   }
/// }
/// ```
fn complex_from_value(value: &Value) -> Result<SsrComplex, SourceError> {
    let name = value["complexName"]
        .as_str()
        .ok_or_else(|| SourceError::Malformed {
            message: "complexName missing".to_string(),
        })?
        .to_string();

    let total_units = u32_field(value, "totalHouseholdNumber");
    let parking_total = u32_field(value, "parkingCount");

    let built_year = value["useApproveYmd"]
        .as_str()
        .map_or(0, |ymd| approval_year(ymd));

    Ok(SsrComplex {
        name,
        address: assemble_address(&value["address"]),
        total_units,
        parking_total,
        built_year,
        latitude: non_zero_f64(&value["latitude"]),
        longitude: non_zero_f64(&value["longitude"]),
        legal_division_code: value["legalDivisionCode"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        construction_company: value["constructionCompany"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    })
}

/// Joins the non-empty address components and appends the road address
/// in parentheses when present.
#[must_use]
pub fn assemble_address(address: &Value) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for key in ["city", "division", "sector", "jibun"] {
        if let Some(part) = address[key].as_str()
            && !part.trim().is_empty()
        {
            parts.push(part.trim());
        }
    }

    let mut joined = parts.join(" ");
    if let Some(road) = address["roadName"].as_str()
        && !road.trim().is_empty()
    {
        if joined.is_empty() {
            joined = road.trim().to_string();
        } else {
            joined = format!("{joined} ({})", road.trim());
        }
    }
    joined
}

/// First four characters of an approval date; parse failure yields 0.
#[must_use]
pub fn approval_year(ymd: &str) -> i32 {
    ymd.get(..4).and_then(|y| y.parse().ok()).unwrap_or(0)
}

/// Extracts the embedded nearest-station entry, if any.
#[must_use]
pub fn parse_transit(html: &str) -> Option<SsrTransit> {
    let value = apt_briefing_extract::extract_from_page(html, TRANSIT_FINGERPRINT)?;
    let station_name = value["stationName"].as_str()?.to_string();
    if station_name.is_empty() {
        return None;
    }
    Some(SsrTransit {
        station_name,
        line: value["line"].as_str().unwrap_or_default().to_string(),
        walk_minutes: u32_field(&value, "walkTime"),
    })
}

/// Extracts every embedded assigned-school row, rows missing a name
/// dropped.
#[must_use]
pub fn parse_schools(html: &str) -> Vec<SsrSchool> {
    apt_briefing_extract::extract_all_from_page(html, SCHOOL_FINGERPRINT)
        .into_iter()
        .filter_map(|value| {
            let name = value["name"].as_str()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(SsrSchool {
                name,
                walk_minutes: u32_field(&value, "walkingMinute"),
                distance_m: u32_field(&value, "distance"),
            })
        })
        .collect()
}

/// Scrapes the page `<title>` for a complex name: the segment before
/// the first `|` or `-` separator, trimmed.
#[must_use]
pub fn parse_page_title(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();

    let name = title
        .split(['|', '-'])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn u32_field(value: &Value, key: &str) -> u32 {
    u32::try_from(value[key].as_u64().unwrap_or(0)).unwrap_or(0)
}

fn non_zero_f64(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| *v != 0.0)
}
