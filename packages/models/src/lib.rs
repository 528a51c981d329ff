#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record types for the apartment briefing pipeline.
//!
//! Every resolver produces exactly one of these record types; the
//! aggregator composes them into [`AggregatedComplex`], which is the
//! boundary artifact handed to the deck renderer. Records are plain
//! serde structs — all derivation logic (hashtags, summary text, price
//! statistics) lives in the packages that own it.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label substituted wherever a textual fact could not be resolved.
pub const NO_DATA_LABEL: &str = "정보 없음";

/// Sentinel complex id for listings whose URL could not be parsed.
pub const UNKNOWN_COMPLEX_ID: &str = "unknown";

/// Cached image kinds, used to name files under the per-complex work
/// directory (`<work_dir>/<complex_id>/<kind>.png`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageKind {
    /// Aerial photo of the complex.
    Aerial,
    /// Site plan (building layout) image.
    SitePlan,
    /// Screenshot of the complex detail page.
    ComplexDetail,
    /// Walking route to the nearest station.
    WalkRoute,
    /// Transit route to the reference point.
    TransitRoute,
    /// Walking route to the assigned elementary school.
    ElementaryRoute,
    /// Secondary-school zone map capture.
    SchoolZone,
    /// Price trend chart capture.
    PriceChart,
    /// Unit floor plan.
    FloorPlan,
}

// ── User input ──────────────────────────────────────────────────────

/// One for-sale listing supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInput {
    /// Listing page URL; complex and article ids are extracted from it.
    pub url: String,
    /// Asking price as entered (e.g., `"6.4억"`).
    pub price: String,
    /// Building number (e.g., `"124동"`).
    pub dong: String,
    /// Unit number, if known.
    #[serde(default)]
    pub ho: Option<String>,
    /// Floor display string (e.g., `"7/15층"`).
    pub floor: String,
    /// Facing direction free text.
    #[serde(default)]
    pub direction: Option<String>,
    /// Layout free text (e.g., `"복도식 방2화1"`).
    #[serde(default)]
    pub structure: Option<String>,
    /// Agent memo free text.
    #[serde(default)]
    pub memo: Option<String>,
}

/// A full briefing request: one customer, one or more listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingInput {
    /// Customer display name (e.g., `"유니냥님"`).
    pub customer_name: String,
    /// Listings to include, in presentation order.
    pub listings: Vec<ListingInput>,
}

/// Agent profile shown on the cover/contact slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub company: String,
    pub qualifications: Vec<String>,
    pub phone: String,
    pub email: String,
    pub slogan: String,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: "홍길동".to_string(),
            company: "부동산중개법인".to_string(),
            qualifications: vec!["공인중개사".to_string()],
            phone: "010-0000-0000".to_string(),
            email: "agent@example.com".to_string(),
            slogan: "전문가로서 분석하고, 고객의 편에서 중개하겠습니다".to_string(),
        }
    }
}

// ── Resolver outputs ────────────────────────────────────────────────

/// Apartment complex identity and headline facts.
///
/// `parking_per_unit` is always derived from the two counts via
/// [`parking_ratio`] — construction sites must never set it
/// independently. `hashtags` are re-derived by the aggregator whenever
/// a contributing fact (notably walk minutes) changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexRecord {
    pub complex_id: String,
    pub name: String,
    pub address: String,
    pub total_units: u32,
    pub parking_total: u32,
    pub parking_per_unit: f64,
    /// Four-digit approval year; `0` when unknown.
    pub built_year: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub aerial_photo_path: Option<PathBuf>,
    #[serde(default)]
    pub site_plan_path: Option<PathBuf>,
    #[serde(default)]
    pub detail_capture_path: Option<PathBuf>,
}

impl ComplexRecord {
    /// The defined empty record for a complex no source could describe.
    #[must_use]
    pub fn placeholder(complex_id: &str) -> Self {
        Self {
            complex_id: complex_id.to_string(),
            name: NO_DATA_LABEL.to_string(),
            address: String::new(),
            total_units: 0,
            parking_total: 0,
            parking_per_unit: 0.0,
            built_year: 0,
            latitude: None,
            longitude: None,
            hashtags: Vec::new(),
            aerial_photo_path: None,
            site_plan_path: None,
            detail_capture_path: None,
        }
    }

    /// Coordinates as a pair, when both are present and non-zero.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Parking spots per household, rounded to two decimals.
///
/// Zero households yields `0.0` rather than a division error.
#[must_use]
pub fn parking_ratio(parking_total: u32, total_units: u32) -> f64 {
    if total_units == 0 {
        return 0.0;
    }
    (f64::from(parking_total) / f64::from(total_units) * 100.0).round() / 100.0
}

/// One real transaction. Immutable once created; all numeric
/// comparisons use `price_raw`, never the display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    /// Display area (e.g., `"24평"`).
    pub area_pyeong: String,
    pub area_m2: f64,
    pub floor: i32,
    /// Display price (e.g., `"5억 9000만원"`).
    pub price: String,
    /// Canonical amount in won.
    pub price_raw: i64,
}

/// Per-complex transaction history and derived statistics.
///
/// The month counts are computed against the current wall-clock month
/// (injected as `today` by the resolver), not the latest transaction's
/// month — a slow market can legitimately show zero recent trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub complex_id: String,
    /// Most-recent-first.
    pub transactions: Vec<TransactionRecord>,
    pub month1_count: usize,
    pub month1_label: String,
    pub month2_count: usize,
    pub month2_label: String,
    pub recent_3m_high: String,
    pub recent_3m_low: String,
    pub all_time_high: String,
    pub all_time_high_date: String,
    #[serde(default)]
    pub chart_image_path: Option<PathBuf>,
}

/// Which travel time is the headline figure for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlineTime {
    /// Station is walkable; minutes on foot.
    Walk(u32),
    /// Station is far; rough transit minutes.
    Transit(u32),
}

/// Transit and reference-point accessibility for a complex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub complex_id: String,
    pub nearest_station: String,
    pub station_line: String,
    pub walk_minutes: u32,
    /// Present only when the station is beyond the walkable threshold.
    #[serde(default)]
    pub station_transit_minutes: Option<u32>,
    /// Transit minutes to the configured reference point.
    pub gangnam_minutes: u32,
    #[serde(default)]
    pub walk_route_image_path: Option<PathBuf>,
    #[serde(default)]
    pub transit_route_image_path: Option<PathBuf>,
}

impl LocationRecord {
    /// The defined empty record when every location source failed.
    #[must_use]
    pub fn placeholder(complex_id: &str) -> Self {
        Self {
            complex_id: complex_id.to_string(),
            nearest_station: NO_DATA_LABEL.to_string(),
            station_line: String::new(),
            walk_minutes: 0,
            station_transit_minutes: None,
            gangnam_minutes: 0,
            walk_route_image_path: None,
            transit_route_image_path: None,
        }
    }

    /// Headline time per the 10-minute walk threshold: walking time if
    /// the station is within 10 minutes, otherwise the transit proxy.
    #[must_use]
    pub const fn headline_time(&self) -> HeadlineTime {
        match self.station_transit_minutes {
            Some(transit) => HeadlineTime::Transit(transit),
            None => HeadlineTime::Walk(self.walk_minutes),
        }
    }
}

/// Assigned elementary school details plus zone-map captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub complex_id: String,
    pub elementary_name: String,
    #[serde(default)]
    pub elementary_address: String,
    #[serde(default)]
    pub elementary_phone: String,
    /// Founding date as `"YYYY.MM.DD"`.
    #[serde(default)]
    pub elementary_founding_date: String,
    /// Public/private founding classification.
    #[serde(default)]
    pub elementary_type: String,
    #[serde(default)]
    pub elementary_education_office: String,
    #[serde(default)]
    pub elementary_coedu: String,
    #[serde(default)]
    pub elementary_homepage: String,
    /// Display string (e.g., `"도보 8분"`).
    #[serde(default)]
    pub walk_distance: String,
    #[serde(default)]
    pub distance_m: u32,
    #[serde(default)]
    pub elementary_map_path: Option<PathBuf>,
    #[serde(default)]
    pub zone_map_path: Option<PathBuf>,
}

impl SchoolRecord {
    /// The defined empty record when every school source failed.
    #[must_use]
    pub fn placeholder(complex_id: &str) -> Self {
        Self {
            complex_id: complex_id.to_string(),
            elementary_name: NO_DATA_LABEL.to_string(),
            elementary_address: String::new(),
            elementary_phone: String::new(),
            elementary_founding_date: String::new(),
            elementary_type: String::new(),
            elementary_education_office: String::new(),
            elementary_coedu: String::new(),
            elementary_homepage: String::new(),
            walk_distance: String::new(),
            distance_m: 0,
            elementary_map_path: None,
            zone_map_path: None,
        }
    }
}

/// One listing enriched with resolved detail fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub complex_id: String,
    pub complex_name: String,
    pub dong: String,
    pub floor: String,
    pub price: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub structure: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_pyeong: Option<String>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub floor_plan_image_path: Option<PathBuf>,
    #[serde(default)]
    pub dong_location_image_path: Option<PathBuf>,
}

impl ListingDetail {
    /// Detail built from user input alone, used when the article lookup
    /// fails or the listing URL carried no article id.
    #[must_use]
    pub fn from_input(complex_id: &str, complex_name: &str, input: &ListingInput) -> Self {
        Self {
            complex_id: complex_id.to_string(),
            complex_name: complex_name.to_string(),
            dong: input.dong.clone(),
            floor: input.floor.clone(),
            price: input.price.clone(),
            direction: input.direction.clone(),
            structure: input.structure.clone(),
            memo: input.memo.clone(),
            rooms: None,
            bathrooms: None,
            area_pyeong: None,
            area_m2: None,
            floor_plan_image_path: None,
            dong_location_image_path: None,
        }
    }
}

/// Everything known about one complex — the unit the renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedComplex {
    pub complex: ComplexRecord,
    #[serde(default)]
    pub price: Option<PriceSummary>,
    #[serde(default)]
    pub location: Option<LocationRecord>,
    #[serde(default)]
    pub school: Option<SchoolRecord>,
    pub listings: Vec<ListingDetail>,
}
