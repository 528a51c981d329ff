#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance, travel-time estimation, and the embedded
//! station directory.
//!
//! The directory is the last-resort nearest-station source: when
//! neither the listing page nor the place-search API names a station,
//! the location resolver searches these coordinates by haversine
//! distance. Major trunk lines are preferred within a radius because a
//! marginally closer light-rail stop is rarely the station a buyer
//! cares about.

use serde::Deserialize;

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Assumed walking pace for distance → minutes estimation.
const WALK_KMH: f64 = 4.5;

/// Assumed door-to-door transit speed for the rough fallback estimate.
const TRANSIT_KMH: f64 = 22.0;

/// Fixed overhead (access/egress/waiting) added to transit estimates.
const TRANSIT_OVERHEAD_MIN: u32 = 10;

/// A major-line station within this radius beats a closer minor one.
pub const MAJOR_PREFERENCE_RADIUS_M: f64 = 1_500.0;

/// Trunk lines considered "major" for station disambiguation.
const MAJOR_LINES: &[&str] = &[
    "1호선",
    "2호선",
    "3호선",
    "4호선",
    "5호선",
    "6호선",
    "7호선",
    "8호선",
    "9호선",
    "신분당선",
    "분당선",
    "수인분당선",
    "공항철도",
    "경의중앙선",
];

/// One station in the embedded directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    pub name: String,
    pub line: String,
    pub lat: f64,
    pub lng: f64,
}

/// Wrapper for the `stations.toml` document.
#[derive(Debug, Deserialize)]
struct StationDirectory {
    stations: Vec<Station>,
}

/// A directory hit with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct StationHit {
    pub station: Station,
    pub distance_m: f64,
}

const STATIONS_TOML: &str = include_str!("../stations/stations.toml");

/// Returns the embedded station directory.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (a compile-time artifact,
/// exercised by tests).
#[must_use]
pub fn station_directory() -> Vec<Station> {
    let parsed: StationDirectory =
        toml::de::from_str(STATIONS_TOML).unwrap_or_else(|e| panic!("invalid stations.toml: {e}"));
    parsed.stations
}

/// Great-circle distance between two WGS84 points, in meters.
#[must_use]
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Estimated walking minutes for a distance, floored at one minute.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn walk_minutes(distance_m: f64) -> u32 {
    let minutes = (distance_m / 1000.0 * 60.0 / WALK_KMH).round() as u32;
    minutes.max(1)
}

/// Rough transit proxy for a station beyond walking range: a third of
/// the walking time, floored at five minutes.
#[must_use]
pub const fn station_transit_proxy_minutes(walk_minutes: u32) -> u32 {
    let proxy = walk_minutes / 3;
    if proxy < 5 { 5 } else { proxy }
}

/// Fallback transit-time estimate when the directions API yields
/// nothing: straight-line distance at an assumed speed plus fixed
/// overhead, floored at the overhead itself.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn transit_estimate_minutes(distance_m: f64) -> u32 {
    let riding = (distance_m / 1000.0 / TRANSIT_KMH * 60.0).round() as u32;
    (riding + TRANSIT_OVERHEAD_MIN).max(TRANSIT_OVERHEAD_MIN)
}

/// Whether a line name is on the major-trunk allow-list.
#[must_use]
pub fn is_major_line(line: &str) -> bool {
    MAJOR_LINES.contains(&line)
}

/// Picks the nearest station among `stations`, preferring a major-line
/// station within [`MAJOR_PREFERENCE_RADIUS_M`] over a geometrically
/// closer minor-line one.
#[must_use]
pub fn nearest_station_among(stations: &[Station], lat: f64, lng: f64) -> Option<StationHit> {
    let mut closest: Option<StationHit> = None;
    let mut closest_major: Option<StationHit> = None;

    for station in stations {
        let distance_m = haversine_m(lat, lng, station.lat, station.lng);
        let hit = StationHit {
            station: station.clone(),
            distance_m,
        };

        if is_major_line(&station.line)
            && distance_m <= MAJOR_PREFERENCE_RADIUS_M
            && closest_major
                .as_ref()
                .is_none_or(|best| distance_m < best.distance_m)
        {
            closest_major = Some(hit.clone());
        }

        if closest
            .as_ref()
            .is_none_or(|best| distance_m < best.distance_m)
        {
            closest = Some(hit);
        }
    }

    closest_major.or(closest)
}

/// [`nearest_station_among`] over the embedded directory.
#[must_use]
pub fn nearest_station(lat: f64, lng: f64) -> Option<StationHit> {
    nearest_station_among(&station_directory(), lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, line: &str, lat: f64, lng: f64) -> Station {
        Station {
            name: name.to_string(),
            line: line.to_string(),
            lat,
            lng,
        }
    }

    #[test]
    fn directory_parses_and_is_non_empty() {
        let stations = station_directory();
        assert!(stations.len() >= 20);
        assert!(stations.iter().any(|s| s.name == "강남역"));
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_m(37.5, 127.0, 37.5, 127.0).abs() < 1e-9);
    }

    #[test]
    fn haversine_is_symmetric() {
        let d1 = haversine_m(37.497942, 127.027621, 37.513305, 127.100129);
        let d2 = haversine_m(37.513305, 127.100129, 37.497942, 127.027621);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn haversine_known_seoul_distance() {
        // 강남역 ↔ 역삼역 is roughly 0.85 km along the great circle.
        let d = haversine_m(37.497942, 127.027621, 37.500622, 127.036456);
        assert!((d - 840.0).abs() < 840.0 * 0.05, "got {d}");
    }

    #[test]
    fn walk_minutes_floor_is_one() {
        assert_eq!(walk_minutes(10.0), 1);
    }

    #[test]
    fn walk_minutes_at_assumed_pace() {
        // 750 m at 4.5 km/h = 10 minutes.
        assert_eq!(walk_minutes(750.0), 10);
        assert_eq!(walk_minutes(1500.0), 20);
    }

    #[test]
    fn transit_proxy_is_third_of_walk_floored() {
        assert_eq!(station_transit_proxy_minutes(30), 10);
        assert_eq!(station_transit_proxy_minutes(12), 5);
        assert_eq!(station_transit_proxy_minutes(0), 5);
    }

    #[test]
    fn transit_estimate_has_minimum() {
        assert_eq!(transit_estimate_minutes(0.0), 10);
        // 11 km at 22 km/h = 30 min riding + 10 overhead.
        assert_eq!(transit_estimate_minutes(11_000.0), 40);
    }

    #[test]
    fn prefers_major_line_within_radius() {
        let stations = vec![
            station("경전철역", "우이신설선", 37.0027, 127.0),
            station("간선역", "7호선", 37.0108, 127.0),
        ];
        // Query point ~300 m from the minor station, ~1.2 km from the
        // major one.
        let hit = nearest_station_among(&stations, 37.0, 127.0).unwrap();
        assert_eq!(hit.station.name, "간선역");
        assert!(hit.distance_m > 1_000.0);
    }

    #[test]
    fn falls_back_to_closest_when_major_is_far() {
        let stations = vec![
            station("경전철역", "우이신설선", 37.0027, 127.0),
            station("간선역", "7호선", 37.018, 127.0),
        ];
        // The major station sits ~2 km out, beyond the preference
        // radius, so the closer minor station wins.
        let hit = nearest_station_among(&stations, 37.0, 127.0).unwrap();
        assert_eq!(hit.station.name, "경전철역");
    }

    #[test]
    fn empty_directory_yields_none() {
        assert!(nearest_station_among(&[], 37.0, 127.0).is_none());
    }

    #[test]
    fn major_line_classification() {
        assert!(is_major_line("2호선"));
        assert!(is_major_line("신분당선"));
        assert!(!is_major_line("우이신설선"));
        assert!(!is_major_line(""));
    }
}
