//! Location resolver: nearest station, headline travel time, and the
//! reference-point transit figure.
//!
//! Station chain: (1) the embedded transit entry on the listing page,
//! (2) a place search near the complex coordinates filtered to
//! station-marked names, (3) the embedded station directory by
//! great-circle distance with major-line preference. Route screenshots
//! are opportunistic; their failure never blocks the record, the image
//! paths just stay empty for the renderer to substitute.

use apt_briefing_capture::capability::BrowserSession;
use apt_briefing_capture::scripts;
use apt_briefing_models::{ComplexRecord, ImageKind, LocationRecord};
use apt_briefing_source::ssr::SsrTransit;
use async_trait::async_trait;

use crate::{ResolveContext, existing};

/// Marker that identifies station names in place-search results.
const STATION_MARKER: &str = "역";

/// A nearby-station candidate from the place-search step.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Sources the location chain draws from.
#[async_trait]
pub trait LocationSources: Send + Sync {
    /// Step 1: transit entry embedded in the listing page.
    async fn ssr_transit(&self, complex_id: &str) -> Option<SsrTransit>;

    /// Step 2: station-marked place near the coordinates.
    async fn nearby_station(&self, lat: f64, lng: f64) -> Option<NearbyStation>;

    /// Transit duration in minutes between two points, via the
    /// directions API.
    async fn transit_minutes(&self, from: (f64, f64), to: (f64, f64)) -> Option<u32>;
}

/// The station facts the chain settles on before assembling the record.
struct StationFacts {
    name: String,
    line: String,
    walk_minutes: u32,
    coordinates: Option<(f64, f64)>,
}

/// Resolves the location record for one complex.
pub async fn resolve_location(
    ctx: &ResolveContext,
    sources: &dyn LocationSources,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
) -> LocationRecord {
    let complex_id = complex.complex_id.as_str();
    let coordinates = complex.coordinates();

    let station = find_station(sources, complex_id, coordinates).await;
    let station_coords = station.as_ref().and_then(|facts| facts.coordinates);

    let mut record = match station {
        Some(facts) => assemble(complex_id, &facts),
        None => {
            log::warn!("location {complex_id}: no station from any source");
            LocationRecord::placeholder(complex_id)
        }
    };

    // The reference-point figure is independent of the station chain.
    if let Some(from) = coordinates {
        record.gangnam_minutes = reference_minutes(ctx, sources, from).await;
    }

    capture_routes(ctx, session, complex, station_coords, &mut record).await;
    record
}

async fn find_station(
    sources: &dyn LocationSources,
    complex_id: &str,
    coordinates: Option<(f64, f64)>,
) -> Option<StationFacts> {
    if let Some(transit) = sources.ssr_transit(complex_id).await {
        log::info!(
            "location {complex_id}: embedded transit {} ({})",
            transit.station_name,
            transit.line
        );
        return Some(StationFacts {
            name: transit.station_name,
            line: transit.line,
            walk_minutes: transit.walk_minutes.max(1),
            coordinates: None,
        });
    }

    let (lat, lng) = coordinates?;

    if let Some(place) = sources.nearby_station(lat, lng).await {
        if place.name.contains(STATION_MARKER) {
            let distance = apt_briefing_spatial::haversine_m(lat, lng, place.lat, place.lng);
            log::info!(
                "location {complex_id}: place search found {} at {distance:.0}m",
                place.name
            );
            return Some(StationFacts {
                name: place.name,
                line: String::new(),
                walk_minutes: apt_briefing_spatial::walk_minutes(distance),
                coordinates: Some((place.lat, place.lng)),
            });
        }
        log::debug!(
            "location {complex_id}: place result '{}' is not a station",
            place.name
        );
    }

    let hit = apt_briefing_spatial::nearest_station(lat, lng)?;
    log::info!(
        "location {complex_id}: directory fallback {} ({}) at {:.0}m",
        hit.station.name,
        hit.station.line,
        hit.distance_m
    );
    Some(StationFacts {
        name: hit.station.name.clone(),
        line: hit.station.line.clone(),
        walk_minutes: apt_briefing_spatial::walk_minutes(hit.distance_m),
        coordinates: Some((hit.station.lat, hit.station.lng)),
    })
}

/// Applies the headline-time rule: a station within a 10-minute walk
/// headlines the walking time; beyond that, the transit proxy.
fn assemble(complex_id: &str, facts: &StationFacts) -> LocationRecord {
    let station_transit_minutes = (facts.walk_minutes > 10)
        .then(|| apt_briefing_spatial::station_transit_proxy_minutes(facts.walk_minutes));

    LocationRecord {
        complex_id: complex_id.to_string(),
        nearest_station: facts.name.clone(),
        station_line: facts.line.clone(),
        walk_minutes: facts.walk_minutes,
        station_transit_minutes,
        gangnam_minutes: 0,
        walk_route_image_path: None,
        transit_route_image_path: None,
    }
}

/// Directions API first, haversine estimate as the fallback.
async fn reference_minutes(
    ctx: &ResolveContext,
    sources: &dyn LocationSources,
    from: (f64, f64),
) -> u32 {
    if let Some(minutes) = sources.transit_minutes(from, ctx.reference_point).await {
        return minutes;
    }

    let distance = apt_briefing_spatial::haversine_m(
        from.0,
        from.1,
        ctx.reference_point.0,
        ctx.reference_point.1,
    );
    let estimate = apt_briefing_spatial::transit_estimate_minutes(distance);
    log::debug!("reference transit estimated from distance: {estimate} min");
    estimate
}

async fn capture_routes(
    ctx: &ResolveContext,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
    station_coords: Option<(f64, f64)>,
    record: &mut LocationRecord,
) {
    let Some(session) = session else { return };
    let Some(from) = complex.coordinates() else {
        return;
    };
    let complex_id = complex.complex_id.as_str();

    // Without station coordinates the walk route is drawn to the
    // complex itself, which still renders the neighborhood map.
    let walk_script = scripts::walk_route_script(
        from,
        &complex.name,
        station_coords.unwrap_or(from),
        &record.nearest_station,
    );
    let walk_path = ctx.image_path(complex_id, ImageKind::WalkRoute);
    if session.capture(&walk_script, &walk_path).await.produced_file() {
        record.walk_route_image_path = existing(walk_path);
    }

    let transit_script = scripts::transit_route_script(
        from,
        &complex.name,
        ctx.reference_point,
        &ctx.reference_name,
    );
    let transit_path = ctx.image_path(complex_id, ImageKind::TransitRoute);
    if session
        .capture(&transit_script, &transit_path)
        .await
        .produced_file()
    {
        record.transit_route_image_path = existing(transit_path);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use super::*;
    use crate::test_support::offline_context;

    #[derive(Default)]
    struct FakeSources {
        transit: Option<SsrTransit>,
        nearby: Option<NearbyStation>,
        minutes: Option<u32>,
        transit_calls: AtomicUsize,
        nearby_calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationSources for FakeSources {
        async fn ssr_transit(&self, _id: &str) -> Option<SsrTransit> {
            self.transit_calls.fetch_add(1, Ordering::SeqCst);
            self.transit.clone()
        }

        async fn nearby_station(&self, _lat: f64, _lng: f64) -> Option<NearbyStation> {
            self.nearby_calls.fetch_add(1, Ordering::SeqCst);
            self.nearby.clone()
        }

        async fn transit_minutes(&self, _from: (f64, f64), _to: (f64, f64)) -> Option<u32> {
            self.minutes
        }
    }

    fn complex_at(lat: f64, lng: f64) -> ComplexRecord {
        ComplexRecord {
            latitude: Some(lat),
            longitude: Some(lng),
            name: "중계그린".to_string(),
            ..ComplexRecord::placeholder("12345")
        }
    }

    fn ctx(dir: &std::path::Path) -> crate::ResolveContext {
        offline_context(dir, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
    }

    #[tokio::test]
    async fn embedded_transit_wins_and_skips_search() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources {
            transit: Some(SsrTransit {
                station_name: "중계역".to_string(),
                line: "7호선".to_string(),
                walk_minutes: 2,
            }),
            nearby: Some(NearbyStation {
                name: "안쓰임역".to_string(),
                lat: 37.0,
                lng: 127.0,
            }),
            minutes: Some(50),
            ..Default::default()
        };

        let record =
            resolve_location(&ctx(dir.path()), &sources, None, &complex_at(37.6447, 127.0641))
                .await;
        assert_eq!(record.nearest_station, "중계역");
        assert_eq!(record.station_line, "7호선");
        assert_eq!(record.walk_minutes, 2);
        assert_eq!(record.station_transit_minutes, None);
        assert_eq!(record.gangnam_minutes, 50);
        assert_eq!(sources.nearby_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn far_station_gets_transit_headline() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources {
            transit: Some(SsrTransit {
                station_name: "먼역".to_string(),
                line: "1호선".to_string(),
                walk_minutes: 30,
            }),
            minutes: Some(40),
            ..Default::default()
        };

        let record =
            resolve_location(&ctx(dir.path()), &sources, None, &complex_at(37.6, 127.06)).await;
        assert_eq!(record.walk_minutes, 30);
        assert_eq!(record.station_transit_minutes, Some(10));
    }

    #[tokio::test]
    async fn place_search_is_second_step() {
        let dir = tempfile::tempdir().unwrap();
        // ~450 m north of the complex.
        let sources = FakeSources {
            nearby: Some(NearbyStation {
                name: "하계역".to_string(),
                lat: 37.6405,
                lng: 127.0641,
            }),
            ..Default::default()
        };

        let record =
            resolve_location(&ctx(dir.path()), &sources, None, &complex_at(37.6365, 127.0641))
                .await;
        assert_eq!(record.nearest_station, "하계역");
        assert!(record.walk_minutes >= 5 && record.walk_minutes <= 8);
    }

    #[tokio::test]
    async fn directory_fallback_when_search_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources::default();

        // Coordinates a few hundred meters from 중계역's directory entry.
        let record =
            resolve_location(&ctx(dir.path()), &sources, None, &complex_at(37.6460, 127.0660))
                .await;
        assert_eq!(record.nearest_station, "중계역");
        assert_eq!(record.station_line, "7호선");
        assert!(record.walk_minutes >= 1);
    }

    #[tokio::test]
    async fn no_coordinates_yields_placeholder_without_search() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources::default();
        let complex = ComplexRecord::placeholder("12345");

        let record = resolve_location(&ctx(dir.path()), &sources, None, &complex).await;
        assert_eq!(record.nearest_station, apt_briefing_models::NO_DATA_LABEL);
        assert_eq!(record.gangnam_minutes, 0);
        assert_eq!(sources.nearby_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reference_estimate_used_when_directions_fail() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources {
            transit: Some(SsrTransit {
                station_name: "중계역".to_string(),
                line: "7호선".to_string(),
                walk_minutes: 2,
            }),
            minutes: None,
            ..Default::default()
        };

        // 중계동 to 강남역 is roughly 17 km; the estimate lands around
        // 10 + ~46 minutes.
        let record =
            resolve_location(&ctx(dir.path()), &sources, None, &complex_at(37.6447, 127.0641))
                .await;
        assert!(record.gangnam_minutes >= 40 && record.gangnam_minutes <= 70);
    }
}
