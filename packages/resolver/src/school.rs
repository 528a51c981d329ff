//! School resolver: assigned elementary school details plus the two
//! map captures.
//!
//! Two independent sub-problems: the textual school record (embedded
//! school rows → national school-information API, exact-name match
//! preferred) and the geocode-then-capture visualization (walk route
//! to the school, secondary-school zone map). Each capture falls back
//! to a placeholder image on its own; the record counts as resolved as
//! long as the textual fields were obtained.

use apt_briefing_capture::capability::BrowserSession;
use apt_briefing_capture::{placeholder, scripts};
use apt_briefing_geocoder::Coordinates;
use apt_briefing_models::{ComplexRecord, ImageKind, SchoolRecord};
use apt_briefing_source::neis::NeisSchool;
use apt_briefing_source::ssr::SsrSchool;
use async_trait::async_trait;

use crate::{ResolveContext, existing};

/// Placeholder dimensions for the two map images.
const MAP_W: u32 = 800;
const MAP_H: u32 = 600;

/// Sources the school resolver draws from.
#[async_trait]
pub trait SchoolSources: Send + Sync {
    /// Assigned-school rows embedded in the listing page.
    async fn ssr_schools(&self, complex_id: &str) -> Vec<SsrSchool>;

    /// School metadata from the national information API.
    async fn school_detail(&self, school_name: &str) -> Option<NeisSchool>;

    /// Place geocoding for the school's coordinates.
    async fn geocode(&self, name: &str, address: Option<&str>) -> Option<Coordinates>;
}

/// Resolves the school record for one complex.
pub async fn resolve_school(
    ctx: &ResolveContext,
    sources: &dyn SchoolSources,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
) -> SchoolRecord {
    let complex_id = complex.complex_id.as_str();

    let ssr_school = sources.ssr_schools(complex_id).await.into_iter().next();

    let Some(ssr_school) = ssr_school else {
        log::warn!("school {complex_id}: no assigned-school rows, emitting placeholder");
        let mut record = SchoolRecord::placeholder(complex_id);
        attach_images(ctx, session, complex, None, &mut record).await;
        return record;
    };

    let detail = sources.school_detail(&ssr_school.name).await;
    if detail.is_none() {
        log::warn!(
            "school {complex_id}: no API detail for {}, keeping embedded fields",
            ssr_school.name
        );
    }

    let mut record = build_record(complex_id, &ssr_school, detail.as_ref());

    let school_coords = sources
        .geocode(
            &record.elementary_name,
            detail.as_ref().map(|d| d.address.as_str()),
        )
        .await;

    attach_images(ctx, session, complex, school_coords, &mut record).await;
    record
}

fn build_record(
    complex_id: &str,
    ssr_school: &SsrSchool,
    detail: Option<&NeisSchool>,
) -> SchoolRecord {
    let walk_distance = if ssr_school.walk_minutes > 0 {
        format!("도보 {}분", ssr_school.walk_minutes)
    } else {
        String::new()
    };

    let mut record = SchoolRecord {
        complex_id: complex_id.to_string(),
        elementary_name: ssr_school.name.clone(),
        walk_distance,
        distance_m: ssr_school.distance_m,
        ..SchoolRecord::placeholder(complex_id)
    };

    if let Some(detail) = detail {
        if !detail.name.is_empty() {
            record.elementary_name = detail.name.clone();
        }
        record.elementary_address = detail.address.clone();
        record.elementary_phone = detail.phone.clone();
        record.elementary_founding_date = detail.founding_date.clone();
        record.elementary_type = detail.school_type.clone();
        record.elementary_education_office = detail.education_office.clone();
        record.elementary_coedu = detail.coedu.clone();
        record.elementary_homepage = detail.homepage.clone();
    }

    record
}

/// Captures the two maps, each degrading to a placeholder on its own.
async fn attach_images(
    ctx: &ResolveContext,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
    school_coords: Option<Coordinates>,
    record: &mut SchoolRecord,
) {
    let complex_id = complex.complex_id.as_str();
    let route_path = ctx.image_path(complex_id, ImageKind::ElementaryRoute);
    let zone_path = ctx.image_path(complex_id, ImageKind::SchoolZone);

    if let (Some(session), Some(from), Some(to)) =
        (session, complex.coordinates(), school_coords)
    {
        let script = scripts::walk_route_script(
            from,
            &complex.name,
            (to.lat, to.lng),
            &record.elementary_name,
        );
        session.capture(&script, &route_path).await;
    }

    if let (Some(session), Some((lat, lng))) = (session, complex.coordinates()) {
        let script = scripts::school_zone_script(&complex.address, lat, lng);
        session.capture(&script, &zone_path).await;
    }

    for path in [&route_path, &zone_path] {
        if !path.exists()
            && let Err(e) = placeholder::ensure_placeholder(path, MAP_W, MAP_H)
        {
            log::warn!("school {complex_id}: placeholder write failed: {e}");
        }
    }

    record.elementary_map_path = existing(route_path);
    record.zone_map_path = existing(zone_path);
}
