//! Sample-data sources for mock mode.
//!
//! Mock mode skips every network call and feeds the resolvers fixed
//! sample data, so a full deck can be produced (and the slide layout
//! checked) on a machine with no connectivity and no API key. The
//! price chain still exercises its own mock fallback — these sources
//! return nothing for price on purpose.

use std::path::Path;

use apt_briefing_format::MonthKey;
use apt_briefing_geocoder::Coordinates;
use apt_briefing_models::TransactionRecord;
use apt_briefing_resolver::complex::ComplexSources;
use apt_briefing_resolver::listing::ListingSources;
use apt_briefing_resolver::location::{LocationSources, NearbyStation};
use apt_briefing_resolver::price::PriceSources;
use apt_briefing_resolver::school::SchoolSources;
use apt_briefing_source::mobile::MobileArticleDetail;
use apt_briefing_source::neis::NeisSchool;
use apt_briefing_source::politeness::Politeness;
use apt_briefing_source::ssr::{SsrComplex, SsrSchool, SsrTransit};
use async_trait::async_trait;

pub struct MockSources;

/// Short id suffix used to vary sample names per complex.
fn suffix(complex_id: &str) -> &str {
    let len = complex_id.len();
    complex_id.get(len.saturating_sub(4)..).unwrap_or(complex_id)
}

#[async_trait]
impl ComplexSources for MockSources {
    async fn ssr_complex(&self, complex_id: &str) -> Option<SsrComplex> {
        Some(SsrComplex {
            name: format!("샘플단지_{}", suffix(complex_id)),
            address: "서울시 강남구 샘플동 100".to_string(),
            total_units: 1500,
            parking_total: 1200,
            built_year: 2005,
            latitude: Some(37.5172),
            longitude: Some(127.0286),
            legal_division_code: String::new(),
            construction_company: String::new(),
        })
    }

    async fn mobile_complex_name(&self, _complex_id: &str) -> Option<String> {
        None
    }

    async fn page_title(&self, _complex_id: &str) -> Option<String> {
        None
    }

    async fn download_aerial(&self, _complex_id: &str, _target: &Path) -> bool {
        false
    }

    async fn download_site_plan(&self, _complex_id: &str, _target: &Path) -> bool {
        false
    }
}

#[async_trait]
impl LocationSources for MockSources {
    async fn ssr_transit(&self, _complex_id: &str) -> Option<SsrTransit> {
        Some(SsrTransit {
            station_name: "샘플역".to_string(),
            line: "2호선".to_string(),
            walk_minutes: 5,
        })
    }

    async fn nearby_station(&self, _lat: f64, _lng: f64) -> Option<NearbyStation> {
        None
    }

    async fn transit_minutes(&self, _from: (f64, f64), _to: (f64, f64)) -> Option<u32> {
        Some(35)
    }
}

#[async_trait]
impl PriceSources for MockSources {
    async fn trend_transactions(&self, _complex_name: &str) -> Option<Vec<TransactionRecord>> {
        // Returning nothing drives the price resolver into its own
        // explicit mock fallback.
        None
    }

    async fn government_transactions(
        &self,
        _api_key: &str,
        _lawd_cd: &str,
        _months: &[MonthKey],
        _complex_name: &str,
        _politeness: Politeness,
    ) -> Vec<TransactionRecord> {
        Vec::new()
    }
}

#[async_trait]
impl SchoolSources for MockSources {
    async fn ssr_schools(&self, _complex_id: &str) -> Vec<SsrSchool> {
        vec![SsrSchool {
            name: "서울샘플초등학교".to_string(),
            walk_minutes: 7,
            distance_m: 450,
        }]
    }

    async fn school_detail(&self, school_name: &str) -> Option<NeisSchool> {
        Some(NeisSchool {
            name: school_name.to_string(),
            address: "서울 강남구 샘플로 12".to_string(),
            phone: "02-000-0000".to_string(),
            founding_date: "1995.03.01".to_string(),
            school_type: "공립".to_string(),
            education_office: "서울특별시교육청".to_string(),
            coedu: "남여공학".to_string(),
            homepage: String::new(),
        })
    }

    async fn geocode(&self, _name: &str, _address: Option<&str>) -> Option<Coordinates> {
        None
    }
}

#[async_trait]
impl ListingSources for MockSources {
    async fn article_detail(&self, _article_no: &str) -> Option<MobileArticleDetail> {
        Some(MobileArticleDetail {
            rooms: Some(3),
            bathrooms: Some(2),
            area_m2: Some(79.34),
            direction: Some("남향".to_string()),
        })
    }

    async fn download_floor_plan(&self, _complex_id: &str, _target: &Path) -> bool {
        false
    }
}
