#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing grouping, hashtag derivation, and per-complex composition.
//!
//! Pure functions between resolver outputs and the record the renderer
//! consumes. Hashtags are re-derived from the contributing facts every
//! time — nothing accumulates tags in place.

pub mod url;

use apt_briefing_models::{
    AggregatedComplex, ComplexRecord, ListingDetail, ListingInput, LocationRecord, PriceSummary,
    SchoolRecord, UNKNOWN_COMPLEX_ID,
};

/// One group of listings sharing a complex id, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingGroup {
    pub complex_id: String,
    pub listings: Vec<ListingInput>,
}

/// Groups listings by the complex id extracted from their URLs,
/// preserving first-seen order of ids. Listings whose URL yields no id
/// land in the shared sentinel group rather than failing the batch.
#[must_use]
pub fn group_by_complex(listings: &[ListingInput]) -> Vec<ListingGroup> {
    let mut groups: Vec<ListingGroup> = Vec::new();

    for listing in listings {
        let complex_id = url::parse_listing_url(&listing.url)
            .complex_id
            .unwrap_or_else(|| {
                log::warn!("unresolvable listing URL, grouping as unknown: {}", listing.url);
                UNKNOWN_COMPLEX_ID.to_string()
            });

        match groups.iter_mut().find(|g| g.complex_id == complex_id) {
            Some(group) => group.listings.push(listing.clone()),
            None => groups.push(ListingGroup {
                complex_id,
                listings: vec![listing.clone()],
            }),
        }
    }

    groups
}

/// Derives the hashtag list from the contributing facts.
///
/// Order-stable; call again whenever any input changes (walk minutes
/// arrive only after the location resolver has run).
#[must_use]
pub fn derive_hashtags(
    total_units: u32,
    parking_per_unit: f64,
    built_year: i32,
    walk_minutes: u32,
) -> Vec<String> {
    let mut tags = Vec::new();

    if (1..=5).contains(&walk_minutes) {
        tags.push("역세권".to_string());
    }
    if total_units >= 1000 {
        tags.push("대단지".to_string());
    }
    if parking_per_unit >= 1.0 {
        tags.push("주차여유".to_string());
    }
    if built_year >= 2015 {
        tags.push("신축".to_string());
    } else if built_year >= 2000 {
        tags.push("준신축".to_string());
    }

    tags
}

/// [`derive_hashtags`] over a record plus the late-arriving walk time.
#[must_use]
pub fn hashtags_for(complex: &ComplexRecord, walk_minutes: u32) -> Vec<String> {
    derive_hashtags(
        complex.total_units,
        complex.parking_per_unit,
        complex.built_year,
        walk_minutes,
    )
}

/// Composes the final per-complex record. The complex's hashtags are
/// refreshed here — the one sanctioned mutation after construction.
#[must_use]
pub fn compose(
    mut complex: ComplexRecord,
    price: Option<PriceSummary>,
    location: Option<LocationRecord>,
    school: Option<SchoolRecord>,
    listings: Vec<ListingDetail>,
) -> AggregatedComplex {
    let walk_minutes = location.as_ref().map_or(0, |l| l.walk_minutes);
    complex.hashtags = hashtags_for(&complex, walk_minutes);

    AggregatedComplex {
        complex,
        price,
        location,
        school,
        listings,
    }
}

/// Transaction-count and high/low summary sentence for the price slide.
#[must_use]
pub fn price_summary_text(complex_name: &str, price: &PriceSummary) -> String {
    let mut lines = vec![format!(
        "{complex_name}은(는) {} [{}]건, {} [{}]건 거래되었습니다.",
        price.month1_label, price.month1_count, price.month2_label, price.month2_count
    )];

    if !price.recent_3m_high.is_empty() && !price.recent_3m_low.is_empty() {
        lines.push(format!(
            "최근 3개월 최고 [{}], 최저 [{}]에 거래되었습니다.",
            price.recent_3m_high, price.recent_3m_low
        ));
    }

    if !price.all_time_high.is_empty() {
        lines.push(format!(
            "최고가 [{}] {}에 거래되었습니다.",
            price.all_time_high, price.all_time_high_date
        ));
    }

    lines.join("\n")
}

/// Overview paragraph for the complex slide.
#[must_use]
pub fn overview_text(complex: &ComplexRecord) -> String {
    format!(
        "{}은(는)\n{}에 위치해있으며\n세대수 {}세대, 주차대수 {}대 (세대당 {}대)\n{}년 준공된 아파트입니다.",
        complex.name,
        complex.address,
        complex.total_units,
        complex.parking_total,
        complex.parking_per_unit,
        complex.built_year
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(url: &str) -> ListingInput {
        ListingInput {
            url: url.to_string(),
            price: "6.4억".to_string(),
            dong: "124동".to_string(),
            ho: None,
            floor: "7/15층".to_string(),
            direction: None,
            structure: None,
            memo: None,
        }
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let listings = vec![
            listing("https://new.land.naver.com/complexes/12345?articleNo=67890"),
            listing("https://new.land.naver.com/complexes/99999?articleNo=22222"),
            listing("https://new.land.naver.com/complexes/12345?articleNo=11111"),
        ];
        let groups = group_by_complex(&listings);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].complex_id, "12345");
        assert_eq!(groups[0].listings.len(), 2);
        assert_eq!(groups[1].complex_id, "99999");
        assert_eq!(groups[1].listings.len(), 1);
    }

    #[test]
    fn unparseable_urls_share_the_unknown_group() {
        let listings = vec![
            listing("not a url"),
            listing("https://example.com/nothing"),
        ];
        let groups = group_by_complex(&listings);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].complex_id, UNKNOWN_COMPLEX_ID);
        assert_eq!(groups[0].listings.len(), 2);
    }

    #[test]
    fn hashtags_cover_all_rules() {
        let tags = derive_hashtags(3481, 1.2, 2016, 3);
        assert_eq!(tags, vec!["역세권", "대단지", "주차여유", "신축"]);
    }

    #[test]
    fn hashtag_walk_boundary_is_five_minutes() {
        assert!(derive_hashtags(0, 0.0, 0, 5).contains(&"역세권".to_string()));
        assert!(!derive_hashtags(0, 0.0, 0, 6).contains(&"역세권".to_string()));
        assert!(!derive_hashtags(0, 0.0, 0, 0).contains(&"역세권".to_string()));
    }

    #[test]
    fn hashtag_built_year_tiers() {
        assert!(derive_hashtags(0, 0.0, 2015, 0).contains(&"신축".to_string()));
        let semi = derive_hashtags(0, 0.0, 2005, 0);
        assert!(semi.contains(&"준신축".to_string()));
        assert!(!semi.contains(&"신축".to_string()));
        assert!(derive_hashtags(0, 0.0, 1990, 0).is_empty());
    }

    #[test]
    fn hashtags_rederive_not_accumulate() {
        let first = derive_hashtags(3481, 0.4, 1990, 0);
        assert_eq!(first, vec!["대단지"]);
        let second = derive_hashtags(3481, 0.4, 1990, 2);
        assert_eq!(second, vec!["역세권", "대단지"]);
    }

    #[test]
    fn compose_refreshes_hashtags_from_walk_minutes() {
        let complex = ComplexRecord {
            total_units: 3481,
            built_year: 1990,
            ..ComplexRecord::placeholder("12345")
        };
        let location = LocationRecord {
            walk_minutes: 2,
            ..LocationRecord::placeholder("12345")
        };

        let aggregated = compose(complex, None, Some(location), None, Vec::new());
        assert_eq!(aggregated.complex.hashtags, vec!["역세권", "대단지"]);
    }

    #[test]
    fn compose_without_location_has_no_transit_tag() {
        let complex = ComplexRecord {
            total_units: 3481,
            ..ComplexRecord::placeholder("12345")
        };
        let aggregated = compose(complex, None, None, None, Vec::new());
        assert_eq!(aggregated.complex.hashtags, vec!["대단지"]);
    }

    #[test]
    fn price_summary_text_skips_empty_sections() {
        let price = PriceSummary {
            complex_id: "12345".to_string(),
            transactions: Vec::new(),
            month1_count: 2,
            month1_label: "2026년 1월".to_string(),
            month2_count: 1,
            month2_label: "2025년 12월".to_string(),
            recent_3m_high: String::new(),
            recent_3m_low: String::new(),
            all_time_high: String::new(),
            all_time_high_date: String::new(),
            chart_image_path: None,
        };
        let text = price_summary_text("중계그린", &price);
        assert!(text.contains("[2]건"));
        assert!(!text.contains("최근 3개월"));
        assert!(!text.contains("최고가"));
    }

    #[test]
    fn overview_text_contains_headline_facts() {
        let complex = ComplexRecord {
            name: "중계그린".to_string(),
            address: "서울시 노원구 중계동 509".to_string(),
            total_units: 3481,
            parking_total: 1311,
            parking_per_unit: 0.38,
            built_year: 1990,
            ..ComplexRecord::placeholder("12345")
        };
        let text = overview_text(&complex);
        assert!(text.contains("세대수 3481세대"));
        assert!(text.contains("1990년 준공"));
    }
}
