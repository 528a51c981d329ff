//! Per-listing detail resolver.
//!
//! Merges the user's listing input with the mobile article detail
//! (rooms, bathrooms, exclusive area, direction) and attaches the
//! floor-plan and in-complex location images. The user's own fields
//! always win; resolved fields only fill gaps.

use apt_briefing_format::m2_to_pyeong_label;
use apt_briefing_models::{ComplexRecord, ImageKind, ListingDetail, ListingInput};
use apt_briefing_source::mobile::MobileArticleDetail;
use async_trait::async_trait;

use crate::{ResolveContext, existing};

/// Sources the listing resolver draws from.
#[async_trait]
pub trait ListingSources: Send + Sync {
    /// Article detail from the mobile API.
    async fn article_detail(&self, article_no: &str) -> Option<MobileArticleDetail>;

    /// Opportunistic floor-plan download; `true` when the target file
    /// exists afterwards.
    async fn download_floor_plan(&self, complex_id: &str, target: &std::path::Path) -> bool;
}

/// Resolves the detail record for one listing.
pub async fn resolve_listing(
    ctx: &ResolveContext,
    sources: &dyn ListingSources,
    complex: &ComplexRecord,
    input: &ListingInput,
    article_no: Option<&str>,
) -> ListingDetail {
    let complex_id = complex.complex_id.as_str();
    let mut detail = ListingDetail::from_input(complex_id, &complex.name, input);

    if let Some(article_no) = article_no {
        if let Some(article) = sources.article_detail(article_no).await {
            merge_article(&mut detail, &article);
        } else {
            log::warn!("listing {article_no}: detail lookup failed, keeping user input");
        }

        let plan_path = ctx.article_image_path(complex_id, ImageKind::FloorPlan, article_no);
        if sources.download_floor_plan(complex_id, &plan_path).await {
            detail.floor_plan_image_path = existing(plan_path);
        }
    } else {
        log::debug!("listing for {complex_id} has no article id, using input only");
    }

    // The in-complex location image is the complex's site plan, shared
    // by every listing in the group.
    detail.dong_location_image_path = complex.site_plan_path.clone();

    detail
}

/// Fills gaps in the user input from the article payload.
fn merge_article(detail: &mut ListingDetail, article: &MobileArticleDetail) {
    detail.rooms = article.rooms;
    detail.bathrooms = article.bathrooms;

    if let Some(area_m2) = article.area_m2 {
        detail.area_m2 = Some(area_m2);
        detail.area_pyeong = Some(m2_to_pyeong_label(area_m2));
    }

    if detail.direction.is_none() {
        detail.direction.clone_from(&article.direction);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use super::*;
    use crate::test_support::offline_context;

    #[derive(Default)]
    struct FakeSources {
        article: Option<MobileArticleDetail>,
        plan: bool,
        article_calls: AtomicUsize,
    }

    #[async_trait]
    impl ListingSources for FakeSources {
        async fn article_detail(&self, _article_no: &str) -> Option<MobileArticleDetail> {
            self.article_calls.fetch_add(1, Ordering::SeqCst);
            self.article.clone()
        }

        async fn download_floor_plan(&self, _complex_id: &str, target: &Path) -> bool {
            if self.plan {
                std::fs::create_dir_all(target.parent().unwrap()).unwrap();
                std::fs::write(target, b"png").unwrap();
            }
            self.plan
        }
    }

    fn input() -> ListingInput {
        ListingInput {
            url: "https://new.land.naver.com/complexes/12345?articleNo=67890".to_string(),
            price: "6.4억".to_string(),
            dong: "124동".to_string(),
            ho: None,
            floor: "7/15층".to_string(),
            direction: Some("동향".to_string()),
            structure: Some("복도식 방2화1".to_string()),
            memo: Some("샷시교체".to_string()),
        }
    }

    fn complex() -> ComplexRecord {
        ComplexRecord {
            name: "중계그린".to_string(),
            ..ComplexRecord::placeholder("12345")
        }
    }

    fn ctx(dir: &Path) -> crate::ResolveContext {
        offline_context(dir, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
    }

    #[tokio::test]
    async fn merges_article_fields_without_overriding_input() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources {
            article: Some(MobileArticleDetail {
                rooms: Some(2),
                bathrooms: Some(1),
                area_m2: Some(49.0),
                direction: Some("남향".to_string()),
            }),
            plan: true,
            ..Default::default()
        };

        let detail =
            resolve_listing(&ctx(dir.path()), &sources, &complex(), &input(), Some("67890")).await;
        assert_eq!(detail.rooms, Some(2));
        assert_eq!(detail.area_pyeong.as_deref(), Some("15평"));
        // User-entered direction wins over the article's.
        assert_eq!(detail.direction.as_deref(), Some("동향"));
        assert_eq!(detail.price, "6.4억");
        assert!(detail.floor_plan_image_path.is_some());
    }

    #[tokio::test]
    async fn no_article_id_keeps_input_only() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources::default();

        let detail = resolve_listing(&ctx(dir.path()), &sources, &complex(), &input(), None).await;
        assert_eq!(detail.dong, "124동");
        assert_eq!(detail.rooms, None);
        assert_eq!(sources.article_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_detail_lookup_degrades_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FakeSources::default();

        let detail =
            resolve_listing(&ctx(dir.path()), &sources, &complex(), &input(), Some("67890")).await;
        assert_eq!(detail.complex_name, "중계그린");
        assert_eq!(detail.memo.as_deref(), Some("샷시교체"));
        assert_eq!(detail.area_m2, None);
    }
}
