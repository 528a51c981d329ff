//! Complex identity resolver.
//!
//! Priority chain: (1) the server-rendered detail payload, (2) the
//! mobile article search (the first listing embeds the complex name),
//! (3) the HTML page title. First success wins — later steps are not
//! attempted. Whatever happens, a [`ComplexRecord`] comes back.

use apt_briefing_models::{ComplexRecord, ImageKind, parking_ratio};
use apt_briefing_source::ssr::SsrComplex;
use async_trait::async_trait;

use crate::{ResolveContext, existing, sidecar};

/// Sources the complex chain draws from, in priority order.
#[async_trait]
pub trait ComplexSources: Send + Sync {
    /// Step 1: structured payload from the server-rendered page.
    async fn ssr_complex(&self, complex_id: &str) -> Option<SsrComplex>;

    /// Step 2: complex name embedded in the first mobile listing.
    async fn mobile_complex_name(&self, complex_id: &str) -> Option<String>;

    /// Step 3: page `<title>` scrape.
    async fn page_title(&self, complex_id: &str) -> Option<String>;

    /// Opportunistic aerial-photo download; `true` when the target
    /// file exists afterwards.
    async fn download_aerial(&self, complex_id: &str, target: &std::path::Path) -> bool;

    /// Opportunistic site-plan download; `true` when the target file
    /// exists afterwards.
    async fn download_site_plan(&self, complex_id: &str, target: &std::path::Path) -> bool;
}

/// Resolves one complex's identity record.
///
/// Side effect: on a structured hit, the legal-division code and
/// construction company are persisted to the write-once sidecar for
/// downstream resolvers.
pub async fn resolve_complex(
    ctx: &ResolveContext,
    sources: &dyn ComplexSources,
    complex_id: &str,
) -> ComplexRecord {
    let mut record = if let Some(ssr) = sources.ssr_complex(complex_id).await {
        log::info!("complex {complex_id}: resolved from embedded payload ({})", ssr.name);
        persist_sidecar(ctx, complex_id, &ssr);
        record_from_ssr(complex_id, &ssr)
    } else if let Some(name) = sources.mobile_complex_name(complex_id).await {
        log::warn!("complex {complex_id}: embedded payload missing, using listing name '{name}'");
        named_only(complex_id, &name)
    } else if let Some(title) = sources.page_title(complex_id).await {
        log::warn!("complex {complex_id}: falling back to page title '{title}'");
        named_only(complex_id, &title)
    } else {
        log::warn!("complex {complex_id}: all sources exhausted, emitting placeholder");
        ComplexRecord::placeholder(complex_id)
    };

    let aerial = ctx.image_path(complex_id, ImageKind::Aerial);
    if sources.download_aerial(complex_id, &aerial).await {
        record.aerial_photo_path = existing(aerial);
    }

    let site_plan = ctx.image_path(complex_id, ImageKind::SitePlan);
    if sources.download_site_plan(complex_id, &site_plan).await {
        record.site_plan_path = existing(site_plan);
    }

    record
}

fn record_from_ssr(complex_id: &str, ssr: &SsrComplex) -> ComplexRecord {
    ComplexRecord {
        complex_id: complex_id.to_string(),
        name: ssr.name.clone(),
        address: ssr.address.clone(),
        total_units: ssr.total_units,
        parking_total: ssr.parking_total,
        parking_per_unit: parking_ratio(ssr.parking_total, ssr.total_units),
        built_year: ssr.built_year,
        latitude: ssr.latitude,
        longitude: ssr.longitude,
        hashtags: Vec::new(),
        aerial_photo_path: None,
        site_plan_path: None,
        detail_capture_path: None,
    }
}

fn named_only(complex_id: &str, name: &str) -> ComplexRecord {
    ComplexRecord {
        name: name.to_string(),
        ..ComplexRecord::placeholder(complex_id)
    }
}

fn persist_sidecar(ctx: &ResolveContext, complex_id: &str, ssr: &SsrComplex) {
    if ssr.legal_division_code.is_empty() && ssr.construction_company.is_empty() {
        return;
    }
    let sidecar = sidecar::ComplexSidecar {
        legal_division_code: ssr.legal_division_code.clone(),
        construction_company: ssr.construction_company.clone(),
    };
    sidecar::write_once(&ctx.work_dir, complex_id, &sidecar);
}
