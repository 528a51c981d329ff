//! Live source implementations backed by the real fetchers.
//!
//! One struct implements every per-resolver source trait. The complex
//! page HTML feeds four different extractions, so it is fetched once
//! per complex and cached for the lifetime of this value.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use apt_briefing_geocoder::Coordinates;
use apt_briefing_source::mobile::MobileArticleDetail;
use apt_briefing_source::neis::NeisSchool;
use apt_briefing_source::politeness::Politeness;
use apt_briefing_source::ssr::{SsrComplex, SsrSchool, SsrTransit};
use apt_briefing_source::{directions, mobile, molit, neis, ssr, trend};
use apt_briefing_format::MonthKey;
use apt_briefing_models::TransactionRecord;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::complex::ComplexSources;
use crate::listing::ListingSources;
use crate::location::{LocationSources, NearbyStation};
use crate::price::PriceSources;
use crate::school::SchoolSources;

/// Trend-chart data endpoint (JSON-P).
const TREND_DATA_URL: &str = "https://asil.kr/asil/svl/chartData";

/// Live implementations of all source traits.
pub struct LiveSources {
    client: reqwest::Client,
    politeness: Politeness,
    page_cache: Mutex<HashMap<String, Arc<String>>>,
}

impl LiveSources {
    #[must_use]
    pub fn new(client: reqwest::Client, politeness: Politeness) -> Self {
        Self {
            client,
            politeness,
            page_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetches the complex page once and reuses it for every embedded
    /// extraction.
    async fn complex_page(&self, complex_id: &str) -> Option<Arc<String>> {
        {
            let cache = self.page_cache.lock().await;
            if let Some(html) = cache.get(complex_id) {
                return Some(html.clone());
            }
        }

        let html = Arc::new(ssr::fetch_complex_page(&self.client, complex_id).await?);
        self.politeness.pause().await;

        let mut cache = self.page_cache.lock().await;
        Some(cache.entry(complex_id.to_string()).or_insert(html).clone())
    }
}

#[async_trait]
impl ComplexSources for LiveSources {
    async fn ssr_complex(&self, complex_id: &str) -> Option<SsrComplex> {
        let html = self.complex_page(complex_id).await?;
        ssr::parse_complex(&html)
    }

    async fn mobile_complex_name(&self, complex_id: &str) -> Option<String> {
        let articles = mobile::fetch_article_list(&self.client, complex_id).await?;
        self.politeness.pause().await;
        articles
            .into_iter()
            .map(|a| a.complex_name)
            .find(|name| !name.is_empty())
    }

    async fn page_title(&self, complex_id: &str) -> Option<String> {
        let html = self.complex_page(complex_id).await?;
        ssr::parse_page_title(&html)
    }

    async fn download_aerial(&self, complex_id: &str, target: &Path) -> bool {
        let Some(url) = mobile::fetch_first_photo_url(&self.client, complex_id).await else {
            return false;
        };
        self.politeness.pause().await;
        mobile::download_image(&self.client, &url, target).await
    }

    async fn download_site_plan(&self, complex_id: &str, target: &Path) -> bool {
        let Some(url) = mobile::fetch_ground_plan_url(&self.client, complex_id).await else {
            return false;
        };
        self.politeness.pause().await;
        mobile::download_image(&self.client, &url, target).await
    }
}

#[async_trait]
impl LocationSources for LiveSources {
    async fn ssr_transit(&self, complex_id: &str) -> Option<SsrTransit> {
        let html = self.complex_page(complex_id).await?;
        ssr::parse_transit(&html)
    }

    async fn nearby_station(&self, lat: f64, lng: f64) -> Option<NearbyStation> {
        let place =
            apt_briefing_geocoder::search_nearby_station(&self.client, lat, lng).await?;
        Some(NearbyStation {
            name: place.name,
            lat: place.lat,
            lng: place.lng,
        })
    }

    async fn transit_minutes(&self, from: (f64, f64), to: (f64, f64)) -> Option<u32> {
        directions::fetch_transit_minutes(&self.client, from, to).await
    }
}

#[async_trait]
impl PriceSources for LiveSources {
    async fn trend_transactions(&self, complex_name: &str) -> Option<Vec<TransactionRecord>> {
        let body = apt_briefing_source::http::get_text(
            &self.client,
            TREND_DATA_URL,
            &[("searchText", complex_name)],
        )
        .await
        .map_err(|e| log::warn!("trend payload fetch failed for {complex_name}: {e}"))
        .ok()?;
        self.politeness.pause().await;
        trend::parse_trend_payload(&body)
    }

    async fn government_transactions(
        &self,
        api_key: &str,
        lawd_cd: &str,
        months: &[MonthKey],
        complex_name: &str,
        politeness: Politeness,
    ) -> Vec<TransactionRecord> {
        molit::fetch_months(&self.client, api_key, lawd_cd, months, complex_name, politeness).await
    }
}

#[async_trait]
impl SchoolSources for LiveSources {
    async fn ssr_schools(&self, complex_id: &str) -> Vec<SsrSchool> {
        match self.complex_page(complex_id).await {
            Some(html) => ssr::parse_schools(&html),
            None => Vec::new(),
        }
    }

    async fn school_detail(&self, school_name: &str) -> Option<NeisSchool> {
        let detail = neis::fetch_school(&self.client, school_name).await;
        self.politeness.pause().await;
        detail
    }

    async fn geocode(&self, name: &str, address: Option<&str>) -> Option<Coordinates> {
        apt_briefing_geocoder::geocode_place(&self.client, name, address).await
    }
}

#[async_trait]
impl ListingSources for LiveSources {
    async fn article_detail(&self, article_no: &str) -> Option<MobileArticleDetail> {
        let detail = mobile::fetch_article_detail(&self.client, article_no).await;
        self.politeness.pause().await;
        detail
    }

    async fn download_floor_plan(&self, complex_id: &str, target: &Path) -> bool {
        let Some(url) = mobile::fetch_ground_plan_url(&self.client, complex_id).await else {
            return false;
        };
        self.politeness.pause().await;
        mobile::download_image(&self.client, &url, target).await
    }
}
