//! Mobile/internal API client for the listing portal.
//!
//! Header-authenticated JSON GETs — the portal only checks for
//! browser-like headers, which the shared client already carries.
//! Non-200 and non-JSON responses are `None`, never errors: this API
//! is undocumented and changes without notice.

use std::path::Path;

use serde_json::Value;

use crate::http;

const API_BASE: &str = "https://new.land.naver.com/api";
const MOBILE_BASE: &str = "https://m.land.naver.com/complex";

/// Trade-type codes tried in order when searching listings: sale,
/// jeonse, monthly rent.
pub const TRADE_TYPE_CODES: &[&str] = &["A1", "B1", "B2"];

/// A listing summary from the article search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileArticle {
    pub article_no: String,
    pub complex_name: String,
}

/// Detail fields for one article.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MobileArticleDetail {
    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area_m2: Option<f64>,
    pub direction: Option<String>,
}

/// Searches a complex's listings, trying each trade-type code until one
/// returns articles. The first article's embedded complex name is the
/// minimal fallback the complex resolver needs.
pub async fn fetch_article_list(
    client: &reqwest::Client,
    complex_id: &str,
) -> Option<Vec<MobileArticle>> {
    for trade_type in TRADE_TYPE_CODES {
        let url = format!("{MOBILE_BASE}/getComplexArticleList");
        let body = match http::get_json(
            client,
            &url,
            &[
                ("hscpNo", complex_id),
                ("tradTpCd", trade_type),
                ("order", "prc"),
                ("showR0", "N"),
                ("page", "1"),
            ],
        )
        .await
        {
            Ok(body) => body,
            Err(e) => {
                log::warn!("article search failed for {complex_id} ({trade_type}): {e}");
                continue;
            }
        };

        let articles = parse_article_list(&body);
        if !articles.is_empty() {
            return Some(articles);
        }
        log::debug!("no {trade_type} articles for {complex_id}");
    }
    None
}

/// Parses the article-search payload. Items missing an article number
/// are dropped.
#[must_use]
pub fn parse_article_list(body: &Value) -> Vec<MobileArticle> {
    let Some(items) = body["result"]["list"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let article_no = item["atclNo"].as_str()?.to_string();
            Some(MobileArticle {
                article_no,
                complex_name: item["hscpNm"].as_str().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Fetches the detail payload for one article.
pub async fn fetch_article_detail(
    client: &reqwest::Client,
    article_no: &str,
) -> Option<MobileArticleDetail> {
    let url = format!("{API_BASE}/articles/{article_no}");
    match http::get_json(client, &url, &[]).await {
        Ok(body) => Some(parse_article_detail(&body)),
        Err(e) => {
            log::warn!("article detail failed for {article_no}: {e}");
            None
        }
    }
}

/// Parses detail fields, tolerating either the wrapped
/// (`articleDetail`) or flat response shape.
#[must_use]
pub fn parse_article_detail(body: &Value) -> MobileArticleDetail {
    let detail = if body["articleDetail"].is_object() {
        &body["articleDetail"]
    } else {
        body
    };

    let area_m2 = detail["exclusiveArea"]
        .as_f64()
        .or_else(|| detail["area2"].as_f64())
        .filter(|a| *a > 0.0);

    MobileArticleDetail {
        rooms: u32_opt(&detail["roomCount"]),
        bathrooms: u32_opt(&detail["bathroomCount"]),
        area_m2,
        direction: detail["direction"]
            .as_str()
            .filter(|d| !d.is_empty())
            .map(ToString::to_string),
    }
}

/// URL of the first aerial photo for a complex, if the photo listing
/// responds.
pub async fn fetch_first_photo_url(client: &reqwest::Client, complex_id: &str) -> Option<String> {
    let url = format!("{API_BASE}/complexes/{complex_id}/photos");
    let body = http::get_json(client, &url, &[]).await.ok()?;
    first_url_field(&body, "photoUrl")
}

/// URL of the first ground-plan (site layout) image for a complex.
pub async fn fetch_ground_plan_url(client: &reqwest::Client, complex_id: &str) -> Option<String> {
    let url = format!("{API_BASE}/complexes/{complex_id}/ground-plans");
    let body = http::get_json(client, &url, &[]).await.ok()?;
    first_url_field(&body, "imageUrl")
}

/// Downloads an image URL into the per-complex cache, skipping the
/// fetch when the target already exists.
pub async fn download_image(client: &reqwest::Client, url: &str, path: &Path) -> bool {
    http::download_cached(client, url, path).await
}

fn first_url_field(body: &Value, field: &str) -> Option<String> {
    let items = body.as_array()?;
    let url = items.first()?[field].as_str()?;
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

fn u32_opt(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_article_list() {
        let body = serde_json::json!({
            "result": {
                "list": [
                    {"atclNo": "67890", "hscpNm": "중계그린"},
                    {"atclNo": "11111", "hscpNm": "중계그린"},
                    {"hscpNm": "번호없음"}
                ]
            }
        });
        let articles = parse_article_list(&body);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].article_no, "67890");
        assert_eq!(articles[0].complex_name, "중계그린");
    }

    #[test]
    fn empty_or_malformed_list_is_empty() {
        assert!(parse_article_list(&serde_json::json!({})).is_empty());
        assert!(parse_article_list(&serde_json::json!({"result": {"list": []}})).is_empty());
    }

    #[test]
    fn parses_wrapped_article_detail() {
        let body = serde_json::json!({
            "articleDetail": {
                "roomCount": 3,
                "bathroomCount": "2",
                "exclusiveArea": 79.34,
                "direction": "남향"
            }
        });
        let detail = parse_article_detail(&body);
        assert_eq!(detail.rooms, Some(3));
        assert_eq!(detail.bathrooms, Some(2));
        assert_eq!(detail.area_m2, Some(79.34));
        assert_eq!(detail.direction.as_deref(), Some("남향"));
    }

    #[test]
    fn parses_flat_detail_with_area2_fallback() {
        let body = serde_json::json!({"area2": 49.0});
        let detail = parse_article_detail(&body);
        assert_eq!(detail.area_m2, Some(49.0));
        assert_eq!(detail.rooms, None);
    }

    #[test]
    fn zero_area_is_none() {
        let body = serde_json::json!({"exclusiveArea": 0.0});
        assert_eq!(parse_article_detail(&body).area_m2, None);
    }

    #[test]
    fn first_url_field_skips_empty() {
        let body = serde_json::json!([{"photoUrl": ""}]);
        assert!(first_url_field(&body, "photoUrl").is_none());
        let body = serde_json::json!([{"photoUrl": "https://img/1.jpg"}]);
        assert_eq!(
            first_url_field(&body, "photoUrl").as_deref(),
            Some("https://img/1.jpg")
        );
    }
}
