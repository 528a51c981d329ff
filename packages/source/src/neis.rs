//! National school-information API client.
//!
//! The open education-data service answers school metadata by name; no
//! API key is required for small result sets. An exact `SCHUL_NM` match
//! is preferred over the first fuzzy row — school names collide across
//! districts.

use serde_json::Value;

use crate::http;

const API_URL: &str = "https://open.neis.go.kr/hub/schoolInfo";

/// School metadata as returned by the information service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeisSchool {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// `"YYYY.MM.DD"`.
    pub founding_date: String,
    /// Public/private founding classification.
    pub school_type: String,
    pub education_office: String,
    pub coedu: String,
    pub homepage: String,
}

/// Looks a school up by name. Source trouble or no rows → `None`.
pub async fn fetch_school(client: &reqwest::Client, school_name: &str) -> Option<NeisSchool> {
    let body = match http::get_json(
        client,
        API_URL,
        &[("Type", "json"), ("SCHUL_NM", school_name), ("pSize", "5")],
    )
    .await
    {
        Ok(body) => body,
        Err(e) => {
            log::warn!("school info lookup failed for {school_name}: {e}");
            return None;
        }
    };

    parse_school_response(&body, school_name)
}

/// Picks the best row: exact name match first, then the first row.
#[must_use]
pub fn parse_school_response(body: &Value, school_name: &str) -> Option<NeisSchool> {
    let blocks = body["schoolInfo"].as_array()?;
    // Row data sits in the second block; the first is the result header.
    let rows = blocks.get(1)?["row"].as_array()?;

    let row = rows
        .iter()
        .find(|row| row["SCHUL_NM"].as_str() == Some(school_name))
        .or_else(|| rows.first())?;

    Some(school_from_row(row))
}

fn school_from_row(row: &Value) -> NeisSchool {
    let text = |key: &str| row[key].as_str().unwrap_or_default().trim().to_string();

    let mut address = text("ORG_RDNMA");
    let detail = text("ORG_RDNDA");
    let detail = detail.trim_start_matches('/').trim();
    if !detail.is_empty() {
        if address.is_empty() {
            address = detail.to_string();
        } else {
            address = format!("{address} {detail}");
        }
    }

    NeisSchool {
        name: text("SCHUL_NM"),
        address,
        phone: text("ORG_TELNO"),
        founding_date: format_founding_date(&text("FOND_YMD")),
        school_type: text("FOND_SC_NM"),
        education_office: text("ATPT_OFCDC_SC_NM"),
        coedu: text("COEDU_SC_NM"),
        homepage: text("HMPG_ADRES"),
    }
}

/// `"YYYYMMDD"` → `"YYYY.MM.DD"`; anything shorter passes through.
#[must_use]
pub fn format_founding_date(ymd: &str) -> String {
    match (ymd.get(..4), ymd.get(4..6), ymd.get(6..8)) {
        (Some(y), Some(m), Some(d)) => format!("{y}.{m}.{d}"),
        _ => ymd.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(rows: Value) -> Value {
        serde_json::json!({
            "schoolInfo": [
                {"head": [{"list_total_count": 2}]},
                {"row": rows}
            ]
        })
    }

    #[test]
    fn prefers_exact_name_match() {
        let body = response(serde_json::json!([
            {"SCHUL_NM": "서울중계초등학교병설유치원", "ORG_RDNMA": "다른곳"},
            {"SCHUL_NM": "서울중계초등학교", "ORG_RDNMA": "서울 노원구 중계로 225",
             "ORG_RDNDA": "/ (중계동)", "ORG_TELNO": "02-000-0000",
             "FOND_YMD": "19920301", "FOND_SC_NM": "공립",
             "ATPT_OFCDC_SC_NM": "서울특별시교육청", "COEDU_SC_NM": "남여공학",
             "HMPG_ADRES": "https://junggye.es.kr"}
        ]));
        let school = parse_school_response(&body, "서울중계초등학교").unwrap();
        assert_eq!(school.name, "서울중계초등학교");
        assert_eq!(school.address, "서울 노원구 중계로 225 (중계동)");
        assert_eq!(school.founding_date, "1992.03.01");
        assert_eq!(school.school_type, "공립");
    }

    #[test]
    fn falls_back_to_first_fuzzy_row() {
        let body = response(serde_json::json!([
            {"SCHUL_NM": "서울중계초등학교병설유치원", "ORG_RDNMA": "주소"}
        ]));
        let school = parse_school_response(&body, "서울중계초등학교").unwrap();
        assert_eq!(school.name, "서울중계초등학교병설유치원");
    }

    #[test]
    fn empty_rows_is_none() {
        let body = response(serde_json::json!([]));
        assert!(parse_school_response(&body, "서울중계초등학교").is_none());
    }

    #[test]
    fn error_shape_is_none() {
        let body = serde_json::json!({"RESULT": {"CODE": "INFO-200"}});
        assert!(parse_school_response(&body, "서울중계초등학교").is_none());
    }

    #[test]
    fn founding_date_formats() {
        assert_eq!(format_founding_date("19920301"), "1992.03.01");
        assert_eq!(format_founding_date(""), "");
        assert_eq!(format_founding_date("1992"), "1992");
    }
}
