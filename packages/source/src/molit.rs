//! Government transaction API client.
//!
//! The public real-transaction service is paginated by month
//! (`LAWD_CD` + `DEAL_YMD`) and answers XML. Rows are extracted with
//! per-`<item>` regexes over the named fields; a row missing any
//! required field is skipped rather than failing the month. Amounts
//! arrive as comma-grouped strings in units of 10,000 won.

use std::sync::LazyLock;

use apt_briefing_format::{MonthKey, format_price, m2_to_pyeong_label};
use apt_briefing_models::TransactionRecord;
use chrono::NaiveDate;
use regex::Regex;

use crate::{http, politeness::Politeness};

/// Real-transaction API endpoint.
const API_URL: &str = "http://openapi.molit.go.kr/OpenAPI_ToolInstallPackage/service/rest/RTMSDataSvcAptTradeDev/getRTMSDataSvcAptTradeDev";

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("valid regex"));

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("거래금액"));
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("년"));
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("월"));
static DAY_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("일"));
static FLOOR_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("층"));
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("전용면적"));
static APT_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("아파트"));

fn field_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}>\s*(.*?)\s*</{tag}>")).expect("valid regex")
}

/// Fetches one month of transactions. Source trouble → `None`; a month
/// with no matching rows → `Some(vec![])`.
pub async fn fetch_month(
    client: &reqwest::Client,
    api_key: &str,
    lawd_cd: &str,
    month: MonthKey,
    complex_name: &str,
) -> Option<Vec<TransactionRecord>> {
    let deal_ymd = month.deal_ymd();
    match http::get_text(
        client,
        API_URL,
        &[
            ("LAWD_CD", lawd_cd),
            ("DEAL_YMD", &deal_ymd),
            ("serviceKey", api_key),
        ],
    )
    .await
    {
        Ok(xml) => Some(parse_items(&xml, complex_name)),
        Err(e) => {
            log::warn!("transaction API failed for {deal_ymd}: {e}");
            None
        }
    }
}

/// Fetches a rolling window of months, most recent first, with a
/// politeness pause between calls. Failed months are skipped.
pub async fn fetch_months(
    client: &reqwest::Client,
    api_key: &str,
    lawd_cd: &str,
    months: &[MonthKey],
    complex_name: &str,
    politeness: Politeness,
) -> Vec<TransactionRecord> {
    let mut all = Vec::new();
    for (i, month) in months.iter().enumerate() {
        if i > 0 {
            politeness.pause().await;
        }
        if let Some(mut rows) = fetch_month(client, api_key, lawd_cd, *month, complex_name).await {
            all.append(&mut rows);
        }
    }
    all
}

/// Parses every complete `<item>` row out of a month response.
///
/// When `complex_name` is non-empty, rows whose apartment name does not
/// contain it are dropped (the legal-division query returns the whole
/// neighborhood).
#[must_use]
pub fn parse_items(xml: &str, complex_name: &str) -> Vec<TransactionRecord> {
    ITEM_RE
        .captures_iter(xml)
        .filter_map(|caps| parse_item(caps.get(1).map_or("", |m| m.as_str()), complex_name))
        .collect()
}

fn parse_item(block: &str, complex_name: &str) -> Option<TransactionRecord> {
    if !complex_name.is_empty() {
        let apt = field(&APT_RE, block)?;
        if !apt.contains(complex_name) {
            return None;
        }
    }

    let amount = field(&AMOUNT_RE, block)?;
    let year: i32 = field(&YEAR_RE, block)?.parse().ok()?;
    let month: u32 = field(&MONTH_RE, block)?.parse().ok()?;
    let day: u32 = field(&DAY_RE, block)?.parse().ok()?;
    let floor: i32 = field(&FLOOR_RE, block)?.parse().ok()?;
    let area_m2: f64 = field(&AREA_RE, block)?.parse().ok()?;

    let man: i64 = amount.replace(',', "").trim().parse().ok()?;
    let price_raw = man * 10_000;

    // Some rows carry out-of-range days; clamp rather than drop.
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 28))?;

    Some(TransactionRecord {
        date,
        area_pyeong: m2_to_pyeong_label(area_m2),
        area_m2,
        floor,
        price: format_price(price_raw),
        price_raw,
    })
}

fn field(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTH_XML: &str = r"
        <response><body><items>
          <item>
            <거래금액>    59,000</거래금액>
            <년>2026</년><월>1</월><일>15</일>
            <층>8</층><전용면적>79.34</전용면적>
            <아파트>중계그린</아파트>
          </item>
          <item>
            <거래금액>55,300</거래금액>
            <년>2026</년><월>1</월><일>3</일>
            <층>5</층><전용면적>79.34</전용면적>
            <아파트>중계그린</아파트>
          </item>
          <item>
            <거래금액>71,000</거래금액>
            <년>2025</년><월>12</월><일>20</일>
            <층>12</층><전용면적>105.49</전용면적>
            <아파트>옆단지</아파트>
          </item>
          <item>
            <년>2026</년><월>1</월><일>9</일>
            <층>3</층><전용면적>49.0</전용면적>
            <아파트>중계그린</아파트>
          </item>
        </items></body></response>";

    #[test]
    fn parses_complete_rows_with_name_filter() {
        let rows = parse_items(MONTH_XML, "중계그린");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price_raw, 590_000_000);
        assert_eq!(rows[0].price, "5억 9000만원");
        assert_eq!(rows[0].area_pyeong, "24평");
        assert_eq!(rows[0].floor, 8);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn no_filter_keeps_all_complete_rows() {
        let rows = parse_items(MONTH_XML, "");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let rows = parse_items(MONTH_XML, "중계그린");
        assert!(rows.iter().all(|r| r.price_raw > 0));
    }

    #[test]
    fn clamps_out_of_range_day() {
        let xml = r"<item>
            <거래금액>10,000</거래금액>
            <년>2026</년><월>2</월><일>31</일>
            <층>1</층><전용면적>49.0</전용면적>
            <아파트>중계그린</아파트>
        </item>";
        let rows = parse_items(xml, "");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn empty_document_is_empty() {
        assert!(parse_items("<response/>", "").is_empty());
    }
}
