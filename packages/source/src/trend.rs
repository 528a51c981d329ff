//! Price trend-chart payload parser.
//!
//! The chart service answers a JSON-P style body
//! (`chartCallback({...})`) whose payload carries the recent deal rows
//! the chart is drawn from. The wrapper is stripped with the balanced
//! scanner; rows missing any required field are dropped.
//!
//! Observed payload shape (abridged):
//!
//! ```json
//! chartCallback({
//!   "complexNo": "12345",
//!   "deals": [
//!     {"dealYmd": "20260115", "dealAmount": 59000, "floor": 8, "area": 79.34}
//!   ]
//! })
//! ```
//!
//! `dealAmount` is in units of 10,000 won, like the government API.

use apt_briefing_format::{format_price, m2_to_pyeong_label};
use apt_briefing_models::TransactionRecord;
use chrono::NaiveDate;
use serde_json::Value;

/// Parses a captured trend payload into transaction records, most
/// recent first.
#[must_use]
pub fn parse_trend_payload(body: &str) -> Option<Vec<TransactionRecord>> {
    let value = apt_briefing_extract::strip_jsonp(body)?;
    let deals = value["deals"].as_array()?;

    let mut records: Vec<TransactionRecord> =
        deals.iter().filter_map(parse_deal).collect();

    if records.is_empty() {
        return None;
    }

    records.sort_by(|a, b| b.date.cmp(&a.date));
    Some(records)
}

fn parse_deal(deal: &Value) -> Option<TransactionRecord> {
    let date = parse_ymd(deal["dealYmd"].as_str()?)?;
    let man = deal["dealAmount"].as_i64().filter(|v| *v > 0)?;
    let area_m2 = deal["area"].as_f64().filter(|v| *v > 0.0)?;
    let floor = i32::try_from(deal["floor"].as_i64()?).ok()?;

    let price_raw = man * 10_000;
    Some(TransactionRecord {
        date,
        area_pyeong: m2_to_pyeong_label(area_m2),
        area_m2,
        floor,
        price: format_price(price_raw),
        price_raw,
    })
}

/// Parses `"YYYYMMDD"` into a date.
fn parse_ymd(ymd: &str) -> Option<NaiveDate> {
    if ymd.len() != 8 {
        return None;
    }
    let year: i32 = ymd.get(..4)?.parse().ok()?;
    let month: u32 = ymd.get(4..6)?.parse().ok()?;
    let day: u32 = ymd.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_payload_sorted_recent_first() {
        let body = r#"chartCallback({
            "complexNo": "12345",
            "deals": [
                {"dealYmd": "20251220", "dealAmount": 71000, "floor": 12, "area": 105.49},
                {"dealYmd": "20260115", "dealAmount": 59000, "floor": 8, "area": 79.34}
            ]
        });"#;
        let records = parse_trend_payload(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price_raw, 590_000_000);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(records[1].price, "7억 1000만원");
    }

    #[test]
    fn rows_missing_fields_are_dropped() {
        let body = r#"cb({"deals": [
            {"dealYmd": "20260115", "dealAmount": 59000, "floor": 8, "area": 79.34},
            {"dealYmd": "20260116", "dealAmount": 0, "floor": 8, "area": 79.34},
            {"dealYmd": "bad", "dealAmount": 59000, "floor": 8, "area": 79.34}
        ]})"#;
        let records = parse_trend_payload(body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_deals_is_none() {
        assert!(parse_trend_payload(r#"cb({"deals": []})"#).is_none());
        assert!(parse_trend_payload("not even json").is_none());
    }
}
