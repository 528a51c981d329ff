#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Currency, area, and month-window conversions.
//!
//! Korean real-estate amounts are written in 억 (100,000,000 won) and
//! 만 (10,000 won) units; floor areas are quoted in both m² and 평.
//! These are pure functions — every caller that needs "today" passes
//! it in.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// One 평 in square meters.
pub const PYEONG_IN_M2: f64 = 3.305785;

const EOK: i64 = 100_000_000;
const MAN: i64 = 10_000;

/// Matches "6.4억", "6억4000만", "6억 4000만원".
static EOK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.?\d*)억(?:(\d+)만)?").expect("valid regex"));

/// Matches "5900만원" / "5900만".
static MAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)만").expect("valid regex"));

/// Formats a won amount the way listings quote it.
///
/// `640000000` → `"6억 4000만원"`, `59000000` → `"5900만원"`,
/// `1200000000` → `"12억"` (no `"0만원"` tail).
#[must_use]
pub fn format_price(price_raw: i64) -> String {
    if price_raw >= EOK {
        let eok = price_raw / EOK;
        let man = (price_raw % EOK) / MAN;
        if man > 0 {
            format!("{eok}억 {man}만원")
        } else {
            format!("{eok}억")
        }
    } else if price_raw >= MAN {
        format!("{}만원", price_raw / MAN)
    } else {
        format!("{price_raw}원")
    }
}

/// Parses a written price back to won.
///
/// Accepts `"6.4억"`, `"6억 4000만원"`, `"5900만원"`; commas and
/// whitespace are ignored. Returns `None` for anything else.
#[must_use]
pub fn parse_price(price: &str) -> Option<i64> {
    let compact: String = price.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();

    if let Some(caps) = EOK_RE.captures(&compact) {
        let eok: f64 = caps.get(1)?.as_str().parse().ok()?;
        let man: i64 = caps
            .get(2)
            .map_or(Ok(0), |m| m.as_str().parse())
            .ok()?;
        #[allow(clippy::cast_possible_truncation)]
        return Some((eok * EOK as f64).round() as i64 + man * MAN);
    }

    if let Some(caps) = MAN_RE.captures(&compact) {
        let man: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(man * MAN);
    }

    None
}

/// Converts m² to the rounded 평 count used in transaction rows.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn m2_to_pyeong(m2: f64) -> i64 {
    (m2 / PYEONG_IN_M2).round() as i64
}

/// Display label for an area in m² (e.g., `"21평"`).
#[must_use]
pub fn m2_to_pyeong_label(m2: f64) -> String {
    format!("{}평", m2_to_pyeong(m2))
}

/// Converts 평 to m², rounded to two decimals.
#[must_use]
pub fn pyeong_to_m2(pyeong: f64) -> f64 {
    (pyeong * PYEONG_IN_M2 * 100.0).round() / 100.0
}

/// A calendar (year, month) key for transaction windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl MonthKey {
    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// This key moved back `n` calendar months.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn minus_months(self, n: u32) -> Self {
        let total = self.year * 12 + self.month as i32 - 1 - n as i32;
        Self {
            year: total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    /// Query key in `YYYYMM` form (e.g., `"202601"`).
    #[must_use]
    pub fn deal_ymd(self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Full label (e.g., `"2026년 1월"`).
    #[must_use]
    pub fn label(self) -> String {
        format!("{}년 {}월", self.year, self.month)
    }

    /// Short label used for the all-time-high date (e.g., `"21년 10월"`).
    #[must_use]
    pub fn short_label(self) -> String {
        format!("{:02}년 {:02}월", self.year.rem_euclid(100), self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_eok_and_man() {
        assert_eq!(format_price(640_000_000), "6억 4000만원");
    }

    #[test]
    fn formats_man_only() {
        assert_eq!(format_price(59_000_000), "5900만원");
    }

    #[test]
    fn formats_round_eok_without_zero_man() {
        assert_eq!(format_price(1_200_000_000), "12억");
    }

    #[test]
    fn formats_below_one_man() {
        assert_eq!(format_price(9_000), "9000원");
    }

    #[test]
    fn parses_decimal_eok() {
        assert_eq!(parse_price("6.4억"), Some(640_000_000));
    }

    #[test]
    fn parses_eok_with_man() {
        assert_eq!(parse_price("6억 4000만원"), Some(640_000_000));
    }

    #[test]
    fn parses_man_only() {
        assert_eq!(parse_price("5900만원"), Some(59_000_000));
    }

    #[test]
    fn parses_with_commas() {
        assert_eq!(parse_price("5,900만원"), Some(59_000_000));
    }

    #[test]
    fn rejects_garbage_price() {
        assert_eq!(parse_price("미입력"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn format_parse_round_trip() {
        for raw in [640_000_000, 59_000_000, 1_200_000_000, 553_000_000] {
            assert_eq!(parse_price(&format_price(raw)), Some(raw));
        }
    }

    #[test]
    fn pyeong_round_trip_within_rounding() {
        for m2 in [49.0, 79.34, 105.49, 84.92] {
            let pyeong = m2 / PYEONG_IN_M2;
            let back = pyeong_to_m2(pyeong);
            assert!((back - m2).abs() < 0.01, "{m2} -> {pyeong} -> {back}");
        }
    }

    #[test]
    fn pyeong_label_rounds() {
        assert_eq!(m2_to_pyeong_label(49.0), "15평");
        assert_eq!(m2_to_pyeong_label(79.34), "24평");
    }

    #[test]
    fn month_key_minus_months_wraps_years() {
        let jan = MonthKey { year: 2026, month: 1 };
        assert_eq!(jan.minus_months(1), MonthKey { year: 2025, month: 12 });
        assert_eq!(jan.minus_months(13), MonthKey { year: 2024, month: 12 });
        assert_eq!(jan.minus_months(0), jan);
    }

    #[test]
    fn month_key_labels() {
        let key = MonthKey { year: 2026, month: 1 };
        assert_eq!(key.deal_ymd(), "202601");
        assert_eq!(key.label(), "2026년 1월");
        assert_eq!(key.short_label(), "26년 01월");
    }

    #[test]
    fn month_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2021, 10, 5).unwrap();
        assert_eq!(MonthKey::from_date(date).short_label(), "21년 10월");
    }
}
