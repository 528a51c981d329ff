//! Price resolver: transaction history and window statistics.
//!
//! Chain: (1) the trend-chart payload captured alongside the chart
//! screenshot, (2) the government transaction API over a rolling
//! six-month window, (3) fixed mock data. Falling back to mock is an
//! explicit, logged decision — the log line distinguishes a missing
//! API key from exhausted sources.
//!
//! Window statistics are anchored to the injected `today`, not the
//! latest transaction: a slow market legitimately shows zero trades in
//! the current month.

use apt_briefing_capture::capability::BrowserSession;
use apt_briefing_capture::scripts;
use apt_briefing_format::{MonthKey, format_price};
use apt_briefing_models::{ComplexRecord, ImageKind, PriceSummary, TransactionRecord};
use apt_briefing_source::politeness::Politeness;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::{ResolveContext, existing, sidecar};

/// Months queried from the government API.
const WINDOW_MONTHS: u32 = 6;

/// Transactions kept on the record for display.
const DISPLAY_LIMIT: usize = 10;

/// Why the resolver fell back to mock data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReason {
    /// No API key (or no legal-division code) was configured.
    MissingConfig,
    /// Every source was tried and returned nothing.
    SourcesExhausted,
}

/// Sources the price chain draws from.
#[async_trait]
pub trait PriceSources: Send + Sync {
    /// Step 1: deal rows from the trend-chart payload.
    async fn trend_transactions(&self, complex_name: &str) -> Option<Vec<TransactionRecord>>;

    /// Step 2: one pass over the government API months.
    async fn government_transactions(
        &self,
        api_key: &str,
        lawd_cd: &str,
        months: &[MonthKey],
        complex_name: &str,
        politeness: Politeness,
    ) -> Vec<TransactionRecord>;
}

/// Resolves the price summary for one complex.
pub async fn resolve_price(
    ctx: &ResolveContext,
    sources: &dyn PriceSources,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
) -> PriceSummary {
    let complex_id = complex.complex_id.as_str();

    let transactions = gather_transactions(ctx, sources, complex).await;

    let mut summary = match transactions {
        Ok(txns) => summarize(complex_id, txns, ctx.today),
        Err(reason) => {
            match reason {
                MockReason::MissingConfig => log::warn!(
                    "price {complex_id}: mock data (transaction API not configured)"
                ),
                MockReason::SourcesExhausted => log::warn!(
                    "price {complex_id}: mock data (all price sources exhausted)"
                ),
            }
            mock_summary(complex_id, ctx.today)
        }
    };

    capture_chart(ctx, session, complex, &mut summary).await;
    summary
}

/// Runs the source chain; `Err` carries the mock reason.
async fn gather_transactions(
    ctx: &ResolveContext,
    sources: &dyn PriceSources,
    complex: &ComplexRecord,
) -> Result<Vec<TransactionRecord>, MockReason> {
    let complex_id = complex.complex_id.as_str();

    if let Some(txns) = sources.trend_transactions(&complex.name).await
        && !txns.is_empty()
    {
        log::info!("price {complex_id}: {} rows from trend payload", txns.len());
        return Ok(txns);
    }

    let lawd_cd = sidecar::read(&ctx.work_dir, complex_id)
        .and_then(|s| s.lawd_cd().map(ToString::to_string));

    let (Some(api_key), Some(lawd_cd)) = (ctx.api_key.as_deref(), lawd_cd) else {
        return Err(MockReason::MissingConfig);
    };

    let months = window_months(ctx.today);
    let txns = sources
        .government_transactions(api_key, &lawd_cd, &months, &complex.name, ctx.politeness)
        .await;

    if txns.is_empty() {
        Err(MockReason::SourcesExhausted)
    } else {
        log::info!("price {complex_id}: {} rows from transaction API", txns.len());
        Ok(txns)
    }
}

/// The rolling query window, current month first.
#[must_use]
pub fn window_months(today: NaiveDate) -> Vec<MonthKey> {
    let current = MonthKey::from_date(today);
    (0..WINDOW_MONTHS).map(|i| current.minus_months(i)).collect()
}

/// Computes the full summary from raw transactions.
///
/// Month counts use exact (year, month) equality against `today`; the
/// recent high/low window is three calendar months, widened to six
/// when the three-month window is empty.
#[must_use]
pub fn summarize(
    complex_id: &str,
    mut transactions: Vec<TransactionRecord>,
    today: NaiveDate,
) -> PriceSummary {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    let month1 = MonthKey::from_date(today);
    let month2 = month1.minus_months(1);

    let in_month = |key: MonthKey| {
        transactions
            .iter()
            .filter(|t| t.date.year() == key.year && t.date.month() == key.month)
            .count()
    };

    let recent = window_slice(&transactions, month1, 3);
    let recent = if recent.is_empty() {
        window_slice(&transactions, month1, WINDOW_MONTHS)
    } else {
        recent
    };

    let (recent_high, recent_low) = high_low(&recent);

    let all_time = transactions.iter().max_by_key(|t| t.price_raw);
    let all_time_high = all_time.map(|t| t.price.clone()).unwrap_or_default();
    let all_time_high_date = all_time
        .map(|t| MonthKey::from_date(t.date).short_label())
        .unwrap_or_default();

    let month1_count = in_month(month1);
    let month2_count = in_month(month2);

    transactions.truncate(DISPLAY_LIMIT);

    PriceSummary {
        complex_id: complex_id.to_string(),
        transactions,
        month1_count,
        month1_label: month1.label(),
        month2_count,
        month2_label: month2.label(),
        recent_3m_high: recent_high,
        recent_3m_low: recent_low,
        all_time_high,
        all_time_high_date,
        chart_image_path: None,
    }
}

/// Transactions falling in the `months` most recent calendar months.
fn window_slice(
    transactions: &[TransactionRecord],
    current: MonthKey,
    months: u32,
) -> Vec<TransactionRecord> {
    let keys: Vec<MonthKey> = (0..months).map(|i| current.minus_months(i)).collect();
    transactions
        .iter()
        .filter(|t| keys.contains(&MonthKey::from_date(t.date)))
        .cloned()
        .collect()
}

fn high_low(window: &[TransactionRecord]) -> (String, String) {
    let high = window.iter().max_by_key(|t| t.price_raw);
    let low = window.iter().min_by_key(|t| t.price_raw);
    (
        high.map(|t| t.price.clone()).unwrap_or_default(),
        low.map(|t| t.price.clone()).unwrap_or_default(),
    )
}

/// The fixed mock dataset, dated relative to `today` so the month
/// labels stay plausible.
#[must_use]
pub fn mock_summary(complex_id: &str, today: NaiveDate) -> PriceSummary {
    let mock = |raw: i64, date: NaiveDate, pyeong: &str, area: f64, floor: i32| TransactionRecord {
        date,
        area_pyeong: pyeong.to_string(),
        area_m2: area,
        floor,
        price: format_price(raw),
        price_raw: raw,
    };

    let day = |months_back: u32, day: u32| {
        let key = MonthKey::from_date(today).minus_months(months_back);
        NaiveDate::from_ymd_opt(key.year, key.month, day)
            .unwrap_or_else(|| today - chrono::Days::new(u64::from(months_back) * 30))
    };

    let transactions = vec![
        mock(590_000_000, day(0, 15), "24평", 79.34, 8),
        mock(553_000_000, day(0, 3), "24평", 79.34, 5),
        mock(710_000_000, day(1, 20), "32평", 105.49, 12),
    ];

    summarize(complex_id, transactions, today)
}

async fn capture_chart(
    ctx: &ResolveContext,
    session: Option<&BrowserSession>,
    complex: &ComplexRecord,
    summary: &mut PriceSummary,
) {
    let Some(session) = session else { return };

    let script = scripts::price_chart_script(&complex.name);
    let path = ctx.image_path(&complex.complex_id, ImageKind::PriceChart);
    if session.capture(&script, &path).await.produced_file() {
        summary.chart_image_path = existing(path);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use apt_briefing_format::m2_to_pyeong_label;

    use super::*;
    use crate::test_support::offline_context;

    struct FakeSources {
        trend: Option<Vec<TransactionRecord>>,
        government: Vec<TransactionRecord>,
        trend_calls: AtomicUsize,
        government_calls: AtomicUsize,
    }

    impl FakeSources {
        fn new(trend: Option<Vec<TransactionRecord>>, government: Vec<TransactionRecord>) -> Self {
            Self {
                trend,
                government,
                trend_calls: AtomicUsize::new(0),
                government_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceSources for FakeSources {
        async fn trend_transactions(&self, _name: &str) -> Option<Vec<TransactionRecord>> {
            self.trend_calls.fetch_add(1, Ordering::SeqCst);
            self.trend.clone()
        }

        async fn government_transactions(
            &self,
            _api_key: &str,
            _lawd_cd: &str,
            _months: &[MonthKey],
            _name: &str,
            _politeness: Politeness,
        ) -> Vec<TransactionRecord> {
            self.government_calls.fetch_add(1, Ordering::SeqCst);
            self.government.clone()
        }
    }

    fn txn(raw: i64, date: NaiveDate, floor: i32) -> TransactionRecord {
        TransactionRecord {
            date,
            area_pyeong: m2_to_pyeong_label(79.34),
            area_m2: 79.34,
            floor,
            price: format_price(raw),
            price_raw: raw,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_counts_use_exact_year_month() {
        let txns = vec![
            txn(590_000_000, date(2026, 1, 15), 8),
            txn(553_000_000, date(2026, 1, 3), 5),
            txn(710_000_000, date(2025, 12, 20), 12),
            txn(700_000_000, date(2025, 1, 10), 3),
        ];
        let summary = summarize("12345", txns, today());
        assert_eq!(summary.month1_count, 2);
        assert_eq!(summary.month1_label, "2026년 1월");
        assert_eq!(summary.month2_count, 1);
        assert_eq!(summary.month2_label, "2025년 12월");
    }

    #[test]
    fn recent_window_and_all_time_high() {
        let txns = vec![
            txn(590_000_000, date(2026, 1, 15), 8),
            txn(553_000_000, date(2025, 12, 3), 5),
            txn(920_000_000, date(2021, 10, 7), 14),
        ];
        let summary = summarize("12345", txns, today());
        assert_eq!(summary.recent_3m_high, "5억 9000만원");
        assert_eq!(summary.recent_3m_low, "5억 5300만원");
        assert_eq!(summary.all_time_high, "9억 2000만원");
        assert_eq!(summary.all_time_high_date, "21년 10월");
    }

    #[test]
    fn empty_three_month_window_widens_to_six() {
        let txns = vec![
            txn(600_000_000, date(2025, 9, 2), 4),
            txn(560_000_000, date(2025, 8, 14), 9),
        ];
        let summary = summarize("12345", txns, today());
        assert_eq!(summary.month1_count, 0);
        assert_eq!(summary.recent_3m_high, "6억");
        assert_eq!(summary.recent_3m_low, "5억 6000만원");
    }

    #[test]
    fn transactions_sorted_and_truncated() {
        let mut txns = Vec::new();
        for day in 1..=15 {
            txns.push(txn(500_000_000 + i64::from(day), date(2026, 1, day as u32), 2));
        }
        let summary = summarize("12345", txns, today());
        assert_eq!(summary.transactions.len(), 10);
        assert_eq!(summary.transactions[0].date, date(2026, 1, 15));
    }

    #[tokio::test]
    async fn trend_hit_skips_government_api() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = offline_context(dir.path(), today());
        ctx.api_key = Some("key".to_string());

        let sources = FakeSources::new(
            Some(vec![txn(590_000_000, date(2026, 1, 15), 8)]),
            vec![txn(100_000_000, date(2026, 1, 2), 1)],
        );

        let complex = ComplexRecord {
            name: "중계그린".to_string(),
            ..ComplexRecord::placeholder("12345")
        };
        let summary = resolve_price(&ctx, &sources, None, &complex).await;
        assert_eq!(summary.transactions[0].price_raw, 590_000_000);
        assert_eq!(sources.government_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_api_key_means_mock_without_government_call() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = offline_context(dir.path(), today());
        let sources = FakeSources::new(None, vec![txn(100_000_000, date(2026, 1, 2), 1)]);

        let complex = ComplexRecord::placeholder("12345");
        let summary = resolve_price(&ctx, &sources, None, &complex).await;
        assert_eq!(sources.government_calls.load(Ordering::SeqCst), 0);
        // Mock dataset: two current-month rows, one in the previous month.
        assert_eq!(summary.month1_count, 2);
        assert_eq!(summary.month2_count, 1);
        assert_eq!(summary.all_time_high, "7억 1000만원");
    }

    #[tokio::test]
    async fn government_api_used_when_sidecar_and_key_present() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = offline_context(dir.path(), today());
        ctx.api_key = Some("key".to_string());
        sidecar::write_once(
            dir.path(),
            "12345",
            &sidecar::ComplexSidecar {
                legal_division_code: "1135010500".to_string(),
                ..Default::default()
            },
        );

        let sources = FakeSources::new(None, vec![txn(620_000_000, date(2026, 1, 9), 7)]);
        let complex = ComplexRecord {
            name: "중계그린".to_string(),
            ..ComplexRecord::placeholder("12345")
        };

        let summary = resolve_price(&ctx, &sources, None, &complex).await;
        assert_eq!(sources.government_calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.transactions[0].price_raw, 620_000_000);
    }

    #[tokio::test]
    async fn exhausted_sources_fall_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = offline_context(dir.path(), today());
        ctx.api_key = Some("key".to_string());
        sidecar::write_once(
            dir.path(),
            "12345",
            &sidecar::ComplexSidecar {
                legal_division_code: "1135010500".to_string(),
                ..Default::default()
            },
        );

        let sources = FakeSources::new(None, Vec::new());
        let complex = ComplexRecord::placeholder("12345");
        let summary = resolve_price(&ctx, &sources, None, &complex).await;
        assert_eq!(sources.government_calls.load(Ordering::SeqCst), 1);
        assert!(!summary.transactions.is_empty());
    }

    #[test]
    fn window_months_runs_backwards() {
        let months = window_months(today());
        assert_eq!(months.len(), 6);
        assert_eq!(months[0].deal_ymd(), "202601");
        assert_eq!(months[5].deal_ymd(), "202508");
    }
}
