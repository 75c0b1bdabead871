//! Time series preprocessing
//!
//! Aligns raw bars and sparse macro series onto one trading calendar and provides the
//! causal rolling statistics the signal layers are built from:
//! - Forward-fill alignment
//! - Rolling mean, standard deviation, z-score, percentile rank and quantile
//! - True range and ATR
//! - Log returns and average pairwise correlation

mod align;
mod atr;
mod correlation;
mod rolling;
mod types;

pub use align::{close_at, forward_fill, forward_fill_close, value_at};
pub use atr::{atr, stop_atr, true_range};
pub use correlation::{average_pairwise_correlation, rolling_average_correlation};
pub use rolling::{
    change, log_returns, rate_of_change, rolling_mean, rolling_percentile_rank, rolling_quantile,
    rolling_std, rolling_zscore, sparse_trailing_mean,
};
pub use types::{BarSeries, PricedBar, ScalarSeries, Series, TradingCalendar};

/// Log day-over-day close moves larger than `threshold` (as a fraction).
///
/// Returns the number of suspicious moves found. These are data-quality hints only.
pub fn warn_extreme_moves(
    symbol: &str,
    closes: &[Option<f64>],
    calendar: &TradingCalendar,
    threshold: f64,
) -> usize {
    let mut found = 0;
    for i in 1..closes.len().min(calendar.len()) {
        if let (Some(prev), Some(now)) = (closes[i - 1], closes[i]) {
            if prev > 0.0 {
                let pct = (now - prev) / prev;
                if pct.abs() > threshold {
                    found += 1;
                    tracing::warn!(
                        symbol = symbol,
                        date = %calendar.date(i),
                        prev = prev,
                        close = now,
                        pct = pct * 100.0,
                        "Extreme price move"
                    );
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_warn_extreme_moves_counts() {
        let cal = TradingCalendar::from_dates(
            (1..=4)
                .map(|d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap())
                .collect(),
        );
        let closes = vec![Some(100.0), Some(160.0), None, Some(50.0)];
        assert_eq!(warn_extreme_moves("HG", &closes, &cal, 0.5), 1);
    }
}
