//! Synthetic market data shared by the integration tests

use chrono::NaiveDate;
use cugold_regime::data::MemoryProvider;
use cugold_regime::series::{BarSeries, PricedBar};

pub fn day(k: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + chrono::Duration::days(k as i64)
}

fn bar(close: f64) -> PricedBar {
    PricedBar::new(close, close * 1.01, close * 0.99, close, 1000.0)
}

/// Linear path, then a second slope from `turn` onwards
pub fn path(days: usize, start: f64, step: f64, turn: usize, after: f64) -> BarSeries {
    let mut close = start;
    (0..days)
        .map(|k| {
            if k > 0 {
                close += if k >= turn { after } else { step };
            }
            (day(k), bar(close))
        })
        .collect()
}

pub fn trending(days: usize, start: f64, step: f64) -> BarSeries {
    path(days, start, step, usize::MAX, 0.0)
}

/// Copper up and gold down so the ratio keeps rising; equities rally until `crash`, then fall
pub fn market(days: usize, crash: usize) -> MemoryProvider {
    let mut provider = MemoryProvider::new()
        .with_bars("HG", trending(days, 3.5, 0.01))
        .with_bars("GC", trending(days, 1900.0, -0.5))
        .with_bars("MES", path(days, 4500.0, 2.0, crash, -200.0))
        .with_bars("MNQ", path(days, 15000.0, 5.0, crash, -500.0));
    for (symbol, start) in [("CL", 75.0), ("SI", 24.0), ("ZN", 110.0), ("UB", 120.0), ("6J", 0.0070)] {
        provider = provider.with_bars(symbol, trending(days, start, 0.0));
    }
    provider
}
