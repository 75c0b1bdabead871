//! True range and average true range

use super::rolling::{rolling_mean, sparse_trailing_mean};
use super::types::{BarSeries, Series, TradingCalendar};

/// True range of each calendar day.
///
/// Defined at `i >= 1` when the symbol has a bar exactly on `dates[i]` and any earlier bar
/// in its own history to supply the previous close.
pub fn true_range(bars: &BarSeries, calendar: &TradingCalendar) -> Series {
    calendar
        .dates()
        .iter()
        .enumerate()
        .map(|(i, date)| {
            if i == 0 {
                return None;
            }
            let bar = bars.get(date)?;
            let (_, prev) = bars.range(..*date).next_back()?;
            let prev_close = prev.close;
            Some(
                (bar.high - bar.low)
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs()),
            )
        })
        .collect()
}

/// Average true range: strict rolling mean of [`true_range`]
pub fn atr(bars: &BarSeries, calendar: &TradingCalendar, window: usize) -> Series {
    rolling_mean(&true_range(bars, calendar), window)
}

/// ATR used by the stop-loss rule.
///
/// Averages only the defined true ranges in the window, so gaps in a symbol's own
/// trading days do not blank out its stop.
pub fn stop_atr(bars: &BarSeries, calendar: &TradingCalendar, window: usize) -> Series {
    let tr = true_range(bars, calendar);
    (0..tr.len())
        .map(|i| sparse_trailing_mean(&tr, i, window))
        .collect()
}
