//! Forward-fill alignment onto the trading calendar

use super::types::{BarSeries, ScalarSeries, Series, TradingCalendar};
use chrono::NaiveDate;

/// Most recent value at or before `date`
pub fn value_at(series: &ScalarSeries, date: NaiveDate) -> Option<f64> {
    series.range(..=date).next_back().map(|(_, v)| *v)
}

/// Most recent close at or before `date`
pub fn close_at(bars: &BarSeries, date: NaiveDate) -> Option<f64> {
    bars.range(..=date).next_back().map(|(_, bar)| bar.close)
}

/// Forward-fill a sparse scalar series onto the calendar
pub fn forward_fill(series: &ScalarSeries, calendar: &TradingCalendar) -> Series {
    calendar
        .dates()
        .iter()
        .map(|d| value_at(series, *d))
        .collect()
}

/// Forward-fill closing prices onto the calendar
pub fn forward_fill_close(bars: &BarSeries, calendar: &TradingCalendar) -> Series {
    calendar
        .dates()
        .iter()
        .map(|d| close_at(bars, *d))
        .collect()
}
