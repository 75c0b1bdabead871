//! Raw and aligned series types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricedBar {
    /// Create a bar from its five fields
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar with every price equal to `close` and zero volume
    pub fn flat(close: f64) -> Self {
        Self::new(close, close, close, close, 0.0)
    }
}

/// Per-symbol bars keyed by trading date
pub type BarSeries = BTreeMap<NaiveDate, PricedBar>;

/// Sparse macro indicator keyed by observation date
pub type ScalarSeries = BTreeMap<NaiveDate, f64>;

/// A value per calendar index; `None` marks an undefined value
pub type Series = Vec<Option<f64>>;

/// The ordered spine every per-day vector is indexed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingCalendar {
    dates: Vec<NaiveDate>,
}

impl TradingCalendar {
    /// Build the calendar from the two primary instruments and the rest of the universe.
    ///
    /// The date range is the overlap of the two primaries; inside it, every date on which
    /// any symbol traded is kept. Returns `None` when either primary has no bars or the
    /// ranges do not overlap.
    pub fn build<'a>(
        primary_a: &BarSeries,
        primary_b: &BarSeries,
        universe: impl IntoIterator<Item = &'a BarSeries>,
    ) -> Option<Self> {
        let start = (*primary_a.keys().next()?).max(*primary_b.keys().next()?);
        let end = (*primary_a.keys().next_back()?).min(*primary_b.keys().next_back()?);
        if start > end {
            return None;
        }

        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        dates.extend(primary_a.range(start..=end).map(|(d, _)| *d));
        dates.extend(primary_b.range(start..=end).map(|(d, _)| *d));
        for series in universe {
            dates.extend(series.range(start..=end).map(|(d, _)| *d));
        }

        Some(Self {
            dates: dates.into_iter().collect(),
        })
    }

    /// Calendar over an explicit, already sorted date list
    pub fn from_dates(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date at calendar index `i`
    pub fn date(&self, i: usize) -> NaiveDate {
        self.dates[i]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// First and last date, if any
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bars(days: &[u32]) -> BarSeries {
        days.iter().map(|&day| (d(day), PricedBar::flat(1.0))).collect()
    }

    #[test]
    fn test_calendar_uses_primary_overlap() {
        let a = bars(&[2, 3, 4, 5, 8]);
        let b = bars(&[3, 4, 5, 8, 9]);
        let other = bars(&[1, 6, 10]);

        let cal = TradingCalendar::build(&a, &b, [&other]).unwrap();
        assert_eq!(cal.dates(), &[d(3), d(4), d(5), d(6), d(8)]);
        assert_eq!(cal.span(), Some((d(3), d(8))));
    }

    #[test]
    fn test_calendar_strictly_increasing() {
        let a = bars(&[2, 3, 4]);
        let b = bars(&[2, 3, 4]);
        let cal = TradingCalendar::build(&a, &b, [&a, &b]).unwrap();
        assert!(cal.dates().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(cal.len(), 3);
    }

    #[test]
    fn test_calendar_empty_primary() {
        let a = bars(&[2, 3]);
        let b = BarSeries::new();
        assert!(TradingCalendar::build(&a, &b, []).is_none());
    }

    #[test]
    fn test_calendar_disjoint_primaries() {
        let a = bars(&[2, 3]);
        let b = bars(&[8, 9]);
        assert!(TradingCalendar::build(&a, &b, []).is_none());
    }

    #[test]
    fn test_from_dates_dedups() {
        let cal = TradingCalendar::from_dates(vec![d(5), d(3), d(5)]);
        assert_eq!(cal.dates(), &[d(3), d(5)]);
    }
}
