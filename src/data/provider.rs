//! Market and macro data access

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::series::{BarSeries, PricedBar, ScalarSeries};

/// Macro indicator names understood by the engine
pub mod indicators {
    pub const DXY: &str = "dxy";
    pub const VIX: &str = "vix";
    pub const HIGH_YIELD_SPREAD: &str = "high_yield_spread";
    pub const BREAKEVEN_10Y: &str = "breakeven_10y";
    pub const TREASURY_10Y: &str = "treasury_10y";
    pub const SPX: &str = "spx";
    pub const FED_BALANCE_SHEET: &str = "fed_balance_sheet";
    pub const CHINA_LEADING_INDICATOR: &str = "china_leading_indicator";

    /// Every indicator, in load order
    pub const ALL: [&str; 8] = [
        DXY,
        VIX,
        HIGH_YIELD_SPREAD,
        BREAKEVEN_10Y,
        TREASURY_10Y,
        SPX,
        FED_BALANCE_SHEET,
        CHINA_LEADING_INDICATOR,
    ];
}

/// Read-only source of daily bars and macro series
pub trait DataProvider {
    /// Daily bars for a futures symbol
    fn bars(&self, symbol: &str) -> Option<&BarSeries>;

    /// Scalar series for a macro indicator
    fn series(&self, indicator: &str) -> Option<&ScalarSeries>;
}

/// In-memory provider, built up with the `with_*` methods
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    bars: BTreeMap<String, BarSeries>,
    series: BTreeMap<String, ScalarSeries>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: impl Into<String>, bars: BarSeries) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }

    pub fn with_series(mut self, indicator: impl Into<String>, series: ScalarSeries) -> Self {
        self.series.insert(indicator.into(), series);
        self
    }

    /// Add or replace one bar
    pub fn insert_bar(&mut self, symbol: &str, date: NaiveDate, bar: PricedBar) {
        self.bars.entry(symbol.to_string()).or_default().insert(date, bar);
    }

    /// Add or replace one indicator observation
    pub fn insert_value(&mut self, indicator: &str, date: NaiveDate, value: f64) {
        self.series.entry(indicator.to_string()).or_default().insert(date, value);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }
}

impl DataProvider for MemoryProvider {
    fn bars(&self, symbol: &str) -> Option<&BarSeries> {
        self.bars.get(symbol)
    }

    fn series(&self, indicator: &str) -> Option<&ScalarSeries> {
        self.series.get(indicator)
    }
}
