//! One-shot precomputation of every series the daily step reads

use std::collections::BTreeMap;

use super::error::EngineError;
use crate::config::Config;
use crate::data::{indicators, DataProvider};
use crate::filter::{FilterFeatures, FilterInputs};
use crate::portfolio::{ContractBook, PriceTable, UNIVERSE};
use crate::regime::{MacroInputs, RegimeFeatures};
use crate::series::{
    atr, forward_fill, forward_fill_close, log_returns, stop_atr, warn_extreme_moves, BarSeries,
    ScalarSeries, Series, TradingCalendar,
};
use crate::signal::RatioFeatures;

/// Aligned prices, indicators and layer features over the whole calendar.
///
/// Every vector has one entry per calendar day, and entry `i` only depends on data dated
/// on or before `calendar.date(i)`.
#[derive(Debug, Clone)]
pub struct Features {
    pub calendar: TradingCalendar,
    /// Forward-filled closes per symbol
    pub closes: PriceTable,
    /// Stop-loss ATR per symbol
    pub stop_atr: BTreeMap<String, Series>,
    /// Dollar-volatility ratio of the hedge instrument to the volatility-matched one
    pub volatility_adjustment: Series,
    /// Growth benchmark level
    pub benchmark: Series,
    pub ratio: RatioFeatures,
    pub regime: RegimeFeatures,
    pub filter: FilterFeatures,
}

fn require<'a>(provider: &'a dyn DataProvider, symbol: &str) -> Result<&'a BarSeries, EngineError> {
    provider
        .bars(symbol)
        .filter(|bars| !bars.is_empty())
        .ok_or_else(|| EngineError::MissingInstrument(symbol.to_string()))
}

impl Features {
    pub fn compute(config: &Config, provider: &dyn DataProvider, book: &ContractBook) -> Result<Self, EngineError> {
        let signal = &config.strategy.signal;
        let numerator = require(provider, &signal.numerator)?;
        let denominator = require(provider, &signal.denominator)?;

        let mut symbols: Vec<&str> = UNIVERSE.to_vec();
        for primary in [signal.numerator.as_str(), signal.denominator.as_str()] {
            if !symbols.contains(&primary) {
                symbols.push(primary);
            }
        }

        let empty_bars = BarSeries::new();
        let bars_of = |symbol: &str| provider.bars(symbol).unwrap_or(&empty_bars);

        let calendar = TradingCalendar::build(numerator, denominator, symbols.iter().map(|s| bars_of(*s)))
            .ok_or_else(|| EngineError::EmptyCalendar(signal.numerator.clone(), signal.denominator.clone()))?;

        let closes: PriceTable = symbols
            .iter()
            .map(|s| (s.to_string(), forward_fill_close(bars_of(*s), &calendar)))
            .collect();
        let stop_window = config.risk.stop_atr_window;
        let stops = symbols
            .iter()
            .map(|s| (s.to_string(), stop_atr(bars_of(*s), &calendar, stop_window)))
            .collect();

        let empty_series = ScalarSeries::new();
        let indicator = |name: &str| forward_fill(provider.series(name).unwrap_or(&empty_series), &calendar);
        let dxy = indicator(indicators::DXY);
        let vix = indicator(indicators::VIX);
        let high_yield = indicator(indicators::HIGH_YIELD_SPREAD);
        let breakeven = indicator(indicators::BREAKEVEN_10Y);
        let treasury = indicator(indicators::TREASURY_10Y);
        let benchmark = indicator(&config.backtest.benchmark);
        let balance_sheet = indicator(indicators::FED_BALANCE_SHEET);
        let leading = indicator(indicators::CHINA_LEADING_INDICATOR);

        let empty: Series = vec![None; calendar.len()];
        let close = |symbol: &str| closes.get(symbol).unwrap_or(&empty);

        let ratio = RatioFeatures::compute(signal, close(&signal.numerator), close(&signal.denominator));

        let regime = RegimeFeatures::compute(
            &config.strategy.regime,
            &MacroInputs {
                benchmark: &benchmark,
                breakeven: &breakeven,
                treasury: &treasury,
                volatility: &vix,
                credit_spread: &high_yield,
                balance_sheet: &balance_sheet,
            },
        );

        let filter_config = &config.strategy.filter;
        let universe_returns: Vec<Series> = UNIVERSE.iter().map(|s| log_returns(close(*s))).collect();
        let filter = FilterFeatures::compute(
            filter_config,
            &FilterInputs {
                currency_index: &dxy,
                volatility: &vix,
                hedge: close(&filter_config.hedge_symbol),
                benchmark: &benchmark,
                leading_indicator: &leading,
                intervention: close(&filter_config.intervention_symbol),
                universe_returns: &universe_returns,
            },
        );

        let volatility_adjustment = volatility_adjustment(
            config,
            book,
            bars_of(&filter_config.hedge_symbol),
            bars_of(&config.sizing.vol_matched_symbol),
            &calendar,
        );

        let threshold = config.backtest.extreme_move_threshold;
        let mut extreme = 0;
        for symbol in [signal.numerator.as_str(), signal.denominator.as_str(), "CL"] {
            extreme += warn_extreme_moves(symbol, close(symbol), &calendar, threshold);
        }

        tracing::info!(
            days = calendar.len(),
            start = ?calendar.span().map(|(s, _)| s),
            end = ?calendar.span().map(|(_, e)| e),
            extreme_moves = extreme,
            "Features computed"
        );

        Ok(Self {
            closes,
            stop_atr: stops,
            volatility_adjustment,
            benchmark,
            ratio,
            regime,
            filter,
            calendar,
        })
    }

    pub fn len(&self) -> usize {
        self.calendar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }

    /// Close of `symbol` on day `i`
    pub fn close(&self, symbol: &str, i: usize) -> Option<f64> {
        self.closes.get(symbol)?.get(i).copied().flatten()
    }

    pub fn stop_atr(&self, symbol: &str, i: usize) -> Option<f64> {
        self.stop_atr.get(symbol)?.get(i).copied().flatten()
    }
}

/// `(ATR_hedge * pv_hedge) / (ATR_matched * pv_matched)`, `None` until both ATRs exist
fn volatility_adjustment(
    config: &Config,
    book: &ContractBook,
    hedge: &BarSeries,
    matched: &BarSeries,
    calendar: &TradingCalendar,
) -> Series {
    let window = config.sizing.vol_atr_window;
    let hedge_pv = book.spec(&config.strategy.filter.hedge_symbol).point_value_f64();
    let matched_pv = book.spec(&config.sizing.vol_matched_symbol).point_value_f64();

    atr(hedge, calendar, window)
        .into_iter()
        .zip(atr(matched, calendar, window))
        .map(|(h, m)| {
            let denominator = m? * matched_pv;
            (denominator > 0.0).then(|| h.map(|h| h * hedge_pv / denominator)).flatten()
        })
        .collect()
}
