//! Position sizing implementations
//!
//! Notional sizing scales each leg by equity, leverage and asset-class weight and then
//! applies the caps. Fixed sizing holds a constant contract count per leg for testing.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::{SizingConfig, SizingMode};
use crate::filter::FilterState;
use crate::portfolio::{margin_utilization, AssetClass, ContractBook, PositionMap, UNIVERSE};
use crate::regime::Regime;
use crate::signal::Tilt;

use super::caps::{apply_group_cap, apply_margin_cap, apply_single_limits};
use super::expressions::{trade_expression, Leg, LegScale};

const EPSILON: f64 = 1e-9;

/// Everything a sizer needs for one rebalance
#[derive(Debug, Clone)]
pub struct SizingContext<'a> {
    pub equity: Decimal,
    pub multiplier: f64,
    /// Confirmed tilt
    pub tilt: Tilt,
    /// Daily regime
    pub regime: Regime,
    pub filters: &'a FilterState,
    /// Dollar-volatility ratio for the volatility-matched leg
    pub volatility_adjustment: Option<f64>,
    /// Symbols forced flat today (stopped out or unpriced)
    pub blocked: &'a BTreeSet<String>,
    pub book: &'a ContractBook,
}

/// Sized target book
#[derive(Debug, Clone, PartialEq)]
pub struct SizedBook {
    /// Target contracts for every symbol in the universe
    pub targets: PositionMap,
    pub margin_utilization: f64,
}

impl SizedBook {
    fn flat() -> Self {
        Self {
            targets: flat_book(),
            margin_utilization: 0.0,
        }
    }
}

fn flat_book() -> PositionMap {
    UNIVERSE.iter().map(|s| (s.to_string(), 0)).collect()
}

/// Legs that can be held today, with their resolved scale
fn active_legs(ctx: &SizingContext<'_>, resolve: impl Fn(&Leg) -> Option<f64>) -> Vec<(&'static Leg, f64)> {
    trade_expression(ctx.tilt, ctx.regime)
        .iter()
        .filter(|leg| leg.direction.abs() >= EPSILON)
        .filter(|leg| !ctx.blocked.contains(leg.symbol))
        .filter_map(|leg| resolve(leg).map(|scale| (leg, scale)))
        .collect()
}

/// Trait for position sizing implementations
pub trait PositionSizer: Send + Sync {
    /// Target contracts for the given context
    fn targets(&self, ctx: &SizingContext<'_>) -> SizedBook;

    /// Get the sizing mode name
    fn mode_name(&self) -> &'static str;
}

/// Equity-proportional sizing with per-instrument, group and margin caps
#[derive(Debug, Clone)]
pub struct NotionalSizer {
    pub leverage: f64,
    pub max_margin_utilization: f64,
    pub equity_group_cap: f64,
    pub commodity_group_cap: f64,
}

impl NotionalSizer {
    pub fn from_config(config: &SizingConfig) -> Self {
        Self {
            leverage: config.leverage,
            max_margin_utilization: config.max_margin_utilization,
            equity_group_cap: config.equity_group_cap,
            commodity_group_cap: config.commodity_group_cap,
        }
    }

    /// Uncapped contract count for one leg
    fn raw_contracts(&self, ctx: &SizingContext<'_>, equity: f64, leg: &Leg, scale: f64) -> i64 {
        let notional = ctx.book.spec(leg.symbol).notional.to_f64().unwrap_or(0.0);
        if notional <= 0.0 {
            return 0;
        }
        let weight = AssetClass::of(leg.symbol).weight();
        let contracts = equity * self.leverage * weight / notional * ctx.multiplier * scale * leg.direction;
        (contracts + 0.5).floor() as i64
    }
}

impl Default for NotionalSizer {
    fn default() -> Self {
        Self::from_config(&SizingConfig::default())
    }
}

impl PositionSizer for NotionalSizer {
    fn targets(&self, ctx: &SizingContext<'_>) -> SizedBook {
        let equity = ctx.equity.to_f64().unwrap_or(0.0);
        if equity <= 0.0 || ctx.multiplier.abs() < EPSILON {
            return SizedBook::flat();
        }

        let mut targets = flat_book();
        let legs = active_legs(ctx, |leg| leg.scale.factor(ctx.filters, ctx.volatility_adjustment));
        for (leg, scale) in legs {
            targets.insert(leg.symbol.to_string(), self.raw_contracts(ctx, equity, leg, scale));
        }

        apply_single_limits(ctx.book, &mut targets, equity);
        apply_group_cap(ctx.book, &mut targets, AssetClass::EquityIndex, self.equity_group_cap, equity);
        apply_group_cap(ctx.book, &mut targets, AssetClass::Commodities, self.commodity_group_cap, equity);
        let margin_utilization =
            apply_margin_cap(ctx.book, &mut targets, ctx.equity, self.max_margin_utilization);

        SizedBook {
            targets,
            margin_utilization,
        }
    }

    fn mode_name(&self) -> &'static str {
        "notional"
    }
}

/// Constant contract count per leg, caps skipped
#[derive(Debug, Clone)]
pub struct FixedSizer {
    pub contracts: i64,
}

impl FixedSizer {
    pub fn new(contracts: i64) -> Self {
        Self { contracts }
    }
}

impl Default for FixedSizer {
    fn default() -> Self {
        Self { contracts: 1 }
    }
}

impl PositionSizer for FixedSizer {
    fn targets(&self, ctx: &SizingContext<'_>) -> SizedBook {
        if ctx.equity <= Decimal::ZERO || ctx.multiplier.abs() < EPSILON {
            return SizedBook::flat();
        }

        // Volatility matching and the secondary-economy scale only apply to notional sizing
        let resolve = |leg: &Leg| match leg.scale {
            LegScale::VolatilityAdjusted | LegScale::SecondaryEconomy => Some(1.0),
            other => other.factor(ctx.filters, ctx.volatility_adjustment),
        };

        let mut targets = flat_book();
        for (leg, scale) in active_legs(ctx, resolve) {
            let qty = (self.contracts as f64 * ctx.multiplier * leg.direction * scale).round() as i64;
            targets.insert(leg.symbol.to_string(), qty);
        }

        let margin_utilization = margin_utilization(ctx.book, &targets, ctx.equity);
        SizedBook {
            targets,
            margin_utilization,
        }
    }

    fn mode_name(&self) -> &'static str {
        "fixed"
    }
}

/// Create a position sizer based on configuration
pub fn create_sizer(config: &SizingConfig) -> Box<dyn PositionSizer> {
    match config.mode {
        SizingMode::Notional => Box::new(NotionalSizer::from_config(config)),
        SizingMode::Fixed => Box::new(FixedSizer::new(config.fixed_contracts)),
    }
}
