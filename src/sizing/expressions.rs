//! Trade-expression tables: which instruments to hold, and which way, per tilt and regime

use crate::filter::FilterState;
use crate::regime::Regime;
use crate::signal::Tilt;

/// Per-leg modifier applied on top of the direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegScale {
    Plain,
    /// Scaled by the secondary-economy adjustment
    SecondaryEconomy,
    /// Halved on intervention days
    Intervention,
    /// Dropped on safe-haven days (the leg is a short in the hedge instrument)
    HedgeShort,
    /// Scaled to match the hedge instrument's dollar volatility; dropped when undefined
    VolatilityAdjusted,
}

/// One instrument's entry in a trade expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub symbol: &'static str,
    pub direction: f64,
    pub scale: LegScale,
}

const fn leg(symbol: &'static str, direction: f64, scale: LegScale) -> Leg {
    Leg {
        symbol,
        direction,
        scale,
    }
}

use LegScale::*;

const RISK_ON: [Leg; 9] = [
    leg("MES", 1.0, Plain),
    leg("MNQ", 1.0, Plain),
    leg("HG", 1.0, SecondaryEconomy),
    leg("CL", 1.0, Plain),
    leg("GC", -1.0, HedgeShort),
    leg("SI", 1.0, VolatilityAdjusted),
    leg("ZN", -1.0, Plain),
    leg("UB", -1.0, Plain),
    leg("6J", -1.0, Intervention),
];

const RISK_ON_INFLATION: [Leg; 9] = [
    leg("MES", 0.0, Plain),
    leg("MNQ", 0.0, Plain),
    leg("HG", 1.0, SecondaryEconomy),
    leg("CL", 1.0, Plain),
    leg("GC", -1.0, HedgeShort),
    leg("SI", 1.0, VolatilityAdjusted),
    leg("ZN", -1.0, Plain),
    leg("UB", -1.0, Plain),
    leg("6J", -1.0, Intervention),
];

const RISK_OFF: [Leg; 9] = [
    leg("MES", -1.0, Plain),
    leg("MNQ", -1.0, Plain),
    leg("HG", -1.0, Plain),
    leg("CL", -1.0, Plain),
    leg("GC", 1.0, Plain),
    leg("SI", 1.0, VolatilityAdjusted),
    leg("ZN", 1.0, Plain),
    leg("UB", 1.0, Plain),
    leg("6J", 1.0, Intervention),
];

const RISK_OFF_INFLATION: [Leg; 9] = [
    leg("MES", -0.5, Plain),
    leg("MNQ", -0.5, Plain),
    leg("HG", 0.0, Plain),
    leg("CL", 0.0, Plain),
    leg("GC", 1.0, Plain),
    leg("SI", 1.0, VolatilityAdjusted),
    leg("ZN", -1.0, Plain),
    leg("UB", -1.0, Plain),
    leg("6J", 0.0, Plain),
];

/// Legs for the confirmed tilt and daily regime; empty means a flat book
pub fn trade_expression(tilt: Tilt, regime: Regime) -> &'static [Leg] {
    match (tilt, regime == Regime::InflationShock) {
        (Tilt::RiskOn, false) => &RISK_ON,
        (Tilt::RiskOn, true) => &RISK_ON_INFLATION,
        (Tilt::RiskOff, false) => &RISK_OFF,
        (Tilt::RiskOff, true) => &RISK_OFF_INFLATION,
        (Tilt::Neutral, _) => &[],
    }
}

impl LegScale {
    /// Resolve the modifier for today; `None` drops the leg
    pub fn factor(self, filters: &FilterState, volatility_adjustment: Option<f64>) -> Option<f64> {
        match self {
            Plain => Some(1.0),
            SecondaryEconomy => Some(filters.secondary_adjustment),
            Intervention => Some(if filters.intervention { 0.5 } else { 1.0 }),
            HedgeShort => (!filters.safe_haven).then_some(1.0),
            VolatilityAdjusted => volatility_adjustment,
        }
    }
}
