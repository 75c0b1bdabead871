//! Per-day output record

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::filter::FilterState;
use crate::portfolio::PositionMap;
use crate::regime::{Regime, RegimeReading};
use crate::schedule::Trigger;
use crate::signal::{RatioSignal, Tilt};

/// Everything decided and observed on one trading day.
///
/// Records are immutable once emitted; a run's output is the ordered sequence of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignal {
    pub date: NaiveDate,
    /// Layer 1 output, including the raw tilt
    pub ratio: RatioSignal,
    /// Tilt after the minimum-hold debounce
    pub tilt: Tilt,
    /// Layer 2 output for the day
    pub macro_reading: RegimeReading,
    /// Regime currently applied after confirmation
    pub applied_regime: Regime,
    pub filters: FilterState,
    pub size_multiplier: f64,
    pub drawdown: Decimal,
    pub drawdown_warning: bool,
    pub drawdown_stop: bool,
    pub rebalanced: bool,
    pub triggers: Vec<Trigger>,
    /// Symbols closed by the ATR stop today
    pub stopped_out: Vec<String>,
    /// Book at the end of the day
    pub positions: PositionMap,
    pub equity: Decimal,
    pub margin_utilization: f64,
    /// Confirmed tilt flips over the trailing year
    pub trailing_flips: usize,
    /// Costs charged today, stop-outs included
    pub transaction_cost: Decimal,
    /// Growth benchmark level, used for correlation reporting
    pub benchmark: Option<f64>,
}

impl DailySignal {
    /// Daily regime (before confirmation)
    pub fn regime(&self) -> Regime {
        self.macro_reading.regime
    }

    pub fn raw_tilt(&self) -> Tilt {
        self.ratio.raw_tilt
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_invested(&self) -> bool {
        self.positions.values().any(|q| *q != 0)
    }
}
