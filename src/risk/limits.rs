//! Drawdown controls

use crate::config::RiskConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Drawdown thresholds, both compared strictly
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DrawdownLimits {
    /// Drawdown from peak that halves exposure
    pub warn: Decimal,
    /// Drawdown from peak that zeroes exposure
    pub stop: Decimal,
}

impl DrawdownLimits {
    pub fn from_config(config: &RiskConfig) -> Self {
        Self {
            warn: config.drawdown_warn,
            stop: config.drawdown_stop,
        }
    }
}

impl Default for DrawdownLimits {
    fn default() -> Self {
        Self {
            warn: dec!(0.10),
            stop: dec!(0.15),
        }
    }
}

/// Outcome of a drawdown check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawdownStatus {
    /// Within limits
    Normal,
    /// Beyond the warning threshold
    Warning(Decimal),
    /// Beyond the stop threshold
    Stop(Decimal),
}

impl DrawdownStatus {
    pub fn is_warning(&self) -> bool {
        matches!(self, DrawdownStatus::Warning(_))
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, DrawdownStatus::Stop(_))
    }
}

/// Monitors drawdown from the running equity peak
#[derive(Debug, Clone)]
pub struct DrawdownMonitor {
    /// Peak equity value
    pub peak_equity: Decimal,
    /// Current equity value
    pub current_equity: Decimal,
}

impl DrawdownMonitor {
    /// Create a new drawdown monitor
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            peak_equity: initial_equity,
            current_equity: initial_equity,
        }
    }

    /// Update with new equity value
    pub fn update(&mut self, new_equity: Decimal) {
        self.current_equity = new_equity;
        if new_equity > self.peak_equity {
            self.peak_equity = new_equity;
        }
    }

    /// Get current drawdown from peak
    pub fn current_drawdown(&self) -> Decimal {
        if self.peak_equity <= dec!(0) {
            return dec!(0);
        }
        (self.peak_equity - self.current_equity) / self.peak_equity
    }

    /// Classify the current drawdown
    pub fn check(&self, limits: &DrawdownLimits) -> DrawdownStatus {
        let drawdown = self.current_drawdown();
        if drawdown > limits.stop {
            DrawdownStatus::Stop(drawdown)
        } else if drawdown > limits.warn {
            DrawdownStatus::Warning(drawdown)
        } else {
            DrawdownStatus::Normal
        }
    }

    /// Restart peak tracking from the current equity
    pub fn reset_peak(&mut self) {
        self.peak_equity = self.current_equity;
    }
}
