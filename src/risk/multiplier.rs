//! Size multiplier from regime, tilt and filter state

use crate::config::RiskConfig;
use crate::filter::{CurrencyFilter, FilterState};
use crate::regime::Regime;
use crate::signal::Tilt;

use super::limits::DrawdownStatus;

/// Combines the regime base with the filter penalties into one scalar
#[derive(Debug, Clone)]
pub struct SizeMultiplier {
    config: RiskConfig,
    liquidity_threshold: f64,
}

impl SizeMultiplier {
    pub fn new(config: RiskConfig, liquidity_threshold: f64) -> Self {
        Self {
            config,
            liquidity_threshold,
        }
    }

    /// Starting multiplier for the regime and confirmed tilt
    pub fn base(&self, regime: Regime, tilt: Tilt) -> f64 {
        match (regime, tilt) {
            (Regime::LiquidityShock, _) => 0.0,
            (Regime::GrowthNegative, Tilt::RiskOn) => self.config.cautious_base,
            (r, _) if r.is_cautious() => self.config.cautious_base,
            _ => 1.0,
        }
    }

    /// Multiplier before the drawdown overlay
    pub fn compute(&self, regime: Regime, tilt: Tilt, liquidity: f64, filters: &FilterState) -> f64 {
        let mut multiplier = self.base(regime, tilt);
        if filters.currency_filter == CurrencyFilter::Suspect {
            multiplier *= self.config.suspect_penalty;
        }
        if liquidity < self.liquidity_threshold {
            multiplier *= self.config.liquidity_penalty;
        }
        if filters.correlation_spike {
            multiplier *= self.config.correlation_penalty;
        }
        multiplier * filters.secondary_adjustment
    }

    /// Apply the drawdown overlay last
    pub fn apply_drawdown(&self, multiplier: f64, status: DrawdownStatus) -> f64 {
        match status {
            DrawdownStatus::Stop(_) => 0.0,
            DrawdownStatus::Warning(_) => multiplier * self.config.drawdown_warn_scale,
            DrawdownStatus::Normal => multiplier,
        }
    }
}
