//! Regime types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro regime tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    GrowthPositive,
    GrowthNegative,
    InflationShock,
    LiquidityShock,
    #[default]
    Neutral,
}

impl Regime {
    /// Regimes in which the size multiplier starts from the cautious base
    pub fn is_cautious(self) -> bool {
        matches!(self, Regime::Neutral | Regime::InflationShock)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Regime::GrowthPositive => "GROWTH_POSITIVE",
            Regime::GrowthNegative => "GROWTH_NEGATIVE",
            Regime::InflationShock => "INFLATION_SHOCK",
            Regime::LiquidityShock => "LIQUIDITY_SHOCK",
            Regime::Neutral => "NEUTRAL",
        };
        f.write_str(tag)
    }
}

/// Composite liquidity score and its three components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityScore {
    /// Inverted volatility-index percentile, roughly in [-3, 3]
    pub volatility: f64,
    /// Negated credit-spread z-score
    pub credit: f64,
    /// Scaled balance-sheet growth
    pub balance_sheet: f64,
    /// Mean of the three components
    pub score: f64,
}

/// Layer 2 output for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeReading {
    pub growth: f64,
    pub inflation: f64,
    pub liquidity: LiquidityScore,
    pub real_rate: f64,
    pub real_rate_change: f64,
    pub real_rate_zscore: f64,
    pub regime: Regime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_tags() {
        assert_eq!(Regime::LiquidityShock.to_string(), "LIQUIDITY_SHOCK");
        assert_eq!(
            serde_json::to_string(&Regime::GrowthNegative).unwrap(),
            "\"GROWTH_NEGATIVE\""
        );
    }

    #[test]
    fn test_cautious_regimes() {
        assert!(Regime::Neutral.is_cautious());
        assert!(Regime::InflationShock.is_cautious());
        assert!(!Regime::GrowthPositive.is_cautious());
        assert!(!Regime::LiquidityShock.is_cautious());
    }
}
