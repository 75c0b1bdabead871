//! Signal types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro risk tilt derived from the copper/gold ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tilt {
    /// Copper outperforming gold: pro-cyclical positioning
    RiskOn,
    /// Gold outperforming copper: defensive positioning
    RiskOff,
    /// No conviction, flat book
    #[default]
    Neutral,
}

impl fmt::Display for Tilt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Tilt::RiskOn => "RISK_ON",
            Tilt::RiskOff => "RISK_OFF",
            Tilt::Neutral => "NEUTRAL",
        };
        f.write_str(tag)
    }
}

/// Layer 1 output for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSignal {
    /// Notional copper/gold ratio
    pub ratio: f64,
    /// Rate of change at the short, medium and long horizons
    pub roc_short: Option<f64>,
    pub roc_medium: Option<f64>,
    pub roc_long: Option<f64>,
    /// +1 fast MA above slow, -1 otherwise, 0 while either is warming up
    pub ma_signal: i8,
    pub zscore: Option<f64>,
    pub z_signal: i8,
    pub composite: Option<f64>,
    /// Tilt before debouncing
    pub raw_tilt: Tilt,
}
