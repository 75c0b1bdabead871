//! Filter types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dollar index trend against its fast and slow moving averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyTrend {
    Strong,
    Weak,
    #[default]
    Neutral,
}

/// Whether dollar momentum agrees with the confirmed tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyFilter {
    /// Dollar move supports the tilt
    Confirmed,
    /// Dollar move contradicts the tilt; size is cut
    Suspect,
    #[default]
    Neutral,
}

impl fmt::Display for CurrencyTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurrencyTrend::Strong => "STRONG",
            CurrencyTrend::Weak => "WEAK",
            CurrencyTrend::Neutral => "NEUTRAL",
        })
    }
}

impl fmt::Display for CurrencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurrencyFilter::Confirmed => "CONFIRMED",
            CurrencyFilter::Suspect => "SUSPECT",
            CurrencyFilter::Neutral => "NEUTRAL",
        })
    }
}

/// Layer 3 output for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub currency_momentum: Option<f64>,
    pub currency_trend: CurrencyTrend,
    pub currency_filter: CurrencyFilter,
    /// Short exposure in the hedge instrument is suppressed today
    pub safe_haven: bool,
    /// Multiplier from the secondary-economy leading indicator (1.0 when inactive)
    pub secondary_adjustment: f64,
    /// Intervention-sized move in the watched currency future
    pub intervention: bool,
    pub correlation_spike: bool,
    pub average_correlation: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            currency_momentum: None,
            currency_trend: CurrencyTrend::Neutral,
            currency_filter: CurrencyFilter::Neutral,
            safe_haven: false,
            secondary_adjustment: 1.0,
            intervention: false,
            correlation_spike: false,
            average_correlation: 0.0,
        }
    }
}
