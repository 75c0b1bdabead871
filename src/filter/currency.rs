//! Dollar trend and momentum filter

use super::types::{CurrencyFilter, CurrencyTrend};
use crate::signal::Tilt;

/// Classify spot against the fast and slow moving averages
pub fn currency_trend(spot: Option<f64>, fast: Option<f64>, slow: Option<f64>) -> CurrencyTrend {
    match (spot, fast, slow) {
        (Some(s), Some(f), Some(l)) if s > f && f > l => CurrencyTrend::Strong,
        (Some(s), Some(f), Some(l)) if s < f && f < l => CurrencyTrend::Weak,
        _ => CurrencyTrend::Neutral,
    }
}

/// Cross dollar momentum with the confirmed tilt.
///
/// A strong dollar confirms risk-off and casts doubt on risk-on; a weak dollar does the
/// opposite. Momentum inside the threshold band, or undefined, is neutral.
pub fn currency_filter(momentum: Option<f64>, threshold: f64, tilt: Tilt) -> CurrencyFilter {
    let Some(m) = momentum else {
        return CurrencyFilter::Neutral;
    };

    if m > threshold {
        match tilt {
            Tilt::RiskOn => CurrencyFilter::Suspect,
            Tilt::RiskOff => CurrencyFilter::Confirmed,
            Tilt::Neutral => CurrencyFilter::Neutral,
        }
    } else if m < -threshold {
        match tilt {
            Tilt::RiskOn => CurrencyFilter::Confirmed,
            Tilt::RiskOff => CurrencyFilter::Suspect,
            Tilt::Neutral => CurrencyFilter::Neutral,
        }
    } else {
        CurrencyFilter::Neutral
    }
}
