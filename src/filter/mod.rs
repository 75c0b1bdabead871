//! Filter and overlay module
//!
//! Layer 3 of the decision cascade. Independent checks that scale or veto exposure:
//! - Dollar trend and dollar-momentum filter (depends on the confirmed tilt)
//! - Safe-haven override for the hedge instrument
//! - Secondary-economy leading-indicator adjustment
//! - Currency intervention flag
//! - Cross-asset correlation spike

mod currency;
mod overlays;
mod types;

pub use currency::{currency_filter, currency_trend};
pub use overlays::{intervention, safe_haven, secondary_adjustment};
pub use types::{CurrencyFilter, CurrencyTrend, FilterState};

use crate::config::FilterConfig;
use crate::series::{rate_of_change, rolling_average_correlation, rolling_mean, Series};
use crate::signal::Tilt;

/// Aligned inputs for the filter layer
#[derive(Debug, Clone)]
pub struct FilterInputs<'a> {
    pub currency_index: &'a [Option<f64>],
    pub volatility: &'a [Option<f64>],
    pub hedge: &'a [Option<f64>],
    pub benchmark: &'a [Option<f64>],
    pub leading_indicator: &'a [Option<f64>],
    pub intervention: &'a [Option<f64>],
    /// Log returns of every instrument in the universe
    pub universe_returns: &'a [Series],
}

/// Precomputed filter series over the whole calendar
#[derive(Debug, Clone)]
pub struct FilterFeatures {
    pub currency_index: Series,
    pub currency_fast: Series,
    pub currency_slow: Series,
    pub currency_momentum: Series,
    pub volatility: Series,
    pub hedge: Series,
    pub benchmark: Series,
    pub leading_indicator: Series,
    pub leading_average: Series,
    pub intervention: Series,
    pub average_correlation: Vec<f64>,
}

impl FilterFeatures {
    pub fn compute(config: &FilterConfig, inputs: &FilterInputs<'_>) -> Self {
        let len = inputs.currency_index.len();
        Self {
            currency_index: inputs.currency_index.to_vec(),
            currency_fast: rolling_mean(inputs.currency_index, config.currency_fast),
            currency_slow: rolling_mean(inputs.currency_index, config.currency_slow),
            currency_momentum: rate_of_change(inputs.currency_index, config.currency_momentum_window),
            volatility: inputs.volatility.to_vec(),
            hedge: inputs.hedge.to_vec(),
            benchmark: inputs.benchmark.to_vec(),
            leading_indicator: inputs.leading_indicator.to_vec(),
            leading_average: rolling_mean(inputs.leading_indicator, config.secondary_window),
            intervention: inputs.intervention.to_vec(),
            average_correlation: rolling_average_correlation(
                inputs.universe_returns,
                len,
                config.correlation_window,
            ),
        }
    }
}

/// Layer 3 evaluator
pub struct FilterLayer {
    config: FilterConfig,
    features: FilterFeatures,
}

impl FilterLayer {
    pub fn new(config: FilterConfig, features: FilterFeatures) -> Self {
        Self { config, features }
    }

    /// Evaluate day `i` against the confirmed tilt
    pub fn evaluate(&self, i: usize, tilt: Tilt) -> FilterState {
        let f = &self.features;
        let get = |s: &Series| s.get(i).copied().flatten();

        let currency_momentum = get(&f.currency_momentum);
        let average_correlation = f.average_correlation.get(i).copied().unwrap_or(0.0);

        FilterState {
            currency_momentum,
            currency_trend: currency_trend(
                get(&f.currency_index),
                get(&f.currency_fast),
                get(&f.currency_slow),
            ),
            currency_filter: currency_filter(
                currency_momentum,
                self.config.currency_momentum_threshold,
                tilt,
            ),
            safe_haven: safe_haven(&self.config, &f.volatility, &f.hedge, &f.benchmark, i),
            secondary_adjustment: secondary_adjustment(
                &self.config,
                get(&f.leading_indicator),
                get(&f.leading_average),
            ),
            intervention: intervention(&self.config, &f.intervention, i),
            correlation_spike: average_correlation > self.config.correlation_threshold,
            average_correlation,
        }
    }
}
