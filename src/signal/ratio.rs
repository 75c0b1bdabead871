//! Copper/gold ratio signal layer

use super::types::{RatioSignal, Tilt};
use crate::config::SignalConfig;
use crate::series::{rate_of_change, rolling_mean, rolling_zscore, Series};

/// Precomputed ratio series over the whole calendar
#[derive(Debug, Clone)]
pub struct RatioFeatures {
    pub ratio: Series,
    pub roc_short: Series,
    pub roc_medium: Series,
    pub roc_long: Series,
    pub ma_fast: Series,
    pub ma_slow: Series,
    pub zscore: Series,
}

impl RatioFeatures {
    /// Build the ratio and its rolling statistics from aligned closes
    pub fn compute(config: &SignalConfig, numerator: &[Option<f64>], denominator: &[Option<f64>]) -> Self {
        let ratio: Series = numerator
            .iter()
            .zip(denominator.iter())
            .map(|(a, b)| {
                let top = (*a)? * config.numerator_multiplier;
                let bottom = (*b)? * config.denominator_multiplier;
                (bottom > 0.0).then(|| top / bottom)
            })
            .collect();

        let [short, medium, long] = config.roc_windows;

        Self {
            roc_short: rate_of_change(&ratio, short),
            roc_medium: rate_of_change(&ratio, medium),
            roc_long: rate_of_change(&ratio, long),
            ma_fast: rolling_mean(&ratio, config.ma_fast),
            ma_slow: rolling_mean(&ratio, config.ma_slow),
            zscore: rolling_zscore(&ratio, config.zscore_window),
            ratio,
        }
    }

    pub fn len(&self) -> usize {
        self.ratio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratio.is_empty()
    }
}

/// Layer 1: turns ratio features into a raw tilt
pub struct RatioSignalLayer {
    config: SignalConfig,
    features: RatioFeatures,
}

impl RatioSignalLayer {
    pub fn new(config: SignalConfig, features: RatioFeatures) -> Self {
        Self { config, features }
    }

    pub fn features(&self) -> &RatioFeatures {
        &self.features
    }

    /// Evaluate day `i`. Returns `None` when the ratio itself is undefined.
    pub fn evaluate(&self, i: usize) -> Option<RatioSignal> {
        let f = &self.features;
        let ratio = (*f.ratio.get(i)?)?;

        let ma_signal = match (f.ma_fast[i], f.ma_slow[i]) {
            (Some(fast), Some(slow)) if fast > slow => 1,
            (Some(_), Some(_)) => -1,
            _ => 0,
        };

        let zscore = f.zscore[i];
        let z_signal = match zscore {
            Some(z) if z > self.config.zscore_threshold => 1,
            Some(z) if z < -self.config.zscore_threshold => -1,
            _ => 0,
        };

        let composite = match (f.roc_medium[i], zscore) {
            (Some(roc), Some(_)) => {
                let roc_sign = if roc > 0.0 { 1.0 } else { -1.0 };
                Some(
                    self.config.roc_weight * roc_sign
                        + self.config.ma_weight * f64::from(ma_signal)
                        + self.config.zscore_weight * f64::from(z_signal),
                )
            }
            _ => None,
        };

        let threshold = self.config.composite_threshold;
        let raw_tilt = match composite {
            Some(c) if c > threshold => Tilt::RiskOn,
            Some(c) if c < -threshold => Tilt::RiskOff,
            _ => Tilt::Neutral,
        };

        Some(RatioSignal {
            ratio,
            roc_short: f.roc_short[i],
            roc_medium: f.roc_medium[i],
            roc_long: f.roc_long[i],
            ma_signal,
            zscore,
            z_signal,
            composite,
            raw_tilt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features_from_ratio(ratio: Series, config: &SignalConfig) -> RatioFeatures {
        // denominator 1/100 so that ratio == numerator * 25000
        let numerator: Series = ratio.iter().map(|r| r.map(|r| r / 25_000.0)).collect();
        let denominator: Series = vec![Some(0.01); ratio.len()];
        RatioFeatures::compute(config, &numerator, &denominator)
    }

    fn rising(n: usize) -> Series {
        (0..n).map(|i| Some(1.0 + i as f64 * 0.01)).collect()
    }

    #[test]
    fn test_ratio_uses_contract_multipliers() {
        let config = SignalConfig::default();
        let f = RatioFeatures::compute(&config, &[Some(4.0), None], &[Some(2000.0), Some(2000.0)]);
        assert_eq!(f.ratio[0], Some(4.0 * 25_000.0 / (2000.0 * 100.0)));
        assert_eq!(f.ratio[1], None);
    }

    #[test]
    fn test_zero_denominator_is_undefined() {
        let config = SignalConfig::default();
        let f = RatioFeatures::compute(&config, &[Some(4.0)], &[Some(0.0)]);
        assert_eq!(f.ratio[0], None);
    }

    #[test]
    fn test_undefined_ratio_gives_no_signal() {
        let config = SignalConfig::default();
        let layer = RatioSignalLayer::new(config.clone(), features_from_ratio(vec![None, Some(1.0)], &config));
        assert!(layer.evaluate(0).is_none());
        assert!(layer.evaluate(1).is_some());
        assert!(layer.evaluate(5).is_none());
    }

    #[test]
    fn test_warmup_is_neutral() {
        let config = SignalConfig::default();
        let layer = RatioSignalLayer::new(config.clone(), features_from_ratio(rising(30), &config));
        let signal = layer.evaluate(29).unwrap();
        assert!(signal.roc_medium.is_some());
        assert!(signal.zscore.is_none());
        assert_eq!(signal.composite, None);
        assert_eq!(signal.raw_tilt, Tilt::Neutral);
    }

    #[test]
    fn test_rising_ratio_is_risk_on() {
        let config = SignalConfig::default();
        let layer = RatioSignalLayer::new(config.clone(), features_from_ratio(rising(150), &config));
        let signal = layer.evaluate(149).unwrap();
        assert_eq!(signal.ma_signal, 1);
        assert_eq!(signal.z_signal, 1);
        assert!((signal.composite.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(signal.raw_tilt, Tilt::RiskOn);
    }

    #[test]
    fn test_falling_ratio_is_risk_off() {
        let config = SignalConfig::default();
        let falling: Series = (0..150).map(|i| Some(3.0 - i as f64 * 0.01)).collect();
        let layer = RatioSignalLayer::new(config.clone(), features_from_ratio(falling, &config));
        let signal = layer.evaluate(149).unwrap();
        assert_eq!(signal.ma_signal, -1);
        assert_eq!(signal.z_signal, -1);
        assert_eq!(signal.raw_tilt, Tilt::RiskOff);
    }

    #[test]
    fn test_flat_roc_counts_as_negative() {
        let config = SignalConfig::default();
        // Constant ratio: ROC 0 -> -1 leg, MA equal -> -1, z undefined (std 0) -> no composite
        let flat: Series = vec![Some(1.0); 150];
        let layer = RatioSignalLayer::new(config.clone(), features_from_ratio(flat, &config));
        let signal = layer.evaluate(149).unwrap();
        assert_eq!(signal.ma_signal, -1);
        assert_eq!(signal.composite, None);
    }
}
