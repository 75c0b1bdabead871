//! Growth / inflation / liquidity regime classifier

use super::types::{LiquidityScore, Regime, RegimeReading};
use crate::config::RegimeConfig;
use crate::series::{change, rate_of_change, rolling_percentile_rank, rolling_zscore, Series};

/// Aligned macro inputs, one value per calendar day
#[derive(Debug, Clone, Default)]
pub struct MacroInputs<'a> {
    pub benchmark: &'a [Option<f64>],
    pub breakeven: &'a [Option<f64>],
    pub treasury: &'a [Option<f64>],
    pub volatility: &'a [Option<f64>],
    pub credit_spread: &'a [Option<f64>],
    pub balance_sheet: &'a [Option<f64>],
}

/// Precomputed regime inputs over the whole calendar
#[derive(Debug, Clone)]
pub struct RegimeFeatures {
    /// Benchmark momentum in percent
    pub growth: Series,
    pub inflation: Series,
    pub volatility_rank: Series,
    pub credit_zscore: Series,
    pub balance_sheet_growth: Series,
    pub real_rate: Series,
    pub real_rate_change: Series,
    pub real_rate_zscore: Series,
}

impl RegimeFeatures {
    pub fn compute(config: &RegimeConfig, inputs: &MacroInputs<'_>) -> Self {
        let real_rate: Series = inputs
            .treasury
            .iter()
            .zip(inputs.breakeven.iter())
            .map(|(t, b)| Some((*t)? - (*b)?))
            .collect();

        Self {
            growth: rate_of_change(inputs.benchmark, config.growth_window)
                .into_iter()
                .map(|v| v.map(|v| v * 100.0))
                .collect(),
            inflation: change(inputs.breakeven, config.inflation_window),
            volatility_rank: rolling_percentile_rank(inputs.volatility, config.vol_rank_window),
            credit_zscore: rolling_zscore(inputs.credit_spread, config.credit_zscore_window),
            balance_sheet_growth: rate_of_change(inputs.balance_sheet, config.balance_sheet_lag),
            real_rate_change: change(&real_rate, config.real_rate_change_window),
            real_rate_zscore: rolling_zscore(&real_rate, config.real_rate_zscore_window),
            real_rate,
        }
    }
}

/// Layer 2: classifies each day into a macro regime
pub struct RegimeClassifier {
    config: RegimeConfig,
    features: RegimeFeatures,
}

fn at(series: &Series, i: usize) -> f64 {
    series.get(i).copied().flatten().unwrap_or(0.0)
}

impl RegimeClassifier {
    pub fn new(config: RegimeConfig, features: RegimeFeatures) -> Self {
        Self { config, features }
    }

    /// Composite liquidity score on day `i`; undefined inputs count as zero
    pub fn liquidity(&self, i: usize) -> LiquidityScore {
        let f = &self.features;
        let half_scale = self.config.vol_rank_scale / 2.0;
        let volatility = -(at(&f.volatility_rank, i) * self.config.vol_rank_scale - half_scale);
        let credit = -at(&f.credit_zscore, i);
        let balance_sheet = at(&f.balance_sheet_growth, i) * self.config.balance_sheet_scale;
        LiquidityScore {
            volatility,
            credit,
            balance_sheet,
            score: (volatility + credit + balance_sheet) / 3.0,
        }
    }

    /// Map scores to a regime; the first matching rule wins
    pub fn classify(&self, growth: f64, inflation: f64, liquidity: f64) -> Regime {
        let c = &self.config;
        if liquidity < c.liquidity_threshold {
            Regime::LiquidityShock
        } else if inflation > c.inflation_threshold && growth < c.inflation_growth_ceiling {
            Regime::InflationShock
        } else if growth > c.growth_positive {
            Regime::GrowthPositive
        } else if growth < c.growth_negative {
            Regime::GrowthNegative
        } else {
            Regime::Neutral
        }
    }

    /// Full reading for day `i`
    pub fn evaluate(&self, i: usize) -> RegimeReading {
        let f = &self.features;
        let growth = at(&f.growth, i);
        let inflation = at(&f.inflation, i);
        let liquidity = self.liquidity(i);

        RegimeReading {
            growth,
            inflation,
            liquidity,
            real_rate: at(&f.real_rate, i),
            real_rate_change: at(&f.real_rate_change, i),
            real_rate_zscore: at(&f.real_rate_zscore, i),
            regime: self.classify(growth, inflation, liquidity.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_with(features: RegimeFeatures) -> RegimeClassifier {
        RegimeClassifier::new(RegimeConfig::default(), features)
    }

    fn empty_features(n: usize) -> RegimeFeatures {
        let none = vec![None; n];
        RegimeFeatures {
            growth: none.clone(),
            inflation: none.clone(),
            volatility_rank: none.clone(),
            credit_zscore: none.clone(),
            balance_sheet_growth: none.clone(),
            real_rate: none.clone(),
            real_rate_change: none.clone(),
            real_rate_zscore: none,
        }
    }

    #[test]
    fn test_precedence() {
        let c = classifier_with(empty_features(1));
        assert_eq!(c.classify(2.0, 0.5, -2.0), Regime::LiquidityShock);
        assert_eq!(c.classify(0.2, 0.2, 0.0), Regime::InflationShock);
        assert_eq!(c.classify(0.6, 0.2, 0.0), Regime::GrowthPositive);
        assert_eq!(c.classify(-0.6, 0.0, 0.0), Regime::GrowthNegative);
        assert_eq!(c.classify(0.0, 0.0, 0.0), Regime::Neutral);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let c = classifier_with(empty_features(1));
        assert_eq!(c.classify(0.5, 0.0, 0.0), Regime::Neutral);
        assert_eq!(c.classify(-0.5, 0.0, 0.0), Regime::Neutral);
        assert_eq!(c.classify(0.0, 0.10, 0.0), Regime::Neutral);
        assert_eq!(c.classify(0.0, 0.0, -1.5), Regime::Neutral);
    }

    #[test]
    fn test_undefined_inputs_default_to_zero() {
        let c = classifier_with(empty_features(3));
        let reading = c.evaluate(2);
        assert_eq!(reading.growth, 0.0);
        assert_eq!(reading.inflation, 0.0);
        // undefined percentile counts as 0 -> volatility component +3
        assert_eq!(reading.liquidity.volatility, 3.0);
        assert_eq!(reading.liquidity.score, 1.0);
        assert_eq!(reading.regime, Regime::Neutral);
    }

    #[test]
    fn test_liquidity_shock_from_components() {
        let mut f = empty_features(1);
        f.volatility_rank = vec![Some(1.0)];
        f.credit_zscore = vec![Some(2.0)];
        f.balance_sheet_growth = vec![Some(-0.05)];
        let c = classifier_with(f);
        let liq = c.liquidity(0);
        assert_eq!(liq.volatility, -3.0);
        assert_eq!(liq.credit, -2.0);
        assert!((liq.balance_sheet + 0.5).abs() < 1e-12);
        assert!((liq.score + 5.5 / 3.0).abs() < 1e-12);
        assert_eq!(c.evaluate(0).regime, Regime::LiquidityShock);
    }

    #[test]
    fn test_features_growth_in_percent() {
        let benchmark: Series = (0..61).map(|i| Some(if i == 60 { 110.0 } else { 100.0 })).collect();
        let none: Series = vec![None; 61];
        let inputs = MacroInputs {
            benchmark: &benchmark,
            breakeven: &none,
            treasury: &none,
            volatility: &none,
            credit_spread: &none,
            balance_sheet: &none,
        };
        let f = RegimeFeatures::compute(&RegimeConfig::default(), &inputs);
        assert_eq!(f.growth[59], None);
        assert!((f.growth[60].unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(f.real_rate[0], None);
    }
}
