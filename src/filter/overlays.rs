//! Day-level overlays: safe haven, secondary economy, intervention, correlation spike

use crate::config::FilterConfig;
use crate::series::rolling_quantile;

fn one_day_return(prices: &[Option<f64>], i: usize) -> Option<f64> {
    if i == 0 {
        return None;
    }
    let prev = (*prices.get(i - 1)?)?;
    let now = (*prices.get(i)?)?;
    (prev > 0.0).then(|| now / prev - 1.0)
}

/// Flight-to-quality day: volatility above its trailing upper quantile while the hedge
/// rallies and the benchmark sells off.
pub fn safe_haven(
    config: &FilterConfig,
    volatility: &[Option<f64>],
    hedge: &[Option<f64>],
    benchmark: &[Option<f64>],
    i: usize,
) -> bool {
    let Some(vol) = volatility.get(i).copied().flatten() else {
        return false;
    };
    let (Some(hedge_ret), Some(bench_ret)) = (one_day_return(hedge, i), one_day_return(benchmark, i))
    else {
        return false;
    };
    let Some(upper) = rolling_quantile(volatility, i, config.safe_haven_window, config.safe_haven_quantile)
    else {
        return false;
    };

    vol > upper
        && hedge_ret > config.hedge_return_threshold
        && bench_ret < -config.benchmark_drop_threshold
}

/// Size factor from the secondary-economy leading indicator
pub fn secondary_adjustment(config: &FilterConfig, indicator: Option<f64>, average: Option<f64>) -> f64 {
    if !config.secondary_enabled {
        return 1.0;
    }
    match (indicator, average) {
        (Some(v), Some(avg)) if v - avg < config.secondary_threshold => config.secondary_adjustment,
        _ => 1.0,
    }
}

/// One-day move in the watched currency future beyond the intervention threshold
pub fn intervention(config: &FilterConfig, prices: &[Option<f64>], i: usize) -> bool {
    one_day_return(prices, i)
        .map(|r| r.abs() > config.intervention_threshold)
        .unwrap_or(false)
}
