//! Rolling-window statistics over calendar-indexed series
//!
//! Every function is causal: the value at index `i` reads only indices `<= i`.
//! A result is `None` whenever its inputs are undefined or a denominator degenerates.

use super::types::Series;

/// Values in the trailing window ending at `i`, if the window is complete and fully defined
fn full_window(values: &[Option<f64>], i: usize, window: usize) -> Option<&[Option<f64>]> {
    if window == 0 || i + 1 < window {
        return None;
    }
    let slice = &values[i + 1 - window..=i];
    slice.iter().all(Option::is_some).then_some(slice)
}

fn mean_of(slice: &[Option<f64>]) -> f64 {
    slice.iter().flatten().sum::<f64>() / slice.len() as f64
}

/// Simple moving average over `window` values
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Series {
    (0..values.len())
        .map(|i| full_window(values, i, window).map(mean_of))
        .collect()
}

/// Rolling population standard deviation over `window` values
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Series {
    (0..values.len())
        .map(|i| {
            full_window(values, i, window).map(|slice| {
                let mean = mean_of(slice);
                let var = slice
                    .iter()
                    .flatten()
                    .map(|v| (v - mean) * (v - mean))
                    .sum::<f64>()
                    / slice.len() as f64;
                var.sqrt()
            })
        })
        .collect()
}

/// Rolling z-score of each value against its own trailing window
pub fn rolling_zscore(values: &[Option<f64>], window: usize) -> Series {
    let mean = rolling_mean(values, window);
    let std = rolling_std(values, window);
    values
        .iter()
        .zip(mean.iter().zip(std.iter()))
        .map(|(v, (m, s))| match (v, m, s) {
            (Some(v), Some(m), Some(s)) if *s > 0.0 => Some((v - m) / s),
            _ => None,
        })
        .collect()
}

/// Mean of the defined values in `[i - window + 1, i]`.
///
/// Unlike [`rolling_mean`] this tolerates gaps. Defined iff `i >= window` and at least one
/// value in the window is defined.
pub fn sparse_trailing_mean(values: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    if window == 0 || i < window || i >= values.len() {
        return None;
    }
    let (sum, count) = values[i + 1 - window..=i]
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Day-over-day natural log returns
pub fn log_returns(prices: &[Option<f64>]) -> Series {
    (0..prices.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            match (prices[i], prices[i - 1]) {
                (Some(p), Some(prev)) if prev > 0.0 && p > 0.0 => Some((p / prev).ln()),
                _ => None,
            }
        })
        .collect()
}

/// Difference `v[i] - v[i - horizon]`
pub fn change(values: &[Option<f64>], horizon: usize) -> Series {
    (0..values.len())
        .map(|i| {
            if i < horizon {
                return None;
            }
            Some(values[i]? - values[i - horizon]?)
        })
        .collect()
}

/// Relative change `v[i] / v[i - horizon] - 1`, requiring a positive base
pub fn rate_of_change(values: &[Option<f64>], horizon: usize) -> Series {
    (0..values.len())
        .map(|i| {
            if i < horizon {
                return None;
            }
            let base = values[i - horizon]?;
            let now = values[i]?;
            (base > 0.0).then(|| now / base - 1.0)
        })
        .collect()
}

/// Fraction of defined values in the trailing window strictly below today's value.
///
/// Needs `i >= window`; the window is `[i - window + 1, i]` and includes today.
pub fn rolling_percentile_rank(values: &[Option<f64>], window: usize) -> Series {
    (0..values.len())
        .map(|i| {
            if window == 0 || i < window {
                return None;
            }
            let current = values[i]?;
            let defined: Vec<f64> = values[i + 1 - window..=i].iter().flatten().copied().collect();
            if defined.is_empty() {
                return None;
            }
            let below = defined.iter().filter(|v| **v < current).count();
            Some(below as f64 / defined.len() as f64)
        })
        .collect()
}

/// Quantile `q` of the defined values in `[i - window + 1, i]`.
///
/// Takes the sorted element at `floor(q * n)`, clamped to the last element. Needs
/// `i >= window - 1` and at least one defined value.
pub fn rolling_quantile(values: &[Option<f64>], i: usize, window: usize, q: f64) -> Option<f64> {
    if window == 0 || i + 1 < window || i >= values.len() {
        return None;
    }
    let mut defined: Vec<f64> = values[i + 1 - window..=i].iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    defined.sort_by(f64::total_cmp);
    let idx = ((q * defined.len() as f64).floor() as usize).min(defined.len() - 1);
    Some(defined[idx])
}
