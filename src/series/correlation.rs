//! Cross-sectional return correlation

use super::types::Series;

/// Pearson correlation over the rows of `[i - window + 1, i]` where both series are defined
fn pair_correlation(a: &[Option<f64>], b: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    let rows: Vec<(f64, f64)> = (i + 1 - window..=i)
        .filter_map(|k| Some((a.get(k).copied()??, b.get(k).copied()??)))
        .collect();
    if rows.len() < 2 {
        return None;
    }

    let n = rows.len() as f64;
    let mean_a = rows.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = rows.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &rows {
        let (da, db) = (x - mean_a, y - mean_b);
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    (denom > 0.0).then(|| cov / denom)
}

/// Mean correlation across every usable pair of series at index `i`.
///
/// Returns `0.0` with fewer than two series, before the window fills, or when no pair is
/// usable.
pub fn average_pairwise_correlation(returns: &[Series], i: usize, window: usize) -> f64 {
    if returns.len() < 2 || window == 0 || i + 1 < window {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for a in 0..returns.len() {
        for b in a + 1..returns.len() {
            if let Some(c) = pair_correlation(&returns[a], &returns[b], i, window) {
                sum += c;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        0.0
    } else {
        sum / pairs as f64
    }
}

/// [`average_pairwise_correlation`] at every calendar index
pub fn rolling_average_correlation(returns: &[Series], len: usize, window: usize) -> Vec<f64> {
    (0..len)
        .map(|i| average_pairwise_correlation(returns, i, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Series {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_perfectly_correlated_pair() {
        let a = some(&[0.01, -0.02, 0.03, 0.00]);
        let b = some(&[0.02, -0.04, 0.06, 0.00]);
        let c = average_pairwise_correlation(&[a, b], 3, 4);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_anti_correlated_pair() {
        let a = some(&[0.01, -0.02, 0.03]);
        let b = some(&[-0.01, 0.02, -0.03]);
        let c = average_pairwise_correlation(&[a, b], 2, 3);
        assert!((c + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_return_zero() {
        let a = some(&[0.01, 0.02, 0.03]);
        assert_eq!(average_pairwise_correlation(&[a.clone()], 2, 3), 0.0);
        assert_eq!(average_pairwise_correlation(&[a.clone(), a.clone()], 1, 3), 0.0);

        let flat = some(&[0.0, 0.0, 0.0]);
        assert_eq!(average_pairwise_correlation(&[a, flat], 2, 3), 0.0);
    }

    #[test]
    fn test_only_rows_where_both_defined() {
        let a = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let b = vec![Some(2.0), Some(9.0), Some(4.0), Some(6.0)];
        let c = average_pairwise_correlation(&[a, b], 3, 4);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_length() {
        let a = some(&[0.01, -0.02, 0.03]);
        let b = some(&[0.02, -0.01, 0.01]);
        let series = rolling_average_correlation(&[a, b], 3, 2);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], 0.0);
    }
}
