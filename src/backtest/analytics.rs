//! Backtest analytics and reporting

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::DailySignal;
use crate::portfolio::ContractBook;
use crate::signal::Tilt;

const TRADING_DAYS: f64 = 252.0;

/// Thresholds a run has to meet to be considered viable
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    pub min_sharpe: f64,
    pub min_sortino: f64,
    pub max_drawdown: f64,
    pub min_win_rate: f64,
    pub min_profit_factor: f64,
    pub max_turnover: f64,
    pub max_benchmark_correlation: f64,
    pub max_flips_per_year: f64,
    /// Flip rate above which the signal is considered broken
    pub kill_flips_per_year: f64,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            min_sharpe: 0.8,
            min_sortino: 1.0,
            max_drawdown: 0.20,
            min_win_rate: 0.45,
            min_profit_factor: 1.3,
            max_turnover: 15.0,
            max_benchmark_correlation: 0.5,
            max_flips_per_year: 12.0,
            kill_flips_per_year: 20.0,
        }
    }
}

/// One acceptance check and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub name: String,
    pub value: f64,
    pub threshold: f64,
    pub passed: bool,
}

/// Summary statistics from backtest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days: usize,
    pub initial_capital: Decimal,
    pub final_equity: Decimal,
    /// Total return over the run
    pub total_return: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Maximum drawdown (fraction of peak)
    pub max_drawdown: f64,
    /// Fraction of days with a positive return
    pub win_rate: f64,
    pub profit_factor: f64,
    /// Traded notional per year over average equity
    pub annual_turnover: f64,
    pub flips_per_year: f64,
    /// Correlation of daily returns with the growth benchmark, when enough pairs exist
    pub benchmark_correlation: Option<f64>,
    pub total_costs: Decimal,
    pub rebalances: usize,
    pub stop_outs: usize,
    pub hard_stop_days: usize,
    /// Days per confirmed tilt
    pub tilt_days: BTreeMap<String, usize>,
    /// Days per daily regime
    pub regime_days: BTreeMap<String, usize>,
    pub liquidity_min: f64,
    pub liquidity_max: f64,
    pub liquidity_mean: f64,
    /// Fraction of days with any open position
    pub invested_fraction: f64,
    pub criteria: Vec<CriterionResult>,
    /// Flip rate beyond the kill threshold
    pub kill_triggered: bool,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let (mx, my) = (
        pairs.iter().map(|p| p.0).sum::<f64>() / n,
        pairs.iter().map(|p| p.1).sum::<f64>() / n,
    );
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    let denominator = (sxx * syy).sqrt();
    (denominator > 0.0).then(|| sxy / denominator)
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl BacktestSummary {
    /// Reduce a run's records to summary statistics.
    ///
    /// Daily returns come from the equity curve seeded with `initial_capital`, so the first
    /// day's return is measured against the starting capital.
    pub fn from_signals(initial_capital: Decimal, signals: &[DailySignal], book: &ContractBook) -> Self {
        Self::with_criteria(initial_capital, signals, book, &AcceptanceCriteria::default())
    }

    pub fn with_criteria(
        initial_capital: Decimal,
        signals: &[DailySignal],
        book: &ContractBook,
        criteria: &AcceptanceCriteria,
    ) -> Self {
        let mut summary = Self {
            initial_capital,
            final_equity: initial_capital,
            ..Self::default()
        };
        let (Some(first), Some(last)) = (signals.first(), signals.last()) else {
            return summary;
        };

        let n = signals.len();
        let years = n as f64 / TRADING_DAYS;
        let initial = initial_capital.to_f64().unwrap_or(0.0);
        let curve: Vec<f64> = std::iter::once(initial)
            .chain(signals.iter().map(|s| s.equity.to_f64().unwrap_or(0.0)))
            .collect();
        let returns: Vec<f64> = curve
            .windows(2)
            .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
            .collect();

        summary.start = Some(first.date);
        summary.end = Some(last.date);
        summary.days = n;
        summary.final_equity = last.equity;

        let growth = ratio_or_zero(curve[n], initial);
        summary.total_return = growth - 1.0;
        summary.annual_return = if growth > 0.0 {
            growth.powf(TRADING_DAYS / n as f64) - 1.0
        } else {
            -1.0
        };
        summary.annual_volatility = population_std(&returns) * TRADING_DAYS.sqrt();
        summary.sharpe_ratio = ratio_or_zero(summary.annual_return, summary.annual_volatility);

        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside = if losses.is_empty() {
            0.0
        } else {
            (losses.iter().map(|r| r * r).sum::<f64>() / losses.len() as f64).sqrt() * TRADING_DAYS.sqrt()
        };
        summary.sortino_ratio = ratio_or_zero(summary.annual_return, downside);

        let mut peak = initial;
        for equity in &curve[1..] {
            peak = peak.max(*equity);
            if peak > 0.0 {
                summary.max_drawdown = summary.max_drawdown.max((peak - equity) / peak);
            }
        }

        summary.win_rate = returns.iter().filter(|r| **r > 0.0).count() as f64 / n as f64;
        let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
        let loss_total: f64 = losses.iter().map(|r| r.abs()).sum();
        summary.profit_factor = ratio_or_zero(gains, loss_total);

        let traded: f64 = signals
            .windows(2)
            .map(|w| {
                w[1].positions
                    .iter()
                    .map(|(symbol, qty)| {
                        let change = (qty - w[0].position(symbol)).unsigned_abs() as f64;
                        change * book.spec(symbol).notional.to_f64().unwrap_or(0.0)
                    })
                    .sum::<f64>()
            })
            .sum();
        let average_equity = mean(&curve[1..]);
        summary.annual_turnover = ratio_or_zero(traded / years, average_equity);

        let mut previous = Tilt::Neutral;
        let mut flips = 0usize;
        for s in signals {
            if s.tilt != previous {
                flips += 1;
                previous = s.tilt;
            }
        }
        summary.flips_per_year = flips as f64 / years;

        let pairs: Vec<(f64, f64)> = signals
            .windows(2)
            .zip(returns.iter().skip(1))
            .filter_map(|(w, r)| {
                let (before, now) = (w[0].benchmark?, w[1].benchmark?);
                (before > 0.0).then(|| (*r, now / before - 1.0))
            })
            .collect();
        summary.benchmark_correlation = if pairs.len() > 2 { pearson(&pairs) } else { None };

        summary.total_costs = signals.iter().map(|s| s.transaction_cost).sum();
        summary.rebalances = signals.iter().filter(|s| s.rebalanced).count();
        summary.stop_outs = signals.iter().map(|s| s.stopped_out.len()).sum();
        summary.hard_stop_days = signals.iter().filter(|s| s.drawdown_stop).count();

        for s in signals {
            *summary.tilt_days.entry(s.tilt.to_string()).or_default() += 1;
            *summary.regime_days.entry(s.regime().to_string()).or_default() += 1;
        }
        let liquidity: Vec<f64> = signals.iter().map(|s| s.macro_reading.liquidity.score).collect();
        summary.liquidity_min = liquidity.iter().copied().fold(f64::INFINITY, f64::min);
        summary.liquidity_max = liquidity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        summary.liquidity_mean = mean(&liquidity);
        summary.invested_fraction = signals.iter().filter(|s| s.is_invested()).count() as f64 / n as f64;

        summary.criteria = summary.evaluate(criteria);
        summary.kill_triggered = summary.flips_per_year > criteria.kill_flips_per_year;
        summary
    }

    fn evaluate(&self, c: &AcceptanceCriteria) -> Vec<CriterionResult> {
        let check = |name: &str, value: f64, threshold: f64, passed: bool| CriterionResult {
            name: name.to_string(),
            value,
            threshold,
            passed,
        };
        let correlation = self.benchmark_correlation.unwrap_or(0.0).abs();
        vec![
            check("sharpe", self.sharpe_ratio, c.min_sharpe, self.sharpe_ratio >= c.min_sharpe),
            check("sortino", self.sortino_ratio, c.min_sortino, self.sortino_ratio >= c.min_sortino),
            check("max_drawdown", self.max_drawdown, c.max_drawdown, self.max_drawdown < c.max_drawdown),
            check("win_rate", self.win_rate, c.min_win_rate, self.win_rate >= c.min_win_rate),
            check(
                "profit_factor",
                self.profit_factor,
                c.min_profit_factor,
                self.profit_factor >= c.min_profit_factor,
            ),
            check("turnover", self.annual_turnover, c.max_turnover, self.annual_turnover < c.max_turnover),
            check(
                "benchmark_correlation",
                correlation,
                c.max_benchmark_correlation,
                correlation < c.max_benchmark_correlation,
            ),
            check(
                "flips_per_year",
                self.flips_per_year,
                c.max_flips_per_year,
                self.flips_per_year <= c.max_flips_per_year,
            ),
        ]
    }

    /// All acceptance checks passed and the kill criterion did not fire
    pub fn accepted(&self) -> bool {
        !self.kill_triggered && !self.criteria.is_empty() && self.criteria.iter().all(|c| c.passed)
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let period = match (self.start, self.end) {
            (Some(s), Some(e)) => format!("{s} → {e}"),
            _ => "n/a".to_string(),
        };
        let correlation = self
            .benchmark_correlation
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        let counts = |m: &BTreeMap<String, usize>| {
            m.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("  ")
        };
        let checks = self
            .criteria
            .iter()
            .map(|c| {
                format!(
                    "{:<22}{:>10.3}  (threshold {:.2})  {}",
                    c.name,
                    c.value,
                    c.threshold,
                    if c.passed { "PASS" } else { "FAIL" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════
Period:           {} ({} days)

PERFORMANCE
───────────────────────────────────────────────────────
Final Equity:     {:.2} ({:+.2}%)
Annual Return:    {:+.2}%
Annual Vol:       {:.2}%
Sharpe Ratio:     {:.2}
Sortino Ratio:    {:.2}
Max Drawdown:     {:.2}%
Win Rate:         {:.1}%
Profit Factor:    {:.2}

ACTIVITY
───────────────────────────────────────────────────────
Rebalances:       {}
Stop-outs:        {}
Hard-stop Days:   {}
Total Costs:      {:.2}
Turnover:         {:.2}x / year
Flips / Year:     {:.2}
Benchmark Corr:   {}
Invested:         {:.1}%

DIAGNOSTICS
───────────────────────────────────────────────────────
Tilt Days:        {}
Regime Days:      {}
Liquidity:        min {:.2}  max {:.2}  mean {:.2}

ACCEPTANCE
───────────────────────────────────────────────────────
{}
Kill Criterion:   {}
Verdict:          {}
══════════════════════════════════════════════════════
"#,
            period,
            self.days,
            self.final_equity,
            self.total_return * 100.0,
            self.annual_return * 100.0,
            self.annual_volatility * 100.0,
            self.sharpe_ratio,
            self.sortino_ratio,
            self.max_drawdown * 100.0,
            self.win_rate * 100.0,
            self.profit_factor,
            self.rebalances,
            self.stop_outs,
            self.hard_stop_days,
            self.total_costs,
            self.annual_turnover,
            self.flips_per_year,
            correlation,
            self.invested_fraction * 100.0,
            counts(&self.tilt_days),
            counts(&self.regime_days),
            self.liquidity_min,
            self.liquidity_max,
            self.liquidity_mean,
            checks,
            if self.kill_triggered { "TRIGGERED" } else { "ok" },
            if self.accepted() { "ACCEPT" } else { "REJECT" },
        )
    }
}

/// Complete backtest results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Sizing mode name
    pub mode: String,
    /// Summary statistics
    pub summary: BacktestSummary,
    /// Path to the exported daily records, if written
    pub signals_path: Option<PathBuf>,
}

impl BacktestResult {
    pub fn new(mode: &str, summary: BacktestSummary) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode: mode.to_string(),
            summary,
            signals_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use crate::regime::{Regime, RegimeReading};
    use crate::signal::RatioSignal;
    use rust_decimal_macros::dec;

    fn signal(day: u32, equity: Decimal, tilt: Tilt, benchmark: Option<f64>) -> DailySignal {
        DailySignal {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            ratio: RatioSignal {
                ratio: 0.2,
                roc_short: None,
                roc_medium: None,
                roc_long: None,
                ma_signal: 0,
                zscore: None,
                z_signal: 0,
                composite: None,
                raw_tilt: tilt,
            },
            tilt,
            macro_reading: RegimeReading {
                regime: Regime::GrowthPositive,
                ..RegimeReading::default()
            },
            applied_regime: Regime::Neutral,
            filters: FilterState::default(),
            size_multiplier: 1.0,
            drawdown: Decimal::ZERO,
            drawdown_warning: false,
            drawdown_stop: false,
            rebalanced: false,
            triggers: Vec::new(),
            stopped_out: Vec::new(),
            positions: [("GC".to_string(), 0)].into_iter().collect(),
            equity,
            margin_utilization: 0.0,
            trailing_flips: 0,
            transaction_cost: Decimal::ZERO,
            benchmark,
        }
    }

    #[test]
    fn test_empty_run() {
        let summary = BacktestSummary::from_signals(dec!(1000), &[], &ContractBook::default());
        assert_eq!(summary.days, 0);
        assert_eq!(summary.final_equity, dec!(1000));
        assert!(!summary.accepted());
    }

    #[test]
    fn test_returns_drawdown_and_win_rate() {
        let signals = vec![
            signal(1, dec!(1100), Tilt::RiskOn, None),
            signal(2, dec!(990), Tilt::RiskOn, None),
            signal(3, dec!(1089), Tilt::RiskOn, None),
        ];
        let summary = BacktestSummary::from_signals(dec!(1000), &signals, &ContractBook::default());

        assert!((summary.total_return - 0.089).abs() < 1e-12);
        // 1100 -> 990 is the deepest fall
        assert!((summary.max_drawdown - 0.1).abs() < 1e-12);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
        // gains 0.1 + 0.1, loss 0.1
        assert!((summary.profit_factor - 2.0).abs() < 1e-9);
        assert_eq!(summary.tilt_days.get("RISK_ON"), Some(&3));
        assert_eq!(summary.regime_days.get("GROWTH_POSITIVE"), Some(&3));
    }

    #[test]
    fn test_profit_factor_without_losses_is_zero() {
        let signals = vec![signal(1, dec!(1010), Tilt::Neutral, None), signal(2, dec!(1020), Tilt::Neutral, None)];
        let summary = BacktestSummary::from_signals(dec!(1000), &signals, &ContractBook::default());
        assert_eq!(summary.profit_factor, 0.0);
        assert_eq!(summary.sortino_ratio, 0.0);
    }

    #[test]
    fn test_flips_counted_from_neutral() {
        let tilts = [Tilt::RiskOn, Tilt::RiskOn, Tilt::RiskOff, Tilt::RiskOff];
        let signals: Vec<_> = tilts
            .iter()
            .enumerate()
            .map(|(k, t)| signal(k as u32 + 1, dec!(1000), *t, None))
            .collect();
        let summary = BacktestSummary::from_signals(dec!(1000), &signals, &ContractBook::default());
        // two flips over 4/252 years
        assert!((summary.flips_per_year - 2.0 * 252.0 / 4.0).abs() < 1e-9);
        assert!(summary.kill_triggered);
    }

    #[test]
    fn test_benchmark_correlation_needs_three_pairs() {
        let few = vec![
            signal(1, dec!(1000), Tilt::Neutral, Some(100.0)),
            signal(2, dec!(1010), Tilt::Neutral, Some(101.0)),
            signal(3, dec!(1000), Tilt::Neutral, Some(100.0)),
        ];
        let summary = BacktestSummary::from_signals(dec!(1000), &few, &ContractBook::default());
        assert_eq!(summary.benchmark_correlation, None);

        let mut more = few.clone();
        more.push(signal(4, dec!(1020), Tilt::Neutral, Some(102.0)));
        let summary = BacktestSummary::from_signals(dec!(1000), &more, &ContractBook::default());
        let corr = summary.benchmark_correlation.unwrap();
        assert!(corr > 0.99);
    }

    #[test]
    fn test_turnover_uses_notional() {
        let mut a = signal(1, dec!(1000000), Tilt::RiskOff, None);
        let mut b = signal(2, dec!(1000000), Tilt::RiskOff, None);
        a.positions.insert("GC".to_string(), 0);
        b.positions.insert("GC".to_string(), 2);
        let summary = BacktestSummary::from_signals(dec!(1000000), &[a, b], &ContractBook::default());
        // 2 * 200000 traded over 2/252 years, on 1e6 average equity
        assert!((summary.annual_turnover - 400000.0 * 126.0 / 1_000_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_table_mentions_verdict() {
        let signals = vec![signal(1, dec!(1010), Tilt::RiskOn, None)];
        let table = BacktestSummary::from_signals(dec!(1000), &signals, &ContractBook::default()).format_table();
        assert!(table.contains("BACKTEST RESULTS"));
        assert!(table.contains("Verdict:"));
    }
}
