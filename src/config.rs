//! Configuration types for cugold-regime
//!
//! Every field has a default, so an empty TOML file (or no file at all) yields the
//! reference parameter set.

use crate::portfolio::ContractSpec;
use crate::telemetry::LogFormat;
use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Per-symbol overrides of the built-in contract table
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractSpec>,
}

/// Signal, regime and filter parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub regime: RegimeConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Copper/gold ratio signal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Ratio numerator symbol
    #[serde(default = "default_numerator")]
    pub numerator: String,
    /// Contract multiplier applied to the numerator price
    #[serde(default = "default_numerator_multiplier")]
    pub numerator_multiplier: f64,
    /// Ratio denominator symbol
    #[serde(default = "default_denominator")]
    pub denominator: String,
    /// Contract multiplier applied to the denominator price
    #[serde(default = "default_denominator_multiplier")]
    pub denominator_multiplier: f64,
    /// Rate-of-change horizons (short, medium, long); the medium one drives the composite
    #[serde(default = "default_roc_windows")]
    pub roc_windows: [usize; 3],
    #[serde(default = "default_ma_fast")]
    pub ma_fast: usize,
    #[serde(default = "default_ma_slow")]
    pub ma_slow: usize,
    #[serde(default = "default_zscore_window")]
    pub zscore_window: usize,
    /// |z| above this produces a non-zero z signal
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,
    #[serde(default = "default_composite_threshold")]
    pub composite_threshold: f64,
    #[serde(default = "default_roc_weight")]
    pub roc_weight: f64,
    #[serde(default = "default_ma_weight")]
    pub ma_weight: f64,
    #[serde(default = "default_zscore_weight")]
    pub zscore_weight: f64,
    /// Consecutive days a new raw tilt must persist before it is confirmed
    #[serde(default = "default_min_hold_days")]
    pub min_hold_days: u32,
    /// Lookback for the trailing flip count
    #[serde(default = "default_flip_lookback_days")]
    pub flip_lookback_days: usize,
}

fn default_numerator() -> String {
    "HG".to_string()
}
fn default_numerator_multiplier() -> f64 {
    25_000.0
}
fn default_denominator() -> String {
    "GC".to_string()
}
fn default_denominator_multiplier() -> f64 {
    100.0
}
fn default_roc_windows() -> [usize; 3] {
    [10, 20, 60]
}
fn default_ma_fast() -> usize {
    10
}
fn default_ma_slow() -> usize {
    50
}
fn default_zscore_window() -> usize {
    120
}
fn default_zscore_threshold() -> f64 {
    0.5
}
fn default_composite_threshold() -> f64 {
    0.0
}
fn default_roc_weight() -> f64 {
    0.33
}
fn default_ma_weight() -> f64 {
    0.33
}
fn default_zscore_weight() -> f64 {
    0.34
}
fn default_min_hold_days() -> u32 {
    5
}
fn default_flip_lookback_days() -> usize {
    252
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            numerator: default_numerator(),
            numerator_multiplier: default_numerator_multiplier(),
            denominator: default_denominator(),
            denominator_multiplier: default_denominator_multiplier(),
            roc_windows: default_roc_windows(),
            ma_fast: default_ma_fast(),
            ma_slow: default_ma_slow(),
            zscore_window: default_zscore_window(),
            zscore_threshold: default_zscore_threshold(),
            composite_threshold: default_composite_threshold(),
            roc_weight: default_roc_weight(),
            ma_weight: default_ma_weight(),
            zscore_weight: default_zscore_weight(),
            min_hold_days: default_min_hold_days(),
            flip_lookback_days: default_flip_lookback_days(),
        }
    }
}

/// Macro regime classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Benchmark momentum horizon for the growth score
    #[serde(default = "default_growth_window")]
    pub growth_window: usize,
    /// Breakeven change horizon for the inflation score
    #[serde(default = "default_inflation_window")]
    pub inflation_window: usize,
    /// Window of the volatility-index percentile rank
    #[serde(default = "default_vol_rank_window")]
    pub vol_rank_window: usize,
    /// Maps a [0, 1] percentile onto roughly [-3, 3]
    #[serde(default = "default_vol_rank_scale")]
    pub vol_rank_scale: f64,
    /// Window of the credit-spread z-score
    #[serde(default = "default_credit_zscore_window")]
    pub credit_zscore_window: usize,
    /// Lag of the central-bank balance-sheet growth
    #[serde(default = "default_balance_sheet_lag")]
    pub balance_sheet_lag: usize,
    #[serde(default = "default_balance_sheet_scale")]
    pub balance_sheet_scale: f64,
    #[serde(default = "default_real_rate_change_window")]
    pub real_rate_change_window: usize,
    #[serde(default = "default_real_rate_zscore_window")]
    pub real_rate_zscore_window: usize,
    /// Liquidity below this is a liquidity shock
    #[serde(default = "default_liquidity_threshold")]
    pub liquidity_threshold: f64,
    #[serde(default = "default_inflation_threshold")]
    pub inflation_threshold: f64,
    /// Inflation shock also requires growth below this
    #[serde(default = "default_inflation_growth_ceiling")]
    pub inflation_growth_ceiling: f64,
    #[serde(default = "default_growth_positive")]
    pub growth_positive: f64,
    #[serde(default = "default_growth_negative")]
    pub growth_negative: f64,
    /// Days a new regime must persist before it fires a rebalance
    #[serde(default = "default_regime_confirmation_days")]
    pub confirmation_days: u32,
}

fn default_growth_window() -> usize {
    60
}
fn default_inflation_window() -> usize {
    20
}
fn default_vol_rank_window() -> usize {
    60
}
fn default_vol_rank_scale() -> f64 {
    6.0
}
fn default_credit_zscore_window() -> usize {
    60
}
fn default_balance_sheet_lag() -> usize {
    252
}
fn default_balance_sheet_scale() -> f64 {
    10.0
}
fn default_real_rate_change_window() -> usize {
    20
}
fn default_real_rate_zscore_window() -> usize {
    120
}
fn default_liquidity_threshold() -> f64 {
    -1.5
}
fn default_inflation_threshold() -> f64 {
    0.10
}
fn default_inflation_growth_ceiling() -> f64 {
    0.5
}
fn default_growth_positive() -> f64 {
    0.5
}
fn default_growth_negative() -> f64 {
    -0.5
}
fn default_regime_confirmation_days() -> u32 {
    3
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            growth_window: default_growth_window(),
            inflation_window: default_inflation_window(),
            vol_rank_window: default_vol_rank_window(),
            vol_rank_scale: default_vol_rank_scale(),
            credit_zscore_window: default_credit_zscore_window(),
            balance_sheet_lag: default_balance_sheet_lag(),
            balance_sheet_scale: default_balance_sheet_scale(),
            real_rate_change_window: default_real_rate_change_window(),
            real_rate_zscore_window: default_real_rate_zscore_window(),
            liquidity_threshold: default_liquidity_threshold(),
            inflation_threshold: default_inflation_threshold(),
            inflation_growth_ceiling: default_inflation_growth_ceiling(),
            growth_positive: default_growth_positive(),
            growth_negative: default_growth_negative(),
            confirmation_days: default_regime_confirmation_days(),
        }
    }
}

/// Currency, safe-haven and correlation filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_currency_fast")]
    pub currency_fast: usize,
    #[serde(default = "default_currency_slow")]
    pub currency_slow: usize,
    #[serde(default = "default_currency_momentum_window")]
    pub currency_momentum_window: usize,
    #[serde(default = "default_currency_momentum_threshold")]
    pub currency_momentum_threshold: f64,
    /// Instrument whose shorts are suppressed on safe-haven days
    #[serde(default = "default_hedge_symbol")]
    pub hedge_symbol: String,
    #[serde(default = "default_safe_haven_window")]
    pub safe_haven_window: usize,
    #[serde(default = "default_safe_haven_quantile")]
    pub safe_haven_quantile: f64,
    /// Minimum one-day hedge return on a safe-haven day
    #[serde(default = "default_hedge_return_threshold")]
    pub hedge_return_threshold: f64,
    /// Minimum one-day benchmark decline on a safe-haven day
    #[serde(default = "default_benchmark_drop_threshold")]
    pub benchmark_drop_threshold: f64,
    #[serde(default = "default_true")]
    pub secondary_enabled: bool,
    #[serde(default = "default_secondary_window")]
    pub secondary_window: usize,
    #[serde(default = "default_secondary_threshold")]
    pub secondary_threshold: f64,
    #[serde(default = "default_secondary_adjustment")]
    pub secondary_adjustment: f64,
    /// Currency future watched for intervention-sized moves
    #[serde(default = "default_intervention_symbol")]
    pub intervention_symbol: String,
    #[serde(default = "default_intervention_threshold")]
    pub intervention_threshold: f64,
    #[serde(default = "default_correlation_window")]
    pub correlation_window: usize,
    #[serde(default = "default_correlation_threshold")]
    pub correlation_threshold: f64,
}

fn default_true() -> bool {
    true
}
fn default_currency_fast() -> usize {
    50
}
fn default_currency_slow() -> usize {
    200
}
fn default_currency_momentum_window() -> usize {
    20
}
fn default_currency_momentum_threshold() -> f64 {
    0.03
}
fn default_hedge_symbol() -> String {
    "GC".to_string()
}
fn default_safe_haven_window() -> usize {
    60
}
fn default_safe_haven_quantile() -> f64 {
    0.90
}
fn default_hedge_return_threshold() -> f64 {
    0.015
}
fn default_benchmark_drop_threshold() -> f64 {
    0.015
}
fn default_secondary_window() -> usize {
    65
}
fn default_secondary_threshold() -> f64 {
    -2.0
}
fn default_secondary_adjustment() -> f64 {
    0.7
}
fn default_intervention_symbol() -> String {
    "6J".to_string()
}
fn default_intervention_threshold() -> f64 {
    0.02
}
fn default_correlation_window() -> usize {
    20
}
fn default_correlation_threshold() -> f64 {
    0.70
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            currency_fast: default_currency_fast(),
            currency_slow: default_currency_slow(),
            currency_momentum_window: default_currency_momentum_window(),
            currency_momentum_threshold: default_currency_momentum_threshold(),
            hedge_symbol: default_hedge_symbol(),
            safe_haven_window: default_safe_haven_window(),
            safe_haven_quantile: default_safe_haven_quantile(),
            hedge_return_threshold: default_hedge_return_threshold(),
            benchmark_drop_threshold: default_benchmark_drop_threshold(),
            secondary_enabled: true,
            secondary_window: default_secondary_window(),
            secondary_threshold: default_secondary_threshold(),
            secondary_adjustment: default_secondary_adjustment(),
            intervention_symbol: default_intervention_symbol(),
            intervention_threshold: default_intervention_threshold(),
            correlation_window: default_correlation_window(),
            correlation_threshold: default_correlation_threshold(),
        }
    }
}

/// Risk overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Drawdown from peak that halves the multiplier (strictly above)
    #[serde(default = "default_drawdown_warn")]
    pub drawdown_warn: Decimal,
    /// Drawdown from peak that zeroes the multiplier (strictly above)
    #[serde(default = "default_drawdown_stop")]
    pub drawdown_stop: Decimal,
    #[serde(default = "default_half")]
    pub drawdown_warn_scale: f64,
    /// Multiplier base in cautious regimes
    #[serde(default = "default_half")]
    pub cautious_base: f64,
    #[serde(default = "default_half")]
    pub suspect_penalty: f64,
    #[serde(default = "default_liquidity_penalty")]
    pub liquidity_penalty: f64,
    #[serde(default = "default_half")]
    pub correlation_penalty: f64,
    #[serde(default = "default_stop_atr_window")]
    pub stop_atr_window: usize,
    /// Loss beyond this many ATRs per contract closes the position
    #[serde(default = "default_stop_atr_multiple")]
    pub stop_atr_multiple: f64,
}

fn default_drawdown_warn() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_drawdown_stop() -> Decimal {
    Decimal::new(15, 2) // 0.15
}
fn default_half() -> f64 {
    0.5
}
fn default_liquidity_penalty() -> f64 {
    0.25
}
fn default_stop_atr_window() -> usize {
    20
}
fn default_stop_atr_multiple() -> f64 {
    2.0
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            drawdown_warn: default_drawdown_warn(),
            drawdown_stop: default_drawdown_stop(),
            drawdown_warn_scale: default_half(),
            cautious_base: default_half(),
            suspect_penalty: default_half(),
            liquidity_penalty: default_liquidity_penalty(),
            correlation_penalty: default_half(),
            stop_atr_window: default_stop_atr_window(),
            stop_atr_multiple: default_stop_atr_multiple(),
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Sizing mode: "notional" or "fixed"
    #[serde(default)]
    pub mode: SizingMode,
    /// Contracts per leg in fixed mode
    #[serde(default = "default_fixed_contracts")]
    pub fixed_contracts: i64,
    /// Gross notional as a multiple of equity
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Margin-to-equity ceiling
    #[serde(default = "default_max_margin_utilization")]
    pub max_margin_utilization: f64,
    #[serde(default = "default_equity_group_cap")]
    pub equity_group_cap: f64,
    #[serde(default = "default_commodity_group_cap")]
    pub commodity_group_cap: f64,
    /// Instrument sized to match the hedge instrument's dollar volatility
    #[serde(default = "default_vol_matched_symbol")]
    pub vol_matched_symbol: String,
    #[serde(default = "default_vol_atr_window")]
    pub vol_atr_window: usize,
}

/// Sizing mode for position sizing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Equity-proportional notional sizing with caps
    #[default]
    Notional,
    /// Constant contract count per leg, caps skipped
    Fixed,
}

fn default_fixed_contracts() -> i64 {
    1
}
fn default_leverage() -> f64 {
    2.0
}
fn default_max_margin_utilization() -> f64 {
    0.5
}
fn default_equity_group_cap() -> f64 {
    0.35
}
fn default_commodity_group_cap() -> f64 {
    0.40
}
fn default_vol_matched_symbol() -> String {
    "SI".to_string()
}
fn default_vol_atr_window() -> usize {
    20
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            mode: SizingMode::Notional,
            fixed_contracts: default_fixed_contracts(),
            leverage: default_leverage(),
            max_margin_utilization: default_max_margin_utilization(),
            equity_group_cap: default_equity_group_cap(),
            commodity_group_cap: default_commodity_group_cap(),
            vol_matched_symbol: default_vol_matched_symbol(),
            vol_atr_window: default_vol_atr_window(),
        }
    }
}

/// Backtest run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    /// Weekday of the scheduled rebalance
    #[serde(default = "default_rebalance_weekday")]
    pub rebalance_weekday: Weekday,
    /// Equity benchmark indicator used for growth and safe-haven checks
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
    /// Day-over-day close move logged as suspicious
    #[serde(default = "default_half")]
    pub extreme_move_threshold: f64,
    /// Day-over-day equity move logged as suspicious
    #[serde(default = "default_half")]
    pub equity_swing_threshold: f64,
}

fn default_initial_capital() -> Decimal {
    Decimal::new(1_000_000, 0)
}
fn default_rebalance_weekday() -> Weekday {
    Weekday::Fri
}
fn default_benchmark() -> String {
    "spx".to_string()
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            rebalance_weekday: default_rebalance_weekday(),
            benchmark: default_benchmark(),
            extreme_move_threshold: default_half(),
            equity_swing_threshold: default_half(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding `futures/` and `macro/` Parquet files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Write `daily_signals.parquet` after a run
    #[serde(default = "default_true")]
    pub export_signals: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            export_signals: true,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Write a Prometheus text snapshot here at the end of a run
    #[serde(default)]
    pub metrics_snapshot: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_snapshot: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.strategy.signal.numerator, "HG");
        assert_eq!(config.strategy.signal.roc_windows, [10, 20, 60]);
        assert_eq!(config.strategy.regime.confirmation_days, 3);
        assert_eq!(config.risk.drawdown_stop, dec!(0.15));
        assert_eq!(config.sizing.mode, SizingMode::Notional);
        assert_eq!(config.backtest.rebalance_weekday, Weekday::Fri);
        assert_eq!(config.backtest.initial_capital, dec!(1000000));
        assert!(config.contracts.is_empty());
    }

    #[test]
    fn test_config_deserialize_overrides() {
        let toml = r#"
            [strategy.signal]
            min_hold_days = 3
            zscore_threshold = 1.0

            [strategy.filter]
            secondary_enabled = false

            [risk]
            drawdown_warn = 0.05
            drawdown_stop = 0.20

            [sizing]
            mode = "fixed"
            fixed_contracts = 2

            [backtest]
            initial_capital = 250000
            rebalance_weekday = "Mon"

            [telemetry]
            log_level = "debug"
            log_format = "json"
            metrics_snapshot = "./output/metrics.prom"

            [contracts.HG]
            margin = 7000
            notional = 120000
            tick_size = 0.0005
            tick_value = 12.5
            commission_rt = 2.5
            spread_ticks = 0.5
            slippage_ticks = 0.5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.strategy.signal.min_hold_days, 3);
        assert_eq!(config.strategy.signal.ma_slow, 50);
        assert!(!config.strategy.filter.secondary_enabled);
        assert_eq!(config.risk.drawdown_warn, dec!(0.05));
        assert_eq!(config.sizing.mode, SizingMode::Fixed);
        assert_eq!(config.sizing.fixed_contracts, 2);
        assert_eq!(config.backtest.initial_capital, dec!(250000));
        assert_eq!(config.backtest.rebalance_weekday, Weekday::Mon);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert!(config.telemetry.metrics_snapshot.is_some());
        assert_eq!(config.contracts["HG"].margin, dec!(7000));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.strategy.signal.denominator, "GC");
        assert_eq!(config.sizing.max_margin_utilization, 0.5);
    }
}
