//! Configuration loading tests

use cugold_regime::config::{Config, SizingMode};
use cugold_regime::telemetry::LogFormat;
use rust_decimal_macros::dec;
use std::io::Write;

#[test]
fn test_load_example_config_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();
    assert_eq!(config.strategy.signal.numerator, "HG");
    assert_eq!(config.strategy.regime.confirmation_days, 3);
    assert_eq!(config.risk.drawdown_stop, dec!(0.15));
    assert_eq!(config.sizing.mode, SizingMode::Notional);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.telemetry.metrics_snapshot.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sizing]\nmode = \"fixed\"\nfixed_contracts = 3").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.sizing.mode, SizingMode::Fixed);
    assert_eq!(config.sizing.fixed_contracts, 3);
    assert_eq!(config.sizing.leverage, 2.0);
    assert_eq!(config.strategy.filter.hedge_symbol, "GC");
}

#[test]
fn test_effective_config_round_trips_through_toml() {
    let config = Config::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.backtest.initial_capital, config.backtest.initial_capital);
    assert_eq!(parsed.backtest.rebalance_weekday, config.backtest.rebalance_weekday);
    assert_eq!(parsed.strategy.signal.roc_windows, config.strategy.signal.roc_windows);
}

#[test]
fn test_malformed_config_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[risk]\ndrawdown_stop = \"lots\"").unwrap();
    assert!(Config::load(file.path()).is_err());
}
