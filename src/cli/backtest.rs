//! Backtest command implementation

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::backtest::{
    BacktestResult, BacktestSummary, Backtester, LoggingObserver, MetricsObserver, SignalObserver,
};
use crate::config::{Config, SizingMode};
use crate::data::{ParquetProvider, ParquetWriter};

/// How the summary is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Directory containing `futures/` and `macro/` Parquet files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Position sizing mode
    #[arg(long, value_enum)]
    pub mode: Option<SizingMode>,

    /// Output directory for results
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Skip writing daily records to Parquet
    #[arg(long)]
    pub no_export: bool,

    /// Output format: table or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl BacktestArgs {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(dir) = &self.data_dir {
            config.data.data_dir = dir.clone();
        }
        if let Some(capital) = self.capital {
            config.backtest.initial_capital = capital;
        }
        if let Some(mode) = self.mode {
            config.sizing.mode = mode;
        }
        if let Some(output) = &self.output {
            config.data.output_dir = output.clone();
        }
        if self.no_export {
            config.data.export_signals = false;
        }
        config
    }

    pub fn execute(&self, config: &Config) -> anyhow::Result<BacktestResult> {
        let config = self.apply(config);

        tracing::info!(
            data_dir = ?config.data.data_dir,
            capital = %config.backtest.initial_capital,
            mode = ?config.sizing.mode,
            "Loading data"
        );
        let provider = ParquetProvider::load(&config.data.data_dir)?;
        let backtester = Backtester::new(config.clone(), &provider)?;

        let mut logging = LoggingObserver;
        let mut metrics = MetricsObserver;
        let mut observers: [&mut dyn SignalObserver; 2] = [&mut logging, &mut metrics];
        let signals = backtester.run_with(&mut observers);

        let summary =
            BacktestSummary::from_signals(config.backtest.initial_capital, &signals, backtester.contracts());
        let mut result = BacktestResult::new(backtester.sizing_mode(), summary);

        if config.data.export_signals {
            let writer = ParquetWriter::new(config.data.output_dir.clone());
            let path = writer.write_daily_signals(&signals)?;
            tracing::info!(path = ?path, records = signals.len(), "Exported daily signals");
            result.signals_path = Some(path);
        }

        if result.summary.kill_triggered {
            tracing::warn!(
                flips_per_year = result.summary.flips_per_year,
                "Kill criterion triggered: tilt flips too often"
            );
        }

        match self.format {
            OutputFormat::Table => println!("{}", result.summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> BacktestArgs {
        BacktestArgs {
            data_dir: None,
            capital: None,
            mode: None,
            output: None,
            no_export: false,
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_apply_without_overrides_keeps_config() {
        let config = Config::default();
        let applied = args().apply(&config);
        assert_eq!(applied.data.data_dir, config.data.data_dir);
        assert_eq!(applied.backtest.initial_capital, dec!(1000000));
        assert!(applied.data.export_signals);
    }

    #[test]
    fn test_apply_overrides() {
        let overrides = BacktestArgs {
            data_dir: Some(PathBuf::from("/data")),
            capital: Some(dec!(50000)),
            mode: Some(SizingMode::Fixed),
            output: Some(PathBuf::from("/out")),
            no_export: true,
            ..args()
        };
        let applied = overrides.apply(&Config::default());
        assert_eq!(applied.data.data_dir, PathBuf::from("/data"));
        assert_eq!(applied.data.output_dir, PathBuf::from("/out"));
        assert_eq!(applied.backtest.initial_capital, dec!(50000));
        assert_eq!(applied.sizing.mode, SizingMode::Fixed);
        assert!(!applied.data.export_signals);
    }

    #[test]
    fn test_execute_fails_without_primaries() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = BacktestArgs {
            data_dir: Some(dir.path().to_path_buf()),
            no_export: true,
            ..args()
        };
        assert!(overrides.execute(&Config::default()).is_err());
    }
}
