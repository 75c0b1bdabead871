//! CLI interface for cugold-regime
//!
//! Provides subcommands for:
//! - `backtest`: Run the regime backtest over a Parquet data directory
//! - `config`: Show the effective configuration

mod backtest;

pub use backtest::{BacktestArgs, OutputFormat};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cugold-regime")]
#[command(about = "Copper/gold ratio regime backtester for a multi-asset futures book")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run backtest on stored daily data
    Backtest(BacktestArgs),
    /// Show the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backtest_overrides() {
        let cli = Cli::parse_from([
            "cugold-regime",
            "backtest",
            "--data-dir",
            "/tmp/data",
            "--capital",
            "250000",
            "--mode",
            "fixed",
            "--format",
            "json",
        ]);
        let Commands::Backtest(args) = cli.command else {
            panic!("expected backtest subcommand");
        };
        assert_eq!(args.data_dir.as_deref(), Some(std::path::Path::new("/tmp/data")));
        assert_eq!(args.capital, Some(rust_decimal_macros::dec!(250000)));
        assert_eq!(args.mode, Some(crate::config::SizingMode::Fixed));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["cugold-regime", "config", "--config", "alt.toml"]);
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, "alt.toml");
    }
}
