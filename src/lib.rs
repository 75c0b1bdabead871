//! cugold-regime: Copper/gold ratio regime backtester for a multi-asset futures book
//!
//! This library provides the core components for:
//! - Calendar alignment and rolling statistics over daily bars
//! - The copper/gold ratio signal with tilt debouncing
//! - Macro regime classification and a liquidity score
//! - Currency, safe-haven, secondary-economy and correlation filters
//! - Notional and fixed position sizing with risk caps
//! - Drawdown, stop-loss and size-multiplier risk overlay
//! - Portfolio ledger with transaction costs and margin
//! - Parquet data loading and record export
//! - Backtest engine with performance analytics
//! - Structured logging and metrics

pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod filter;
pub mod portfolio;
pub mod regime;
pub mod risk;
pub mod schedule;
pub mod series;
pub mod signal;
pub mod sizing;
pub mod telemetry;
