//! Backtesting module
//!
//! Precomputes every feature series once, then steps the three-layer signal stack, the risk
//! overlay and the portfolio ledger through the trading calendar one day at a time.

mod analytics;
mod engine;
mod error;
mod features;
mod observer;
mod record;

pub use analytics::{AcceptanceCriteria, BacktestResult, BacktestSummary, CriterionResult};
pub use engine::{Backtester, RunState};
pub use error::EngineError;
pub use features::Features;
pub use observer::{CollectingObserver, LoggingObserver, MetricsObserver, SignalObserver};
pub use record::DailySignal;
