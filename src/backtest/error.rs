//! Backtest engine errors

use thiserror::Error;

/// Errors that prevent a run from starting
#[derive(Debug, Error)]
pub enum EngineError {
    /// A ratio leg has no data at all
    #[error("Missing data for primary instrument {0}")]
    MissingInstrument(String),
    /// The ratio legs never trade over a common date range
    #[error("Empty trading calendar: {0} and {1} do not overlap")]
    EmptyCalendar(String, String),
}
