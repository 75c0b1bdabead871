//! Macro regime module
//!
//! Layer 2 of the decision cascade: growth, inflation and liquidity scores mapped to a
//! regime tag, plus real-rate diagnostics

mod classifier;
mod types;

pub use classifier::{MacroInputs, RegimeClassifier, RegimeFeatures};
pub use types::{LiquidityScore, Regime, RegimeReading};
