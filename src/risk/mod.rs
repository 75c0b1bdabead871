//! Risk management module
//!
//! Size multiplier, drawdown controls and position stop-losses

mod limits;
mod multiplier;
mod stop;

pub use limits::{DrawdownLimits, DrawdownMonitor, DrawdownStatus};
pub use multiplier::SizeMultiplier;
pub use stop::StopLossRule;
