//! Scheduling module
//!
//! Hysteresis and rebalance timing: the shared confirmation primitive, the tilt
//! debouncer and the rebalance trigger state machine

mod confirmation;
mod rebalance;
mod tilt;

pub use confirmation::Confirmation;
pub use rebalance::{RebalanceScheduler, ScheduleInputs, Trigger};
pub use tilt::{TiltDebouncer, TiltUpdate};
