//! Ratio signal module
//!
//! Layer 1 of the decision cascade: the copper/gold notional ratio, its momentum,
//! moving-average cross and z-score, blended into a raw risk tilt

mod ratio;
mod types;

pub use ratio::{RatioFeatures, RatioSignalLayer};
pub use types::{RatioSignal, Tilt};
