//! Position sizing module
//!
//! Trade-expression tables, target contract counts and the notional/margin caps

mod caps;
mod expressions;
mod sizer;

pub use caps::{apply_group_cap, apply_margin_cap, apply_single_limits};
pub use expressions::{trade_expression, Leg, LegScale};
pub use sizer::{create_sizer, FixedSizer, NotionalSizer, PositionSizer, SizedBook, SizingContext};
