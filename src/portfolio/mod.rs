//! Portfolio module
//!
//! Contract terms and the day-to-day ledger of equity, positions and entry prices

mod contracts;
mod ledger;

pub use contracts::{single_notional_limit, AssetClass, ContractBook, ContractSpec, UNIVERSE};
pub use ledger::{margin_utilization, PortfolioLedger, PositionMap, PriceTable};
