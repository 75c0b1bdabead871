//! Contract specifications, asset classes and notional limits

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Instruments traded by the strategy, in reporting order
pub const UNIVERSE: [&str; 9] = ["HG", "GC", "CL", "SI", "ZN", "UB", "6J", "MES", "MNQ"];

/// Exchange contract terms and execution cost assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Initial margin per contract
    pub margin: Decimal,
    /// Approximate notional per contract
    pub notional: Decimal,
    pub tick_size: Decimal,
    /// Dollar value of one tick
    pub tick_value: Decimal,
    /// Round-trip commission per contract
    pub commission_rt: Decimal,
    /// Bid/ask spread paid once per round trip, in ticks
    pub spread_ticks: Decimal,
    /// Slippage per side, in ticks
    pub slippage_ticks: Decimal,
    /// Dollars per 1.0 move in the quoted price used for daily P&L; derived from the tick
    /// terms when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_value: Option<Decimal>,
}

impl ContractSpec {
    fn new(
        margin: Decimal,
        notional: Decimal,
        tick_size: Decimal,
        tick_value: Decimal,
        commission_rt: Decimal,
        spread_ticks: Decimal,
        slippage_ticks: Decimal,
    ) -> Self {
        Self {
            margin,
            notional,
            tick_size,
            tick_value,
            commission_rt,
            spread_ticks,
            slippage_ticks,
            point_value: None,
        }
    }

    fn with_point_value(mut self, point_value: Decimal) -> Self {
        self.point_value = Some(point_value);
        self
    }

    /// Dollars per 1.0 move in the quoted price: the explicit value, else `tick_value / tick_size`
    pub fn point_value(&self) -> Decimal {
        if let Some(point_value) = self.point_value {
            return point_value;
        }
        if self.tick_size.is_zero() {
            return Decimal::ZERO;
        }
        self.tick_value / self.tick_size
    }

    /// Point value as a float for price-series arithmetic
    pub fn point_value_f64(&self) -> f64 {
        self.point_value().to_f64().unwrap_or(0.0)
    }

    /// Commission plus spread plus slippage on both sides, per contract
    pub fn round_trip_cost(&self) -> Decimal {
        self.commission_rt
            + self.spread_ticks * self.tick_value
            + dec!(2) * self.slippage_ticks * self.tick_value
    }
}

impl Default for ContractSpec {
    fn default() -> Self {
        Self::new(dec!(5000), dec!(100000), dec!(0.01), dec!(10.00), dec!(2.50), dec!(1.0), dec!(0.5))
    }
}

/// Asset class buckets used for allocation weights and group caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    EquityIndex,
    Commodities,
    FixedIncome,
    Fx,
}

impl AssetClass {
    /// Classify a symbol; anything unknown is treated as a commodity
    pub fn of(symbol: &str) -> Self {
        match symbol {
            "MES" | "MNQ" => AssetClass::EquityIndex,
            "ZN" | "UB" => AssetClass::FixedIncome,
            "6J" => AssetClass::Fx,
            _ => AssetClass::Commodities,
        }
    }

    /// Share of gross leverage allocated to the class
    pub fn weight(self) -> f64 {
        match self {
            AssetClass::EquityIndex => 0.30,
            AssetClass::Commodities => 0.35,
            AssetClass::FixedIncome => 0.25,
            AssetClass::Fx => 0.10,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetClass::EquityIndex => "EQUITY_INDEX",
            AssetClass::Commodities => "COMMODITIES",
            AssetClass::FixedIncome => "FIXED_INCOME",
            AssetClass::Fx => "FX",
        })
    }
}

/// Per-instrument notional ceiling as a fraction of equity, if the instrument has one
pub fn single_notional_limit(symbol: &str) -> Option<f64> {
    match symbol {
        "MES" | "MNQ" => Some(0.20),
        "HG" | "GC" | "CL" | "SI" => Some(0.15),
        _ => None,
    }
}

/// Lookup table of contract specs with a fallback for unknown symbols
#[derive(Debug, Clone)]
pub struct ContractBook {
    specs: BTreeMap<String, ContractSpec>,
    fallback: ContractSpec,
}

impl ContractBook {
    /// Built-in table with `overrides` replacing matching symbols
    pub fn with_overrides(overrides: &BTreeMap<String, ContractSpec>) -> Self {
        let mut book = Self::default();
        for (symbol, spec) in overrides {
            book.specs.insert(symbol.clone(), spec.clone());
        }
        book
    }

    /// Spec for `symbol`, or the generic fallback
    pub fn spec(&self, symbol: &str) -> &ContractSpec {
        self.specs.get(symbol).unwrap_or(&self.fallback)
    }
}

impl Default for ContractBook {
    fn default() -> Self {
        let table = [
            // HG and 6J mark to market at the book's fixed point values, not their tick ratios
            ("HG", ContractSpec::new(dec!(6000), dec!(110000), dec!(0.0005), dec!(12.50), dec!(2.50), dec!(0.5), dec!(0.5))
                .with_point_value(dec!(250))),
            ("GC", ContractSpec::new(dec!(11000), dec!(200000), dec!(0.10), dec!(10.00), dec!(2.50), dec!(1.0), dec!(0.5))),
            ("CL", ContractSpec::new(dec!(7000), dec!(75000), dec!(0.01), dec!(10.00), dec!(2.50), dec!(1.0), dec!(1.0))),
            ("MES", ContractSpec::new(dec!(1500), dec!(25000), dec!(0.25), dec!(1.25), dec!(0.50), dec!(1.0), dec!(0.5))),
            ("MNQ", ContractSpec::new(dec!(2000), dec!(40000), dec!(0.25), dec!(0.50), dec!(0.50), dec!(1.0), dec!(0.5))),
            ("ZN", ContractSpec::new(dec!(2500), dec!(110000), dec!(0.015625), dec!(15.625), dec!(1.50), dec!(0.5), dec!(0.5))),
            ("UB", ContractSpec::new(dec!(9000), dec!(130000), dec!(0.03125), dec!(31.25), dec!(2.50), dec!(0.0), dec!(0.0))),
            ("6J", ContractSpec::new(dec!(4000), dec!(80000), dec!(0.000001), dec!(12.50), dec!(2.50), dec!(1.0), dec!(0.5))
                .with_point_value(dec!(12.50))),
            ("SI", ContractSpec::new(dec!(10000), dec!(150000), dec!(0.005), dec!(25.00), dec!(2.50), dec!(1.0), dec!(1.0))),
        ];

        Self {
            specs: table
                .into_iter()
                .map(|(symbol, spec)| (symbol.to_string(), spec))
                .collect(),
            fallback: ContractSpec::default(),
        }
    }
}
