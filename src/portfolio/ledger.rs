//! Equity, positions and entry prices

use super::contracts::ContractBook;
use crate::series::Series;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Signed contract counts per symbol
pub type PositionMap = BTreeMap<String, i64>;

/// Aligned closing prices per symbol
pub type PriceTable = BTreeMap<String, Series>;

fn price(prices: &PriceTable, symbol: &str, i: usize) -> Option<f64> {
    prices.get(symbol)?.get(i).copied().flatten()
}

/// Portfolio state carried from day to day.
///
/// Every universe symbol always has a position entry (zero when flat); an entry price
/// exists exactly for the non-zero positions.
#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    equity: Decimal,
    positions: PositionMap,
    entry_prices: BTreeMap<String, f64>,
}

impl PortfolioLedger {
    /// Flat book over `universe` with `capital` in cash
    pub fn new<'a>(capital: Decimal, universe: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            equity: capital,
            positions: universe.into_iter().map(|s| (s.to_string(), 0)).collect(),
            entry_prices: BTreeMap::new(),
        }
    }

    pub fn equity(&self) -> Decimal {
        self.equity
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn entry_price(&self, symbol: &str) -> Option<f64> {
        self.entry_prices.get(symbol).copied()
    }

    pub fn all_flat(&self) -> bool {
        self.positions.values().all(|q| *q == 0)
    }

    /// Apply day `i` price changes to equity and return the P&L.
    ///
    /// Positions whose price is undefined today or yesterday contribute nothing.
    pub fn mark_to_market(&mut self, book: &ContractBook, prices: &PriceTable, i: usize) -> Decimal {
        if i == 0 {
            return Decimal::ZERO;
        }

        let mut pnl = 0.0;
        for (symbol, qty) in &self.positions {
            if *qty == 0 {
                continue;
            }
            if let (Some(now), Some(prev)) = (price(prices, symbol, i), price(prices, symbol, i - 1)) {
                pnl += *qty as f64 * (now - prev) * book.spec(symbol).point_value_f64();
            }
        }

        let pnl = Decimal::from_f64(pnl).unwrap_or(Decimal::ZERO);
        self.equity += pnl;
        pnl
    }

    /// Flatten one position, charging the round-trip cost. Returns the cost.
    pub fn close_position(&mut self, book: &ContractBook, symbol: &str) -> Decimal {
        let qty = self.position(symbol);
        if qty == 0 {
            return Decimal::ZERO;
        }
        let cost = book.spec(symbol).round_trip_cost() * Decimal::from(qty.unsigned_abs());
        self.equity -= cost;
        self.positions.insert(symbol.to_string(), 0);
        self.entry_prices.remove(symbol);
        cost
    }

    /// Move every position to its target, charging costs on the absolute change.
    ///
    /// Entry prices are recorded at today's price when a position opens from flat or flips
    /// sign, and dropped when it returns to flat. Symbols missing from `targets` go flat.
    /// Returns the total cost.
    pub fn rebalance_to(
        &mut self,
        book: &ContractBook,
        targets: &PositionMap,
        prices: &PriceTable,
        i: usize,
    ) -> Decimal {
        let mut total_cost = Decimal::ZERO;
        let symbols: Vec<String> = self.positions.keys().cloned().collect();

        for symbol in symbols {
            let old = self.position(&symbol);
            let new = targets.get(&symbol).copied().unwrap_or(0);
            if old == new {
                continue;
            }

            let change = (new - old).unsigned_abs();
            total_cost += book.spec(&symbol).round_trip_cost() * Decimal::from(change);

            if new == 0 {
                self.entry_prices.remove(&symbol);
            } else if old == 0 || old.signum() != new.signum() {
                match price(prices, &symbol, i) {
                    Some(px) => {
                        self.entry_prices.insert(symbol.clone(), px);
                    }
                    None => {
                        self.entry_prices.remove(&symbol);
                    }
                }
            }
            self.positions.insert(symbol, new);
        }

        self.equity -= total_cost;
        total_cost
    }

    /// Total initial margin over equity; zero when equity is not positive
    pub fn margin_utilization(&self, book: &ContractBook) -> f64 {
        margin_utilization(book, &self.positions, self.equity)
    }
}

/// Total initial margin of `positions` over `equity`; zero when equity is not positive
pub fn margin_utilization(book: &ContractBook, positions: &PositionMap, equity: Decimal) -> f64 {
    if equity <= Decimal::ZERO {
        return 0.0;
    }
    let margin: Decimal = positions
        .iter()
        .map(|(s, q)| book.spec(s).margin * Decimal::from(q.unsigned_abs()))
        .sum();
    (margin / equity).to_f64().unwrap_or(0.0)
}
