//! Notional and margin caps applied to raw targets

use crate::portfolio::{margin_utilization, single_notional_limit, AssetClass, ContractBook, PositionMap};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

fn notional(book: &ContractBook, symbol: &str) -> f64 {
    book.spec(symbol).notional.to_f64().unwrap_or(0.0)
}

fn scale_round(qty: i64, scale: f64) -> i64 {
    (qty as f64 * scale + 0.5).floor() as i64
}

/// Clamp each instrument with a limit to `floor(equity * limit / notional)` contracts
pub fn apply_single_limits(book: &ContractBook, targets: &mut PositionMap, equity: f64) {
    for (symbol, qty) in targets.iter_mut() {
        let Some(limit) = single_notional_limit(symbol) else {
            continue;
        };
        let unit = notional(book, symbol);
        if unit <= 0.0 {
            continue;
        }
        let max_qty = (equity * limit / unit).floor().max(0.0) as i64;
        if qty.abs() > max_qty {
            *qty = max_qty * qty.signum();
        }
    }
}

/// Scale every member of `class` down when the group's gross notional exceeds `cap * equity`
pub fn apply_group_cap(
    book: &ContractBook,
    targets: &mut PositionMap,
    class: AssetClass,
    cap: f64,
    equity: f64,
) {
    let gross: f64 = targets
        .iter()
        .filter(|(s, _)| AssetClass::of(s) == class)
        .map(|(s, q)| q.abs() as f64 * notional(book, s))
        .sum();
    let ceiling = equity * cap;
    if gross <= ceiling || gross <= 0.0 {
        return;
    }

    let scale = ceiling / gross;
    for (symbol, qty) in targets.iter_mut() {
        if AssetClass::of(symbol) == class {
            *qty = scale_round(*qty, scale);
        }
    }
}

/// Scale the whole book when margin utilisation exceeds `max_utilization`.
///
/// Returns the utilisation to report, clamped to the ceiling when scaling happened.
pub fn apply_margin_cap(
    book: &ContractBook,
    targets: &mut PositionMap,
    equity: Decimal,
    max_utilization: f64,
) -> f64 {
    let utilization = margin_utilization(book, targets, equity);
    if utilization <= max_utilization || utilization <= 0.0 {
        return utilization;
    }

    let scale = max_utilization / utilization;
    for qty in targets.values_mut() {
        *qty = scale_round(*qty, scale);
    }
    max_utilization
}
