//! Per-position ATR stop-loss

/// Closes a position once its open loss exceeds a multiple of its dollar ATR
#[derive(Debug, Clone, Copy)]
pub struct StopLossRule {
    pub atr_multiple: f64,
}

impl StopLossRule {
    pub fn new(atr_multiple: f64) -> Self {
        Self { atr_multiple }
    }

    /// Whether the position should be stopped out at `price`.
    ///
    /// Requires a positive ATR and a known entry price; otherwise the position stays open.
    pub fn should_stop(
        &self,
        qty: i64,
        price: f64,
        entry: Option<f64>,
        atr: Option<f64>,
        point_value: f64,
    ) -> bool {
        let (Some(entry), Some(atr)) = (entry, atr) else {
            return false;
        };
        if qty == 0 || atr <= 0.0 {
            return false;
        }
        let qty = qty as f64;
        let loss = -(qty * (price - entry) * point_value);
        let dollar_atr = atr * qty.abs() * point_value;
        loss > self.atr_multiple * dollar_atr
    }
}

impl Default for StopLossRule {
    fn default() -> Self {
        Self { atr_multiple: 2.0 }
    }
}
