//! Prometheus metrics

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current equity
    Equity,
    /// Current drawdown from peak
    Drawdown,
    /// Margin-to-equity utilisation
    MarginUtilization,
    /// Final size multiplier
    SizeMultiplier,
    /// Copper/gold notional ratio
    Ratio,
    /// Composite ratio score
    Composite,
    /// Liquidity score
    Liquidity,
    /// Average pairwise return correlation
    AverageCorrelation,
    /// Confirmed tilt flips in the trailing year
    TrailingFlips,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Days processed
    Days,
    /// Rebalance days
    Rebalances,
    /// Positions closed by the stop-loss rule
    StopOuts,
    /// Days with the drawdown hard stop active
    HardStops,
}

impl GaugeMetric {
    /// Exported metric name
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::Equity => "cugold_equity_usd",
            GaugeMetric::Drawdown => "cugold_drawdown_ratio",
            GaugeMetric::MarginUtilization => "cugold_margin_utilization_ratio",
            GaugeMetric::SizeMultiplier => "cugold_size_multiplier",
            GaugeMetric::Ratio => "cugold_ratio",
            GaugeMetric::Composite => "cugold_composite_score",
            GaugeMetric::Liquidity => "cugold_liquidity_score",
            GaugeMetric::AverageCorrelation => "cugold_average_correlation",
            GaugeMetric::TrailingFlips => "cugold_trailing_flips",
        }
    }
}

impl CounterMetric {
    /// Exported metric name
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::Days => "cugold_days_total",
            CounterMetric::Rebalances => "cugold_rebalances_total",
            CounterMetric::StopOuts => "cugold_stop_outs_total",
            CounterMetric::HardStops => "cugold_hard_stop_days_total",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, by: u64) {
    ::metrics::counter!(metric.name()).increment(by);
}
