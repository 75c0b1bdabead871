//! Observers notified with each emitted record

use rust_decimal::prelude::ToPrimitive;

use super::record::DailySignal;
use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};

/// Receives every daily record in order
pub trait SignalObserver {
    fn on_signal(&mut self, signal: &DailySignal);
}

/// Logs a one-line summary per day, at `info` on rebalance days and `debug` otherwise
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl SignalObserver for LoggingObserver {
    fn on_signal(&mut self, s: &DailySignal) {
        if s.rebalanced {
            tracing::info!(
                date = %s.date,
                tilt = %s.tilt,
                regime = %s.regime(),
                multiplier = s.size_multiplier,
                equity = %s.equity,
                margin = s.margin_utilization,
                triggers = ?s.triggers,
                "Rebalance"
            );
        } else {
            tracing::debug!(
                date = %s.date,
                tilt = %s.tilt,
                regime = %s.regime(),
                equity = %s.equity,
                "Carry"
            );
        }
    }
}

/// Publishes gauges and counters through the `metrics` facade
#[derive(Debug, Default)]
pub struct MetricsObserver;

impl SignalObserver for MetricsObserver {
    fn on_signal(&mut self, s: &DailySignal) {
        set_gauge(GaugeMetric::Equity, s.equity.to_f64().unwrap_or(0.0));
        set_gauge(GaugeMetric::Drawdown, s.drawdown.to_f64().unwrap_or(0.0));
        set_gauge(GaugeMetric::MarginUtilization, s.margin_utilization);
        set_gauge(GaugeMetric::SizeMultiplier, s.size_multiplier);
        set_gauge(GaugeMetric::Ratio, s.ratio.ratio);
        set_gauge(GaugeMetric::Composite, s.ratio.composite.unwrap_or(0.0));
        set_gauge(GaugeMetric::Liquidity, s.macro_reading.liquidity.score);
        set_gauge(GaugeMetric::AverageCorrelation, s.filters.average_correlation);
        set_gauge(GaugeMetric::TrailingFlips, s.trailing_flips as f64);

        increment_counter(CounterMetric::Days, 1);
        if s.rebalanced {
            increment_counter(CounterMetric::Rebalances, 1);
        }
        if !s.stopped_out.is_empty() {
            increment_counter(CounterMetric::StopOuts, s.stopped_out.len() as u64);
        }
        if s.drawdown_stop {
            increment_counter(CounterMetric::HardStops, 1);
        }
    }
}

/// Collects every record; handy in tests and for post-run exports
#[derive(Debug, Default)]
pub struct CollectingObserver {
    pub signals: Vec<DailySignal>,
}

impl SignalObserver for CollectingObserver {
    fn on_signal(&mut self, signal: &DailySignal) {
        self.signals.push(signal.clone());
    }
}
