//! Daily backtest loop

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::error::EngineError;
use super::features::Features;
use super::observer::SignalObserver;
use super::record::DailySignal;
use crate::config::Config;
use crate::data::DataProvider;
use crate::filter::{FilterLayer, FilterState};
use crate::portfolio::{ContractBook, PortfolioLedger, UNIVERSE};
use crate::regime::{Regime, RegimeClassifier};
use crate::risk::{DrawdownLimits, DrawdownMonitor, DrawdownStatus, SizeMultiplier, StopLossRule};
use crate::schedule::{RebalanceScheduler, ScheduleInputs, TiltDebouncer};
use crate::signal::{RatioSignalLayer, Tilt};
use crate::sizing::{create_sizer, PositionSizer, SizingContext};

/// Everything carried from one day to the next
#[derive(Debug, Clone)]
pub struct RunState {
    pub ledger: PortfolioLedger,
    pub drawdown: DrawdownMonitor,
    pub debouncer: TiltDebouncer,
    pub scheduler: RebalanceScheduler,
    /// Drawdown classification of the last processed day
    pub drawdown_status: DrawdownStatus,
    /// Equity at the end of the last processed day
    pub last_equity: Decimal,
}

impl RunState {
    /// Flat book at the configured initial capital
    pub fn new(config: &Config) -> Self {
        let capital = config.backtest.initial_capital;
        let signal = &config.strategy.signal;
        Self {
            ledger: PortfolioLedger::new(capital, UNIVERSE),
            drawdown: DrawdownMonitor::new(capital),
            debouncer: TiltDebouncer::new(signal.min_hold_days, signal.flip_lookback_days),
            scheduler: RebalanceScheduler::new(
                config.backtest.rebalance_weekday,
                config.strategy.regime.confirmation_days,
            ),
            drawdown_status: DrawdownStatus::Normal,
            last_equity: capital,
        }
    }
}

/// Drives the per-day decision pipeline over precomputed features
pub struct Backtester {
    config: Config,
    book: ContractBook,
    features: Features,
    signal_layer: RatioSignalLayer,
    classifier: RegimeClassifier,
    filter_layer: FilterLayer,
    multiplier: SizeMultiplier,
    limits: DrawdownLimits,
    stop_rule: StopLossRule,
    sizer: Box<dyn PositionSizer>,
}

impl Backtester {
    /// Precompute features from `provider` and assemble the layers
    pub fn new(config: Config, provider: &dyn DataProvider) -> Result<Self, EngineError> {
        let book = ContractBook::with_overrides(&config.contracts);
        let features = Features::compute(&config, provider, &book)?;
        let strategy = &config.strategy;

        Ok(Self {
            signal_layer: RatioSignalLayer::new(strategy.signal.clone(), features.ratio.clone()),
            classifier: RegimeClassifier::new(strategy.regime.clone(), features.regime.clone()),
            filter_layer: FilterLayer::new(strategy.filter.clone(), features.filter.clone()),
            multiplier: SizeMultiplier::new(config.risk.clone(), strategy.regime.liquidity_threshold),
            limits: DrawdownLimits::from_config(&config.risk),
            stop_rule: StopLossRule::new(config.risk.stop_atr_multiple),
            sizer: create_sizer(&config.sizing),
            book,
            features,
            config,
        })
    }

    /// Replace the configured sizer
    pub fn with_sizer(mut self, sizer: Box<dyn PositionSizer>) -> Self {
        self.sizer = sizer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn contracts(&self) -> &ContractBook {
        &self.book
    }

    pub fn sizing_mode(&self) -> &'static str {
        self.sizer.mode_name()
    }

    /// Fresh run state for this configuration
    pub fn initial_state(&self) -> RunState {
        RunState::new(&self.config)
    }

    /// Run every day and return the records
    pub fn run(&self) -> Vec<DailySignal> {
        self.run_with(&mut [])
    }

    /// Run every day, notifying `observers` with each record as it is produced
    pub fn run_with(&self, observers: &mut [&mut dyn SignalObserver]) -> Vec<DailySignal> {
        let mut state = self.initial_state();
        let mut signals = Vec::with_capacity(self.features.len());

        for i in 0..self.features.len() {
            if let Some(signal) = self.step(i, &mut state) {
                for observer in observers.iter_mut() {
                    observer.on_signal(&signal);
                }
                signals.push(signal);
            }
        }

        tracing::info!(
            days = signals.len(),
            skipped = self.features.len() - signals.len(),
            rebalances = signals.iter().filter(|s| s.rebalanced).count(),
            final_equity = %state.ledger.equity(),
            mode = self.sizer.mode_name(),
            "Backtest complete"
        );
        signals
    }

    /// Process day `i`. Returns `None`, leaving `state` untouched, when the ratio is undefined.
    pub fn step(&self, i: usize, state: &mut RunState) -> Option<DailySignal> {
        let ratio = self.signal_layer.evaluate(i)?;
        let f = &self.features;
        let date = f.calendar.date(i);

        let tilt = state.debouncer.update(i, ratio.raw_tilt);
        let macro_reading = self.classifier.evaluate(i);
        let filters = self.filter_layer.evaluate(i, tilt.confirmed);
        let regime = macro_reading.regime;
        let base_multiplier =
            self.multiplier
                .compute(regime, tilt.confirmed, macro_reading.liquidity.score, &filters);

        // Yesterday's book earns today's move before anything trades
        state.ledger.mark_to_market(&self.book, &f.closes, i);
        let mut transaction_cost = Decimal::ZERO;
        let stopped_out = self.apply_stops(i, state, &mut transaction_cost);

        state.drawdown.update(state.ledger.equity());
        let drawdown = state.drawdown.current_drawdown();
        let status = state.drawdown.check(&self.limits);
        self.log_drawdown_transition(i, state.drawdown_status, status);
        state.drawdown_status = status;
        if status.is_stop() && state.ledger.all_flat() {
            state.drawdown.reset_peak();
        }
        let size_multiplier = self.multiplier.apply_drawdown(base_multiplier, status);

        let triggers = state.scheduler.evaluate(&ScheduleInputs {
            date,
            regime,
            currency_filter: filters.currency_filter,
            drawdown_warning: status.is_warning(),
            drawdown_stop: status.is_stop(),
            tilt_changed: tilt.changed,
            multiplier: size_multiplier,
            all_flat: state.ledger.all_flat(),
        });
        let rebalanced = !triggers.is_empty();

        let margin_utilization = if rebalanced {
            let (cost, margin) =
                self.rebalance(i, state, size_multiplier, (tilt.confirmed, regime), &filters, &stopped_out);
            transaction_cost += cost;
            tracing::debug!(
                date = %date,
                triggers = ?triggers,
                cost = %cost,
                positions = ?state.ledger.positions(),
                "Positions rebalanced"
            );
            margin
        } else {
            state.ledger.margin_utilization(&self.book)
        };

        let equity = state.ledger.equity();
        self.check_equity_swing(i, state.last_equity, equity);
        state.last_equity = equity;

        Some(DailySignal {
            date,
            ratio,
            tilt: tilt.confirmed,
            macro_reading,
            applied_regime: state.scheduler.applied_regime(),
            filters,
            size_multiplier,
            drawdown,
            drawdown_warning: status.is_warning(),
            drawdown_stop: status.is_stop(),
            rebalanced,
            triggers,
            stopped_out,
            positions: state.ledger.positions().clone(),
            equity,
            margin_utilization,
            trailing_flips: tilt.trailing_flips,
            transaction_cost,
            benchmark: f.benchmark.get(i).copied().flatten(),
        })
    }

    /// Close positions whose open loss exceeds the ATR stop
    fn apply_stops(&self, i: usize, state: &mut RunState, cost: &mut Decimal) -> Vec<String> {
        let f = &self.features;
        let open: Vec<(String, i64)> = state
            .ledger
            .positions()
            .iter()
            .filter(|(_, q)| **q != 0)
            .map(|(s, q)| (s.clone(), *q))
            .collect();

        let mut stopped = Vec::new();
        for (symbol, qty) in open {
            let Some(price) = f.close(&symbol, i) else {
                continue;
            };
            let entry = state.ledger.entry_price(&symbol);
            let point_value = self.book.spec(&symbol).point_value_f64();
            if self
                .stop_rule
                .should_stop(qty, price, entry, f.stop_atr(&symbol, i), point_value)
            {
                *cost += state.ledger.close_position(&self.book, &symbol);
                tracing::info!(
                    date = %f.calendar.date(i),
                    symbol = %symbol,
                    qty,
                    entry = ?entry,
                    price,
                    "Stop-loss exit"
                );
                stopped.push(symbol);
            }
        }
        stopped
    }

    /// Size and trade to today's targets. Returns the cost and the reported margin utilisation.
    fn rebalance(
        &self,
        i: usize,
        state: &mut RunState,
        multiplier: f64,
        (tilt, regime): (Tilt, Regime),
        filters: &FilterState,
        stopped_out: &[String],
    ) -> (Decimal, f64) {
        let f = &self.features;
        let mut blocked: BTreeSet<String> = stopped_out.iter().cloned().collect();
        blocked.extend(
            UNIVERSE
                .iter()
                .filter(|s| f.close(s, i).is_none())
                .map(|s| s.to_string()),
        );

        let sized = self.sizer.targets(&SizingContext {
            equity: state.ledger.equity(),
            multiplier,
            tilt,
            regime,
            filters,
            volatility_adjustment: f.volatility_adjustment.get(i).copied().flatten(),
            blocked: &blocked,
            book: &self.book,
        });

        let cost = state.ledger.rebalance_to(&self.book, &sized.targets, &f.closes, i);
        (cost, sized.margin_utilization)
    }

    fn log_drawdown_transition(&self, i: usize, previous: DrawdownStatus, current: DrawdownStatus) {
        let date = self.features.calendar.date(i);
        match current {
            DrawdownStatus::Stop(dd) if !previous.is_stop() => {
                tracing::warn!(date = %date, drawdown = %dd, "Drawdown hard stop, exposure zeroed");
            }
            DrawdownStatus::Warning(dd) if !previous.is_warning() => {
                tracing::warn!(date = %date, drawdown = %dd, "Drawdown warning, exposure halved");
            }
            DrawdownStatus::Normal if previous != DrawdownStatus::Normal => {
                tracing::info!(date = %date, "Drawdown back within limits");
            }
            _ => {}
        }
    }

    fn check_equity_swing(&self, i: usize, previous: Decimal, current: Decimal) {
        let (Some(prev), Some(now)) = (previous.to_f64(), current.to_f64()) else {
            return;
        };
        if prev <= 0.0 {
            return;
        }
        let change = now / prev - 1.0;
        if change.abs() > self.config.backtest.equity_swing_threshold {
            tracing::warn!(
                date = %self.features.calendar.date(i),
                previous = prev,
                equity = now,
                pct = change * 100.0,
                "Large equity swing"
            );
        }
    }
}
