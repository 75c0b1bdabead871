//! Rebalance trigger state machine

use super::confirmation::Confirmation;
use crate::filter::CurrencyFilter;
use crate::regime::Regime;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a full position recompute happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    /// Scheduled weekday
    Calendar,
    /// Confirmed regime change
    RegimeChange,
    /// Currency filter turned suspect
    FilterSuspect,
    /// Drawdown warning or hard stop active
    Drawdown,
    /// Confirmed tilt changed today
    TiltChange,
    /// Book is flat but sizing allows exposure
    Forced,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Calendar => "CALENDAR",
            Trigger::RegimeChange => "REGIME_CHANGE",
            Trigger::FilterSuspect => "FILTER_SUSPECT",
            Trigger::Drawdown => "DRAWDOWN",
            Trigger::TiltChange => "TILT_CHANGE",
            Trigger::Forced => "FORCED",
        })
    }
}

/// Everything the scheduler looks at for one day
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInputs {
    pub date: NaiveDate,
    pub regime: Regime,
    pub currency_filter: CurrencyFilter,
    pub drawdown_warning: bool,
    pub drawdown_stop: bool,
    pub tilt_changed: bool,
    pub multiplier: f64,
    pub all_flat: bool,
}

/// Decides whether today is a rebalance day
#[derive(Debug, Clone)]
pub struct RebalanceScheduler {
    weekday: Weekday,
    regime: Confirmation<Regime>,
    previous_filter: CurrencyFilter,
}

impl RebalanceScheduler {
    pub fn new(weekday: Weekday, regime_confirmation_days: u32) -> Self {
        Self {
            weekday,
            regime: Confirmation::new(Regime::Neutral, regime_confirmation_days),
            previous_filter: CurrencyFilter::Neutral,
        }
    }

    /// Regime currently applied after confirmation
    pub fn applied_regime(&self) -> Regime {
        self.regime.confirmed()
    }

    /// Fired triggers for the day; empty means positions carry forward.
    ///
    /// Must be called once per processed day so the regime confirmation and the
    /// previous-filter memory advance.
    pub fn evaluate(&mut self, inputs: &ScheduleInputs) -> Vec<Trigger> {
        let mut triggers = Vec::new();

        if inputs.date.weekday() == self.weekday {
            triggers.push(Trigger::Calendar);
        }
        if self.regime.observe(inputs.regime) {
            triggers.push(Trigger::RegimeChange);
        }
        if inputs.currency_filter == CurrencyFilter::Suspect
            && self.previous_filter != CurrencyFilter::Suspect
        {
            triggers.push(Trigger::FilterSuspect);
        }
        self.previous_filter = inputs.currency_filter;

        if inputs.drawdown_warning || inputs.drawdown_stop {
            triggers.push(Trigger::Drawdown);
        }
        if inputs.tilt_changed {
            triggers.push(Trigger::TiltChange);
        }
        if triggers.is_empty() && inputs.multiplier > 0.0 && inputs.all_flat {
            triggers.push(Trigger::Forced);
        }

        triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 is a Monday
    fn inputs(day: u32) -> ScheduleInputs {
        ScheduleInputs {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            regime: Regime::Neutral,
            currency_filter: CurrencyFilter::Neutral,
            drawdown_warning: false,
            drawdown_stop: false,
            tilt_changed: false,
            multiplier: 0.0,
            all_flat: false,
        }
    }

    #[test]
    fn test_quiet_weekday_has_no_trigger() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        assert!(s.evaluate(&inputs(2)).is_empty());
    }

    #[test]
    fn test_friday_trigger() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        assert_eq!(s.evaluate(&inputs(5)), vec![Trigger::Calendar]);
    }

    #[test]
    fn test_regime_change_after_confirmation() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        let mut day = inputs(1);
        day.regime = Regime::GrowthPositive;
        assert!(s.evaluate(&day).is_empty());
        day.date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(s.evaluate(&day).is_empty());
        day.date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(s.evaluate(&day), vec![Trigger::RegimeChange]);
        assert_eq!(s.applied_regime(), Regime::GrowthPositive);
    }

    #[test]
    fn test_filter_transition_into_suspect_only() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        let mut day = inputs(1);
        day.currency_filter = CurrencyFilter::Suspect;
        assert_eq!(s.evaluate(&day), vec![Trigger::FilterSuspect]);
        day.date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(s.evaluate(&day).is_empty());
    }

    #[test]
    fn test_forced_only_without_other_trigger() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        let mut day = inputs(2);
        day.multiplier = 0.5;
        day.all_flat = true;
        assert_eq!(s.evaluate(&day), vec![Trigger::Forced]);

        day.tilt_changed = true;
        assert_eq!(s.evaluate(&day), vec![Trigger::TiltChange]);

        day.tilt_changed = false;
        day.multiplier = 0.0;
        assert!(s.evaluate(&day).is_empty());
    }

    #[test]
    fn test_drawdown_trigger() {
        let mut s = RebalanceScheduler::new(Weekday::Fri, 3);
        let mut day = inputs(2);
        day.drawdown_stop = true;
        assert_eq!(s.evaluate(&day), vec![Trigger::Drawdown]);
    }
}
