//! Minimum-hold tilt debouncer with flip-rate tracking

use super::confirmation::Confirmation;
use crate::signal::Tilt;
use std::collections::VecDeque;

/// Debounced tilt for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiltUpdate {
    pub confirmed: Tilt,
    /// Confirmed tilt differs from the previous day's
    pub changed: bool,
    /// Confirmed flips within the trailing lookback
    pub trailing_flips: usize,
}

/// Converts raw tilts into confirmed tilts
#[derive(Debug, Clone)]
pub struct TiltDebouncer {
    confirmation: Confirmation<Tilt>,
    previous: Tilt,
    flips: VecDeque<usize>,
    lookback: usize,
}

impl TiltDebouncer {
    pub fn new(min_hold_days: u32, lookback: usize) -> Self {
        Self {
            confirmation: Confirmation::new(Tilt::Neutral, min_hold_days),
            previous: Tilt::Neutral,
            flips: VecDeque::new(),
            lookback,
        }
    }

    /// Feed the raw tilt of day `i`
    pub fn update(&mut self, i: usize, raw: Tilt) -> TiltUpdate {
        self.confirmation.observe(raw);
        let confirmed = self.confirmation.confirmed();
        let changed = confirmed != self.previous;
        self.previous = confirmed;

        if changed {
            self.flips.push_back(i);
        }
        while let Some(&front) = self.flips.front() {
            if i - front > self.lookback {
                self.flips.pop_front();
            } else {
                break;
            }
        }

        TiltUpdate {
            confirmed,
            changed,
            trailing_flips: self.flips.len(),
        }
    }

    pub fn confirmed(&self) -> Tilt {
        self.confirmation.confirmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_excursion_never_confirms() {
        let mut d = TiltDebouncer::new(5, 252);
        let raws = [
            Tilt::RiskOn,
            Tilt::RiskOn,
            Tilt::RiskOn,
            Tilt::RiskOn,
            Tilt::Neutral,
            Tilt::RiskOn,
        ];
        for (i, raw) in raws.into_iter().enumerate() {
            let u = d.update(i, raw);
            assert_eq!(u.confirmed, Tilt::Neutral);
            assert!(!u.changed);
        }
    }

    #[test]
    fn test_confirms_on_fifth_day() {
        let mut d = TiltDebouncer::new(5, 252);
        for i in 0..4 {
            assert!(!d.update(i, Tilt::RiskOff).changed);
        }
        let u = d.update(4, Tilt::RiskOff);
        assert!(u.changed);
        assert_eq!(u.confirmed, Tilt::RiskOff);
        assert_eq!(u.trailing_flips, 1);

        let u = d.update(5, Tilt::RiskOff);
        assert!(!u.changed);
    }

    #[test]
    fn test_flip_queue_evicts_after_lookback() {
        let mut d = TiltDebouncer::new(1, 10);
        assert_eq!(d.update(0, Tilt::RiskOn).trailing_flips, 1);
        assert_eq!(d.update(10, Tilt::RiskOn).trailing_flips, 1);
        assert_eq!(d.update(11, Tilt::RiskOn).trailing_flips, 0);
        assert_eq!(d.update(12, Tilt::RiskOff).trailing_flips, 1);
    }
}
