//! N-consecutive-day confirmation primitive

/// Promotes a new state only after it has been observed on `required` consecutive days.
///
/// Observing the confirmed state clears any pending candidate. Observing a different state
/// either extends the pending run (same candidate) or starts a new run of length one.
#[derive(Debug, Clone)]
pub struct Confirmation<T> {
    confirmed: T,
    candidate: T,
    count: u32,
    required: u32,
}

impl<T: Copy + PartialEq> Confirmation<T> {
    /// Start confirmed in `initial`, requiring `required` consecutive observations to change
    pub fn new(initial: T, required: u32) -> Self {
        Self {
            confirmed: initial,
            candidate: initial,
            count: 0,
            required: required.max(1),
        }
    }

    /// Feed one observation. Returns `true` when this observation promoted a new state.
    pub fn observe(&mut self, raw: T) -> bool {
        if raw == self.confirmed {
            self.candidate = raw;
            self.count = 0;
            return false;
        }

        if raw == self.candidate {
            self.count += 1;
        } else {
            self.candidate = raw;
            self.count = 1;
        }

        if self.count >= self.required {
            self.confirmed = self.candidate;
            self.count = 0;
            return true;
        }
        false
    }

    pub fn confirmed(&self) -> T {
        self.confirmed
    }

    /// Length of the current pending run
    pub fn pending(&self) -> u32 {
        self.count
    }
}
