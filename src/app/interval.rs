//! Cooperative interval gate.
//!
//! Not a scheduler: the loop asks [`IntervalGate::is_due`] before doing
//! something expensive (remote poll, link check) and calls
//! [`IntervalGate::mark`] once it has done it.  Times are wrapping
//! millisecond counters, so the 49-day `u32` wrap is harmless.

#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval_ms: u32,
    last_ms: u32,
}

impl IntervalGate {
    /// The first action becomes due `interval_ms` after time zero.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
        }
    }

    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_ms) >= self.interval_ms
    }

    pub fn mark(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    /// `is_due` followed by `mark` when due.
    pub fn try_fire(&mut self, now_ms: u32) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fire_after_one_interval() {
        let mut gate = IntervalGate::new(3000);
        assert!(!gate.try_fire(0));
        assert!(!gate.try_fire(2999));
        assert!(gate.try_fire(3000));
    }

    #[test]
    fn gate_rearms_from_last_mark() {
        let mut gate = IntervalGate::new(3000);
        assert!(gate.try_fire(5000));
        assert!(!gate.is_due(7999));
        assert!(gate.is_due(8000));
    }

    #[test]
    fn unmarked_gate_stays_due() {
        let gate = IntervalGate::new(100);
        assert!(gate.is_due(150));
        assert!(gate.is_due(10_000));
    }

    #[test]
    fn wrap_around_is_handled() {
        let mut gate = IntervalGate::new(1000);
        gate.mark(u32::MAX - 100);
        assert!(!gate.is_due(500));
        assert!(gate.is_due(900));
    }
}
