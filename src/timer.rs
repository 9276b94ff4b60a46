use std::time::Duration;

use crate::constants::MIN_INTERVAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    period: Duration,
    elapsed: Duration,
    armed: bool,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_INTERVAL),
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.elapsed = Duration::ZERO;
        self.armed = false;
    }

    /// Cancels the pending firing and schedules the next one a full period
    /// from now. A disarmed timer stays disarmed.
    pub fn reset(&mut self) {
        if self.armed {
            self.start();
        }
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = period.max(MIN_INTERVAL);
        self.elapsed = self.elapsed.min(self.period);
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.armed.then(|| self.period.saturating_sub(self.elapsed))
    }

    /// Moves the timer forward by `dt`. Returns true when a firing is due;
    /// the timer re-arms itself for the following period.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.elapsed -= self.period;
            true
        } else {
            false
        }
    }
}

/// One-shot timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeout {
    duration: Duration,
    elapsed: Duration,
    pending: bool,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            pending: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.elapsed = Duration::ZERO;
        self.pending = false;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.pending.then(|| self.duration.saturating_sub(self.elapsed))
    }

    pub fn progress(&self) -> Option<f32> {
        if !self.pending {
            return None;
        }
        if self.duration.is_zero() {
            return Some(1.0);
        }
        let ratio = self.elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64;
        Some(ratio.min(1.0) as f32)
    }

    /// Moves the timeout forward by `dt`. Returns true exactly once, when it
    /// expires.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.pending {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.cancel();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn interval_starts_disarmed() {
        let mut timer = IntervalTimer::new(ms(100));
        assert!(!timer.is_armed());
        assert_eq!(timer.remaining(), None);
        assert!(!timer.advance(ms(500)));
    }

    #[test]
    fn interval_fires_every_period() {
        let mut timer = IntervalTimer::new(ms(100));
        timer.start();
        assert!(!timer.advance(ms(99)));
        assert!(timer.advance(ms(1)));
        assert_eq!(timer.remaining(), Some(ms(100)));
        assert!(!timer.advance(ms(50)));
        assert!(timer.advance(ms(50)));
    }

    #[test]
    fn interval_reset_pushes_next_firing_out() {
        let mut timer = IntervalTimer::new(ms(100));
        timer.start();
        timer.advance(ms(80));
        timer.reset();
        assert_eq!(timer.remaining(), Some(ms(100)));
        assert!(!timer.advance(ms(80)));
    }

    #[test]
    fn interval_reset_does_not_arm() {
        let mut timer = IntervalTimer::new(ms(100));
        timer.reset();
        assert!(!timer.is_armed());
    }

    #[test]
    fn interval_cancel_disarms() {
        let mut timer = IntervalTimer::new(ms(100));
        timer.start();
        timer.cancel();
        assert!(!timer.advance(ms(1000)));
    }

    #[test]
    fn zero_period_is_clamped() {
        let timer = IntervalTimer::new(Duration::ZERO);
        assert_eq!(timer.period(), MIN_INTERVAL);
    }

    #[test]
    fn timeout_fires_once() {
        let mut timeout = Timeout::new(ms(300));
        timeout.start();
        assert_eq!(timeout.progress(), Some(0.0));
        assert!(!timeout.advance(ms(150)));
        assert_eq!(timeout.progress(), Some(0.5));
        assert!(timeout.advance(ms(150)));
        assert!(!timeout.is_pending());
        assert!(!timeout.advance(ms(300)));
    }

    #[test]
    fn zero_length_timeout_expires_on_next_advance() {
        let mut timeout = Timeout::new(Duration::ZERO);
        timeout.start();
        assert_eq!(timeout.remaining(), Some(Duration::ZERO));
        assert!(timeout.advance(Duration::ZERO));
    }
}
