use std::time::Duration;

use crate::constants::{DEFAULT_INTERVAL, DEFAULT_TRANSITION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub auto_advance: bool,
    pub interval: Duration,
    pub transition: Duration,
    pub compact: bool,
}

impl ControllerConfig {
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_advance: true,
            interval: DEFAULT_INTERVAL,
            transition: DEFAULT_TRANSITION,
            compact: false,
        }
    }
}
