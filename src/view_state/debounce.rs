//! Trailing-edge debouncing driven by caller-supplied instants.

use std::time::{Duration, Instant};

/// Holds the latest triggered value until `delay` passes with no further
/// trigger.
///
/// Time is passed in rather than read from the clock so the event loop and
/// tests control it.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `value` as the newest state; restarts the delay.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if the delay has elapsed since the last trigger.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
