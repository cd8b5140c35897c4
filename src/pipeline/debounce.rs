//! Quiet-window debouncing with injected time.

use std::time::{Duration, Instant};

/// Default quiet window between the last edit and a recompute.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the most recent value until no new value has arrived for `window`.
///
/// Time is passed in by the caller, so behaviour is deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Quiet window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record `value` as the latest and restart the quiet window at `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Yield the latest value once the window has elapsed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = match &self.pending {
            Some((_, pushed_at)) => now.saturating_duration_since(*pushed_at) >= self.window,
            None => false,
        };
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Yield the latest value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// The value waiting for its window to elapse, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
