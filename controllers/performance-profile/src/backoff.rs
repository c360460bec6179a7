//! # Fibonacci Backoff
//!
//! Retry delays for failed reconciliations. Grows more slowly than
//! exponential backoff so a profile blocked on a transient API error is
//! retried promptly, while a persistent failure settles at the cap.
//!
//! Sequence with a 5s minimum and 300s cap: 5s, 5s, 10s, 15s, 25s, 40s, 65s,
//! 105s, 170s, 275s, 300s, 300s, ...

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff in seconds
    prev_secs: u64,
    /// Current backoff in seconds
    current_secs: u64,
    /// Maximum backoff in seconds
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff between `min` and `max`.
    ///
    /// Sub-second precision is dropped; a zero minimum is raised to one second.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min_secs = min.as_secs().max(1);
        Self {
            prev_secs: 0,
            current_secs: min_secs,
            max_secs: max.as_secs().max(min_secs),
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_secs;

        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);

        Duration::from_secs(result)
    }
}
