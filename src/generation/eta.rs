//! Rolling-average completion estimate.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent chunk timings averaged by default.
pub const DEFAULT_ETA_WINDOW: usize = 5;

/// Estimates time remaining from the last few chunk durations.
#[derive(Debug, Clone)]
pub struct EtaEstimator {
    recent: VecDeque<Duration>,
    window: usize,
}

impl Default for EtaEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ETA_WINDOW)
    }
}

impl EtaEstimator {
    /// Creates an estimator averaging over `window` chunks (at least one).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            recent: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Records how long one chunk took.
    pub fn record(&mut self, elapsed: Duration) {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(elapsed);
    }

    /// Mean duration of the recorded chunks, if any.
    pub fn average(&self) -> Option<Duration> {
        if self.recent.is_empty() {
            return None;
        }
        let total: Duration = self.recent.iter().sum();
        Some(total / self.recent.len() as u32)
    }

    /// Estimated time for `remaining_chunks` more chunks.
    pub fn estimate(&self, remaining_chunks: usize) -> Option<Duration> {
        self.average()
            .map(|avg| avg.saturating_mul(remaining_chunks as u32))
    }

    /// Forgets all recorded timings.
    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_estimate_before_first_chunk() {
        let eta = EtaEstimator::default();
        assert!(eta.estimate(10).is_none());
    }

    #[test]
    fn averages_recorded_chunks() {
        let mut eta = EtaEstimator::new(5);
        eta.record(Duration::from_secs(2));
        eta.record(Duration::from_secs(4));

        assert_eq!(eta.average(), Some(Duration::from_secs(3)));
        assert_eq!(eta.estimate(10), Some(Duration::from_secs(30)));
        assert_eq!(eta.estimate(0), Some(Duration::ZERO));
    }

    #[test]
    fn only_last_window_counts() {
        let mut eta = EtaEstimator::new(5);
        for _ in 0..5 {
            eta.record(Duration::from_secs(100));
        }
        for _ in 0..5 {
            eta.record(Duration::from_secs(1));
        }
        assert_eq!(eta.average(), Some(Duration::from_secs(1)));

        eta.reset();
        assert!(eta.average().is_none());
    }
}
