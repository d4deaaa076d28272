use crate::core::{TrackedSample, HISTORY_CAPACITY};
use crate::processing::heading::unwrap_heading;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

/// Behavior of [`PositionHistory::sample_at`] outside the recorded time span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Queries outside the span yield nothing
    #[default]
    None,
    /// Queries outside the span yield the nearest endpoint sample
    Clamp,
}

/// Bounded, time-ordered track of recent positions with continuous headings
#[derive(Debug, Clone)]
pub struct PositionHistory {
    /// Samples in insertion order, oldest first
    samples: VecDeque<TrackedSample>,
    /// Maximum number of samples retained
    capacity: usize,
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionHistory {
    /// Create a history holding the most recent [`HISTORY_CAPACITY`] samples
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create a history with a custom sample bound
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY) + 1),
            capacity,
        }
    }

    /// Append a raw reading, unwrapping its heading against the latest sample.
    ///
    /// Timestamps earlier than the latest sample are clamped forward so the
    /// history stays non-decreasing in time. Returns the stored sample.
    pub fn append(&mut self, x: f64, y: f64, raw_heading: f64, timestamp_ms: i64) -> TrackedSample {
        let latest = self.samples.back().copied();

        let heading = unwrap_heading(latest.map(|s| s.heading), raw_heading);
        let timestamp_ms = match latest {
            Some(prev) if timestamp_ms < prev.timestamp_ms => {
                warn!(
                    timestamp_ms,
                    latest_ms = prev.timestamp_ms,
                    "out-of-order position sample clamped to latest timestamp"
                );
                prev.timestamp_ms
            }
            _ => timestamp_ms,
        };

        let sample = TrackedSample::new(x, y, heading, timestamp_ms);
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        sample
    }

    /// Interpolate the track at `timestamp_ms`.
    ///
    /// Position and heading are interpolated linearly between the two samples
    /// bracketing the query. Headings are continuous, so interpolating them
    /// directly never sweeps across the ±π seam.
    pub fn sample_at(&self, timestamp_ms: i64, extrapolation: Extrapolation) -> Option<TrackedSample> {
        let first = self.samples.front()?;
        let last = self.samples.back()?;

        if timestamp_ms < first.timestamp_ms || timestamp_ms > last.timestamp_ms {
            let endpoint = if timestamp_ms < first.timestamp_ms { first } else { last };
            return match extrapolation {
                Extrapolation::None => None,
                Extrapolation::Clamp => Some(TrackedSample {
                    timestamp_ms,
                    ..*endpoint
                }),
            };
        }

        // first sample at or after the query; exists because query <= last
        let upper_index = self.samples.partition_point(|s| s.timestamp_ms < timestamp_ms);
        let upper = self.samples[upper_index];
        if upper.timestamp_ms == timestamp_ms || upper_index == 0 {
            return Some(upper);
        }

        let lower = self.samples[upper_index - 1];
        // spans may exceed i64::MAX, so differences are taken in f64
        let span = upper.timestamp_ms as f64 - lower.timestamp_ms as f64;
        let fraction = (timestamp_ms as f64 - lower.timestamp_ms as f64) / span;

        Some(TrackedSample {
            x: lerp(lower.x, upper.x, fraction),
            y: lerp(lower.y, upper.y, fraction),
            heading: lerp(lower.heading, upper.heading, fraction),
            timestamp_ms,
        })
    }

    /// Average spacing between samples (milliseconds), once two are recorded
    pub fn mean_sampling_interval(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let first = self.samples.front()?;
        let last = self.samples.back()?;
        Some((last.timestamp_ms as f64 - first.timestamp_ms as f64) / (self.samples.len() - 1) as f64)
    }

    pub fn latest(&self) -> Option<&TrackedSample> {
        self.samples.back()
    }

    pub fn earliest(&self) -> Option<&TrackedSample> {
        self.samples.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copy of the retained samples, oldest first
    pub fn to_vec(&self) -> Vec<TrackedSample> {
        self.samples.iter().copied().collect()
    }
}

fn lerp(from: f64, to: f64, fraction: f64) -> f64 {
    from + (to - from) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_interpolates_midpoint() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 0.0, 0);
        history.append(10.0, 0.0, 0.0, 1000);

        let sample = history.sample_at(500, Extrapolation::None).unwrap();
        assert_relative_eq!(sample.x, 5.0);
        assert_relative_eq!(sample.y, 0.0);
        assert_relative_eq!(sample.heading, 0.0);
        assert_eq!(sample.timestamp_ms, 500);
    }

    #[test]
    fn test_exact_timestamp_returns_stored_sample() {
        let mut history = PositionHistory::new();
        history.append(1.0, 2.0, 0.1, 100);
        history.append(3.0, 4.0, 0.2, 200);

        assert_eq!(history.sample_at(100, Extrapolation::None).unwrap(), TrackedSample::new(1.0, 2.0, 0.1, 100));
        assert_eq!(history.sample_at(200, Extrapolation::None).unwrap(), TrackedSample::new(3.0, 4.0, 0.2, 200));
    }

    #[test]
    fn test_empty_history_has_no_sample() {
        let history = PositionHistory::new();
        assert!(history.sample_at(0, Extrapolation::None).is_none());
        assert!(history.sample_at(0, Extrapolation::Clamp).is_none());
    }

    #[test]
    fn test_out_of_span_queries() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 0.0, 1000);
        history.append(10.0, 5.0, 0.5, 2000);

        assert!(history.sample_at(999, Extrapolation::None).is_none());
        assert!(history.sample_at(2001, Extrapolation::None).is_none());

        let before = history.sample_at(0, Extrapolation::Clamp).unwrap();
        assert_eq!((before.x, before.y, before.timestamp_ms), (0.0, 0.0, 0));

        let after = history.sample_at(5000, Extrapolation::Clamp).unwrap();
        assert_eq!((after.x, after.y, after.heading), (10.0, 5.0, 0.5));
        assert_eq!(after.timestamp_ms, 5000);
    }

    #[test]
    fn test_interpolation_across_heading_seam() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, PI - 0.1, 0);
        history.append(0.0, 0.0, -PI + 0.1, 1000);

        // continuous heading passes through π, not through 0
        let mid = history.sample_at(500, Extrapolation::None).unwrap();
        assert_relative_eq!(mid.heading, PI, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_order_timestamp_is_clamped() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 0.0, 1000);
        let sample = history.append(1.0, 0.0, 0.0, 900);

        assert_eq!(sample.timestamp_ms, 1000);
        let stamps: Vec<i64> = history.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![1000, 1000]);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_divide_by_zero() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 0.0, 1000);
        history.append(5.0, 0.0, 0.0, 1000);
        history.append(10.0, 0.0, 0.0, 2000);

        let sample = history.sample_at(1500, Extrapolation::None).unwrap();
        assert_relative_eq!(sample.x, 7.5);
        assert!(history.sample_at(1000, Extrapolation::None).unwrap().x.is_finite());
    }

    #[test]
    fn test_mean_sampling_interval() {
        let mut history = PositionHistory::new();
        assert!(history.mean_sampling_interval().is_none());
        history.append(0.0, 0.0, 0.0, 0);
        assert!(history.mean_sampling_interval().is_none());
        history.append(0.0, 0.0, 0.0, 400);
        history.append(0.0, 0.0, 0.0, 1000);
        assert_relative_eq!(history.mean_sampling_interval().unwrap(), 500.0);
    }

    #[test]
    fn test_extreme_timestamp_span() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 0.0, i64::MIN);
        history.append(10.0, 0.0, 0.0, i64::MAX);

        let interval = history.mean_sampling_interval().unwrap();
        assert!(interval.is_finite() && interval > 0.0);

        let mid = history.sample_at(0, Extrapolation::None).unwrap();
        assert_relative_eq!(mid.x, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_oversized_capacity_does_not_preallocate() {
        let mut history = PositionHistory::with_capacity(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);

        history.append(1.0, 0.0, 0.0, 0);
        history.append(2.0, 0.0, 0.0, 10);
        assert_eq!(history.earliest().map(|s| s.x), Some(1.0));
        assert_eq!(history.latest().map(|s| s.x), Some(2.0));
    }

    #[test]
    fn test_clear_resets_heading_reference() {
        let mut history = PositionHistory::new();
        history.append(0.0, 0.0, 3.0, 0);
        history.clear();
        assert!(history.is_empty());

        let sample = history.append(0.0, 0.0, -3.0, 10);
        assert_eq!(sample.heading, -3.0);
    }

    proptest! {
        #[test]
        fn prop_history_keeps_most_recent_samples_in_order(count in 21usize..120) {
            let mut history = PositionHistory::new();
            for i in 0..count {
                history.append(i as f64, 0.0, 0.0, (i as i64) * 100);
            }

            prop_assert_eq!(history.len(), HISTORY_CAPACITY);
            let xs: Vec<f64> = history.iter().map(|s| s.x).collect();
            let expected: Vec<f64> = ((count - HISTORY_CAPACITY)..count).map(|i| i as f64).collect();
            prop_assert_eq!(xs, expected);
        }

        #[test]
        fn prop_stored_headings_are_continuous(raw in proptest::collection::vec(-PI..PI, 2..60)) {
            let mut history = PositionHistory::new();
            for (i, heading) in raw.iter().enumerate() {
                history.append(0.0, 0.0, *heading, i as i64 * 250);
            }

            let headings: Vec<f64> = history.iter().map(|s| s.heading).collect();
            for pair in headings.windows(2) {
                prop_assert!((pair[1] - pair[0]).abs() <= PI + 1e-9);
            }
        }
    }
}
