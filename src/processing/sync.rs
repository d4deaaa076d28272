//! Delayed, interpolated view updates
//!
//! Fixes arrive irregularly, so rendering the newest fix directly makes the
//! camera and marker stutter. Instead each tick renders the track as it was
//! `delay_factor` sampling periods ago, where the history almost always
//! holds a sample on both sides of the query time and linear interpolation
//! gives a steady motion.

use crate::core::{Coordinate, TrackedSample, FOLLOW_ANCHOR_FRACTION};
use crate::map::{MarkerStyle, View, ViewportSize};
use crate::processing::{Extrapolation, PositionHistory};
use crate::utils::SmoothingConfig;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Outcome of one synchronizer tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    /// Time the tick ran (milliseconds)
    pub now_ms: i64,
    /// Delayed time the history was sampled at (milliseconds)
    pub query_ms: i64,
    /// Interpolated sample
    pub sample: TrackedSample,
    /// View center applied in follow mode
    pub center: Option<Coordinate>,
    /// View rotation applied in follow mode
    pub rotation: Option<f64>,
    /// Marker style applied when a marker is shown
    pub marker_style: Option<MarkerStyle>,
}

impl ViewFrame {
    pub fn new(now_ms: i64, query_ms: i64, sample: TrackedSample) -> Self {
        Self {
            now_ms,
            query_ms,
            sample,
            center: None,
            rotation: None,
            marker_style: None,
        }
    }

    pub fn with_follow(mut self, center: Coordinate, rotation: f64) -> Self {
        self.center = Some(center);
        self.rotation = Some(rotation);
        self
    }

    pub fn with_marker_style(mut self, style: MarkerStyle) -> Self {
        self.marker_style = Some(style);
        self
    }
}

/// Chooses the delayed query time and samples the history at it
#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    sampling_period_ms: f64,
    adaptive_sampling_period: bool,
    delay_factor: f64,
    extrapolation: Extrapolation,
    /// Query time of the previous tick; later queries never go before it
    last_query_ms: Option<i64>,
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self::new(&SmoothingConfig::default())
    }
}

impl ViewSynchronizer {
    pub fn new(settings: &SmoothingConfig) -> Self {
        Self {
            sampling_period_ms: settings.sampling_period_ms,
            adaptive_sampling_period: settings.adaptive_sampling_period,
            delay_factor: settings.delay_factor,
            extrapolation: settings.extrapolation(),
            last_query_ms: None,
        }
    }

    /// Sampling period used for the render delay (milliseconds)
    pub fn sampling_period_ms(&self, history: &PositionHistory) -> f64 {
        if !self.adaptive_sampling_period {
            return self.sampling_period_ms;
        }
        history
            .mean_sampling_interval()
            .filter(|interval| *interval > 0.0)
            .unwrap_or(self.sampling_period_ms)
    }

    /// Delayed query time for a tick at `now_ms`, never earlier than the
    /// previous query
    pub fn next_query_time(&mut self, now_ms: i64, history: &PositionHistory) -> i64 {
        let delay_ms = (self.delay_factor * self.sampling_period_ms(history)).round() as i64;
        let candidate = now_ms.saturating_sub(delay_ms);
        let query_ms = match self.last_query_ms {
            Some(previous) => candidate.max(previous),
            None => candidate,
        };
        self.last_query_ms = Some(query_ms);
        query_ms
    }

    /// Sample the history for a tick at `now_ms`.
    ///
    /// Returns `None` when the history has nothing at the query time; the
    /// tick then leaves the view and marker untouched.
    pub fn tick(&mut self, now_ms: i64, history: &PositionHistory) -> Option<ViewFrame> {
        let query_ms = self.next_query_time(now_ms, history);
        match history.sample_at(query_ms, self.extrapolation) {
            Some(sample) => {
                trace!(now_ms, query_ms, x = sample.x, y = sample.y, heading = sample.heading, "tick sampled");
                Some(ViewFrame::new(now_ms, query_ms, sample))
            }
            None => {
                debug!(now_ms, query_ms, samples = history.len(), "no sample at query time, tick skipped");
                None
            }
        }
    }

    pub fn last_query_ms(&self) -> Option<i64> {
        self.last_query_ms
    }

    /// Forget the previous query time
    pub fn reset(&mut self) {
        self.last_query_ms = None;
    }
}

/// View center that keeps `position` a quarter of the viewport height below
/// the center, along the direction of travel
pub fn follow_center(position: Coordinate, heading: f64, resolution: f64, size: ViewportSize) -> Coordinate {
    let distance = size.height * FOLLOW_ANCHOR_FRACTION * resolution;
    let direction = Vector2::new(heading.sin(), heading.cos());
    position - direction * distance
}

/// Recenter and rotate `view` so the direction of travel points up
pub fn apply_follow(view: &mut dyn View, sample: &TrackedSample) -> (Coordinate, f64) {
    let position = sample.coordinate();
    let center = match (view.resolution(), view.size()) {
        (Some(resolution), Some(size)) => follow_center(position, sample.heading, resolution, size),
        _ => {
            debug!("view size or resolution unknown, centering on position");
            position
        }
    };
    let rotation = -sample.heading;

    view.set_center(center);
    view.set_rotation(rotation);
    (center, rotation)
}
