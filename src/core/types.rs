//! Core data types for position tracking

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Map coordinate in the view projection
pub type Coordinate = Point2<f64>;

/// One corrected entry of the position history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedSample {
    pub x: f64,
    pub y: f64,
    /// Continuous heading in radians, not wrapped to [-π, π]
    pub heading: f64,
    pub timestamp_ms: i64,
}

impl TrackedSample {
    pub fn new(x: f64, y: f64, heading: f64, timestamp_ms: i64) -> Self {
        Self { x, y, heading, timestamp_ms }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// Raw reading delivered by a positioning source with each change event
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionFix {
    pub position: Option<[f64; 2]>,
    /// Heading in radians, clockwise from north
    pub heading: Option<f64>,
    /// Ground speed (m/s)
    pub speed: Option<f64>,
    /// Horizontal accuracy (meters)
    pub accuracy: f64,
}

impl PositionFix {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some([x, y]),
            ..Default::default()
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }
}

/// Filtered update handed to the change callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub position: Coordinate,
    pub accuracy: f64,
    pub heading: f64,
    pub speed: f64,
}

impl PositionUpdate {
    /// Accept a raw fix, defaulting missing heading and speed to zero.
    /// Returns `None` when the fix carries no usable position.
    pub fn from_fix(fix: &PositionFix) -> Option<Self> {
        let [x, y] = fix.position?;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        Some(Self {
            position: Coordinate::new(x, y),
            accuracy: fix.accuracy,
            heading: finite_or_zero(fix.heading),
            speed: finite_or_zero(fix.speed),
        })
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_defaults_missing_heading_and_speed() {
        let fix = PositionFix::at(1.0, 2.0).with_accuracy(5.0);
        let update = PositionUpdate::from_fix(&fix).unwrap();

        assert_eq!(update.position, Coordinate::new(1.0, 2.0));
        assert_eq!(update.heading, 0.0);
        assert_eq!(update.speed, 0.0);
        assert_eq!(update.accuracy, 5.0);
    }

    #[test]
    fn test_update_rejects_missing_or_invalid_position() {
        assert!(PositionUpdate::from_fix(&PositionFix::default()).is_none());
        assert!(PositionUpdate::from_fix(&PositionFix::at(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn test_update_zeroes_non_finite_heading() {
        let fix = PositionFix::at(0.0, 0.0).with_heading(f64::NAN).with_speed(3.0);
        let update = PositionUpdate::from_fix(&fix).unwrap();
        assert_eq!(update.heading, 0.0);
        assert_eq!(update.speed, 3.0);
    }
}
