//! Camera/view interface

use crate::core::Coordinate;
use serde::{Deserialize, Serialize};

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Map camera controlled by follow mode
pub trait View {
    /// Current view center, if one has been set
    fn center(&self) -> Option<Coordinate>;

    fn set_center(&mut self, center: Coordinate);

    /// Current rotation in radians
    fn rotation(&self) -> f64;

    fn set_rotation(&mut self, rotation: f64);

    /// Ground resolution in map units per pixel
    fn resolution(&self) -> Option<f64>;

    /// Viewport size, unknown until the map is rendered
    fn size(&self) -> Option<ViewportSize>;
}
