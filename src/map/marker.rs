//! Position marker and render layer interface

use crate::core::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifier of a marker within its render layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(u32);

impl MarkerId {
    pub fn new(id: u32) -> Self {
        MarkerId(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Marker image variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerIcon {
    /// Plain dot, used while no heading is known
    Neutral,
    /// Arrow pointing along the direction of travel
    Directional,
}

/// Marker appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub icon: MarkerIcon,
    /// Icon rotation in radians
    pub rotation: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            icon: MarkerIcon::Neutral,
            rotation: 0.0,
        }
    }
}

impl MarkerStyle {
    /// Select the icon for a heading: a zero heading shows the neutral icon
    /// unrotated, any other heading an arrow rotated by it.
    pub fn for_heading(heading: f64) -> Self {
        if heading != 0.0 {
            Self {
                icon: MarkerIcon::Directional,
                rotation: heading,
            }
        } else {
            Self::default()
        }
    }
}

/// Render layer hosting point markers
pub trait MarkerLayer {
    fn add_marker(&mut self, id: MarkerId, style: &MarkerStyle);

    fn remove_marker(&mut self, id: MarkerId);

    fn set_geometry(&mut self, id: MarkerId, position: Coordinate);

    fn set_style(&mut self, id: MarkerId, style: &MarkerStyle);
}

/// Visual state of the tracked-position marker
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id: MarkerId,
    position: Option<Coordinate>,
    style: MarkerStyle,
    attached: bool,
}

impl Marker {
    pub fn new(id: MarkerId) -> Self {
        Self {
            id,
            position: None,
            style: MarkerStyle::default(),
            attached: false,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Add the marker to `layer` unless it is already there
    pub fn attach(&mut self, layer: &mut dyn MarkerLayer) {
        if self.attached {
            return;
        }
        layer.add_marker(self.id, &self.style);
        if let Some(position) = self.position {
            layer.set_geometry(self.id, position);
        }
        self.attached = true;
        debug!(marker = %self.id, "marker attached");
    }

    /// Remove the marker from `layer` if it is there
    pub fn detach(&mut self, layer: &mut dyn MarkerLayer) {
        if !self.attached {
            return;
        }
        layer.remove_marker(self.id);
        self.attached = false;
        debug!(marker = %self.id, "marker detached");
    }

    /// Move the marker and restyle it for `heading`
    pub fn update(&mut self, layer: &mut dyn MarkerLayer, position: Coordinate, heading: f64) -> MarkerStyle {
        self.position = Some(position);
        self.style = MarkerStyle::for_heading(heading);
        if self.attached {
            layer.set_geometry(self.id, position);
            layer.set_style(self.id, &self.style);
        }
        self.style
    }
}
