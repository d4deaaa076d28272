//! In-memory view and marker layer for testing and replay

use crate::core::Coordinate;
use crate::map::{MarkerId, MarkerLayer, MarkerStyle, View, ViewportSize};
use std::collections::HashMap;

/// View that stores its state and counts mutations
#[derive(Debug, Clone)]
pub struct RecordingView {
    center: Option<Coordinate>,
    rotation: f64,
    resolution: Option<f64>,
    size: Option<ViewportSize>,
    center_updates: u32,
    rotation_updates: u32,
}

impl RecordingView {
    pub fn new(resolution: f64, size: ViewportSize) -> Self {
        Self {
            center: None,
            rotation: 0.0,
            resolution: Some(resolution),
            size: Some(size),
            center_updates: 0,
            rotation_updates: 0,
        }
    }

    /// View that has not been rendered yet: no resolution or size
    pub fn unrendered() -> Self {
        Self {
            center: None,
            rotation: 0.0,
            resolution: None,
            size: None,
            center_updates: 0,
            rotation_updates: 0,
        }
    }

    pub fn center_updates(&self) -> u32 {
        self.center_updates
    }

    pub fn rotation_updates(&self) -> u32 {
        self.rotation_updates
    }
}

impl View for RecordingView {
    fn center(&self) -> Option<Coordinate> {
        self.center
    }

    fn set_center(&mut self, center: Coordinate) {
        self.center = Some(center);
        self.center_updates += 1;
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.rotation_updates += 1;
    }

    fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    fn size(&self) -> Option<ViewportSize> {
        self.size
    }
}

/// Mutation applied to a [`RecordingMarkerLayer`]
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOperation {
    Add(MarkerId),
    Remove(MarkerId),
    SetGeometry(MarkerId, Coordinate),
    SetStyle(MarkerId, MarkerStyle),
}

/// Marker as currently shown by a [`RecordingMarkerLayer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub position: Option<Coordinate>,
    pub style: MarkerStyle,
}

/// Marker layer that keeps its markers in memory and logs every operation
#[derive(Debug, Clone, Default)]
pub struct RecordingMarkerLayer {
    markers: HashMap<MarkerId, RenderedMarker>,
    operations: Vec<LayerOperation>,
}

impl RecordingMarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, id: MarkerId) -> Option<&RenderedMarker> {
        self.markers.get(&id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn operations(&self) -> &[LayerOperation] {
        &self.operations
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }
}

impl MarkerLayer for RecordingMarkerLayer {
    fn add_marker(&mut self, id: MarkerId, style: &MarkerStyle) {
        self.markers.insert(
            id,
            RenderedMarker {
                position: None,
                style: *style,
            },
        );
        self.operations.push(LayerOperation::Add(id));
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
        self.operations.push(LayerOperation::Remove(id));
    }

    fn set_geometry(&mut self, id: MarkerId, position: Coordinate) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.position = Some(position);
        }
        self.operations.push(LayerOperation::SetGeometry(id, position));
    }

    fn set_style(&mut self, id: MarkerId, style: &MarkerStyle) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.style = *style;
        }
        self.operations.push(LayerOperation::SetStyle(id, *style));
    }
}
