//! Map-side collaborators driven by the tracker
//!
//! The camera/view and the marker render layer are owned by the enclosing
//! map widget. The tracker only ever writes to them through these traits
//! and never feeds their state back into the position history.

pub mod view;
pub mod marker;
pub mod recording;

pub use view::{View, ViewportSize};
pub use marker::{Marker, MarkerIcon, MarkerId, MarkerLayer, MarkerStyle};
pub use recording::{LayerOperation, RecordingMarkerLayer, RecordingView};
