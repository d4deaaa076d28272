//! Geolocation control API
//!
//! The control wires a positioning source, a map view and a marker layer
//! together. Formatting helpers turn rendered frames into text, JSON or CSV.

pub mod control;
pub mod formatting;
pub mod session;
pub mod types;

pub use control::{GeolocationControl, SharedMarkerLayer, SharedView};
pub use formatting::{CsvFormatter, FrameFormatter, JsonFormatter, TextFormatter};
pub use session::{SessionPhase, TrackingSession};
pub use types::{ChangeCallback, ErrorCallback, OutputFormat, UnknownFormat};
