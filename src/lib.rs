//! Geolocation Follow
//!
//! A map control that tracks the device position, draws a heading-aware
//! marker and optionally keeps the view centered ahead of the subject with
//! the direction of travel pointing up. Fixes are kept in a short history
//! and rendered with a fixed delay so the view moves smoothly between them.

pub mod api;
pub mod core;
pub mod hardware;
pub mod map;
pub mod processing;
pub mod utils;

// Re-export commonly used types
pub use api::{FrameFormatter, GeolocationControl, OutputFormat, SessionPhase, TrackingSession};
pub use core::{Coordinate, PositionFix, PositionUpdate, TrackedSample};
pub use hardware::{MockPositioningSource, MockSourceFactory, PositioningError, PositioningSource, SourceFactory, Subscription};
pub use map::{Marker, MarkerIcon, MarkerLayer, MarkerStyle, View, ViewportSize};
pub use processing::{Extrapolation, PositionHistory, ViewFrame, ViewSynchronizer};
pub use utils::{ConfigError, ConfigurationManager, SmoothingConfig, TrackingOptions, ViewFollowConfig};
