//! Utility modules for configuration and time keeping

pub mod config;
pub mod clock;

pub use config::{ConfigError, ConfigResult, ConfigurationManager, SmoothingConfig, TrackingOptions, ViewFollowConfig};
pub use clock::{Clock, ManualClock, SystemClock};
