//! Tracking and view-following parameters

/// Number of samples retained in the position history
pub const HISTORY_CAPACITY: usize = 20;

/// Largest configurable position history
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Assumed interval between positioning updates (milliseconds)
pub const SAMPLING_PERIOD_ESTIMATE_MS: f64 = 500.0;

/// Multiple of the sampling period the rendered position lags behind real time
pub const RENDER_DELAY_FACTOR: f64 = 1.5;

/// Fraction of the viewport height the followed subject sits below the view center
pub const FOLLOW_ANCHOR_FRACTION: f64 = 0.25;

/// Default cached-fix age the positioning source may return (milliseconds)
pub const DEFAULT_MAXIMUM_AGE_MS: u32 = 10_000;

/// Default positioning timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u32 = 600_000;
