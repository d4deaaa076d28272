//! Positioning error types

use thiserror::Error;

/// Failure reported by a device positioning source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositioningError {
    /// The user or platform refused access to the device location
    #[error("permission to access the device position was denied")]
    PermissionDenied,
    /// The device could not determine a position
    #[error("position unavailable: {reason}")]
    PositionUnavailable { reason: String },
    /// No fix arrived within the configured timeout
    #[error("no position fix within {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
    /// Platform-specific failure
    #[error("positioning error {code}: {message}")]
    Other { code: u32, message: String },
}

impl PositioningError {
    /// Whether later fixes may still arrive on the same session
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PositioningError::PermissionDenied)
    }
}
