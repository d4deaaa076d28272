//! Per-control tracking session state

use serde::{Deserialize, Serialize};

/// Phase of the tracking state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Inactive,
    Active,
}

/// Ephemeral tracking state of one geolocation control
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackingSession {
    /// Whether fixes are currently being tracked
    pub active: bool,
    /// Continuous heading of the latest recorded sample
    pub last_unwrapped_heading: Option<f64>,
    /// Whether the position marker is attached to its layer
    pub marker_visible: bool,
}

impl TrackingSession {
    pub fn phase(&self) -> SessionPhase {
        if self.active {
            SessionPhase::Active
        } else {
            SessionPhase::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.marker_visible = false;
    }

    pub(crate) fn record_heading(&mut self, heading: f64) {
        self.last_unwrapped_heading = Some(heading);
    }

    pub(crate) fn reset_heading(&mut self) {
        self.last_unwrapped_heading = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        let mut session = TrackingSession::default();
        assert_eq!(session.phase(), SessionPhase::Inactive);

        session.activate();
        session.marker_visible = true;
        assert_eq!(session.phase(), SessionPhase::Active);

        session.deactivate();
        assert_eq!(session.phase(), SessionPhase::Inactive);
        assert!(!session.marker_visible);
    }
}
