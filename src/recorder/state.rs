//! Recording state management
//!
//! Defines the recording state machine driven by the coordinator: a start
//! request awaits an asynchronous hardware start acknowledgement, and a
//! stop request awaits the terminal finish acknowledgement.

use serde::{Deserialize, Serialize};

/// Current state of the video-recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Start requested, hardware has not yet confirmed
    AwaitingStartAck,
    /// Hardware confirmed the recording is running
    Recording,
    /// Stop requested, waiting for the terminal acknowledgement
    AwaitingStopAck,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl RecordingState {
    /// A recording session exists (a second start must be rejected).
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }

    /// A stop request is currently meaningful.
    pub fn can_stop(self) -> bool {
        matches!(self, Self::AwaitingStartAck | Self::Recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_the_only_inactive_state() {
        assert!(!RecordingState::Idle.is_active());
        assert!(RecordingState::AwaitingStartAck.is_active());
        assert!(RecordingState::Recording.is_active());
        assert!(RecordingState::AwaitingStopAck.is_active());
    }

    #[test]
    fn stop_is_legal_before_start_ack() {
        assert!(RecordingState::AwaitingStartAck.can_stop());
        assert!(RecordingState::Recording.can_stop());
        assert!(!RecordingState::Idle.can_stop());
        assert!(!RecordingState::AwaitingStopAck.can_stop());
    }
}
