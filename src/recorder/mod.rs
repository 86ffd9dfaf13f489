//! Video recording module
//!
//! - RecordingCoordinator owning the movie output and the start/stop
//!   acknowledgement protocol
//! - RecordingState, the explicit state machine behind it

pub mod coordinator;
pub mod state;

pub use coordinator::{RecordingCoordinator, RecordingEvent};
pub use state::RecordingState;
