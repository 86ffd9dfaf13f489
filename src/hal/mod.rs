//! Hardware abstraction boundary
//!
//! Platform-agnostic traits for capture hardware. The session manager owns
//! the session topology and drives these traits from its hardware context;
//! embedders supply an implementation per platform. Movie-recording
//! acknowledgements arrive asynchronously through an event sink, mirroring
//! the way capture hardware reports start and finish out of band.

use crate::error::CaptureResult;
use crate::orientation::VideoOrientation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(test)]
pub(crate) mod mock;

/// Physical placement of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
    /// Cameras with no declared position are ignored during setup.
    Unspecified,
}

/// Session quality preset, in decreasing order of fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPreset {
    High,
    Medium,
    Low,
}

/// Flash mode for still capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

/// Encoding of captured still frames. The still output is configured once
/// with a single fixed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Jpeg,
}

/// Limits applied when constructing a movie output. Reaching either limit
/// makes the hardware stop recording on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingLimits {
    pub max_duration: Option<Duration>,
    pub max_bytes: Option<u64>,
}

/// Error reported with a recording-finish acknowledgement.
#[derive(Debug, Clone)]
pub struct MovieStopError {
    pub message: String,
    /// True when the recording nonetheless finished successfully, e.g. the
    /// hardware stopped because a configured maximum duration or file size
    /// was reached. The file is still a valid result in that case.
    pub successfully_finished: bool,
}

/// Asynchronous acknowledgement from the movie output.
#[derive(Debug, Clone)]
pub enum MovieEvent {
    /// Recording has actually begun writing to `path`.
    DidStart { path: PathBuf },
    /// Recording finished; `error` is `None` on a clean manual stop.
    DidFinish {
        path: PathBuf,
        error: Option<MovieStopError>,
    },
}

/// A physical camera.
///
/// Property writes (flash, focus) require the per-device configuration
/// lock; `try_lock_configuration` must be non-blocking.
pub trait CameraDevice: Send + Sync {
    fn name(&self) -> &str;
    fn position(&self) -> CameraPosition;

    fn supports_preset(&self, preset: SessionPreset) -> bool;
    fn supports_flash_mode(&self, mode: FlashMode) -> bool;
    fn supports_focus(&self) -> bool;

    /// Acquire the device configuration lock without blocking. Returns
    /// false if the device is busy; the caller must then skip the write.
    fn try_lock_configuration(&self) -> bool;
    fn unlock_configuration(&self);

    fn set_flash_mode(&self, mode: FlashMode);
    fn set_focus_point(&self, point: (f32, f32));

    /// Release the underlying hardware. Called on session teardown.
    fn release(&self);
}

/// Still-image output attached to the session.
pub trait StillOutput: Send {
    fn has_active_connection(&self) -> bool;

    /// Capture one frame, returning encoded image bytes. Runs on the
    /// hardware context and may block briefly on device I/O.
    fn capture_frame(&mut self, orientation: VideoOrientation) -> CaptureResult<Vec<u8>>;
}

/// Movie-file output attached to the session.
///
/// Start and finish are acknowledged asynchronously through the sink
/// installed with [`MovieOutput::set_event_sink`]; `start_recording` and
/// `stop_recording` only issue the request.
pub trait MovieOutput: Send {
    fn has_active_connection(&self) -> bool;
    fn is_recording(&self) -> bool;

    fn set_event_sink(&mut self, sink: mpsc::UnboundedSender<MovieEvent>);

    fn start_recording(&mut self, path: &Path, orientation: VideoOrientation);
    fn stop_recording(&mut self);
}

/// Factory and discovery surface for a capture platform.
pub trait CaptureBackend: Send + Sync {
    /// Enumerate the physical cameras. Discovery happens once at setup.
    fn video_devices(&self) -> Vec<Arc<dyn CameraDevice>>;

    /// Presets the session itself can run at.
    fn session_presets(&self) -> Vec<SessionPreset>;

    fn new_still_output(&self, encoding: ImageEncoding) -> Box<dyn StillOutput>;
    fn new_movie_output(&self, limits: RecordingLimits) -> Box<dyn MovieOutput>;
}
