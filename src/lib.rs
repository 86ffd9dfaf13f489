//! Viewfinder - capture-device session management, made simple.
//!
//! Owns a live camera session and arbitrates between still capture and
//! movie recording, persisting captured media into a durable library.
//! Hardware is reached through the [`hal`] trait boundary; the pipeline
//! runs on three serialized execution contexts (hardware, persistence,
//! notification) so device I/O, library writes, and UI callbacks never
//! block one another.

pub mod config;
pub mod context;
pub mod error;
pub mod hal;
pub mod library;
pub mod orientation;
pub mod permission;
pub mod recorder;
pub mod session;

pub use config::{CaptureConfig, VideoRecordingConfig};
pub use error::{CaptureError, CaptureResult};
pub use hal::{CameraPosition, FlashMode, SessionPreset};
pub use library::{
    AssetHandle, LibraryTransaction, Location, MediaLibrary, MemoryLibrary, PlaceholderId,
    SavePipeline,
};
pub use orientation::{DeviceOrientation, OrientationSource, VideoOrientation};
pub use permission::{PermissionGate, Permissions};
pub use recorder::{RecordingCoordinator, RecordingEvent, RecordingState};
pub use session::{SessionDelegate, SessionManager};
