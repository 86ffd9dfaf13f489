//! Error types and handling
//!
//! Common error types used across the capture pipeline.

use thiserror::Error;

/// Capture-pipeline error type
///
/// Errors are caught at their origin and converted into the optional result
/// delivered through the caller's completion on the notification context;
/// they never cross an execution-context boundary as a panic.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture not authorized")]
    Unavailable,

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("still capture failed: {0}")]
    Capture(String),

    #[error("recording failed: {0}")]
    Recording(String),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;
