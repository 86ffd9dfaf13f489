//! Session delegate
//!
//! Notification sink for the embedding UI. Every callback is delivered on
//! the notification context, so implementations may touch UI state without
//! further dispatch.

use crate::hal::CameraPosition;

pub trait SessionDelegate: Send + Sync {
    /// Capture is not authorized; fired once from `setup`.
    fn not_available(&self);

    /// The session is configured and running.
    fn did_start(&self);

    /// A different camera became the active input.
    fn did_change_input(&self, position: CameraPosition);
}

/// Delegate that ignores every notification.
pub struct NullDelegate;

impl SessionDelegate for NullDelegate {
    fn not_available(&self) {}
    fn did_start(&self) {}
    fn did_change_input(&self, _position: CameraPosition) {}
}
