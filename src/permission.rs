//! Capture permissions
//!
//! The pipeline consults the platform's authorization state but never owns
//! it; the embedder supplies a [`PermissionGate`] for its platform. The
//! [`Permissions`] wrapper adds the one piece of orchestration-level state:
//! whether the microphone prompt has already been shown this process, so a
//! user who dismissed it is not prompted again.

use std::sync::atomic::{AtomicBool, Ordering};

/// Platform authorization queries and prompts.
pub trait PermissionGate: Send + Sync {
    /// Is camera capture currently authorized?
    fn camera_authorized(&self) -> bool;

    /// Is microphone capture currently authorized?
    fn microphone_authorized(&self) -> bool;

    /// Show the camera authorization prompt; `completion` runs once the
    /// user has responded.
    fn request_camera_access(&self, completion: Box<dyn FnOnce(bool) + Send>);

    /// Show the microphone authorization prompt; `completion` runs once the
    /// user has responded.
    fn request_microphone_access(&self, completion: Box<dyn FnOnce(bool) + Send>);
}

/// A [`PermissionGate`] with per-process prompt tracking.
pub struct Permissions {
    gate: Box<dyn PermissionGate>,
    microphone_prompted: AtomicBool,
}

impl Permissions {
    pub fn new(gate: impl PermissionGate + 'static) -> Self {
        Self {
            gate: Box::new(gate),
            microphone_prompted: AtomicBool::new(false),
        }
    }

    pub fn camera_authorized(&self) -> bool {
        self.gate.camera_authorized()
    }

    /// True if the microphone is authorized, or if the user has already
    /// been asked this process (even if they declined).
    pub fn microphone_authorized_or_prompted(&self) -> bool {
        self.microphone_prompted.load(Ordering::Acquire) || self.gate.microphone_authorized()
    }

    pub fn request_camera_access(&self, completion: impl FnOnce(bool) + Send + 'static) {
        self.gate.request_camera_access(Box::new(completion));
    }

    pub fn request_microphone_access(&self, completion: impl FnOnce(bool) + Send + 'static) {
        self.microphone_prompted.store(true, Ordering::Release);
        self.gate.request_microphone_access(Box::new(completion));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct DenyingGate {
        prompts: Arc<AtomicUsize>,
    }

    impl PermissionGate for DenyingGate {
        fn camera_authorized(&self) -> bool {
            false
        }

        fn microphone_authorized(&self) -> bool {
            false
        }

        fn request_camera_access(&self, completion: Box<dyn FnOnce(bool) + Send>) {
            completion(false);
        }

        fn request_microphone_access(&self, completion: Box<dyn FnOnce(bool) + Send>) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            completion(false);
        }
    }

    #[test]
    fn microphone_prompt_is_remembered_even_when_denied() {
        let prompts = Arc::new(AtomicUsize::new(0));
        let permissions = Permissions::new(DenyingGate {
            prompts: prompts.clone(),
        });

        assert!(!permissions.microphone_authorized_or_prompted());

        permissions.request_microphone_access(|_granted| {});
        assert_eq!(prompts.load(Ordering::SeqCst), 1);

        // Denied, but already asked: the orchestration must not re-prompt.
        assert!(permissions.microphone_authorized_or_prompted());
    }
}
