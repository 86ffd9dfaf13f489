//! Capture session topology
//!
//! The live pipeline connecting a camera to its outputs. Holds at most one
//! device input at a time; every topology mutation (input, outputs, preset)
//! must happen inside a begin/commit configuration bracket. Because all
//! mutation runs on the hardware context, a bracket is atomic with respect
//! to capture requests without further locking.

use crate::hal::{CameraDevice, CameraPosition, SessionPreset};
use std::sync::Arc;

/// Observable session configuration, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub input: Option<CameraPosition>,
    pub preset: Option<SessionPreset>,
    pub still_output_attached: bool,
    pub movie_output_attached: bool,
    pub running: bool,
}

pub struct CaptureSession {
    input: Option<Arc<dyn CameraDevice>>,
    preset: Option<SessionPreset>,
    supported_presets: Vec<SessionPreset>,
    still_output_attached: bool,
    movie_output_attached: bool,
    running: bool,
    configuring: bool,
}

impl CaptureSession {
    pub fn new(supported_presets: Vec<SessionPreset>) -> Self {
        Self {
            input: None,
            preset: None,
            supported_presets,
            still_output_attached: false,
            movie_output_attached: false,
            running: false,
            configuring: false,
        }
    }

    /// Run `block` inside a configuration bracket.
    pub fn configure<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_configuration();
        let result = block(self);
        self.commit_configuration();
        result
    }

    pub fn begin_configuration(&mut self) {
        debug_assert!(!self.configuring, "configuration brackets do not nest");
        self.configuring = true;
    }

    pub fn commit_configuration(&mut self) {
        debug_assert!(self.configuring, "commit without begin");
        self.configuring = false;
    }

    pub fn can_set_preset(&self, preset: SessionPreset) -> bool {
        self.supported_presets.contains(&preset)
    }

    pub fn set_preset(&mut self, preset: SessionPreset) {
        debug_assert!(self.configuring, "preset change outside a bracket");
        self.preset = Some(preset);
    }

    pub fn preset(&self) -> Option<SessionPreset> {
        self.preset
    }

    /// Attach `device` as the session input. Fails if an input is already
    /// attached; at most one input exists at any instant.
    pub fn add_input(&mut self, device: Arc<dyn CameraDevice>) -> bool {
        debug_assert!(self.configuring, "input change outside a bracket");
        if self.input.is_some() {
            return false;
        }
        self.input = Some(device);
        true
    }

    pub fn remove_input(&mut self) -> Option<Arc<dyn CameraDevice>> {
        debug_assert!(self.configuring, "input change outside a bracket");
        self.input.take()
    }

    pub fn current_input(&self) -> Option<Arc<dyn CameraDevice>> {
        self.input.clone()
    }

    pub fn attach_still_output(&mut self) {
        debug_assert!(self.configuring, "output change outside a bracket");
        self.still_output_attached = true;
    }

    pub fn attach_movie_output(&mut self) {
        debug_assert!(self.configuring, "output change outside a bracket");
        self.movie_output_attached = true;
    }

    pub fn start_running(&mut self) {
        self.running = true;
    }

    pub fn stop_running(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            input: self.input.as_ref().map(|d| d.position()),
            preset: self.preset,
            still_output_attached: self.still_output_attached,
            movie_output_attached: self.movie_output_attached,
            running: self.running,
        }
    }
}
