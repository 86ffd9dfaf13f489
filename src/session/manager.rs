//! Capture session manager
//!
//! The single owner of the capture session and its inputs/outputs, and the
//! only component permitted to mutate session configuration. All hardware
//! work runs on the hardware context; caller completions and delegate
//! notifications are posted to the notification context.

use super::capture_session::{CaptureSession, SessionSnapshot};
use super::delegate::SessionDelegate;
use crate::config::CaptureConfig;
use crate::context::Contexts;
use crate::hal::{
    CameraDevice, CameraPosition, CaptureBackend, FlashMode, ImageEncoding, RecordingLimits,
    StillOutput,
};
use crate::library::{AssetHandle, Location, MediaLibrary, SavePipeline};
use crate::orientation::{OrientationSource, VideoOrientation};
use crate::permission::Permissions;
use crate::recorder::RecordingCoordinator;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct ManagerState {
    session: CaptureSession,
    back_camera: Option<Arc<dyn CameraDevice>>,
    front_camera: Option<Arc<dyn CameraDevice>>,
    still_output: Option<Box<dyn StillOutput>>,
    recorder: Option<RecordingCoordinator>,
}

pub struct SessionManager {
    contexts: Arc<Contexts>,
    backend: Arc<dyn CaptureBackend>,
    permissions: Arc<Permissions>,
    delegate: Arc<dyn SessionDelegate>,
    orientation: Arc<dyn OrientationSource>,
    save: Arc<SavePipeline>,
    config: CaptureConfig,
    state: Arc<Mutex<ManagerState>>,
    recording: Arc<AtomicBool>,
}

impl SessionManager {
    /// Requires a running tokio runtime; the execution contexts are spawned
    /// here.
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        permissions: Permissions,
        delegate: Arc<dyn SessionDelegate>,
        orientation: Arc<dyn OrientationSource>,
        library: Arc<dyn MediaLibrary>,
        config: CaptureConfig,
    ) -> Self {
        let contexts = Contexts::new();
        let save = Arc::new(SavePipeline::new(library, contexts.clone()));
        let session = CaptureSession::new(backend.session_presets());
        Self {
            contexts,
            backend,
            permissions: Arc::new(permissions),
            delegate,
            orientation,
            save,
            config,
            state: Arc::new(Mutex::new(ManagerState {
                session,
                back_camera: None,
                front_camera: None,
                still_output: None,
                recorder: None,
            })),
            recording: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The execution contexts the manager runs on. Exposed so embedders and
    /// tests can establish ordering with queued work.
    pub fn contexts(&self) -> &Arc<Contexts> {
        &self.contexts
    }


    /// Query authorization and bring the session up if granted; otherwise
    /// notify the delegate that capture is not available.
    pub fn setup(&self) {
        if self.permissions.camera_authorized() {
            self.start();
        } else {
            tracing::info!("camera not authorized");
            let delegate = self.delegate.clone();
            self.contexts.notification.submit(move || delegate.not_available());
        }
    }

    /// Configure devices and outputs, attach the back camera as the default
    /// input, and start the session. Notifies the delegate once running.
    pub fn start(&self) {
        let this = self.clone_refs();
        self.contexts.hardware.submit(move || {
            let mut state = this.state.lock();
            this.setup_devices(&mut state);

            let Some(back) = state.back_camera.clone() else {
                tracing::warn!("no back camera available; session not started");
                return;
            };
            if state.still_output.is_none() || state.recorder.is_none() {
                return;
            }

            state.session.configure(|session| {
                session.attach_still_output();
                session.attach_movie_output();
            });
            this.attach_input(&mut state, back);

            state.session.start_running();
            drop(state);

            tracing::info!("capture session started");
            let delegate = this.delegate.clone();
            this.contexts.notification.submit(move || delegate.did_start());
        });
    }

    /// Stop the session and release the active device. Runs inline so the
    /// hardware is guaranteed released when this returns.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if !state.session.is_running() && state.session.current_input().is_none() {
            return;
        }
        state.session.stop_running();
        if let Some(input) = state.session.current_input() {
            input.release();
        }
        tracing::info!("capture session stopped");
    }


    /// Swap the active camera front <-> back. `completion` fires on the
    /// notification context whether or not a swap happened.
    pub fn switch_camera(&self, completion: impl FnOnce() + Send + 'static) {
        let this = self.clone_refs();
        self.contexts.hardware.submit(move || {
            let finish = {
                let notification = this.contexts.notification.clone();
                move || notification.submit(completion)
            };

            let mut state = this.state.lock();
            let Some(current) = state.session.current_input() else {
                drop(state);
                finish();
                return;
            };

            let next = match current.position() {
                CameraPosition::Back => state.front_camera.clone(),
                _ => state.back_camera.clone(),
            };
            let Some(next) = next else {
                drop(state);
                finish();
                return;
            };

            state.session.configure(|session| {
                session.remove_input();
            });
            this.attach_input(&mut state, next);
            drop(state);
            finish();
        });
    }

    /// Capture one still frame and persist it. `completion` receives the
    /// saved asset handle, or `None` on capture or persistence failure.
    pub fn take_photo(
        &self,
        location: Option<Location>,
        completion: impl FnOnce(Option<AssetHandle>) + Send + 'static,
    ) {
        // Orientation is sampled at the moment of the request, not cached.
        let orientation = VideoOrientation::from(self.orientation.current());
        let this = self.clone_refs();
        self.contexts.hardware.submit(move || {
            let fail = |completion: Box<dyn FnOnce(Option<AssetHandle>) + Send>| {
                this.contexts.notification.submit(move || completion(None));
            };

            let frame = {
                let mut state = this.state.lock();
                match state.still_output.as_mut() {
                    Some(output) if output.has_active_connection() => {
                        Some(output.capture_frame(orientation))
                    }
                    _ => None,
                }
            };
            let Some(frame) = frame else {
                fail(Box::new(completion));
                return;
            };

            match frame {
                Ok(bytes) => {
                    if image::load_from_memory(&bytes).is_err() {
                        tracing::warn!("captured frame is not decodable");
                        fail(Box::new(completion));
                        return;
                    }
                    this.save.save_image(bytes, location, completion);
                }
                Err(e) => {
                    tracing::warn!("still capture failed: {e}");
                    fail(Box::new(completion));
                }
            }
        });
    }

    /// Whether a video recording is currently running. Reads an atomic
    /// flag; safe from the notification context.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Begin a video recording. `completion` resolves `true` once the
    /// hardware confirms recording began.
    pub fn start_video_recording(&self, completion: impl FnOnce(bool) + Send + 'static) {
        let orientation = VideoOrientation::from(self.orientation.current());
        let this = self.clone_refs();
        self.contexts.hardware.submit(move || {
            let mut state = this.state.lock();
            if let Some(recorder) = state.recorder.as_mut() {
                recorder.start(orientation, completion);
            } else {
                drop(state);
                this.contexts.notification.submit(move || completion(false));
            }
        });
    }

    /// Stop the in-progress recording and persist the recorded file.
    /// `completion` receives the saved asset handle, or `None` when the
    /// recording failed; persistence is skipped entirely on failure.
    pub fn stop_video_recording(
        &self,
        location: Option<Location>,
        completion: impl FnOnce(Option<AssetHandle>) + Send + 'static,
    ) {
        let this = self.clone_refs();
        self.contexts.hardware.submit(move || {
            let mut state = this.state.lock();
            if let Some(recorder) = state.recorder.as_mut() {
                let save = this.save.clone();
                recorder.stop(move |file| match file {
                    Some(path) => save.save_video(path, location, completion),
                    None => completion(None),
                });
            } else {
                drop(state);
                this.contexts.notification.submit(move || completion(None));
            }
        });
    }

    /// Set the flash mode on the active device. Silent no-op when no device
    /// is attached, the mode is unsupported, or the device lock is busy.
    pub fn flash(&self, mode: FlashMode) {
        let Some(device) = self.state.lock().session.current_input() else {
            return;
        };
        if !device.supports_flash_mode(mode) {
            return;
        }
        self.contexts.hardware.submit(move || {
            with_configuration_lock(&device, |d| d.set_flash_mode(mode));
        });
    }

    /// Set the focus point of interest on the active device. Silent no-op
    /// when unsupported.
    pub fn focus(&self, point: (f32, f32)) {
        let Some(device) = self.state.lock().session.current_input() else {
            return;
        };
        if !device.supports_focus() {
            return;
        }
        self.contexts.hardware.submit(move || {
            with_configuration_lock(&device, |d| d.set_focus_point(point));
        });
    }

    /// Position of the currently attached input, if any.
    pub fn current_input_position(&self) -> Option<CameraPosition> {
        self.state.lock().session.current_input().map(|d| d.position())
    }

    /// Observable session configuration, for diagnostics.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        self.state.lock().session.snapshot()
    }

    fn clone_refs(&self) -> ManagerRefs {
        ManagerRefs {
            contexts: self.contexts.clone(),
            backend: self.backend.clone(),
            delegate: self.delegate.clone(),
            save: self.save.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            recording: self.recording.clone(),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The subset of manager state hardware jobs capture by clone.
#[derive(Clone)]
struct ManagerRefs {
    contexts: Arc<Contexts>,
    backend: Arc<dyn CaptureBackend>,
    delegate: Arc<dyn SessionDelegate>,
    save: Arc<SavePipeline>,
    config: CaptureConfig,
    state: Arc<Mutex<ManagerState>>,
    recording: Arc<AtomicBool>,
}

impl ManagerRefs {
    /// Discover cameras (first match per position wins; cameras with no
    /// declared position are ignored) and construct the outputs.
    fn setup_devices(&self, state: &mut ManagerState) {
        for device in self.backend.video_devices() {
            match device.position() {
                CameraPosition::Front => {
                    if state.front_camera.is_none() {
                        state.front_camera = Some(device);
                    }
                }
                CameraPosition::Back => {
                    if state.back_camera.is_none() {
                        state.back_camera = Some(device);
                    }
                }
                CameraPosition::Unspecified => {}
            }
        }

        state.still_output = Some(self.backend.new_still_output(ImageEncoding::Jpeg));

        let limits = RecordingLimits {
            max_duration: self.config.video.max_duration(),
            max_bytes: self.config.video.max_bytes,
        };
        state.recorder = Some(RecordingCoordinator::new(
            self.backend.new_movie_output(limits),
            self.config.temp_movie_path(),
            self.contexts.notification.clone(),
            self.recording.clone(),
        ));
    }

    /// Attach `device` inside a configuration bracket, applying the first
    /// preferred preset both the device and the session accept, and notify
    /// the delegate of the input change.
    fn attach_input(&self, state: &mut ManagerState, device: Arc<dyn CameraDevice>) {
        let position = device.position();
        let added = state.session.configure(|session| {
            if let Some(preset) = self
                .config
                .preferred_presets
                .iter()
                .copied()
                .find(|p| device.supports_preset(*p) && session.can_set_preset(*p))
            {
                session.set_preset(preset);
            }
            session.add_input(device)
        });

        if added {
            tracing::debug!("active input changed: {position:?}");
            let delegate = self.delegate.clone();
            self.contexts
                .notification
                .submit(move || delegate.did_change_input(position));
        }
    }
}

/// Acquire the per-device configuration lock around a single property
/// write. A busy lock skips the write; acquisition never blocks.
fn with_configuration_lock(device: &Arc<dyn CameraDevice>, write: impl FnOnce(&dyn CameraDevice)) {
    if device.try_lock_configuration() {
        write(device.as_ref());
        device.unlock_configuration();
    } else {
        tracing::debug!("device configuration lock busy; property write skipped");
    }
}
