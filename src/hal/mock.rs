//! Scriptable capture hardware for the test suite.

use super::*;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Encoded bytes of a minimal valid image, for successful capture results.
pub(crate) fn valid_image_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 128, 255]));
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub(crate) struct MockDevice {
    pub name: String,
    pub position: CameraPosition,
    pub presets: Vec<SessionPreset>,
    pub flash_modes: Vec<FlashMode>,
    pub focusable: bool,
    pub lockable: AtomicBool,
    pub flash_mode: Mutex<Option<FlashMode>>,
    pub focus_point: Mutex<Option<(f32, f32)>>,
    pub released: AtomicBool,
}

impl MockDevice {
    pub fn new(name: &str, position: CameraPosition) -> Self {
        Self {
            name: name.to_string(),
            position,
            presets: vec![SessionPreset::High, SessionPreset::Medium, SessionPreset::Low],
            flash_modes: vec![FlashMode::Off, FlashMode::On, FlashMode::Auto],
            focusable: true,
            lockable: AtomicBool::new(true),
            flash_mode: Mutex::new(None),
            focus_point: Mutex::new(None),
            released: AtomicBool::new(false),
        }
    }

    pub fn with_presets(mut self, presets: Vec<SessionPreset>) -> Self {
        self.presets = presets;
        self
    }

    pub fn without_flash(mut self) -> Self {
        self.flash_modes.clear();
        self
    }

    pub fn without_focus(mut self) -> Self {
        self.focusable = false;
        self
    }
}

impl CameraDevice for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> CameraPosition {
        self.position
    }

    fn supports_preset(&self, preset: SessionPreset) -> bool {
        self.presets.contains(&preset)
    }

    fn supports_flash_mode(&self, mode: FlashMode) -> bool {
        self.flash_modes.contains(&mode)
    }

    fn supports_focus(&self) -> bool {
        self.focusable
    }

    fn try_lock_configuration(&self) -> bool {
        self.lockable.load(Ordering::SeqCst)
    }

    fn unlock_configuration(&self) {}

    fn set_flash_mode(&self, mode: FlashMode) {
        *self.flash_mode.lock() = Some(mode);
    }

    fn set_focus_point(&self, point: (f32, f32)) {
        *self.focus_point.lock() = Some(point);
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Shared script for still outputs created by the backend. Results are
/// consumed front to back; an empty script yields valid image bytes.
#[derive(Default)]
pub(crate) struct StillScript {
    results: Mutex<VecDeque<CaptureResult<Vec<u8>>>>,
}

impl StillScript {
    pub fn push(&self, result: CaptureResult<Vec<u8>>) {
        self.results.lock().push_back(result);
    }
}

struct MockStillOutput {
    script: Arc<StillScript>,
    connected: Arc<AtomicBool>,
}

impl StillOutput for MockStillOutput {
    fn has_active_connection(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn capture_frame(&mut self, _orientation: VideoOrientation) -> CaptureResult<Vec<u8>> {
        match self.script.results.lock().pop_front() {
            Some(result) => result,
            None => Ok(valid_image_bytes()),
        }
    }
}

/// Control surface for the mock movie output, shared with the test.
pub(crate) struct MovieRig {
    sink: Mutex<Option<mpsc::UnboundedSender<MovieEvent>>>,
    path: Mutex<Option<PathBuf>>,
    recording: AtomicBool,
    /// Emit DidStart as soon as start_recording is requested.
    pub auto_start_ack: AtomicBool,
    /// Emit a clean DidFinish as soon as stop_recording is requested.
    pub auto_finish_on_stop: AtomicBool,
    pub connected: AtomicBool,
    max_duration: Mutex<Option<Duration>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl MovieRig {
    fn new() -> Self {
        Self {
            sink: Mutex::new(None),
            path: Mutex::new(None),
            recording: AtomicBool::new(false),
            auto_start_ack: AtomicBool::new(true),
            auto_finish_on_stop: AtomicBool::new(true),
            connected: AtomicBool::new(true),
            max_duration: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    fn send(&self, event: MovieEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            let _ = sink.send(event);
        }
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.path.lock().clone()
    }

    pub fn ack_start(&self) {
        let path = self.current_path().expect("start_recording not requested");
        self.recording.store(true, Ordering::SeqCst);
        self.send(MovieEvent::DidStart { path });
    }

    pub fn finish(&self, error: Option<MovieStopError>) {
        let path = self.current_path().expect("start_recording not requested");
        // Materialize the recorded file so downstream consumers can read it.
        let _ = std::fs::write(&path, b"mock movie");
        self.recording.store(false, Ordering::SeqCst);
        self.send(MovieEvent::DidFinish { path, error });
    }

    pub fn finish_forced(&self, reason: &str) {
        self.finish(Some(MovieStopError {
            message: reason.to_string(),
            successfully_finished: true,
        }));
    }

    pub fn finish_failed(&self, reason: &str) {
        self.finish(Some(MovieStopError {
            message: reason.to_string(),
            successfully_finished: false,
        }));
    }
}

struct MockMovieOutput {
    rig: Arc<MovieRig>,
}

impl MovieOutput for MockMovieOutput {
    fn has_active_connection(&self) -> bool {
        self.rig.connected.load(Ordering::SeqCst)
    }

    fn is_recording(&self) -> bool {
        self.rig.recording.load(Ordering::SeqCst)
    }

    fn set_event_sink(&mut self, sink: mpsc::UnboundedSender<MovieEvent>) {
        *self.rig.sink.lock() = Some(sink);
    }

    fn start_recording(&mut self, path: &Path, _orientation: VideoOrientation) {
        *self.rig.path.lock() = Some(path.to_path_buf());
        self.rig.starts.fetch_add(1, Ordering::SeqCst);

        if self.rig.auto_start_ack.load(Ordering::SeqCst) {
            self.rig.ack_start();
        }

        if let Some(limit) = *self.rig.max_duration.lock() {
            let rig = self.rig.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                if rig.recording.load(Ordering::SeqCst) {
                    rig.finish_forced("maximum duration reached");
                }
            });
        }
    }

    fn stop_recording(&mut self) {
        self.rig.stops.fetch_add(1, Ordering::SeqCst);
        if self.rig.auto_finish_on_stop.load(Ordering::SeqCst) && self.rig.recording.load(Ordering::SeqCst)
        {
            self.rig.finish(None);
        }
    }
}

/// A capture platform assembled from the mock pieces above.
pub(crate) struct MockBackend {
    pub devices: Mutex<Vec<Arc<MockDevice>>>,
    pub session_presets: Vec<SessionPreset>,
    pub still_script: Arc<StillScript>,
    pub still_connected: Arc<AtomicBool>,
    pub movie_rig: Arc<MovieRig>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(vec![
                Arc::new(MockDevice::new("back wide", CameraPosition::Back)),
                Arc::new(MockDevice::new("front", CameraPosition::Front)),
            ]),
            session_presets: vec![SessionPreset::High, SessionPreset::Medium, SessionPreset::Low],
            still_script: Arc::new(StillScript::default()),
            still_connected: Arc::new(AtomicBool::new(true)),
            movie_rig: Arc::new(MovieRig::new()),
        }
    }

    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        let backend = Self::new();
        *backend.devices.lock() = devices.into_iter().map(Arc::new).collect();
        backend
    }

    pub fn device_at(&self, position: CameraPosition) -> Option<Arc<MockDevice>> {
        self.devices.lock().iter().find(|d| d.position == position).cloned()
    }
}

impl CaptureBackend for MockBackend {
    fn video_devices(&self) -> Vec<Arc<dyn CameraDevice>> {
        self.devices
            .lock()
            .iter()
            .map(|d| d.clone() as Arc<dyn CameraDevice>)
            .collect()
    }

    fn session_presets(&self) -> Vec<SessionPreset> {
        self.session_presets.clone()
    }

    fn new_still_output(&self, _encoding: ImageEncoding) -> Box<dyn StillOutput> {
        Box::new(MockStillOutput {
            script: self.still_script.clone(),
            connected: self.still_connected.clone(),
        })
    }

    fn new_movie_output(&self, limits: RecordingLimits) -> Box<dyn MovieOutput> {
        *self.movie_rig.max_duration.lock() = limits.max_duration;
        Box::new(MockMovieOutput {
            rig: self.movie_rig.clone(),
        })
    }
}
