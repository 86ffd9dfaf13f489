//! Recording coordinator
//!
//! Owns the movie output and the asynchronous start/stop acknowledgement
//! protocol, isolating callers from hardware-callback races. One pending
//! completion slot exists per direction, so a caller's completion fires
//! exactly once per start/stop pair, never twice and never zero times.

use super::state::RecordingState;
use crate::context::SerialContext;
use crate::hal::{MovieEvent, MovieOutput};
use crate::orientation::VideoOrientation;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Events emitted during recording, for observers that did not issue the
/// start/stop request (e.g. a hardware-triggered max-duration stop).
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// Hardware confirmed the recording started
    Started,
    /// Recording reached its terminal outcome; carries the recorded file on
    /// success, `None` on failure
    Finished(Option<PathBuf>),
}

type StartCompletion = Box<dyn FnOnce(bool) + Send>;
type StopCompletion = Box<dyn FnOnce(Option<PathBuf>) + Send>;

#[derive(Default)]
struct Slots {
    state: RecordingState,
    pending_start: Option<StartCompletion>,
    pending_stop: Option<StopCompletion>,
}

struct Shared {
    slots: Mutex<Slots>,
    recording: Arc<AtomicBool>,
    notification: SerialContext,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl Shared {
    fn notify_start(&self, completion: StartCompletion, confirmed: bool) {
        self.notification.submit(move || completion(confirmed));
    }

    fn notify_stop(&self, completion: StopCompletion, file: Option<PathBuf>) {
        self.notification.submit(move || completion(file));
    }

    fn handle_event(&self, event: MovieEvent) {
        match event {
            MovieEvent::DidStart { path } => {
                tracing::debug!("recording started: {}", path.display());
                self.recording.store(true, Ordering::SeqCst);

                let mut slots = self.slots.lock();
                if slots.state == RecordingState::AwaitingStartAck {
                    slots.state = RecordingState::Recording;
                }
                let pending = slots.pending_start.take();
                drop(slots);

                if let Some(completion) = pending {
                    self.notify_start(completion, true);
                }
                let _ = self.event_tx.send(RecordingEvent::Started);
            }
            MovieEvent::DidFinish { path, error } => {
                let success = match &error {
                    None => true,
                    // A stop forced by a configured maximum duration or
                    // file size still yields a valid recording.
                    Some(e) if e.successfully_finished => {
                        tracing::debug!("recording force-stopped: {}", e.message);
                        true
                    }
                    Some(e) => {
                        tracing::warn!("recording failed: {}", e.message);
                        false
                    }
                };
                let file = success.then_some(path);

                self.recording.store(false, Ordering::SeqCst);

                let mut slots = self.slots.lock();
                slots.state = RecordingState::Idle;
                let start = slots.pending_start.take();
                let stop = slots.pending_stop.take();
                drop(slots);

                // A terminal event before the start acknowledgement means
                // the recording never confirmed.
                if let Some(completion) = start {
                    self.notify_start(completion, false);
                }
                if let Some(completion) = stop {
                    self.notify_stop(completion, file.clone());
                }
                let _ = self.event_tx.send(RecordingEvent::Finished(file));
            }
        }
    }
}

/// Coordinates one movie output and its acknowledgement races.
pub struct RecordingCoordinator {
    output: Box<dyn MovieOutput>,
    shared: Arc<Shared>,
    temp_path: PathBuf,
}

impl RecordingCoordinator {
    /// Wire up a coordinator around `output`. New recordings are written to
    /// `temp_path`; any stale file there is cleared before each start.
    pub fn new(
        mut output: Box<dyn MovieOutput>,
        temp_path: PathBuf,
        notification: SerialContext,
        recording: Arc<AtomicBool>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        output.set_event_sink(tx);

        let (event_tx, _) = broadcast::channel(16);
        let shared = Arc::new(Shared {
            slots: Mutex::new(Slots::default()),
            recording,
            notification,
            event_tx,
        });

        let handler = shared.clone();
        tokio::spawn(async move {
            let mut rx: mpsc::UnboundedReceiver<MovieEvent> = rx;
            while let Some(event) = rx.recv().await {
                handler.handle_event(event);
            }
        });

        Self {
            output,
            shared,
            temp_path,
        }
    }

    /// Whether a recording is currently running, per the last hardware
    /// acknowledgement. Safe to read from any context.
    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RecordingState {
        self.shared.slots.lock().state
    }

    /// Subscribe to recording events.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Request recording start. `completion` resolves `true` once the
    /// hardware confirms the recording actually began, `false` if it could
    /// not start or a recording session already exists.
    pub fn start(&mut self, orientation: VideoOrientation, completion: impl FnOnce(bool) + Send + 'static) {
        let mut slots = self.shared.slots.lock();

        if slots.state.is_active() {
            tracing::warn!("start requested while a recording session exists");
            drop(slots);
            self.shared.notify_start(Box::new(completion), false);
            return;
        }
        if !self.output.has_active_connection() {
            drop(slots);
            self.shared.notify_start(Box::new(completion), false);
            return;
        }

        if self.temp_path.exists() {
            let _ = std::fs::remove_file(&self.temp_path);
        }

        slots.pending_start = Some(Box::new(completion));
        slots.state = RecordingState::AwaitingStartAck;
        drop(slots);

        tracing::info!("starting recording to {}", self.temp_path.display());
        self.output.start_recording(&self.temp_path, orientation);
    }

    /// Request recording stop. `completion` resolves with the recorded
    /// file on success, `None` on failure or when nothing was recording.
    /// Legal before the start acknowledgement has arrived; the terminal
    /// outcome is then whatever the hardware reports.
    pub fn stop(&mut self, completion: impl FnOnce(Option<PathBuf>) + Send + 'static) {
        let mut slots = self.shared.slots.lock();

        if !slots.state.can_stop() {
            drop(slots);
            self.shared.notify_stop(Box::new(completion), None);
            return;
        }

        slots.pending_stop = Some(Box::new(completion));
        slots.state = RecordingState::AwaitingStopAck;
        drop(slots);

        tracing::info!("stopping recording");
        self.output.stop_recording();
    }
}
