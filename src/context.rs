//! Serialized execution contexts
//!
//! The pipeline runs on three independent lanes: a hardware context for
//! session configuration and capture, a persistence context for library
//! transactions, and a notification context for delegate callbacks and
//! caller completions. Jobs submitted to the same lane run in submission
//! order, one at a time, so code running inside a lane needs no locking
//! against itself.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A FIFO lane of execution backed by a single tokio task.
#[derive(Clone)]
pub struct SerialContext {
    label: &'static str,
    tx: mpsc::UnboundedSender<Job>,
}

impl SerialContext {
    /// Spawn a new lane. Requires a running tokio runtime.
    pub fn new(label: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
        });
        Self { label, tx }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Submit a job to the lane. Jobs run in submission order.
    ///
    /// Submission after the lane has shut down is silently dropped; the
    /// lane only shuts down when every handle to it is gone, at which
    /// point nobody is left to observe the job.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            tracing::debug!(lane = self.label, "job dropped after lane shutdown");
        }
    }

    /// Wait until every job submitted before this call has run.
    ///
    /// Used by teardown and by tests to establish a happens-before edge
    /// with work already queued on the lane.
    pub async fn drain(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(move || {
            let _ = done_tx.send(());
        });
        let _ = done_rx.await;
    }
}

impl std::fmt::Debug for SerialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialContext").field("label", &self.label).finish()
    }
}

/// The three lanes the capture pipeline runs on.
#[derive(Clone, Debug)]
pub struct Contexts {
    /// Session configuration, device attach/detach, capture requests.
    pub hardware: SerialContext,
    /// Library-write transactions.
    pub persistence: SerialContext,
    /// Delegate callbacks and caller completions.
    pub notification: SerialContext,
}

impl Contexts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            hardware: SerialContext::new("hardware"),
            persistence: SerialContext::new("persistence"),
            notification: SerialContext::new("notification"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn jobs_run_in_submission_order() {
        let lane = SerialContext::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let seen = seen.clone();
            lane.submit(move || seen.lock().push(i));
        }
        lane.drain().await;

        let seen = seen.lock();
        assert_eq!(*seen, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn drain_waits_for_prior_jobs() {
        let lane = SerialContext::new("test");
        let done = Arc::new(Mutex::new(false));

        let flag = done.clone();
        lane.submit(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            *flag.lock() = true;
        });
        lane.drain().await;

        assert!(*done.lock());
    }
}
