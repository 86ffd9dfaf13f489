//! Save pipeline
//!
//! Bridges captured media into the durable library. The whole transaction
//! runs on the persistence context so a slow library write never stalls the
//! next capture; the resolved asset handle (or `None` on any failure) is
//! delivered to the caller's completion on the notification context.

use super::{AssetHandle, LibraryTransaction, Location, MediaLibrary, PlaceholderId};
use crate::context::Contexts;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

pub struct SavePipeline {
    library: Arc<dyn MediaLibrary>,
    contexts: Arc<Contexts>,
}

impl SavePipeline {
    pub fn new(library: Arc<dyn MediaLibrary>, contexts: Arc<Contexts>) -> Self {
        Self { library, contexts }
    }

    /// Persist one entry produced by `producer` inside a library
    /// transaction, stamping creation time and the optional location.
    ///
    /// `completion` receives the resolved handle on success, `None` on a
    /// failed transaction or when no placeholder was produced.
    pub fn save(
        &self,
        producer: impl FnOnce(&mut dyn LibraryTransaction) -> Option<PlaceholderId> + Send + 'static,
        location: Option<Location>,
        completion: impl FnOnce(Option<AssetHandle>) + Send + 'static,
    ) {
        let library = self.library.clone();
        let notification = self.contexts.notification.clone();

        self.contexts.persistence.submit(move || {
            let mut producer = Some(producer);
            let mut placeholder = None;

            let result = library.perform_changes(&mut |txn| {
                if let Some(producer) = producer.take() {
                    if let Some(id) = producer(txn) {
                        txn.set_creation_date(Utc::now());
                        if let Some(location) = location {
                            txn.set_location(location);
                        }
                        placeholder = Some(id);
                    }
                }
            });

            let handle = match (result, placeholder) {
                (Ok(()), Some(id)) => library.resolve_placeholder(&id),
                (Ok(()), None) => {
                    tracing::warn!("library transaction produced no placeholder");
                    None
                }
                (Err(e), _) => {
                    tracing::warn!("library transaction failed: {e}");
                    None
                }
            };

            notification.submit(move || completion(handle));
        });
    }

    /// Persist a captured still image.
    pub fn save_image(
        &self,
        bytes: Vec<u8>,
        location: Option<Location>,
        completion: impl FnOnce(Option<AssetHandle>) + Send + 'static,
    ) {
        self.save(
            move |txn| txn.create_asset_from_image(&bytes),
            location,
            completion,
        );
    }

    /// Persist a recorded video file.
    pub fn save_video(
        &self,
        path: PathBuf,
        location: Option<Location>,
        completion: impl FnOnce(Option<AssetHandle>) + Send + 'static,
    ) {
        self.save(
            move |txn| txn.create_asset_from_video_file(&path),
            location,
            completion,
        );
    }
}
