//! In-process media library
//!
//! A transactional library keeping committed assets in memory. Serves as
//! the crate's reference [`MediaLibrary`] implementation for headless hosts
//! and as the library double in the test suite. Entries are staged inside
//! the transaction and committed in one move, so a failed transaction
//! leaves nothing resolvable behind.

use super::{AssetHandle, LibraryTransaction, Location, MediaLibrary, PlaceholderId};
use crate::error::{CaptureError, CaptureResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Kind of a committed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Photo,
    Video,
}

/// A committed library entry.
#[derive(Debug, Clone)]
pub struct Asset {
    pub kind: AssetKind,
    pub image_bytes: Option<Vec<u8>>,
    pub video_path: Option<PathBuf>,
    pub creation_date: Option<DateTime<Utc>>,
    pub location: Option<Location>,
}

#[derive(Default)]
struct Store {
    assets: HashMap<AssetHandle, Asset>,
    placeholders: HashMap<PlaceholderId, AssetHandle>,
}

/// In-memory transactional media library.
#[derive(Default)]
pub struct MemoryLibrary {
    store: Mutex<Store>,
    fail_next: AtomicBool,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transaction fail after its body has run, discarding
    /// everything it staged. Test hook for the atomicity guarantee.
    pub fn fail_next_transaction(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn asset(&self, handle: &AssetHandle) -> Option<Asset> {
        self.store.lock().assets.get(handle).cloned()
    }

    pub fn asset_count(&self) -> usize {
        self.store.lock().assets.len()
    }
}

struct MemoryTransaction {
    staged: Vec<(PlaceholderId, Asset)>,
}

impl MemoryTransaction {
    fn last_staged(&mut self) -> Option<&mut Asset> {
        self.staged.last_mut().map(|(_, asset)| asset)
    }
}

impl LibraryTransaction for MemoryTransaction {
    fn create_asset_from_image(&mut self, bytes: &[u8]) -> Option<PlaceholderId> {
        let id = PlaceholderId::new();
        self.staged.push((
            id.clone(),
            Asset {
                kind: AssetKind::Photo,
                image_bytes: Some(bytes.to_vec()),
                video_path: None,
                creation_date: None,
                location: None,
            },
        ));
        Some(id)
    }

    fn create_asset_from_video_file(&mut self, path: &Path) -> Option<PlaceholderId> {
        if !path.exists() {
            return None;
        }
        let id = PlaceholderId::new();
        self.staged.push((
            id.clone(),
            Asset {
                kind: AssetKind::Video,
                image_bytes: None,
                video_path: Some(path.to_path_buf()),
                creation_date: None,
                location: None,
            },
        ));
        Some(id)
    }

    fn set_creation_date(&mut self, date: DateTime<Utc>) {
        if let Some(asset) = self.last_staged() {
            asset.creation_date = Some(date);
        }
    }

    fn set_location(&mut self, location: Location) {
        if let Some(asset) = self.last_staged() {
            asset.location = Some(location);
        }
    }
}

impl MediaLibrary for MemoryLibrary {
    fn perform_changes(
        &self,
        body: &mut dyn FnMut(&mut dyn LibraryTransaction),
    ) -> CaptureResult<()> {
        let mut txn = MemoryTransaction { staged: Vec::new() };
        body(&mut txn);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::Persistence("injected transaction failure".into()));
        }

        let mut store = self.store.lock();
        for (placeholder, asset) in txn.staged {
            let handle = AssetHandle::new();
            store.placeholders.insert(placeholder, handle.clone());
            store.assets.insert(handle, asset);
        }
        Ok(())
    }

    fn resolve_placeholder(&self, placeholder: &PlaceholderId) -> Option<AssetHandle> {
        self.store.lock().placeholders.get(placeholder).cloned()
    }
}
