//! Media library boundary
//!
//! The durable library the save pipeline writes into. Writes are
//! transactional: a producer creates a pending entry inside the transaction
//! and receives a placeholder identifier, which becomes resolvable to a
//! stable asset handle only after the transaction commits.

pub mod memory;
pub mod save;

pub use memory::MemoryLibrary;
pub use save::SavePipeline;

use crate::error::CaptureResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Geographic coordinates attached to a saved asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Transaction-scoped handle for a not-yet-committed library entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderId(Uuid);

impl PlaceholderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaceholderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identifier of a committed library asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(Uuid);

impl AssetHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Mutation surface available inside a library transaction.
///
/// Creation date and location apply to the most recently created entry.
pub trait LibraryTransaction {
    fn create_asset_from_image(&mut self, bytes: &[u8]) -> Option<PlaceholderId>;
    fn create_asset_from_video_file(&mut self, path: &Path) -> Option<PlaceholderId>;
    fn set_creation_date(&mut self, date: DateTime<Utc>);
    fn set_location(&mut self, location: Location);
}

/// The durable media library.
///
/// `perform_changes` is atomic: either every entry created by `body` is
/// committed, or none is, and a placeholder from a failed transaction never
/// resolves.
pub trait MediaLibrary: Send + Sync {
    fn perform_changes(
        &self,
        body: &mut dyn FnMut(&mut dyn LibraryTransaction),
    ) -> CaptureResult<()>;

    fn resolve_placeholder(&self, placeholder: &PlaceholderId) -> Option<AssetHandle>;
}
