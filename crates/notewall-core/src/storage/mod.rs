//! Storage abstraction for persistence.

mod memory;
mod queue;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::{MemoryStore, WriteRecord};
pub use queue::{FlushReport, PersistQueue};

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

use crate::board::{Frame, Item, ItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backing store for item and frame placements.
///
/// Calls are synchronous and cheap (local storage class) and must be
/// idempotent: writing the same geometry twice leaves the same state.
pub trait Store {
    /// Load every item placed on a board. Unknown boards yield an empty list.
    fn load_items(&self, board_id: &str) -> StorageResult<Vec<Item>>;

    /// Load every frame on a board. Unknown boards yield an empty list.
    fn load_frames(&self, board_id: &str) -> StorageResult<Vec<Frame>>;

    /// Upsert a batch of items by id. Later writes win.
    fn save_items_batch(&self, board_id: &str, items: &[Item]) -> StorageResult<()>;

    /// Replace the board's frame set.
    fn save_frames(&self, board_id: &str, frames: &[Frame]) -> StorageResult<()>;

    /// Remove items, e.g. after their notes were deleted.
    fn delete_items(&self, board_id: &str, ids: &[ItemId]) -> StorageResult<()>;
}

impl<T: Store + ?Sized> Store for &T {
    fn load_items(&self, board_id: &str) -> StorageResult<Vec<Item>> {
        (**self).load_items(board_id)
    }

    fn load_frames(&self, board_id: &str) -> StorageResult<Vec<Frame>> {
        (**self).load_frames(board_id)
    }

    fn save_items_batch(&self, board_id: &str, items: &[Item]) -> StorageResult<()> {
        (**self).save_items_batch(board_id, items)
    }

    fn save_frames(&self, board_id: &str, frames: &[Frame]) -> StorageResult<()> {
        (**self).save_frames(board_id, frames)
    }

    fn delete_items(&self, board_id: &str, ids: &[ItemId]) -> StorageResult<()> {
        (**self).delete_items(board_id, ids)
    }
}

/// Everything persisted for one board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub items: Vec<Item>,
    pub frames: Vec<Frame>,
}

impl BoardRecord {
    /// Insert or overwrite items by id, keeping first-seen order.
    pub fn upsert_items(&mut self, items: &[Item]) {
        for item in items {
            match self.items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => self.items.push(item.clone()),
            }
        }
    }

    pub fn remove_items(&mut self, ids: &[ItemId]) {
        self.items.retain(|item| !ids.contains(&item.id));
    }
}
