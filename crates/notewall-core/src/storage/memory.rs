//! In-memory storage implementation.

use super::{BoardRecord, Store, StorageError, StorageResult};
use crate::board::{Frame, Item, ItemId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

/// One write call observed by a `MemoryStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRecord {
    Items { board_id: String, items: Vec<Item> },
    Frames { board_id: String, frames: Vec<Frame> },
    Delete { board_id: String, ids: Vec<ItemId> },
}

/// In-memory storage for tests and ephemeral boards.
///
/// Records every write call so tests can assert on batching, and can be told
/// to fail writes to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<String, BoardRecord>>,
    writes: Mutex<Vec<WriteRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a board directly, bypassing the write log.
    pub fn insert_board(&self, board_id: &str, record: BoardRecord) -> StorageResult<()> {
        let mut boards = self.boards.write().map_err(lock_error)?;
        boards.insert(board_id.to_string(), record);
        Ok(())
    }

    /// Snapshot of a board's stored state.
    pub fn board(&self, board_id: &str) -> Option<BoardRecord> {
        self.boards.read().ok()?.get(board_id).cloned()
    }

    /// Every write call made so far, in order.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, write: WriteRecord) -> StorageResult<()> {
        self.writes.lock().map_err(lock_error)?.push(write);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        Ok(())
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Store for MemoryStore {
    fn load_items(&self, board_id: &str) -> StorageResult<Vec<Item>> {
        let boards = self.boards.read().map_err(lock_error)?;
        Ok(boards.get(board_id).map(|b| b.items.clone()).unwrap_or_default())
    }

    fn load_frames(&self, board_id: &str) -> StorageResult<Vec<Frame>> {
        let boards = self.boards.read().map_err(lock_error)?;
        Ok(boards.get(board_id).map(|b| b.frames.clone()).unwrap_or_default())
    }

    fn save_items_batch(&self, board_id: &str, items: &[Item]) -> StorageResult<()> {
        self.record(WriteRecord::Items { board_id: board_id.to_string(), items: items.to_vec() })?;
        let mut boards = self.boards.write().map_err(lock_error)?;
        boards.entry(board_id.to_string()).or_default().upsert_items(items);
        Ok(())
    }

    fn save_frames(&self, board_id: &str, frames: &[Frame]) -> StorageResult<()> {
        self.record(WriteRecord::Frames { board_id: board_id.to_string(), frames: frames.to_vec() })?;
        let mut boards = self.boards.write().map_err(lock_error)?;
        boards.entry(board_id.to_string()).or_default().frames = frames.to_vec();
        Ok(())
    }

    fn delete_items(&self, board_id: &str, ids: &[ItemId]) -> StorageResult<()> {
        self.record(WriteRecord::Delete { board_id: board_id.to_string(), ids: ids.to_vec() })?;
        let mut boards = self.boards.write().map_err(lock_error)?;
        if let Some(board) = boards.get_mut(board_id) {
            board.remove_items(ids);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Geometry;
    use uuid::Uuid;

    fn item(x: f64) -> Item {
        Item::new(Uuid::new_v4(), Geometry::new(x, 0.0, 320.0, 220.0))
    }

    #[test]
    fn test_unknown_board_is_empty() {
        let store = MemoryStore::new();
        assert!(store.load_items("nope").unwrap().is_empty());
        assert!(store.load_frames("nope").unwrap().is_empty());
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let store = MemoryStore::new();
        let mut a = item(0.0);
        store.save_items_batch("b", &[a.clone()]).unwrap();
        a.geometry.x = 99.0;
        store.save_items_batch("b", &[a.clone(), item(5.0)]).unwrap();

        let items = store.load_items("b").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].geometry.x, 99.0);
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn test_save_frames_replaces_set() {
        let store = MemoryStore::new();
        let f1 = Frame::new("one", Geometry::new(0.0, 0.0, 400.0, 400.0));
        let f2 = Frame::new("two", Geometry::new(0.0, 0.0, 400.0, 400.0));
        store.save_frames("b", &[f1, f2.clone()]).unwrap();
        store.save_frames("b", &[f2.clone()]).unwrap();
        assert_eq!(store.load_frames("b").unwrap(), vec![f2]);
    }

    #[test]
    fn test_delete_items() {
        let store = MemoryStore::new();
        let a = item(0.0);
        let b = item(1.0);
        store.save_items_batch("b", &[a.clone(), b.clone()]).unwrap();
        store.delete_items("b", &[a.id]).unwrap();
        assert_eq!(store.load_items("b").unwrap(), vec![b]);
    }

    #[test]
    fn test_failing_writes_are_recorded_but_not_applied() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let result = store.save_items_batch("b", &[item(0.0)]);
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(store.writes().len(), 1);
        assert!(store.load_items("b").unwrap().is_empty());
    }
}
