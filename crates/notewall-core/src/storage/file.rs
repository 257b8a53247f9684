//! File-based storage implementation for native platforms.

use super::{BoardRecord, Store, StorageError, StorageResult};
use crate::board::{Frame, Item, ItemId};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Stores each board as a JSON file holding its items and frames.
pub struct JsonFileStore {
    /// Base directory for board files.
    base_path: PathBuf,
}

impl JsonFileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/notewall/boards/`
    /// On Windows: `%LOCALAPPDATA%\notewall\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("notewall").join("boards"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a board ID.
    fn board_path(&self, board_id: &str) -> PathBuf {
        // Sanitize ID to be safe for filenames
        let safe_id: String = board_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    fn read(&self, board_id: &str) -> StorageResult<BoardRecord> {
        let path = self.board_path(board_id);
        if !path.exists() {
            return Ok(BoardRecord::default());
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write(&self, board_id: &str, record: &BoardRecord) -> StorageResult<()> {
        let path = self.board_path(board_id);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // Replace atomically via rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e)))
    }

    fn update(&self, board_id: &str, apply: impl FnOnce(&mut BoardRecord)) -> StorageResult<()> {
        let mut record = self.read(board_id)?;
        apply(&mut record);
        self.write(board_id, &record)
    }
}

impl Store for JsonFileStore {
    fn load_items(&self, board_id: &str) -> StorageResult<Vec<Item>> {
        Ok(self.read(board_id)?.items)
    }

    fn load_frames(&self, board_id: &str) -> StorageResult<Vec<Frame>> {
        Ok(self.read(board_id)?.frames)
    }

    fn save_items_batch(&self, board_id: &str, items: &[Item]) -> StorageResult<()> {
        self.update(board_id, |record| record.upsert_items(items))
    }

    fn save_frames(&self, board_id: &str, frames: &[Frame]) -> StorageResult<()> {
        self.update(board_id, |record| record.frames = frames.to_vec())
    }

    fn delete_items(&self, board_id: &str, ids: &[ItemId]) -> StorageResult<()> {
        self.update(board_id, |record| record.remove_items(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Geometry;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn store() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("boards")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_creates_directory() {
        let (_dir, store) = store();
        assert!(store.base_path().is_dir());
    }

    #[test]
    fn test_missing_board_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_items("fresh").unwrap().is_empty());
    }

    #[test]
    fn test_items_and_frames_persist_together() {
        let (_dir, store) = store();
        let mut item = Item::new(Uuid::new_v4(), Geometry::new(10.0, 20.0, 320.0, 220.0));
        item.z = 7.0;
        let mut frame = Frame::new("Ideas", Geometry::new(0.0, 0.0, 800.0, 600.0));
        frame.z = 3.0;
        frame.updated_at = 1.0;

        store.save_items_batch("board-1", &[item.clone()]).unwrap();
        store.save_frames("board-1", &[frame.clone()]).unwrap();

        assert_eq!(store.load_items("board-1").unwrap(), vec![item]);
        assert_eq!(store.load_frames("board-1").unwrap(), vec![frame]);
    }

    #[test]
    fn test_delete_items() {
        let (_dir, store) = store();
        let item = Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0));
        store.save_items_batch("b", &[item.clone()]).unwrap();
        store.delete_items("b", &[item.id]).unwrap();
        assert!(store.load_items("b").unwrap().is_empty());
    }

    #[test]
    fn test_board_id_is_sanitized() {
        let (_dir, store) = store();
        let path = store.board_path("../escape/me");
        assert_eq!(path.parent(), Some(store.base_path()));
    }

    #[test]
    fn test_corrupt_file_reports_serialization_error() {
        let (_dir, store) = store();
        fs::write(store.board_path("bad"), "{ nope").unwrap();
        assert!(matches!(store.load_items("bad"), Err(StorageError::Serialization(_))));
    }
}
