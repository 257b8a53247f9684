//! Debounced, last-write-wins persistence batching.
//!
//! Pointer moves mutate geometry many times per second. Instead of writing on
//! every move, mutations land in one pending slot per entity and are flushed
//! together once the debounce deadline passes, or immediately at lifecycle
//! boundaries (view hidden, board switch, engine close).

use crate::board::{Frame, Item, ItemId};
use crate::storage::Store;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// What a flush wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Items handed to `save_items_batch`.
    pub items: usize,
    /// Whether the frame set was handed to `save_frames`.
    pub frames: bool,
    /// Number of store calls that failed. Failed writes are dropped.
    pub failures: usize,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.items == 0 && !self.frames
    }
}

/// Pending writes for one open board.
#[derive(Debug)]
pub struct PersistQueue {
    delay: Duration,
    pending_items: HashMap<ItemId, Item>,
    frames_dirty: bool,
    /// Scheduled flush time. `Some` means the timer is armed.
    deadline: Option<Instant>,
}

impl PersistQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_items: HashMap::new(),
            frames_dirty: false,
            deadline: None,
        }
    }

    /// Store the latest geometry for an item, replacing any pending version.
    pub fn enqueue(&mut self, item: Item, now: Instant) {
        self.pending_items.insert(item.id, item);
        self.arm(now);
    }

    /// Mark the frame set as needing a write.
    pub fn enqueue_frames(&mut self, now: Instant) {
        self.frames_dirty = true;
        self.arm(now);
    }

    /// Drop a pending write, e.g. because the item was deleted.
    pub fn cancel(&mut self, id: ItemId) {
        self.pending_items.remove(&id);
        if self.pending_items.is_empty() && !self.frames_dirty {
            self.deadline = None;
        }
    }

    fn arm(&mut self, now: Instant) {
        // Later enqueues never push the deadline back
        if self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending_items(&self) -> usize {
        self.pending_items.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_items.is_empty() || self.frames_dirty
    }

    /// Flush if the deadline has passed. Call from the host event loop.
    pub fn poll<S: Store + ?Sized>(
        &mut self,
        store: &S,
        board_id: &str,
        frames: &[Frame],
        now: Instant,
    ) -> Option<FlushReport> {
        match self.deadline {
            Some(deadline) if now >= deadline => Some(self.flush(store, board_id, frames)),
            _ => None,
        }
    }

    /// Drain every pending slot into one batched write per entity class.
    ///
    /// Store failures are logged and swallowed; the in-memory board stays
    /// authoritative and the next mutation will be written again.
    pub fn flush<S: Store + ?Sized>(&mut self, store: &S, board_id: &str, frames: &[Frame]) -> FlushReport {
        self.deadline = None;
        let mut report = FlushReport::default();

        if !self.pending_items.is_empty() {
            let mut batch: Vec<Item> = self.pending_items.drain().map(|(_, item)| item).collect();
            batch.sort_by_key(|item| item.id);
            report.items = batch.len();
            if let Err(e) = store.save_items_batch(board_id, &batch) {
                log::error!("Failed to save {} item(s) on board {}: {}", batch.len(), board_id, e);
                report.failures += 1;
            }
        }

        if std::mem::take(&mut self.frames_dirty) {
            report.frames = true;
            if let Err(e) = store.save_frames(board_id, frames) {
                log::error!("Failed to save frames on board {}: {}", board_id, e);
                report.failures += 1;
            }
        }

        if !report.is_empty() {
            log::debug!(
                "Flushed board {}: {} item(s), frames: {}",
                board_id,
                report.items,
                report.frames
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Geometry;
    use crate::storage::{MemoryStore, WriteRecord};
    use uuid::Uuid;

    const DELAY: Duration = Duration::from_millis(250);

    fn item() -> Item {
        Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0))
    }

    #[test]
    fn test_coalesces_same_item() {
        let store = MemoryStore::new();
        let mut queue = PersistQueue::new(DELAY);
        let t0 = Instant::now();
        let mut it = item();

        for i in 0..50u32 {
            it.geometry.x = f64::from(i);
            queue.enqueue(it.clone(), t0 + Duration::from_millis(u64::from(i)));
        }
        assert_eq!(queue.pending_items(), 1);
        assert!(queue.poll(&store, "b", &[], t0 + Duration::from_millis(100)).is_none());

        let report = queue.poll(&store, "b", &[], t0 + DELAY).expect("flush due");
        assert_eq!(report.items, 1);

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            WriteRecord::Items { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].geometry.x, 49.0);
            }
            other => panic!("unexpected write {other:?}"),
        }
    }

    #[test]
    fn test_deadline_not_extended() {
        let mut queue = PersistQueue::new(DELAY);
        let t0 = Instant::now();
        queue.enqueue(item(), t0);
        queue.enqueue(item(), t0 + Duration::from_millis(200));
        assert_eq!(queue.deadline(), Some(t0 + DELAY));
    }

    #[test]
    fn test_flush_clears_timer_and_batches() {
        let store = MemoryStore::new();
        let mut queue = PersistQueue::new(DELAY);
        let t0 = Instant::now();
        queue.enqueue(item(), t0);
        queue.enqueue(item(), t0);
        queue.enqueue_frames(t0);

        let report = queue.flush(&store, "b", &[]);
        assert_eq!(report, FlushReport { items: 2, frames: true, failures: 0 });
        assert!(queue.deadline().is_none());
        assert!(!queue.has_pending());
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn test_empty_flush_writes_nothing() {
        let store = MemoryStore::new();
        let mut queue = PersistQueue::new(DELAY);
        assert!(queue.flush(&store, "b", &[]).is_empty());
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_failure_is_swallowed_and_not_retried() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut queue = PersistQueue::new(DELAY);
        queue.enqueue(item(), Instant::now());

        let report = queue.flush(&store, "b", &[]);
        assert_eq!(report.failures, 1);
        assert!(!queue.has_pending());

        store.set_fail_writes(false);
        assert!(queue.flush(&store, "b", &[]).is_empty());
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn test_cancel_disarms_when_empty() {
        let mut queue = PersistQueue::new(DELAY);
        let it = item();
        queue.enqueue(it.clone(), Instant::now());
        queue.cancel(it.id);
        assert!(queue.deadline().is_none());
        assert!(!queue.has_pending());
    }
}
