//! Boundary to the note collaborator.
//!
//! The engine never reads note content; it only needs to know whether a note
//! still exists and in which order notes are navigated.

use crate::board::NoteId;
use std::collections::HashSet;

/// Read-only view of the notes on the open board.
pub trait NoteDirectory {
    /// Whether the note still exists.
    fn exists(&self, note_id: NoteId) -> bool;

    /// Notes in navigation order.
    fn ordering(&self) -> Vec<NoteId>;
}

/// A fixed list of notes, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct NoteList {
    order: Vec<NoteId>,
    index: HashSet<NoteId>,
}

impl NoteList {
    pub fn new(order: Vec<NoteId>) -> Self {
        let index = order.iter().copied().collect();
        Self { order, index }
    }

    pub fn push(&mut self, note_id: NoteId) {
        if self.index.insert(note_id) {
            self.order.push(note_id);
        }
    }

    pub fn remove(&mut self, note_id: NoteId) {
        if self.index.remove(&note_id) {
            self.order.retain(|id| *id != note_id);
        }
    }
}

impl NoteDirectory for NoteList {
    fn exists(&self, note_id: NoteId) -> bool {
        self.index.contains(&note_id)
    }

    fn ordering(&self) -> Vec<NoteId> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_note_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut notes = NoteList::new(vec![a]);
        notes.push(b);
        notes.push(a);
        assert_eq!(notes.ordering(), vec![a, b]);
        notes.remove(a);
        assert!(!notes.exists(a));
        assert!(notes.exists(b));
    }
}
