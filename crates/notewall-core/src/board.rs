//! Board entities: note placements (items) and frames.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Identifier of an item (a note's placement record).
pub type ItemId = Uuid;
/// Identifier of a note owned by the note collaborator.
pub type NoteId = Uuid;
/// Identifier of a frame.
pub type FrameId = Uuid;

/// Milliseconds since the Unix epoch, as a float.
pub fn timestamp_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Axis-aligned placement in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Inclusive containment: points on the boundary count as inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self { x: self.x + delta.x, y: self.y + delta.y, ..*self }
    }

    /// Grow width/height up to the given minimums, keeping the top-left corner.
    pub fn clamped_to_min(&self, min_width: f64, min_height: f64) -> Self {
        Self {
            width: self.width.max(min_width),
            height: self.height.max(min_height),
            ..*self
        }
    }
}

/// A note's placement on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub note_id: NoteId,
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Stacking order within the item class. Higher paints on top.
    pub z: f64,
}

impl Item {
    /// Create an item for a note, seeded with the current timestamp as z.
    pub fn new(note_id: NoteId, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_id,
            geometry,
            z: crate::zorder::seed_z(),
        }
    }
}

/// A named grouping region. Membership is computed from geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub name: String,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub z: f64,
    /// Last mutation time, milliseconds since the Unix epoch.
    pub updated_at: f64,
}

impl Frame {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        let now = timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            geometry,
            z: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp_millis();
    }
}

/// The entity collections of one board, exclusively owned by the engine
/// while the board is open.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub id: String,
    items: Vec<Item>,
    frames: Vec<Frame>,
}

impl Board {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), items: Vec::new(), frames: Vec::new() }
    }

    pub fn with_entities(id: impl Into<String>, items: Vec<Item>, frames: Vec<Frame>) -> Self {
        Self { id: id.into(), items, frames }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub(crate) fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn item_for_note(&self, note_id: NoteId) -> Option<&Item> {
        self.items.iter().find(|item| item.note_id == note_id)
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|frame| frame.id == id)
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
        let pos = self.frames.iter().position(|frame| frame.id == id)?;
        Some(self.frames.remove(pos))
    }

    /// Drop items whose note fails the predicate. Returns the removed items.
    pub fn retain_items(&mut self, mut keep: impl FnMut(&Item) -> bool) -> Vec<Item> {
        let (kept, dropped): (Vec<Item>, Vec<Item>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| keep(item));
        self.items = kept;
        dropped
    }

    /// Bounding box of every item and frame, if any exist.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .map(|item| item.geometry.rect())
            .chain(self.frames.iter().map(|frame| frame.geometry.rect()))
            .reduce(|acc, rect| acc.union(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_center_and_area() {
        let g = Geometry::new(10.0, 20.0, 320.0, 220.0);
        assert_eq!(g.center(), Point::new(170.0, 130.0));
        assert!((g.area() - 70_400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let g = Geometry::new(0.0, 0.0, 100.0, 50.0);
        assert!(g.contains(Point::new(0.0, 0.0)));
        assert!(g.contains(Point::new(100.0, 50.0)));
        assert!(!g.contains(Point::new(100.01, 25.0)));
    }

    #[test]
    fn test_item_serializes_flat() {
        let mut item = Item::new(Uuid::new_v4(), Geometry::new(1.0, 2.0, 320.0, 220.0));
        item.z = 42.0;
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["x"], 1.0);
        assert_eq!(value["width"], 320.0);
        assert!(value.get("geometry").is_none());
        let back: Item = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_add_remove_lookup() {
        let mut board = Board::new("b");
        let note = Uuid::new_v4();
        let item = Item::new(note, Geometry::new(0.0, 0.0, 320.0, 220.0));
        let id = item.id;
        board.add_item(item);
        assert_eq!(board.item_for_note(note).map(|i| i.id), Some(id));
        assert!(board.remove_item(id).is_some());
        assert!(board.item(id).is_none());
        assert!(board.remove_item(id).is_none());
    }

    #[test]
    fn test_bounds() {
        let mut board = Board::new("b");
        assert!(board.bounds().is_none());
        board.add_item(Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0)));
        board.add_frame(Frame::new("f", Geometry::new(-100.0, 500.0, 400.0, 300.0)));
        assert_eq!(board.bounds(), Some(Rect::new(-100.0, 0.0, 320.0, 800.0)));
    }

    #[test]
    fn test_retain_items() {
        let mut board = Board::new("b");
        let keep = Uuid::new_v4();
        board.add_item(Item::new(keep, Geometry::new(0.0, 0.0, 320.0, 220.0)));
        board.add_item(Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0)));
        let dropped = board.retain_items(|item| item.note_id == keep);
        assert_eq!(dropped.len(), 1);
        assert_eq!(board.items().len(), 1);
    }
}
