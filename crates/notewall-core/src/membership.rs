//! Frame membership resolution.
//!
//! Membership is never stored as ground truth: an item belongs to the frame
//! that geometrically contains its center, recomputed on demand.

use crate::board::{Frame, FrameId, Geometry, Item, NoteId};
use std::cmp::Ordering;

/// Resolve the frame containing the center of `geometry`.
///
/// With several candidates the smallest frame by area wins. Equal areas fall
/// back to the smallest frame id so the answer does not depend on the order
/// frames were loaded in.
pub fn resolve_frame(geometry: &Geometry, frames: &[Frame]) -> Option<FrameId> {
    let center = geometry.center();
    frames
        .iter()
        .filter(|frame| frame.geometry.contains(center))
        .min_by(|a, b| {
            a.geometry
                .area()
                .partial_cmp(&b.geometry.area())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|frame| frame.id)
}

/// Resolve the frame an item belongs to.
pub fn resolve_item_frame(item: &Item, frames: &[Frame]) -> Option<FrameId> {
    resolve_frame(&item.geometry, frames)
}

/// Notes whose items currently resolve into `frame_id`.
pub fn members_of(frame_id: FrameId, items: &[Item], frames: &[Frame]) -> Vec<NoteId> {
    items
        .iter()
        .filter(|item| resolve_item_frame(item, frames) == Some(frame_id))
        .map(|item| item.note_id)
        .collect()
}
