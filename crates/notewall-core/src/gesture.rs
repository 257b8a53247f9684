//! Per-pointer gesture state machine.
//!
//! Every pointer is either idle (absent from the machine) or owns exactly one
//! [`Gesture`]. A gesture is created on press, advanced by moves and retired
//! on release or cancel. Drag and resize gestures keep the pointer position
//! and geometry from the press and recompute the result from them on every
//! move, so the outcome depends only on the total pointer travel.

use crate::board::{Board, FrameId, Geometry, ItemId};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::handles::{ResizeHandle, apply_drag, apply_resize};
use crate::hit::{HitPart, PressTarget};
use crate::input::PointerId;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Kind of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Pan,
    DragItem,
    ResizeItem,
    DragFrame,
    ResizeFrame,
}

/// An in-flight press-move-release interaction for one pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Panning the canvas while the pan key is held.
    Pan {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving an item by its header.
    DragItem {
        id: ItemId,
        start_pointer: Point,
        start: Geometry,
    },
    /// Resizing an item from one of its handles.
    ResizeItem {
        id: ItemId,
        handle: ResizeHandle,
        start_pointer: Point,
        start: Geometry,
    },
    /// Moving a frame by its header.
    DragFrame {
        id: FrameId,
        start_pointer: Point,
        start: Geometry,
    },
    /// Resizing a frame from one of its handles.
    ResizeFrame {
        id: FrameId,
        handle: ResizeHandle,
        start_pointer: Point,
        start: Geometry,
    },
}

/// Geometry change produced by one move event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Camera,
    Item(ItemId),
    Frame(FrameId),
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Pan { .. } => GestureKind::Pan,
            Self::DragItem { .. } => GestureKind::DragItem,
            Self::ResizeItem { .. } => GestureKind::ResizeItem,
            Self::DragFrame { .. } => GestureKind::DragFrame,
            Self::ResizeFrame { .. } => GestureKind::ResizeFrame,
        }
    }

    /// Id of the entity the gesture operates on (`None` for panning).
    pub fn target_id(&self) -> Option<uuid::Uuid> {
        match self {
            Self::Pan { .. } => None,
            Self::DragItem { id, .. }
            | Self::ResizeItem { id, .. }
            | Self::DragFrame { id, .. }
            | Self::ResizeFrame { id, .. } => Some(*id),
        }
    }

    /// Decide which gesture, if any, a press starts.
    ///
    /// Panning requires the pan key and a press outside any item or frame
    /// handle/header. Presses on a body start nothing; the caller treats them
    /// as activation clicks.
    pub fn from_press(target: &PressTarget, position: Point, board: &Board, pan_enabled: bool) -> Option<Self> {
        match *target {
            PressTarget::Canvas | PressTarget::Frame { part: HitPart::Body, .. } if pan_enabled => {
                Some(Self::Pan { last_screen: position })
            }
            PressTarget::Item { id, part } => {
                let start = board.item(id)?.geometry;
                match part {
                    HitPart::Header => Some(Self::DragItem { id, start_pointer: position, start }),
                    HitPart::Handle(handle) => Some(Self::ResizeItem { id, handle, start_pointer: position, start }),
                    HitPart::Body => None,
                }
            }
            PressTarget::Frame { id, part } => {
                let start = board.frame(id)?.geometry;
                match part {
                    HitPart::Header => Some(Self::DragFrame { id, start_pointer: position, start }),
                    HitPart::Handle(handle) => Some(Self::ResizeFrame { id, handle, start_pointer: position, start }),
                    HitPart::Body => None,
                }
            }
            PressTarget::Canvas => None,
        }
    }

    /// Advance the gesture to a new pointer position.
    ///
    /// Returns `None` when nothing changed, including when the target entity
    /// has disappeared since the press.
    pub fn on_move(
        &mut self,
        position: Point,
        board: &mut Board,
        camera: &mut Camera,
        config: &EngineConfig,
    ) -> Option<Mutation> {
        match self {
            Self::Pan { last_screen } => move_pan(last_screen, position, camera),
            Self::DragItem { id, start_pointer, start } => {
                let delta = world_delta(*start_pointer, position, camera);
                move_item(board, *id, apply_drag(start, delta))
            }
            Self::ResizeItem { id, handle, start_pointer, start } => {
                let delta = world_delta(*start_pointer, position, camera);
                let next = apply_resize(start, *handle, delta, config.min_width, config.min_height);
                move_item(board, *id, next)
            }
            Self::DragFrame { id, start_pointer, start } => {
                let delta = world_delta(*start_pointer, position, camera);
                move_frame(board, *id, apply_drag(start, delta))
            }
            Self::ResizeFrame { id, handle, start_pointer, start } => {
                let delta = world_delta(*start_pointer, position, camera);
                let next = apply_resize(start, *handle, delta, config.min_width, config.min_height);
                move_frame(board, *id, next)
            }
        }
    }
}

/// Pointer travel since the press, converted to world units at the current scale.
fn world_delta(start_pointer: Point, position: Point, camera: &Camera) -> Vec2 {
    camera.screen_delta_to_world(position - start_pointer)
}

fn move_pan(last_screen: &mut Point, position: Point, camera: &mut Camera) -> Option<Mutation> {
    let delta = position - *last_screen;
    *last_screen = position;
    if delta == Vec2::ZERO {
        return None;
    }
    camera.pan(delta);
    Some(Mutation::Camera)
}

fn move_item(board: &mut Board, id: ItemId, next: Geometry) -> Option<Mutation> {
    let item = board.item_mut(id)?;
    if item.geometry == next {
        return None;
    }
    item.geometry = next;
    Some(Mutation::Item(id))
}

fn move_frame(board: &mut Board, id: FrameId, next: Geometry) -> Option<Mutation> {
    let frame = board.frame_mut(id)?;
    if frame.geometry == next {
        return None;
    }
    frame.geometry = next;
    frame.touch();
    Some(Mutation::Frame(id))
}

/// Active gestures keyed by pointer, plus the pan-enable key state.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    active: HashMap<PointerId, Gesture>,
    pan_key_held: bool,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pan_enabled(&self) -> bool {
        self.pan_key_held
    }

    /// Press or release the pan-enable key.
    ///
    /// Releasing it aborts every in-flight pan; the aborted pointers are
    /// returned so the host can release their capture.
    pub fn set_pan_key(&mut self, held: bool) -> Vec<PointerId> {
        self.pan_key_held = held;
        if held {
            return Vec::new();
        }
        let aborted: Vec<PointerId> = self
            .active
            .iter()
            .filter(|(_, gesture)| gesture.kind() == GestureKind::Pan)
            .map(|(pointer, _)| *pointer)
            .collect();
        for pointer in &aborted {
            self.active.remove(pointer);
        }
        aborted
    }

    /// Install a gesture for a pointer, replacing any stale one it still owned.
    pub fn begin(&mut self, pointer: PointerId, gesture: Gesture) {
        if let Some(stale) = self.active.insert(pointer, gesture) {
            log::trace!("Pointer {} pressed again; dropping stale {:?}", pointer, stale.kind());
        }
    }

    pub fn get(&self, pointer: PointerId) -> Option<&Gesture> {
        self.active.get(&pointer)
    }

    pub fn is_idle(&self, pointer: PointerId) -> bool {
        !self.active.contains_key(&pointer)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Route a move to the pointer's gesture. Unknown pointers are ignored.
    pub fn on_move(
        &mut self,
        pointer: PointerId,
        position: Point,
        board: &mut Board,
        camera: &mut Camera,
        config: &EngineConfig,
    ) -> Option<Mutation> {
        let Some(gesture) = self.active.get_mut(&pointer) else {
            log::trace!("Ignoring move for idle pointer {}", pointer);
            return None;
        };
        gesture.on_move(position, board, camera, config)
    }

    /// Retire the pointer's gesture, returning it to idle.
    pub fn end(&mut self, pointer: PointerId) -> Option<Gesture> {
        self.active.remove(&pointer)
    }

    /// Drop every gesture, e.g. when the board is switched.
    pub fn abort_all(&mut self) -> Vec<PointerId> {
        self.active.drain().map(|(pointer, _)| pointer).collect()
    }
}
