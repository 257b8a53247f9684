//! The whiteboard engine: one instance per open view.
//!
//! [`Whiteboard`] owns the open board, the camera and the gesture machine, and
//! routes host input through them. Geometry changes are handed to the
//! persistence queue; camera changes only reach the renderer through
//! [`Whiteboard::take_visual_commit`].

use crate::board::{Board, Frame, FrameId, Geometry, Item, ItemId, NoteId};
use crate::camera::{Camera, CommitThrottle, ZoomOutcome};
use crate::config::{ConfigError, EngineConfig};
use crate::gesture::{Gesture, GestureKind, GestureMachine, Mutation};
use crate::hit::{HitPart, PressTarget, hit_test};
use crate::input::{ClickTracker, KeyEvent, MouseButton, PointerEvent, PointerId};
use crate::membership::{members_of, resolve_item_frame};
use crate::notes::NoteDirectory;
use crate::projection::{EntityRef, Projected, project_board};
use crate::storage::{FlushReport, PersistQueue, Store, StorageError, StorageResult};
use crate::zorder::bring_to_front;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Side effects the host must act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Route all further events of this pointer to the engine.
    CapturePointer { pointer: PointerId },
    /// The pointer's gesture ended; capture can be released.
    ReleasePointer { pointer: PointerId },
    /// A dragged note was dropped; `frame_id` is the frame it now sits in.
    FrameAssigned { note_id: NoteId, frame_id: Option<FrameId> },
    /// The user double-clicked empty canvas at this world position.
    CreateNoteRequested { world: Point },
    /// A wheel zoom was requested past the scale bounds.
    ZoomAtLimit,
}

/// Errors from opening an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Whiteboard interaction engine.
pub struct Whiteboard<S: Store, N: NoteDirectory> {
    config: EngineConfig,
    store: S,
    notes: N,
    board: Board,
    camera: Camera,
    throttle: CommitThrottle,
    gestures: GestureMachine,
    queue: PersistQueue,
    clicks: ClickTracker,
    /// Pointers whose press completed a double-click on empty canvas.
    pending_create: HashMap<PointerId, Point>,
    /// Last-known frame per note, refreshed on drag-end.
    membership: HashMap<NoteId, Option<FrameId>>,
    closed: bool,
}

impl<S: Store, N: NoteDirectory> Whiteboard<S, N> {
    /// Open a board, loading its items and frames from the store.
    ///
    /// The config is validated first; nothing is read from the store if it is
    /// rejected.
    pub fn open(config: EngineConfig, store: S, notes: N, board_id: &str) -> Result<Self, EngineError> {
        let camera = Camera::from_config(&config)?;
        let board = load_board(&store, &notes, &config, board_id)?;
        let mut engine = Self {
            camera,
            throttle: CommitThrottle::new(),
            gestures: GestureMachine::new(),
            queue: PersistQueue::new(config.flush_delay()),
            clicks: ClickTracker::new(config.double_click_window(), config.double_click_distance),
            pending_create: HashMap::new(),
            membership: HashMap::new(),
            closed: false,
            config,
            store,
            notes,
            board,
        };
        engine.refresh_membership();
        engine.throttle.mark();
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_id(&self) -> &str {
        &self.board.id
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notes(&self) -> &N {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut N {
        &mut self.notes
    }

    /// Whether the pointer has no active gesture.
    pub fn is_idle(&self, pointer: PointerId) -> bool {
        self.gestures.is_idle(pointer)
    }

    pub fn gesture(&self, pointer: PointerId) -> Option<&Gesture> {
        self.gestures.get(pointer)
    }

    /// Whether any write is waiting for the next flush.
    pub fn has_pending_writes(&self) -> bool {
        self.queue.has_pending()
    }

    /// When the pending writes will be flushed by [`Whiteboard::tick`].
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.queue.deadline()
    }

    // --- Host input -----------------------------------------------------

    /// Feed one pointer or wheel event.
    ///
    /// Presses, moves and wheel events carrying a non-finite position or delta
    /// are dropped.
    pub fn on_pointer_event(&mut self, event: PointerEvent, now: Instant) -> Vec<EngineEvent> {
        if !event.is_finite() {
            log::trace!("Ignoring non-finite {:?}", event);
            return Vec::new();
        }
        match event {
            PointerEvent::Down { pointer, position, button, target } => {
                self.pointer_down(pointer, position, button, target, now)
            }
            PointerEvent::Move { pointer, position } => {
                self.pointer_move(pointer, position, now);
                Vec::new()
            }
            PointerEvent::Up { pointer, .. } => self.pointer_up(pointer),
            PointerEvent::Cancel { pointer } => self.pointer_cancel(pointer),
            PointerEvent::Wheel { position, delta } => self.wheel(position, delta.y),
        }
    }

    /// Feed one key event. Only the pan-enable key is interpreted.
    pub fn on_key_event(&mut self, event: KeyEvent) -> Vec<EngineEvent> {
        match event {
            KeyEvent::Pressed(key) if key == self.config.pan_key => {
                self.gestures.set_pan_key(true);
                Vec::new()
            }
            KeyEvent::Released(key) if key == self.config.pan_key => {
                let aborted = self.gestures.set_pan_key(false);
                if !aborted.is_empty() {
                    log::debug!("Pan key released; aborted {} pan(s)", aborted.len());
                }
                aborted.into_iter().map(|pointer| EngineEvent::ReleasePointer { pointer }).collect()
            }
            _ => Vec::new(),
        }
    }

    fn pointer_down(
        &mut self,
        pointer: PointerId,
        position: Point,
        button: MouseButton,
        target: Option<PressTarget>,
        now: Instant,
    ) -> Vec<EngineEvent> {
        if button != MouseButton::Left {
            log::trace!("Ignoring {:?} press from pointer {}", button, pointer);
            return Vec::new();
        }
        let target = target.unwrap_or_else(|| hit_test(&self.board, &self.camera, position, &self.config));
        let pan_enabled = self.gestures.pan_enabled();

        if target.is_canvas() && !pan_enabled {
            if self.clicks.register(now, position) {
                self.pending_create.insert(pointer, self.camera.screen_to_world(position));
            }
        } else {
            self.clicks.reset();
        }

        match Gesture::from_press(&target, position, &self.board, pan_enabled) {
            Some(gesture) => {
                if let Some(id) = gesture.target_id() {
                    match gesture.kind() {
                        GestureKind::DragItem | GestureKind::ResizeItem => self.raise_item(id, now),
                        GestureKind::DragFrame | GestureKind::ResizeFrame => self.raise_frame(id, now),
                        GestureKind::Pan => {}
                    }
                }
                log::debug!("Pointer {} begins {:?}", pointer, gesture.kind());
                self.gestures.begin(pointer, gesture);
                vec![EngineEvent::CapturePointer { pointer }]
            }
            None => {
                // Body presses are activation clicks
                match target {
                    PressTarget::Item { id, part: HitPart::Body } => self.raise_item(id, now),
                    PressTarget::Frame { id, part: HitPart::Body } => self.raise_frame(id, now),
                    _ => {}
                }
                Vec::new()
            }
        }
    }

    fn pointer_move(&mut self, pointer: PointerId, position: Point, now: Instant) {
        let mutation = self
            .gestures
            .on_move(pointer, position, &mut self.board, &mut self.camera, &self.config);
        match mutation {
            Some(Mutation::Camera) => self.throttle.mark(),
            Some(Mutation::Item(id)) => self.enqueue_item(id, now),
            Some(Mutation::Frame(_)) => self.queue.enqueue_frames(now),
            None => {}
        }
    }

    fn pointer_up(&mut self, pointer: PointerId) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if let Some(gesture) = self.gestures.end(pointer) {
            log::debug!("Pointer {} ends {:?}", pointer, gesture.kind());
            if let Gesture::DragItem { id, .. } = gesture {
                if let Some(item) = self.board.item(id) {
                    let note_id = item.note_id;
                    let frame_id = resolve_item_frame(item, self.board.frames());
                    self.membership.insert(note_id, frame_id);
                    events.push(EngineEvent::FrameAssigned { note_id, frame_id });
                }
            }
            events.push(EngineEvent::ReleasePointer { pointer });
        }
        if let Some(world) = self.pending_create.remove(&pointer) {
            events.push(EngineEvent::CreateNoteRequested { world });
        }
        events
    }

    fn pointer_cancel(&mut self, pointer: PointerId) -> Vec<EngineEvent> {
        self.pending_create.remove(&pointer);
        match self.gestures.end(pointer) {
            Some(gesture) => {
                log::debug!("Pointer {} cancelled {:?}", pointer, gesture.kind());
                vec![EngineEvent::ReleasePointer { pointer }]
            }
            None => Vec::new(),
        }
    }

    fn wheel(&mut self, position: Point, delta_y: f64) -> Vec<EngineEvent> {
        match self.camera.zoom_at(position, delta_y) {
            ZoomOutcome::Changed => {
                self.throttle.mark();
                Vec::new()
            }
            ZoomOutcome::AtLimit => vec![EngineEvent::ZoomAtLimit],
        }
    }

    /// Called once per animation frame. Returns the camera to render, if it
    /// changed since the last commit.
    pub fn take_visual_commit(&mut self) -> Option<Camera> {
        self.throttle.take(&self.camera)
    }

    /// Screen rectangles for every entity in paint order.
    pub fn projection(&self) -> Vec<Projected> {
        project_board(&self.board, &self.camera)
    }

    // --- Persistence lifecycle ------------------------------------------

    /// Flush pending writes if the debounce deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<FlushReport> {
        self.queue.poll(&self.store, &self.board.id, self.board.frames(), now)
    }

    /// Write everything pending immediately.
    pub fn flush(&mut self) -> FlushReport {
        self.queue.flush(&self.store, &self.board.id, self.board.frames())
    }

    /// The view became hidden.
    pub fn on_visibility_hidden(&mut self) -> FlushReport {
        self.flush()
    }

    /// The view is being unloaded.
    pub fn on_unload(&mut self) -> FlushReport {
        self.flush()
    }

    /// Flush the current board and open another one.
    ///
    /// If the new board cannot be loaded the current one stays open.
    pub fn switch_board(&mut self, board_id: &str) -> StorageResult<Vec<EngineEvent>> {
        self.flush();
        let board = load_board(&self.store, &self.notes, &self.config, board_id)?;
        log::info!("Switching board {} -> {}", self.board.id, board.id);

        let events = self
            .gestures
            .abort_all()
            .into_iter()
            .map(|pointer| EngineEvent::ReleasePointer { pointer })
            .collect();
        self.pending_create.clear();
        self.clicks.reset();
        self.board = board;
        self.camera.reset();
        self.throttle.mark();
        self.refresh_membership();
        Ok(events)
    }

    /// Flush and tear down the engine.
    pub fn close(mut self) -> FlushReport {
        let report = self.flush();
        self.closed = true;
        log::info!("Closed board {}", self.board.id);
        report
    }

    // --- Entity operations ----------------------------------------------

    /// Place a note on the board, centered at a world point.
    ///
    /// Returns `None` if the note does not exist or is already placed.
    pub fn place_note(&mut self, note_id: NoteId, world_center: Point, now: Instant) -> Option<ItemId> {
        if !self.notes.exists(note_id) {
            log::warn!("Cannot place unknown note {}", note_id);
            return None;
        }
        if self.board.item_for_note(note_id).is_some() {
            log::debug!("Note {} is already placed", note_id);
            return None;
        }
        let (width, height) = (self.config.min_width, self.config.min_height);
        let geometry = Geometry::new(world_center.x - width / 2.0, world_center.y - height / 2.0, width, height);
        let item = Item::new(note_id, geometry);
        let id = item.id;
        self.membership.insert(note_id, resolve_item_frame(&item, self.board.frames()));
        self.board.add_item(item);
        self.enqueue_item(id, now);
        Some(id)
    }

    /// Remove a note's item, e.g. after the note was deleted.
    ///
    /// The item leaves the board even if the store delete fails.
    pub fn remove_note(&mut self, note_id: NoteId) -> StorageResult<Option<ItemId>> {
        self.membership.remove(&note_id);
        let Some(id) = self.board.item_for_note(note_id).map(|item| item.id) else {
            return Ok(None);
        };
        self.board.remove_item(id);
        self.queue.cancel(id);
        self.store.delete_items(&self.board.id, &[id])?;
        Ok(Some(id))
    }

    /// Create a frame. The geometry is grown to the minimum size if needed.
    pub fn create_frame(&mut self, name: impl Into<String>, geometry: Geometry, now: Instant) -> FrameId {
        let frame = Frame::new(name, geometry.clamped_to_min(self.config.min_width, self.config.min_height));
        let id = frame.id;
        self.board.add_frame(frame);
        self.queue.enqueue_frames(now);
        id
    }

    pub fn rename_frame(&mut self, id: FrameId, name: impl Into<String>, now: Instant) -> bool {
        let Some(frame) = self.board.frame_mut(id) else {
            return false;
        };
        frame.name = name.into();
        frame.touch();
        self.queue.enqueue_frames(now);
        true
    }

    /// Delete a frame. Notes inside it are left where they are.
    pub fn delete_frame(&mut self, id: FrameId, now: Instant) -> bool {
        if self.board.remove_frame(id).is_none() {
            return false;
        }
        self.queue.enqueue_frames(now);
        let stale: Vec<NoteId> = self
            .membership
            .iter()
            .filter(|(_, frame)| **frame == Some(id))
            .map(|(note, _)| *note)
            .collect();
        for note_id in stale {
            let frame = self.board.item_for_note(note_id).and_then(|item| resolve_item_frame(item, self.board.frames()));
            self.membership.insert(note_id, frame);
        }
        true
    }

    /// Bring an entity to the front of its class, as an activation click does.
    pub fn activate(&mut self, entity: EntityRef, now: Instant) {
        match entity {
            EntityRef::Item(id) => self.raise_item(id, now),
            EntityRef::Frame(id) => self.raise_frame(id, now),
        }
    }

    fn raise_item(&mut self, id: ItemId, now: Instant) {
        if bring_to_front(id, self.board.items_mut()).is_some() {
            self.enqueue_item(id, now);
        }
    }

    fn raise_frame(&mut self, id: FrameId, now: Instant) {
        if bring_to_front(id, self.board.frames_mut()).is_some() {
            if let Some(frame) = self.board.frame_mut(id) {
                frame.touch();
            }
            self.queue.enqueue_frames(now);
        }
    }

    fn enqueue_item(&mut self, id: ItemId, now: Instant) {
        if let Some(item) = self.board.item(id) {
            self.queue.enqueue(item.clone(), now);
        }
    }

    // --- Membership -------------------------------------------------------

    /// Notes whose item currently sits in the frame. Always recomputed.
    pub fn notes_in_frame(&self, frame_id: FrameId) -> Vec<NoteId> {
        members_of(frame_id, self.board.items(), self.board.frames())
    }

    /// Last-known frame of a note, as of its latest drop.
    pub fn frame_of(&self, note_id: NoteId) -> Option<FrameId> {
        self.membership.get(&note_id).copied().flatten()
    }

    fn refresh_membership(&mut self) {
        let frames = self.board.frames();
        self.membership = self
            .board
            .items()
            .iter()
            .map(|item| (item.note_id, resolve_item_frame(item, frames)))
            .collect();
    }

    // --- Navigation -------------------------------------------------------

    /// Center the view on a note's item without changing the scale.
    pub fn focus_note(&mut self, note_id: NoteId, viewport: Size) -> bool {
        let Some(center) = self.board.item_for_note(note_id).map(|item| item.geometry.center()) else {
            return false;
        };
        self.camera.center_on(center, viewport);
        self.throttle.mark();
        true
    }

    /// The next (or previous) placed note in navigation order, wrapping around.
    pub fn neighbour_note(&self, note_id: NoteId, forward: bool) -> Option<NoteId> {
        let order = self.notes.ordering();
        let placed = |id: &NoteId| self.board.item_for_note(*id).is_some();
        let len = order.len();
        let Some(start) = order.iter().position(|id| *id == note_id) else {
            return if forward {
                order.iter().copied().find(placed)
            } else {
                order.iter().rev().copied().find(placed)
            };
        };
        (1..len)
            .map(|step| if forward { (start + step) % len } else { (start + len - step) % len })
            .map(|index| order[index])
            .find(placed)
    }

    /// Fit every item and frame into the viewport.
    pub fn zoom_to_fit(&mut self, viewport: Size, padding: f64) {
        match self.board.bounds() {
            Some(bounds) => self.camera.fit_to_bounds(bounds, viewport, padding),
            None => self.camera.reset(),
        }
        self.throttle.mark();
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.throttle.mark();
    }
}

impl<S: Store, N: NoteDirectory> Drop for Whiteboard<S, N> {
    fn drop(&mut self) {
        if !self.closed && self.queue.has_pending() {
            log::warn!("Whiteboard for board {} dropped without close; flushing", self.board.id);
            self.flush();
        }
    }
}

/// Load a board, dropping items whose note no longer exists and growing
/// undersized geometry to the minimum.
fn load_board<S: Store, N: NoteDirectory>(
    store: &S,
    notes: &N,
    config: &EngineConfig,
    board_id: &str,
) -> StorageResult<Board> {
    let mut items = store.load_items(board_id)?;
    let mut frames = store.load_frames(board_id)?;

    for geometry in items
        .iter_mut()
        .map(|item| &mut item.geometry)
        .chain(frames.iter_mut().map(|frame| &mut frame.geometry))
    {
        *geometry = geometry.clamped_to_min(config.min_width, config.min_height);
    }

    let mut board = Board::with_entities(board_id, items, frames);
    let orphans = board.retain_items(|item| notes.exists(item.note_id));
    if !orphans.is_empty() {
        log::info!("Pruning {} orphaned item(s) from board {}", orphans.len(), board_id);
        let ids: Vec<ItemId> = orphans.iter().map(|item| item.id).collect();
        if let Err(e) = store.delete_items(board_id, &ids) {
            log::error!("Failed to delete orphaned items on board {}: {}", board_id, e);
        }
    }

    log::info!(
        "Loaded board {}: {} item(s), {} frame(s)",
        board_id,
        board.items().len(),
        board.frames().len()
    );
    Ok(board)
}
