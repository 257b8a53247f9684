//! Replays a script against a whiteboard engine.

use crate::script::HostEvent;
use notewall_core::storage::{FlushReport, Store};
use notewall_core::{Camera, EngineEvent, NoteList, Projected, Whiteboard};
use serde::Serialize;
use std::time::{Duration, Instant};

/// What a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    pub board_id: String,
    pub camera: Camera,
    /// Camera commits pulled on animation frames.
    pub visual_commits: usize,
    pub events: Vec<EngineEvent>,
    pub flushes: Vec<FlushReport>,
    pub entities: Vec<Projected>,
}

/// Drives an engine with a virtual clock.
pub struct Replay<S: Store> {
    engine: Whiteboard<S, NoteList>,
    clock: Instant,
    events: Vec<EngineEvent>,
    flushes: Vec<FlushReport>,
    visual_commits: usize,
}

impl<S: Store> Replay<S> {
    pub fn new(engine: Whiteboard<S, NoteList>) -> Self {
        Self {
            engine,
            clock: Instant::now(),
            events: Vec::new(),
            flushes: Vec::new(),
            visual_commits: 0,
        }
    }

    pub fn engine(&self) -> &Whiteboard<S, NoteList> {
        &self.engine
    }

    /// Apply one host event.
    pub fn apply(&mut self, event: HostEvent) -> Result<(), crate::AppError> {
        let now = self.clock;
        match event {
            HostEvent::Pointer { event } => {
                let emitted = self.engine.on_pointer_event(event, now);
                self.events.extend(emitted);
            }
            HostEvent::Key { event } => {
                let emitted = self.engine.on_key_event(event);
                self.events.extend(emitted);
            }
            HostEvent::Wait { ms } => self.clock += Duration::from_millis(ms),
            HostEvent::Tick => {
                if let Some(report) = self.engine.tick(now) {
                    self.flushes.push(report);
                }
            }
            HostEvent::AnimationFrame => {
                if self.engine.take_visual_commit().is_some() {
                    self.visual_commits += 1;
                }
            }
            HostEvent::Hidden => self.record_flush(|engine| engine.on_visibility_hidden()),
            HostEvent::Unload => self.record_flush(|engine| engine.on_unload()),
            HostEvent::AddNote { note_id } => self.engine.notes_mut().push(note_id),
            HostEvent::PlaceNote { note_id, at } => {
                if self.engine.place_note(note_id, at, now).is_none() {
                    log::warn!("Script placed note {} twice or before adding it", note_id);
                }
            }
            HostEvent::RemoveNote { note_id } => {
                self.engine.notes_mut().remove(note_id);
                self.engine.remove_note(note_id)?;
            }
            HostEvent::CreateFrame { name, geometry } => {
                self.engine.create_frame(name, geometry, now);
            }
            HostEvent::RenameFrame { name, to } => {
                let id = self.frame_named(&name)?;
                self.engine.rename_frame(id, to, now);
            }
            HostEvent::DeleteFrame { name } => {
                let id = self.frame_named(&name)?;
                self.engine.delete_frame(id, now);
            }
            HostEvent::SwitchBoard { board_id } => {
                let emitted = self.engine.switch_board(&board_id)?;
                self.events.extend(emitted);
            }
            HostEvent::FocusNote { note_id, viewport } => {
                if !self.engine.focus_note(note_id, viewport) {
                    log::warn!("Cannot focus unplaced note {}", note_id);
                }
            }
            HostEvent::ZoomToFit { viewport, padding } => self.engine.zoom_to_fit(viewport, padding),
            HostEvent::ResetCamera => self.engine.reset_camera(),
        }
        Ok(())
    }

    fn record_flush(&mut self, flush: impl FnOnce(&mut Whiteboard<S, NoteList>) -> FlushReport) {
        let report = flush(&mut self.engine);
        if !report.is_empty() {
            self.flushes.push(report);
        }
    }

    fn frame_named(&self, name: &str) -> Result<notewall_core::FrameId, crate::AppError> {
        self.engine
            .board()
            .frames()
            .iter()
            .find(|frame| frame.name == name)
            .map(|frame| frame.id)
            .ok_or_else(|| crate::AppError::Script(format!("no frame named {name:?}")))
    }

    /// Close the engine (force-flushing) and report the final state.
    pub fn finish(mut self) -> ReplayOutput {
        let board_id = self.engine.board_id().to_string();
        let camera = *self.engine.camera();
        let entities = self.engine.projection();
        let report = self.engine.close();
        if !report.is_empty() {
            self.flushes.push(report);
        }
        ReplayOutput {
            board_id,
            camera,
            visual_commits: self.visual_commits,
            events: self.events,
            flushes: self.flushes,
            entities,
        }
    }
}
