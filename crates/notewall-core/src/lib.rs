//! Notewall Core Library
//!
//! Platform-agnostic interaction engine for the Notewall whiteboard: camera,
//! per-pointer gestures, frame membership, stacking order and debounced
//! persistence of note placements.

pub mod board;
pub mod camera;
pub mod config;
pub mod engine;
pub mod gesture;
pub mod handles;
pub mod hit;
pub mod input;
pub mod membership;
pub mod notes;
pub mod projection;
pub mod storage;
pub mod zorder;

pub use board::{Board, Frame, FrameId, Geometry, Item, ItemId, NoteId};
pub use camera::{Camera, CommitThrottle, ZoomOutcome};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineError, EngineEvent, Whiteboard};
pub use gesture::{Gesture, GestureKind, GestureMachine};
pub use handles::ResizeHandle;
pub use hit::{HitPart, PressTarget, hit_test};
pub use input::{KeyEvent, MouseButton, PointerEvent, PointerId};
pub use membership::{members_of, resolve_frame};
pub use notes::{NoteDirectory, NoteList};
pub use projection::{EntityRef, Projected, ScreenRect};
pub use storage::{MemoryStore, PersistQueue, Store, StorageError, StorageResult};
