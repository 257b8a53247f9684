//! Scripted host events.

use kurbo::{Point, Size};
use notewall_core::{Geometry, KeyEvent, NoteId, PointerEvent};
use serde::Deserialize;
use std::path::Path;

/// One thing the host does to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostEvent {
    Pointer { event: PointerEvent },
    Key { event: KeyEvent },
    /// Advance the replay clock.
    Wait { ms: u64 },
    /// Poll the persistence deadline.
    Tick,
    /// Animation frame: pull the throttled camera commit.
    AnimationFrame,
    Hidden,
    Unload,
    /// Register a note with the note directory.
    AddNote { note_id: NoteId },
    PlaceNote { note_id: NoteId, at: Point },
    RemoveNote { note_id: NoteId },
    CreateFrame {
        name: String,
        #[serde(flatten)]
        geometry: Geometry,
    },
    RenameFrame { name: String, to: String },
    DeleteFrame { name: String },
    SwitchBoard { board_id: String },
    FocusNote { note_id: NoteId, viewport: Size },
    ZoomToFit {
        viewport: Size,
        #[serde(default)]
        padding: f64,
    },
    ResetCamera,
}

/// A replay script: the notes that exist up front plus the event sequence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Script {
    pub notes: Vec<NoteId>,
    pub events: Vec<HostEvent>,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, crate::AppError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notewall_core::PressTarget;

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "notes": ["6f1c1d3a-1c5e-4f0e-9a36-3b1f7f1c2d10"],
            "events": [
                {"op": "key", "event": {"type": "pressed", "key": " "}},
                {"op": "pointer", "event": {"type": "down", "pointer": 1, "position": {"x": 5.0, "y": 6.0}}},
                {"op": "wait", "ms": 300},
                {"op": "create_frame", "name": "Inbox", "x": 0.0, "y": 0.0, "width": 800.0, "height": 600.0},
                {"op": "zoom_to_fit", "viewport": {"width": 1280.0, "height": 800.0}},
                {"op": "tick"}
            ]
        }"#;
        let script = Script::from_json_str(json).unwrap();
        assert_eq!(script.notes.len(), 1);
        assert_eq!(script.events.len(), 6);
        assert_eq!(script.events[0], HostEvent::Key { event: KeyEvent::Pressed(" ".into()) });
        match &script.events[1] {
            HostEvent::Pointer { event: PointerEvent::Down { pointer, target, .. } } => {
                assert_eq!(*pointer, 1);
                assert_eq!(*target, None::<PressTarget>);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(&script.events[3], HostEvent::CreateFrame { geometry, .. } if geometry.width == 800.0));
        assert!(matches!(script.events[4], HostEvent::ZoomToFit { padding, .. } if padding == 0.0));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(Script::from_json_str(r#"{"events": [{"op": "teleport"}]}"#).is_err());
    }
}
