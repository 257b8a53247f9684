//! Input events delivered by the host surface.

use crate::hit::PressTarget;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Host-assigned pointer identifier (mouse, pen or touch contact).
pub type PointerId = i64;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        pointer: PointerId,
        position: Point,
        #[serde(default)]
        button: MouseButton,
        /// Element the press landed on, when the host already knows it.
        /// `None` lets the engine hit-test geometrically.
        #[serde(default)]
        target: Option<PressTarget>,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
    /// The OS revoked the pointer (capture lost, touch cancelled).
    Cancel {
        pointer: PointerId,
    },
    Wheel {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Self::Down { pointer, .. }
            | Self::Move { pointer, .. }
            | Self::Up { pointer, .. }
            | Self::Cancel { pointer } => Some(*pointer),
            Self::Wheel { .. } => None,
        }
    }

    /// Whether every coordinate the engine reads from this event is finite.
    ///
    /// `Up` and `Cancel` always pass so a bad coordinate never strands a gesture.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Down { position, .. } | Self::Move { position, .. } => position.is_finite(),
            Self::Wheel { position, delta } => position.is_finite() && delta.is_finite(),
            Self::Up { .. } | Self::Cancel { .. } => true,
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Detects double-clicks from successive presses.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    max_distance: f64,
    last: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new(window: Duration, max_distance: f64) -> Self {
        Self { window, max_distance, last: None }
    }

    /// Register a press. Returns true if it completes a double-click.
    pub fn register(&mut self, at: Instant, position: Point) -> bool {
        if let Some((last_time, last_pos)) = self.last {
            let elapsed = at.saturating_duration_since(last_time);
            if elapsed < self.window && position.distance(last_pos) < self.max_distance {
                // Reset so a third click starts a new pair
                self.last = None;
                return true;
            }
        }
        self.last = Some((at, position));
        false
    }

    /// Forget the previous press.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
