//! Resize handles and the geometry rules for dragging and resizing.

use crate::board::Geometry;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight edge/corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::N,
        Self::S,
        Self::E,
        Self::W,
        Self::Ne,
        Self::Nw,
        Self::Se,
        Self::Sw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::Ne => "ne",
            Self::Nw => "nw",
            Self::Se => "se",
            Self::Sw => "sw",
        }
    }

    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Compose a handle from the edges it moves. `None` if neither axis moves.
    pub fn from_edges(north: bool, south: bool, east: bool, west: bool) -> Option<Self> {
        match (north, south, east, west) {
            (true, _, true, _) => Some(Self::Ne),
            (true, _, _, true) => Some(Self::Nw),
            (_, true, true, _) => Some(Self::Se),
            (_, true, _, true) => Some(Self::Sw),
            (true, _, _, _) => Some(Self::N),
            (_, true, _, _) => Some(Self::S),
            (_, _, true, _) => Some(Self::E),
            (_, _, _, true) => Some(Self::W),
            _ => None,
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.as_str() == s)
            .ok_or_else(|| format!("unknown resize handle: {s}"))
    }
}

/// Move a rectangle by a world-space delta measured from the gesture start.
pub fn apply_drag(start: &Geometry, world_delta: Vec2) -> Geometry {
    start.translated(world_delta)
}

/// Resize a rectangle from its gesture-start geometry.
///
/// Each axis is handled independently. The edge opposite the dragged one
/// stays anchored, and the size never drops below the minimum: dragging past
/// it leaves the handle stuck at the minimum.
pub fn apply_resize(
    start: &Geometry,
    handle: ResizeHandle,
    world_delta: Vec2,
    min_width: f64,
    min_height: f64,
) -> Geometry {
    let mut next = *start;

    if handle.moves_east() {
        next.width = (start.width + world_delta.x).max(min_width);
    } else if handle.moves_west() {
        next.width = (start.width - world_delta.x).max(min_width);
        next.x = start.x + (start.width - next.width);
    }

    if handle.moves_south() {
        next.height = (start.height + world_delta.y).max(min_height);
    } else if handle.moves_north() {
        next.height = (start.height - world_delta.y).max(min_height);
        next.y = start.y + (start.height - next.height);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_W: f64 = 320.0;
    const MIN_H: f64 = 220.0;

    fn start() -> Geometry {
        Geometry::new(100.0, 100.0, 400.0, 300.0)
    }

    #[test]
    fn test_parse_roundtrip_names() {
        for handle in ResizeHandle::ALL {
            assert_eq!(handle.as_str().parse::<ResizeHandle>(), Ok(handle));
        }
        assert!("x".parse::<ResizeHandle>().is_err());
    }

    #[test]
    fn test_east_grows_width() {
        let next = apply_resize(&start(), ResizeHandle::E, Vec2::new(50.0, 999.0), MIN_W, MIN_H);
        assert_eq!(next, Geometry::new(100.0, 100.0, 450.0, 300.0));
    }

    #[test]
    fn test_west_anchors_right_edge() {
        let next = apply_resize(&start(), ResizeHandle::W, Vec2::new(-60.0, 0.0), MIN_W, MIN_H);
        assert_eq!(next.width, 460.0);
        assert_eq!(next.x, 40.0);
        assert_eq!(next.x + next.width, 500.0);
    }

    #[test]
    fn test_west_clamps_and_sticks() {
        let next = apply_resize(&start(), ResizeHandle::W, Vec2::new(1000.0, 0.0), MIN_W, MIN_H);
        assert_eq!(next.width, MIN_W);
        assert_eq!(next.x + next.width, 500.0);
    }

    #[test]
    fn test_north_anchors_bottom_edge() {
        let next = apply_resize(&start(), ResizeHandle::N, Vec2::new(0.0, 500.0), MIN_W, MIN_H);
        assert_eq!(next.height, MIN_H);
        assert_eq!(next.y + next.height, 400.0);
        assert_eq!(next.width, 400.0);
    }

    #[test]
    fn test_corners_compose_axes() {
        let delta = Vec2::new(-30.0, 40.0);
        let sw = apply_resize(&start(), ResizeHandle::Sw, delta, MIN_W, MIN_H);
        let w = apply_resize(&start(), ResizeHandle::W, delta, MIN_W, MIN_H);
        let s = apply_resize(&start(), ResizeHandle::S, delta, MIN_W, MIN_H);
        assert_eq!((sw.x, sw.width), (w.x, w.width));
        assert_eq!((sw.y, sw.height), (s.y, s.height));
    }

    #[test]
    fn test_minimum_holds_for_any_drag() {
        let deltas = [-5000.0, -321.0, -1.0, 0.0, 7.5, 219.0, 5000.0];
        for handle in ResizeHandle::ALL {
            for dx in deltas {
                for dy in deltas {
                    let s = start();
                    let next = apply_resize(&s, handle, Vec2::new(dx, dy), MIN_W, MIN_H);
                    assert!(next.width >= MIN_W && next.height >= MIN_H);
                    if handle.moves_west() {
                        assert!((next.x + next.width - (s.x + s.width)).abs() < 1e-9);
                    } else {
                        assert_eq!(next.x, s.x);
                    }
                    if handle.moves_north() {
                        assert!((next.y + next.height - (s.y + s.height)).abs() < 1e-9);
                    } else {
                        assert_eq!(next.y, s.y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_inward_pull_at_minimum_is_stuck() {
        let s = Geometry::new(0.0, 0.0, 320.0, 220.0);
        let next = apply_resize(&s, ResizeHandle::W, Vec2::new(200.0, 0.0), MIN_W, MIN_H);
        assert_eq!(next.width, 320.0);
        assert_eq!(next.x, 0.0);
    }

    #[test]
    fn test_from_edges() {
        assert_eq!(ResizeHandle::from_edges(true, false, false, true), Some(ResizeHandle::Nw));
        assert_eq!(ResizeHandle::from_edges(false, false, true, false), Some(ResizeHandle::E));
        assert_eq!(ResizeHandle::from_edges(false, false, false, false), None);
    }
}
