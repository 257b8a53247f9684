//! Geometric hit testing for hosts that do not resolve press targets themselves.

use crate::board::{Board, FrameId, Geometry, ItemId};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::handles::ResizeHandle;
use crate::zorder::{Stacked, render_order};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which part of an entity a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPart {
    /// The header strip, which is the drag handle.
    Header,
    /// Anywhere else inside the entity.
    Body,
    /// One of the eight resize handles.
    Handle(ResizeHandle),
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PressTarget {
    /// Empty canvas.
    #[default]
    Canvas,
    Item { id: ItemId, part: HitPart },
    Frame { id: FrameId, part: HitPart },
}

impl PressTarget {
    pub fn is_canvas(&self) -> bool {
        matches!(self, Self::Canvas)
    }
}

/// Classify a world point against one entity.
///
/// `band` is the resize band thickness in world units; half of it lies
/// outside the entity so edges stay grabbable at every zoom.
fn hit_part(geometry: &Geometry, point: Point, band: f64, header_height: f64) -> Option<HitPart> {
    let rect = geometry.rect();
    let half = band / 2.0;
    let outer = rect.inflate(half, half);
    if point.x < outer.x0 || point.x > outer.x1 || point.y < outer.y0 || point.y > outer.y1 {
        return None;
    }

    let handle = ResizeHandle::from_edges(
        (point.y - rect.y0).abs() <= half,
        (point.y - rect.y1).abs() <= half,
        (point.x - rect.x1).abs() <= half,
        (point.x - rect.x0).abs() <= half,
    );
    if let Some(handle) = handle {
        return Some(HitPart::Handle(handle));
    }

    if point.y - rect.y0 <= header_height {
        Some(HitPart::Header)
    } else {
        Some(HitPart::Body)
    }
}

/// Find what lies under a screen point.
///
/// Items are tested before frames (they paint above them); within a class the
/// topmost entity wins.
pub fn hit_test(board: &Board, camera: &Camera, screen_point: Point, config: &EngineConfig) -> PressTarget {
    let world = camera.screen_to_world(screen_point);
    let band = config.handle_thickness / camera.zoom;

    for item in render_order(board.items()).into_iter().rev() {
        if let Some(part) = hit_part(&item.geometry, world, band, config.header_height) {
            return PressTarget::Item { id: item.stack_id(), part };
        }
    }
    for frame in render_order(board.frames()).into_iter().rev() {
        if let Some(part) = hit_part(&frame.geometry, world, band, config.header_height) {
            return PressTarget::Frame { id: frame.stack_id(), part };
        }
    }
    PressTarget::Canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Frame, Item};
    use uuid::Uuid;

    fn board_with_item(geometry: Geometry) -> (Board, ItemId) {
        let mut board = Board::new("b");
        let item = Item::new(Uuid::new_v4(), geometry);
        let id = item.id;
        board.add_item(item);
        (board, id)
    }

    #[test]
    fn test_empty_canvas() {
        let board = Board::new("b");
        let target = hit_test(&board, &Camera::new(), Point::new(10.0, 10.0), &EngineConfig::default());
        assert!(target.is_canvas());
    }

    #[test]
    fn test_header_body_and_handles() {
        let config = EngineConfig::default();
        let camera = Camera::new();
        let (board, id) = board_with_item(Geometry::new(0.0, 0.0, 320.0, 220.0));

        let at = |x, y| hit_test(&board, &camera, Point::new(x, y), &config);
        assert_eq!(at(160.0, 10.0), PressTarget::Item { id, part: HitPart::Header });
        assert_eq!(at(160.0, 120.0), PressTarget::Item { id, part: HitPart::Body });
        assert_eq!(at(0.0, 120.0), PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::W) });
        assert_eq!(at(322.0, 120.0), PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::E) });
        assert_eq!(at(320.0, 220.0), PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::Se) });
        assert_eq!(at(0.0, 0.0), PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::Nw) });
        assert!(at(400.0, 120.0).is_canvas());
    }

    #[test]
    fn test_band_scales_with_zoom() {
        let config = EngineConfig::default();
        let (board, id) = board_with_item(Geometry::new(0.0, 0.0, 320.0, 220.0));
        let mut camera = Camera::new();
        camera.zoom = 0.5;
        // 3 screen px outside the east edge is 6 world units, inside the 8 world-unit half band.
        let target = hit_test(&board, &camera, Point::new(163.0, 55.0), &config);
        assert_eq!(target, PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::E) });
    }

    #[test]
    fn test_topmost_item_wins() {
        let config = EngineConfig::default();
        let mut board = Board::new("b");
        let mut low = Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0));
        low.z = 1.0;
        let mut high = Item::new(Uuid::new_v4(), Geometry::new(100.0, 100.0, 320.0, 220.0));
        high.z = 2.0;
        let high_id = high.id;
        board.add_item(high);
        board.add_item(low);
        let target = hit_test(&board, &Camera::new(), Point::new(200.0, 180.0), &config);
        assert_eq!(target, PressTarget::Item { id: high_id, part: HitPart::Body });
    }

    #[test]
    fn test_items_before_frames() {
        let config = EngineConfig::default();
        let (mut board, item_id) = board_with_item(Geometry::new(100.0, 100.0, 320.0, 220.0));
        let mut frame = Frame::new("f", Geometry::new(0.0, 0.0, 1000.0, 1000.0));
        frame.z = f64::MAX;
        let frame_id = frame.id;
        board.add_frame(frame);

        let camera = Camera::new();
        assert_eq!(
            hit_test(&board, &camera, Point::new(200.0, 200.0), &config),
            PressTarget::Item { id: item_id, part: HitPart::Body }
        );
        assert_eq!(
            hit_test(&board, &camera, Point::new(500.0, 20.0), &config),
            PressTarget::Frame { id: frame_id, part: HitPart::Header }
        );
    }

    #[test]
    fn test_press_target_json() {
        let id = Uuid::new_v4();
        let target = PressTarget::Item { id, part: HitPart::Handle(ResizeHandle::Ne) };
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(serde_json::from_str::<PressTarget>(&json).unwrap(), target);
    }
}
