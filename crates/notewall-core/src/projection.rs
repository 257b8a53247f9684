//! Projection of board entities into screen space for the renderer.

use crate::board::{Board, FrameId, Geometry, ItemId};
use crate::camera::Camera;
use crate::zorder::render_order;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A rectangle positioned in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: f64,
}

impl ScreenRect {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }
}

/// Project world geometry through the camera.
pub fn project(camera: &Camera, geometry: &Geometry, z: f64) -> ScreenRect {
    let rect = camera.transform().transform_rect_bbox(geometry.rect());
    ScreenRect {
        left: rect.x0,
        top: rect.y0,
        width: rect.width(),
        height: rect.height(),
        z_index: z,
    }
}

/// Which entity a projected rectangle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Item(ItemId),
    Frame(FrameId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projected {
    pub entity: EntityRef,
    #[serde(flatten)]
    pub rect: ScreenRect,
}

/// Every entity of a board in paint order.
///
/// Frames are painted beneath items; within each class entities are sorted by
/// ascending z.
pub fn project_board(board: &Board, camera: &Camera) -> Vec<Projected> {
    let frames = render_order(board.frames()).into_iter().map(|frame| Projected {
        entity: EntityRef::Frame(frame.id),
        rect: project(camera, &frame.geometry, frame.z),
    });
    let items = render_order(board.items()).into_iter().map(|item| Projected {
        entity: EntityRef::Item(item.id),
        rect: project(camera, &item.geometry, item.z),
    });
    frames.chain(items).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Frame, Item};
    use kurbo::Vec2;
    use uuid::Uuid;

    #[test]
    fn test_project_applies_scale_then_translate() {
        let mut camera = Camera::new();
        camera.zoom = 0.5;
        camera.offset = Vec2::new(100.0, -20.0);
        let rect = project(&camera, &Geometry::new(40.0, 60.0, 320.0, 220.0), 3.0);
        assert!((rect.left - 120.0).abs() < 1e-9);
        assert!((rect.top - 10.0).abs() < 1e-9);
        assert!((rect.width - 160.0).abs() < 1e-9);
        assert!((rect.height - 110.0).abs() < 1e-9);
        assert_eq!(rect.z_index, 3.0);
    }

    #[test]
    fn test_board_paint_order() {
        let mut board = Board::new("b");
        let mut top_item = Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0));
        top_item.z = 10.0;
        let mut low_item = Item::new(Uuid::new_v4(), Geometry::new(0.0, 0.0, 320.0, 220.0));
        low_item.z = 1.0;
        let mut frame = Frame::new("f", Geometry::new(0.0, 0.0, 800.0, 600.0));
        frame.z = 100.0;
        let ids = (frame.id, low_item.id, top_item.id);
        board.add_item(top_item);
        board.add_item(low_item);
        board.add_frame(frame);

        let order: Vec<EntityRef> = project_board(&board, &Camera::new()).iter().map(|p| p.entity).collect();
        assert_eq!(order, vec![EntityRef::Frame(ids.0), EntityRef::Item(ids.1), EntityRef::Item(ids.2)]);
    }

    #[test]
    fn test_projected_serializes_flat() {
        let id = Uuid::new_v4();
        let projected = Projected {
            entity: EntityRef::Item(id),
            rect: ScreenRect { left: 1.0, top: 2.0, width: 3.0, height: 4.0, z_index: 5.0 },
        };
        let value = serde_json::to_value(projected).unwrap();
        assert_eq!(value["entity"]["kind"], "item");
        assert_eq!(value["left"], 1.0);
        assert_eq!(value["z_index"], 5.0);
    }
}
