//! Camera module for pan/zoom transforms.

use crate::config::{ConfigError, EngineConfig, MAX_ZOOM, MIN_ZOOM, ZOOM_BASE};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Result of a zoom request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// Scale changed and the translation was re-solved around the cursor.
    Changed,
    /// Scale was already at the bound in the requested direction.
    AtLimit,
}

/// Camera manages the view transform for the board.
///
/// `screen = world * zoom + offset`. The camera is session-local state and is
/// never written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation (pan) in screen pixels.
    pub offset: Vec2,
    /// Current scale factor.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Wheel zoom base.
    pub zoom_base: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_base: ZOOM_BASE,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera using the zoom limits from a config.
    ///
    /// Fails if the config does not validate, since inverted bounds would make
    /// every later clamp panic.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut camera = Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_base: config.zoom_base,
            ..Self::default()
        };
        camera.reset();
        Ok(camera)
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.zoom,
            (screen_point.y - self.offset.y) / self.zoom,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            world_point.x * self.zoom + self.offset.x,
            world_point.y * self.zoom + self.offset.y,
        )
    }

    /// Convert a screen-space delta to a world-space delta.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by a wheel delta, keeping the world point under `screen_point` fixed.
    ///
    /// Positive `delta_y` zooms out, negative zooms in.
    pub fn zoom_at(&mut self, screen_point: Point, delta_y: f64) -> ZoomOutcome {
        let factor = self.zoom_base.powf(-delta_y);
        self.zoom_by(screen_point, factor)
    }

    /// Multiply the zoom by `factor`, keeping `screen_point` fixed.
    ///
    /// A non-finite or non-positive factor, or a non-finite cursor, leaves the
    /// camera untouched and reports [`ZoomOutcome::AtLimit`].
    pub fn zoom_by(&mut self, screen_point: Point, factor: f64) -> ZoomOutcome {
        if !factor.is_finite() || factor <= 0.0 || !screen_point.is_finite() {
            log::trace!("Ignoring zoom by {} at {:?}", factor, screen_point);
            return ZoomOutcome::AtLimit;
        }
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return ZoomOutcome::AtLimit;
        }

        // World point under the cursor, resolved with the old transform
        let world_point = self.screen_to_world(screen_point);

        self.zoom = new_zoom;
        self.offset = Vec2::new(
            screen_point.x - world_point.x * new_zoom,
            screen_point.y - world_point.y * new_zoom,
        );
        ZoomOutcome::Changed
    }

    /// Center the view on a world point without changing the zoom.
    pub fn center_on(&mut self, world_point: Point, viewport: Size) {
        self.offset = Vec2::new(
            viewport.width / 2.0 - world_point.x * self.zoom,
            viewport.height / 2.0 - world_point.y * self.zoom,
        );
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded_viewport = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width();
        let scale_y = padded_viewport.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);
        self.center_on(bounds.center(), viewport);
    }
}

/// Coalesces camera changes into at most one visual commit per rendering frame.
///
/// The camera itself is updated synchronously on every event; only the copy
/// handed to the renderer is throttled.
#[derive(Debug, Clone, Default)]
pub struct CommitThrottle {
    pending: bool,
    last_committed: Option<Camera>,
}

impl CommitThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the camera changed since the last commit.
    pub fn mark(&mut self) {
        self.pending = true;
    }

    /// Whether a commit is waiting for the next animation frame.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called once per animation frame. Returns the camera to apply, if any.
    pub fn take(&mut self, camera: &Camera) -> Option<Camera> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        if self.last_committed.as_ref() == Some(camera) {
            return None;
        }
        self.last_committed = Some(*camera);
        Some(*camera)
    }
}
