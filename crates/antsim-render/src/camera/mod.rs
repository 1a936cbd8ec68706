use antsim_core::Position;

/// Fixed geometry the camera pans within.
#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    /// Full map extent in world units.
    pub map_size: (f32, f32),
    /// Visible window extent in world units.
    pub viewport_size: (f32, f32),
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            map_size: (1_600.0, 1_200.0),
            viewport_size: (800.0, 600.0),
        }
    }
}

/// Pannable window into a map larger than the screen.
///
/// The offset is the world coordinate of the viewport's top-left corner and
/// is kept clamped so the viewport never leaves the map.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    offset: (f32, f32),
    panning: bool,
    pan_anchor: Option<(f32, f32)>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            config,
            offset: (0.0, 0.0),
            panning: false,
            pan_anchor: None,
        };
        camera.clamp_offset();
        camera
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> CameraConfig {
        self.config
    }

    #[inline]
    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// Largest legal offset per axis; zero when the viewport covers the map.
    fn max_offset(&self) -> (f32, f32) {
        (
            (self.config.map_size.0 - self.config.viewport_size.0).max(0.0),
            (self.config.map_size.1 - self.config.viewport_size.1).max(0.0),
        )
    }

    fn clamp_offset(&mut self) {
        let max = self.max_offset();
        self.offset.0 = self.offset.0.clamp(0.0, max.0);
        self.offset.1 = self.offset.1.clamp(0.0, max.1);
    }

    /// Shifts the viewport by the given world-unit deltas, clamped to bounds.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.offset.0 += delta_x;
        self.offset.1 += delta_y;
        self.clamp_offset();
    }

    /// Positions the viewport center over a world point, clamped to bounds.
    pub fn center_on(&mut self, position: Position) {
        self.offset.0 = position.x - self.config.viewport_size.0 * 0.5;
        self.offset.1 = position.y - self.config.viewport_size.1 * 0.5;
        self.clamp_offset();
    }

    /// Begins a drag gesture anchored at a cursor position.
    pub fn start_pan(&mut self, cursor: (f32, f32)) {
        self.panning = true;
        self.pan_anchor = Some(cursor);
    }

    /// Continues a drag gesture. The map follows the cursor, so the offset
    /// moves against the cursor delta. Returns whether the camera moved.
    pub fn update_pan(&mut self, cursor: (f32, f32)) -> bool {
        if !self.panning {
            return false;
        }
        if let Some(anchor) = self.pan_anchor {
            let dx = cursor.0 - anchor.0;
            let dy = cursor.1 - anchor.1;
            if dx.abs() > f32::EPSILON || dy.abs() > f32::EPSILON {
                self.pan(-dx, -dy);
                self.pan_anchor = Some(cursor);
                return true;
            }
        }
        false
    }

    /// Ends the drag gesture, if any.
    pub fn end_pan(&mut self) {
        self.panning = false;
        self.pan_anchor = None;
    }

    /// Translates a world position into viewport-relative screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, position: Position) -> (f32, f32) {
        (position.x - self.offset.0, position.y - self.offset.1)
    }

    /// Whether a world position currently falls inside the viewport.
    #[must_use]
    pub fn visible(&self, position: Position) -> bool {
        let (x, y) = self.world_to_screen(position);
        (0.0..=self.config.viewport_size.0).contains(&x)
            && (0.0..=self.config.viewport_size.1).contains(&y)
    }
}
