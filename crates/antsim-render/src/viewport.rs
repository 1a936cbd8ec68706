use antsim_core::Position;

use crate::camera::Camera;

/// Per-frame mapping from the camera's visible world window onto a character
/// grid. Built fresh each draw so terminal resizes take effect immediately.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    origin: (f32, f32),
    world_size: (f32, f32),
    grid: (u16, u16),
}

impl Viewport {
    #[must_use]
    pub fn new(camera: &Camera, columns: u16, rows: u16) -> Self {
        Self {
            origin: camera.offset(),
            world_size: camera.config().viewport_size,
            grid: (columns, rows),
        }
    }

    #[inline]
    #[must_use]
    pub fn grid(&self) -> (u16, u16) {
        self.grid
    }

    /// Maps a world position to a grid cell, or `None` when it falls outside
    /// the visible window.
    #[must_use]
    pub fn project(&self, position: Position) -> Option<(u16, u16)> {
        if self.grid.0 == 0
            || self.grid.1 == 0
            || self.world_size.0 <= f32::EPSILON
            || self.world_size.1 <= f32::EPSILON
        {
            return None;
        }
        let u = (position.x - self.origin.0) / self.world_size.0;
        let v = (position.y - self.origin.1) / self.world_size.1;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        let column = ((u * f32::from(self.grid.0)).floor() as u16).min(self.grid.0 - 1);
        let row = ((v * f32::from(self.grid.1)).floor() as u16).min(self.grid.1 - 1);
        Some((column, row))
    }
}
