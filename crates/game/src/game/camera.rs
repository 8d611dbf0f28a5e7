//! Viewport tracking the local player.

use crate::math;
use crate::world::WorldBorder;
use glam::Vec2;
use serde::Serialize;

/// Top-left corner of the visible area plus its size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub position: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
        }
    }

    /// Center on `target`, clamped so the view stays inside the world.
    /// A viewport larger than the world pins to the far edge.
    pub fn follow(&mut self, target: Vec2, border: &WorldBorder) {
        let half = self.viewport / 2.0;
        self.position.x = math::clamp(target.x - half.x, border.min_x, border.max_x - self.viewport.x);
        self.position.y = math::clamp(target.y - half.y, border.min_y, border.max_y - self.viewport.y);
    }

    /// Convert a pointer position in screen space to world space.
    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.position
    }
}
