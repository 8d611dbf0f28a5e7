//! Base circular body and common functionality.

use crate::math::{self, circles_overlap};
use crate::world::WorldBorder;
use glam::Vec2;
use protocol::Color;

/// Identifier unique among all entities of one game.
pub type EntityId = u32;

/// Common data shared by every positional circle in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: EntityId,
    /// Position in world coordinates.
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Flagged entities stay in their container until the end-of-tick purge.
    pub removed: bool,
}

impl Body {
    pub fn new(id: EntityId, position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            id,
            position,
            radius,
            color,
            removed: false,
        }
    }

    /// Keep the whole circle inside the border.
    #[inline]
    pub fn clamp_to(&mut self, border: &WorldBorder) {
        self.position.x = math::clamp(
            self.position.x,
            border.min_x + self.radius,
            border.max_x - self.radius,
        );
        self.position.y = math::clamp(
            self.position.y,
            border.min_y + self.radius,
            border.max_y - self.radius,
        );
    }

    /// Move `distance` units straight toward `target`. Zero-length steering
    /// leaves the body where it is.
    #[inline]
    pub fn move_toward(&mut self, target: Vec2, distance: f32) {
        if let Some(dir) = math::direction(self.position, target) {
            self.position += dir * distance;
        }
    }
}

/// Trait for every entity kind.
pub trait Entity {
    /// Get the common body data.
    fn body(&self) -> &Body;

    /// Get mutable body data.
    fn body_mut(&mut self) -> &mut Body;

    #[inline]
    fn id(&self) -> EntityId {
        self.body().id
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.body().position
    }

    #[inline]
    fn radius(&self) -> f32 {
        self.body().radius
    }

    #[inline]
    fn is_removed(&self) -> bool {
        self.body().removed
    }

    #[inline]
    fn mark_removed(&mut self) {
        self.body_mut().removed = true;
    }

    /// Strict sum-of-radii overlap test against another entity.
    #[inline]
    fn overlaps(&self, other: &dyn Entity) -> bool {
        circles_overlap(self.position(), self.radius(), other.position(), other.radius())
    }
}
