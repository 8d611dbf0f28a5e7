//! Food pickups.

use super::body::{Body, Entity, EntityId};
use glam::Vec2;
use protocol::Color;

/// Smallest and largest food radius (inclusive).
pub const FOOD_RADIUS_RANGE: (u32, u32) = (3, 8);

/// A static pickup worth its radius in score.
#[derive(Debug, Clone)]
pub struct Food {
    body: Body,
    pub value: u32,
}

impl Food {
    pub fn new(id: EntityId, position: Vec2, radius: u32, color: Color) -> Self {
        Self {
            body: Body::new(id, position, radius as f32, color),
            value: radius,
        }
    }
}

impl Entity for Food {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
