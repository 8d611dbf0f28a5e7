//! Tower shots.

use super::body::{Body, Entity, EntityId};
use crate::math::angle_to_vector;
use glam::Vec2;
use protocol::Color;

pub const PROJECTILE_RADIUS: f32 = 3.0;
pub const PROJECTILE_SPEED: f32 = 5.0;
pub const PROJECTILE_MAX_DISTANCE: f32 = 300.0;

/// A projectile flying in a straight line. Once fired it is owned by the
/// world; `owner` is kept only for attribution and friendly-fire exclusion.
#[derive(Debug, Clone)]
pub struct Projectile {
    body: Body,
    pub angle: f32,
    pub damage: f32,
    pub owner: EntityId,
    pub traveled: f32,
}

impl Projectile {
    pub fn new(position: Vec2, angle: f32, damage: f32, owner: EntityId) -> Self {
        Self {
            // Ids are assigned when the world takes ownership.
            body: Body::new(0, position, PROJECTILE_RADIUS, Color::WHITE),
            angle,
            damage,
            owner,
            traveled: 0.0,
        }
    }

    /// Advance along the firing angle, flagging the shot once it has flown
    /// past its range.
    pub fn update(&mut self) {
        self.body.position += angle_to_vector(self.angle) * PROJECTILE_SPEED;
        self.traveled += PROJECTILE_SPEED;
        if self.traveled > PROJECTILE_MAX_DISTANCE {
            self.body.removed = true;
        }
    }
}

impl Entity for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_max_distance() {
        let mut p = Projectile::new(Vec2::ZERO, 0.0, 10.0, 7);
        for _ in 0..60 {
            p.update();
        }
        assert_eq!(p.traveled, 300.0);
        assert!(!p.is_removed());

        p.update();
        assert!(p.is_removed());
        assert!((p.position().x - 305.0).abs() < 1e-3);
    }
}
