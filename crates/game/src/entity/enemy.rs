//! Hostile drifters that chase the nearest player.

use super::body::{Body, Entity, EntityId};
use glam::Vec2;
use protocol::Color;

/// Smallest and largest spawn radius (inclusive).
pub const ENEMY_RADIUS_RANGE: (u32, u32) = (15, 40);
/// Enemies at or under this health die.
pub const ENEMY_DEATH_HEALTH: f32 = 5.0;

/// An enemy. Health and radius are coupled: damage shrinks it.
#[derive(Debug, Clone)]
pub struct Enemy {
    body: Body,
    pub speed: f32,
    /// Score awarded to whoever eats or shoots it down.
    pub value: u32,
    pub health: f32,
}

impl Enemy {
    /// Create an enemy; larger enemies are slower and worth more.
    pub fn new(id: EntityId, position: Vec2, radius: f32, color: Color) -> Self {
        let (min, max) = ENEMY_RADIUS_RANGE;
        let span = (max - min) as f32;
        let speed = (3.0 - (radius - min as f32) / span * 2.0) * 0.5;
        Self {
            body: Body::new(id, position, radius, color),
            speed,
            value: (radius * 2.0).floor() as u32,
            health: radius,
        }
    }

    /// Move straight toward `target`.
    #[inline]
    pub fn update(&mut self, target: Vec2) {
        let speed = self.speed;
        self.body.move_toward(target, speed);
    }

    /// Apply damage. Returns the enemy's value when this kills it.
    pub fn take_damage(&mut self, amount: f32) -> Option<u32> {
        self.health -= amount;
        self.body.radius = self.health;
        if self.health <= ENEMY_DEATH_HEALTH {
            self.body.removed = true;
            Some(self.value)
        } else {
            None
        }
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
