//! Player-like blobs: the local player, bots and remote players.

use super::body::{Body, Entity, EntityId};
use super::tower::Armory;
use crate::collision::{EAT_GROWTH_FACTOR, FOOD_GROWTH, MIN_ALIVE_RADIUS};
use crate::error::PurchaseError;
use crate::math;
use crate::world::WorldBorder;
use glam::Vec2;
use protocol::{Color, PlayerSnapshot, TowerKind};

/// Speed never drops below this.
pub const MIN_SPEED: f32 = 0.5;
/// Score needed per extra point of radius.
pub const SCORE_PER_RADIUS: u32 = 100;
/// Radius lost per point of projectile damage.
pub const DAMAGE_SHRINK: f32 = 0.05;

/// Who drives a player-like blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// Steered by pointer input on this host.
    Local,
    /// Steered by the bot AI.
    Bot,
    /// Overwritten from relay snapshots.
    Remote,
}

/// A growing blob with towers.
#[derive(Debug, Clone)]
pub struct Player {
    body: Body,
    pub kind: PlayerKind,
    pub nickname: String,
    pub velocity: Vec2,
    pub base_speed: f32,
    pub speed: f32,
    start_radius: f32,
    pub score: u32,
    pub armory: Armory,
    /// Milliseconds timestamp until which the player cannot be eaten or hurt.
    pub invulnerable_until: f64,
}

impl Player {
    pub fn new(
        id: EntityId,
        kind: PlayerKind,
        nickname: impl Into<String>,
        position: Vec2,
        color: Color,
        start_radius: f32,
        base_speed: f32,
    ) -> Self {
        let mut player = Self {
            body: Body::new(id, position, start_radius, color),
            kind,
            nickname: nickname.into(),
            velocity: Vec2::ZERO,
            base_speed,
            speed: base_speed,
            start_radius,
            score: 0,
            armory: Armory::default(),
            invulnerable_until: 0.0,
        };
        player.update_speed();
        player
    }

    /// Steer toward `target`, move, stay inside the border and grow from
    /// score. Towers follow.
    pub fn update(&mut self, target: Vec2, border: &WorldBorder) {
        if let Some(dir) = math::direction(self.body.position, target) {
            self.velocity = dir * self.speed;
        }
        self.body.position += self.velocity;
        self.body.clamp_to(border);
        self.grow_from_score();
        self.armory.follow(self.body.position, self.body.radius);
    }

    /// Larger blobs are slower, down to [`MIN_SPEED`].
    #[inline]
    pub fn update_speed(&mut self) {
        if self.body.radius > 0.0 {
            self.speed = (self.base_speed * 30.0 / self.body.radius).max(MIN_SPEED);
        }
    }

    /// Radius implied by the score alone.
    #[inline]
    pub fn size_tier(&self) -> f32 {
        self.start_radius + (self.score / SCORE_PER_RADIUS) as f32
    }

    /// Raise the radius to the size tier. Never shrinks.
    pub fn grow_from_score(&mut self) {
        let tier = self.size_tier();
        if tier > self.body.radius {
            self.body.radius = tier;
            self.update_speed();
        }
    }

    /// Pick up a food pellet.
    pub fn eat_food(&mut self, value: u32) {
        self.score = self.score.saturating_add(value);
        self.body.radius += FOOD_GROWTH;
        self.update_speed();
    }

    /// Consume a blob or enemy of `victim_radius`, gaining `points`.
    pub fn consume(&mut self, victim_radius: f32, points: u32) {
        self.score = self.score.saturating_add(points);
        self.body.radius += victim_radius * EAT_GROWTH_FACTOR;
        self.update_speed();
    }

    /// Shrink from a projectile hit. Returns true when this kills the blob.
    pub fn take_hit(&mut self, damage: f32) -> bool {
        self.body.radius -= damage * DAMAGE_SHRINK;
        self.update_speed();
        !self.is_alive()
    }

    /// Collapse after being eaten.
    pub fn collapse(&mut self) {
        self.body.radius = 0.0;
        self.velocity = Vec2::ZERO;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.body.radius >= MIN_ALIVE_RADIUS
    }

    #[inline]
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Price of the next purchase of `kind`.
    #[inline]
    pub fn tower_price(&self, kind: TowerKind) -> u32 {
        self.armory.price(kind)
    }

    /// Buy or upgrade a tower. On failure nothing changes.
    pub fn purchase_tower(&mut self, kind: TowerKind) -> Result<u32, PurchaseError> {
        let cost = self.tower_price(kind);
        if self.score < cost {
            return Err(PurchaseError::InsufficientScore {
                kind,
                cost,
                score: self.score,
            });
        }
        self.score -= cost;
        Ok(self.armory.install(kind, self.body.position, self.body.radius))
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.body.position.x,
            y: self.body.position.y,
            radius: self.body.radius,
            score: self.score,
            color: self.body.color,
            towers: self.armory.snapshot(),
            is_alive: self.is_alive(),
        }
    }

    /// Overwrite every visible field from a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        self.body.position = Vec2::new(snapshot.x, snapshot.y);
        self.body.radius = snapshot.radius;
        self.body.color = snapshot.color;
        self.score = snapshot.score;
        self.armory.apply_snapshot(&snapshot.towers, snapshot.radius);
        self.update_speed();
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
