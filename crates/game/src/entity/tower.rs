//! Towers orbiting their owner and the per-owner armory.

use super::projectile::Projectile;
use crate::math::angle;
use glam::Vec2;
use protocol::{Color, TowerKind, TowerSnapshot};

/// Fixed base stats of a tower kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerSpec {
    pub radius: f32,
    pub color: Color,
    /// Shots per second.
    pub fire_rate: f32,
    pub damage: f32,
    pub range: f32,
    pub cost: u32,
    /// Position relative to the owner's center.
    pub offset: Vec2,
}

/// Towers never grow past this fraction of their owner's radius.
pub const MAX_OWNER_RATIO: f32 = 0.8;

impl TowerSpec {
    pub const fn of(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Basic => Self {
                radius: 10.0,
                color: Color::new(0x4C, 0xAF, 0x50),
                fire_rate: 1.0,
                damage: 10.0,
                range: 150.0,
                cost: 10,
                offset: Vec2::new(30.0, 0.0),
            },
            TowerKind::Fast => Self {
                radius: 8.0,
                color: Color::new(0x21, 0x96, 0xF3),
                fire_rate: 3.0,
                damage: 5.0,
                range: 120.0,
                cost: 25,
                offset: Vec2::new(0.0, 30.0),
            },
            TowerKind::Heavy => Self {
                radius: 12.0,
                color: Color::new(0xF4, 0x43, 0x36),
                fire_rate: 0.5,
                damage: 25.0,
                range: 180.0,
                cost: 50,
                offset: Vec2::new(-30.0, 0.0),
            },
        }
    }

    /// Price of the next purchase of this kind when `level` is already owned
    /// (0 = not owned).
    pub fn price(&self, level: u32) -> u32 {
        if level == 0 {
            self.cost
        } else {
            (self.cost as f32 * (1.0 + 0.5 * level as f32)).floor() as u32
        }
    }
}

/// A tower bound to an owner.
#[derive(Debug, Clone)]
pub struct Tower {
    pub kind: TowerKind,
    pub position: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub level: u32,
    /// Milliseconds timestamp of the last shot.
    pub last_fire: f64,
    /// Current aim, in radians.
    pub aim: f32,
}

impl Tower {
    /// Build a level-1 tower next to its owner.
    pub fn new(kind: TowerKind, owner_position: Vec2, owner_radius: f32) -> Self {
        let spec = TowerSpec::of(kind);
        let mut tower = Self {
            kind,
            position: owner_position + spec.offset,
            radius: spec.radius,
            damage: spec.damage,
            level: 1,
            last_fire: 0.0,
            aim: 0.0,
        };
        tower.fit_to_owner(owner_radius);
        tower
    }

    #[inline]
    pub fn spec(&self) -> TowerSpec {
        TowerSpec::of(self.kind)
    }

    /// Set the level, rescaling damage and size from the base stats.
    pub fn set_level(&mut self, level: u32, owner_radius: f32) {
        self.level = level.max(1);
        self.damage = self.spec().damage * (1.0 + 0.3 * (self.level - 1) as f32);
        self.fit_to_owner(owner_radius);
    }

    /// Rescale to the level size, capped relative to the owner.
    #[inline]
    pub fn fit_to_owner(&mut self, owner_radius: f32) {
        let scaled = self.spec().radius * (1.0 + 0.1 * (self.level - 1) as f32);
        self.radius = scaled.min(owner_radius * MAX_OWNER_RATIO);
    }

    /// Reposition next to the owner.
    #[inline]
    pub fn update(&mut self, owner_position: Vec2) {
        self.position = owner_position + self.spec().offset;
    }

    #[inline]
    pub fn can_fire(&self, now: f64) -> bool {
        now - self.last_fire > 1000.0 / self.spec().fire_rate as f64
    }

    /// Aim at `target`, record the shot time and return the projectile.
    pub fn fire(&mut self, now: f64, target: Vec2, owner: super::EntityId) -> Projectile {
        self.aim = angle(self.position, target);
        self.last_fire = now;
        Projectile::new(self.position, self.aim, self.damage, owner)
    }

    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            kind: self.kind,
            level: self.level,
            x: self.position.x,
            y: self.position.y,
        }
    }
}

/// At most one tower per kind, upgraded in place.
#[derive(Debug, Clone, Default)]
pub struct Armory {
    towers: Vec<Tower>,
}

impl Armory {
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn towers_mut(&mut self) -> &mut [Tower] {
        &mut self.towers
    }

    pub fn get(&self, kind: TowerKind) -> Option<&Tower> {
        self.towers.iter().find(|t| t.kind == kind)
    }

    /// Owned level of `kind`, 0 when absent.
    pub fn level(&self, kind: TowerKind) -> u32 {
        self.get(kind).map_or(0, |t| t.level)
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    /// Price of the next purchase of `kind`.
    pub fn price(&self, kind: TowerKind) -> u32 {
        TowerSpec::of(kind).price(self.level(kind))
    }

    /// Add `kind` at level 1 or upgrade the owned one. Returns the new level.
    pub fn install(&mut self, kind: TowerKind, owner_position: Vec2, owner_radius: f32) -> u32 {
        match self.towers.iter_mut().find(|t| t.kind == kind) {
            Some(tower) => {
                let level = tower.level + 1;
                tower.set_level(level, owner_radius);
                level
            }
            None => {
                self.towers.push(Tower::new(kind, owner_position, owner_radius));
                1
            }
        }
    }

    /// Move every tower along with the owner and re-apply the size cap.
    pub fn follow(&mut self, owner_position: Vec2, owner_radius: f32) {
        for tower in &mut self.towers {
            tower.update(owner_position);
            tower.fit_to_owner(owner_radius);
        }
    }

    /// Replace the towers with the ones in a snapshot. Fire timers survive
    /// for kinds that were already present. Level 0 means not owned.
    pub fn apply_snapshot(&mut self, towers: &[TowerSnapshot], owner_radius: f32) {
        let mut next = Vec::with_capacity(towers.len());
        for snap in towers {
            if snap.level == 0 || next.iter().any(|t: &Tower| t.kind == snap.kind) {
                continue;
            }
            let position = Vec2::new(snap.x, snap.y);
            let mut tower = Tower::new(snap.kind, position - TowerSpec::of(snap.kind).offset, owner_radius);
            tower.position = position;
            tower.set_level(snap.level, owner_radius);
            if let Some(old) = self.get(snap.kind) {
                tower.last_fire = old.last_fire;
                tower.aim = old.aim;
            }
            next.push(tower);
        }
        self.towers = next;
    }

    pub fn snapshot(&self) -> Vec<TowerSnapshot> {
        self.towers.iter().map(Tower::snapshot).collect()
    }
}
