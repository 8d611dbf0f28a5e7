//! World state management.
//!
//! Owns the non-player entity containers (food, enemies, projectiles), the
//! spawn timers and id allocation. Players live in the game itself.

use crate::config::GameConfig;
use crate::entity::{ENEMY_RADIUS_RANGE, Enemy, Entity, EntityId, FOOD_RADIUS_RANGE, Food, Projectile};
use crate::math::distance;
use glam::Vec2;
use protocol::Color;
use rand::Rng;

/// Enemies appear this far outside the border.
const ENEMY_SPAWN_MARGIN: f32 = 50.0;
/// Food keeps this distance from the border.
const FOOD_SPAWN_MARGIN: f32 = 50.0;

/// World border bounds, with the origin in the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldBorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
            width,
            height,
        }
    }

    /// Random integer position at least `margin` away from every edge.
    #[inline]
    pub fn random_position<R: Rng>(&self, rng: &mut R, margin: f32) -> Vec2 {
        Vec2::new(
            random_int(rng, self.min_x + margin, self.max_x - margin),
            random_int(rng, self.min_y + margin, self.max_y - margin),
        )
    }

    /// Random point just outside one of the four edges.
    pub fn random_edge_position<R: Rng>(&self, rng: &mut R, margin: f32) -> Vec2 {
        match rng.random_range(0..4) {
            0 => Vec2::new(random_int(rng, self.min_x, self.max_x), self.min_y - margin),
            1 => Vec2::new(self.max_x + margin, random_int(rng, self.min_y, self.max_y)),
            2 => Vec2::new(random_int(rng, self.min_x, self.max_x), self.max_y + margin),
            _ => Vec2::new(self.min_x - margin, random_int(rng, self.min_y, self.max_y)),
        }
    }
}

/// Uniform integer in `[min, max]`, tolerating inverted bounds.
#[inline]
pub fn random_int<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    let lo = min.floor() as i32;
    let hi = (max.floor() as i32).max(lo);
    rng.random_range(lo..=hi) as f32
}

/// Random pastel color (any hue, 70% saturation, 60% lightness).
#[inline]
pub fn random_color<R: Rng>(rng: &mut R) -> Color {
    Color::from_hsl(rng.random_range(0..=360) as f32, 0.7, 0.6)
}

/// Spawn pacing taken from the game config.
#[derive(Debug, Clone, Copy)]
struct SpawnPacing {
    enemy_floor_ms: f64,
    enemy_step_ms: f64,
    food_interval_ms: f64,
    max_food: usize,
}

/// The arena and every non-player entity in it.
#[derive(Debug)]
pub struct World {
    /// Next entity id to assign.
    next_entity_id: EntityId,
    pub border: WorldBorder,
    pub food: Vec<Food>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Current enemy spawn interval; shrinks after every spawn.
    pub enemy_spawn_interval_ms: f64,
    last_enemy_spawn: f64,
    last_food_spawn: f64,
    pacing: SpawnPacing,
}

impl World {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            next_entity_id: 1,
            border: WorldBorder::new(config.world_width, config.world_height),
            food: Vec::with_capacity(config.max_food),
            enemies: Vec::with_capacity(64),
            projectiles: Vec::with_capacity(128),
            enemy_spawn_interval_ms: config.enemy_spawn_interval_ms,
            last_enemy_spawn: 0.0,
            last_food_spawn: 0.0,
            pacing: SpawnPacing {
                enemy_floor_ms: config.enemy_spawn_floor_ms,
                enemy_step_ms: config.enemy_spawn_step_ms,
                food_interval_ms: config.food_spawn_interval_ms,
                max_food: config.max_food,
            },
        }
    }

    /// Get the next entity id.
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = self.next_entity_id.wrapping_add(1).max(1);
        id
    }

    /// Spawn one enemy on a random edge when the spawn interval has elapsed.
    ///
    /// A spawn point within `clearance` of any `protected` position is
    /// rejected; the timer is left alone so the next tick tries again.
    pub fn spawn_enemy<R: Rng>(
        &mut self,
        now: f64,
        rng: &mut R,
        protected: &[Vec2],
        clearance: f32,
    ) -> Option<EntityId> {
        if now - self.last_enemy_spawn <= self.enemy_spawn_interval_ms {
            return None;
        }

        let position = self.border.random_edge_position(rng, ENEMY_SPAWN_MARGIN);
        if protected.iter().any(|p| distance(*p, position) < clearance) {
            return None;
        }

        self.last_enemy_spawn = now;
        let (min, max) = ENEMY_RADIUS_RANGE;
        let radius = rng.random_range(min..=max) as f32;
        let id = self.next_id();
        let color = random_color(rng);
        self.enemies.push(Enemy::new(id, position, radius, color));

        self.enemy_spawn_interval_ms =
            (self.enemy_spawn_interval_ms - self.pacing.enemy_step_ms).max(self.pacing.enemy_floor_ms);
        Some(id)
    }

    /// Spawn one food pellet when the food interval has elapsed and the
    /// arena is under its food cap.
    pub fn spawn_food<R: Rng>(&mut self, now: f64, rng: &mut R) -> Option<EntityId> {
        if now - self.last_food_spawn <= self.pacing.food_interval_ms {
            return None;
        }
        self.last_food_spawn = now;
        if self.food.len() >= self.pacing.max_food {
            return None;
        }

        let position = self.border.random_position(rng, FOOD_SPAWN_MARGIN);
        let (min, max) = FOOD_RADIUS_RANGE;
        let radius = rng.random_range(min..=max);
        let id = self.next_id();
        let color = random_color(rng);
        self.food.push(Food::new(id, position, radius, color));
        Some(id)
    }

    /// Take ownership of a freshly fired projectile.
    pub fn add_projectile(&mut self, mut projectile: Projectile) -> EntityId {
        let id = self.next_id();
        projectile.body_mut().id = id;
        self.projectiles.push(projectile);
        id
    }

    /// Drop every flagged food, enemy and projectile.
    pub fn purge(&mut self) {
        self.food.retain(|f| !f.is_removed());
        self.enemies.retain(|e| !e.is_removed());
        self.projectiles.retain(|p| !p.is_removed());
    }

    /// Get the count of each entity type.
    #[inline]
    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            food: self.food.len(),
            enemies: self.enemies.len(),
            projectiles: self.projectiles.len(),
        }
    }
}

/// Entity count statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub food: usize,
    pub enemies: usize,
    pub projectiles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> World {
        World::new(&GameConfig::default())
    }

    #[test]
    fn test_enemy_spawn_pacing() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(world.spawn_enemy(3000.0, &mut rng, &[], 0.0).is_none());
        assert!(world.spawn_enemy(3001.0, &mut rng, &[], 0.0).is_some());
        assert_eq!(world.enemy_spawn_interval_ms, 2995.0);
        assert!(world.spawn_enemy(4000.0, &mut rng, &[], 0.0).is_none());

        let enemy = &world.enemies[0];
        let p = enemy.position();
        let outside = p.x < 0.0 || p.y < 0.0 || p.x > 2000.0 || p.y > 2000.0;
        assert!(outside);
        assert!((15.0..=40.0).contains(&enemy.radius()));
    }

    #[test]
    fn test_enemy_interval_floor() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(1);
        world.enemy_spawn_interval_ms = 1002.0;
        world.spawn_enemy(5000.0, &mut rng, &[], 0.0);
        assert_eq!(world.enemy_spawn_interval_ms, 1000.0);
        world.spawn_enemy(7000.0, &mut rng, &[], 0.0);
        assert_eq!(world.enemy_spawn_interval_ms, 1000.0);
    }

    #[test]
    fn test_enemy_spawn_suppressed_near_protected() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(3);
        // Clearance covering the whole arena blocks every spawn.
        let protected = [Vec2::new(1000.0, 1000.0)];
        assert!(world.spawn_enemy(5000.0, &mut rng, &protected, 5000.0).is_none());
        assert!(world.enemies.is_empty());
        assert!(world.spawn_enemy(5001.0, &mut rng, &[], 0.0).is_some());
    }

    #[test]
    fn test_food_spawn_and_cap() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(11);
        assert!(world.spawn_food(1001.0, &mut rng).is_some());
        assert!(world.spawn_food(1500.0, &mut rng).is_none());

        let food = &world.food[0];
        assert_eq!(food.value as f32, food.radius());
        assert!((3.0..=8.0).contains(&food.radius()));
        let p = food.position();
        assert!(p.x >= 50.0 && p.x <= 1950.0 && p.y >= 50.0 && p.y <= 1950.0);

        world.pacing.max_food = 1;
        assert!(world.spawn_food(3000.0, &mut rng).is_none());
        assert_eq!(world.food.len(), 1);
    }

    #[test]
    fn test_purge_flagged() {
        let mut world = world();
        let id = world.add_projectile(Projectile::new(Vec2::ZERO, 0.0, 1.0, 1));
        let id2 = world.add_projectile(Projectile::new(Vec2::ZERO, 0.0, 1.0, 1));
        assert_ne!(id, id2);
        world.projectiles[0].mark_removed();
        world.purge();
        assert_eq!(world.counts().projectiles, 1);
        assert_eq!(world.projectiles[0].id(), id2);
    }
}
