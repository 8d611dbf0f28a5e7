//! Bot population: initial spawn, names and colors, and top-up while
//! playing offline.

use super::bot_player::Bot;
use super::difficulty::{Difficulty, DifficultySetting};
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::math::distance;
use crate::world::World;
use glam::Vec2;
use protocol::Color;
use rand::Rng;
use tracing::{debug, info};

/// Bot names to use.
const BOT_NAMES: &[&str] = &[
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliet",
];

/// Bot palette, paired with the names by index at game start.
const BOT_COLORS: &[Color] = &[
    Color::from_rgb(0xFF5722),
    Color::from_rgb(0x9C27B0),
    Color::from_rgb(0x3F51B5),
    Color::from_rgb(0x03A9F4),
    Color::from_rgb(0x009688),
    Color::from_rgb(0x8BC34A),
    Color::from_rgb(0xFFEB3B),
    Color::from_rgb(0xFF9800),
    Color::from_rgb(0x795548),
    Color::from_rgb(0x607D8B),
];

/// Bots spawn at least this far from the border.
const SPAWN_MARGIN: f32 = 100.0;
/// Attempts at finding a spawn point far enough from the player.
const SPAWN_ATTEMPTS: usize = 64;

/// Bot manager.
#[derive(Debug)]
pub struct BotManager {
    /// Active bots.
    pub bots: Vec<Bot>,
    /// Population kept alive when not connected to a relay.
    pub target_count: usize,
    setting: DifficultySetting,
    start_radius: f32,
    base_speed: f32,
    min_spawn_distance: f32,
}

impl BotManager {
    /// Create an empty bot manager.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            bots: Vec::with_capacity(config.bot_count),
            target_count: config.bot_count,
            setting: config.bot_difficulty,
            start_radius: config.start_radius,
            base_speed: config.base_speed,
            min_spawn_distance: config.bot_min_spawn_distance,
        }
    }

    /// Replace every bot with a fresh population of `target_count`.
    /// Names, colors and (for mixed) difficulty follow creation order.
    pub fn populate<R: Rng>(&mut self, world: &mut World, avoid: Vec2, rng: &mut R) {
        self.bots.clear();
        for i in 0..self.target_count {
            let name = BOT_NAMES[i % BOT_NAMES.len()];
            let color = BOT_COLORS[i % BOT_COLORS.len()];
            let difficulty = self.setting.for_index(i);
            self.spawn(world, name, color, difficulty, avoid, rng);
        }
        info!("Created {} bots ({})", self.bots.len(), self.setting.as_str());
    }

    /// Refill the population up to `target_count` with random names,
    /// colors and (for mixed) difficulty. Returns the new bot ids.
    pub fn top_up<R: Rng>(&mut self, world: &mut World, avoid: Vec2, rng: &mut R) -> Vec<EntityId> {
        let missing = self.target_count.saturating_sub(self.bots.len());
        let mut spawned = Vec::with_capacity(missing);
        for _ in 0..missing {
            let name = BOT_NAMES[rng.random_range(0..BOT_NAMES.len())];
            let color = BOT_COLORS[rng.random_range(0..BOT_COLORS.len())];
            let difficulty = self.setting.for_respawn(rng);
            spawned.push(self.spawn(world, name, color, difficulty, avoid, rng));
        }
        if !spawned.is_empty() {
            info!("Respawned {} bots", spawned.len());
        }
        spawned
    }

    fn spawn<R: Rng>(
        &mut self,
        world: &mut World,
        name: &str,
        color: Color,
        difficulty: Difficulty,
        avoid: Vec2,
        rng: &mut R,
    ) -> EntityId {
        let position = self.spawn_position(world, avoid, rng);
        let id = world.next_id();
        debug!("Spawning bot {} ({}) at ({:.0}, {:.0})", name, difficulty, position.x, position.y);
        self.bots.push(Bot::new(
            id,
            name,
            color,
            position,
            difficulty,
            self.start_radius,
            self.base_speed,
        ));
        id
    }

    /// Random point away from the border and from `avoid`. Gives up after a
    /// bounded number of attempts and keeps the last candidate.
    fn spawn_position<R: Rng>(&self, world: &World, avoid: Vec2, rng: &mut R) -> Vec2 {
        let mut candidate = world.border.random_position(rng, SPAWN_MARGIN);
        for _ in 1..SPAWN_ATTEMPTS {
            if distance(candidate, avoid) >= self.min_spawn_distance {
                break;
            }
            candidate = world.border.random_position(rng, SPAWN_MARGIN);
        }
        candidate
    }

    /// Get a bot by ID.
    pub fn get_bot(&self, id: EntityId) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id() == id)
    }

    /// Get a mutable bot by ID.
    pub fn get_bot_mut(&mut self, id: EntityId) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| b.id() == id)
    }

    /// Drop bots flagged as eaten or shot down. Returns how many went.
    pub fn purge(&mut self) -> usize {
        let before = self.bots.len();
        self.bots.retain(|b| !b.is_removed());
        before - self.bots.len()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
