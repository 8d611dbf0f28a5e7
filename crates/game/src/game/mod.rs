//! The simulation loop.
//!
//! [`Game`] owns every entity container and advances them one host tick at a
//! time. The host owns the clock: it calls [`Game::tick`] with a monotonic
//! millisecond timestamp and stops calling it to cancel.

mod camera;
mod combat;
mod interactions;
mod remote;
mod snapshot;

pub use camera::Camera;
pub use combat::{Targeting, fire_towers};
pub use remote::{EATEN_IMMUNITY_MS, RemotePlayer, RemoteRoster, RoomUpdate, RosterChange};
pub use snapshot::{BlobView, CircleView, GameSnapshot, RoomView};

use crate::ai::BotManager;
use crate::config::GameConfig;
use crate::entity::{Entity, Player, PlayerKind};
use crate::error::PurchaseError;
use crate::world::World;
use glam::Vec2;
use protocol::{Color, PlayerSnapshot, TowerKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Color of the local player's blob.
pub const PLAYER_COLOR: Color = Color::from_rgb(0x4CAF50);
/// Ticks between periodic debug lines.
const LOG_EVERY_TICKS: u64 = 600;

/// Whether the local player is still in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Running,
    Over,
}

/// The relay room this game is mirrored into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLink {
    pub room_id: String,
    /// Our relay player id.
    pub player_id: String,
}

/// A running game.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    pub world: World,
    pub player: Player,
    pub bots: BotManager,
    pub remotes: RemoteRoster,
    camera: Camera,
    /// Pointer target in world coordinates.
    pointer: Vec2,
    status: GameStatus,
    rng: StdRng,
    tick_count: u64,
    /// Spawn protection is granted on the first tick, when time is known.
    grace_armed: bool,
    room: Option<RoomLink>,
    /// Room updates received since the last tick.
    inbox: Vec<RoomUpdate>,
}

impl Game {
    /// Create a game with the local player in the middle of the world and a
    /// fresh bot population.
    pub fn new(config: GameConfig) -> Self {
        let rng = if config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.seed)
        };
        let mut world = World::new(&config);
        let player = Self::spawn_player(&config, &mut world);
        let camera = Camera::new(Vec2::new(config.viewport_width, config.viewport_height));

        let mut game = Self {
            bots: BotManager::new(&config),
            remotes: RemoteRoster::default(),
            pointer: player.position(),
            player,
            world,
            camera,
            status: GameStatus::Running,
            rng,
            tick_count: 0,
            grace_armed: false,
            room: None,
            inbox: Vec::new(),
            config,
        };
        game.bots.populate(&mut game.world, game.player.position(), &mut game.rng);
        game.camera.follow(game.player.position(), &game.world.border);
        info!(
            "New game: {}x{} world, {} bots",
            game.config.world_width,
            game.config.world_height,
            game.bots.len()
        );
        game
    }

    fn spawn_player(config: &GameConfig, world: &mut World) -> Player {
        let center = Vec2::new(config.world_width / 2.0, config.world_height / 2.0);
        Player::new(
            world.next_id(),
            PlayerKind::Local,
            config.nickname.clone(),
            center,
            PLAYER_COLOR,
            config.start_radius,
            config.base_speed,
        )
    }

    /// Reset the world and the local player and recreate the bots. The relay
    /// room, if any, is kept.
    pub fn restart(&mut self) {
        self.world = World::new(&self.config);
        self.player = Self::spawn_player(&self.config, &mut self.world);
        self.pointer = self.player.position();
        self.status = GameStatus::Running;
        self.grace_armed = false;
        self.inbox.clear();
        let self_id = self.room.as_ref().map(|r| r.player_id.clone());
        self.remotes = RemoteRoster::new(self_id);
        self.bots.populate(&mut self.world, self.player.position(), &mut self.rng);
        self.camera.follow(self.player.position(), &self.world.border);
        info!("Game restarted");
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self, now: f64) {
        if !self.is_running() {
            return;
        }
        self.tick_count += 1;
        if !self.grace_armed {
            self.arm_grace(now);
        }

        // 1. Spawning
        self.spawn(now);

        // 2. Local player
        self.player.update(self.pointer, &self.world.border);

        // 3. Bots
        self.update_bots(now);

        // 4. Remote players
        self.update_remotes(now);

        // 5. Camera
        self.camera.follow(self.player.position(), &self.world.border);

        // 6. Enemies
        self.update_enemies(now);

        // 7. Projectiles
        self.update_projectiles(now);

        // 8. Food pickup
        self.collect_player_food();

        // 9. Local towers
        self.fire_player_towers(now);

        // 10. Purge
        self.world.purge();
        let eaten = self.bots.purge();
        if eaten > 0 {
            debug!("Removed {} bots", eaten);
        }

        // 11. Refill
        if self.room.is_none() && self.bots.len() < self.bots.target_count {
            let spawned = self.bots.top_up(&mut self.world, self.player.position(), &mut self.rng);
            let grace = self.config.grace_period_ms;
            if grace > 0.0 {
                for id in spawned {
                    if let Some(bot) = self.bots.get_bot_mut(id) {
                        bot.player.invulnerable_until = now + grace;
                    }
                }
            }
        }

        if self.tick_count % LOG_EVERY_TICKS == 0 {
            let counts = self.world.counts();
            debug!(
                "Tick {}: score {}, {} bots, {} remotes, {} enemies, {} food, {} projectiles",
                self.tick_count,
                self.player.score,
                self.bots.len(),
                self.remotes.len(),
                counts.enemies,
                counts.food,
                counts.projectiles
            );
        }
    }

    fn arm_grace(&mut self, now: f64) {
        self.grace_armed = true;
        let grace = self.config.grace_period_ms;
        if grace <= 0.0 {
            return;
        }
        self.player.invulnerable_until = now + grace;
        for bot in &mut self.bots.bots {
            bot.player.invulnerable_until = now + grace;
        }
    }

    fn spawn(&mut self, now: f64) {
        let protected: Vec<Vec2> = if self.config.grace_period_ms > 0.0 {
            std::iter::once(&self.player)
                .chain(self.bots.bots.iter().map(|b| &b.player))
                .filter(|p| p.is_invulnerable(now))
                .map(|p| p.position())
                .collect()
        } else {
            Vec::new()
        };
        self.world
            .spawn_enemy(now, &mut self.rng, &protected, self.config.grace_clearance);
        self.world.spawn_food(now, &mut self.rng);
    }

    /// Collapse the local player and end the game.
    pub(crate) fn defeat_local(&mut self, cause: &str) {
        if !self.is_running() {
            return;
        }
        self.player.collapse();
        self.end_game(cause);
    }

    /// Flip to game over. Refused while the player is still above the
    /// minimum-alive radius; never triggers twice.
    pub(crate) fn end_game(&mut self, cause: &str) {
        if !self.is_running() {
            return;
        }
        if self.player.is_alive() {
            warn!(
                "Ignoring game over ({}) with player radius {:.1}",
                cause,
                self.player.radius()
            );
            return;
        }
        self.status = GameStatus::Over;
        info!("Game over ({}), final score {}", cause, self.player.score);
    }

    /// Steer toward a point in world coordinates.
    pub fn set_pointer(&mut self, world_position: Vec2) {
        self.pointer = world_position;
    }

    /// Steer toward a pointer position given in screen coordinates.
    pub fn set_pointer_screen(&mut self, screen_position: Vec2) {
        self.pointer = self.camera.screen_to_world(screen_position);
    }

    /// Buy or upgrade one of the local player's towers.
    pub fn place_tower(&mut self, kind: TowerKind) -> Result<u32, PurchaseError> {
        if !self.is_running() {
            return Err(PurchaseError::GameOver);
        }
        let level = self.player.purchase_tower(kind)?;
        info!("Bought {} tower, now level {}", kind, level);
        Ok(level)
    }

    /// Price of the next local purchase of `kind`.
    pub fn tower_price(&self, kind: TowerKind) -> u32 {
        self.player.tower_price(kind)
    }

    /// Mirror this game into a relay room. The bot population is matched to
    /// the room size (at least two) and stops refilling.
    pub fn join_room(&mut self, room_id: &str, player_id: &str, peers: usize) {
        self.room = Some(RoomLink {
            room_id: room_id.to_string(),
            player_id: player_id.to_string(),
        });
        self.remotes = RemoteRoster::new(Some(player_id.to_string()));
        self.inbox.clear();
        self.bots.target_count = (1 + peers).max(2);
        self.bots.populate(&mut self.world, self.player.position(), &mut self.rng);
        info!("Joined room {} as {} with {} other players", room_id, player_id, peers);
    }

    /// Drop the relay room and go back to refilling bots locally.
    pub fn leave_room(&mut self) {
        if let Some(room) = self.room.take() {
            info!("Left room {}", room.room_id);
        }
        self.remotes = RemoteRoster::default();
        self.inbox.clear();
        self.bots.target_count = self.config.bot_count;
    }

    /// Queue a room update for the next tick.
    pub fn receive_room_update(&mut self, update: RoomUpdate) {
        self.inbox.push(update);
    }

    fn apply_room_updates(&mut self) {
        if self.inbox.is_empty() {
            return;
        }
        let mut updates = std::mem::take(&mut self.inbox);
        updates.sort_by_key(|u| u.timestamp);
        for update in &updates {
            self.remotes.apply(update, &mut self.world);
        }
    }

    /// The local player's state as published to the relay.
    pub fn local_snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            is_alive: self.is_running() && self.player.is_alive(),
            ..self.player.snapshot()
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.player.score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn room(&self) -> Option<&RoomLink> {
        self.room.as_ref()
    }
}

#[cfg(test)]
mod tests;
