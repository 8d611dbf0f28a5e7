//! Game and relay configuration.

use crate::ai::DifficultySetting;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Name of the configuration file read from the working directory.
pub const CONFIG_FILE: &str = "blob-warfare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub bots: BotConfig,
    #[serde(default)]
    pub enemy: EnemyConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from `blob-warfare.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from `path`, writing the defaults there when it
    /// does not exist yet.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Derive the immutable settings handed to the simulation.
    pub fn game_config(&self) -> GameConfig {
        let mobile = self.world.mobile;
        let size = if mobile {
            (self.world.mobile_size, self.world.mobile_size)
        } else {
            (self.world.width, self.world.height)
        };
        GameConfig {
            world_width: size.0,
            world_height: size.1,
            viewport_width: self.world.viewport_width,
            viewport_height: self.world.viewport_height,
            seed: self.world.seed,
            nickname: self.player.nickname.clone(),
            start_radius: self.player.start_radius,
            base_speed: self.player.base_speed,
            bot_count: if mobile { self.bots.mobile_count } else { self.bots.count },
            bot_difficulty: self.bots.difficulty,
            bot_min_spawn_distance: self.bots.min_spawn_distance,
            enemy_spawn_interval_ms: self.enemy.spawn_interval_ms,
            enemy_spawn_floor_ms: self.enemy.spawn_floor_ms,
            enemy_spawn_step_ms: self.enemy.spawn_step_ms,
            food_spawn_interval_ms: self.food.spawn_interval_ms,
            max_food: self.food.max_food,
            eat_threshold: self.combat.eat_threshold,
            tower_targeting: self.combat.tower_targeting,
            grace_period_ms: self.combat.grace_period_ms,
            grace_clearance: self.combat.grace_clearance,
        }
    }
}

/// World geometry and randomness.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_size")]
    pub width: f32,
    #[serde(default = "default_world_size")]
    pub height: f32,
    /// Use the smaller mobile arena and bot population.
    #[serde(default)]
    pub mobile: bool,
    #[serde(default = "default_mobile_size")]
    pub mobile_size: f32,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// RNG seed; 0 seeds from entropy.
    #[serde(default)]
    pub seed: u64,
    /// Host tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_size(),
            height: default_world_size(),
            mobile: false,
            mobile_size: default_mobile_size(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            seed: 0,
            tick_interval_ms: default_tick_interval(),
        }
    }
}

fn default_world_size() -> f32 {
    2000.0
}
fn default_mobile_size() -> f32 {
    1500.0
}
fn default_viewport_width() -> f32 {
    1280.0
}
fn default_viewport_height() -> f32 {
    720.0
}
fn default_tick_interval() -> u64 {
    16
}

/// Local player settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default = "default_start_radius")]
    pub start_radius: f32,
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            start_radius: default_start_radius(),
            base_speed: default_base_speed(),
        }
    }
}

fn default_nickname() -> String {
    "Player".to_string()
}
fn default_start_radius() -> f32 {
    20.0
}
fn default_base_speed() -> f32 {
    2.0
}

/// Bot population.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_count")]
    pub count: usize,
    #[serde(default = "default_mobile_bot_count")]
    pub mobile_count: usize,
    #[serde(default)]
    pub difficulty: DifficultySetting,
    /// Bots never spawn closer than this to the local player.
    #[serde(default = "default_min_spawn_distance")]
    pub min_spawn_distance: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            count: default_bot_count(),
            mobile_count: default_mobile_bot_count(),
            difficulty: DifficultySetting::default(),
            min_spawn_distance: default_min_spawn_distance(),
        }
    }
}

fn default_bot_count() -> usize {
    5
}
fn default_mobile_bot_count() -> usize {
    3
}
fn default_min_spawn_distance() -> f32 {
    500.0
}

/// Enemy spawn pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnemyConfig {
    #[serde(default = "default_enemy_interval")]
    pub spawn_interval_ms: f64,
    #[serde(default = "default_enemy_floor")]
    pub spawn_floor_ms: f64,
    /// Interval reduction applied after every spawn.
    #[serde(default = "default_enemy_step")]
    pub spawn_step_ms: f64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: default_enemy_interval(),
            spawn_floor_ms: default_enemy_floor(),
            spawn_step_ms: default_enemy_step(),
        }
    }
}

fn default_enemy_interval() -> f64 {
    3000.0
}
fn default_enemy_floor() -> f64 {
    1000.0
}
fn default_enemy_step() -> f64 {
    5.0
}

/// Food spawn pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_interval")]
    pub spawn_interval_ms: f64,
    #[serde(default = "default_max_food")]
    pub max_food: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: default_food_interval(),
            max_food: default_max_food(),
        }
    }
}

fn default_food_interval() -> f64 {
    1000.0
}
fn default_max_food() -> usize {
    500
}

/// How towers pick player-like targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetingPolicy {
    /// Only players the owner could eat (`owner r > target r * threshold`).
    #[default]
    SizeGated,
    /// Any player-like entity in range.
    Unrestricted,
}

/// Combat rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CombatConfig {
    #[serde(default = "default_eat_threshold")]
    pub eat_threshold: f32,
    #[serde(default)]
    pub tower_targeting: TargetingPolicy,
    /// Spawn protection in milliseconds; 0 disables it.
    #[serde(default)]
    pub grace_period_ms: f64,
    /// Enemies do not spawn within this distance of a protected player.
    #[serde(default = "default_grace_clearance")]
    pub grace_clearance: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            eat_threshold: default_eat_threshold(),
            tower_targeting: TargetingPolicy::default(),
            grace_period_ms: 0.0,
            grace_clearance: default_grace_clearance(),
        }
    }
}

fn default_eat_threshold() -> f32 {
    crate::collision::EAT_THRESHOLD
}
fn default_grace_clearance() -> f32 {
    300.0
}

/// Client side of the relay connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Room to join; empty lets the relay choose.
    #[serde(default)]
    pub room: String,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_ms: u64,
    #[serde(default = "default_ping_interval")]
    pub ping_interval_ms: u64,
    /// A push and poll round slower than this is abandoned until next cycle.
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: default_relay_url(),
            room: String::new(),
            sync_interval_ms: default_sync_interval(),
            ping_interval_ms: default_ping_interval(),
            sync_timeout_ms: default_sync_timeout(),
        }
    }
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8787/api/game".to_string()
}
fn default_sync_interval() -> u64 {
    100
}
fn default_ping_interval() -> u64 {
    15_000
}
fn default_sync_timeout() -> u64 {
    1_000
}

/// Relay server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_room_capacity")]
    pub room_capacity: usize,
    #[serde(default = "default_room_max_age")]
    pub room_max_age_ms: u64,
    /// Players silent for longer than this are pruned.
    #[serde(default = "default_liveness")]
    pub liveness_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            room_capacity: default_room_capacity(),
            room_max_age_ms: default_room_max_age(),
            liveness_ms: default_liveness(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8787
}
fn default_room_capacity() -> usize {
    10
}
fn default_room_max_age() -> u64 {
    3_600_000
}
fn default_liveness() -> u64 {
    30_000
}

/// Immutable settings the simulation is constructed with.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub seed: u64,
    pub nickname: String,
    pub start_radius: f32,
    pub base_speed: f32,
    pub bot_count: usize,
    pub bot_difficulty: DifficultySetting,
    pub bot_min_spawn_distance: f32,
    pub enemy_spawn_interval_ms: f64,
    pub enemy_spawn_floor_ms: f64,
    pub enemy_spawn_step_ms: f64,
    pub food_spawn_interval_ms: f64,
    pub max_food: usize,
    pub eat_threshold: f32,
    pub tower_targeting: TargetingPolicy,
    pub grace_period_ms: f64,
    pub grace_clearance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Config::default().game_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.world_width, 2000.0);
        assert_eq!(config.bot_count, 5);
        assert_eq!(config.eat_threshold, 1.2);
        assert_eq!(config.tower_targeting, TargetingPolicy::SizeGated);
        assert_eq!(config.grace_period_ms, 0.0);
    }

    #[test]
    fn test_mobile_mode() {
        let mut config = Config::default();
        config.world.mobile = true;
        let game = config.game_config();
        assert_eq!(game.world_width, 1500.0);
        assert_eq!(game.world_height, 1500.0);
        assert_eq!(game.bot_count, 3);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [bots]
            count = 8
            difficulty = "mixed"

            [combat]
            tower_targeting = "unrestricted"
            "#,
        )
        .unwrap();
        assert_eq!(config.bots.count, 8);
        assert_eq!(config.bots.difficulty, DifficultySetting::Mixed);
        assert_eq!(config.combat.tower_targeting, TargetingPolicy::Unrestricted);
        assert_eq!(config.world.width, 2000.0);
        assert_eq!(config.relay.room_capacity, 10);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.network.sync_interval_ms, 100);
        assert_eq!(back.network.ping_interval_ms, 15_000);
        assert_eq!(back.network.sync_timeout_ms, 1_000);
    }
}
