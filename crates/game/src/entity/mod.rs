//! Game entities.
//!
//! Every entity is a positional circle ([`Body`]); the variants compose it
//! with their own state instead of inheriting from each other.

mod body;
mod enemy;
mod food;
mod player;
mod projectile;
mod tower;

pub use body::{Body, Entity, EntityId};
pub use enemy::{ENEMY_DEATH_HEALTH, ENEMY_RADIUS_RANGE, Enemy};
pub use food::{FOOD_RADIUS_RANGE, Food};
pub use player::{DAMAGE_SHRINK, MIN_SPEED, Player, PlayerKind};
pub use projectile::{PROJECTILE_MAX_DISTANCE, PROJECTILE_SPEED, Projectile};
pub use tower::{Armory, MAX_OWNER_RATIO, Tower, TowerSpec};
