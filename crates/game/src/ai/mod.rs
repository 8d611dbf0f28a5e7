//! Bot AI: difficulty tiers, decision making and population management.

mod bot_manager;
mod bot_player;
mod difficulty;

pub use bot_manager::BotManager;
pub use bot_player::{Bot, BotBrain, BotState, MIN_TOWER_SCORE, Sighting, Surroundings};
pub use difficulty::{Difficulty, DifficultyProfile, DifficultySetting, Rule, Stimulus};
