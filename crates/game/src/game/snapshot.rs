//! Read-only view of the whole game for presentation layers.

use super::{Game, GameStatus};
use super::camera::Camera;
use crate::entity::{Entity, EntityId};
use glam::Vec2;
use protocol::{Color, TowerSnapshot};
use serde::Serialize;

/// A plain circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleView {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl CircleView {
    fn of(entity: &dyn Entity) -> Self {
        let body = entity.body();
        Self {
            id: body.id,
            position: body.position,
            radius: body.radius,
            color: body.color,
        }
    }
}

/// A player-like blob with its label and towers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobView {
    #[serde(flatten)]
    pub circle: CircleView,
    pub name: String,
    pub score: u32,
    pub towers: Vec<TowerSnapshot>,
    /// Bot behavior, for the state ring drawn around bots.
    pub state: Option<&'static str>,
    pub difficulty: Option<&'static str>,
}

/// Relay session info shown in the HUD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    pub room_id: String,
    /// Including the local player.
    pub players: usize,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub tick: u64,
    pub status: GameStatus,
    pub world_size: Vec2,
    pub camera: Camera,
    pub player: BlobView,
    pub bots: Vec<BlobView>,
    pub remotes: Vec<BlobView>,
    pub enemies: Vec<CircleView>,
    pub projectiles: Vec<CircleView>,
    pub food: Vec<CircleView>,
    pub score: u32,
    pub room: Option<RoomView>,
}

impl Game {
    /// Capture the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        let player = BlobView {
            circle: CircleView::of(&self.player),
            name: self.player.nickname.clone(),
            score: self.player.score,
            towers: self.player.armory.snapshot(),
            state: None,
            difficulty: None,
        };
        let bots = self
            .bots
            .bots
            .iter()
            .map(|bot| BlobView {
                circle: CircleView::of(&bot.player),
                name: bot.name.clone(),
                score: bot.player.score,
                towers: bot.player.armory.snapshot(),
                state: Some(bot.brain.state.as_str()),
                difficulty: Some(bot.brain.difficulty.as_str()),
            })
            .collect();
        let remotes = self
            .remotes
            .players
            .iter()
            .map(|remote| BlobView {
                circle: CircleView::of(&remote.player),
                name: remote.player.nickname.clone(),
                score: remote.player.score,
                towers: remote.player.armory.snapshot(),
                state: None,
                difficulty: None,
            })
            .collect();

        GameSnapshot {
            tick: self.tick_count,
            status: self.status,
            world_size: Vec2::new(self.world.border.width, self.world.border.height),
            camera: self.camera,
            player,
            bots,
            remotes,
            enemies: self.world.enemies.iter().map(|e| CircleView::of(e)).collect(),
            projectiles: self.world.projectiles.iter().map(|p| CircleView::of(p)).collect(),
            food: self.world.food.iter().map(|f| CircleView::of(f)).collect(),
            score: self.player.score,
            room: self.room.as_ref().map(|room| RoomView {
                room_id: room.room_id.clone(),
                players: 1 + self.remotes.len(),
            }),
        }
    }
}
