//! Relay -> client replies and the snapshot payloads they carry.

use crate::{Color, TowerKind};
use serde::{Deserialize, Serialize};

/// Flattened copy of a player's visible fields, published to the relay and
/// applied wholesale by every other client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub score: u32,
    pub color: Color,
    #[serde(default)]
    pub towers: Vec<TowerSnapshot>,
    pub is_alive: bool,
}

/// A tower as seen by remote clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    #[serde(rename = "type")]
    pub kind: TowerKind,
    pub level: u32,
    pub x: f32,
    pub y: f32,
}

/// Per-room settings handed out on join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    pub world_width: f32,
    pub world_height: f32,
    /// Milliseconds between enemy spawns at game start.
    pub enemy_spawn_rate: f64,
    /// Milliseconds between food spawns.
    pub food_spawn_rate: f64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            world_width: 2000.0,
            world_height: 2000.0,
            enemy_spawn_rate: 3000.0,
            food_spawn_rate: 1000.0,
        }
    }
}

/// A room member as listed on join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub nickname: String,
}

/// A room member together with the last snapshot it published (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerState {
    pub id: String,
    pub nickname: String,
    pub state: Option<PlayerSnapshot>,
}

/// Reply to `ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    /// Relay clock in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Reply to `createPlayer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerResponse {
    pub player_id: String,
    pub message: String,
}

/// Reply to `joinRoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub room_id: String,
    pub players: Vec<PeerInfo>,
    pub game_config: RoomConfig,
}

/// Reply to `updatePlayerState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}

/// Reply to `getGameState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateResponse {
    pub players: Vec<PeerState>,
    /// Relay clock in milliseconds; strictly increases between polls that
    /// observe newer data and orders replies that arrive out of order.
    pub timestamp: u64,
}

/// Error body returned for any failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_names() {
        let snapshot = PlayerSnapshot {
            x: 10.0,
            y: 20.0,
            radius: 21.5,
            score: 140,
            color: Color::new(0x4C, 0xAF, 0x50),
            towers: vec![TowerSnapshot { kind: TowerKind::Fast, level: 2, x: 10.0, y: 50.0 }],
            is_alive: true,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["isAlive"], true);
        assert_eq!(json["color"], "#4caf50");
        assert_eq!(json["towers"][0]["type"], "fast");

        let back: PlayerSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_snapshot_without_towers() {
        let json = r##"{"x":1,"y":2,"radius":20,"score":0,"color":"#ffffff","isAlive":false}"##;
        let snapshot: PlayerSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.towers.is_empty());
        assert!(!snapshot.is_alive);
    }
}
