//! Client -> relay request parsing.

use super::{Action, PlayerSnapshot};
use crate::RelayError;
use serde::{Deserialize, Serialize};

/// Parsed relay request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RelayRequest {
    /// Keep-alive ping.
    Ping,
    /// Register a player.
    #[serde(rename_all = "camelCase")]
    CreatePlayer {
        #[serde(default)]
        nickname: Option<String>,
        #[serde(default)]
        bot_count: Option<u32>,
        #[serde(default)]
        bot_difficulty: Option<String>,
    },
    /// Join a room; a missing or unknown `room_id` lets the relay pick one.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        player_id: String,
        #[serde(default)]
        room_id: Option<String>,
    },
    /// Publish a snapshot of the caller's player.
    #[serde(rename_all = "camelCase")]
    UpdatePlayerState {
        player_id: String,
        room_id: String,
        player_state: PlayerSnapshot,
    },
    /// Poll the room.
    #[serde(rename_all = "camelCase")]
    GetGameState { room_id: String },
}

impl RelayRequest {
    /// Parse a request from a raw JSON body.
    ///
    /// Malformed JSON and known actions with bad fields become
    /// [`RelayError::InvalidPayload`]; an unrecognised `action` becomes
    /// [`RelayError::UnknownAction`].
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| RelayError::InvalidPayload("Invalid JSON".to_string()))?;

        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .unwrap_or_default()
            .to_string();

        if Action::from_name(&action).is_none() {
            return Err(RelayError::UnknownAction(action));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// The action this request performs.
    pub fn action(&self) -> Action {
        match self {
            RelayRequest::Ping => Action::Ping,
            RelayRequest::CreatePlayer { .. } => Action::CreatePlayer,
            RelayRequest::JoinRoom { .. } => Action::JoinRoom,
            RelayRequest::UpdatePlayerState { .. } => Action::UpdatePlayerState,
            RelayRequest::GetGameState { .. } => Action::GetGameState,
        }
    }
}
