//! Message definitions for the relay protocol.
//!
//! This module contains both client->relay requests and relay->client replies.
//! Every request is a JSON object with an `action` field naming the operation.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Actions understood by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep-alive.
    Ping,
    /// Register a nickname and get a player id.
    CreatePlayer,
    /// Join (or get assigned) a room.
    JoinRoom,
    /// Publish the caller's snapshot.
    UpdatePlayerState,
    /// Poll every snapshot in a room.
    GetGameState,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Ping,
        Action::CreatePlayer,
        Action::JoinRoom,
        Action::UpdatePlayerState,
        Action::GetGameState,
    ];

    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::CreatePlayer => "createPlayer",
            Action::JoinRoom => "joinRoom",
            Action::UpdatePlayerState => "updatePlayerState",
            Action::GetGameState => "getGameState",
        }
    }

    /// Look an action up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }
}
