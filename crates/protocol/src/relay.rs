//! The relay contract as seen by a client.

use crate::{GameStateResponse, JoinRoomResponse, PlayerSnapshot, RelayError};
use std::future::Future;

/// A request/reply relay: dumb storage for room membership and snapshots.
///
/// Every call is independent; there is no streaming and no push, so clients
/// poll `get_game_state` on their own cadence.
pub trait Relay: Send + Sync {
    /// Register a player and return its id.
    fn create_player(
        &self,
        nickname: &str,
        bot_count: u32,
        bot_difficulty: &str,
    ) -> impl Future<Output = Result<String, RelayError>> + Send;

    /// Join `room_id`, or let the relay pick an open room when it is `None`
    /// or no longer exists.
    fn join_room(
        &self,
        player_id: &str,
        room_id: Option<&str>,
    ) -> impl Future<Output = Result<JoinRoomResponse, RelayError>> + Send;

    /// Publish the caller's latest snapshot.
    fn update_player_state(
        &self,
        player_id: &str,
        room_id: &str,
        state: &PlayerSnapshot,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Fetch every member of the room with its last snapshot.
    fn get_game_state(
        &self,
        room_id: &str,
    ) -> impl Future<Output = Result<GameStateResponse, RelayError>> + Send;

    /// Keep-alive; returns the relay clock.
    fn ping(&self) -> impl Future<Output = Result<u64, RelayError>> + Send;
}
