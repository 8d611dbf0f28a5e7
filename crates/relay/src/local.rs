//! In-process relay, for single-binary play and tests.

use crate::http::{SharedStore, now_ms};
use crate::store::{RelayStore, RoomPolicy};
use protocol::{GameStateResponse, JoinRoomResponse, PlayerSnapshot, Relay, RelayError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A relay that calls straight into a [`RelayStore`].
#[derive(Debug, Clone, Default)]
pub struct LocalRelay {
    store: SharedStore,
}

impl LocalRelay {
    pub fn new(policy: RoomPolicy) -> Self {
        Self::with_store(Arc::new(Mutex::new(RelayStore::new(policy))))
    }

    /// Share a store that may also be served over HTTP.
    pub fn with_store(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

impl Relay for LocalRelay {
    async fn create_player(&self, nickname: &str, bot_count: u32, bot_difficulty: &str) -> Result<String, RelayError> {
        let reply = self.store.lock().await.create_player(
            Some(nickname.to_string()),
            Some(bot_count),
            Some(bot_difficulty.to_string()),
            now_ms(),
        );
        Ok(reply.player_id)
    }

    async fn join_room(&self, player_id: &str, room_id: Option<&str>) -> Result<JoinRoomResponse, RelayError> {
        self.store.lock().await.join_room(player_id, room_id, now_ms())
    }

    async fn update_player_state(
        &self,
        player_id: &str,
        room_id: &str,
        state: &PlayerSnapshot,
    ) -> Result<(), RelayError> {
        self.store
            .lock()
            .await
            .update_player_state(player_id, room_id, state.clone(), now_ms())
            .map(|_| ())
    }

    async fn get_game_state(&self, room_id: &str) -> Result<GameStateResponse, RelayError> {
        self.store.lock().await.get_game_state(room_id, now_ms())
    }

    async fn ping(&self) -> Result<u64, RelayError> {
        Ok(self.store.lock().await.ping(now_ms()).timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_store() {
        let relay = LocalRelay::default();
        let id = relay.create_player("Ann", 3, "easy").await.unwrap();
        let joined = relay.join_room(&id, None).await.unwrap();

        let other = LocalRelay::with_store(Arc::clone(relay.store()));
        let state = other.get_game_state(&joined.room_id).await.unwrap();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].state, None);
        assert_eq!(other.store().lock().await.room_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let relay = LocalRelay::new(RoomPolicy::default());
        assert_eq!(relay.get_game_state("nope").await, Err(RelayError::RoomNotFound));
    }
}
