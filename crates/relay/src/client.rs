//! [`Relay`] over HTTP, for hosts talking to a remote `blob-relay`.

use protocol::{
    CreatePlayerResponse, ErrorResponse, GameStateResponse, JoinRoomResponse, PingResponse, PlayerSnapshot,
    Relay, RelayError, RelayRequest,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Requests slower than this count as transport failures.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON-over-HTTP relay client.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
}

fn transport(err: reqwest::Error) -> RelayError {
    RelayError::Transport(err.to_string())
}

/// Map an error reply back to the relay error that produced it.
fn decode_error(status: StatusCode, body: &[u8]) -> RelayError {
    let message = serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| status.to_string());
    match status {
        StatusCode::NOT_FOUND if message == "Room not found" => RelayError::RoomNotFound,
        StatusCode::NOT_FOUND => RelayError::PlayerNotFound,
        StatusCode::BAD_REQUEST if message == "Unknown action" => RelayError::UnknownAction(String::new()),
        StatusCode::BAD_REQUEST => RelayError::InvalidPayload(message),
        _ => RelayError::Transport(message),
    }
}

impl HttpRelay {
    /// `url` is the full endpoint, e.g. `http://127.0.0.1:8787/api/game`.
    pub fn new(url: impl Into<String>) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, request: &RelayRequest) -> Result<T, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        if !status.is_success() {
            return Err(decode_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl Relay for HttpRelay {
    async fn create_player(&self, nickname: &str, bot_count: u32, bot_difficulty: &str) -> Result<String, RelayError> {
        let request = RelayRequest::CreatePlayer {
            nickname: Some(nickname.to_string()),
            bot_count: Some(bot_count),
            bot_difficulty: Some(bot_difficulty.to_string()),
        };
        let reply: CreatePlayerResponse = self.call(&request).await?;
        Ok(reply.player_id)
    }

    async fn join_room(&self, player_id: &str, room_id: Option<&str>) -> Result<JoinRoomResponse, RelayError> {
        let request = RelayRequest::JoinRoom {
            player_id: player_id.to_string(),
            room_id: room_id.map(str::to_string),
        };
        self.call(&request).await
    }

    async fn update_player_state(
        &self,
        player_id: &str,
        room_id: &str,
        state: &PlayerSnapshot,
    ) -> Result<(), RelayError> {
        let request = RelayRequest::UpdatePlayerState {
            player_id: player_id.to_string(),
            room_id: room_id.to_string(),
            player_state: state.clone(),
        };
        let _: serde_json::Value = self.call(&request).await?;
        Ok(())
    }

    async fn get_game_state(&self, room_id: &str) -> Result<GameStateResponse, RelayError> {
        let request = RelayRequest::GetGameState {
            room_id: room_id.to_string(),
        };
        self.call(&request).await
    }

    async fn ping(&self) -> Result<u64, RelayError> {
        let reply: PingResponse = self.call(&RelayRequest::Ping).await?;
        Ok(reply.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RELAY_PATH, SharedStore, router};
    use protocol::Color;

    async fn spawn_relay() -> HttpRelay {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(SharedStore::default())).await.unwrap();
        });
        HttpRelay::new(format!("http://{addr}{RELAY_PATH}")).unwrap()
    }

    #[test]
    fn test_decode_error() {
        let body = br#"{"error":"Room not found"}"#;
        assert_eq!(decode_error(StatusCode::NOT_FOUND, body), RelayError::RoomNotFound);
        let body = br#"{"error":"Player not found"}"#;
        assert_eq!(decode_error(StatusCode::NOT_FOUND, body), RelayError::PlayerNotFound);
        let body = br#"{"error":"Invalid JSON"}"#;
        assert_eq!(
            decode_error(StatusCode::BAD_REQUEST, body),
            RelayError::InvalidPayload("Invalid JSON".to_string())
        );
        assert!(matches!(
            decode_error(StatusCode::BAD_GATEWAY, b"<html>"),
            RelayError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn test_round_trip_over_http() {
        let relay = spawn_relay().await;
        let id = relay.create_player("Ann", 5, "hard").await.unwrap();
        let joined = relay.join_room(&id, None).await.unwrap();
        assert_eq!(joined.players[0].nickname, "Ann");

        let snapshot = PlayerSnapshot {
            x: 12.5,
            y: 40.0,
            radius: 21.0,
            score: 7,
            color: Color::from_rgb(0x4CAF50),
            towers: Vec::new(),
            is_alive: true,
        };
        relay.update_player_state(&id, &joined.room_id, &snapshot).await.unwrap();
        let state = relay.get_game_state(&joined.room_id).await.unwrap();
        assert_eq!(state.players[0].state, Some(snapshot));
        assert!(relay.ping().await.unwrap() > state.timestamp);

        assert_eq!(relay.get_game_state("nope").await, Err(RelayError::RoomNotFound));
    }
}
