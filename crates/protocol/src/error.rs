//! Relay error types.

use thiserror::Error;

/// Errors that can occur talking to (or inside) the relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Player not found")]
    PlayerNotFound,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Unknown action: {0:?}")]
    UnknownAction(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::InvalidPayload(err.to_string())
    }
}
