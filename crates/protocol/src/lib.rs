//! Shared protocol crate for Blob Warfare.
//!
//! This crate contains:
//! - Relay request/response messages (JSON, `action`-tagged)
//! - Player snapshots exchanged through the relay
//! - Shared types (Color, TowerKind)
//! - The [`Relay`] contract consumed by the multiplayer sync client

mod color;
mod error;
pub mod packets;
mod relay;

pub use color::Color;
pub use error::RelayError;
pub use packets::*;
pub use relay::Relay;

use serde::{Deserialize, Serialize};

/// The three tower variants a player can own (at most one of each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    Basic,
    Fast,
    Heavy,
}

impl TowerKind {
    /// All kinds, cheapest first.
    pub const ALL: [TowerKind; 3] = [TowerKind::Basic, TowerKind::Fast, TowerKind::Heavy];

    /// Lowercase name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            TowerKind::Basic => "basic",
            TowerKind::Fast => "fast",
            TowerKind::Heavy => "heavy",
        }
    }

    /// Dense index, used for per-kind level tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            TowerKind::Basic => 0,
            TowerKind::Fast => 1,
            TowerKind::Heavy => 2,
        }
    }
}

impl std::fmt::Display for TowerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TowerKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(TowerKind::Basic),
            "fast" => Ok(TowerKind::Fast),
            "heavy" => Ok(TowerKind::Heavy),
            other => Err(RelayError::InvalidPayload(format!("unknown tower type {other:?}"))),
        }
    }
}
