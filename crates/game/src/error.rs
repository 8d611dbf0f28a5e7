//! Error types of the simulation crate.

use protocol::{RelayError, TowerKind};
use thiserror::Error;

/// A tower purchase that was refused. The buyer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{kind} tower costs {cost}, only {score} available")]
    InsufficientScore { kind: TowerKind, cost: u32, score: u32 },
    #[error("game is over")]
    GameOver,
}

/// Failure while setting up a relay session.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("relay rejected {action}: {source}")]
    Relay {
        action: &'static str,
        #[source]
        source: RelayError,
    },
}

impl SyncError {
    pub(crate) fn relay(action: &'static str) -> impl FnOnce(RelayError) -> Self {
        move |source| SyncError::Relay { action, source }
    }
}
