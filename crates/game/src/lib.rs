//! Blob Warfare simulation library.

pub mod ai;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod math;
pub mod sync;
pub mod world;

// Re-export commonly used types
pub use config::{Config, GameConfig};
pub use error::{PurchaseError, SyncError};
pub use game::{Game, GameSnapshot, GameStatus, RoomUpdate};
pub use sync::{Session, SyncClient, SyncIntervals};
