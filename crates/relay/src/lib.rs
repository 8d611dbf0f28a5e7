//! Blob Warfare relay.
//!
//! A dumb room/snapshot store: players register, join rooms and publish
//! snapshots; everyone polls the room. The relay never simulates anything.

pub mod client;
pub mod http;
pub mod local;
pub mod store;

// Re-export commonly used types
pub use client::HttpRelay;
pub use http::{RELAY_PATH, SharedStore, now_ms, router, serve};
pub use local::LocalRelay;
pub use store::{RelayReply, RelayStore, RoomPolicy};
