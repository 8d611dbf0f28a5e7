//! Network-driven players mirrored from relay snapshots.

use crate::entity::{EntityId, Player, PlayerKind};
use crate::world::World;
use glam::Vec2;
use protocol::{Color, PeerState, PlayerSnapshot};
use tracing::{debug, info};

/// Remotes eaten locally are left alone for this long, so one contact does
/// not pay out again on every tick until their owner reports the death.
pub const EATEN_IMMUNITY_MS: f64 = 3000.0;

/// One poll of the room, ordered by the relay clock.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomUpdate {
    /// Relay clock in milliseconds when the room was read.
    pub timestamp: u64,
    pub peers: Vec<PeerState>,
}

/// Another client's player.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    /// Relay-assigned player id.
    pub relay_id: String,
    pub player: Player,
    /// Liveness as reported by its owner.
    pub alive: bool,
    /// Ignored for local interactions until this timestamp.
    pub immune_until: f64,
}

impl RemotePlayer {
    fn new(relay_id: &str, nickname: &str, id: EntityId, snapshot: &PlayerSnapshot) -> Self {
        let mut player = Player::new(
            id,
            PlayerKind::Remote,
            nickname,
            Vec2::new(snapshot.x, snapshot.y),
            Color::WHITE,
            snapshot.radius,
            0.0,
        );
        player.apply_snapshot(snapshot);
        Self {
            relay_id: relay_id.to_string(),
            player,
            alive: snapshot.is_alive,
            immune_until: 0.0,
        }
    }

    fn apply(&mut self, snapshot: &PlayerSnapshot) {
        self.player.apply_snapshot(snapshot);
        self.alive = snapshot.is_alive;
    }

    /// Whether collisions, targeting and AI should see this remote.
    #[inline]
    pub fn is_active(&self, now: f64) -> bool {
        self.alive && now >= self.immune_until
    }

    /// The last applied snapshot, reproduced field for field.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            is_alive: self.alive,
            ..self.player.snapshot()
        }
    }
}

/// Result of applying a room update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChange {
    pub joined: Vec<String>,
    pub left: Vec<String>,
    pub updated: usize,
}

/// Every remote player in the room, keyed by relay id.
#[derive(Debug, Default)]
pub struct RemoteRoster {
    pub players: Vec<RemotePlayer>,
    /// Our own relay id; never mirrored.
    self_id: Option<String>,
    last_timestamp: Option<u64>,
}

impl RemoteRoster {
    pub fn new(self_id: Option<String>) -> Self {
        Self {
            players: Vec::new(),
            self_id,
            last_timestamp: None,
        }
    }

    pub fn get(&self, relay_id: &str) -> Option<&RemotePlayer> {
        self.players.iter().find(|r| r.relay_id == relay_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether an update with `timestamp` would be applied.
    pub fn is_fresh(&self, timestamp: u64) -> bool {
        self.last_timestamp.is_none_or(|last| timestamp > last)
    }

    /// Merge a room update: peers with a snapshot are added or overwritten,
    /// peers missing from the list are dropped, our own entry is skipped.
    /// Updates not newer than the last applied one return `None`.
    pub fn apply(&mut self, update: &RoomUpdate, world: &mut World) -> Option<RosterChange> {
        if !self.is_fresh(update.timestamp) {
            debug!("Dropping stale room update {}", update.timestamp);
            return None;
        }
        self.last_timestamp = Some(update.timestamp);

        let mut change = RosterChange::default();
        for peer in &update.peers {
            if self.self_id.as_deref() == Some(peer.id.as_str()) {
                continue;
            }
            let Some(state) = &peer.state else {
                continue;
            };
            match self.players.iter_mut().find(|r| r.relay_id == peer.id) {
                Some(remote) => {
                    remote.apply(state);
                    change.updated += 1;
                }
                None => {
                    let id = world.next_id();
                    self.players.push(RemotePlayer::new(&peer.id, &peer.nickname, id, state));
                    info!("Remote player {} joined", peer.nickname);
                    change.joined.push(peer.id.clone());
                }
            }
        }

        self.players.retain(|remote| {
            let present = update.peers.iter().any(|p| p.id == remote.relay_id);
            if !present {
                info!("Remote player {} left", remote.player.nickname);
                change.left.push(remote.relay_id.clone());
            }
            present
        });

        Some(change)
    }
}
