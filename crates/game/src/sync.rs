//! Multiplayer state sync against a relay.
//!
//! The sync client never touches the simulation. It publishes the latest
//! local snapshot, polls the room and hands fresh [`RoomUpdate`]s to the
//! host, which queues them into the game between ticks.

use crate::config::NetworkConfig;
use crate::error::SyncError;
use crate::game::RoomUpdate;
use protocol::{PeerInfo, PlayerSnapshot, Relay, RelayError, RoomConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at, timeout};
use tracing::{debug, info, warn};

/// A joined relay room.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub player_id: String,
    pub room_id: String,
    /// Room members at join time, including ourselves.
    pub peers: Vec<PeerInfo>,
    pub room_config: RoomConfig,
}

impl Session {
    /// Number of other players in the room at join time.
    pub fn other_players(&self) -> usize {
        self.peers.iter().filter(|p| p.id != self.player_id).count()
    }
}

/// Sync cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncIntervals {
    pub sync: Duration,
    pub ping: Duration,
    /// Upper bound on one push and poll round.
    pub timeout: Duration,
}

impl From<&NetworkConfig> for SyncIntervals {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            sync: Duration::from_millis(config.sync_interval_ms.max(1)),
            ping: Duration::from_millis(config.ping_interval_ms.max(1)),
            timeout: Duration::from_millis(config.sync_timeout_ms.max(1)),
        }
    }
}

/// Relay session for one local player.
#[derive(Debug)]
pub struct SyncClient<R> {
    relay: Arc<R>,
    session: Session,
    /// Relay timestamp of the newest room state handed out.
    last_timestamp: Option<u64>,
}

impl<R: Relay> SyncClient<R> {
    /// Register with the relay and join a room. `room` of `None` lets the
    /// relay pick one.
    pub async fn connect(
        relay: Arc<R>,
        nickname: &str,
        bot_count: u32,
        bot_difficulty: &str,
        room: Option<&str>,
    ) -> Result<Self, SyncError> {
        let player_id = relay
            .create_player(nickname, bot_count, bot_difficulty)
            .await
            .map_err(SyncError::relay("createPlayer"))?;
        let joined = relay
            .join_room(&player_id, room)
            .await
            .map_err(SyncError::relay("joinRoom"))?;

        info!(
            "Joined room {} as {} ({} players)",
            joined.room_id,
            player_id,
            joined.players.len()
        );
        Ok(Self {
            relay,
            session: Session {
                player_id,
                room_id: joined.room_id,
                peers: joined.players,
                room_config: joined.game_config,
            },
            last_timestamp: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn ping(&self) -> Result<u64, RelayError> {
        self.relay.ping().await
    }

    /// Publish `snapshot` and poll the room. Returns `None` when the reply is
    /// not newer than the last one handed out.
    pub async fn sync_once(&mut self, snapshot: &PlayerSnapshot) -> Result<Option<RoomUpdate>, RelayError> {
        let session = &self.session;
        self.relay
            .update_player_state(&session.player_id, &session.room_id, snapshot)
            .await?;
        let state = self.relay.get_game_state(&session.room_id).await?;

        if self.last_timestamp.is_some_and(|last| state.timestamp <= last) {
            debug!("Dropping stale room state {}", state.timestamp);
            return Ok(None);
        }
        self.last_timestamp = Some(state.timestamp);
        Ok(Some(RoomUpdate {
            timestamp: state.timestamp,
            peers: state.players,
        }))
    }

    /// Sync until the host hangs up on either channel. Failures and rounds
    /// that overrun the timeout are logged and retried on the next cycle.
    pub async fn run(
        mut self,
        snapshots: watch::Receiver<PlayerSnapshot>,
        updates: mpsc::Sender<RoomUpdate>,
        intervals: SyncIntervals,
    ) {
        let mut sync = interval(intervals.sync);
        sync.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ping = interval_at(Instant::now() + intervals.ping, intervals.ping);
        ping.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = sync.tick() => {
                    if snapshots.has_changed().is_err() || updates.is_closed() {
                        break;
                    }
                    let snapshot = snapshots.borrow().clone();
                    match timeout(intervals.timeout, self.sync_once(&snapshot)).await {
                        Ok(Ok(Some(update))) => {
                            if updates.send(update).await.is_err() {
                                break;
                            }
                        }
                        Ok(Ok(None)) => {}
                        Ok(Err(e)) => warn!("State sync failed: {}", e),
                        Err(_) => warn!("State sync timed out after {:?}", intervals.timeout),
                    }
                }
                _ = ping.tick() => {
                    match self.ping().await {
                        Ok(timestamp) => debug!("Relay alive at {}", timestamp),
                        Err(e) => warn!("Relay ping failed: {}", e),
                    }
                }
            }
        }
        info!("Sync for room {} stopped", self.session.room_id);
    }
}
