//! In-memory rooms, players and their last published snapshots.
//!
//! The store is synchronous and takes the current time as a parameter, so it
//! can sit behind any lock or transport and be tested with a fake clock.

use protocol::{
    AckResponse, CreatePlayerResponse, GameStateResponse, JoinRoomResponse, PeerInfo, PeerState,
    PingResponse, PlayerSnapshot, RelayError, RelayRequest, RoomConfig,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Nickname given to players that register without one.
pub const DEFAULT_NICKNAME: &str = "Player";
/// Nickname reported for room members whose record is gone.
const UNKNOWN_NICKNAME: &str = "Unknown";
const DEFAULT_BOT_COUNT: u32 = 3;
const DEFAULT_BOT_DIFFICULTY: &str = "medium";
/// Room ids are the first characters of a v4 uuid.
const ROOM_ID_LEN: usize = 8;

/// Room admission and player liveness rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPolicy {
    /// Rooms at this many members accept no one else.
    pub capacity: usize,
    /// Rooms older than this stop being offered to new players.
    pub max_age_ms: u64,
    /// Members silent for this long are dropped when the room is polled.
    pub liveness_ms: u64,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_age_ms: 3_600_000,
            liveness_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone)]
struct PlayerRecord {
    nickname: String,
    bot_count: u32,
    bot_difficulty: String,
    last_seen: u64,
}

#[derive(Debug, Clone)]
struct Room {
    id: String,
    members: Vec<String>,
    created_at: u64,
    config: RoomConfig,
    states: HashMap<String, PlayerSnapshot>,
}

impl Room {
    fn is_open(&self, policy: &RoomPolicy, now: u64) -> bool {
        self.members.len() < policy.capacity && now.saturating_sub(self.created_at) < policy.max_age_ms
    }
}

/// Successful reply to any action, serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelayReply {
    Ping(PingResponse),
    CreatePlayer(CreatePlayerResponse),
    JoinRoom(JoinRoomResponse),
    Ack(AckResponse),
    GameState(GameStateResponse),
}

/// Every room and player known to the relay.
#[derive(Debug, Default)]
pub struct RelayStore {
    policy: RoomPolicy,
    players: HashMap<String, PlayerRecord>,
    /// Oldest first; new players are offered the oldest open room.
    rooms: Vec<Room>,
    /// Last timestamp handed out.
    clock: u64,
}

impl RelayStore {
    pub fn new(policy: RoomPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Relay clock: follows `now` but never repeats or runs backwards.
    fn stamp(&mut self, now: u64) -> u64 {
        self.clock = now.max(self.clock + 1);
        self.clock
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut Room, RelayError> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(RelayError::RoomNotFound)
    }

    fn nickname(&self, player_id: &str) -> String {
        self.players
            .get(player_id)
            .map_or(UNKNOWN_NICKNAME, |p| p.nickname.as_str())
            .to_string()
    }

    /// Run one parsed request.
    pub fn dispatch(&mut self, request: RelayRequest, now: u64) -> Result<RelayReply, RelayError> {
        match request {
            RelayRequest::Ping => Ok(RelayReply::Ping(self.ping(now))),
            RelayRequest::CreatePlayer {
                nickname,
                bot_count,
                bot_difficulty,
            } => Ok(RelayReply::CreatePlayer(
                self.create_player(nickname, bot_count, bot_difficulty, now),
            )),
            RelayRequest::JoinRoom { player_id, room_id } => self
                .join_room(&player_id, room_id.as_deref(), now)
                .map(RelayReply::JoinRoom),
            RelayRequest::UpdatePlayerState {
                player_id,
                room_id,
                player_state,
            } => self
                .update_player_state(&player_id, &room_id, player_state, now)
                .map(RelayReply::Ack),
            RelayRequest::GetGameState { room_id } => {
                self.get_game_state(&room_id, now).map(RelayReply::GameState)
            }
        }
    }

    pub fn ping(&mut self, now: u64) -> PingResponse {
        PingResponse {
            status: "ok".to_string(),
            timestamp: self.stamp(now),
        }
    }

    /// Register a player. Missing fields fall back to defaults.
    pub fn create_player(
        &mut self,
        nickname: Option<String>,
        bot_count: Option<u32>,
        bot_difficulty: Option<String>,
        now: u64,
    ) -> CreatePlayerResponse {
        let nickname = nickname
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NICKNAME.to_string());
        let player_id = Uuid::new_v4().to_string();
        let record = PlayerRecord {
            nickname: nickname.clone(),
            bot_count: bot_count.filter(|c| *c > 0).unwrap_or(DEFAULT_BOT_COUNT),
            bot_difficulty: bot_difficulty
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_BOT_DIFFICULTY.to_string()),
            last_seen: now,
        };
        debug!(
            "Player {} registered ({} bots, {})",
            player_id, record.bot_count, record.bot_difficulty
        );
        self.players.insert(player_id.clone(), record);
        info!("Player {} ({}) created", nickname, player_id);

        CreatePlayerResponse {
            player_id,
            message: format!("Welcome, {nickname}!"),
        }
    }

    /// Put a player in `room_id`, or in the oldest open room when it is
    /// missing or unknown, creating a room when none is open.
    pub fn join_room(
        &mut self,
        player_id: &str,
        room_id: Option<&str>,
        now: u64,
    ) -> Result<JoinRoomResponse, RelayError> {
        let Some(record) = self.players.get_mut(player_id) else {
            return Err(RelayError::PlayerNotFound);
        };
        record.last_seen = now;
        self.sweep_rooms(now);

        let requested = room_id.and_then(|id| self.rooms.iter().position(|r| r.id == id));
        let index = match requested.or_else(|| self.rooms.iter().position(|r| r.is_open(&self.policy, now))) {
            Some(index) => index,
            None => self.create_room(now),
        };

        let room = &mut self.rooms[index];
        if !room.members.iter().any(|m| m == player_id) {
            room.members.push(player_id.to_string());
        }
        let (id, members, config) = (room.id.clone(), room.members.clone(), room.config);
        info!("Player {} joined room {} ({} members)", player_id, id, members.len());

        Ok(JoinRoomResponse {
            players: members
                .iter()
                .map(|m| PeerInfo {
                    id: m.clone(),
                    nickname: self.nickname(m),
                })
                .collect(),
            room_id: id,
            game_config: config,
        })
    }

    fn create_room(&mut self, now: u64) -> usize {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ROOM_ID_LEN);
        info!("Room {} created", id);
        self.rooms.push(Room {
            id,
            members: Vec::new(),
            created_at: now,
            config: RoomConfig::default(),
            states: HashMap::new(),
        });
        self.rooms.len() - 1
    }

    /// Forget expired rooms nobody is in any more.
    fn sweep_rooms(&mut self, now: u64) {
        let max_age = self.policy.max_age_ms;
        self.rooms.retain(|room| {
            let keep = !room.members.is_empty() || now.saturating_sub(room.created_at) < max_age;
            if !keep {
                debug!("Room {} expired", room.id);
            }
            keep
        });
    }

    /// Store a player's latest snapshot and mark it alive.
    pub fn update_player_state(
        &mut self,
        player_id: &str,
        room_id: &str,
        state: PlayerSnapshot,
        now: u64,
    ) -> Result<AckResponse, RelayError> {
        let Some(record) = self.players.get_mut(player_id) else {
            return Err(RelayError::PlayerNotFound);
        };
        record.last_seen = now;
        let room = self.room_mut(room_id)?;
        room.states.insert(player_id.to_string(), state);
        Ok(AckResponse::ok())
    }

    /// List the room's live members with their snapshots, dropping members
    /// not heard from within the liveness window.
    pub fn get_game_state(&mut self, room_id: &str, now: u64) -> Result<GameStateResponse, RelayError> {
        let liveness = self.policy.liveness_ms;
        let players = &self.players;
        let room = self
            .rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(RelayError::RoomNotFound)?;

        let mut expired = Vec::new();
        room.members.retain(|id| {
            let alive = players
                .get(id)
                .is_some_and(|p| now.saturating_sub(p.last_seen) < liveness);
            if !alive {
                info!("Player {} timed out of room {}", id, room_id);
                expired.push(id.clone());
            }
            alive
        });
        for id in &expired {
            room.states.remove(id);
        }
        let members = room.members.clone();
        let states = &room.states;
        let peers = members
            .iter()
            .map(|id| PeerState {
                id: id.clone(),
                nickname: players
                    .get(id)
                    .map_or(UNKNOWN_NICKNAME, |p| p.nickname.as_str())
                    .to_string(),
                state: states.get(id).cloned(),
            })
            .collect();

        self.forget(&expired);
        Ok(GameStateResponse {
            players: peers,
            timestamp: self.stamp(now),
        })
    }

    /// Drop the records of timed-out players no room lists any more.
    fn forget(&mut self, player_ids: &[String]) {
        for id in player_ids {
            if !self.rooms.iter().any(|r| r.members.contains(id)) && self.players.remove(id).is_some() {
                debug!("Player {} forgotten", id);
            }
        }
    }
}
