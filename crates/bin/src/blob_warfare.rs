//! Blob Warfare - headless game host.
//!
//! Runs the simulation on a fixed tick with the local blob steered by the bot
//! AI, optionally mirrored into a relay room. Game over restarts the round.

use game::ai::{BotBrain, Difficulty, MIN_TOWER_SCORE};
use game::config::Config;
use game::entity::Entity;
use game::{Game, RoomUpdate, SyncClient, SyncIntervals};
use protocol::PlayerSnapshot;
use rand::SeedableRng;
use rand::rngs::StdRng;
use relay::HttpRelay;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Room updates buffered between ticks.
const UPDATE_QUEUE: usize = 16;

/// Drives the local player the way a bot would.
struct Autopilot {
    brain: BotBrain,
    rng: StdRng,
}

impl Autopilot {
    fn new(game: &Game) -> Self {
        Self {
            brain: BotBrain::new(Difficulty::Medium, game.player.position()),
            rng: StdRng::from_os_rng(),
        }
    }

    fn steer(&mut self, game: &mut Game, now: f64) {
        let seen = game.sightings(now);
        {
            let view = game.surroundings(&seen);
            self.brain.think(&game.player, &view, &game.world.border, &mut self.rng);
        }
        game.set_pointer(self.brain.target);

        if game.score() < MIN_TOWER_SCORE
            || now - self.brain.last_tower_placement <= self.brain.profile().tower_cooldown_ms
        {
            return;
        }
        self.brain.last_tower_placement = now;
        if let Some(kind) = self.brain.choose_tower(&game.player, &mut self.rng) {
            if let Err(e) = game.place_tower(kind) {
                debug!("Autopilot purchase refused: {}", e);
            }
        }
    }
}

/// Connect to the relay, or explain why we are playing alone.
async fn connect(config: &Config) -> Option<SyncClient<HttpRelay>> {
    if !config.network.enabled {
        return None;
    }
    let relay = match HttpRelay::new(config.network.relay_url.clone()) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            warn!("Relay client unavailable ({}), playing single player", e);
            return None;
        }
    };
    let room = Some(config.network.room.as_str()).filter(|r| !r.is_empty());
    let bot_count = u32::try_from(config.bots.count).unwrap_or(u32::MAX);
    match SyncClient::connect(
        relay,
        &config.player.nickname,
        bot_count,
        config.bots.difficulty.as_str(),
        room,
    )
    .await
    {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("{}, playing single player", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,game=debug")),
        )
        .init();

    info!("Blob Warfare v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    let game_config = config.game_config();
    info!("Loaded configuration");
    info!("  World: {}x{}", game_config.world_width, game_config.world_height);
    info!("  Bots: {} ({})", game_config.bot_count, game_config.bot_difficulty.as_str());
    info!("  Relay: {}", if config.network.enabled { config.network.relay_url.as_str() } else { "off" });

    let mut game = Game::new(game_config);
    let mut pilot = Autopilot::new(&game);

    let (snapshot_tx, snapshot_rx) = watch::channel::<PlayerSnapshot>(game.local_snapshot());
    let (update_tx, mut update_rx) = mpsc::channel::<RoomUpdate>(UPDATE_QUEUE);
    if let Some(client) = connect(&config).await {
        let session = client.session();
        game.join_room(&session.room_id, &session.player_id, session.other_players());
        let intervals = SyncIntervals::from(&config.network);
        tokio::spawn(client.run(snapshot_rx, update_tx, intervals));
    }

    let tick_interval = Duration::from_millis(config.world.tick_interval_ms.max(1));
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let start = Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Shutting down with score {}", game.score());
                break;
            }
        }
        let now = start.elapsed().as_secs_f64() * 1000.0;

        while let Ok(update) = update_rx.try_recv() {
            game.receive_room_update(update);
        }
        pilot.steer(&mut game, now);
        game.tick(now);
        snapshot_tx.send_replace(game.local_snapshot());

        if game.is_over() {
            info!("Round finished after {} ticks, score {}", game.tick_count(), game.score());
            game.restart();
            pilot = Autopilot::new(&game);
        }
    }

    Ok(())
}
