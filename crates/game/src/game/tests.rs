use super::*;
use crate::ai::{Bot, BotState, Difficulty};
use crate::config::TargetingPolicy;
use crate::entity::{Enemy, EntityId, Food, Projectile};
use protocol::PeerState;

const CENTER: Vec2 = Vec2::new(1000.0, 1000.0);
/// Well before the first food or enemy spawn.
const EARLY: f64 = 16.0;

fn config() -> GameConfig {
    GameConfig {
        seed: 42,
        bot_count: 0,
        ..GameConfig::default()
    }
}

fn game() -> Game {
    Game::new(config())
}

fn add_bot(game: &mut Game, position: Vec2, radius: f32) -> EntityId {
    let id = game.world.next_id();
    let bot = Bot::new(id, "Alpha", Color::WHITE, position, Difficulty::Medium, radius, 2.0);
    game.bots.bots.push(bot);
    id
}

fn add_enemy(game: &mut Game, position: Vec2, radius: f32) {
    let id = game.world.next_id();
    game.world.enemies.push(Enemy::new(id, position, radius, Color::WHITE));
}

fn snapshot_at(x: f32, y: f32, radius: f32) -> PlayerSnapshot {
    PlayerSnapshot {
        x,
        y,
        radius,
        score: 0,
        color: Color::WHITE,
        towers: Vec::new(),
        is_alive: true,
    }
}

#[test]
fn test_new_game_layout() {
    let game = Game::new(GameConfig {
        seed: 1,
        bot_count: 3,
        ..GameConfig::default()
    });
    assert_eq!(game.player.position(), CENTER);
    assert_eq!(game.player.radius(), 20.0);
    assert_eq!(game.player.body().color, PLAYER_COLOR);
    assert_eq!(game.bots.len(), 3);
    assert!(game.is_running());
    for bot in &game.bots.bots {
        assert!(distance_to_center(bot.player.position()) >= 500.0);
    }
}

fn distance_to_center(p: Vec2) -> f32 {
    crate::math::distance(p, CENTER)
}

#[test]
fn test_food_pickup() {
    let mut game = game();
    let id = game.world.next_id();
    game.world.food.push(Food::new(id, CENTER + Vec2::new(5.0, 0.0), 5, Color::WHITE));

    game.tick(EARLY);

    assert_eq!(game.score(), 5);
    assert!((game.player.radius() - 20.2).abs() < 1e-4);
    assert!(game.world.food.is_empty());
}

#[test]
fn test_purchase_and_upgrade_price() {
    let mut game = game();
    game.player.score = 10;

    assert_eq!(game.place_tower(TowerKind::Basic), Ok(1));
    assert_eq!(game.score(), 0);
    assert_eq!(game.tower_price(TowerKind::Basic), 15);
    assert_eq!(
        game.place_tower(TowerKind::Basic),
        Err(PurchaseError::InsufficientScore {
            kind: TowerKind::Basic,
            cost: 15,
            score: 0
        })
    );
    assert_eq!(game.player.armory.level(TowerKind::Basic), 1);
}

#[test]
fn test_end_game_refused_while_alive() {
    let mut game = game();
    game.end_game("test");
    assert!(game.is_running());

    game.defeat_local("test");
    assert!(game.is_over());
    assert_eq!(game.player.radius(), 0.0);
    assert!(!game.local_snapshot().is_alive);
    assert_eq!(game.place_tower(TowerKind::Basic), Err(PurchaseError::GameOver));

    let ticks = game.tick_count();
    game.tick(EARLY);
    assert_eq!(game.tick_count(), ticks);
}

#[test]
fn test_player_eats_small_enemy() {
    let mut game = game();
    add_enemy(&mut game, CENTER, 15.0);

    game.tick(EARLY);

    assert!(game.world.enemies.is_empty());
    assert_eq!(game.score(), 30);
    assert!((game.player.radius() - 23.0).abs() < 1e-4);
}

#[test]
fn test_large_enemy_ends_game() {
    let mut game = game();
    add_enemy(&mut game, CENTER, 30.0);

    game.tick(EARLY);

    assert!(game.is_over());
    assert!(!game.player.is_alive());
}

#[test]
fn test_grace_period_protects_player() {
    let mut game = Game::new(GameConfig {
        grace_period_ms: 3000.0,
        ..config()
    });
    add_enemy(&mut game, CENTER, 30.0);

    game.tick(100.0);

    assert!(game.is_running());
    assert_eq!(game.player.invulnerable_until, 3100.0);
}

#[test]
fn test_bot_and_equal_enemy_coexist() {
    let mut game = game();
    let spot = Vec2::new(1500.0, 1500.0);
    add_bot(&mut game, spot, 20.0);
    add_enemy(&mut game, spot, 20.0);

    game.tick(EARLY);

    assert_eq!(game.bots.len(), 1);
    assert_eq!(game.world.enemies.len(), 1);
    assert_eq!(game.bots.bots[0].player.radius(), 20.0);
}

#[test]
fn test_bot_eats_player_and_takes_score() {
    let mut game = game();
    game.player.score = 50;
    let id = add_bot(&mut game, CENTER, 30.0);

    game.tick(EARLY);

    assert!(game.is_over());
    let bot = game.bots.get_bot(id).unwrap();
    assert_eq!(bot.player.score, 50);
    assert!((bot.player.radius() - 34.0).abs() < 1e-4);
}

#[test]
fn test_flagged_projectile_does_not_hit() {
    let mut game = game();
    let start = Vec2::new(400.0, 400.0);
    add_enemy(&mut game, start + Vec2::new(5.0, 0.0), 20.0);
    let mut shot = Projectile::new(start, 0.0, 10.0, game.player.id());
    shot.traveled = 298.0;
    game.world.add_projectile(shot);

    game.tick(EARLY);

    assert!(game.world.projectiles.is_empty());
    assert_eq!(game.world.enemies[0].health, 20.0);
}

#[test]
fn test_projectile_damages_enemy_and_credits_owner() {
    let mut game = game();
    let start = Vec2::new(400.0, 400.0);
    add_enemy(&mut game, start + Vec2::new(5.0, 0.0), 12.0);
    game.world
        .add_projectile(Projectile::new(start, 0.0, 10.0, game.player.id()));

    game.tick(EARLY);

    assert!(game.world.enemies.is_empty());
    assert!(game.world.projectiles.is_empty());
    assert_eq!(game.score(), 24);
}

#[test]
fn test_projectile_kills_bot_and_awards_half_its_score() {
    let mut game = game();
    let spot = Vec2::new(400.0, 400.0);
    let id = add_bot(&mut game, spot, 10.5);
    game.bots.get_bot_mut(id).unwrap().player.score = 40;
    game.world
        .add_projectile(Projectile::new(spot - Vec2::new(5.0, 0.0), 0.0, 20.0, game.player.id()));

    game.tick(EARLY);

    assert!(game.bots.get_bot(id).is_none());
    assert!(game.world.projectiles.is_empty());
    assert_eq!(game.score(), 20);
}

#[test]
fn test_projectile_never_hits_its_firer() {
    let mut game = game();
    let spot = Vec2::new(400.0, 400.0);
    let bot = add_bot(&mut game, spot, 20.0);
    game.world.add_projectile(Projectile::new(spot, 0.0, 50.0, bot));
    game.world
        .add_projectile(Projectile::new(CENTER, 0.0, 50.0, game.player.id()));

    game.tick(EARLY);

    assert_eq!(game.bots.get_bot(bot).unwrap().player.radius(), 20.0);
    assert_eq!(game.player.radius(), 20.0);
    assert_eq!(game.world.projectiles.len(), 2);
}

#[test]
fn test_bots_do_not_chase_a_bot_eaten_this_tick() {
    let mut game = game();
    let hunter = Vec2::new(400.0, 400.0);
    add_bot(&mut game, hunter, 40.0);
    let prey = add_bot(&mut game, hunter + Vec2::new(10.0, 0.0), 12.0);
    // Would chase the prey 250 away if it still saw it.
    let late = add_bot(&mut game, hunter + Vec2::new(260.0, 0.0), 20.0);

    game.tick(EARLY);

    assert!(game.bots.get_bot(prey).is_none());
    assert_eq!(game.bots.get_bot(late).unwrap().brain.state, BotState::Wander);
}

fn tower_duel(policy: TargetingPolicy) -> usize {
    let mut game = Game::new(GameConfig {
        tower_targeting: policy,
        ..config()
    });
    game.player.score = 10;
    game.place_tower(TowerKind::Basic).unwrap();
    add_bot(&mut game, CENTER + Vec2::new(130.0, 0.0), 20.0);

    game.tick(1500.0);
    game.world.projectiles.len()
}

#[test]
fn test_unrestricted_targeting_fires_at_equal_bot() {
    assert_eq!(tower_duel(TargetingPolicy::Unrestricted), 1);
    assert_eq!(tower_duel(TargetingPolicy::SizeGated), 0);
}

#[test]
fn test_bots_refilled_offline() {
    let mut game = Game::new(GameConfig {
        bot_count: 2,
        grace_period_ms: 2000.0,
        ..config()
    });
    game.bots.bots[0].player.mark_removed();

    game.tick(500.0);

    assert_eq!(game.bots.len(), 2);
    assert!(game.bots.bots.iter().all(|b| b.player.invulnerable_until == 2500.0));
}

#[test]
fn test_room_stops_refill() {
    let mut game = game();
    game.join_room("room-1", "me", 0);
    assert_eq!(game.bots.target_count, 2);
    assert_eq!(game.bots.len(), 2);

    game.bots.bots[0].player.mark_removed();
    game.tick(EARLY);
    assert_eq!(game.bots.len(), 1);

    game.leave_room();
    assert!(game.room().is_none());
    assert_eq!(game.bots.target_count, 0);
}

#[test]
fn test_room_updates_ordered_and_stale_dropped() {
    let mut game = game();
    game.join_room("room-1", "me", 1);

    let peer = |x: f32| PeerState {
        id: "other".to_string(),
        nickname: "Other".to_string(),
        state: Some(snapshot_at(x, 200.0, 25.0)),
    };
    // Arrive out of order within one tick; the newest wins.
    game.receive_room_update(RoomUpdate { timestamp: 20, peers: vec![peer(300.0)] });
    game.receive_room_update(RoomUpdate { timestamp: 10, peers: vec![peer(250.0)] });
    game.tick(EARLY);

    assert_eq!(game.remotes.len(), 1);
    assert_eq!(game.remotes.get("other").unwrap().player.position(), Vec2::new(300.0, 200.0));

    game.receive_room_update(RoomUpdate { timestamp: 15, peers: Vec::new() });
    game.tick(EARLY + 16.0);
    assert_eq!(game.remotes.len(), 1);

    game.receive_room_update(RoomUpdate { timestamp: 30, peers: Vec::new() });
    game.tick(EARLY + 32.0);
    assert!(game.remotes.is_empty());
}

#[test]
fn test_player_eats_remote_once() {
    let mut game = game();
    game.join_room("room-1", "me", 1);
    game.receive_room_update(RoomUpdate {
        timestamp: 1,
        peers: vec![PeerState {
            id: "other".to_string(),
            nickname: "Other".to_string(),
            state: Some(snapshot_at(1000.0, 1000.0, 12.0)),
        }],
    });

    game.tick(EARLY);
    let radius = game.player.radius();
    assert!((radius - 22.4).abs() < 1e-4);

    game.tick(EARLY + 16.0);
    assert_eq!(game.player.radius(), radius);
}

#[test]
fn test_eating_remote_with_huge_score_saturates() {
    let mut game = game();
    game.player.score = 10;
    game.join_room("room-1", "me", 1);
    let mut state = snapshot_at(1000.0, 1000.0, 12.0);
    state.score = u32::MAX;
    game.receive_room_update(RoomUpdate {
        timestamp: 1,
        peers: vec![PeerState {
            id: "other".to_string(),
            nickname: "Other".to_string(),
            state: Some(state),
        }],
    });

    game.tick(EARLY);

    assert_eq!(game.score(), u32::MAX);
    assert!(game.is_running());
}

#[test]
fn test_restart_resets() {
    let mut game = game();
    game.player.score = 99;
    game.defeat_local("test");

    game.restart();

    assert!(game.is_running());
    assert_eq!(game.score(), 0);
    assert_eq!(game.player.position(), CENTER);
    assert!(game.world.enemies.is_empty());
}

#[test]
fn test_snapshot_view() {
    let mut game = Game::new(GameConfig {
        bot_count: 2,
        ..config()
    });
    game.join_room("room-9", "me", 0);
    let id = game.world.next_id();
    game.world.food.push(Food::new(id, Vec2::new(100.0, 100.0), 4, Color::WHITE));

    let snapshot = game.snapshot();
    assert_eq!(snapshot.status, GameStatus::Running);
    assert_eq!(snapshot.world_size, Vec2::new(2000.0, 2000.0));
    assert_eq!(snapshot.bots.len(), 2);
    assert_eq!(snapshot.food.len(), 1);
    assert_eq!(snapshot.player.name, "Player");
    assert!(snapshot.bots.iter().all(|b| b.state.is_some()));
    assert_eq!(
        snapshot.room,
        Some(RoomView {
            room_id: "room-9".to_string(),
            players: 1
        })
    );
}
