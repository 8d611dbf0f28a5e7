//! AI-driven bot players.
//!
//! A bot is a [`Player`] plus a [`BotBrain`]. The brain re-evaluates its
//! surroundings only when its decision countdown runs out; movement toward
//! the chosen target happens every tick.

use super::difficulty::{Difficulty, DifficultyProfile, Stimulus};
use crate::entity::{Enemy, Entity, EntityId, Food, Player, PlayerKind, TowerSpec};
use crate::math::{self, angle, angle_to_vector, distance};
use crate::world::{WorldBorder, random_int};
use glam::Vec2;
use protocol::{Color, TowerKind};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

/// Bots never buy towers below this score.
pub const MIN_TOWER_SCORE: u32 = 10;

/// Discrete behavior of a bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BotState {
    #[default]
    Wander,
    Chase,
    Flee,
}

impl BotState {
    pub fn as_str(self) -> &'static str {
        match self {
            BotState::Wander => "wander",
            BotState::Chase => "chase",
            BotState::Flee => "flee",
        }
    }
}

/// A player-like blob as perceived by AI and tower targeting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub id: EntityId,
    pub kind: PlayerKind,
    pub position: Vec2,
    pub radius: f32,
}

impl Sighting {
    pub fn of(player: &Player) -> Self {
        Self {
            id: player.id(),
            kind: player.kind,
            position: player.position(),
            radius: player.radius(),
        }
    }
}

/// Everything a bot can see when it decides.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub food: &'a [Food],
    pub enemies: &'a [Enemy],
    /// Live player-like blobs, possibly including the observer itself.
    pub players: &'a [Sighting],
}

/// Nearest candidate of one kind found during a decision.
type Nearest = Option<(Vec2, f32)>;

fn closer(best: Nearest, position: Vec2, dist: f32, limit: f32) -> Nearest {
    let bound = best.map_or(limit, |(_, d)| d);
    if dist < bound { Some((position, dist)) } else { best }
}

/// Nearest food, prey and threats within the profile's ranges.
#[derive(Debug, Clone, Copy, Default)]
struct Perception {
    food: Nearest,
    prey_enemy: Nearest,
    threat_enemy: Nearest,
    prey_player: Nearest,
    threat_player: Nearest,
}

impl Perception {
    fn gather(me: &Player, view: &Surroundings<'_>, profile: &DifficultyProfile) -> Self {
        let here = me.position();
        let r = me.radius();
        let mut seen = Perception::default();

        for food in view.food.iter().filter(|f| !f.is_removed()) {
            let d = distance(here, food.position());
            seen.food = closer(seen.food, food.position(), d, profile.food_range);
        }

        for enemy in view.enemies.iter().filter(|e| !e.is_removed()) {
            let d = distance(here, enemy.position());
            if r > enemy.radius() * profile.size_advantage {
                seen.prey_enemy = closer(seen.prey_enemy, enemy.position(), d, profile.prey_range);
            }
            if r <= enemy.radius() * profile.size_disadvantage {
                seen.threat_enemy = closer(seen.threat_enemy, enemy.position(), d, profile.threat_range);
            }
        }

        for other in view.players.iter().filter(|p| p.id != me.id()) {
            let d = distance(here, other.position);
            if r > other.radius * profile.size_advantage {
                seen.prey_player = closer(seen.prey_player, other.position, d, profile.prey_range);
            }
            if r <= other.radius * profile.size_disadvantage {
                seen.threat_player = closer(seen.threat_player, other.position, d, profile.threat_range);
            }
        }

        seen
    }

    fn get(&self, stimulus: Stimulus) -> Nearest {
        match stimulus {
            Stimulus::FleeEnemy => self.threat_enemy,
            Stimulus::FleePlayer => self.threat_player,
            Stimulus::ChasePlayer => self.prey_player,
            Stimulus::ChaseEnemy => self.prey_enemy,
            Stimulus::ChaseFood => self.food,
        }
    }
}

/// Decision state of a bot.
#[derive(Debug, Clone)]
pub struct BotBrain {
    pub difficulty: Difficulty,
    pub state: BotState,
    /// Current movement goal.
    pub target: Vec2,
    /// Ticks until the next decision.
    pub decision_countdown: i32,
    /// Milliseconds timestamp of the last tower placement attempt.
    pub last_tower_placement: f64,
}

impl BotBrain {
    pub fn new(difficulty: Difficulty, start: Vec2) -> Self {
        Self {
            difficulty,
            state: BotState::Wander,
            target: start,
            decision_countdown: 0,
            last_tower_placement: 0.0,
        }
    }

    #[inline]
    pub fn profile(&self) -> &'static DifficultyProfile {
        self.difficulty.profile()
    }

    /// Count down and decide when due. Returns true when a decision was made.
    pub fn think<R: Rng>(
        &mut self,
        me: &Player,
        view: &Surroundings<'_>,
        border: &WorldBorder,
        rng: &mut R,
    ) -> bool {
        self.decision_countdown -= 1;
        if self.decision_countdown > 0 {
            return false;
        }
        self.decide(me, view, border, rng);
        let (lo, hi) = self.profile().decision_ticks;
        self.decision_countdown = rng.random_range(lo..=hi);
        true
    }

    /// Pick a state and target from the difficulty's priority table.
    pub fn decide<R: Rng>(
        &mut self,
        me: &Player,
        view: &Surroundings<'_>,
        border: &WorldBorder,
        rng: &mut R,
    ) {
        let profile = self.profile();
        let seen = Perception::gather(me, view, profile);

        let choice = profile.priorities.iter().find_map(|rule| {
            seen.get(rule.stimulus)
                .filter(|(_, d)| *d < rule.within)
                .map(|(position, _)| (rule.stimulus, position))
        });

        match choice {
            Some((Stimulus::FleeEnemy | Stimulus::FleePlayer, threat)) => self.flee_from(me, threat),
            Some((_, prey)) => self.chase(prey),
            None => self.wander(me, border, rng),
        }
    }

    fn flee_from(&mut self, me: &Player, threat: Vec2) {
        self.state = BotState::Flee;
        let away = angle(threat, me.position());
        self.target = me.position() + angle_to_vector(away) * self.profile().flee_distance;
    }

    fn chase(&mut self, target: Vec2) {
        self.state = BotState::Chase;
        self.target = target;
    }

    fn wander<R: Rng>(&mut self, me: &Player, border: &WorldBorder, rng: &mut R) {
        self.state = BotState::Wander;
        let reach = self.profile().wander_distance;
        let here = me.position();
        let r = me.radius();
        self.target = Vec2::new(
            math::clamp(here.x + random_int(rng, -reach, reach), border.min_x + r, border.max_x - r),
            math::clamp(here.y + random_int(rng, -reach, reach), border.min_y + r, border.max_y - r),
        );
    }

    /// Which tower kind to buy next, if any is affordable.
    pub fn choose_tower<R: Rng>(&self, me: &Player, rng: &mut R) -> Option<TowerKind> {
        let available: Vec<TowerKind> = TowerKind::ALL
            .into_iter()
            .filter(|kind| me.score >= TowerSpec::of(*kind).cost)
            .collect();

        match self.difficulty {
            Difficulty::Easy => available.first().copied(),
            Difficulty::Medium => available.choose(rng).copied(),
            Difficulty::Hard => {
                if available.is_empty() {
                    None
                } else if me.armory.is_empty() {
                    Some(TowerKind::Basic)
                } else if me.score > 100 && available.contains(&TowerKind::Heavy) {
                    Some(TowerKind::Heavy)
                } else if available.contains(&TowerKind::Fast) {
                    Some(TowerKind::Fast)
                } else {
                    available.last().copied()
                }
            }
        }
    }

    /// Spend score on a tower when the placement cooldown allows it.
    pub fn maybe_place_tower<R: Rng>(&mut self, me: &mut Player, now: f64, rng: &mut R) -> Option<TowerKind> {
        if now - self.last_tower_placement <= self.profile().tower_cooldown_ms || me.score < MIN_TOWER_SCORE {
            return None;
        }
        self.last_tower_placement = now;

        let kind = self.choose_tower(me, rng)?;
        let price = me.tower_price(kind);
        let owned = me.armory.level(kind) > 0;
        // Hard bots keep a reserve before upgrading.
        if owned && self.difficulty == Difficulty::Hard && me.score < price * 2 {
            return None;
        }
        me.purchase_tower(kind).ok().map(|_| kind)
    }
}

/// A bot player controlled by AI.
#[derive(Debug, Clone)]
pub struct Bot {
    pub player: Player,
    pub name: String,
    pub brain: BotBrain,
}

impl Bot {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        color: Color,
        position: Vec2,
        difficulty: Difficulty,
        start_radius: f32,
        base_speed: f32,
    ) -> Self {
        let name = name.into();
        Self {
            player: Player::new(id, PlayerKind::Bot, name.clone(), position, color, start_radius, base_speed),
            name,
            brain: BotBrain::new(difficulty, position),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.player.id()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.player.is_removed()
    }

    /// Think, move toward the current target and maybe buy a tower.
    pub fn update<R: Rng>(&mut self, view: &Surroundings<'_>, border: &WorldBorder, now: f64, rng: &mut R) {
        if self.brain.think(&self.player, view, border, rng) {
            debug!(
                "Bot {} ({}) -> {} at ({:.0}, {:.0})",
                self.name,
                self.brain.difficulty,
                self.brain.state.as_str(),
                self.brain.target.x,
                self.brain.target.y
            );
        }
        self.player.update(self.brain.target, border);
        if let Some(kind) = self.brain.maybe_place_tower(&mut self.player, now, rng) {
            debug!("Bot {} bought {} tower (level {})", self.name, kind, self.player.armory.level(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bot(difficulty: Difficulty, radius: f32) -> Bot {
        let mut bot = Bot::new(1, "Alpha", Color::WHITE, Vec2::new(1000.0, 1000.0), difficulty, 20.0, 2.0);
        bot.player.body_mut().radius = radius;
        bot
    }

    fn enemy(id: EntityId, x: f32, y: f32, radius: f32) -> Enemy {
        Enemy::new(id, Vec2::new(x, y), radius, Color::WHITE)
    }

    fn food(id: EntityId, x: f32, y: f32) -> Food {
        Food::new(id, Vec2::new(x, y), 5, Color::WHITE)
    }

    fn border() -> WorldBorder {
        WorldBorder::new(2000.0, 2000.0)
    }

    #[test]
    fn test_easy_flees_large_enemy() {
        let mut b = bot(Difficulty::Easy, 20.0);
        let enemies = [enemy(2, 1100.0, 1000.0, 30.0)];
        let foods = [food(3, 1050.0, 1000.0)];
        let view = Surroundings { food: &foods, enemies: &enemies, players: &[] };
        let mut rng = StdRng::seed_from_u64(1);

        b.brain.decide(&b.player, &view, &border(), &mut rng);
        assert_eq!(b.brain.state, BotState::Flee);
        assert!((b.brain.target - Vec2::new(750.0, 1000.0)).length() < 1e-3);
    }

    #[test]
    fn test_easy_prefers_food_over_prey() {
        let mut b = bot(Difficulty::Easy, 40.0);
        let enemies = [enemy(2, 1100.0, 1000.0, 15.0)];
        let foods = [food(3, 1000.0, 1250.0)];
        let view = Surroundings { food: &foods, enemies: &enemies, players: &[] };
        let mut rng = StdRng::seed_from_u64(1);

        b.brain.decide(&b.player, &view, &border(), &mut rng);
        assert_eq!(b.brain.state, BotState::Chase);
        assert_eq!(b.brain.target, Vec2::new(1000.0, 1250.0));
    }

    #[test]
    fn test_hard_hunts_players_first() {
        let mut b = bot(Difficulty::Hard, 40.0);
        let enemies = [enemy(2, 1050.0, 1000.0, 45.0)];
        let players = [
            Sighting { id: 1, kind: PlayerKind::Bot, position: Vec2::new(1000.0, 1000.0), radius: 40.0 },
            Sighting { id: 9, kind: PlayerKind::Local, position: Vec2::new(1300.0, 1000.0), radius: 20.0 },
        ];
        let view = Surroundings { food: &[], enemies: &enemies, players: &players };
        let mut rng = StdRng::seed_from_u64(1);

        b.brain.decide(&b.player, &view, &border(), &mut rng);
        assert_eq!(b.brain.state, BotState::Chase);
        assert_eq!(b.brain.target, Vec2::new(1300.0, 1000.0));
    }

    #[test]
    fn test_ignores_self_and_removed() {
        let mut b = bot(Difficulty::Medium, 20.0);
        let mut gone = enemy(2, 1010.0, 1000.0, 40.0);
        gone.mark_removed();
        let enemies = [gone];
        let players = [Sighting { id: 1, kind: PlayerKind::Bot, position: Vec2::new(1000.0, 1000.0), radius: 40.0 }];
        let view = Surroundings { food: &[], enemies: &enemies, players: &players };
        let mut rng = StdRng::seed_from_u64(1);

        b.brain.decide(&b.player, &view, &border(), &mut rng);
        assert_eq!(b.brain.state, BotState::Wander);
    }

    #[test]
    fn test_wander_stays_in_bounds() {
        let mut b = bot(Difficulty::Hard, 20.0);
        b.player.body_mut().position = Vec2::new(25.0, 1990.0);
        let view = Surroundings { food: &[], enemies: &[], players: &[] };
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            b.brain.decide(&b.player, &view, &border(), &mut rng);
            let t = b.brain.target;
            assert!(t.x >= 20.0 && t.x <= 1980.0);
            assert!(t.y >= 20.0 && t.y <= 1980.0);
        }
    }

    #[test]
    fn test_decision_cadence() {
        let mut b = bot(Difficulty::Hard, 20.0);
        let view = Surroundings { food: &[], enemies: &[], players: &[] };
        let mut rng = StdRng::seed_from_u64(5);

        assert!(b.brain.think(&b.player, &view, &border(), &mut rng));
        let countdown = b.brain.decision_countdown;
        assert!((15..=30).contains(&countdown));
        for _ in 1..countdown {
            assert!(!b.brain.think(&b.player, &view, &border(), &mut rng));
        }
        assert!(b.brain.think(&b.player, &view, &border(), &mut rng));
    }

    #[test]
    fn test_easy_buys_cheapest() {
        let mut b = bot(Difficulty::Easy, 20.0);
        b.player.score = 60;
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 6000.0, &mut rng), Some(TowerKind::Basic));
        assert_eq!(b.player.score, 50);
        // Cooldown not elapsed.
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 7000.0, &mut rng), None);
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 11001.0, &mut rng), Some(TowerKind::Basic));
        assert_eq!(b.player.armory.level(TowerKind::Basic), 2);
        assert_eq!(b.player.score, 35);
    }

    #[test]
    fn test_hard_strategy() {
        let mut b = bot(Difficulty::Hard, 20.0);
        let mut rng = StdRng::seed_from_u64(1);

        b.player.score = 120;
        assert_eq!(b.brain.choose_tower(&b.player, &mut rng), Some(TowerKind::Basic));
        b.player.purchase_tower(TowerKind::Basic).unwrap();
        assert_eq!(b.player.score, 110);
        assert_eq!(b.brain.choose_tower(&b.player, &mut rng), Some(TowerKind::Heavy));

        b.player.score = 30;
        assert_eq!(b.brain.choose_tower(&b.player, &mut rng), Some(TowerKind::Fast));
        b.player.score = 12;
        assert_eq!(b.brain.choose_tower(&b.player, &mut rng), Some(TowerKind::Basic));
    }

    #[test]
    fn test_hard_saves_before_upgrading() {
        let mut b = bot(Difficulty::Hard, 20.0);
        let mut rng = StdRng::seed_from_u64(1);
        b.player.score = 10;
        b.player.purchase_tower(TowerKind::Basic).unwrap();

        // Basic upgrade costs 15; hard wants 30 in the bank.
        b.player.score = 20;
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 5000.0, &mut rng), None);
        assert_eq!(b.player.score, 20);
        assert_eq!(b.brain.last_tower_placement, 5000.0);

        b.player.score = 24;
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 7000.0, &mut rng), None);
        b.player.score = 30;
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 9000.0, &mut rng), Some(TowerKind::Fast));
        assert_eq!(b.player.score, 5);

        // Fast upgrade costs 37.
        b.player.score = 73;
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 11000.0, &mut rng), None);
        b.player.score = 74;
        assert_eq!(b.brain.maybe_place_tower(&mut b.player, 13000.0, &mut rng), Some(TowerKind::Fast));
        assert_eq!(b.player.score, 37);
        assert_eq!(b.player.armory.level(TowerKind::Fast), 2);
    }

    #[test]
    fn test_medium_picks_affordable() {
        let b = bot(Difficulty::Medium, 20.0);
        let mut p = b.player.clone();
        p.score = 30;
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let kind = b.brain.choose_tower(&p, &mut rng).unwrap();
            assert_ne!(kind, TowerKind::Heavy);
        }
        p.score = 5;
        assert_eq!(b.brain.choose_tower(&p, &mut rng), None);
    }
}
