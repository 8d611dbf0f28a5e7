//! Tower target acquisition, firing and projectile resolution.

use super::Game;
use crate::ai::Sighting;
use crate::collision::kill_award;
use crate::config::TargetingPolicy;
use crate::entity::{Armory, Enemy, Entity, EntityId, PlayerKind, Projectile};
use crate::math::distance;
use glam::Vec2;
use tracing::debug;

/// What towers may shoot at during one phase.
#[derive(Debug, Clone, Copy)]
pub struct Targeting<'a> {
    pub enemies: &'a [Enemy],
    /// Targetable player-like blobs; owners are filtered out per shot.
    pub players: &'a [Sighting],
    pub policy: TargetingPolicy,
    /// Connected to a relay: human-owned towers leave other humans alone.
    pub networked: bool,
    pub eat_threshold: f32,
}

impl Targeting<'_> {
    /// Nearest enemy in range, else the nearest eligible player-like blob.
    pub fn find_target(&self, from: Vec2, range: f32, owner: &Sighting) -> Option<Vec2> {
        let mut best: Option<(Vec2, f32)> = None;
        for enemy in self.enemies.iter().filter(|e| !e.is_removed()) {
            let d = distance(from, enemy.position());
            if d < best.map_or(range, |(_, b)| b) {
                best = Some((enemy.position(), d));
            }
        }
        if let Some((position, _)) = best {
            return Some(position);
        }

        for other in self.players {
            if other.id == owner.id {
                continue;
            }
            if self.networked && owner.kind != PlayerKind::Bot && other.kind != PlayerKind::Bot {
                continue;
            }
            if self.policy == TargetingPolicy::SizeGated && owner.radius <= other.radius * self.eat_threshold {
                continue;
            }
            let d = distance(from, other.position);
            if d < best.map_or(range, |(_, b)| b) {
                best = Some((other.position, d));
            }
        }
        best.map(|(position, _)| position)
    }
}

/// Fire every ready tower of `owner` that has a target.
pub fn fire_towers(
    armory: &mut Armory,
    owner: &Sighting,
    now: f64,
    targeting: &Targeting<'_>,
    out: &mut Vec<Projectile>,
) {
    for tower in armory.towers_mut() {
        if !tower.can_fire(now) {
            continue;
        }
        if let Some(target) = targeting.find_target(tower.position, tower.spec().range, owner) {
            out.push(tower.fire(now, target, owner.id));
        }
    }
}

impl Game {
    /// Player-like blobs towers may aim at right now.
    pub(super) fn tower_targets(&self, now: f64) -> Vec<Sighting> {
        let mut targets = Vec::with_capacity(1 + self.bots.len() + self.remotes.len());
        if self.is_running() && !self.player.is_invulnerable(now) {
            targets.push(Sighting::of(&self.player));
        }
        targets.extend(
            self.bots
                .bots
                .iter()
                .filter(|b| !b.is_removed() && !b.player.is_invulnerable(now))
                .map(|b| Sighting::of(&b.player)),
        );
        targets.extend(
            self.remotes
                .players
                .iter()
                .filter(|r| r.is_active(now))
                .map(|r| Sighting::of(&r.player)),
        );
        targets
    }

    /// Phase 9: the local player's towers.
    pub(super) fn fire_player_towers(&mut self, now: f64) {
        if !self.is_running() || self.player.armory.is_empty() {
            return;
        }
        let targets = self.tower_targets(now);
        let owner = Sighting::of(&self.player);
        let mut shots = Vec::new();
        {
            let targeting = Targeting {
                enemies: &self.world.enemies,
                players: &targets,
                policy: self.config.tower_targeting,
                networked: self.room.is_some(),
                eat_threshold: self.config.eat_threshold,
            };
            fire_towers(&mut self.player.armory, &owner, now, &targeting, &mut shots);
        }
        self.launch(shots);
    }

    /// Hand fired projectiles to the world.
    pub(super) fn launch(&mut self, shots: Vec<Projectile>) {
        for shot in shots {
            self.world.add_projectile(shot);
        }
    }

    /// Phase 7: move projectiles and apply at most one hit each.
    pub(super) fn update_projectiles(&mut self, now: f64) {
        let running = self.is_running();
        let mut awards: Vec<(EntityId, u32)> = Vec::new();
        let mut local_killed = false;

        for projectile in self.world.projectiles.iter_mut() {
            if projectile.is_removed() {
                continue;
            }
            projectile.update();
            if projectile.is_removed() {
                continue;
            }

            if let Some(enemy) = self
                .world
                .enemies
                .iter_mut()
                .find(|e| !e.is_removed() && projectile.overlaps(&**e))
            {
                if let Some(value) = enemy.take_damage(projectile.damage) {
                    awards.push((projectile.owner, value));
                }
                projectile.mark_removed();
                continue;
            }

            let owner = projectile.owner;
            let local_hit = running
                && !local_killed
                && owner != self.player.id()
                && !self.player.is_invulnerable(now)
                && projectile.overlaps(&self.player);
            if local_hit {
                if self.player.take_hit(projectile.damage) {
                    local_killed = true;
                }
                projectile.mark_removed();
                continue;
            }

            if let Some(bot) = self.bots.bots.iter_mut().find(|b| {
                !b.is_removed()
                    && b.id() != owner
                    && !b.player.is_invulnerable(now)
                    && projectile.overlaps(&b.player)
            }) {
                if bot.player.take_hit(projectile.damage) {
                    bot.player.mark_removed();
                    debug!("Bot {} shot down by {}", bot.name, owner);
                    awards.push((owner, kill_award(bot.player.score)));
                }
                projectile.mark_removed();
                continue;
            }

            // Remote blobs are resized only by their own clients.
            if self
                .remotes
                .players
                .iter()
                .any(|r| r.is_active(now) && r.player.id() != owner && projectile.overlaps(&r.player))
            {
                projectile.mark_removed();
            }
        }

        for (owner, points) in awards {
            self.award(owner, points);
        }
        if local_killed {
            self.end_game("shot down");
        }
    }

    /// Credit `points` to a local player or bot. Remote scores belong to
    /// their owners.
    pub(super) fn award(&mut self, owner: EntityId, points: u32) {
        if points == 0 {
            return;
        }
        if owner == self.player.id() {
            self.player.score = self.player.score.saturating_add(points);
        } else if let Some(bot) = self.bots.get_bot_mut(owner) {
            bot.player.score = bot.player.score.saturating_add(points);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Color;

    fn sighting(id: EntityId, kind: PlayerKind, x: f32, radius: f32) -> Sighting {
        Sighting { id, kind, position: Vec2::new(x, 0.0), radius }
    }

    #[test]
    fn test_enemy_preferred_over_player() {
        let enemies = [Enemy::new(5, Vec2::new(140.0, 0.0), 20.0, Color::WHITE)];
        let players = [sighting(2, PlayerKind::Bot, 50.0, 10.0)];
        let owner = sighting(1, PlayerKind::Local, 0.0, 40.0);
        let targeting = Targeting {
            enemies: &enemies,
            players: &players,
            policy: TargetingPolicy::SizeGated,
            networked: false,
            eat_threshold: 1.2,
        };
        assert_eq!(targeting.find_target(Vec2::ZERO, 150.0, &owner), Some(Vec2::new(140.0, 0.0)));
    }

    #[test]
    fn test_size_gate_and_policy() {
        let players = [sighting(2, PlayerKind::Bot, 50.0, 20.0)];
        let owner = sighting(1, PlayerKind::Bot, 0.0, 20.0);
        let mut targeting = Targeting {
            enemies: &[],
            players: &players,
            policy: TargetingPolicy::SizeGated,
            networked: false,
            eat_threshold: 1.2,
        };
        assert_eq!(targeting.find_target(Vec2::ZERO, 150.0, &owner), None);

        targeting.policy = TargetingPolicy::Unrestricted;
        assert_eq!(targeting.find_target(Vec2::ZERO, 150.0, &owner), Some(Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_owner_and_same_side_skipped() {
        let players = [
            sighting(1, PlayerKind::Local, 10.0, 10.0),
            sighting(3, PlayerKind::Remote, 20.0, 10.0),
            sighting(4, PlayerKind::Bot, 100.0, 10.0),
        ];
        let owner = sighting(1, PlayerKind::Local, 0.0, 40.0);
        let targeting = Targeting {
            enemies: &[],
            players: &players,
            policy: TargetingPolicy::SizeGated,
            networked: true,
            eat_threshold: 1.2,
        };
        assert_eq!(targeting.find_target(Vec2::ZERO, 150.0, &owner), Some(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_out_of_range() {
        let enemies = [Enemy::new(5, Vec2::new(150.0, 0.0), 20.0, Color::WHITE)];
        let owner = sighting(1, PlayerKind::Local, 0.0, 40.0);
        let targeting = Targeting {
            enemies: &enemies,
            players: &[],
            policy: TargetingPolicy::Unrestricted,
            networked: false,
            eat_threshold: 1.2,
        };
        assert_eq!(targeting.find_target(Vec2::ZERO, 150.0, &owner), None);
    }
}
