//! Per-tick movement and contact resolution between entities.

use super::Game;
use super::combat::{Targeting, fire_towers};
use super::remote::EATEN_IMMUNITY_MS;
use crate::ai::{Sighting, Surroundings};
use crate::collision::{EatOutcome, can_eat, check_contact};
use crate::entity::Entity;
use crate::math::distance;
use glam::Vec2;
use tracing::debug;

impl Game {
    /// Every live player-like blob, as seen by the bot AI.
    pub fn sightings(&self, now: f64) -> Vec<Sighting> {
        let mut seen = Vec::with_capacity(1 + self.bots.len() + self.remotes.len());
        if self.is_running() {
            seen.push(Sighting::of(&self.player));
        }
        seen.extend(self.bots.bots.iter().filter(|b| !b.is_removed()).map(|b| Sighting::of(&b.player)));
        seen.extend(
            self.remotes
                .players
                .iter()
                .filter(|r| r.is_active(now))
                .map(|r| Sighting::of(&r.player)),
        );
        seen
    }

    /// What the bot AI can see given a list of sightings.
    pub fn surroundings<'a>(&'a self, players: &'a [Sighting]) -> Surroundings<'a> {
        Surroundings {
            food: &self.world.food,
            enemies: &self.world.enemies,
            players,
        }
    }

    /// Phase 3: think, move, eat and shoot for every bot.
    pub(super) fn update_bots(&mut self, now: f64) {
        let mut seen = self.sightings(now);
        for i in 0..self.bots.bots.len() {
            if self.bots.bots[i].is_removed() {
                continue;
            }
            {
                let view = Surroundings {
                    food: &self.world.food,
                    enemies: &self.world.enemies,
                    players: &seen,
                };
                self.bots.bots[i].update(&view, &self.world.border, now, &mut self.rng);
            }

            self.bot_eats_food(i);
            self.bot_meets_enemies(i);
            self.bot_meets_local(i, now);
            self.bot_meets_remotes(i, now);
            self.bot_meets_bots(i, now);

            if !self.bots.bots[i].is_removed() {
                self.fire_bot_towers(i, now);
            }
            // Bots still to move see this one's new position and size, and
            // nothing that was eaten this turn.
            seen = self.sightings(now);
        }
    }

    fn bot_eats_food(&mut self, i: usize) {
        let bot = &mut self.bots.bots[i].player;
        for food in self.world.food.iter_mut().filter(|f| !f.is_removed()) {
            if bot.overlaps(&*food) {
                bot.eat_food(food.value);
                food.mark_removed();
            }
        }
    }

    /// Bots eat smaller enemies; a larger enemy simply pushes past.
    fn bot_meets_enemies(&mut self, i: usize) {
        let threshold = self.config.eat_threshold;
        let bot = &mut self.bots.bots[i].player;
        for enemy in self.world.enemies.iter_mut().filter(|e| !e.is_removed()) {
            if bot.overlaps(&*enemy) && can_eat(bot.radius(), enemy.radius(), threshold) {
                bot.consume(enemy.radius(), enemy.value);
                enemy.mark_removed();
            }
        }
    }

    fn bot_meets_local(&mut self, i: usize, now: f64) {
        if !self.is_running() || self.bots.bots[i].is_removed() {
            return;
        }
        let threshold = self.config.eat_threshold;
        let bot = &self.bots.bots[i].player;
        let contact = check_contact(
            self.player.position(),
            self.player.radius(),
            bot.position(),
            bot.radius(),
            threshold,
        );
        match contact {
            Some(EatOutcome::FirstEats) if !bot.is_invulnerable(now) => {
                let (radius, score) = (bot.radius(), bot.score);
                self.player.consume(radius, score);
                self.bots.bots[i].player.mark_removed();
                debug!("Player ate bot {}", self.bots.bots[i].name);
            }
            Some(EatOutcome::SecondEats) if !self.player.is_invulnerable(now) => {
                let (radius, score) = (self.player.radius(), self.player.score);
                self.bots.bots[i].player.consume(radius, score);
                let name = self.bots.bots[i].name.clone();
                self.defeat_local(&format!("eaten by {name}"));
            }
            _ => {}
        }
    }

    fn bot_meets_remotes(&mut self, i: usize, now: f64) {
        let threshold = self.config.eat_threshold;
        for remote in self.remotes.players.iter_mut() {
            let bot = &mut self.bots.bots[i];
            if bot.is_removed() {
                return;
            }
            if !remote.is_active(now) {
                continue;
            }
            let contact = check_contact(
                remote.player.position(),
                remote.player.radius(),
                bot.player.position(),
                bot.player.radius(),
                threshold,
            );
            match contact {
                Some(EatOutcome::FirstEats) if !bot.player.is_invulnerable(now) => {
                    bot.player.mark_removed();
                    debug!("Remote {} ate bot {}", remote.player.nickname, bot.name);
                }
                Some(EatOutcome::SecondEats) => {
                    bot.player.consume(remote.player.radius(), remote.player.score);
                    remote.immune_until = now + EATEN_IMMUNITY_MS;
                }
                _ => {}
            }
        }
    }

    /// The bot eats any other bot it outgrows; the reverse is handled when
    /// the other bot takes its turn.
    fn bot_meets_bots(&mut self, i: usize, now: f64) {
        let threshold = self.config.eat_threshold;
        for j in 0..self.bots.bots.len() {
            if j == i || self.bots.bots[i].is_removed() {
                continue;
            }
            let other = &self.bots.bots[j].player;
            if other.is_removed() || other.is_invulnerable(now) {
                continue;
            }
            let (radius, score) = (other.radius(), other.score);
            let me = &self.bots.bots[i].player;
            if me.overlaps(other) && can_eat(me.radius(), radius, threshold) {
                self.bots.bots[i].player.consume(radius, score);
                self.bots.bots[j].player.mark_removed();
                debug!("Bot {} ate bot {}", self.bots.bots[i].name, self.bots.bots[j].name);
            }
        }
    }

    fn fire_bot_towers(&mut self, i: usize, now: f64) {
        if self.bots.bots[i].player.armory.is_empty() {
            return;
        }
        let targets = self.tower_targets(now);
        let owner = Sighting::of(&self.bots.bots[i].player);
        let mut shots = Vec::new();
        {
            let targeting = Targeting {
                enemies: &self.world.enemies,
                players: &targets,
                policy: self.config.tower_targeting,
                networked: self.room.is_some(),
                eat_threshold: self.config.eat_threshold,
            };
            fire_towers(&mut self.bots.bots[i].player.armory, &owner, now, &targeting, &mut shots);
        }
        self.launch(shots);
    }

    /// Phase 4: merge queued room updates, then let remotes collect food,
    /// meet the local player and fire their towers.
    pub(super) fn update_remotes(&mut self, now: f64) {
        self.apply_room_updates();
        let threshold = self.config.eat_threshold;

        for k in 0..self.remotes.players.len() {
            if !self.remotes.players[k].is_active(now) {
                continue;
            }

            let remote = &self.remotes.players[k].player;
            for food in self.world.food.iter_mut().filter(|f| !f.is_removed()) {
                if remote.overlaps(&*food) {
                    food.mark_removed();
                }
            }

            if self.is_running() {
                let contact = check_contact(
                    self.player.position(),
                    self.player.radius(),
                    remote.position(),
                    remote.radius(),
                    threshold,
                );
                match contact {
                    Some(EatOutcome::FirstEats) => {
                        let (radius, score) = (remote.radius(), remote.score);
                        self.player.consume(radius, score);
                        self.remotes.players[k].immune_until = now + EATEN_IMMUNITY_MS;
                        continue;
                    }
                    Some(EatOutcome::SecondEats) if !self.player.is_invulnerable(now) => {
                        let name = remote.nickname.clone();
                        self.defeat_local(&format!("eaten by {name}"));
                    }
                    _ => {}
                }
            }

            self.fire_remote_towers(k, now);
        }
    }

    fn fire_remote_towers(&mut self, k: usize, now: f64) {
        if self.remotes.players[k].player.armory.is_empty() {
            return;
        }
        let targets = self.tower_targets(now);
        let owner = Sighting::of(&self.remotes.players[k].player);
        let mut shots = Vec::new();
        {
            let targeting = Targeting {
                enemies: &self.world.enemies,
                players: &targets,
                policy: self.config.tower_targeting,
                networked: self.room.is_some(),
                eat_threshold: self.config.eat_threshold,
            };
            fire_towers(&mut self.remotes.players[k].player.armory, &owner, now, &targeting, &mut shots);
        }
        self.launch(shots);
    }

    /// Phase 6: enemies chase the nearest blob and meet the local player.
    pub(super) fn update_enemies(&mut self, now: f64) {
        let threshold = self.config.eat_threshold;
        let chase: Vec<Vec2> = self.sightings(now).into_iter().map(|s| s.position).collect();

        for idx in 0..self.world.enemies.len() {
            if self.world.enemies[idx].is_removed() {
                continue;
            }
            let here = self.world.enemies[idx].position();
            let nearest = chase
                .iter()
                .copied()
                .min_by(|a, b| distance(here, *a).total_cmp(&distance(here, *b)));
            if let Some(target) = nearest {
                self.world.enemies[idx].update(target);
            }

            if !self.is_running() {
                continue;
            }
            let enemy = &self.world.enemies[idx];
            let contact = check_contact(
                self.player.position(),
                self.player.radius(),
                enemy.position(),
                enemy.radius(),
                threshold,
            );
            match contact {
                Some(EatOutcome::FirstEats) => {
                    let (radius, value) = (enemy.radius(), enemy.value);
                    self.player.consume(radius, value);
                    self.world.enemies[idx].mark_removed();
                }
                Some(EatOutcome::SecondEats) if !self.player.is_invulnerable(now) => {
                    self.defeat_local("eaten by an enemy");
                }
                _ => {}
            }
        }
    }

    /// Phase 8: the local player picks up food.
    pub(super) fn collect_player_food(&mut self) {
        if !self.is_running() {
            return;
        }
        for food in self.world.food.iter_mut().filter(|f| !f.is_removed()) {
            if self.player.overlaps(&*food) {
                self.player.eat_food(food.value);
                food.mark_removed();
            }
        }
    }
}
