//! Eating and contact rules.
//!
//! This module handles the size comparisons used whenever two sized entities
//! touch:
//! - Eating logic (the larger consumes the smaller above a ratio)
//! - Growth and score transfer constants
//! - The minimum-alive radius for player-like blobs

use glam::Vec2;

use crate::math::circles_overlap;

/// Default attacker/defender radius ratio required to eat on contact.
pub const EAT_THRESHOLD: f32 = 1.2;
/// Player-like blobs below this radius are dead.
pub const MIN_ALIVE_RADIUS: f32 = 10.0;
/// Radius gained per food pickup.
pub const FOOD_GROWTH: f32 = 0.2;
/// Fraction of the victim's radius gained when eating a blob or enemy.
pub const EAT_GROWTH_FACTOR: f32 = 0.2;
/// Fraction of a shot-down bot's score awarded to the shooter.
pub const KILL_SCORE_SHARE: f32 = 0.5;

/// Outcome of two sized entities touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatOutcome {
    /// The first entity eats the second.
    FirstEats,
    /// The second entity eats the first.
    SecondEats,
    /// Sizes are within the threshold band: nothing happens.
    Standoff,
}

/// Check whether `eater` is large enough to consume `prey`.
#[inline]
pub fn can_eat(eater_radius: f32, prey_radius: f32, threshold: f32) -> bool {
    eater_radius > prey_radius * threshold
}

/// Decide who eats whom. With `threshold >= 1` at most one side can win.
#[inline]
pub fn resolve_eat(first_radius: f32, second_radius: f32, threshold: f32) -> EatOutcome {
    if can_eat(first_radius, second_radius, threshold) {
        EatOutcome::FirstEats
    } else if can_eat(second_radius, first_radius, threshold) {
        EatOutcome::SecondEats
    } else {
        EatOutcome::Standoff
    }
}

/// Resolve a contact between two circles: `None` when they do not overlap.
#[inline]
pub fn check_contact(
    first_pos: Vec2,
    first_radius: f32,
    second_pos: Vec2,
    second_radius: f32,
    threshold: f32,
) -> Option<EatOutcome> {
    circles_overlap(first_pos, first_radius, second_pos, second_radius)
        .then(|| resolve_eat(first_radius, second_radius, threshold))
}

/// Score awarded for shooting down a blob with `victim_score`.
#[inline]
pub fn kill_award(victim_score: u32) -> u32 {
    (victim_score as f32 * KILL_SCORE_SHARE).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bot_cannot_eat_larger_enemy() {
        // Bot radius 15 vs enemy radius 20: 15 <= 24, the bot cannot eat,
        // while 20 > 18 lets the enemy win.
        assert!(!can_eat(15.0, 20.0, EAT_THRESHOLD));
        assert_eq!(resolve_eat(15.0, 20.0, EAT_THRESHOLD), EatOutcome::SecondEats);
        assert_eq!(resolve_eat(20.0, 22.0, EAT_THRESHOLD), EatOutcome::Standoff);
    }

    #[test]
    fn test_clear_winner() {
        assert_eq!(resolve_eat(30.0, 20.0, EAT_THRESHOLD), EatOutcome::FirstEats);
        assert_eq!(resolve_eat(20.0, 30.0, EAT_THRESHOLD), EatOutcome::SecondEats);
    }

    #[test]
    fn test_no_contact() {
        let outcome = check_contact(Vec2::ZERO, 10.0, Vec2::new(100.0, 0.0), 10.0, EAT_THRESHOLD);
        assert!(outcome.is_none());
    }

    #[test]
    fn test_kill_award_floors() {
        assert_eq!(kill_award(0), 0);
        assert_eq!(kill_award(7), 3);
        assert_eq!(kill_award(100), 50);
    }

    proptest! {
        #[test]
        fn eat_rule_is_exclusive(a in 1.0f32..500.0, b in 1.0f32..500.0, t in 1.0f32..2.0) {
            let first = can_eat(a, b, t);
            let second = can_eat(b, a, t);
            prop_assert!(!(first && second));
        }

        #[test]
        fn near_equal_sizes_stand_off(a in 1.0f32..500.0, ratio in 0.9f32..1.1) {
            let b = a * ratio;
            prop_assert_eq!(resolve_eat(a, b, EAT_THRESHOLD), EatOutcome::Standoff);
        }
    }
}
