//! Bot difficulty tiers and the tuning tables behind them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty of a single bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Tuning values for this tier.
    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured difficulty for the whole bot population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultySetting {
    Easy,
    #[default]
    Medium,
    Hard,
    /// Round-robin at creation, random on respawn.
    Mixed,
}

impl DifficultySetting {
    /// Difficulty for the `index`-th bot created at game start.
    pub fn for_index(self, index: usize) -> Difficulty {
        match self {
            DifficultySetting::Easy => Difficulty::Easy,
            DifficultySetting::Medium => Difficulty::Medium,
            DifficultySetting::Hard => Difficulty::Hard,
            DifficultySetting::Mixed => Difficulty::ALL[index % Difficulty::ALL.len()],
        }
    }

    /// Difficulty for a bot spawned later to refill the population.
    pub fn for_respawn<R: Rng>(self, rng: &mut R) -> Difficulty {
        match self {
            DifficultySetting::Mixed => Difficulty::ALL[rng.random_range(0..Difficulty::ALL.len())],
            fixed => fixed.for_index(0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultySetting::Mixed => "mixed",
            fixed => fixed.for_index(0).as_str(),
        }
    }

    /// Parse the relay's free-form difficulty string; unknown values fall
    /// back to medium.
    pub fn from_name(name: &str) -> Self {
        match name {
            "easy" => DifficultySetting::Easy,
            "hard" => DifficultySetting::Hard,
            "mixed" => DifficultySetting::Mixed,
            _ => DifficultySetting::Medium,
        }
    }
}

/// Something a bot may react to during a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    FleeEnemy,
    FleePlayer,
    ChasePlayer,
    ChaseEnemy,
    ChaseFood,
}

/// One row of a priority table: react to `stimulus` when it is closer than
/// `within`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub stimulus: Stimulus,
    pub within: f32,
}

const fn rule(stimulus: Stimulus, within: f32) -> Rule {
    Rule { stimulus, within }
}

/// Every number that differs between difficulty tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    pub food_range: f32,
    /// Detection range for prey (enemies and players alike).
    pub prey_range: f32,
    /// Required `own r / prey r` ratio to consider something prey.
    pub size_advantage: f32,
    pub threat_range: f32,
    /// Something is a threat when `own r <= its r * size_disadvantage`.
    pub size_disadvantage: f32,
    pub flee_distance: f32,
    pub wander_distance: f32,
    /// Inclusive tick range between decisions.
    pub decision_ticks: (i32, i32),
    pub tower_cooldown_ms: f64,
    /// Checked top to bottom, first match wins; wander otherwise.
    pub priorities: &'static [Rule],
}

static EASY: DifficultyProfile = DifficultyProfile {
    food_range: 300.0,
    prey_range: 200.0,
    size_advantage: 1.3,
    threat_range: 250.0,
    size_disadvantage: 1.0,
    flee_distance: 250.0,
    wander_distance: 200.0,
    decision_ticks: (45, 90),
    tower_cooldown_ms: 5000.0,
    priorities: &[
        rule(Stimulus::FleeEnemy, 200.0),
        rule(Stimulus::FleePlayer, 200.0),
        rule(Stimulus::ChaseFood, 300.0),
        rule(Stimulus::ChaseEnemy, 200.0),
    ],
};

static MEDIUM: DifficultyProfile = DifficultyProfile {
    food_range: 400.0,
    prey_range: 300.0,
    size_advantage: 1.2,
    threat_range: 300.0,
    size_disadvantage: 0.9,
    flee_distance: 300.0,
    wander_distance: 300.0,
    decision_ticks: (30, 60),
    tower_cooldown_ms: 3000.0,
    priorities: &[
        rule(Stimulus::FleeEnemy, 200.0),
        rule(Stimulus::FleePlayer, 200.0),
        rule(Stimulus::ChasePlayer, 300.0),
        rule(Stimulus::ChaseEnemy, 300.0),
        rule(Stimulus::ChaseFood, 400.0),
    ],
};

static HARD: DifficultyProfile = DifficultyProfile {
    food_range: 500.0,
    prey_range: 400.0,
    size_advantage: 1.1,
    threat_range: 350.0,
    size_disadvantage: 0.8,
    flee_distance: 350.0,
    wander_distance: 400.0,
    decision_ticks: (15, 30),
    tower_cooldown_ms: 1500.0,
    priorities: &[
        rule(Stimulus::ChasePlayer, 400.0),
        rule(Stimulus::FleeEnemy, 150.0),
        rule(Stimulus::FleePlayer, 150.0),
        rule(Stimulus::ChaseEnemy, 300.0),
        rule(Stimulus::ChaseFood, 400.0),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mixed_round_robin() {
        let tiers: Vec<_> = (0..4).map(|i| DifficultySetting::Mixed.for_index(i)).collect();
        assert_eq!(
            tiers,
            vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Easy]
        );
        assert_eq!(DifficultySetting::Hard.for_index(1), Difficulty::Hard);
    }

    #[test]
    fn test_respawn_fixed_tier() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(DifficultySetting::Easy.for_respawn(&mut rng), Difficulty::Easy);
        }
    }

    #[test]
    fn test_harder_decides_more_often() {
        assert!(Difficulty::Hard.profile().decision_ticks.1 < Difficulty::Easy.profile().decision_ticks.0);
        assert_eq!(Difficulty::Hard.profile().priorities[0].stimulus, Stimulus::ChasePlayer);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DifficultySetting::from_name("mixed"), DifficultySetting::Mixed);
        assert_eq!(DifficultySetting::from_name("nightmare"), DifficultySetting::Medium);
        assert_eq!(DifficultySetting::Mixed.as_str(), "mixed");
    }
}
