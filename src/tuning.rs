//! Game balance
//!
//! Every number that shapes play (actor stats, weapon cadence, spawn
//! timing) lives here. Defaults are compiled in; a JSON file can override
//! any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::catalog::EnemyKind;

/// Physical stats shared by every actor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorStats {
    pub mass: f32,
    /// Reference pixels per second, before the global speed scale
    pub max_speed: f32,
    pub max_force: f32,
    /// Degrees per second
    pub max_turn_rate: f32,
    /// Bounding radius, normalized
    pub radius: f32,
}

impl ActorStats {
    const fn new(mass: f32, max_speed: f32, max_force: f32, max_turn_rate: f32, radius: f32) -> Self {
        Self {
            mass,
            max_speed,
            max_force,
            max_turn_rate,
            radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    #[serde(flatten)]
    pub stats: ActorStats,
    /// Score awarded on kill, before the multiplier
    pub points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Actors ===
    pub player: ActorStats,
    pub rhomb: EnemyStats,
    pub smart_rhomb: EnemyStats,
    pub fast_rhomb: EnemyStats,
    pub fast_small_rhomb: EnemyStats,

    // === Player ===
    pub player_lives: u32,
    pub player_bombs: u32,
    /// Seconds between bullet volleys
    pub shot_interval: f32,
    /// Kills needed to raise the score multiplier by one
    pub kills_per_multiplier: u32,

    // === Weapons ===
    pub bullet_mass: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Seconds a bomb ring keeps expanding
    pub bomb_duration: f32,
    /// Ring growth in reference pixels per second, before the global speed scale
    pub bomb_expansion_speed: f32,

    // === Steering ===
    /// Neighbor radius for separation (reference pixels)
    pub separation_radius: f32,
    /// Threat radius for SmartRhomb bullet dodging (reference pixels)
    pub evade_distance: f32,
    /// Wander target displacement per second
    pub wander_jitter: f32,
    pub wander_radius: f32,
    pub wander_distance: f32,

    // === Spawning ===
    /// Max distance of flock members and split children from their origin
    pub spawn_scatter: f32,
    pub flock_size: usize,
    pub flock_period: f32,
    pub corner_period: f32,
    pub corner_wait: f32,
    /// Corner rounds per Evolved-mode generator
    pub evolved_rounds: u32,
    /// Seconds between Evolved-mode generator refreshes
    pub evolved_refresh: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: ActorStats::new(1.0, 550.0, 800.0, 720.0, 0.008),
            rhomb: EnemyStats {
                stats: ActorStats::new(0.1, 300.0, 500.0, 720.0, 0.007),
                points: 50,
            },
            smart_rhomb: EnemyStats {
                stats: ActorStats::new(0.1, 400.0, 150.0, 720.0, 0.007),
                points: 100,
            },
            fast_rhomb: EnemyStats {
                stats: ActorStats::new(0.7, 500.0, 1000.0, 720.0, 0.007),
                points: 50,
            },
            fast_small_rhomb: EnemyStats {
                stats: ActorStats::new(0.1, 600.0, 700.0, 720.0, 0.005),
                points: 25,
            },

            player_lives: 3,
            player_bombs: 3,
            shot_interval: 0.18,
            kills_per_multiplier: 10,

            bullet_mass: 0.01,
            bullet_speed: 650.0,
            bullet_radius: 0.005,
            bomb_duration: 4.0,
            bomb_expansion_speed: 700.0,

            separation_radius: 100.0,
            evade_distance: 250.0,
            wander_jitter: 100_000.0,
            wander_radius: 150.0,
            wander_distance: 100.0,

            spawn_scatter: 0.1,
            flock_size: 4,
            flock_period: 1.5,
            corner_period: 0.2,
            corner_wait: 1.0,
            evolved_rounds: 10,
            evolved_refresh: 7.0,
        }
    }
}

impl Tuning {
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Rhomb => &self.rhomb,
            EnemyKind::SmartRhomb => &self.smart_rhomb,
            EnemyKind::FastRhomb => &self.fast_rhomb,
            EnemyKind::FastSmallRhomb => &self.fast_small_rhomb,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|e| SimError::TuningFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_lives": 5, "flock_size": 6 }"#).unwrap();
        assert_eq!(tuning.player_lives, 5);
        assert_eq!(tuning.flock_size, 6);
        assert_eq!(tuning.player_bombs, 3);
        assert_eq!(tuning.rhomb.points, 50);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert!(json.contains("\"max_speed\""));
        assert!(!json.contains("bomb_radius"));
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Tuning::from_json("{ not json"), Err(SimError::Tuning(_))));
    }

    #[test]
    fn test_enemy_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.enemy(EnemyKind::SmartRhomb).points, 100);
        assert_eq!(tuning.enemy(EnemyKind::FastSmallRhomb).stats.radius, 0.005);
    }
}
