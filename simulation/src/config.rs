//! Tunables of a simulation run.

use std::time::Duration;

use maze_quest_core::{DEFAULT_TICK_RATE, ENEMY_ATTACK_COOLDOWN};
use maze_quest_system_enemy_ai::{DEFAULT_FIRE_CHANCE, DEFAULT_REFRESH_CHANCE};
use serde::Deserialize;

/// Settings consumed by [`SimulationClock`](crate::SimulationClock).
///
/// Every field has a default, so partial TOML documents are accepted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fixed ticks simulated per second.
    pub tick_rate: u32,
    /// Seed of the maze generator and of every AI decision.
    pub seed: u64,
    /// Upper bound on ticks run by a single [`advance`](crate::SimulationClock::advance).
    pub max_catch_up_ticks: u32,
    /// Dimensions of generated mazes.
    pub maze: MazeConfig,
    /// Per-tick probability that a chaser recomputes its route.
    pub chaser_refresh_chance: f64,
    /// Per-tick probability that a ranged enemy fires.
    pub ranged_fire_chance: f64,
    /// Simulated milliseconds between two contact attacks of one enemy.
    pub contact_cooldown_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            seed: 0,
            max_catch_up_ticks: 5,
            maze: MazeConfig::default(),
            chaser_refresh_chance: DEFAULT_REFRESH_CHANCE,
            ranged_fire_chance: DEFAULT_FIRE_CHANCE,
            contact_cooldown_ms: ENEMY_ATTACK_COOLDOWN.as_millis() as u64,
        }
    }
}

impl SimulationConfig {
    /// Simulated time covered by one tick, or `None` for a zero tick rate.
    #[must_use]
    pub fn tick_duration(&self) -> Option<Duration> {
        (self.tick_rate > 0).then(|| Duration::from_secs(1) / self.tick_rate)
    }

    /// Contact attack cooldown as a [`Duration`].
    #[must_use]
    pub const fn contact_cooldown(&self) -> Duration {
        Duration::from_millis(self.contact_cooldown_ms)
    }
}

/// Requested size of a generated maze.
///
/// The generator rounds both sides up to odd values of at least seven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MazeConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            columns: 21,
            rows: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            seed = 42

            [maze]
            columns = 31
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, 42);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.maze, MazeConfig { columns: 31, rows: 15 });
        assert_eq!(config.ranged_fire_chance, 0.01);
        assert_eq!(config.contact_cooldown(), Duration::from_secs(1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<SimulationConfig>("tickrate = 30").is_err());
    }

    #[test]
    fn tick_duration_divides_one_second() {
        let config = SimulationConfig {
            tick_rate: 10,
            ..SimulationConfig::default()
        };
        assert_eq!(config.tick_duration(), Some(Duration::from_millis(100)));

        let stalled = SimulationConfig {
            tick_rate: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(stalled.tick_duration(), None);
    }
}
