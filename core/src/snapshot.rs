//! Persisted simulation state exchanged with the persistence collaborator.

use serde::{Deserialize, Serialize};

use crate::{AchievementId, CellCoord, Direction, Health, Inventory, QuestId, Stats, Weapon};

/// Identifies the maze a session was played in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeReference {
    /// Maze produced by the seeded generator.
    Generated {
        /// Generator seed.
        seed: u64,
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Maze loaded from an ASCII layout.
    Layout {
        /// Layout rows, top to bottom.
        rows: Vec<String>,
    },
}

/// Persistable player attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Cell the player stood on.
    pub cell: CellCoord,
    /// Remaining health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
    /// Facing direction.
    pub facing: Direction,
    /// Selected weapon.
    pub weapon: Weapon,
    /// Weapon level.
    pub weapon_level: u32,
}

/// Everything required to restore an equivalent session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Maze the session was played in.
    pub maze: MazeReference,
    /// Player attributes.
    pub player: PlayerRecord,
    /// Inventory counts.
    pub inventory: Inventory,
    /// Session statistics.
    pub stats: Stats,
    /// Achievements unlocked so far.
    pub achievements: Vec<AchievementId>,
    /// Quests completed so far.
    pub quests: Vec<QuestId>,
}
