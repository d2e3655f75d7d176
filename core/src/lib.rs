#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Quest engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure simulation systems and the external collaborators. Input adapters
//! submit [`Command`] values describing player intents, the world and the
//! systems mutate entity state for one fixed tick, and every observable
//! outcome is broadcast as an [`Event`] that rendering, audio and UI
//! collaborators consume without ever feeding state back into the core.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod actor;
mod collaborators;
mod error;
mod grid;
mod projectile;
mod snapshot;
mod stats;

pub use actor::{
    Behavior, BossPhase, DamageOutcome, Enemy, EnemyKind, EnemyStats, Inventory, Player, Route,
};
pub use collaborators::{
    ActorTag, ActorView, AudioCue, AudioSink, CollaboratorError, FrameView, GameStatus,
    Persistence, ProjectileView, Renderer,
};
pub use error::SimError;
pub use grid::{GridCell, GridMap};
pub use projectile::{Launch, Projectile, ProjectileId, ProjectileOwner};
pub use snapshot::{MazeReference, PlayerRecord, SaveSnapshot};
pub use stats::{StatField, Stats};

/// Fixed simulation rate the tick loop targets by default.
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Damage dealt to the player when stepping onto a trap cell.
pub const TRAP_DAMAGE: u32 = 10;

/// Melee damage dealt per weapon level.
pub const MELEE_DAMAGE_PER_LEVEL: u32 = 10;

/// Arrow damage dealt per weapon level.
pub const ARROW_DAMAGE_PER_LEVEL: u32 = 5;

/// Travel speed of player arrows in cells per second.
pub const ARROW_SPEED: f32 = 12.0;

/// Travel speed of enemy shots in cells per second, per heading component.
pub const ENEMY_SHOT_SPEED: f32 = 6.0;

/// Flat damage applied by a detonating bomb.
pub const BOMB_DAMAGE: u32 = 50;

/// Blast radius of a bomb measured in cells; targets must lie strictly inside.
pub const BOMB_RADIUS: f32 = 2.0;

/// Time between a bomb being placed and its detonation.
pub const BOMB_FUSE: Duration = Duration::from_secs(2);

/// Minimum simulated time between two attacks of the same enemy.
pub const ENEMY_ATTACK_COOLDOWN: Duration = Duration::from_millis(1_000);

/// Boss health below which the second phase begins.
pub const BOSS_PHASE_THRESHOLD: u32 = 100;

/// Speed the boss adopts permanently once it enters its second phase.
pub const BOSS_ENRAGED_SPEED: u32 = 5;

/// Health restored by drinking a potion.
pub const POTION_HEAL: u32 = 25;

/// Starting and maximum health of a fresh player.
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Number of recent positions retained in a projectile trail.
pub const TRAIL_LENGTH: usize = 10;

/// Input intents delivered by the input collaborator for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the player step by the provided offset.
    Move {
        /// Horizontal offset; clamped to `-1..=1`.
        dx: i32,
        /// Vertical offset; clamped to `-1..=1`.
        dy: i32,
    },
    /// Requests an attack with the currently selected weapon.
    Attack,
    /// Opens or closes the inventory overlay.
    ToggleInventory,
    /// Requests that the player consume an item from the inventory.
    UseItem {
        /// Kind of item to consume.
        item: ItemKind,
    },
    /// Switches the weapon used by subsequent attacks.
    SelectWeapon {
        /// Weapon that becomes active.
        weapon: Weapon,
    },
    /// Requests that the session ends.
    Quit,
}

/// Events broadcast by the simulation while processing a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that the player stepped onto a trap.
    TrapTriggered {
        /// Trap cell that was entered.
        cell: CellCoord,
        /// Damage applied by the trap.
        damage: u32,
    },
    /// Reports that the player picked up an item lying on the floor.
    ItemCollected {
        /// Kind of item collected.
        item: ItemKind,
        /// Cell the item was collected from.
        cell: CellCoord,
    },
    /// Reports that the player consumed an item.
    ItemUsed {
        /// Kind of item consumed.
        item: ItemKind,
    },
    /// Announces that the inventory overlay opened or closed.
    InventoryToggled {
        /// Whether the overlay is now open.
        open: bool,
    },
    /// Announces that the player switched weapons.
    WeaponSelected {
        /// Weapon that became active.
        weapon: Weapon,
    },
    /// Announces that the player performed an attack action.
    AttackPerformed {
        /// Weapon used for the attack.
        weapon: Weapon,
    },
    /// Damage exchanged between two combatants.
    Combat(CombatEvent),
    /// Confirms that an enemy moved between two cells.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Announces that an enemy was eliminated.
    EnemyDefeated {
        /// Identifier of the defeated enemy.
        enemy: EnemyId,
        /// Kind of the defeated enemy.
        kind: EnemyKind,
        /// Cell the enemy occupied when it fell.
        cell: CellCoord,
    },
    /// Announces that a boss entered a new phase.
    BossPhaseChanged {
        /// Identifier of the boss.
        enemy: EnemyId,
        /// Phase that became active.
        phase: BossPhase,
    },
    /// Confirms that a projectile entered the simulation.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Owner that launched the projectile.
        owner: ProjectileOwner,
    },
    /// Reports that a projectile was reflected by a mirror.
    ProjectileBounced {
        /// Identifier of the reflected projectile.
        projectile: ProjectileId,
        /// Mirror cell that reflected it.
        cell: CellCoord,
    },
    /// Reports that a projectile left the grid or struck a wall.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
    /// Cosmetic burst notification emitted once per detonating bomb.
    BombDetonated {
        /// Identifier of the bomb.
        projectile: ProjectileId,
        /// Cell the bomb rested on.
        cell: CellCoord,
    },
    /// Announces that an achievement was unlocked.
    AchievementUnlocked {
        /// Identifier of the unlocked achievement.
        achievement: AchievementId,
    },
    /// Announces that a quest objective was fulfilled.
    QuestCompleted {
        /// Identifier of the completed quest.
        quest: QuestId,
    },
    /// Announces that the player ran out of health.
    PlayerDefeated,
    /// Announces that the player won the level.
    PlayerVictory,
}

/// Damage exchanged between two combatants during a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CombatEvent {
    /// Source of the damage.
    pub attacker: Combatant,
    /// Recipient of the damage.
    pub target: Combatant,
    /// Health actually removed from the target.
    pub damage: u32,
    /// Whether the damage eliminated the target.
    pub killed: bool,
}

/// Participants that can appear on either side of a [`CombatEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combatant {
    /// The player character.
    Player,
    /// A specific enemy.
    Enemy(EnemyId),
    /// A detonating bomb.
    Bomb(ProjectileId),
    /// A trap cell.
    Trap(CellCoord),
}

/// Items that can be carried in the player's inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Opens door cells while held.
    Key,
    /// Charge for the bomb weapon.
    Bomb,
    /// Restores health when consumed.
    Potion,
}

/// Weapons the player can attack with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Melee strike against the facing cell.
    Sword,
    /// Directional arrow.
    Bow,
    /// Timed explosive placed on the player's cell.
    Bomb,
}

/// Cardinal facing directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit cell offset associated with the direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Heading vector associated with the direction, in cell units.
    #[must_use]
    pub fn heading(self) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(dx as f32, dy as f32)
    }

    /// Derives a facing from a movement offset.
    ///
    /// Horizontal movement wins on diagonals. Returns `None` for a zero offset.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        if dx > 0 {
            Some(Self::East)
        } else if dx < 0 {
            Some(Self::West)
        } else if dy > 0 {
            Some(Self::South)
        } else if dy < 0 {
            Some(Self::North)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an achievement in the progression catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AchievementId(u16);

impl AchievementId {
    /// Creates a new achievement identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Identifier of a quest in the progression catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestId(u16);

impl QuestId {
    /// Creates a new quest identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the cell displaced by the provided offset, if it stays non-negative.
    ///
    /// Upper bounds are not checked; callers validate against the grid.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }

    /// Continuous position of the cell centre in cell units.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Health pool that saturates at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Depleted health.
    pub const ZERO: Self = Self(0);

    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the health.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Health remaining after taking `amount` damage, floored at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Health after restoring `amount`, capped at `max`.
    #[must_use]
    pub fn restored(self, amount: u32, max: Health) -> Self {
        Self(self.0.saturating_add(amount).min(max.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, Health, ItemKind, MazeReference, Weapon};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_rejects_negative_cells() {
        let origin = CellCoord::new(0, 2);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(1, -1), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn health_never_drops_below_zero() {
        let health = Health::new(5).saturating_sub(10);
        assert_eq!(health, Health::ZERO);
        assert!(health.is_depleted());
    }

    #[test]
    fn health_restoration_caps_at_maximum() {
        let health = Health::new(90).restored(25, Health::new(100));
        assert_eq!(health.get(), 100);
    }

    #[test]
    fn facing_prefers_horizontal_movement() {
        assert_eq!(Direction::from_delta(1, 1), Some(Direction::East));
        assert_eq!(Direction::from_delta(0, -1), Some(Direction::North));
        assert_eq!(Direction::from_delta(0, 0), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn persisted_enums_round_trip_through_bincode() {
        assert_round_trip(&ItemKind::Potion);
        assert_round_trip(&Weapon::Bow);
        assert_round_trip(&MazeReference::Generated {
            seed: 7,
            columns: 21,
            rows: 15,
        });
    }
}
