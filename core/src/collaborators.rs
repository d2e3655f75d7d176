//! Interfaces the core needs from its external collaborators.
//!
//! Collaborators only ever receive data. A failing collaborator reports a
//! [`CollaboratorError`] which the simulation logs before carrying on with the
//! next tick.

use std::time::Duration;

use glam::Vec2;
use thiserror::Error;

use crate::{
    CellCoord, Direction, EnemyId, EnemyKind, GridMap, Health, Inventory, ItemKind,
    ProjectileId, ProjectileOwner, SaveSnapshot,
};

/// Discrete audio cues emitted by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// The player attacked.
    AttackFired,
    /// The player lost health.
    DamageTaken,
    /// An enemy was eliminated.
    EnemyDefeated,
    /// The player won the level.
    PlayerVictory,
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The simulation keeps ticking.
    Running,
    /// The player defeated the level.
    Victory,
    /// The player ran out of health.
    Defeat,
    /// The player requested to quit.
    Quit,
}

impl GameStatus {
    /// Whether the simulation stopped advancing.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Which actor an [`ActorView`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorTag {
    /// The player character.
    Player,
    /// An enemy.
    Enemy {
        /// Identifier of the enemy.
        id: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
}

/// Read-only description of a live actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorView {
    /// Which actor is described.
    pub tag: ActorTag,
    /// Cell occupied by the actor.
    pub cell: CellCoord,
    /// Direction the actor faces.
    pub facing: Direction,
    /// Remaining health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
}

/// Read-only description of an in-flight projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileView {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Owner of the projectile.
    pub owner: ProjectileOwner,
    /// Continuous position in cell units.
    pub position: Vec2,
    /// Recent positions, oldest first.
    pub trail: Vec<Vec2>,
}

/// Everything a renderer needs to draw one tick.
#[derive(Clone, Debug)]
pub struct FrameView<'a> {
    /// Index of the tick that produced the frame.
    pub tick: u64,
    /// Simulated time elapsed since the session started.
    pub elapsed: Duration,
    /// Maze layout.
    pub grid: &'a GridMap,
    /// Live actors, player first, enemies in identifier order.
    pub actors: Vec<ActorView>,
    /// Live projectiles in identifier order.
    pub projectiles: Vec<ProjectileView>,
    /// Items lying on the floor.
    pub pickups: Vec<(CellCoord, ItemKind)>,
    /// Items carried by the player.
    pub inventory: Inventory,
    /// Whether the inventory overlay is open.
    pub inventory_open: bool,
    /// Session lifecycle.
    pub status: GameStatus,
}

/// Failures reported by collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator cannot be reached at the moment.
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        /// Name of the collaborator.
        collaborator: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// The collaborator was reached but failed to complete the request.
    #[error("{collaborator} failed: {reason}")]
    Failed {
        /// Name of the collaborator.
        collaborator: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

/// Draws frames; never read back by the core.
pub trait Renderer {
    /// Presents a frame.
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), CollaboratorError>;
}

/// Plays audio cues; the core never waits for playback.
pub trait AudioSink {
    /// Queues an audio cue.
    fn play(&mut self, cue: AudioCue) -> Result<(), CollaboratorError>;
}

/// Stores and retrieves save snapshots in an encoding of its choosing.
pub trait Persistence {
    /// Stores a snapshot.
    fn save(&mut self, snapshot: &SaveSnapshot) -> Result<(), CollaboratorError>;

    /// Retrieves the most recently stored snapshot.
    fn load(&mut self) -> Result<SaveSnapshot, CollaboratorError>;
}
