//! Error taxonomy of the simulation core.

use thiserror::Error;

use crate::{BossPhase, ItemKind};

/// Failures raised by simulation operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// A grid query addressed a cell outside the maze.
    ///
    /// Movement code bounds-checks before querying, so this always signals a
    /// logic error and aborts the tick that raised it.
    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} maze")]
    OutOfBounds {
        /// Requested column.
        column: u32,
        /// Requested row.
        row: u32,
        /// Number of columns in the maze.
        columns: u32,
        /// Number of rows in the maze.
        rows: u32,
    },
    /// A boss was asked to enter a phase it cannot reach from its current one.
    #[error("boss cannot move from phase {from:?} to phase {to:?}")]
    InvalidTransition {
        /// Phase the boss occupied.
        from: BossPhase,
        /// Phase that was requested.
        to: BossPhase,
    },
    /// An action required an inventory item the player does not hold.
    #[error("no {item:?} left in the inventory")]
    ResourceUnavailable {
        /// Item that was missing.
        item: ItemKind,
    },
}
