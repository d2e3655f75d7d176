//! Static maze representation and cell-type queries.

use glam::Vec2;

use crate::{CellCoord, SimError};

/// Contents of a single maze cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridCell {
    /// Open floor.
    #[default]
    Empty,
    /// Solid wall; never walkable.
    Wall,
    /// Reflector that reverses projectiles entering it.
    Mirror,
    /// Floor that damages the player on entry.
    Trap,
    /// Passage that requires a key.
    Door,
}

/// Immutable tile grid describing the maze layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

impl GridMap {
    /// Builds a grid by evaluating `cell` for every coordinate in row-major order.
    #[must_use]
    pub fn from_fn<F>(columns: u32, rows: u32, mut cell: F) -> Self
    where
        F: FnMut(CellCoord) -> GridCell,
    {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(cell(CellCoord::new(column, row)));
            }
        }

        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Creates a grid consisting entirely of empty floor.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        Self::from_fn(columns, rows, |_| GridCell::Empty)
    }

    /// Number of columns in the maze.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the maze.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies inside the maze.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the contents of the provided cell.
    pub fn cell_at(&self, cell: CellCoord) -> Result<GridCell, SimError> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(SimError::OutOfBounds {
                column: cell.column(),
                row: cell.row(),
                columns: self.columns,
                rows: self.rows,
            })
    }

    /// Reports whether an actor may stand on the provided cell.
    ///
    /// Walls are never walkable and doors require a key. Traps and mirrors are
    /// walkable; their side effects are resolved by the caller.
    pub fn is_walkable(&self, cell: CellCoord, has_key: bool) -> Result<bool, SimError> {
        Ok(match self.cell_at(cell)? {
            GridCell::Wall => false,
            GridCell::Door => has_key,
            GridCell::Empty | GridCell::Trap | GridCell::Mirror => true,
        })
    }

    /// Maps a continuous position to the cell containing it.
    ///
    /// Returns `None` for positions outside the maze.
    #[must_use]
    pub fn cell_at_point(&self, point: Vec2) -> Option<CellCoord> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let cell = CellCoord::new(point.x.floor() as u32, point.y.floor() as u32);
        self.contains(cell).then_some(cell)
    }

    /// Iterates every coordinate alongside its contents in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, GridCell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *cell)
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GridMap {
        GridMap::from_fn(3, 2, |cell| match (cell.column(), cell.row()) {
            (0, 0) => GridCell::Wall,
            (1, 0) => GridCell::Door,
            (2, 0) => GridCell::Trap,
            (0, 1) => GridCell::Mirror,
            _ => GridCell::Empty,
        })
    }

    #[test]
    fn cell_at_reports_out_of_bounds() {
        let grid = sample();
        assert_eq!(grid.cell_at(CellCoord::new(2, 1)), Ok(GridCell::Empty));
        assert_eq!(
            grid.cell_at(CellCoord::new(3, 0)),
            Err(SimError::OutOfBounds {
                column: 3,
                row: 0,
                columns: 3,
                rows: 2,
            })
        );
    }

    #[test]
    fn walkability_respects_cell_types_and_keys() {
        let grid = sample();
        assert_eq!(grid.is_walkable(CellCoord::new(0, 0), true), Ok(false));
        assert_eq!(grid.is_walkable(CellCoord::new(1, 0), false), Ok(false));
        assert_eq!(grid.is_walkable(CellCoord::new(1, 0), true), Ok(true));
        assert_eq!(grid.is_walkable(CellCoord::new(2, 0), false), Ok(true));
        assert_eq!(grid.is_walkable(CellCoord::new(0, 1), false), Ok(true));
        assert!(grid.is_walkable(CellCoord::new(0, 5), true).is_err());
    }

    #[test]
    fn points_map_to_containing_cells() {
        let grid = sample();
        assert_eq!(
            grid.cell_at_point(Vec2::new(1.99, 0.01)),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(grid.cell_at_point(Vec2::new(-0.1, 0.5)), None);
        assert_eq!(grid.cell_at_point(Vec2::new(3.0, 0.5)), None);
    }

    #[test]
    fn iter_visits_cells_in_row_major_order() {
        let grid = sample();
        let walls: Vec<_> = grid
            .iter()
            .filter(|(_, cell)| *cell == GridCell::Mirror)
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(walls, vec![CellCoord::new(0, 1)]);
        assert_eq!(grid.iter().count(), 6);
    }
}
