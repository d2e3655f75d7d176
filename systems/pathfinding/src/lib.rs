#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid A* search shared by every actor that needs a route.
//!
//! The search expands four-connected neighbours with a uniform step cost and
//! a Manhattan-distance heuristic. Only walls block expansion: doors and traps
//! are treated as open floor regardless of key possession, so a route may
//! lead through a cell its owner cannot actually enter.

use std::{cmp::Ordering, collections::BinaryHeap};

use maze_quest_core::{CellCoord, GridCell, GridMap, Route};

/// Computes a route from `start` to `goal` using fresh scratch buffers.
///
/// See [`Pathfinder::find_path`].
#[must_use]
pub fn find_path(start: CellCoord, goal: CellCoord, grid: &GridMap) -> Route {
    Pathfinder::default().find_path(start, goal, grid)
}

/// Reusable A* search workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    open: BinaryHeap<OpenNode>,
    costs: Vec<u32>,
    parents: Vec<Option<CellCoord>>,
    closed: Vec<bool>,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a route from `start` to `goal`.
    ///
    /// The first element of the route is the first step after `start` and the
    /// last element is `goal`. The route is empty when `start == goal`, when
    /// either endpoint lies outside the grid, or when the goal is unreachable.
    /// Among open nodes the lowest `g + h` is expanded first; equal costs are
    /// expanded in insertion order.
    pub fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: &GridMap) -> Route {
        if start == goal || !grid.contains(start) || !grid.contains(goal) {
            return Route::default();
        }

        let columns = grid.columns();
        let rows = grid.rows();
        self.prepare(columns, rows);

        let mut sequence: u64 = 0;
        let Some(start_index) = index(columns, start) else {
            return Route::default();
        };
        self.costs[start_index] = 0;
        self.open.push(OpenNode {
            estimate: start.manhattan_distance(goal),
            sequence,
            cell: start,
        });

        while let Some(node) = self.open.pop() {
            let Some(current) = index(columns, node.cell) else {
                continue;
            };
            if self.closed[current] {
                continue;
            }
            self.closed[current] = true;

            if node.cell == goal {
                return self.reconstruct(start, goal, columns);
            }

            let next_cost = self.costs[current].saturating_add(1);
            for neighbor in cardinal_neighbors(node.cell, columns, rows) {
                if matches!(grid.cell_at(neighbor), Ok(GridCell::Wall) | Err(_)) {
                    continue;
                }

                let Some(neighbor_index) = index(columns, neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || self.costs[neighbor_index] <= next_cost {
                    continue;
                }

                self.costs[neighbor_index] = next_cost;
                self.parents[neighbor_index] = Some(node.cell);
                sequence += 1;
                self.open.push(OpenNode {
                    estimate: next_cost.saturating_add(neighbor.manhattan_distance(goal)),
                    sequence,
                    cell: neighbor,
                });
            }
        }

        Route::default()
    }

    fn prepare(&mut self, columns: u32, rows: u32) {
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.open.clear();
        self.costs.clear();
        self.costs.resize(cell_count, u32::MAX);
        self.parents.clear();
        self.parents.resize(cell_count, None);
        self.closed.clear();
        self.closed.resize(cell_count, false);
    }

    fn reconstruct(&self, start: CellCoord, goal: CellCoord, columns: u32) -> Route {
        let mut steps = vec![goal];
        let mut cursor = goal;
        while let Some(parent) = index(columns, cursor).and_then(|offset| self.parents[offset]) {
            if parent == start {
                break;
            }
            steps.push(parent);
            cursor = parent;
        }
        steps.reverse();
        Route::new(steps)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest element, so both keys are reversed.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn cardinal_neighbors(cell: CellCoord, columns: u32, rows: u32) -> NeighborIter {
    let mut neighbors = NeighborIter::default();

    if cell.row() > 0 {
        neighbors.push(CellCoord::new(cell.column(), cell.row() - 1));
    }
    if cell.column() > 0 {
        neighbors.push(CellCoord::new(cell.column() - 1, cell.row()));
    }
    if cell.column() + 1 < columns {
        neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
    }
    if cell.row() + 1 < rows {
        neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
    }

    neighbors
}

#[derive(Clone, Debug, Default)]
struct NeighborIter {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

fn index(columns: u32, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_node_ordering_prefers_low_estimate_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenNode {
            estimate: 4,
            sequence: 0,
            cell: CellCoord::new(0, 0),
        });
        heap.push(OpenNode {
            estimate: 3,
            sequence: 2,
            cell: CellCoord::new(2, 0),
        });
        heap.push(OpenNode {
            estimate: 3,
            sequence: 1,
            cell: CellCoord::new(1, 0),
        });

        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|node| node.cell)).collect();
        assert_eq!(
            order,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(0, 0)
            ]
        );
    }

    #[test]
    fn neighbors_stay_within_bounds() {
        let corner: Vec<_> = cardinal_neighbors(CellCoord::new(0, 0), 3, 3).collect();
        assert_eq!(corner, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);

        let center: Vec<_> = cardinal_neighbors(CellCoord::new(1, 1), 3, 3).collect();
        assert_eq!(center.len(), 4);
    }

    #[test]
    fn scratch_buffers_are_reused_between_queries() {
        let grid = GridMap::open(5, 5);
        let mut pathfinder = Pathfinder::new();

        let first = pathfinder.find_path(CellCoord::new(0, 0), CellCoord::new(4, 4), &grid);
        let second = pathfinder.find_path(CellCoord::new(4, 4), CellCoord::new(0, 0), &grid);

        assert_eq!(first.len(), 8);
        assert_eq!(second.len(), 8);
        assert_eq!(second.iter().last(), Some(&CellCoord::new(0, 0)));
    }
}
