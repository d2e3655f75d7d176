//! Breadth-first distance field used while laying out levels.

use std::collections::VecDeque;

use maze_quest_core::CellCoord;

/// Dense step-distance grid seeded from one or more source cells.
///
/// Distances default to `u32::MAX` for cells the search never reached, so
/// callers can tell blocked or disconnected cells apart from open floor.
#[derive(Clone, Debug, Default)]
pub(crate) struct DistanceField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Builds a distance field over a `width` x `height` grid.
    pub(crate) fn build<F>(width: u32, height: u32, sources: &[CellCoord], is_blocked: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut field = Self::default();
        field.rebuild_with(width, height, sources, is_blocked);
        field
    }

    /// Recomputes distances from `sources`, never expanding blocked cells.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        width: u32,
        height: u32,
        sources: &[CellCoord],
        mut is_blocked: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        self.distances.clear();
        self.distances.resize(cell_count, u32::MAX);
        if cell_count == 0 {
            return;
        }

        let mut queue = VecDeque::new();
        for &source in sources {
            if source.column() >= width || source.row() >= height || is_blocked(source) {
                continue;
            }

            if let Some(index) = index(width_usize, source) {
                if self.distances[index] == 0 {
                    continue;
                }
                self.distances[index] = 0;
                queue.push_back(source);
            }
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width_usize, cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell, width, height) {
                if is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(width_usize, neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance recorded for the cell, `None` when unreachable or outside.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        index(width, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Reachable cells with their distances in row-major order.
    pub(crate) fn reachable(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        let width = self.width.max(1);
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, distance)| **distance != u32::MAX)
            .map(move |(offset, distance)| {
                let offset = offset as u32;
                (CellCoord::new(offset % width, offset / width), *distance)
            })
    }

    /// Reachable cell with the largest distance; ties resolve to the
    /// earliest cell in row-major order.
    #[must_use]
    pub(crate) fn farthest(&self) -> Option<(CellCoord, u32)> {
        self.reachable()
            .fold(None, |best: Option<(CellCoord, u32)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            })
    }

    /// Walks downhill from `cell` back to a source, returning the visited
    /// cells starting with `cell` itself.
    #[must_use]
    pub(crate) fn descend_from(&self, cell: CellCoord) -> Vec<CellCoord> {
        let mut trail = Vec::new();
        let Some(mut distance) = self.distance(cell) else {
            return trail;
        };

        let mut cursor = cell;
        trail.push(cursor);
        while distance > 0 {
            let Some(next) = neighbors(cursor, self.width, self.height)
                .find(|neighbor| self.distance(*neighbor) == Some(distance - 1))
            else {
                break;
            };
            cursor = next;
            distance -= 1;
            trail.push(cursor);
        }

        trail
    }
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_start_at_zero() {
        let field = DistanceField::build(3, 4, &[CellCoord::new(1, 2)], |_| false);

        assert_eq!(field.distance(CellCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(3));
    }

    #[test]
    fn blocked_cells_stay_unreachable() {
        let wall = CellCoord::new(1, 1);
        let field = DistanceField::build(3, 4, &[CellCoord::new(1, 2)], |cell| cell == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn farthest_and_descent_trace_a_shortest_route() {
        let field = DistanceField::build(4, 1, &[CellCoord::new(0, 0)], |_| false);

        assert_eq!(field.farthest(), Some((CellCoord::new(3, 0), 3)));
        assert_eq!(
            field.descend_from(CellCoord::new(3, 0)),
            vec![
                CellCoord::new(3, 0),
                CellCoord::new(2, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 0)
            ]
        );
    }
}
