//! Level layouts: ASCII parsing and seeded maze generation.

use std::collections::BTreeSet;

use maze_quest_core::{CellCoord, EnemyKind, GridCell, GridMap, ItemKind, MazeReference};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::navigation::DistanceField;

/// Smallest side length accepted by the maze generator.
pub const MIN_GENERATED_SIDE: u32 = 7;

const PLAYER_START: CellCoord = CellCoord::new(1, 1);
const LOOP_DIVISOR: usize = 10;
const HOSTILE_MIN_DISTANCE: u32 = 6;
const HAZARD_MIN_DISTANCE: u32 = 3;
const FLOOR_BOMBS: usize = 2;
const FLOOR_POTIONS: usize = 2;

/// Failures raised while parsing an ASCII layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The layout has no rows or its first row is empty.
    #[error("layout is empty")]
    EmptyLayout,
    /// A row is shorter or longer than the first one.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A glyph outside the layout alphabet was found.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
    },
    /// No `P` glyph was found.
    #[error("layout has no player start")]
    MissingPlayer,
    /// More than one `P` glyph was found.
    #[error("layout has more than one player start")]
    MultiplePlayers,
}

/// Maze contents before any actor has moved.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    grid: GridMap,
    player_start: CellCoord,
    enemies: Vec<(EnemyKind, CellCoord)>,
    pickups: Vec<(CellCoord, ItemKind)>,
}

impl Level {
    /// Parses an ASCII layout.
    ///
    /// `#` wall, `.` floor, `M` mirror, `^` trap, `D` door, `P` player start,
    /// `c` chaser, `r` ranged shooter, `B` boss, `k` key, `b` bomb and `h`
    /// potion. Actors and items stand on floor cells.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let expected = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .filter(|width| *width > 0)
            .ok_or(LevelError::EmptyLayout)?;

        let mut cells = Vec::with_capacity(expected * rows.len());
        let mut player_start = None;
        let mut enemies = Vec::new();
        let mut pickups = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let row_index = row_index as u32;
            let width = row.as_ref().chars().count();
            if width != expected {
                return Err(LevelError::RaggedRow {
                    row: row_index,
                    expected: expected as u32,
                    found: width as u32,
                });
            }

            for (column_index, glyph) in row.as_ref().chars().enumerate() {
                let cell = CellCoord::new(column_index as u32, row_index);
                let tile = match glyph {
                    '#' => GridCell::Wall,
                    '.' => GridCell::Empty,
                    'M' => GridCell::Mirror,
                    '^' => GridCell::Trap,
                    'D' => GridCell::Door,
                    'P' => {
                        if player_start.replace(cell).is_some() {
                            return Err(LevelError::MultiplePlayers);
                        }
                        GridCell::Empty
                    }
                    'c' | 'r' | 'B' => {
                        let kind = match glyph {
                            'c' => EnemyKind::Chaser,
                            'r' => EnemyKind::Ranged,
                            _ => EnemyKind::Boss,
                        };
                        enemies.push((kind, cell));
                        GridCell::Empty
                    }
                    'k' | 'b' | 'h' => {
                        let item = match glyph {
                            'k' => ItemKind::Key,
                            'b' => ItemKind::Bomb,
                            _ => ItemKind::Potion,
                        };
                        pickups.push((cell, item));
                        GridCell::Empty
                    }
                    other => {
                        return Err(LevelError::UnknownGlyph {
                            glyph: other,
                            column: column_index as u32,
                            row: row_index,
                        })
                    }
                };
                cells.push(tile);
            }
        }

        let player_start = player_start.ok_or(LevelError::MissingPlayer)?;
        let columns = expected as u32;
        let mut tiles = cells.into_iter();
        let grid = GridMap::from_fn(columns, rows.len() as u32, |_| {
            tiles.next().unwrap_or(GridCell::Wall)
        });

        Ok(Self {
            grid,
            player_start,
            enemies,
            pickups,
        })
    }

    /// Generates a maze with a recursive backtracker seeded by `seed`.
    ///
    /// Dimensions are raised to at least [`MIN_GENERATED_SIDE`] and forced
    /// odd. The same seed and dimensions always produce the same level.
    #[must_use]
    pub fn generate(seed: u64, columns: u32, rows: u32) -> Self {
        let columns = odd_side(columns);
        let rows = odd_side(rows);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut canvas = Canvas::walled(columns, rows);

        canvas.carve(&mut rng);
        canvas.open_loops(&mut rng);
        canvas.decorate(&mut rng)
    }

    /// Rebuilds the level a [`MazeReference`] points at.
    pub fn from_reference(reference: &MazeReference) -> Result<Self, LevelError> {
        match reference {
            MazeReference::Generated {
                seed,
                columns,
                rows,
            } => Ok(Self::generate(*seed, *columns, *rows)),
            MazeReference::Layout { rows } => Self::parse(rows),
        }
    }

    /// Static maze layout.
    #[must_use]
    pub const fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn player_start(&self) -> CellCoord {
        self.player_start
    }

    /// Enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[(EnemyKind, CellCoord)] {
        &self.enemies
    }

    /// Items lying on the floor.
    #[must_use]
    pub fn pickups(&self) -> &[(CellCoord, ItemKind)] {
        &self.pickups
    }
}

fn odd_side(value: u32) -> u32 {
    let value = value.max(MIN_GENERATED_SIDE);
    if value % 2 == 0 {
        value.saturating_add(1)
    } else {
        value
    }
}

struct Canvas {
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

impl Canvas {
    fn walled(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![GridCell::Wall; count],
        }
    }

    fn get(&self, cell: CellCoord) -> GridCell {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(GridCell::Wall)
    }

    fn set(&mut self, cell: CellCoord, tile: GridCell) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = tile;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * width + column)
    }

    fn is_interior(&self, cell: CellCoord) -> bool {
        cell.column() > 0
            && cell.row() > 0
            && cell.column() + 1 < self.columns
            && cell.row() + 1 < self.rows
    }

    fn is_open(&self, cell: Option<CellCoord>) -> bool {
        cell.map_or(false, |cell| self.get(cell) != GridCell::Wall)
    }

    fn carve(&mut self, rng: &mut ChaCha8Rng) {
        self.set(PLAYER_START, GridCell::Empty);
        let mut stack = vec![PLAYER_START];

        while let Some(&current) = stack.last() {
            let candidates: Vec<(CellCoord, CellCoord)> = [(0, -2), (2, 0), (0, 2), (-2, 0)]
                .into_iter()
                .filter_map(|(dx, dy)| {
                    let target = current.offset(dx, dy)?;
                    let between = current.offset(dx / 2, dy / 2)?;
                    (self.is_interior(target) && self.get(target) == GridCell::Wall)
                        .then_some((between, target))
                })
                .collect();

            if candidates.is_empty() {
                let _ = stack.pop();
                continue;
            }

            let (between, target) = candidates[rng.gen_range(0..candidates.len())];
            self.set(between, GridCell::Empty);
            self.set(target, GridCell::Empty);
            stack.push(target);
        }
    }

    fn open_loops(&mut self, rng: &mut ChaCha8Rng) {
        let mut separators: Vec<CellCoord> = Vec::new();
        for row in 1..self.rows.saturating_sub(1) {
            for column in 1..self.columns.saturating_sub(1) {
                let cell = CellCoord::new(column, row);
                if self.get(cell) != GridCell::Wall {
                    continue;
                }
                let horizontal =
                    self.is_open(cell.offset(-1, 0)) && self.is_open(cell.offset(1, 0));
                let vertical = self.is_open(cell.offset(0, -1)) && self.is_open(cell.offset(0, 1));
                if horizontal != vertical {
                    separators.push(cell);
                }
            }
        }

        separators.shuffle(rng);
        let count = separators.len() / LOOP_DIVISOR;
        for cell in separators.into_iter().take(count) {
            self.set(cell, GridCell::Empty);
        }
    }

    fn decorate(mut self, rng: &mut ChaCha8Rng) -> Level {
        let field = DistanceField::build(self.columns, self.rows, &[PLAYER_START], |cell| {
            self.get(cell) == GridCell::Wall
        });
        let mut occupied = BTreeSet::from([PLAYER_START]);
        let mut enemies = Vec::new();
        let mut pickups = Vec::new();

        let boss_cell = field
            .farthest()
            .map(|(cell, _)| cell)
            .filter(|cell| *cell != PLAYER_START);
        if let Some(boss_cell) = boss_cell {
            let _ = occupied.insert(boss_cell);

            if let Some(door) = self.door_between(&field, boss_cell) {
                self.set(door, GridCell::Door);
                let _ = occupied.insert(door);

                let region = DistanceField::build(self.columns, self.rows, &[PLAYER_START], |cell| {
                    matches!(self.get(cell), GridCell::Wall | GridCell::Door)
                });
                let mut key_spots: Vec<CellCoord> = region
                    .reachable()
                    .filter(|(cell, distance)| *distance >= 2 && !occupied.contains(cell))
                    .map(|(cell, _)| cell)
                    .collect();
                key_spots.shuffle(rng);
                if let Some(key) = key_spots.first().copied() {
                    let _ = occupied.insert(key);
                    pickups.push((key, ItemKind::Key));
                }
            }
        }

        let open_cells = field.reachable().count();
        let mut pool: Vec<(CellCoord, u32)> = field
            .reachable()
            .filter(|(cell, _)| !occupied.contains(cell))
            .collect();
        pool.shuffle(rng);

        for cell in take_cells(&mut pool, HAZARD_MIN_DISTANCE, open_cells / 30) {
            self.set(cell, GridCell::Trap);
        }
        for cell in take_cells(&mut pool, HAZARD_MIN_DISTANCE, open_cells / 45) {
            self.set(cell, GridCell::Mirror);
        }
        for cell in take_cells(&mut pool, HOSTILE_MIN_DISTANCE, (open_cells / 40).max(1)) {
            enemies.push((EnemyKind::Chaser, cell));
        }
        for cell in take_cells(&mut pool, HOSTILE_MIN_DISTANCE, (open_cells / 60).max(1)) {
            enemies.push((EnemyKind::Ranged, cell));
        }
        if let Some(boss_cell) = boss_cell {
            enemies.push((EnemyKind::Boss, boss_cell));
        }
        for cell in take_cells(&mut pool, 1, FLOOR_BOMBS) {
            pickups.push((cell, ItemKind::Bomb));
        }
        for cell in take_cells(&mut pool, 1, FLOOR_POTIONS) {
            pickups.push((cell, ItemKind::Potion));
        }

        let mut tiles = self.cells.into_iter();
        let grid = GridMap::from_fn(self.columns, self.rows, |_| {
            tiles.next().unwrap_or(GridCell::Wall)
        });

        Level {
            grid,
            player_start: PLAYER_START,
            enemies,
            pickups,
        }
    }

    /// Picks a corridor cell roughly halfway along the route to `goal`.
    fn door_between(&self, field: &DistanceField, goal: CellCoord) -> Option<CellCoord> {
        let trail = field.descend_from(goal);
        if trail.len() < 4 {
            return None;
        }

        let middle = trail.len() / 2;
        let inner = &trail[1..trail.len() - 1];
        inner
            .iter()
            .skip(middle - 1)
            .chain(inner.iter().take(middle - 1).rev())
            .copied()
            .find(|cell| self.is_corridor(*cell))
    }

    fn is_corridor(&self, cell: CellCoord) -> bool {
        let north = self.is_open(cell.offset(0, -1));
        let south = self.is_open(cell.offset(0, 1));
        let east = self.is_open(cell.offset(1, 0));
        let west = self.is_open(cell.offset(-1, 0));
        (north && south && !east && !west) || (east && west && !north && !south)
    }
}

fn take_cells(pool: &mut Vec<(CellCoord, u32)>, min_distance: u32, count: usize) -> Vec<CellCoord> {
    let mut taken = Vec::with_capacity(count);
    let mut index = 0;
    while taken.len() < count && index < pool.len() {
        if pool[index].1 >= min_distance {
            taken.push(pool.remove(index).0);
        } else {
            index += 1;
        }
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_tiles_actors_and_items() {
        let level = Level::parse(&["#####", "#P.c#", "#^MDk", "#####"]).expect("valid layout");

        assert_eq!(level.grid().columns(), 5);
        assert_eq!(level.grid().rows(), 4);
        assert_eq!(level.player_start(), CellCoord::new(1, 1));
        assert_eq!(level.enemies(), &[(EnemyKind::Chaser, CellCoord::new(3, 1))]);
        assert_eq!(level.pickups(), &[(CellCoord::new(4, 2), ItemKind::Key)]);
        assert_eq!(level.grid().cell_at(CellCoord::new(1, 2)), Ok(GridCell::Trap));
        assert_eq!(level.grid().cell_at(CellCoord::new(2, 2)), Ok(GridCell::Mirror));
        assert_eq!(level.grid().cell_at(CellCoord::new(3, 2)), Ok(GridCell::Door));
        assert_eq!(level.grid().cell_at(CellCoord::new(3, 1)), Ok(GridCell::Empty));
    }

    #[test]
    fn parse_rejects_malformed_layouts() {
        let empty: [&str; 0] = [];
        assert_eq!(Level::parse(&empty), Err(LevelError::EmptyLayout));
        assert_eq!(
            Level::parse(&["P..", ".."]),
            Err(LevelError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            Level::parse(&["P.x"]),
            Err(LevelError::UnknownGlyph {
                glyph: 'x',
                column: 2,
                row: 0
            })
        );
        assert_eq!(Level::parse(&["..."]), Err(LevelError::MissingPlayer));
        assert_eq!(Level::parse(&["P.P"]), Err(LevelError::MultiplePlayers));
    }

    #[test]
    fn generated_dimensions_are_odd_and_bounded() {
        let level = Level::generate(3, 4, 10);
        assert_eq!(level.grid().columns(), 7);
        assert_eq!(level.grid().rows(), 11);
    }

    #[test]
    fn generation_is_deterministic_for_same_seed() {
        assert_eq!(Level::generate(99, 21, 15), Level::generate(99, 21, 15));
        assert_ne!(
            Level::generate(99, 21, 15).grid(),
            Level::generate(100, 21, 15).grid()
        );
    }

    #[test]
    fn generated_level_is_connected_and_populated() {
        let level = Level::generate(7, 21, 15);
        let grid = level.grid();
        let field = DistanceField::build(grid.columns(), grid.rows(), &[level.player_start()], |cell| {
            grid.cell_at(cell) == Ok(GridCell::Wall)
        });

        assert_eq!(grid.cell_at(level.player_start()), Ok(GridCell::Empty));
        assert!(level
            .enemies()
            .iter()
            .any(|(kind, _)| *kind == EnemyKind::Boss));
        for (_, cell) in level.enemies() {
            assert!(field.distance(*cell).is_some());
            assert_eq!(grid.cell_at(*cell), Ok(GridCell::Empty));
        }
        for (cell, _) in level.pickups() {
            assert!(field.distance(*cell).is_some());
        }
    }

    #[test]
    fn key_is_reachable_without_crossing_doors() {
        for seed in 0..8 {
            let level = Level::generate(seed, 15, 15);
            let grid = level.grid();
            let Some((key, _)) = level
                .pickups()
                .iter()
                .find(|(_, item)| *item == ItemKind::Key)
            else {
                continue;
            };

            let region =
                DistanceField::build(grid.columns(), grid.rows(), &[level.player_start()], |cell| {
                    matches!(grid.cell_at(cell), Ok(GridCell::Wall | GridCell::Door) | Err(_))
                });
            assert!(region.distance(*key).is_some(), "seed {seed}");
        }
    }

    #[test]
    fn reference_round_trips_to_the_same_level() {
        let reference = MazeReference::Generated {
            seed: 5,
            columns: 11,
            rows: 9,
        };
        assert_eq!(
            Level::from_reference(&reference),
            Ok(Level::generate(5, 11, 9))
        );
    }
}
