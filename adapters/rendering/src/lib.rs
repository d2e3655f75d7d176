#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation adapters for Maze Quest frames.
//!
//! A [`Scene`] translates a [`FrameView`] into positioned, coloured
//! presentations expressed in world units. Backends draw scenes; the crate
//! ships a terminal backend, [`AsciiRenderer`], that implements the core
//! [`Renderer`] contract.

use std::{error::Error, fmt, io::Write};

use glam::Vec2;
use maze_quest_core::{
    ActorTag, CellCoord, CollaboratorError, Direction, EnemyKind, FrameView, GameStatus,
    GridCell, Inventory, ItemKind, ProjectileOwner, Renderer,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Channels quantised to bytes.
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        let quantise = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantise(self.red), quantise(self.green), quantise(self.blue))
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colours assigned to every drawable element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Floor cells.
    pub floor: Color,
    /// Wall cells.
    pub wall: Color,
    /// Mirror cells.
    pub mirror: Color,
    /// Trap cells.
    pub trap: Color,
    /// Door cells.
    pub door: Color,
    /// The player.
    pub player: Color,
    /// Chasing enemies.
    pub chaser: Color,
    /// Ranged enemies.
    pub ranged: Color,
    /// The boss.
    pub boss: Color,
    /// Player arrows.
    pub arrow: Color,
    /// Enemy shots.
    pub enemy_shot: Color,
    /// Bombs waiting to detonate.
    pub bomb: Color,
    /// Items lying on the floor.
    pub pickup: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            floor: Color::from_rgb_u8(48, 44, 40),
            wall: Color::from_rgb_u8(110, 104, 96),
            mirror: Color::from_rgb_u8(120, 180, 220),
            trap: Color::from_rgb_u8(170, 60, 40),
            door: Color::from_rgb_u8(150, 100, 40),
            player: Color::from_rgb_u8(90, 200, 90),
            chaser: Color::from_rgb_u8(220, 70, 70),
            ranged: Color::from_rgb_u8(220, 150, 60),
            boss: Color::from_rgb_u8(180, 60, 200),
            arrow: Color::from_rgb_u8(240, 240, 200),
            enemy_shot: Color::from_rgb_u8(255, 120, 80),
            bomb: Color::from_rgb_u8(30, 30, 30),
            pickup: Color::from_rgb_u8(230, 210, 80),
        }
    }
}

/// Dimensions of the maze expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the maze.
    pub columns: u32,
    /// Number of rows contained in the maze.
    pub rows: u32,
    /// Length of a single cell edge in world units.
    pub cell_length: f32,
}

impl TileGridPresentation {
    /// Creates a new grid descriptor.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, RenderingError> {
        if !(cell_length.is_finite() && cell_length > 0.0) {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Width of the maze in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Height of the maze in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Converts a position in cell units to world units.
    #[must_use]
    pub fn to_world(&self, position: Vec2) -> Vec2 {
        position * self.cell_length
    }

    /// Upper-left corner of `cell` in world units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_length
    }

    /// Clamps the provided world position to the maze bounds.
    #[must_use]
    pub fn clamp_world_position(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width()),
            position.y.clamp(0.0, self.height()),
        )
    }

    /// Cell containing a world position, if it lies inside the maze.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> Option<CellCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.cell_length).floor() as u32;
        let row = (position.y / self.cell_length).floor() as u32;
        (column < self.columns && row < self.rows).then(|| CellCoord::new(column, row))
    }
}

/// Static maze cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Cell being described.
    pub cell: CellCoord,
    /// Upper-left corner in world units.
    pub origin: Vec2,
    /// Fill color.
    pub color: Color,
    /// Terminal glyph.
    pub glyph: char,
}

/// Live actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Cell occupied by the actor.
    pub cell: CellCoord,
    /// Centre of the actor in world units.
    pub center: Vec2,
    /// Direction the actor faces.
    pub facing: Direction,
    /// Remaining health as a fraction of the maximum.
    pub health_fraction: f32,
    /// Body color.
    pub color: Color,
    /// Terminal glyph.
    pub glyph: char,
}

/// In-flight projectile together with its fading trail.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Position in world units.
    pub position: Vec2,
    /// Recent positions in world units, oldest first.
    pub trail: Vec<Vec2>,
    /// Body color.
    pub color: Color,
    /// Terminal glyph.
    pub glyph: char,
}

/// Item lying on the floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupPresentation {
    /// Cell holding the item.
    pub cell: CellCoord,
    /// Kind of item.
    pub item: ItemKind,
    /// Body color.
    pub color: Color,
    /// Terminal glyph.
    pub glyph: char,
}

/// Status line shown next to the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Tick that produced the frame.
    pub tick: u64,
    /// Player health.
    pub health: u32,
    /// Player maximum health.
    pub max_health: u32,
    /// Items carried by the player.
    pub inventory: Inventory,
    /// Whether the inventory overlay is open.
    pub inventory_open: bool,
    /// Session lifecycle.
    pub status: GameStatus,
}

/// Scene description combining the maze, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Maze dimensions.
    pub tile_grid: TileGridPresentation,
    /// Maze cells in row-major order.
    pub cells: Vec<CellPresentation>,
    /// Items lying on the floor.
    pub pickups: Vec<PickupPresentation>,
    /// Projectiles in identifier order.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Actors, player first.
    pub actors: Vec<ActorPresentation>,
    /// Status line.
    pub hud: HudPresentation,
}

impl Scene {
    /// Builds a scene from a simulation frame.
    #[must_use]
    pub fn from_frame(
        frame: &FrameView<'_>,
        tile_grid: TileGridPresentation,
        palette: &Palette,
    ) -> Self {
        let cells = frame
            .grid
            .iter()
            .map(|(cell, kind)| {
                let (color, glyph) = match kind {
                    GridCell::Empty => (palette.floor, '.'),
                    GridCell::Wall => (palette.wall, '#'),
                    GridCell::Mirror => (palette.mirror, 'M'),
                    GridCell::Trap => (palette.trap, '^'),
                    GridCell::Door => (palette.door, 'D'),
                };
                CellPresentation {
                    cell,
                    origin: tile_grid.cell_origin(cell),
                    color,
                    glyph,
                }
            })
            .collect();

        let pickups = frame
            .pickups
            .iter()
            .map(|&(cell, item)| PickupPresentation {
                cell,
                item,
                color: palette.pickup,
                glyph: item_glyph(item),
            })
            .collect();

        let projectiles = frame
            .projectiles
            .iter()
            .map(|projectile| {
                let (color, glyph) = match projectile.owner {
                    ProjectileOwner::Player => (palette.arrow, '*'),
                    ProjectileOwner::Enemy(_) => (palette.enemy_shot, 'o'),
                    ProjectileOwner::Bomb => (palette.bomb, '@'),
                };
                ProjectilePresentation {
                    position: tile_grid.to_world(projectile.position),
                    trail: projectile
                        .trail
                        .iter()
                        .map(|point| tile_grid.to_world(*point))
                        .collect(),
                    color,
                    glyph,
                }
            })
            .collect();

        let actors = frame
            .actors
            .iter()
            .map(|actor| {
                let (color, glyph) = match actor.tag {
                    ActorTag::Player => (palette.player, facing_glyph(actor.facing)),
                    ActorTag::Enemy { kind, .. } => match kind {
                        EnemyKind::Chaser => (palette.chaser, 'c'),
                        EnemyKind::Ranged => (palette.ranged, 'r'),
                        EnemyKind::Boss => (palette.boss, 'B'),
                    },
                };
                let health_fraction = if actor.max_health.get() == 0 {
                    0.0
                } else {
                    actor.health.get() as f32 / actor.max_health.get() as f32
                };
                ActorPresentation {
                    cell: actor.cell,
                    center: tile_grid.to_world(actor.cell.center()),
                    facing: actor.facing,
                    health_fraction,
                    color,
                    glyph,
                }
            })
            .collect();

        let (health, max_health) = frame
            .actors
            .iter()
            .find(|actor| actor.tag == ActorTag::Player)
            .map_or((0, 0), |player| {
                (player.health.get(), player.max_health.get())
            });

        Self {
            tile_grid,
            cells,
            pickups,
            projectiles,
            actors,
            hud: HudPresentation {
                tick: frame.tick,
                health,
                max_health,
                inventory: frame.inventory,
                inventory_open: frame.inventory_open,
                status: frame.status,
            },
        }
    }

    /// Lays the scene out as rows of glyph and colour pairs.
    ///
    /// Later layers cover earlier ones: cells, pickups, projectiles, enemies
    /// and finally the player.
    #[must_use]
    pub fn glyph_rows(&self) -> Vec<Vec<(char, Color)>> {
        let columns = self.tile_grid.columns as usize;
        let mut rows = vec![Vec::with_capacity(columns); self.tile_grid.rows as usize];
        for cell in &self.cells {
            rows[cell.cell.row() as usize].push((cell.glyph, cell.color));
        }

        let mut stamp = |cell: CellCoord, glyph: char, color: Color| {
            if let Some(slot) = rows
                .get_mut(cell.row() as usize)
                .and_then(|row| row.get_mut(cell.column() as usize))
            {
                *slot = (glyph, color);
            }
        };

        for pickup in &self.pickups {
            stamp(pickup.cell, pickup.glyph, pickup.color);
        }
        for projectile in &self.projectiles {
            if let Some(cell) = self.tile_grid.world_to_cell(projectile.position) {
                stamp(cell, projectile.glyph, projectile.color);
            }
        }
        for actor in self.actors.iter().rev() {
            stamp(actor.cell, actor.glyph, actor.color);
        }

        rows
    }
}

fn item_glyph(item: ItemKind) -> char {
    match item {
        ItemKind::Key => 'k',
        ItemKind::Bomb => 'b',
        ItemKind::Potion => 'h',
    }
}

fn facing_glyph(facing: Direction) -> char {
    match facing {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

/// Terminal backend drawing scenes as text.
#[derive(Debug)]
pub struct AsciiRenderer<W> {
    out: W,
    palette: Palette,
    every: u64,
    ansi: bool,
}

impl<W: Write> AsciiRenderer<W> {
    /// Creates a renderer that draws every frame without colour.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            palette: Palette::default(),
            every: 1,
            ansi: false,
        }
    }

    /// Draws only every `every`-th tick; finished sessions are always drawn.
    #[must_use]
    pub fn with_interval(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }

    /// Enables 24-bit ANSI colour escapes.
    #[must_use]
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    /// Overrides the palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, scene: &Scene) -> std::io::Result<()> {
        let hud = scene.hud;
        writeln!(
            self.out,
            "tick {} | hp {}/{} | keys {} bombs {} potions {}{} | {:?}",
            hud.tick,
            hud.health,
            hud.max_health,
            hud.inventory.count(ItemKind::Key),
            hud.inventory.count(ItemKind::Bomb),
            hud.inventory.count(ItemKind::Potion),
            if hud.inventory_open { " [inventory]" } else { "" },
            hud.status,
        )?;

        for row in scene.glyph_rows() {
            let mut line = String::with_capacity(row.len());
            for (glyph, color) in row {
                if self.ansi {
                    let (red, green, blue) = color.to_rgb_u8();
                    line.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{glyph}"));
                } else {
                    line.push(glyph);
                }
            }
            if self.ansi {
                line.push_str("\x1b[0m");
            }
            writeln!(self.out, "{line}")?;
        }

        self.out.flush()
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), CollaboratorError> {
        if frame.tick % self.every != 0 && !frame.status.is_finished() {
            return Ok(());
        }

        let tile_grid = TileGridPresentation::new(frame.grid.columns(), frame.grid.rows(), 1.0)
            .map_err(|error| CollaboratorError::Failed {
                collaborator: "ascii renderer",
                reason: error.to_string(),
            })?;
        let scene = Scene::from_frame(frame, tile_grid, &self.palette);
        self.draw(&scene).map_err(|error| CollaboratorError::Unavailable {
            collaborator: "ascii renderer",
            reason: error.to_string(),
        })
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cells must have a positive, finite edge length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell length must be positive and finite (received {cell_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
