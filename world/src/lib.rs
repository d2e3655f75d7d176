#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Quest.
//!
//! The world owns every entity collection. Player intents are applied through
//! [`apply`], systems borrow the collections for the duration of one tick via
//! [`tick_parts`], and read-only access goes through the [`query`] module.

mod level;
mod navigation;

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use maze_quest_core::{
    AchievementId, CellCoord, Combatant, CombatEvent, Command, Direction, Enemy, EnemyId,
    EnemyKind, Event, GameStatus, GridCell, GridMap, ItemKind, Launch, MazeReference, Player,
    Projectile, ProjectileId, QuestId, SaveSnapshot, SimError, Stats, Weapon, POTION_HEAL,
    TRAP_DAMAGE,
};

pub use level::{Level, LevelError, MIN_GENERATED_SIDE};

/// Represents the authoritative Maze Quest world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: GridMap,
    maze: MazeReference,
    player: Player,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    pickups: BTreeMap<CellCoord, ItemKind>,
    stats: Stats,
    achievements: BTreeSet<AchievementId>,
    quests: BTreeSet<QuestId>,
    pending_attacks: Vec<Weapon>,
    status: GameStatus,
    hostile_level: bool,
    boss_level: bool,
    elapsed: Duration,
    tick_index: u64,
    next_enemy: u32,
    next_projectile: u32,
}

impl World {
    /// Creates a world populated from `level`.
    ///
    /// `maze` is stored verbatim so snapshots can rebuild the same level.
    #[must_use]
    pub fn from_level(level: &Level, maze: MazeReference) -> Self {
        let mut world = Self {
            grid: level.grid().clone(),
            maze,
            player: Player::new(level.player_start()),
            enemies: Vec::with_capacity(level.enemies().len()),
            projectiles: Vec::new(),
            pickups: level.pickups().iter().copied().collect(),
            stats: Stats::default(),
            achievements: BTreeSet::new(),
            quests: BTreeSet::new(),
            pending_attacks: Vec::new(),
            status: GameStatus::Running,
            hostile_level: !level.enemies().is_empty(),
            boss_level: level
                .enemies()
                .iter()
                .any(|(kind, _)| *kind == EnemyKind::Boss),
            elapsed: Duration::ZERO,
            tick_index: 0,
            next_enemy: 1,
            next_projectile: 1,
        };

        for &(kind, cell) in level.enemies() {
            let id = world.allocate_enemy_id();
            world.enemies.push(Enemy::spawn(id, kind, cell));
        }

        world
    }

    /// Creates a world inside a freshly generated maze.
    #[must_use]
    pub fn generated(seed: u64, columns: u32, rows: u32) -> Self {
        let level = Level::generate(seed, columns, rows);
        Self::from_level(
            &level,
            MazeReference::Generated {
                seed,
                columns,
                rows,
            },
        )
    }

    /// Creates a world from an ASCII layout.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let level = Level::parse(rows)?;
        let maze = MazeReference::Layout {
            rows: rows.iter().map(|row| row.as_ref().to_owned()).collect(),
        };
        Ok(Self::from_level(&level, maze))
    }

    /// Creates a world for the maze a reference points at.
    pub fn from_reference(maze: &MazeReference) -> Result<Self, LevelError> {
        let level = Level::from_reference(maze)?;
        Ok(Self::from_level(&level, maze.clone()))
    }

    /// Restores an equivalent session from a snapshot.
    ///
    /// The maze is rebuilt from its reference with its original enemies and
    /// pickups; player attributes, inventory, statistics and progression are
    /// taken from the snapshot. A recorded cell that is no longer standable
    /// falls back to the level's start cell.
    pub fn restore(snapshot: &SaveSnapshot) -> Result<Self, LevelError> {
        let mut world = Self::from_reference(&snapshot.maze)?;
        let start = world.player.cell();
        world.player = Player::from_record(&snapshot.player, snapshot.inventory);
        if !matches!(
            world.grid.cell_at(world.player.cell()),
            Ok(GridCell::Empty | GridCell::Mirror | GridCell::Trap | GridCell::Door)
        ) {
            world.player.set_cell(start);
        }
        world.stats = snapshot.stats;
        world.achievements = snapshot.achievements.iter().copied().collect();
        world.quests = snapshot.quests.iter().copied().collect();
        Ok(world)
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        id
    }

    fn move_player(&mut self, dx: i32, dy: i32, out_events: &mut Vec<Event>) -> Result<(), SimError> {
        let (dx, dy) = (dx.clamp(-1, 1), dy.clamp(-1, 1));
        let Some(facing) = Direction::from_delta(dx, dy) else {
            return Ok(());
        };
        self.player.face(facing);

        let from = self.player.cell();
        let Some(to) = from.offset(dx, dy).filter(|cell| self.grid.contains(*cell)) else {
            tracing::debug!(?from, dx, dy, "move blocked by maze edge");
            return Ok(());
        };
        if !self
            .grid
            .is_walkable(to, self.player.inventory().has_key())?
        {
            tracing::debug!(?from, ?to, "move blocked");
            return Ok(());
        }

        self.player.set_cell(to);
        out_events.push(Event::PlayerMoved { from, to });

        if self.grid.cell_at(to)? == GridCell::Trap {
            let outcome = self.player.take_damage(TRAP_DAMAGE);
            out_events.push(Event::TrapTriggered {
                cell: to,
                damage: outcome.dealt,
            });
            out_events.push(Event::Combat(CombatEvent {
                attacker: Combatant::Trap(to),
                target: Combatant::Player,
                damage: outcome.dealt,
                killed: outcome.killed,
            }));
        }

        if let Some(item) = self.pickups.remove(&to) {
            self.player.inventory_mut().add(item, 1);
            out_events.push(Event::ItemCollected { item, cell: to });
        }

        Ok(())
    }

    fn use_item(&mut self, item: ItemKind, out_events: &mut Vec<Event>) {
        match item {
            ItemKind::Potion => {
                if self.player.health() >= self.player.max_health() {
                    tracing::debug!("potion skipped at full health");
                    return;
                }
                if let Err(error) = self.player.inventory_mut().take(ItemKind::Potion) {
                    tracing::debug!(%error, "potion use ignored");
                    return;
                }
                let _ = self.player.heal(POTION_HEAL);
                out_events.push(Event::ItemUsed { item });
            }
            ItemKind::Bomb => self.pending_attacks.push(Weapon::Bomb),
            ItemKind::Key => tracing::debug!("keys open doors passively"),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Attacks are only queued here; the combat resolver drains them through
/// [`take_pending_attacks`]. Commands arriving after the session finished are
/// ignored. Fails with [`SimError::OutOfBounds`] only when the grid is queried
/// outside its dimensions, which bounds checks are expected to prevent.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> Result<(), SimError> {
    if world.status.is_finished() {
        return Ok(());
    }

    match command {
        Command::Move { dx, dy } => {
            if world.player.inventory_open() {
                tracing::debug!("movement ignored while the inventory is open");
                return Ok(());
            }
            world.move_player(dx, dy, out_events)?;
        }
        Command::Attack => {
            if world.player.inventory_open() {
                tracing::debug!("attack ignored while the inventory is open");
                return Ok(());
            }
            world.pending_attacks.push(world.player.weapon());
        }
        Command::ToggleInventory => {
            let open = world.player.toggle_inventory();
            out_events.push(Event::InventoryToggled { open });
        }
        Command::UseItem { item } => world.use_item(item, out_events),
        Command::SelectWeapon { weapon } => {
            if world.player.weapon() != weapon {
                world.player.select_weapon(weapon);
                out_events.push(Event::WeaponSelected { weapon });
            }
        }
        Command::Quit => {
            tracing::info!(tick = world.tick_index, "quit requested");
            world.status = GameStatus::Quit;
        }
    }

    Ok(())
}

/// Advances the simulated clock by one tick of length `dt`.
pub fn begin_tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    world.tick_index = world.tick_index.saturating_add(1);
    world.elapsed = world.elapsed.saturating_add(dt);
    out_events.push(Event::TimeAdvanced { dt });
}

/// Removes and returns the attacks queued since the last call, oldest first.
pub fn take_pending_attacks(world: &mut World) -> Vec<Weapon> {
    std::mem::take(&mut world.pending_attacks)
}

/// Spawns a projectile, assigning it the next identifier.
pub fn launch(world: &mut World, launch: Launch, out_events: &mut Vec<Event>) -> ProjectileId {
    let id = world.allocate_projectile_id();
    let owner = launch.owner();
    world.projectiles.push(launch.into_projectile(id));
    out_events.push(Event::ProjectileSpawned {
        projectile: id,
        owner,
    });
    id
}

/// Compacts the enemy list, announcing every enemy that ran out of health.
pub fn remove_defeated(world: &mut World, out_events: &mut Vec<Event>) {
    world.enemies.retain(|enemy| {
        if enemy.is_alive() {
            return true;
        }
        out_events.push(Event::EnemyDefeated {
            enemy: enemy.id(),
            kind: enemy.kind(),
            cell: enemy.cell(),
        });
        false
    });
}

/// Settles victory or defeat once per session.
///
/// Defeat wins over victory when both happen in the same tick. A level
/// without a boss is won by clearing every enemy; a level that never had
/// enemies cannot be won.
pub fn resolve_outcome(world: &mut World, out_events: &mut Vec<Event>) -> GameStatus {
    if world.status.is_finished() {
        return world.status;
    }

    if !world.player.is_alive() {
        tracing::info!(tick = world.tick_index, "player defeated");
        world.status = GameStatus::Defeat;
        out_events.push(Event::PlayerDefeated);
    } else if world.hostile_level && is_cleared(world) {
        tracing::info!(tick = world.tick_index, "level cleared");
        world.status = GameStatus::Victory;
        out_events.push(Event::PlayerVictory);
    }

    world.status
}

fn is_cleared(world: &World) -> bool {
    if world.boss_level {
        !world
            .enemies
            .iter()
            .any(|enemy| enemy.kind() == EnemyKind::Boss)
    } else {
        world.enemies.is_empty()
    }
}

/// Mutable borrows of the entity collections handed to systems for one tick.
#[derive(Debug)]
pub struct TickParts<'a> {
    /// Static maze layout.
    pub grid: &'a GridMap,
    /// The player.
    pub player: &'a mut Player,
    /// Enemies, including ones defeated earlier in the current tick.
    pub enemies: &'a mut [Enemy],
    /// In-flight projectiles.
    pub projectiles: &'a mut Vec<Projectile>,
    /// Session statistics.
    pub stats: &'a mut Stats,
    /// Achievements unlocked so far.
    pub achievements: &'a mut BTreeSet<AchievementId>,
    /// Quests completed so far.
    pub quests: &'a mut BTreeSet<QuestId>,
    /// Simulated time elapsed including the current tick.
    pub elapsed: Duration,
}

/// Splits the world into disjoint borrows for the systems of one tick.
pub fn tick_parts(world: &mut World) -> TickParts<'_> {
    TickParts {
        grid: &world.grid,
        player: &mut world.player,
        enemies: &mut world.enemies,
        projectiles: &mut world.projectiles,
        stats: &mut world.stats,
        achievements: &mut world.achievements,
        quests: &mut world.quests,
        elapsed: world.elapsed,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_quest_core::{
        ActorTag, ActorView, CellCoord, Enemy, FrameView, GameStatus, GridMap, ItemKind,
        MazeReference, Player, Projectile, ProjectileView, SaveSnapshot, Stats,
    };

    use super::World;

    /// Provides read-only access to the maze layout.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Reference that rebuilds the current maze.
    #[must_use]
    pub fn maze(world: &World) -> &MazeReference {
        &world.maze
    }

    /// The player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Live enemies in identifier order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// In-flight projectiles in identifier order.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// Items lying on the floor, ordered by cell.
    pub fn pickups(world: &World) -> impl Iterator<Item = (CellCoord, ItemKind)> + '_ {
        world.pickups.iter().map(|(cell, item)| (*cell, *item))
    }

    /// Session statistics.
    #[must_use]
    pub fn stats(world: &World) -> &Stats {
        &world.stats
    }

    /// Session lifecycle.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures everything a renderer needs to draw the current state.
    #[must_use]
    pub fn frame(world: &World) -> FrameView<'_> {
        let player = ActorView {
            tag: ActorTag::Player,
            cell: world.player.cell(),
            facing: world.player.facing(),
            health: world.player.health(),
            max_health: world.player.max_health(),
        };
        let actors = std::iter::once(player)
            .chain(world.enemies.iter().filter(|enemy| enemy.is_alive()).map(|enemy| {
                ActorView {
                    tag: ActorTag::Enemy {
                        id: enemy.id(),
                        kind: enemy.kind(),
                    },
                    cell: enemy.cell(),
                    facing: enemy.facing(),
                    health: enemy.health(),
                    max_health: enemy.max_health(),
                }
            }))
            .collect();
        let projectiles = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileView {
                id: projectile.id(),
                owner: projectile.owner(),
                position: projectile.position(),
                trail: projectile.trail().collect(),
            })
            .collect();

        FrameView {
            tick: world.tick_index,
            elapsed: world.elapsed,
            grid: &world.grid,
            actors,
            projectiles,
            pickups: pickups(world).collect(),
            inventory: *world.player.inventory(),
            inventory_open: world.player.inventory_open(),
            status: world.status,
        }
    }

    /// Serialisable state sufficient to restore an equivalent session.
    #[must_use]
    pub fn snapshot(world: &World) -> SaveSnapshot {
        SaveSnapshot {
            maze: world.maze.clone(),
            player: world.player.record(),
            inventory: *world.player.inventory(),
            stats: world.stats,
            achievements: world.achievements.iter().copied().collect(),
            quests: world.quests.iter().copied().collect(),
        }
    }
}
