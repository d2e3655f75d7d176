//! Player and enemy actors.

use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    CellCoord, Direction, EnemyId, Health, ItemKind, PlayerRecord, SimError, Weapon,
    BOSS_ENRAGED_SPEED, BOSS_PHASE_THRESHOLD, PLAYER_MAX_HEALTH,
};

/// Result of applying damage to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed, never more than the health that remained.
    pub dealt: u32,
    /// Whether the damage eliminated the actor.
    pub killed: bool,
}

fn apply_damage(health: &mut Health, amount: u32) -> DamageOutcome {
    let before = *health;
    *health = before.saturating_sub(amount);
    DamageOutcome {
        dealt: before.get() - health.get(),
        killed: !before.is_depleted() && health.is_depleted(),
    }
}

/// Item counts carried by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    keys: u32,
    bombs: u32,
    potions: u32,
}

impl Inventory {
    /// Creates an inventory with explicit counts.
    #[must_use]
    pub const fn new(keys: u32, bombs: u32, potions: u32) -> Self {
        Self {
            keys,
            bombs,
            potions,
        }
    }

    /// Number of items of the provided kind.
    #[must_use]
    pub const fn count(&self, item: ItemKind) -> u32 {
        match item {
            ItemKind::Key => self.keys,
            ItemKind::Bomb => self.bombs,
            ItemKind::Potion => self.potions,
        }
    }

    /// Reports whether at least one key is held.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.keys > 0
    }

    /// Adds `amount` items of the provided kind.
    pub fn add(&mut self, item: ItemKind, amount: u32) {
        let slot = self.slot_mut(item);
        *slot = slot.saturating_add(amount);
    }

    /// Removes a single item, failing when none is held.
    pub fn take(&mut self, item: ItemKind) -> Result<(), SimError> {
        let slot = self.slot_mut(item);
        if *slot == 0 {
            return Err(SimError::ResourceUnavailable { item });
        }
        *slot -= 1;
        Ok(())
    }

    fn slot_mut(&mut self, item: ItemKind) -> &mut u32 {
        match item {
            ItemKind::Key => &mut self.keys,
            ItemKind::Bomb => &mut self.bombs,
            ItemKind::Potion => &mut self.potions,
        }
    }
}

/// The player-controlled actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    cell: CellCoord,
    health: Health,
    max_health: Health,
    speed: u32,
    facing: Direction,
    weapon: Weapon,
    weapon_level: u32,
    inventory: Inventory,
    inventory_open: bool,
}

impl Player {
    /// Creates a fresh player standing on the provided cell.
    #[must_use]
    pub fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            health: Health::new(PLAYER_MAX_HEALTH),
            max_health: Health::new(PLAYER_MAX_HEALTH),
            speed: 1,
            facing: Direction::South,
            weapon: Weapon::Sword,
            weapon_level: 1,
            inventory: Inventory::default(),
            inventory_open: false,
        }
    }

    /// Rebuilds a player from persisted state.
    #[must_use]
    pub fn from_record(record: &PlayerRecord, inventory: Inventory) -> Self {
        let max_health = record.max_health.max(Health::new(1));
        Self {
            cell: record.cell,
            health: record.health.min(max_health),
            max_health,
            speed: 1,
            facing: record.facing,
            weapon: record.weapon,
            weapon_level: record.weapon_level.max(1),
            inventory,
            inventory_open: false,
        }
    }

    /// Captures the persistable part of the player.
    #[must_use]
    pub fn record(&self) -> PlayerRecord {
        PlayerRecord {
            cell: self.cell,
            health: self.health,
            max_health: self.max_health,
            facing: self.facing,
            weapon: self.weapon,
            weapon_level: self.weapon_level,
        }
    }

    /// Cell occupied by the player.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Places the player on a new cell.
    pub fn set_cell(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> Health {
        self.max_health
    }

    /// Cells travelled per move intent.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Direction the player faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Turns the player toward a new direction.
    pub fn face(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Weapon used by attack actions.
    #[must_use]
    pub const fn weapon(&self) -> Weapon {
        self.weapon
    }

    /// Switches the active weapon.
    pub fn select_weapon(&mut self, weapon: Weapon) {
        self.weapon = weapon;
    }

    /// Current weapon level, at least one.
    #[must_use]
    pub const fn weapon_level(&self) -> u32 {
        self.weapon_level
    }

    /// Raises the weapon level by one.
    pub fn upgrade_weapon(&mut self) {
        self.weapon_level = self.weapon_level.saturating_add(1);
    }

    /// Carried items.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to carried items.
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Whether the inventory overlay is open.
    #[must_use]
    pub const fn inventory_open(&self) -> bool {
        self.inventory_open
    }

    /// Opens or closes the inventory overlay, returning the new state.
    pub fn toggle_inventory(&mut self) -> bool {
        self.inventory_open = !self.inventory_open;
        self.inventory_open
    }

    /// Whether the player has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Applies damage, flooring health at zero.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        apply_damage(&mut self.health, amount)
    }

    /// Restores health up to the maximum, returning the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = before.restored(amount, self.max_health);
        self.health.get() - before.get()
    }

    /// Raises the health ceiling and heals by the same amount.
    pub fn raise_max_health(&mut self, amount: u32) {
        self.max_health = Health::new(self.max_health.get().saturating_add(amount));
        let _ = self.heal(amount);
    }
}

/// Closed set of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Follows the player along A* routes.
    Chaser,
    /// Stationary shooter.
    Ranged,
    /// Two-phase drunken walker.
    Boss,
}

/// Base statistics shared by every enemy of a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Movement steps taken per tick.
    pub speed: u32,
    /// Damage dealt by contact attacks and shots.
    pub damage: u32,
}

impl EnemyKind {
    /// Base statistics of the kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Chaser => EnemyStats {
                health: 30,
                speed: 1,
                damage: 10,
            },
            Self::Ranged => EnemyStats {
                health: 20,
                speed: 0,
                damage: 5,
            },
            Self::Boss => EnemyStats {
                health: 200,
                speed: 2,
                damage: 20,
            },
        }
    }
}

/// Phases of the boss encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BossPhase {
    /// Opening phase.
    One,
    /// Enraged phase entered below the health threshold.
    Two,
}

impl BossPhase {
    /// Phase a boss with the provided health belongs in.
    #[must_use]
    pub const fn for_health(health: Health) -> Self {
        if health.get() < BOSS_PHASE_THRESHOLD {
            Self::Two
        } else {
            Self::One
        }
    }
}

/// Ordered cells an enemy intends to walk through.
///
/// The first cell is the next step; the last cell is the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    steps: VecDeque<CellCoord>,
}

impl Route {
    /// Creates a route from an ordered list of steps.
    #[must_use]
    pub fn new(steps: Vec<CellCoord>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Reports whether no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of remaining steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Next step without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<CellCoord> {
        self.steps.front().copied()
    }

    /// Consumes and returns the next step.
    pub fn advance(&mut self) -> Option<CellCoord> {
        self.steps.pop_front()
    }

    /// Drops every remaining step.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Iterates the remaining steps in walking order.
    pub fn iter(&self) -> impl Iterator<Item = &CellCoord> {
        self.steps.iter()
    }
}

/// Behaviour state carried by each enemy variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Chaser state: the route it currently follows.
    Chaser {
        /// Route owned exclusively by this enemy.
        route: Route,
    },
    /// Ranged shooters carry no extra state.
    Ranged,
    /// Boss state: the active phase.
    Boss {
        /// Current phase.
        phase: BossPhase,
    },
}

/// A hostile actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    cell: CellCoord,
    health: Health,
    max_health: Health,
    speed: u32,
    facing: Direction,
    behavior: Behavior,
    last_attack: Option<Duration>,
}

impl Enemy {
    /// Creates an enemy of the provided kind with its base statistics.
    #[must_use]
    pub fn spawn(id: EnemyId, kind: EnemyKind, cell: CellCoord) -> Self {
        let stats = kind.stats();
        let behavior = match kind {
            EnemyKind::Chaser => Behavior::Chaser {
                route: Route::default(),
            },
            EnemyKind::Ranged => Behavior::Ranged,
            EnemyKind::Boss => Behavior::Boss {
                phase: BossPhase::One,
            },
        };

        Self {
            id,
            cell,
            health: Health::new(stats.health),
            max_health: Health::new(stats.health),
            speed: stats.speed,
            facing: Direction::South,
            behavior,
            last_attack: None,
        }
    }

    /// Overrides the current health, clamped to the maximum.
    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = Health::new(health).min(self.max_health);
        self
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Archetype of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Chaser { .. } => EnemyKind::Chaser,
            Behavior::Ranged => EnemyKind::Ranged,
            Behavior::Boss { .. } => EnemyKind::Boss,
        }
    }

    /// Cell occupied by the enemy.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Moves the enemy to a new cell and turns it toward the movement.
    pub fn move_to(&mut self, cell: CellCoord) {
        let dx = i64::from(cell.column()) - i64::from(self.cell.column());
        let dy = i64::from(cell.row()) - i64::from(self.cell.row());
        if let Some(facing) = Direction::from_delta(dx.signum() as i32, dy.signum() as i32) {
            self.facing = facing;
        }
        self.cell = cell;
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> Health {
        self.max_health
    }

    /// Movement steps taken per tick.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Direction the enemy faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Damage dealt by this enemy's attacks.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.kind().stats().damage
    }

    /// Whether the enemy has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Applies damage, flooring health at zero.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        apply_damage(&mut self.health, amount)
    }

    /// Behaviour state of the enemy.
    #[must_use]
    pub const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Mutable access to the chaser route, if this enemy is a chaser.
    pub fn route_mut(&mut self) -> Option<&mut Route> {
        match &mut self.behavior {
            Behavior::Chaser { route } => Some(route),
            _ => None,
        }
    }

    /// Current boss phase, if this enemy is a boss.
    #[must_use]
    pub const fn boss_phase(&self) -> Option<BossPhase> {
        match self.behavior {
            Behavior::Boss { phase } => Some(phase),
            _ => None,
        }
    }

    /// Moves a boss into the requested phase.
    ///
    /// Returns `Ok(true)` when the phase changed and `Ok(false)` when the boss
    /// already occupied it (or the enemy is not a boss). Entering phase two
    /// permanently raises the speed. Leaving phase two is rejected.
    pub fn transition_phase(&mut self, target: BossPhase) -> Result<bool, SimError> {
        let Behavior::Boss { phase } = &mut self.behavior else {
            return Ok(false);
        };

        match (*phase, target) {
            (current, target) if current == target => Ok(false),
            (BossPhase::One, BossPhase::Two) => {
                *phase = BossPhase::Two;
                self.speed = BOSS_ENRAGED_SPEED;
                Ok(true)
            }
            (from, to) => Err(SimError::InvalidTransition { from, to }),
        }
    }

    /// Reports whether the attack cooldown elapsed at simulated time `now`.
    #[must_use]
    pub fn attack_ready(&self, now: Duration, cooldown: Duration) -> bool {
        self.last_attack
            .map_or(true, |last| now.saturating_sub(last) >= cooldown)
    }

    /// Records an attack at simulated time `now`.
    pub fn record_attack(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }
}
