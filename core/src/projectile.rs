//! In-flight projectiles and timed bombs.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;

use crate::{CellCoord, EnemyId, TRAIL_LENGTH};

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
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

/// Origin of a projectile, which also selects its behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileOwner {
    /// Arrow fired by the player; damages enemies.
    Player,
    /// Shot fired by an enemy; damages the player.
    Enemy(EnemyId),
    /// Stationary bomb waiting for its fuse.
    Bomb,
}

/// Request for a new projectile; the world assigns the identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Launch {
    /// A moving shot.
    Directional {
        /// Who fired the shot.
        owner: ProjectileOwner,
        /// Cell the shot starts from.
        origin: CellCoord,
        /// Unnormalised heading.
        heading: Vec2,
        /// Speed scalar in cells per second.
        speed: f32,
        /// Damage dealt on impact.
        damage: u32,
    },
    /// A stationary bomb.
    Bomb {
        /// Cell the bomb rests on.
        origin: CellCoord,
        /// Time until detonation.
        fuse: Duration,
        /// Damage dealt to every enemy in range.
        damage: u32,
    },
}

impl Launch {
    /// Owner the spawned projectile will report.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        match self {
            Self::Directional { owner, .. } => *owner,
            Self::Bomb { .. } => ProjectileOwner::Bomb,
        }
    }

    /// Materialises the request under the provided identifier.
    #[must_use]
    pub fn into_projectile(self, id: ProjectileId) -> Projectile {
        match self {
            Self::Directional {
                owner,
                origin,
                heading,
                speed,
                damage,
            } => Projectile::directional(id, owner, origin, heading, speed, damage),
            Self::Bomb {
                origin,
                fuse,
                damage,
            } => Projectile::bomb(id, origin, fuse, damage),
        }
    }
}

/// A projectile tracked with a continuous position.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    owner: ProjectileOwner,
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    damage: u32,
    fuse: Option<Duration>,
    trail: VecDeque<Vec2>,
    cell: CellCoord,
}

impl Projectile {
    /// Launches a moving projectile from the centre of `origin`.
    ///
    /// `heading` is used verbatim: it is not normalised.
    #[must_use]
    pub fn directional(
        id: ProjectileId,
        owner: ProjectileOwner,
        origin: CellCoord,
        heading: Vec2,
        speed: f32,
        damage: u32,
    ) -> Self {
        Self {
            id,
            owner,
            position: origin.center(),
            velocity: heading,
            speed,
            damage,
            fuse: None,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            cell: origin,
        }
    }

    /// Places a stationary bomb on the centre of `origin`.
    #[must_use]
    pub fn bomb(id: ProjectileId, origin: CellCoord, fuse: Duration, damage: u32) -> Self {
        Self {
            id,
            owner: ProjectileOwner::Bomb,
            position: origin.center(),
            velocity: Vec2::ZERO,
            speed: 0.0,
            damage,
            fuse: Some(fuse),
            trail: VecDeque::new(),
            cell: origin,
        }
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Owner of the projectile.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        self.owner
    }

    /// Whether this projectile is a bomb.
    #[must_use]
    pub const fn is_bomb(&self) -> bool {
        matches!(self.owner, ProjectileOwner::Bomb)
    }

    /// Continuous position in cell units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Heading vector scaled by `speed` during movement.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Speed scalar in cells per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage dealt on impact or detonation.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Remaining fuse for bombs.
    #[must_use]
    pub const fn fuse(&self) -> Option<Duration> {
        self.fuse
    }

    /// Cell the projectile occupied at the end of its last update.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Recent positions, oldest first. Cosmetic only.
    pub fn trail(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.trail.iter().copied()
    }

    /// Moves the projectile by one tick at the provided tick rate.
    ///
    /// Returns the new position after recording it in the trail.
    pub fn advance(&mut self, tick_rate: u32) -> Vec2 {
        let _ = self.travel(tick_rate, 1);
        self.record_trail();
        self.position
    }

    /// Number of slices one tick of movement is split into so that no slice
    /// covers more than one cell along either axis.
    #[must_use]
    pub fn substeps(&self, tick_rate: u32) -> u32 {
        let rate = tick_rate.max(1) as f32;
        let reach = (self.velocity * self.speed / rate).abs().max_element();
        if reach.is_finite() && reach > 1.0 {
            reach.ceil() as u32
        } else {
            1
        }
    }

    /// Moves the projectile by one of `substeps` equal slices of a tick.
    ///
    /// The trail is left untouched; see [`Projectile::record_trail`].
    pub fn travel(&mut self, tick_rate: u32, substeps: u32) -> Vec2 {
        let rate = (tick_rate.max(1) as f32) * (substeps.max(1) as f32);
        self.position += self.velocity * self.speed / rate;
        self.position
    }

    /// Pushes the current position into the trail, dropping the oldest sample.
    pub fn record_trail(&mut self) {
        if self.trail.len() == TRAIL_LENGTH {
            let _ = self.trail.pop_front();
        }
        self.trail.push_back(self.position);
    }

    /// Records the cell the projectile now occupies.
    pub fn enter_cell(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    /// Negates both velocity components.
    pub fn reflect(&mut self) {
        self.velocity = -self.velocity;
    }

    /// Burns `dt` off the fuse.
    ///
    /// Returns `true` exactly once: on the call that exhausts the fuse. The
    /// fuse is cleared at that point, so later calls return `false`.
    pub fn burn_fuse(&mut self, dt: Duration) -> bool {
        let Some(remaining) = self.fuse else {
            return false;
        };

        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.fuse = None;
            true
        } else {
            self.fuse = Some(remaining);
            false
        }
    }
}
