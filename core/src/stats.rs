//! Gameplay counters consumed by achievements and quests.

use serde::{Deserialize, Serialize};

/// Running totals accumulated over a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Enemies eliminated, bosses included.
    pub enemies_defeated: u64,
    /// Bosses eliminated.
    pub bosses_defeated: u64,
    /// Damage dealt by the player to enemies.
    pub damage_dealt: u64,
    /// Damage received by the player.
    pub damage_taken: u64,
    /// Attack actions performed.
    pub attacks_made: u64,
    /// Arrows fired.
    pub arrows_fired: u64,
    /// Bombs placed.
    pub bombs_thrown: u64,
    /// Items picked up from the floor.
    pub items_collected: u64,
    /// Traps stepped on.
    pub traps_triggered: u64,
    /// Successful player moves.
    pub cells_walked: u64,
    /// Ticks simulated while the player was alive.
    pub ticks_survived: u64,
}

/// Names a single counter of [`Stats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    /// [`Stats::enemies_defeated`].
    EnemiesDefeated,
    /// [`Stats::bosses_defeated`].
    BossesDefeated,
    /// [`Stats::damage_dealt`].
    DamageDealt,
    /// [`Stats::damage_taken`].
    DamageTaken,
    /// [`Stats::attacks_made`].
    AttacksMade,
    /// [`Stats::arrows_fired`].
    ArrowsFired,
    /// [`Stats::bombs_thrown`].
    BombsThrown,
    /// [`Stats::items_collected`].
    ItemsCollected,
    /// [`Stats::traps_triggered`].
    TrapsTriggered,
    /// [`Stats::cells_walked`].
    CellsWalked,
    /// [`Stats::ticks_survived`].
    TicksSurvived,
}

impl Stats {
    /// Reads the counter named by `field`.
    #[must_use]
    pub const fn get(&self, field: StatField) -> u64 {
        match field {
            StatField::EnemiesDefeated => self.enemies_defeated,
            StatField::BossesDefeated => self.bosses_defeated,
            StatField::DamageDealt => self.damage_dealt,
            StatField::DamageTaken => self.damage_taken,
            StatField::AttacksMade => self.attacks_made,
            StatField::ArrowsFired => self.arrows_fired,
            StatField::BombsThrown => self.bombs_thrown,
            StatField::ItemsCollected => self.items_collected,
            StatField::TrapsTriggered => self.traps_triggered,
            StatField::CellsWalked => self.cells_walked,
            StatField::TicksSurvived => self.ticks_survived,
        }
    }
}
