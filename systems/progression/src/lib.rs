#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Statistics, achievements and quests.
//!
//! Unlock rules are plain data: a closed set of [`Condition`] variants
//! evaluated against the fixed [`Stats`] record. Nothing is interpreted at
//! runtime beyond comparing counters.

use std::collections::BTreeSet;

use maze_quest_core::{
    AchievementId, Combatant, CombatEvent, EnemyKind, Event, ItemKind, Player, QuestId, StatField,
    Stats, Weapon,
};

/// Folds the events of one tick into the running statistics.
pub fn tally(stats: &mut Stats, events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => stats.ticks_survived += 1,
            Event::PlayerMoved { .. } => stats.cells_walked += 1,
            Event::TrapTriggered { .. } => stats.traps_triggered += 1,
            Event::ItemCollected { .. } => stats.items_collected += 1,
            Event::AttackPerformed { weapon } => {
                stats.attacks_made += 1;
                match weapon {
                    Weapon::Bow => stats.arrows_fired += 1,
                    Weapon::Bomb => stats.bombs_thrown += 1,
                    Weapon::Sword => {}
                }
            }
            Event::Combat(CombatEvent {
                attacker, target, damage, ..
            }) => match (attacker, target) {
                (_, Combatant::Player) => stats.damage_taken += u64::from(*damage),
                (Combatant::Player | Combatant::Bomb(_), Combatant::Enemy(_)) => {
                    stats.damage_dealt += u64::from(*damage);
                }
                _ => {}
            },
            Event::EnemyDefeated { kind, .. } => {
                stats.enemies_defeated += 1;
                if *kind == EnemyKind::Boss {
                    stats.bosses_defeated += 1;
                }
            }
            _ => {}
        }
    }
}

/// Comparison applied between a counter and a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Counter is greater than or equal to the threshold.
    AtLeast,
    /// Counter is strictly greater than the threshold.
    Above,
    /// Counter equals the threshold.
    Exactly,
    /// Counter is less than or equal to the threshold.
    AtMost,
}

impl Comparator {
    /// Applies the comparison.
    #[must_use]
    pub const fn holds(self, actual: u64, threshold: u64) -> bool {
        match self {
            Self::AtLeast => actual >= threshold,
            Self::Above => actual > threshold,
            Self::Exactly => actual == threshold,
            Self::AtMost => actual <= threshold,
        }
    }
}

/// Predicate over [`Stats`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Compares a single counter against a constant.
    StatThreshold {
        /// Counter inspected.
        field: StatField,
        /// Comparison applied.
        comparator: Comparator,
        /// Threshold compared against.
        value: u64,
    },
    /// Holds when every nested condition holds.
    All(Vec<Condition>),
    /// Holds when any nested condition holds.
    Any(Vec<Condition>),
}

impl Condition {
    /// Shorthand for an `AtLeast` threshold.
    #[must_use]
    pub const fn at_least(field: StatField, value: u64) -> Self {
        Self::StatThreshold {
            field,
            comparator: Comparator::AtLeast,
            value,
        }
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn evaluate(&self, stats: &Stats) -> bool {
        match self {
            Self::StatThreshold {
                field,
                comparator,
                value,
            } => comparator.holds(stats.get(*field), *value),
            Self::All(conditions) => conditions.iter().all(|condition| condition.evaluate(stats)),
            Self::Any(conditions) => conditions.iter().any(|condition| condition.evaluate(stats)),
        }
    }
}

/// Bonus granted when a quest completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reward {
    /// Raises the weapon level by one.
    WeaponUpgrade,
    /// Adds items to the inventory.
    Items {
        /// Kind of item granted.
        item: ItemKind,
        /// Number of items granted.
        amount: u32,
    },
    /// Raises the health ceiling and heals by the same amount.
    MaxHealth(u32),
}

impl Reward {
    fn grant(self, player: &mut Player) {
        match self {
            Self::WeaponUpgrade => player.upgrade_weapon(),
            Self::Items { item, amount } => player.inventory_mut().add(item, amount),
            Self::MaxHealth(amount) => player.raise_max_health(amount),
        }
    }
}

/// One-off milestone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    /// Identifier reported when unlocked.
    pub id: AchievementId,
    /// Display name.
    pub name: &'static str,
    /// Unlock rule.
    pub condition: Condition,
}

/// Objective that grants a reward once fulfilled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quest {
    /// Identifier reported when completed.
    pub id: QuestId,
    /// Display name.
    pub name: &'static str,
    /// Completion rule.
    pub objective: Condition,
    /// Bonus granted on completion.
    pub reward: Reward,
}

/// Progression system evaluating achievements and quests after every tick.
#[derive(Clone, Debug)]
pub struct Progression {
    achievements: Vec<Achievement>,
    quests: Vec<Quest>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(standard_achievements(), standard_quests())
    }
}

impl Progression {
    /// Creates a progression system from explicit catalogues.
    #[must_use]
    pub fn new(achievements: Vec<Achievement>, quests: Vec<Quest>) -> Self {
        Self {
            achievements,
            quests,
        }
    }

    /// Achievement catalogue in evaluation order.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Quest catalogue in evaluation order.
    #[must_use]
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// Unlocks every achievement and completes every quest whose rule now
    /// holds, each at most once. Quest rewards are granted to `player`.
    ///
    /// Quests stay open while the player is dead.
    pub fn evaluate(
        &self,
        stats: &Stats,
        unlocked: &mut BTreeSet<AchievementId>,
        completed: &mut BTreeSet<QuestId>,
        player: &mut Player,
        out_events: &mut Vec<Event>,
    ) {
        for achievement in &self.achievements {
            if unlocked.contains(&achievement.id) || !achievement.condition.evaluate(stats) {
                continue;
            }
            let _ = unlocked.insert(achievement.id);
            tracing::info!(achievement = achievement.name, "achievement unlocked");
            out_events.push(Event::AchievementUnlocked {
                achievement: achievement.id,
            });
        }

        if !player.is_alive() {
            return;
        }

        for quest in &self.quests {
            if completed.contains(&quest.id) || !quest.objective.evaluate(stats) {
                continue;
            }
            let _ = completed.insert(quest.id);
            quest.reward.grant(player);
            tracing::info!(quest = quest.name, reward = ?quest.reward, "quest completed");
            out_events.push(Event::QuestCompleted { quest: quest.id });
        }
    }
}

/// Built-in achievement catalogue.
#[must_use]
pub fn standard_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: AchievementId::new(1),
            name: "First Blood",
            condition: Condition::at_least(StatField::EnemiesDefeated, 1),
        },
        Achievement {
            id: AchievementId::new(2),
            name: "Monster Hunter",
            condition: Condition::at_least(StatField::EnemiesDefeated, 10),
        },
        Achievement {
            id: AchievementId::new(3),
            name: "Giant Slayer",
            condition: Condition::at_least(StatField::BossesDefeated, 1),
        },
        Achievement {
            id: AchievementId::new(4),
            name: "Untouchable",
            condition: Condition::All(vec![
                Condition::at_least(StatField::BossesDefeated, 1),
                Condition::StatThreshold {
                    field: StatField::DamageTaken,
                    comparator: Comparator::Exactly,
                    value: 0,
                },
            ]),
        },
        Achievement {
            id: AchievementId::new(5),
            name: "Sharpshooter",
            condition: Condition::at_least(StatField::ArrowsFired, 25),
        },
        Achievement {
            id: AchievementId::new(6),
            name: "Demolitionist",
            condition: Condition::at_least(StatField::BombsThrown, 5),
        },
        Achievement {
            id: AchievementId::new(7),
            name: "Wanderer",
            condition: Condition::at_least(StatField::CellsWalked, 500),
        },
        Achievement {
            id: AchievementId::new(8),
            name: "Survivor",
            condition: Condition::at_least(StatField::TicksSurvived, 18_000),
        },
    ]
}

/// Built-in quest catalogue.
#[must_use]
pub fn standard_quests() -> Vec<Quest> {
    vec![
        Quest {
            id: QuestId::new(1),
            name: "Clear the Way",
            objective: Condition::at_least(StatField::EnemiesDefeated, 3),
            reward: Reward::WeaponUpgrade,
        },
        Quest {
            id: QuestId::new(2),
            name: "Scavenger",
            objective: Condition::at_least(StatField::ItemsCollected, 5),
            reward: Reward::Items {
                item: ItemKind::Potion,
                amount: 2,
            },
        },
        Quest {
            id: QuestId::new(3),
            name: "Battle Hardened",
            objective: Condition::at_least(StatField::DamageTaken, 100),
            reward: Reward::MaxHealth(25),
        },
        Quest {
            id: QuestId::new(4),
            name: "Armed and Ready",
            objective: Condition::Any(vec![
                Condition::at_least(StatField::AttacksMade, 20),
                Condition::at_least(StatField::DamageDealt, 200),
            ]),
            reward: Reward::Items {
                item: ItemKind::Bomb,
                amount: 2,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparators_cover_their_boundaries() {
        assert!(Comparator::AtLeast.holds(3, 3));
        assert!(!Comparator::Above.holds(3, 3));
        assert!(Comparator::Exactly.holds(0, 0));
        assert!(Comparator::AtMost.holds(2, 3));
        assert!(!Comparator::AtMost.holds(4, 3));
    }

    #[test]
    fn catalogue_identifiers_are_unique() {
        let achievements: BTreeSet<_> = standard_achievements().iter().map(|a| a.id).collect();
        let quests: BTreeSet<_> = standard_quests().iter().map(|q| q.id).collect();

        assert_eq!(achievements.len(), standard_achievements().len());
        assert_eq!(quests.len(), standard_quests().len());
    }
}
