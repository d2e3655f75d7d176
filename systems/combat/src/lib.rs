#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolves player attacks and enemy contact damage.

use std::time::Duration;

use maze_quest_core::{
    CellCoord, Combatant, CombatEvent, Enemy, Event, ItemKind, Launch, Player, ProjectileOwner,
    Weapon, ARROW_DAMAGE_PER_LEVEL, ARROW_SPEED, BOMB_DAMAGE, BOMB_FUSE, ENEMY_ATTACK_COOLDOWN,
    MELEE_DAMAGE_PER_LEVEL,
};

/// Combat system applying health deltas for attack actions.
#[derive(Clone, Copy, Debug)]
pub struct CombatResolver {
    cooldown: Duration,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(ENEMY_ATTACK_COOLDOWN)
    }
}

impl CombatResolver {
    /// Creates a resolver using `cooldown` between two attacks of one enemy.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Minimum simulated time between two attacks of the same enemy.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Resolves a single player attack action.
    ///
    /// The sword damages every living enemy standing on the player's cell or
    /// the cell the player faces. The bow requests one arrow along the facing
    /// direction. The bomb spends one charge and requests a stationary bomb;
    /// without charges nothing happens.
    pub fn player_attack(
        &self,
        weapon: Weapon,
        player: &mut Player,
        enemies: &mut [Enemy],
        out_launches: &mut Vec<Launch>,
        out_events: &mut Vec<Event>,
    ) {
        if !player.is_alive() {
            return;
        }

        match weapon {
            Weapon::Sword => {
                out_events.push(Event::AttackPerformed { weapon });
                let damage = MELEE_DAMAGE_PER_LEVEL.saturating_mul(player.weapon_level());
                let region = melee_region(player);
                for enemy in enemies
                    .iter_mut()
                    .filter(|enemy| enemy.is_alive() && region.contains(&Some(enemy.cell())))
                {
                    let outcome = enemy.take_damage(damage);
                    out_events.push(Event::Combat(CombatEvent {
                        attacker: Combatant::Player,
                        target: Combatant::Enemy(enemy.id()),
                        damage: outcome.dealt,
                        killed: outcome.killed,
                    }));
                }
            }
            Weapon::Bow => {
                out_events.push(Event::AttackPerformed { weapon });
                out_launches.push(Launch::Directional {
                    owner: ProjectileOwner::Player,
                    origin: player.cell(),
                    heading: player.facing().heading(),
                    speed: ARROW_SPEED,
                    damage: ARROW_DAMAGE_PER_LEVEL.saturating_mul(player.weapon_level()),
                });
            }
            Weapon::Bomb => {
                if let Err(error) = player.inventory_mut().take(ItemKind::Bomb) {
                    tracing::debug!(%error, "bomb attack ignored");
                    return;
                }
                out_events.push(Event::AttackPerformed { weapon });
                out_launches.push(Launch::Bomb {
                    origin: player.cell(),
                    fuse: BOMB_FUSE,
                    damage: BOMB_DAMAGE,
                });
            }
        }
    }

    /// Lets every enemy sharing the player's cell strike when its cooldown
    /// elapsed at simulated time `now`.
    pub fn enemy_contact(
        &self,
        now: Duration,
        player: &mut Player,
        enemies: &mut [Enemy],
        out_events: &mut Vec<Event>,
    ) {
        for enemy in enemies.iter_mut() {
            if !player.is_alive() {
                return;
            }
            if !enemy.is_alive()
                || enemy.cell() != player.cell()
                || !enemy.attack_ready(now, self.cooldown)
            {
                continue;
            }

            let outcome = player.take_damage(enemy.damage());
            enemy.record_attack(now);
            out_events.push(Event::Combat(CombatEvent {
                attacker: Combatant::Enemy(enemy.id()),
                target: Combatant::Player,
                damage: outcome.dealt,
                killed: outcome.killed,
            }));
        }
    }
}

fn melee_region(player: &Player) -> [Option<CellCoord>; 2] {
    let (dx, dy) = player.facing().delta();
    [Some(player.cell()), player.cell().offset(dx, dy)]
}
