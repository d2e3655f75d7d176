#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Advances in-flight projectiles and detonates bombs.
//!
//! Every live projectile is updated in identifier order. Projectiles that
//! expire, hit a target or detonate are only marked during the pass; the list
//! is compacted once the pass finishes so that removal never disturbs the
//! iteration.

use std::time::Duration;

use glam::Vec2;
use maze_quest_core::{
    Combatant, CombatEvent, Enemy, Event, GridCell, GridMap, Player, Projectile, ProjectileId,
    ProjectileOwner, SimError, BOMB_RADIUS,
};

/// Projectile system that advances shots and resolves their impacts.
#[derive(Debug)]
pub struct ProjectileSim {
    tick_rate: u32,
    spent: Vec<ProjectileId>,
}

impl ProjectileSim {
    /// Creates a projectile system for the provided tick rate.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_rate: tick_rate.max(1),
            spent: Vec::new(),
        }
    }

    /// Tick rate used to scale projectile movement.
    #[must_use]
    pub const fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Advances every projectile by one tick of length `dt`.
    ///
    /// Bombs burn their fuse and, once it runs out, damage every living enemy
    /// whose centre lies strictly within [`BOMB_RADIUS`] cells. Moving shots
    /// expire when they leave the grid or enter a wall, reverse when they
    /// enter a new mirror cell, and are consumed by the first target they
    /// reach: player arrows strike enemies, enemy shots strike the player.
    pub fn step(
        &mut self,
        dt: Duration,
        grid: &GridMap,
        projectiles: &mut Vec<Projectile>,
        player: &mut Player,
        enemies: &mut [Enemy],
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        self.spent.clear();

        for projectile in projectiles.iter_mut() {
            let spent = if projectile.is_bomb() {
                detonate_if_due(projectile, dt, enemies, out_events)
            } else {
                self.fly(projectile, grid, player, enemies, out_events)?
            };

            if spent {
                self.spent.push(projectile.id());
            }
        }

        if !self.spent.is_empty() {
            let spent = &self.spent;
            projectiles.retain(|projectile| !spent.contains(&projectile.id()));
        }

        Ok(())
    }

    fn fly(
        &self,
        projectile: &mut Projectile,
        grid: &GridMap,
        player: &mut Player,
        enemies: &mut [Enemy],
        out_events: &mut Vec<Event>,
    ) -> Result<bool, SimError> {
        // Slices never span more than one cell, so low tick rates cannot
        // tunnel through walls, mirrors or targets.
        let substeps = projectile.substeps(self.tick_rate);
        let mut spent = false;
        for _ in 0..substeps {
            let position = projectile.travel(self.tick_rate, substeps);
            spent = resolve_position(projectile, position, grid, player, enemies, out_events)?;
            if spent {
                break;
            }
        }
        projectile.record_trail();

        Ok(spent)
    }
}

fn resolve_position(
    projectile: &mut Projectile,
    position: Vec2,
    grid: &GridMap,
    player: &mut Player,
    enemies: &mut [Enemy],
    out_events: &mut Vec<Event>,
) -> Result<bool, SimError> {
    let Some(cell) = grid.cell_at_point(position) else {
        out_events.push(Event::ProjectileExpired {
            projectile: projectile.id(),
        });
        return Ok(true);
    };

    match grid.cell_at(cell)? {
        GridCell::Wall => {
            out_events.push(Event::ProjectileExpired {
                projectile: projectile.id(),
            });
            return Ok(true);
        }
        GridCell::Mirror if cell != projectile.cell() => {
            projectile.reflect();
            out_events.push(Event::ProjectileBounced {
                projectile: projectile.id(),
                cell,
            });
        }
        _ => {}
    }
    projectile.enter_cell(cell);

    match projectile.owner() {
        ProjectileOwner::Player => {
            let Some(enemy) = enemies
                .iter_mut()
                .find(|enemy| enemy.is_alive() && enemy.cell() == cell)
            else {
                return Ok(false);
            };
            let outcome = enemy.take_damage(projectile.damage());
            out_events.push(Event::Combat(CombatEvent {
                attacker: Combatant::Player,
                target: Combatant::Enemy(enemy.id()),
                damage: outcome.dealt,
                killed: outcome.killed,
            }));
            Ok(true)
        }
        ProjectileOwner::Enemy(shooter) => {
            if !player.is_alive() || player.cell() != cell {
                return Ok(false);
            }
            let outcome = player.take_damage(projectile.damage());
            out_events.push(Event::Combat(CombatEvent {
                attacker: Combatant::Enemy(shooter),
                target: Combatant::Player,
                damage: outcome.dealt,
                killed: outcome.killed,
            }));
            Ok(true)
        }
        ProjectileOwner::Bomb => Ok(false),
    }
}

fn detonate_if_due(
    bomb: &mut Projectile,
    dt: Duration,
    enemies: &mut [Enemy],
    out_events: &mut Vec<Event>,
) -> bool {
    if !bomb.burn_fuse(dt) {
        return false;
    }

    let origin = bomb.position();
    out_events.push(Event::BombDetonated {
        projectile: bomb.id(),
        cell: bomb.cell(),
    });

    let mut struck = 0_usize;
    for enemy in enemies
        .iter_mut()
        .filter(|enemy| enemy.is_alive() && enemy.cell().center().distance(origin) < BOMB_RADIUS)
    {
        let outcome = enemy.take_damage(bomb.damage());
        struck += 1;
        out_events.push(Event::Combat(CombatEvent {
            attacker: Combatant::Bomb(bomb.id()),
            target: Combatant::Enemy(enemy.id()),
            damage: outcome.dealt,
            killed: outcome.killed,
        }));
    }
    tracing::debug!(bomb = bomb.id().get(), struck, "bomb detonated");

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_quest_core::{CellCoord, Direction, EnemyId, EnemyKind};

    #[test]
    fn spent_projectiles_are_compacted_together() {
        let grid = GridMap::open(3, 1);
        let mut player = Player::new(CellCoord::new(1, 0));
        let mut enemies: Vec<Enemy> = Vec::new();
        let mut projectiles = vec![
            Projectile::directional(
                ProjectileId::new(1),
                ProjectileOwner::Player,
                CellCoord::new(0, 0),
                Direction::West.heading(),
                60.0,
                5,
            ),
            Projectile::directional(
                ProjectileId::new(2),
                ProjectileOwner::Player,
                CellCoord::new(2, 0),
                Direction::East.heading(),
                60.0,
                5,
            ),
            Projectile::directional(
                ProjectileId::new(3),
                ProjectileOwner::Enemy(EnemyId::new(4)),
                CellCoord::new(0, 0),
                Direction::East.heading(),
                6.0,
                5,
            ),
        ];
        let mut sim = ProjectileSim::new(60);
        let mut events = Vec::new();

        sim.step(
            Duration::from_millis(16),
            &grid,
            &mut projectiles,
            &mut player,
            &mut enemies,
            &mut events,
        )
        .expect("step");

        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].id(), ProjectileId::new(3));
        assert_eq!(
            events,
            vec![
                Event::ProjectileExpired {
                    projectile: ProjectileId::new(1)
                },
                Event::ProjectileExpired {
                    projectile: ProjectileId::new(2)
                },
            ]
        );
    }

    #[test]
    fn bomb_spares_enemies_at_the_radius() {
        let mut enemies = vec![
            Enemy::spawn(EnemyId::new(1), EnemyKind::Chaser, CellCoord::new(3, 2)),
            Enemy::spawn(EnemyId::new(2), EnemyKind::Chaser, CellCoord::new(4, 2)),
        ];
        let mut bomb = Projectile::bomb(
            ProjectileId::new(9),
            CellCoord::new(2, 2),
            Duration::from_millis(10),
            50,
        );
        let mut events = Vec::new();

        assert!(detonate_if_due(
            &mut bomb,
            Duration::from_millis(10),
            &mut enemies,
            &mut events
        ));

        assert_eq!(events.len(), 2);
        assert_eq!(enemies[0].health().get(), 0);
        assert_eq!(enemies[1].health().get(), EnemyKind::Chaser.stats().health);
    }
}
