#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-archetype enemy behaviour.
//!
//! Chasers follow A* routes toward the player and refresh them at random,
//! ranged shooters stand still and occasionally fire sign-based shots, and
//! the boss wanders at random and enrages once its health drops below the
//! phase threshold. Enemies never enter walls or doors.

use glam::Vec2;
use maze_quest_core::{
    BossPhase, CellCoord, Enemy, EnemyKind, Event, GridMap, Launch, Player, ProjectileOwner,
    ENEMY_SHOT_SPEED,
};
use maze_quest_system_pathfinding::Pathfinder;
use rand::Rng;

/// Default probability that a chaser recomputes a non-empty route.
pub const DEFAULT_REFRESH_CHANCE: f64 = 0.1;

/// Default probability that a ranged enemy fires during a tick.
pub const DEFAULT_FIRE_CHANCE: f64 = 0.01;

/// Behaviour system driving every enemy for one tick.
#[derive(Debug)]
pub struct EnemyController {
    refresh_chance: f64,
    fire_chance: f64,
    pathfinder: Pathfinder,
}

impl Default for EnemyController {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_CHANCE, DEFAULT_FIRE_CHANCE)
    }
}

impl EnemyController {
    /// Creates a controller with explicit per-tick probabilities.
    ///
    /// Both probabilities are clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(refresh_chance: f64, fire_chance: f64) -> Self {
        Self {
            refresh_chance: clamp_probability(refresh_chance),
            fire_chance: clamp_probability(fire_chance),
            pathfinder: Pathfinder::new(),
        }
    }

    /// Updates every living enemy in slice order.
    ///
    /// Shots are returned through `out_launches`; movement and phase changes
    /// are reported through `out_events`. All randomness is drawn from `rng`
    /// in a fixed order, so equal seeds replay equal ticks.
    pub fn update<R>(
        &mut self,
        rng: &mut R,
        grid: &GridMap,
        player: &Player,
        enemies: &mut [Enemy],
        out_launches: &mut Vec<Launch>,
        out_events: &mut Vec<Event>,
    ) where
        R: Rng,
    {
        for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            let from = enemy.cell();
            match enemy.kind() {
                EnemyKind::Chaser => self.chase(rng, grid, player.cell(), enemy),
                EnemyKind::Ranged => self.shoot(rng, player.cell(), enemy, out_launches),
                EnemyKind::Boss => {
                    enrage_if_wounded(enemy, out_events);
                    wander(rng, grid, enemy);
                }
            }

            if enemy.cell() != from {
                out_events.push(Event::EnemyMoved {
                    enemy: enemy.id(),
                    from,
                    to: enemy.cell(),
                });
            }
        }
    }

    fn chase<R>(&mut self, rng: &mut R, grid: &GridMap, target: CellCoord, enemy: &mut Enemy)
    where
        R: Rng,
    {
        let origin = enemy.cell();
        let refresh_chance = self.refresh_chance;
        if let Some(route) = enemy.route_mut() {
            if route.is_empty() || rng.gen_bool(refresh_chance) {
                *route = self.pathfinder.find_path(origin, target, grid);
                tracing::trace!(steps = route.len(), "chaser route recomputed");
            }
        }

        for _ in 0..enemy.speed() {
            let Some(next) = enemy.route_mut().and_then(|route| route.peek()) else {
                break;
            };

            if !can_enter(grid, next) {
                if let Some(route) = enemy.route_mut() {
                    route.clear();
                }
                break;
            }

            if let Some(route) = enemy.route_mut() {
                let _ = route.advance();
            }
            enemy.move_to(next);
        }
    }

    fn shoot<R>(&self, rng: &mut R, target: CellCoord, enemy: &Enemy, out_launches: &mut Vec<Launch>)
    where
        R: Rng,
    {
        let origin = enemy.cell();
        if origin == target || !rng.gen_bool(self.fire_chance) {
            return;
        }

        out_launches.push(Launch::Directional {
            owner: ProjectileOwner::Enemy(enemy.id()),
            origin,
            heading: sign_heading(origin, target),
            speed: ENEMY_SHOT_SPEED,
            damage: enemy.damage(),
        });
    }
}

fn enrage_if_wounded(enemy: &mut Enemy, out_events: &mut Vec<Event>) {
    let target = BossPhase::for_health(enemy.health());
    match enemy.transition_phase(target) {
        Ok(true) => {
            tracing::info!(boss = enemy.id().get(), ?target, "boss phase changed");
            out_events.push(Event::BossPhaseChanged {
                enemy: enemy.id(),
                phase: target,
            });
        }
        Ok(false) => {}
        Err(error) => {
            tracing::warn!(boss = enemy.id().get(), %error, "ignoring boss phase request");
        }
    }
}

fn wander<R>(rng: &mut R, grid: &GridMap, enemy: &mut Enemy)
where
    R: Rng,
{
    for _ in 0..enemy.speed() {
        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        if (dx, dy) == (0, 0) {
            continue;
        }

        if let Some(next) = enemy.cell().offset(dx, dy).filter(|cell| can_enter(grid, *cell)) {
            enemy.move_to(next);
        }
    }
}

fn can_enter(grid: &GridMap, cell: CellCoord) -> bool {
    grid.is_walkable(cell, false).unwrap_or(false)
}

/// Heading whose components are the signs of the offset toward `target`.
///
/// Diagonal headings are not normalised, so diagonal shots travel faster
/// than axis-aligned ones.
#[must_use]
pub fn sign_heading(origin: CellCoord, target: CellCoord) -> Vec2 {
    let dx = i64::from(target.column()) - i64::from(origin.column());
    let dy = i64::from(target.row()) - i64::from(origin.row());
    Vec2::new(dx.signum() as f32, dy.signum() as f32)
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_heading_ignores_magnitude() {
        let origin = CellCoord::new(5, 5);
        assert_eq!(sign_heading(origin, CellCoord::new(9, 1)), Vec2::new(1.0, -1.0));
        assert_eq!(sign_heading(origin, CellCoord::new(5, 0)), Vec2::new(0.0, -1.0));
        assert_eq!(sign_heading(origin, CellCoord::new(0, 5)), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn probabilities_are_clamped() {
        let controller = EnemyController::new(2.0, f64::NAN);
        assert_eq!(controller.refresh_chance, 1.0);
        assert_eq!(controller.fire_chance, 0.0);
    }
}
