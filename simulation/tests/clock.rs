use std::{cell::RefCell, rc::Rc, time::Duration};

use maze_quest_core::{
    AudioCue, AudioSink, CellCoord, CollaboratorError, Combatant, CombatEvent, Command, Event,
    FrameView, GameStatus, ItemKind, Persistence, Renderer, SaveSnapshot, Weapon,
    PLAYER_MAX_HEALTH,
};
use maze_quest_simulation::{ClockError, SimulationClock, SimulationConfig};
use maze_quest_world::{query, World};

fn clock(rows: &[&str], config: SimulationConfig) -> SimulationClock {
    let world = World::from_layout(rows).expect("layout parses");
    SimulationClock::with_world(config, world).expect("valid config")
}

fn quiet() -> SimulationConfig {
    SimulationConfig {
        ranged_fire_chance: 0.0,
        ..SimulationConfig::default()
    }
}

fn run_until_finished(clock: &mut SimulationClock, limit: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..limit {
        events.extend(clock.tick(&[]).expect("tick succeeds"));
        if clock.status().is_finished() {
            break;
        }
    }
    events
}

#[test]
fn chaser_reaches_the_player_and_strikes_once() {
    let mut clock = clock(&["c..P"], quiet());

    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(clock.tick(&[]).expect("tick succeeds"));
    }

    let world = clock.world();
    assert_eq!(query::enemies(world)[0].cell(), CellCoord::new(3, 0));
    assert_eq!(query::player(world).health().get(), PLAYER_MAX_HEALTH - 10);
    let strikes = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::Combat(CombatEvent {
                    attacker: Combatant::Enemy(_),
                    target: Combatant::Player,
                    ..
                })
            )
        })
        .count();
    assert_eq!(strikes, 1);
}

#[test]
fn melee_clears_a_level_and_unlocks_first_blood() {
    let mut clock = clock(&["rP"], quiet());

    let first = clock
        .tick(&[Command::Move { dx: -1, dy: 0 }, Command::Attack])
        .expect("tick succeeds");
    assert!(first.contains(&Event::AttackPerformed {
        weapon: Weapon::Sword
    }));
    assert_eq!(query::enemies(clock.world())[0].health().get(), 10);

    let second = clock.tick(&[Command::Attack]).expect("tick succeeds");

    assert!(query::enemies(clock.world()).is_empty());
    assert_eq!(
        second
            .iter()
            .filter(|event| matches!(event, Event::EnemyDefeated { .. }))
            .count(),
        1
    );
    assert!(second.contains(&Event::PlayerVictory));
    assert!(second
        .iter()
        .any(|event| matches!(event, Event::AchievementUnlocked { .. })));
    assert_eq!(clock.status(), GameStatus::Victory);

    let stats = query::stats(clock.world());
    assert_eq!(stats.enemies_defeated, 1);
    assert_eq!(stats.attacks_made, 2);
    assert_eq!(stats.damage_dealt, 20);
}

#[test]
fn finished_sessions_stop_ticking() {
    let mut clock = clock(&["P..r"], quiet());

    let events = clock.tick(&[Command::Quit]).expect("tick succeeds");
    assert_eq!(clock.status(), GameStatus::Quit);
    assert_eq!(events.len(), 1);

    let tick = query::tick_index(clock.world());
    assert!(clock.tick(&[Command::Move { dx: 1, dy: 0 }]).expect("tick").is_empty());
    assert!(clock
        .advance(Duration::from_secs(1), &[])
        .expect("advance")
        .is_empty());
    assert_eq!(query::tick_index(clock.world()), tick);
    assert_eq!(query::player(clock.world()).cell(), CellCoord::new(0, 0));
}

#[test]
fn bomb_without_charges_changes_nothing() {
    let mut clock = clock(&["P...r"], quiet());

    let events = clock
        .tick(&[
            Command::SelectWeapon {
                weapon: Weapon::Bomb,
            },
            Command::Attack,
        ])
        .expect("tick succeeds");

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ProjectileSpawned { .. })));
    assert!(query::projectiles(clock.world()).is_empty());
    assert_eq!(
        query::player(clock.world()).inventory().count(ItemKind::Bomb),
        0
    );
}

#[test]
fn collected_bomb_detonates_exactly_once_at_any_tick_rate() {
    for tick_rate in [30, 60, 144] {
        let config = SimulationConfig {
            tick_rate,
            ..quiet()
        };
        let mut clock = clock(&["Pbr"], config);

        let mut events = clock
            .tick(&[
                Command::Move { dx: 1, dy: 0 },
                Command::SelectWeapon {
                    weapon: Weapon::Bomb,
                },
                Command::Attack,
            ])
            .expect("tick succeeds");
        events.extend(run_until_finished(&mut clock, 10 * tick_rate as usize));

        let detonations = events
            .iter()
            .filter(|event| matches!(event, Event::BombDetonated { .. }))
            .count();
        assert_eq!(detonations, 1, "tick rate {tick_rate}");
        assert_eq!(clock.status(), GameStatus::Victory, "tick rate {tick_rate}");
        assert_eq!(
            query::player(clock.world()).health().get(),
            PLAYER_MAX_HEALTH
        );
        assert!(query::elapsed(clock.world()) >= Duration::from_secs(2));
    }
}

#[test]
fn ranged_shots_reach_a_diagonal_player() {
    let config = SimulationConfig {
        ranged_fire_chance: 1.0,
        ..SimulationConfig::default()
    };
    let mut clock = clock(&["r..", "...", "..P"], config);

    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(clock.tick(&[]).expect("tick succeeds"));
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::Combat(CombatEvent {
            attacker: Combatant::Enemy(_),
            target: Combatant::Player,
            damage: 5,
            ..
        })
    )));
    assert!(query::player(clock.world()).health().get() < PLAYER_MAX_HEALTH);
}

#[test]
fn traps_wear_the_player_down_to_defeat() {
    let mut clock = clock(&["P^.r"], quiet());

    let mut events = Vec::new();
    for step in 0..40 {
        let dx = if step % 2 == 0 { 1 } else { -1 };
        events.extend(clock.tick(&[Command::Move { dx, dy: 0 }]).expect("tick"));
        if clock.status().is_finished() {
            break;
        }
    }

    assert_eq!(clock.status(), GameStatus::Defeat);
    assert_eq!(events.last(), Some(&Event::PlayerDefeated));
    let stats = query::stats(clock.world());
    assert_eq!(stats.traps_triggered, 10);
    assert_eq!(stats.damage_taken, u64::from(PLAYER_MAX_HEALTH));
}

#[test]
fn advance_runs_whole_ticks_and_applies_inputs_once() {
    let config = SimulationConfig {
        tick_rate: 10,
        ..quiet()
    };
    let mut clock = clock(&["P....r"], config);

    let _ = clock
        .advance(Duration::from_millis(250), &[Command::Move { dx: 1, dy: 0 }])
        .expect("advance");
    assert_eq!(query::tick_index(clock.world()), 2);
    assert_eq!(query::player(clock.world()).cell(), CellCoord::new(1, 0));

    let _ = clock.advance(Duration::from_millis(50), &[]).expect("advance");
    assert_eq!(query::tick_index(clock.world()), 3);
}

#[test]
fn advance_holds_inputs_until_a_tick_runs() {
    let config = SimulationConfig {
        tick_rate: 10,
        ..quiet()
    };
    let mut clock = clock(&["P....r"], config);

    let events = clock
        .advance(Duration::from_millis(40), &[Command::Move { dx: 1, dy: 0 }])
        .expect("advance");
    assert!(events.is_empty());
    assert_eq!(query::player(clock.world()).cell(), CellCoord::new(0, 0));

    let _ = clock.advance(Duration::from_millis(60), &[]).expect("advance");
    assert_eq!(query::tick_index(clock.world()), 1);
    assert_eq!(query::player(clock.world()).cell(), CellCoord::new(1, 0));
}

#[test]
fn advance_drops_backlog_beyond_the_catch_up_limit() {
    let config = SimulationConfig {
        tick_rate: 10,
        max_catch_up_ticks: 5,
        ..quiet()
    };
    let mut clock = clock(&["P....r"], config);

    let _ = clock.advance(Duration::from_secs(2), &[]).expect("advance");
    assert_eq!(query::tick_index(clock.world()), 5);

    let _ = clock.advance(Duration::ZERO, &[]).expect("advance");
    assert_eq!(query::tick_index(clock.world()), 5);
}

#[test]
fn finished_sessions_discard_advanced_inputs() {
    let mut clock = clock(&["P.c"], quiet());

    let _ = clock
        .advance(Duration::from_millis(1), &[Command::Attack])
        .expect("advance");
    assert_eq!(clock.queued_inputs(), &[Command::Attack]);

    let _ = clock.tick(&[Command::Quit]).expect("tick succeeds");
    for _ in 0..1_000 {
        let events = clock
            .advance(Duration::from_millis(16), &[Command::Attack])
            .expect("advance");
        assert!(events.is_empty());
    }

    assert!(clock.queued_inputs().is_empty());
}

#[test]
fn contact_cooldown_follows_the_config() {
    let config = SimulationConfig {
        tick_rate: 10,
        contact_cooldown_ms: 100,
        ..quiet()
    };
    let mut clock = clock(&["cP"], config);

    for _ in 0..3 {
        let _ = clock.tick(&[]).expect("tick succeeds");
    }

    assert_eq!(
        query::player(clock.world()).health().get(),
        PLAYER_MAX_HEALTH - 30
    );
}

#[derive(Default)]
struct Recorder {
    frames: Vec<(u64, usize)>,
    cues: Vec<AudioCue>,
    stored: Option<SaveSnapshot>,
}

struct RecordingRenderer(Rc<RefCell<Recorder>>);

impl Renderer for RecordingRenderer {
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), CollaboratorError> {
        self.0
            .borrow_mut()
            .frames
            .push((frame.tick, frame.actors.len()));
        Ok(())
    }
}

struct RecordingAudio(Rc<RefCell<Recorder>>);

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), CollaboratorError> {
        self.0.borrow_mut().cues.push(cue);
        Ok(())
    }
}

struct MemoryPersistence(Rc<RefCell<Recorder>>);

impl Persistence for MemoryPersistence {
    fn save(&mut self, snapshot: &SaveSnapshot) -> Result<(), CollaboratorError> {
        self.0.borrow_mut().stored = Some(snapshot.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<SaveSnapshot, CollaboratorError> {
        self.0
            .borrow()
            .stored
            .clone()
            .ok_or(CollaboratorError::Unavailable {
                collaborator: "memory",
                reason: "nothing saved".to_owned(),
            })
    }
}

struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn present(&mut self, _frame: &FrameView<'_>) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Failed {
            collaborator: "renderer",
            reason: "device lost".to_owned(),
        })
    }
}

#[test]
fn collaborators_receive_frames_and_cues() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut clock = clock(&["rP"], quiet())
        .with_renderer(Box::new(RecordingRenderer(Rc::clone(&recorder))))
        .with_audio(Box::new(RecordingAudio(Rc::clone(&recorder))));

    let _ = clock
        .tick(&[Command::Move { dx: -1, dy: 0 }, Command::Attack])
        .expect("tick succeeds");
    let _ = clock.tick(&[Command::Attack]).expect("tick succeeds");

    let recorder = recorder.borrow();
    assert_eq!(recorder.frames, vec![(1, 2), (2, 1)]);
    assert_eq!(
        recorder.cues,
        vec![
            AudioCue::AttackFired,
            AudioCue::DamageTaken,
            AudioCue::AttackFired,
            AudioCue::EnemyDefeated,
            AudioCue::PlayerVictory,
        ]
    );
}

#[test]
fn failing_collaborators_do_not_stop_the_clock() {
    let mut clock = clock(&["P...r"], quiet()).with_renderer(Box::new(BrokenRenderer));

    for _ in 0..3 {
        let _ = clock.tick(&[]).expect("tick succeeds");
    }

    assert_eq!(query::tick_index(clock.world()), 3);
}

#[test]
fn saved_sessions_restore_equivalent_state() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut clock = clock(&["Pbh.^.r"], quiet())
        .with_persistence(Box::new(MemoryPersistence(Rc::clone(&recorder))));

    for _ in 0..4 {
        let _ = clock
            .tick(&[Command::Move { dx: 1, dy: 0 }])
            .expect("tick succeeds");
    }
    let _ = clock
        .tick(&[Command::SelectWeapon {
            weapon: Weapon::Bow,
        }])
        .expect("tick succeeds");
    clock.save().expect("save succeeds");
    let saved = clock.snapshot();

    let mut restored = self::clock(&["P.r"], quiet())
        .with_persistence(Box::new(MemoryPersistence(Rc::clone(&recorder))));
    restored.load().expect("load succeeds");

    assert_eq!(restored.snapshot(), saved);
    let player = query::player(restored.world());
    assert_eq!(player.cell(), CellCoord::new(4, 0));
    assert_eq!(player.weapon(), Weapon::Bow);
    assert_eq!(player.health().get(), PLAYER_MAX_HEALTH - 10);
    assert_eq!(player.inventory().count(ItemKind::Bomb), 1);
    assert_eq!(player.inventory().count(ItemKind::Potion), 1);
    assert_eq!(query::pickups(restored.world()).count(), 2);
    assert_eq!(query::enemies(restored.world()).len(), 1);
}

#[test]
fn saving_requires_a_persistence_collaborator() {
    let mut clock = clock(&["P.r"], quiet());

    assert!(matches!(clock.save(), Err(ClockError::NoPersistence)));
    assert!(matches!(clock.load(), Err(ClockError::NoPersistence)));
}
