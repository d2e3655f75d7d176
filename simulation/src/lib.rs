#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate tick loop tying the Maze Quest systems together.
//!
//! [`SimulationClock`] owns the world, every system and the single seeded
//! random number generator. Each tick runs the same phases in the same
//! order:
//!
//! 1. player intents, including attack resolution,
//! 2. enemy decisions and contact attacks,
//! 3. projectile flight, impacts and detonations,
//! 4. compaction of defeated enemies, progression and outcome,
//! 5. dispatch to the renderer and audio collaborators.
//!
//! Projectiles requested by the first two phases are handed to the world
//! between phases, so systems only ever hold borrows of the collections they
//! touch.

mod config;

use std::time::Duration;

use maze_quest_core::{
    AudioCue, AudioSink, CollaboratorError, Combatant, CombatEvent, Command, Event, FrameView,
    GameStatus, Launch, Persistence, Renderer, SaveSnapshot, SimError,
};
use maze_quest_system_combat::CombatResolver;
use maze_quest_system_enemy_ai::EnemyController;
use maze_quest_system_progression::{tally, Progression};
use maze_quest_system_projectiles::ProjectileSim;
use maze_quest_world::{self as world, query, LevelError, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use config::{MazeConfig, SimulationConfig};

/// Failures raised while setting up or persisting a simulation.
#[derive(Debug, Error)]
pub enum ClockError {
    /// The configured tick rate was zero.
    #[error("tick rate must be positive")]
    ZeroTickRate,
    /// A snapshot referenced a maze that could not be rebuilt.
    #[error("could not rebuild the saved maze: {0}")]
    Level(#[from] LevelError),
    /// Saving or loading was requested without a persistence collaborator.
    #[error("no persistence collaborator is attached")]
    NoPersistence,
    /// The persistence collaborator failed.
    #[error(transparent)]
    Persistence(#[from] CollaboratorError),
}

/// Drives the simulation at a fixed tick rate.
pub struct SimulationClock {
    config: SimulationConfig,
    tick_duration: Duration,
    world: World,
    rng: ChaCha8Rng,
    combat: CombatResolver,
    enemies: EnemyController,
    projectiles: ProjectileSim,
    progression: Progression,
    accumulator: Duration,
    queued: Vec<Command>,
    launches: Vec<Launch>,
    renderer: Option<Box<dyn Renderer>>,
    audio: Option<Box<dyn AudioSink>>,
    persistence: Option<Box<dyn Persistence>>,
}

impl SimulationClock {
    /// Creates a clock over a freshly generated maze.
    pub fn new(config: SimulationConfig) -> Result<Self, ClockError> {
        let world = World::generated(config.seed, config.maze.columns, config.maze.rows);
        Self::with_world(config, world)
    }

    /// Creates a clock over an existing world.
    pub fn with_world(config: SimulationConfig, world: World) -> Result<Self, ClockError> {
        let tick_duration = config.tick_duration().ok_or(ClockError::ZeroTickRate)?;
        tracing::debug!(
            tick_rate = config.tick_rate,
            seed = config.seed,
            "simulation clock created"
        );

        Ok(Self {
            tick_duration,
            world,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            combat: CombatResolver::new(config.contact_cooldown()),
            enemies: EnemyController::new(config.chaser_refresh_chance, config.ranged_fire_chance),
            projectiles: ProjectileSim::new(config.tick_rate),
            progression: Progression::default(),
            accumulator: Duration::ZERO,
            queued: Vec::new(),
            launches: Vec::new(),
            renderer: None,
            audio: None,
            persistence: None,
            config,
        })
    }

    /// Attaches the renderer that receives a frame after every tick.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Attaches the sink that receives audio cues after every tick.
    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attaches the collaborator used by [`save`](Self::save) and [`load`](Self::load).
    #[must_use]
    pub fn with_persistence(mut self, persistence: Box<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Settings the clock was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulated time covered by one tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Session lifecycle.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Frame describing the current state.
    #[must_use]
    pub fn frame(&self) -> FrameView<'_> {
        query::frame(&self.world)
    }

    /// Inputs held for the next tick that [`advance`](Self::advance) runs.
    #[must_use]
    pub fn queued_inputs(&self) -> &[Command] {
        &self.queued
    }

    /// Serialisable state sufficient to restore an equivalent session.
    #[must_use]
    pub fn snapshot(&self) -> SaveSnapshot {
        query::snapshot(&self.world)
    }

    /// Accumulates `frame_dt` of real time and runs the whole ticks it covers.
    ///
    /// `inputs` are applied on the first tick that runs, which may be a later
    /// call when `frame_dt` is shorter than one tick. At most
    /// `max_catch_up_ticks` ticks run per call; any further backlog is
    /// dropped. Once the session is finished inputs are discarded. Returns
    /// the events of every tick that ran, in order.
    pub fn advance(&mut self, frame_dt: Duration, inputs: &[Command]) -> Result<Vec<Event>, SimError> {
        if self.status().is_finished() {
            self.queued.clear();
            return Ok(Vec::new());
        }
        self.queued.extend_from_slice(inputs);

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        let budget = self.config.max_catch_up_ticks.max(1);
        let mut events = Vec::new();
        let mut ran = 0;
        while self.accumulator >= self.tick_duration && ran < budget {
            self.accumulator -= self.tick_duration;
            let commands = std::mem::take(&mut self.queued);
            events.extend(self.tick(&commands)?);
            ran += 1;
        }

        if self.accumulator >= self.tick_duration {
            tracing::debug!(
                backlog_ms = self.accumulator.as_millis() as u64,
                "dropping simulation backlog"
            );
            self.accumulator = Duration::ZERO;
        }

        Ok(events)
    }

    /// Runs exactly one tick with the provided intents.
    ///
    /// Finished sessions no longer advance and yield no events. An
    /// [`SimError::OutOfBounds`] aborts the tick and its events are discarded.
    pub fn tick(&mut self, inputs: &[Command]) -> Result<Vec<Event>, SimError> {
        if self.status().is_finished() {
            return Ok(Vec::new());
        }

        let outcome = self.run_tick(inputs);
        if let Err(error) = &outcome {
            tracing::warn!(%error, "tick aborted");
            self.discard_partial_tick();
        }
        outcome
    }

    /// Drops attacks and launches a failed tick left behind.
    fn discard_partial_tick(&mut self) {
        let _ = world::take_pending_attacks(&mut self.world);
        self.launches.clear();
    }

    fn run_tick(&mut self, inputs: &[Command]) -> Result<Vec<Event>, SimError> {
        let mut events = Vec::new();
        world::begin_tick(&mut self.world, self.tick_duration, &mut events);

        for command in inputs {
            world::apply(&mut self.world, *command, &mut events)?;
        }
        if self.status().is_finished() {
            self.dispatch(&events);
            return Ok(events);
        }

        let attacks = world::take_pending_attacks(&mut self.world);
        {
            let parts = world::tick_parts(&mut self.world);
            for weapon in attacks {
                self.combat.player_attack(
                    weapon,
                    parts.player,
                    parts.enemies,
                    &mut self.launches,
                    &mut events,
                );
            }
        }
        self.flush_launches(&mut events);

        {
            let parts = world::tick_parts(&mut self.world);
            self.enemies.update(
                &mut self.rng,
                parts.grid,
                parts.player,
                parts.enemies,
                &mut self.launches,
                &mut events,
            );
            self.combat
                .enemy_contact(parts.elapsed, parts.player, parts.enemies, &mut events);
        }
        self.flush_launches(&mut events);

        {
            let parts = world::tick_parts(&mut self.world);
            self.projectiles.step(
                self.tick_duration,
                parts.grid,
                parts.projectiles,
                parts.player,
                parts.enemies,
                &mut events,
            )?;
        }

        world::remove_defeated(&mut self.world, &mut events);
        {
            let parts = world::tick_parts(&mut self.world);
            tally(parts.stats, &events);
            self.progression.evaluate(
                parts.stats,
                parts.achievements,
                parts.quests,
                parts.player,
                &mut events,
            );
        }
        let _ = world::resolve_outcome(&mut self.world, &mut events);

        self.dispatch(&events);
        tracing::trace!(
            tick = query::tick_index(&self.world),
            events = events.len(),
            "tick complete"
        );
        Ok(events)
    }

    /// Stores the current state through the persistence collaborator.
    pub fn save(&mut self) -> Result<(), ClockError> {
        let snapshot = query::snapshot(&self.world);
        let persistence = self.persistence.as_mut().ok_or(ClockError::NoPersistence)?;
        persistence.save(&snapshot)?;
        tracing::info!(tick = query::tick_index(&self.world), "session saved");
        Ok(())
    }

    /// Replaces the current session with the one held by the persistence
    /// collaborator.
    pub fn load(&mut self) -> Result<(), ClockError> {
        let persistence = self.persistence.as_mut().ok_or(ClockError::NoPersistence)?;
        let snapshot = persistence.load()?;
        self.restore(&snapshot)
    }

    /// Replaces the current session with an equivalent of `snapshot`.
    ///
    /// Pending inputs and accumulated frame time are discarded.
    pub fn restore(&mut self, snapshot: &SaveSnapshot) -> Result<(), ClockError> {
        self.world = World::restore(snapshot)?;
        self.accumulator = Duration::ZERO;
        self.queued.clear();
        tracing::info!("session restored");
        Ok(())
    }

    fn flush_launches(&mut self, events: &mut Vec<Event>) {
        for launch in self.launches.drain(..) {
            let _ = world::launch(&mut self.world, launch, events);
        }
    }

    fn dispatch(&mut self, events: &[Event]) {
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(error) = renderer.present(&query::frame(&self.world)) {
                tracing::warn!(%error, "renderer rejected frame");
            }
        }

        if let Some(audio) = self.audio.as_mut() {
            for cue in audio_cues(events) {
                if let Err(error) = audio.play(cue) {
                    tracing::warn!(%error, ?cue, "audio cue dropped");
                }
            }
        }
    }
}

/// Maps the events of a tick to the audio cues they trigger, in event order.
pub fn audio_cues(events: &[Event]) -> impl Iterator<Item = AudioCue> + '_ {
    events.iter().filter_map(|event| match event {
        Event::AttackPerformed { .. } => Some(AudioCue::AttackFired),
        Event::Combat(CombatEvent {
            target: Combatant::Player,
            damage,
            ..
        }) if *damage > 0 => Some(AudioCue::DamageTaken),
        Event::EnemyDefeated { .. } => Some(AudioCue::EnemyDefeated),
        Event::PlayerVictory => Some(AudioCue::PlayerVictory),
        _ => None,
    })
}
