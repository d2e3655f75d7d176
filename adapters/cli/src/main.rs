#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Maze Quest sessions headlessly.

mod collaborators;
mod script;
mod snapshot_transfer;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use maze_quest_core::{Command, Persistence};
use maze_quest_rendering::AsciiRenderer;
use maze_quest_simulation::{SimulationClock, SimulationConfig};
use maze_quest_world::{query, World};
use tracing_subscriber::filter::EnvFilter;

use crate::{
    collaborators::{FilePersistence, LoggingAudio},
    script::Step,
};

/// Runs a Maze Quest session without a window.
#[derive(Parser, Debug)]
#[command(name = "maze-quest", version)]
struct Args {
    /// TOML file with simulation settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for maze generation and enemy decisions.
    #[arg(long)]
    seed: Option<u64>,
    /// Columns of the generated maze.
    #[arg(long)]
    columns: Option<u32>,
    /// Rows of the generated maze.
    #[arg(long)]
    rows: Option<u32>,
    /// ASCII layout to play instead of a generated maze.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Input script replayed one directive per tick.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Idle ticks simulated after the script ends.
    #[arg(long, default_value_t = 0)]
    ticks: u64,
    /// Draw every N-th tick to stdout; nothing is drawn when omitted.
    #[arg(long)]
    render_every: Option<u64>,
    /// File the session is saved to when the run ends.
    #[arg(long)]
    save: Option<PathBuf>,
    /// File holding a session to resume.
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut clock = build_clock(&args, config)?;

    if let Some(path) = &args.load {
        let snapshot = FilePersistence::new(path)
            .load()
            .with_context(|| format!("failed to load session from {}", path.display()))?;
        clock
            .restore(&snapshot)
            .with_context(|| format!("failed to restore session from {}", path.display()))?;
    }

    let steps = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            script::parse(&source)
                .with_context(|| format!("invalid script {}", path.display()))?
        }
        None => Vec::new(),
    };

    run(&mut clock, &steps, args.ticks)?;

    let stats = query::stats(clock.world());
    println!(
        "{:?} after {} ticks: {} enemies defeated, {} damage taken, {} cells walked",
        clock.status(),
        query::tick_index(clock.world()),
        stats.enemies_defeated,
        stats.damage_taken,
        stats.cells_walked,
    );

    if args.save.is_some() {
        clock.save().context("failed to save session")?;
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&source)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(columns) = args.columns {
        config.maze.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.maze.rows = rows;
    }

    Ok(config)
}

fn build_clock(args: &Args, config: SimulationConfig) -> Result<SimulationClock> {
    let mut clock = match &args.layout {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            let rows: Vec<&str> = source.lines().filter(|row| !row.trim().is_empty()).collect();
            let world = World::from_layout(&rows)
                .with_context(|| format!("invalid layout {}", path.display()))?;
            SimulationClock::with_world(config, world)?
        }
        None => SimulationClock::new(config)?,
    };

    clock = clock.with_audio(Box::new(LoggingAudio::new()));
    if let Some(every) = args.render_every {
        let renderer = AsciiRenderer::new(io::stdout()).with_interval(every);
        clock = clock.with_renderer(Box::new(renderer));
    }
    if let Some(path) = &args.save {
        clock = clock.with_persistence(Box::new(FilePersistence::new(path)));
    }

    Ok(clock)
}

fn run(clock: &mut SimulationClock, steps: &[Step], idle_ticks: u64) -> Result<()> {
    for step in steps {
        match *step {
            Step::Input(command) => {
                let _ = clock.tick(&[command]).context("simulation tick failed")?;
            }
            Step::Wait(ticks) => idle(clock, u64::from(ticks))?,
        }
        if clock.status().is_finished() {
            tracing::info!(status = ?clock.status(), "session finished");
            return Ok(());
        }
    }

    idle(clock, idle_ticks)
}

fn idle(clock: &mut SimulationClock, ticks: u64) -> Result<()> {
    const NO_INPUT: [Command; 0] = [];
    for _ in 0..ticks {
        if clock.status().is_finished() {
            break;
        }
        let _ = clock.tick(&NO_INPUT).context("simulation tick failed")?;
    }
    Ok(())
}
