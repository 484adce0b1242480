#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a seeded Maze Chase simulation headlessly.

mod autopilot;
mod settings;
mod text_backend;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_core::Command;
use maze_chase_rendering::{Presentation, RenderingBackend, Scene, CLEAR_COLOR, WINDOW_TITLE};
use maze_chase_world::{self as world, query, World};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{autopilot::Autopilot, settings::Settings, text_backend::TextBackend};

/// Command-line arguments for a headless run.
#[derive(Debug, Parser)]
#[command(
    name = "maze-chase",
    version,
    about = "Runs a seeded Maze Chase simulation without a window"
)]
struct CliArgs {
    /// Seed for terrain generation and wanderer movement.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file with [world] and [run] sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Frames to simulate before stopping.
    #[arg(long)]
    frames: Option<u32>,
    /// Simulated milliseconds per frame.
    #[arg(long, value_name = "MS")]
    frame_ms: Option<u64>,
    /// Seed for the scripted steering input; defaults to the world seed.
    #[arg(long)]
    autopilot_seed: Option<u64>,
    /// Frames between steering inputs; zero never steers.
    #[arg(long, value_name = "FRAMES")]
    steer_every: Option<u32>,
    /// Prints an ASCII map of the final scene.
    #[arg(long)]
    map: bool,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let frames = args.frames.unwrap_or(settings.run.frames);
    let frame_time = Duration::from_millis(args.frame_ms.unwrap_or(settings.run.frame_ms));
    let steer_every = args.steer_every.unwrap_or(settings.run.steer_every);
    let autopilot = Autopilot::new(args.autopilot_seed.unwrap_or(args.seed), steer_every);

    let mut world = World::new(settings.world, args.seed)
        .with_context(|| format!("failed to generate a world from seed {}", args.seed))?;
    println!("{}", query::welcome_banner(&world));
    info!(seed = args.seed, frames, "starting headless run");

    let scene = Scene::from_snapshot(&query::snapshot(&world))
        .context("failed to build the initial scene")?;
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
    let backend = TextBackend::new(io::stdout(), frames, frame_time, autopilot).with_map(args.map);

    backend.run(presentation, move |dt, input, scene| {
        let mut events = Vec::new();
        if input.start {
            world::apply(&mut world, Command::Start, &mut events);
        }
        if let Some(direction) = input.steer {
            world::apply(&mut world, Command::Steer { direction }, &mut events);
        }
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        for event in &events {
            debug!(?event, "world event");
        }
        scene
            .refresh(&query::snapshot(&world))
            .context("failed to refresh the scene")
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn flags_override_nothing_by_default() {
        let args = CliArgs::try_parse_from(["maze-chase"]).expect("defaults");
        assert_eq!(args.seed, 0);
        assert!(args.config.is_none());
        assert!(args.frames.is_none());
        assert!(!args.map);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "maze-chase",
            "--seed",
            "42",
            "--frames",
            "120",
            "--frame-ms",
            "16",
            "--steer-every",
            "0",
            "--map",
        ])
        .expect("valid flags");
        assert_eq!(args.seed, 42);
        assert_eq!(args.frames, Some(120));
        assert_eq!(args.frame_ms, Some(16));
        assert_eq!(args.steer_every, Some(0));
        assert!(args.map);
    }
}
