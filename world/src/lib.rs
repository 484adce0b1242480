#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Chase.
//!
//! The world owns the terrain, the navigation graph, the entities and the
//! score. Adapters mutate it exclusively through [`apply`] and read it
//! through the [`query`] module.

pub mod collectibles;
pub mod config;
pub mod navigation;
pub mod scoring;
mod seeds;
mod spawn;
pub mod terrain;
pub mod thresholds;

use std::time::Duration;

use maze_chase_core::{
    Command, Direction, Event, HeightField, NodeId, Outcome, Pace, WandererId, WELCOME_BANNER,
};
use maze_chase_system_movement::{Runner, RunnerStep, Wanderer, WandererStep};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use config::{ConfigError, WorldConfig};
pub use navigation::{NavGraph, NavigationError, Node};
pub use scoring::GameState;
pub use thresholds::Thresholds;

/// Tick-rate multiplier applied to the runner.
const RUNNER_RATE: f32 = 1.0;

/// Reasons a world cannot be constructed.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration failed validation.
    #[error("invalid world configuration: {0}")]
    Config(#[from] ConfigError),
    /// A supplied height field does not match the configured size.
    #[error("height field is {actual} cells wide but world_size is {expected}")]
    FieldSize {
        /// Configured world size.
        expected: u32,
        /// Size of the supplied field.
        actual: u32,
    },
    /// A supplied height field does not yield a playable graph.
    #[error("supplied terrain is not playable: {0}")]
    Navigation(#[from] NavigationError),
    /// Every generation attempt produced terrain without a start node.
    #[error("no playable terrain after {attempts} generation attempts")]
    GenerationExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

/// Represents the authoritative Maze Chase world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    height_field: HeightField,
    thresholds: Thresholds,
    graph: NavGraph,
    runner: Runner,
    runner_spawn: NodeId,
    wanderers: Vec<WandererSlot>,
    wander_rng: ChaCha8Rng,
    pace: Pace,
    state: GameState,
    running: bool,
}

#[derive(Debug)]
struct WandererSlot {
    id: WandererId,
    spawn: NodeId,
    initial_heading: Direction,
    entity: Wanderer,
}

impl World {
    /// Generates terrain from `seed` and builds a world ready to start.
    ///
    /// Terrain whose canonical start column holds no walkable node is
    /// discarded and regenerated from the next attempt's stream, up to
    /// `generation_attempts` times.
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, WorldError> {
        config.validate()?;

        for attempt in 0..config.generation_attempts {
            let mut rng = seeds::stream(seed, seeds::RNG_STREAM_TERRAIN, attempt);
            let mut height_field = terrain::generate_seeded(config.world_size, &mut rng);
            let thresholds = thresholds::compute(
                &height_field,
                config.node_spacing,
                config.water_percentile,
                config.snow_percentile,
            );
            let flattened = thresholds::flatten(&mut height_field, thresholds.water());

            match navigation::build(&height_field, thresholds, config.node_spacing) {
                Ok(graph) => {
                    debug!(
                        seed,
                        attempt,
                        water = thresholds.water(),
                        snow = thresholds.snow(),
                        flattened,
                        reachable = graph.component().len(),
                        "terrain generated"
                    );
                    return Ok(Self::assemble(config, seed, height_field, thresholds, graph));
                }
                Err(error) => {
                    warn!(seed, attempt, %error, "discarding unplayable terrain");
                }
            }
        }

        Err(WorldError::GenerationExhausted {
            attempts: config.generation_attempts,
        })
    }

    /// Builds a world on top of an already flattened height field.
    pub fn from_terrain(
        config: WorldConfig,
        seed: u64,
        height_field: HeightField,
        thresholds: Thresholds,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        if height_field.size() != config.world_size {
            return Err(WorldError::FieldSize {
                expected: config.world_size,
                actual: height_field.size(),
            });
        }

        let graph = navigation::build(&height_field, thresholds, config.node_spacing)?;
        Ok(Self::assemble(config, seed, height_field, thresholds, graph))
    }

    fn assemble(
        config: WorldConfig,
        seed: u64,
        height_field: HeightField,
        thresholds: Thresholds,
        graph: NavGraph,
    ) -> Self {
        let runner_spawn = graph.start();
        let wanderers = spawn::wanderer_spawns(&graph, config.wanderer_count, runner_spawn)
            .into_iter()
            .zip(0..)
            .map(|(spawn, index)| WandererSlot {
                id: WandererId::new(index),
                spawn: spawn.node,
                initial_heading: spawn.heading,
                entity: Wanderer::new(spawn.node, Some(spawn.heading), config.wander_period),
            })
            .collect();
        let state = GameState::new(graph.collectible_count());

        Self {
            banner: WELCOME_BANNER,
            runner: Runner::new(runner_spawn),
            runner_spawn,
            wanderers,
            wander_rng: seeds::stream(seed, seeds::RNG_STREAM_WANDER, 0),
            pace: Pace::Normal,
            state,
            running: false,
            config,
            height_field,
            thresholds,
            graph,
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        let previous = self.state.outcome();
        let collectibles = self.graph.restock();
        self.state.restart(collectibles);
        self.pace = Pace::Normal;
        self.runner.reset(self.runner_spawn);
        out_events.push(Event::RunStarted { collectibles });

        for slot in &mut self.wanderers {
            slot.entity.reset(slot.spawn, Some(slot.initial_heading));
            if let Some(heading) = slot.entity.settle(&self.graph, &mut self.wander_rng) {
                out_events.push(Event::WandererRedirected {
                    wanderer: slot.id,
                    heading,
                });
            }
        }

        if previous != Outcome::InProgress {
            out_events.push(Event::OutcomeChanged {
                outcome: Outcome::InProgress,
            });
        }
        self.running = true;
        info!(collectibles, wanderers = self.wanderers.len(), "run started");
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        if !self.running {
            return;
        }

        let elapsed = dt.as_secs_f32();
        let spacing = self.graph.spacing() as f32;

        if self.runner.clock_mut().advance(elapsed, spacing, RUNNER_RATE) {
            self.step_runner(out_events);
            if !self.running {
                return;
            }
        }

        let rate = match self.pace {
            Pace::Normal => self.config.normal_wander_rate,
            Pace::Slow => self.config.slow_wander_rate,
        };
        for slot in &mut self.wanderers {
            if !slot.entity.clock_mut().advance(elapsed, spacing, rate) {
                continue;
            }

            match slot.entity.step(&self.graph, &mut self.wander_rng) {
                WandererStep::Moved {
                    from,
                    to,
                    redirected,
                } => {
                    out_events.push(Event::WandererAdvanced {
                        wanderer: slot.id,
                        from,
                        to,
                    });
                    if let Some(heading) = redirected {
                        out_events.push(Event::WandererRedirected {
                            wanderer: slot.id,
                            heading,
                        });
                    }
                }
                WandererStep::Stalled { at } => {
                    out_events.push(Event::WandererStalled {
                        wanderer: slot.id,
                        at,
                    });
                }
            }
        }
    }

    /// Runner step bracketed by collision checks. The pre-check looks along
    /// the direction the step is about to take, pending steer included.
    /// Wanderer moves made later in the same tick are only noticed on the
    /// runner's next step.
    fn step_runner(&mut self, out_events: &mut Vec<Event>) {
        if self.runner_caught(self.runner.intended_heading()) {
            self.finish(Outcome::Lost, out_events);
            return;
        }

        match self.runner.step(&self.graph) {
            RunnerStep::Moved { from, to, climbed } => {
                out_events.push(Event::RunnerAdvanced { from, to });
                let pace = if climbed { Pace::Slow } else { Pace::Normal };
                if pace != self.pace {
                    self.pace = pace;
                    out_events.push(Event::PaceChanged { pace });
                }
            }
            RunnerStep::Blocked { at } => out_events.push(Event::RunnerBlocked { at }),
            RunnerStep::Idle { .. } => {}
        }

        if self.runner_caught(self.runner.heading()) {
            self.finish(Outcome::Lost, out_events);
            return;
        }

        let node = self.runner.node();
        let Some(collectible) = self.graph.node(node).and_then(Node::collectible) else {
            return;
        };
        let points = collectibles::collect(&mut self.graph, node, &mut self.state);
        let won = self.state.credit(points);
        out_events.push(Event::CollectiblePicked {
            node,
            collectible,
            score: self.state.score(),
            remaining: self.state.remaining(),
        });
        if let Some(outcome) = won {
            self.finish(outcome, out_events);
        }
    }

    fn runner_caught(&self, heading: Option<Direction>) -> bool {
        scoring::runner_caught(
            &self.graph,
            self.runner.node(),
            heading,
            self.wanderers.iter().map(|slot| slot.entity.node()),
        )
    }

    fn finish(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if outcome == Outcome::Lost && !self.state.lose() {
            return;
        }

        self.running = false;
        self.runner.clock_mut().reset();
        for slot in &mut self.wanderers {
            slot.entity.clock_mut().reset();
        }
        out_events.push(Event::OutcomeChanged { outcome });
        info!(
            ?outcome,
            score = self.state.score(),
            remaining = self.state.remaining(),
            "run finished"
        );
    }

    #[cfg(test)]
    fn place_runner(&mut self, node: NodeId) {
        self.runner.reset(node);
    }

    #[cfg(test)]
    fn place_wanderer(&mut self, index: usize, node: NodeId, heading: Option<Direction>) {
        self.wanderers[index].entity.reset(node, heading);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Ticks are ignored until the first [`Command::Start`] and after the run
/// ends; steering input is recorded at any time and consumed by the runner's
/// next step.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Start => world.start(out_events),
        Command::Steer { direction } => world.runner.steer(direction),
        Command::Tick { dt } => world.tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_chase_core::{
        EntityKind, EntitySnapshot, HeightField, NodeId, NodeSnapshot, Outcome, Pace,
        WorldSnapshot,
    };

    use super::{NavGraph, Thresholds, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Flattened terrain elevations.
    #[must_use]
    pub fn height_field(world: &World) -> &HeightField {
        &world.height_field
    }

    /// Water and snow lines the graph was built with.
    #[must_use]
    pub fn thresholds(world: &World) -> Thresholds {
        world.thresholds
    }

    /// Provides read-only access to the navigation graph.
    #[must_use]
    pub fn graph(world: &World) -> &NavGraph {
        &world.graph
    }

    /// Points accumulated during the run.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.state.score()
    }

    /// Collectibles left in the maze.
    #[must_use]
    pub fn remaining(world: &World) -> u32 {
        world.state.remaining()
    }

    /// Result of the run so far.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.state.outcome()
    }

    /// Rate the wanderers currently follow.
    #[must_use]
    pub fn pace(world: &World) -> Pace {
        world.pace
    }

    /// Reports whether the world consumes ticks.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Node the runner occupies.
    #[must_use]
    pub fn runner_node(world: &World) -> NodeId {
        world.runner.node()
    }

    /// Nodes occupied by the wanderers in identifier order.
    #[must_use]
    pub fn wanderer_nodes(world: &World) -> Vec<NodeId> {
        world
            .wanderers
            .iter()
            .map(|slot| slot.entity.node())
            .collect()
    }

    /// Captures an owned, read-only view of the world for presentation.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        let graph = &world.graph;
        let spacing = graph.spacing() as f32;

        let nodes = graph
            .nodes()
            .iter()
            .zip(0..)
            .map(|(node, index)| NodeSnapshot {
                id: NodeId::new(index),
                coord: node.coord(),
                position: node.position(),
                elevation: node.elevation(),
                walkable: node.is_walkable(),
                collectible: node.collectible(),
            })
            .collect();

        let mut entities = Vec::with_capacity(world.wanderers.len() + 1);
        entities.push(EntitySnapshot {
            kind: EntityKind::Runner,
            node: world.runner.node(),
            heading: world.runner.heading(),
            target: world.runner.next_node(graph),
            progress: world.runner.clock().progress(spacing),
        });
        for slot in &world.wanderers {
            let wanderer = &slot.entity;
            entities.push(EntitySnapshot {
                kind: EntityKind::Wanderer(slot.id),
                node: wanderer.node(),
                heading: wanderer.heading(),
                target: wanderer.next_node(graph),
                progress: wanderer.clock().progress(spacing),
            });
        }

        WorldSnapshot {
            height_field: world.height_field.clone(),
            water_threshold: world.thresholds.water(),
            snow_threshold: world.thresholds.snow(),
            node_spacing: graph.spacing(),
            nodes_per_axis: graph.nodes_per_axis(),
            nodes,
            entities,
            score: world.state.score(),
            remaining: world.state.remaining(),
            outcome: world.state.outcome(),
            running: world.running,
        }
    }
}
