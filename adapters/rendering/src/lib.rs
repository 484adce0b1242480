#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Chase adapters.
//!
//! Backends never see the world. They receive a [`Scene`] derived from a
//! [`WorldSnapshot`] and hand per-frame input back to the adapter that owns
//! the simulation.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec3;
use maze_chase_core::{
    Collectible, Direction, EntityKind, EntitySnapshot, HeightField, NodeCoord, NodeId, Outcome,
    WorldSnapshot,
};
use thiserror::Error;

/// Title used by windowed backends.
pub const WINDOW_TITLE: &str = "Maze Chase";

/// Solid color used to clear each frame.
pub const CLEAR_COLOR: Color = Color::rgb(0.7, 0.7, 0.7);

/// Height of an entity above the terrain surface, in world units.
pub const ENTITY_LIFT: f32 = 10.0;

const START_PROMPT: &str = "Press 's' to start";
const QUIT_PROMPT: &str = "Press 'q' to exit";

const RUNNER_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);
const WANDERER_COLORS: [Color; 4] = [
    Color::rgb(1.0, 0.0, 0.0),
    Color::rgb(0.0, 1.0, 1.0),
    Color::rgb(1.0, 0.5, 0.0),
    Color::rgb(1.0, 0.5, 0.5),
];

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from floating point channels.
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction requested for the runner on this frame.
    pub steer: Option<Direction>,
    /// Whether a start or restart was requested on this frame.
    pub start: bool,
}

/// Elevation band used to color the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainBand {
    /// At or below the water line.
    Water,
    /// Low land just above the water line.
    Soil,
    /// Land between 30% and 70% of the elevation ceiling.
    Grass,
    /// Land above 70% of the elevation ceiling but below the snow line.
    Mountain,
    /// At or above the snow line.
    Snow,
}

impl TerrainBand {
    /// Classifies an elevation. `ceiling` is half the height-field size.
    #[must_use]
    pub fn classify(elevation: f32, water: f32, snow: f32, ceiling: f32) -> Self {
        if elevation >= snow {
            Self::Snow
        } else if elevation > 0.7 * ceiling {
            Self::Mountain
        } else if elevation > 0.3 * ceiling {
            Self::Grass
        } else if elevation > water {
            Self::Soil
        } else {
            Self::Water
        }
    }

    /// Surface color of the band, shaded by the relative elevation.
    #[must_use]
    pub fn color(self, elevation: f32, ceiling: f32) -> Color {
        let shade = if ceiling > 0.0 {
            (elevation / ceiling).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self {
            Self::Water => Color::rgb(0.0, 0.0, 0.7),
            Self::Soil => Color::rgb(shade, shade, shade / 5.0),
            Self::Grass => Color::rgb(0.0, shade, 0.0),
            Self::Mountain => Color::rgb(shade, shade / 2.0, 0.0),
            Self::Snow => Color::rgb(0.9, 0.9, 0.9),
        }
    }
}

/// Single colored terrain sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainCell {
    /// Elevation of the cell.
    pub elevation: f32,
    /// Band the elevation falls into.
    pub band: TerrainBand,
    /// Shaded surface color.
    pub color: Color,
}

/// Colored terrain surface derived once from the height field.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainPresentation {
    size: u32,
    cells: Vec<TerrainCell>,
}

impl TerrainPresentation {
    /// Classifies every cell of the height field.
    pub fn new(field: &HeightField, water: f32, snow: f32) -> Result<Self, RenderingError> {
        let size = field.size();
        if size == 0 {
            return Err(RenderingError::EmptyTerrain);
        }

        let ceiling = (size / 2) as f32;
        let cells = field
            .cells()
            .iter()
            .map(|&elevation| {
                let band = TerrainBand::classify(elevation, water, snow, ceiling);
                TerrainCell {
                    elevation,
                    band,
                    color: band.color(elevation, ceiling),
                }
            })
            .collect();

        Ok(Self { size, cells })
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Cell at the provided coordinate.
    #[must_use]
    pub fn cell(&self, x: u32, z: u32) -> Option<&TerrainCell> {
        if x >= self.size || z >= self.size {
            return None;
        }
        let index = usize::try_from(u64::from(z) * u64::from(self.size) + u64::from(x)).ok()?;
        self.cells.get(index)
    }
}

/// Static description of a navigation node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePresentation {
    /// Node identifier.
    pub id: NodeId,
    /// Coarse grid coordinate.
    pub coord: NodeCoord,
    /// Terrain surface point sampled by the node.
    pub surface: Vec3,
    /// Band of the sampled elevation.
    pub band: TerrainBand,
    /// Whether entities may stand on the node.
    pub walkable: bool,
}

/// Collectible marker floating above a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPresentation {
    /// Node holding the collectible.
    pub node: NodeId,
    /// Kind of collectible.
    pub collectible: Collectible,
    /// Marker position in world space.
    pub position: Vec3,
}

/// Amount of geometry a backend should spend on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// Close to the runner.
    High,
    /// Moderately far from the runner.
    Medium,
    /// Far from the runner.
    Low,
}

impl DetailLevel {
    /// Picks a detail level from the grid distance between two nodes.
    #[must_use]
    pub fn between(viewer: NodeCoord, subject: NodeCoord) -> Self {
        let columns = viewer.column().abs_diff(subject.column());
        let rows = viewer.row().abs_diff(subject.row());
        if columns < 5 && rows < 5 {
            Self::High
        } else if columns < 15 && rows < 15 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Entity placed in world space for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityPresentation {
    /// Which entity this is.
    pub kind: EntityKind,
    /// Node the entity occupies.
    pub node: NodeId,
    /// Grid coordinate of the occupied node.
    pub coord: NodeCoord,
    /// Interpolated position along the current edge.
    pub position: Vec3,
    /// Body color.
    pub color: Color,
    /// Level of detail relative to the runner.
    pub detail: DetailLevel,
}

/// Scene description combining terrain, markers, entities and status text.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Colored terrain surface.
    pub terrain: TerrainPresentation,
    /// Number of nodes along each axis.
    pub nodes_per_axis: u32,
    /// Every navigation node in table order.
    pub nodes: Vec<NodePresentation>,
    /// Collectibles still in the maze.
    pub markers: Vec<MarkerPresentation>,
    /// The runner followed by every wanderer.
    pub entities: Vec<EntityPresentation>,
    /// Status lines drawn over the scene.
    pub hud: Vec<String>,
    /// Points accumulated during the run.
    pub score: u32,
    /// Collectibles left in the maze.
    pub remaining: u32,
    /// Result of the run so far.
    pub outcome: Outcome,
    /// Whether the simulation is consuming ticks.
    pub running: bool,
}

impl Scene {
    /// Builds a complete scene, terrain included, from a snapshot.
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Result<Self, RenderingError> {
        let terrain = TerrainPresentation::new(
            &snapshot.height_field,
            snapshot.water_threshold,
            snapshot.snow_threshold,
        )?;
        let ceiling = (terrain.size() / 2) as f32;

        let nodes = snapshot
            .nodes
            .iter()
            .map(|node| NodePresentation {
                id: node.id,
                coord: node.coord,
                surface: Vec3::new(
                    node.position.x() as f32,
                    node.elevation,
                    node.position.z() as f32,
                ),
                band: TerrainBand::classify(
                    node.elevation,
                    snapshot.water_threshold,
                    snapshot.snow_threshold,
                    ceiling,
                ),
                walkable: node.walkable,
            })
            .collect();

        let mut scene = Self {
            terrain,
            nodes_per_axis: snapshot.nodes_per_axis,
            nodes,
            markers: Vec::new(),
            entities: Vec::new(),
            hud: Vec::new(),
            score: 0,
            remaining: 0,
            outcome: Outcome::InProgress,
            running: false,
        };
        scene.refresh(snapshot)?;
        Ok(scene)
    }

    /// Updates markers, entities and status from a newer snapshot of the
    /// same world. Terrain is left untouched.
    pub fn refresh(&mut self, snapshot: &WorldSnapshot) -> Result<(), RenderingError> {
        if snapshot.nodes.len() != self.nodes.len() {
            return Err(RenderingError::NodeCountMismatch {
                expected: self.nodes.len(),
                actual: snapshot.nodes.len(),
            });
        }

        self.markers = snapshot
            .nodes
            .iter()
            .filter_map(|node| {
                let collectible = node.collectible?;
                let lift = match collectible {
                    Collectible::Ordinary => ENTITY_LIFT / 4.0,
                    Collectible::Bonus => ENTITY_LIFT,
                };
                Some(MarkerPresentation {
                    node: node.id,
                    collectible,
                    position: Vec3::new(
                        node.position.x() as f32,
                        node.elevation + lift,
                        node.position.z() as f32,
                    ),
                })
            })
            .collect();

        let viewer = match snapshot.runner() {
            Some(runner) => self.node(runner.node)?.coord,
            None => NodeCoord::new(0, 0),
        };
        self.entities = snapshot
            .entities
            .iter()
            .map(|entity| self.place(entity, viewer))
            .collect::<Result<_, _>>()?;

        self.score = snapshot.score;
        self.remaining = snapshot.remaining;
        self.outcome = snapshot.outcome;
        self.running = snapshot.running;
        self.hud = status_lines(snapshot.score, snapshot.outcome, snapshot.running);
        Ok(())
    }

    /// Presentation of the runner, if the snapshot contained one.
    #[must_use]
    pub fn runner(&self) -> Option<&EntityPresentation> {
        self.entities
            .iter()
            .find(|entity| entity.kind == EntityKind::Runner)
    }

    /// Static description of the node with the provided identifier.
    pub fn node(&self, id: NodeId) -> Result<&NodePresentation, RenderingError> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.nodes.get(index))
            .ok_or(RenderingError::UnknownNode { node: id })
    }

    fn place(
        &self,
        entity: &EntitySnapshot,
        viewer: NodeCoord,
    ) -> Result<EntityPresentation, RenderingError> {
        let origin = self.node(entity.node)?;
        let surface = match entity.target {
            Some(target) => {
                let destination = self.node(target)?.surface;
                origin
                    .surface
                    .lerp(destination, entity.progress.clamp(0.0, 1.0))
            }
            None => origin.surface,
        };

        let (color, detail) = match entity.kind {
            EntityKind::Runner => (RUNNER_COLOR, DetailLevel::High),
            EntityKind::Wanderer(id) => {
                let slot = usize::try_from(id.get()).unwrap_or(0) % WANDERER_COLORS.len();
                (
                    WANDERER_COLORS[slot],
                    DetailLevel::between(viewer, origin.coord),
                )
            }
        };

        Ok(EntityPresentation {
            kind: entity.kind,
            node: entity.node,
            coord: origin.coord,
            position: surface + Vec3::Y * ENTITY_LIFT,
            color,
            detail,
        })
    }
}

/// Status lines for the current score and run state.
#[must_use]
pub fn status_lines(score: u32, outcome: Outcome, running: bool) -> Vec<String> {
    let mut lines = vec![format!("Score: {score}")];
    if running {
        return lines;
    }

    match outcome {
        Outcome::InProgress => {
            lines.push(WINDOW_TITLE.to_owned());
            lines.push(START_PROMPT.to_owned());
        }
        Outcome::Lost | Outcome::Won => {
            let banner = if outcome == Outcome::Won {
                "YOU WON!!"
            } else {
                "GAME OVER"
            };
            lines.push(banner.to_owned());
            lines.push(START_PROMPT.to_owned());
            lines.push(QUIT_PROMPT.to_owned());
        }
    }
    lines
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Maze Chase scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the backend, advances the simulation and refreshes
    /// the scene before it is drawn. An error returned by the closure stops
    /// the backend and is propagated.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// The height field holds no cells.
    #[error("height field is empty")]
    EmptyTerrain,
    /// An entity refers to a node the scene does not know.
    #[error("snapshot references unknown node {}", .node.get())]
    UnknownNode {
        /// Identifier that failed to resolve.
        node: NodeId,
    },
    /// A refresh snapshot describes a different graph.
    #[error("snapshot holds {actual} nodes but the scene was built with {expected}")]
    NodeCountMismatch {
        /// Node count of the scene.
        expected: usize,
        /// Node count of the snapshot.
        actual: usize,
    },
}
