#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the movement system. Adapters submit [`Command`]
//! values describing elapsed time, steering input and run control, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing every step, pickup and outcome change.
//! Presentation layers never touch the world directly; they read an owned
//! [`WorldSnapshot`] captured between steps.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Chase.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a run, or resets the current one without rebuilding terrain.
    Start,
    /// Records the most recent directional input for the runner.
    ///
    /// Only the latest steer before a runner step is honoured.
    Steer {
        /// Direction the runner should take on its next step.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a run started with a freshly stocked maze.
    RunStarted {
        /// Number of collectibles placed for the run.
        collectibles: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of real time consumed by the tick.
        dt: Duration,
    },
    /// Confirms that the runner moved along a single graph edge.
    RunnerAdvanced {
        /// Node the runner occupied before moving.
        from: NodeId,
        /// Node the runner occupies after moving.
        to: NodeId,
    },
    /// Reports that the runner stopped because its heading led into a wall.
    RunnerBlocked {
        /// Node the runner remains on.
        at: NodeId,
    },
    /// Confirms that a wanderer moved along a single graph edge.
    WandererAdvanced {
        /// Identifier of the wanderer that moved.
        wanderer: WandererId,
        /// Node the wanderer occupied before moving.
        from: NodeId,
        /// Node the wanderer occupies after moving.
        to: NodeId,
    },
    /// Reports that a wanderer picked a new random heading.
    WandererRedirected {
        /// Identifier of the wanderer that changed heading.
        wanderer: WandererId,
        /// Heading adopted by the wanderer.
        heading: Direction,
    },
    /// Reports that a wanderer found no edge to follow.
    WandererStalled {
        /// Identifier of the stalled wanderer.
        wanderer: WandererId,
        /// Node the wanderer remains on.
        at: NodeId,
    },
    /// Announces that the wanderers' shared tick-rate changed.
    PaceChanged {
        /// Pace the wanderers now follow.
        pace: Pace,
    },
    /// Confirms that the runner picked up a collectible.
    CollectiblePicked {
        /// Node that held the collectible.
        node: NodeId,
        /// Kind of collectible that was consumed.
        collectible: Collectible,
        /// Score after the pickup was credited.
        score: u32,
        /// Collectibles left in the maze.
        remaining: u32,
    },
    /// Announces a change of the run outcome.
    OutcomeChanged {
        /// Outcome that became active.
        outcome: Outcome,
    },
}

/// Cardinal movement directions on the coarse navigation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in the order neighbor slots are stored.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Slot index used when storing per-direction data.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Unit offset expressed as `(column, row)` deltas.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Cardinal direction leading from one coordinate toward another.
    ///
    /// Column differences take precedence over row differences, so diagonal
    /// pairs resolve horizontally. Identical coordinates yield `None`.
    #[must_use]
    pub fn between(from: NodeCoord, to: NodeCoord) -> Option<Self> {
        if to.column() > from.column() {
            Some(Self::East)
        } else if to.column() < from.column() {
            Some(Self::West)
        } else if to.row() > from.row() {
            Some(Self::South)
        } else if to.row() < from.row() {
            Some(Self::North)
        } else {
            None
        }
    }
}

/// Index of a node within the navigation graph's node table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a wanderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WandererId(u32);

impl WandererId {
    /// Creates a new wanderer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a node on the coarse grid expressed as column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeCoord {
    column: u32,
    row: u32,
}

impl NodeCoord {
    /// Creates a new coarse grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the node.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the node.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Coordinate one step away in the provided direction, if it stays
    /// inside a square grid of `extent` nodes per axis.
    #[must_use]
    pub fn step(self, direction: Direction, extent: u32) -> Option<Self> {
        let (dc, dr) = direction.offset();
        let column = self.column.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        (column < extent && row < extent).then_some(Self::new(column, row))
    }
}

/// Height-field cell sampled by a node, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPosition {
    x: u32,
    z: u32,
}

impl WorldPosition {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Position along the height field's x axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Position along the height field's z axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }
}

/// Pickup held by a reachable node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collectible {
    /// Common pickup placed on every reachable node.
    Ordinary,
    /// Pickup placed on reachable corners of the grid.
    Bonus,
}

impl Collectible {
    /// Points credited when the collectible is picked up.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Ordinary => 10,
            Self::Bonus => 100,
        }
    }
}

/// Result of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The run has not ended.
    InProgress,
    /// Every collectible was picked up.
    Won,
    /// The runner collided with a wanderer.
    Lost,
}

impl Outcome {
    /// Reports whether the outcome ends the run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Shared tick-rate followed by every wanderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pace {
    /// Default rate.
    Normal,
    /// Reduced rate applied while the runner climbs.
    Slow,
}

/// Square grid of terrain elevations indexed by `(x, z)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    size: u32,
    cells: Vec<f32>,
}

impl HeightField {
    /// Creates a field of `size * size` cells, all set to `fill`.
    #[must_use]
    pub fn filled(size: u32, fill: f32) -> Self {
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            size,
            cells: vec![fill; capacity],
        }
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Highest elevation the generator can produce for this size.
    #[must_use]
    pub fn max_elevation(&self) -> f32 {
        (self.size / 2) as f32 - 1.0
    }

    /// Elevation stored at the provided cell, if it lies inside the field.
    #[must_use]
    pub fn get(&self, x: u32, z: u32) -> Option<f32> {
        let index = self.index(x, z)?;
        self.cells.get(index).copied()
    }

    /// Mutable access to the elevation stored at the provided cell.
    pub fn get_mut(&mut self, x: u32, z: u32) -> Option<&mut f32> {
        let index = self.index(x, z)?;
        self.cells.get_mut(index)
    }

    /// Elevation sampled at a world position.
    #[must_use]
    pub fn at(&self, position: WorldPosition) -> Option<f32> {
        self.get(position.x(), position.z())
    }

    /// Dense elevations stored in row-major order (`z * size + x`).
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Mutable dense elevations stored in row-major order.
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }

    fn index(&self, x: u32, z: u32) -> Option<usize> {
        if x < self.size && z < self.size {
            let row = usize::try_from(z).ok()?;
            let column = usize::try_from(x).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Narrow read-only view of the navigation graph used by moving entities.
pub trait NavigationQuery {
    /// Neighbor wired in the provided direction, if any.
    fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId>;

    /// Every wired neighbor of the node.
    fn adjacent(&self, node: NodeId) -> &[NodeId];

    /// Coarse grid coordinate of the node.
    fn coord(&self, node: NodeId) -> Option<NodeCoord>;

    /// Terrain elevation sampled by the node.
    fn elevation(&self, node: NodeId) -> Option<f32>;
}

/// Immutable representation of a single node used for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Index of the node in the node table.
    pub id: NodeId,
    /// Coarse grid coordinate of the node.
    pub coord: NodeCoord,
    /// Height-field cell sampled by the node.
    pub position: WorldPosition,
    /// Elevation sampled at the node's position.
    pub elevation: f32,
    /// Whether the elevation lies strictly between the thresholds.
    pub walkable: bool,
    /// Collectible currently held by the node.
    pub collectible: Option<Collectible>,
}

/// Kind of entity captured by an [`EntitySnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player-controlled entity.
    Runner,
    /// An autonomous entity.
    Wanderer(WandererId),
}

/// Immutable representation of an entity used for interpolated rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Which entity the snapshot describes.
    pub kind: EntityKind,
    /// Node currently occupied.
    pub node: NodeId,
    /// Direction of travel, if any.
    pub heading: Option<Direction>,
    /// Neighbor the entity is heading toward, if the heading has an edge.
    pub target: Option<NodeId>,
    /// Fraction of the current edge already covered, in `0.0..=1.0`.
    pub progress: f32,
}

/// Owned, read-only capture of the world taken between simulation steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Flattened terrain elevations.
    pub height_field: HeightField,
    /// Elevation at or below which terrain counts as water.
    pub water_threshold: f32,
    /// Elevation at or above which terrain counts as snow.
    pub snow_threshold: f32,
    /// Distance between neighboring nodes in height-field cells.
    pub node_spacing: u32,
    /// Number of nodes along each axis of the coarse grid.
    pub nodes_per_axis: u32,
    /// Every node of the coarse grid in table order.
    pub nodes: Vec<NodeSnapshot>,
    /// The runner followed by every wanderer in identifier order.
    pub entities: Vec<EntitySnapshot>,
    /// Points accumulated during the run.
    pub score: u32,
    /// Collectibles left in the maze.
    pub remaining: u32,
    /// Result of the run so far.
    pub outcome: Outcome,
    /// Whether the run is active and consuming ticks.
    pub running: bool,
}

impl WorldSnapshot {
    /// Snapshot of the runner entity.
    #[must_use]
    pub fn runner(&self) -> Option<&EntitySnapshot> {
        self.entities
            .iter()
            .find(|entity| entity.kind == EntityKind::Runner)
    }

    /// Snapshots of every wanderer in identifier order.
    pub fn wanderers(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities
            .iter()
            .filter(|entity| matches!(entity.kind, EntityKind::Wanderer(_)))
    }

    /// Snapshot of the node with the provided identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.nodes.get(index))
    }
}
