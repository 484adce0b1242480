//! Placement of wanderers relative to the runner's spawn column.

use maze_chase_core::{Direction, NodeCoord, NodeId};

use crate::navigation::{NavGraph, Node};

/// Column offset, row offset and initial heading per wanderer slot.
const SPAWN_PATTERN: [(i32, u32, Direction); 4] = [
    (0, 0, Direction::North),
    (0, 1, Direction::South),
    (1, 1, Direction::East),
    (-1, 1, Direction::West),
];

/// Spawn node and initial heading of a single wanderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WandererSpawn {
    pub(crate) node: NodeId,
    pub(crate) heading: Direction,
}

/// Chooses spawn nodes for `count` wanderers.
///
/// Each wanderer scans its column downward from half the grid below the
/// runner's scan origin and takes the first node of the reachable component
/// other than the runner's spawn. Columns that yield nothing fall back to the
/// first component node that is not the runner's spawn.
pub(crate) fn wanderer_spawns(graph: &NavGraph, count: u32, runner: NodeId) -> Vec<WandererSpawn> {
    let extent = graph.nodes_per_axis();
    let origin_row = extent / 4 + extent / 2;
    let last_column = extent.saturating_sub(1);

    let mut spawns = Vec::new();
    for index in 0..count {
        let slot = usize::try_from(index).unwrap_or(0) % SPAWN_PATTERN.len();
        let (column_offset, row_offset, heading) = SPAWN_PATTERN[slot];
        let column = (extent / 2)
            .saturating_add_signed(column_offset)
            .min(last_column);
        let row = origin_row + row_offset + index / 4;

        let node = scan_column(graph, column, row, runner)
            .or_else(|| fallback(graph, runner))
            .unwrap_or(runner);
        spawns.push(WandererSpawn { node, heading });
    }
    spawns
}

fn scan_column(graph: &NavGraph, column: u32, from_row: u32, runner: NodeId) -> Option<NodeId> {
    (from_row..graph.nodes_per_axis())
        .filter_map(|row| graph.node_at(NodeCoord::new(column, row)))
        .find(|id| *id != runner && graph.node(*id).is_some_and(Node::was_visited))
}

fn fallback(graph: &NavGraph, runner: NodeId) -> Option<NodeId> {
    graph.component().iter().copied().find(|id| *id != runner)
}
