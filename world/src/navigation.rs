//! Coarse navigation graph sampled from the flattened height field.

use maze_chase_core::{
    Collectible, Direction, HeightField, NavigationQuery, NodeCoord, NodeId, WorldPosition,
};
use thiserror::Error;

use crate::thresholds::Thresholds;

/// Single sample of the coarse navigation grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    coord: NodeCoord,
    position: WorldPosition,
    elevation: f32,
    walkable: bool,
    visited: bool,
    collectible: Option<Collectible>,
    neighbors: [Option<NodeId>; 4],
    adjacency: Vec<NodeId>,
}

impl Node {
    /// Coarse grid coordinate of the node.
    #[must_use]
    pub const fn coord(&self) -> NodeCoord {
        self.coord
    }

    /// Height-field cell sampled by the node.
    #[must_use]
    pub const fn position(&self) -> WorldPosition {
        self.position
    }

    /// Elevation sampled at the node's position.
    #[must_use]
    pub const fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Whether the elevation lies strictly between the thresholds.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Whether graph construction reached the node from the start node.
    #[must_use]
    pub const fn was_visited(&self) -> bool {
        self.visited
    }

    /// Collectible currently held by the node.
    #[must_use]
    pub const fn collectible(&self) -> Option<Collectible> {
        self.collectible
    }

    /// Neighbor wired in the provided direction.
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<NodeId> {
        self.neighbors[direction.index()]
    }

    /// Every wired neighbor in the order the edges were created.
    #[must_use]
    pub fn adjacency(&self) -> &[NodeId] {
        &self.adjacency
    }

    fn wire(&mut self, direction: Direction, other: NodeId) {
        let slot = &mut self.neighbors[direction.index()];
        if slot.is_none() {
            *slot = Some(other);
            self.adjacency.push(other);
        }
    }
}

/// Node table plus the component reachable from the start node.
///
/// Edges only exist between walkable nodes of that component. Walkable
/// pockets the traversal never reached keep no edges and no collectibles.
#[derive(Clone, Debug)]
pub struct NavGraph {
    nodes_per_axis: u32,
    spacing: u32,
    nodes: Vec<Node>,
    start: NodeId,
    component: Vec<NodeId>,
}

impl NavGraph {
    /// Number of nodes along each axis.
    #[must_use]
    pub const fn nodes_per_axis(&self) -> u32 {
        self.nodes_per_axis
    }

    /// Distance between neighboring nodes in height-field cells.
    #[must_use]
    pub const fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Every node in row-major table order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node stored under the provided identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(slot(id)?)
    }

    /// Identifier of the node at the provided coordinate.
    #[must_use]
    pub fn node_at(&self, coord: NodeCoord) -> Option<NodeId> {
        if coord.column() < self.nodes_per_axis && coord.row() < self.nodes_per_axis {
            Some(NodeId::new(coord.row() * self.nodes_per_axis + coord.column()))
        } else {
            None
        }
    }

    /// Node the traversal started from; also the runner's spawn.
    #[must_use]
    pub const fn start(&self) -> NodeId {
        self.start
    }

    /// Nodes reached by the traversal, in discovery order.
    #[must_use]
    pub fn component(&self) -> &[NodeId] {
        &self.component
    }

    /// Number of nodes currently holding a collectible.
    #[must_use]
    pub fn collectible_count(&self) -> u32 {
        let count = self
            .nodes
            .iter()
            .filter(|node| node.collectible.is_some())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Places an ordinary collectible on every reached node and upgrades the
    /// reached grid corners to bonus collectibles.
    ///
    /// Returns the number of collectibles in the maze afterwards.
    pub fn restock(&mut self) -> u32 {
        for node in &mut self.nodes {
            node.collectible = node.visited.then_some(Collectible::Ordinary);
        }

        let last = self.nodes_per_axis.saturating_sub(1);
        for (column, row) in [(0, 0), (last, 0), (0, last), (last, last)] {
            let Some(index) = self.node_at(NodeCoord::new(column, row)).and_then(slot) else {
                continue;
            };
            let node = &mut self.nodes[index];
            if node.collectible == Some(Collectible::Ordinary) {
                node.collectible = Some(Collectible::Bonus);
            }
        }

        self.collectible_count()
    }

    /// Removes and returns the collectible held by the node.
    pub(crate) fn take_collectible(&mut self, id: NodeId) -> Option<Collectible> {
        let index = slot(id)?;
        self.nodes.get_mut(index)?.collectible.take()
    }

    #[cfg(test)]
    pub(crate) fn set_collectible(&mut self, id: NodeId, collectible: Option<Collectible>) {
        if let Some(node) = slot(id).and_then(|index| self.nodes.get_mut(index)) {
            node.collectible = collectible;
        }
    }

    fn has_walkable_neighbor(&self, coord: NodeCoord) -> bool {
        Direction::ALL.into_iter().any(|direction| {
            coord
                .step(direction, self.nodes_per_axis)
                .and_then(|next| self.node_at(next))
                .and_then(|id| self.node(id))
                .is_some_and(Node::is_walkable)
        })
    }

    fn find_start(&self) -> Result<NodeId, NavigationError> {
        let column = self.nodes_per_axis / 2;
        let from_row = self.nodes_per_axis / 4;

        for row in from_row..self.nodes_per_axis {
            let coord = NodeCoord::new(column, row);
            let Some(id) = self.node_at(coord) else {
                continue;
            };
            let walkable = self.node(id).is_some_and(Node::is_walkable);
            if walkable && self.has_walkable_neighbor(coord) {
                return Ok(id);
            }
        }

        Err(NavigationError::NoStartNode { column, from_row })
    }

    fn traverse(&mut self, start: NodeId) {
        let mut pending = vec![start];

        while let Some(current) = pending.pop() {
            let Some(index) = slot(current) else {
                continue;
            };
            if self.nodes[index].visited || !self.nodes[index].walkable {
                continue;
            }
            self.nodes[index].visited = true;
            self.component.push(current);

            let coord = self.nodes[index].coord;
            for direction in Direction::ALL.into_iter().rev() {
                let Some(next) = coord
                    .step(direction, self.nodes_per_axis)
                    .and_then(|next| self.node_at(next))
                else {
                    continue;
                };
                let Some(next_index) = slot(next) else {
                    continue;
                };
                if !self.nodes[next_index].walkable {
                    continue;
                }

                self.link(current, next, direction);
                if !self.nodes[next_index].visited {
                    pending.push(next);
                }
            }
        }
    }

    fn link(&mut self, from: NodeId, to: NodeId, direction: Direction) {
        if let Some(node) = slot(from).and_then(|index| self.nodes.get_mut(index)) {
            node.wire(direction, to);
        }
        if let Some(node) = slot(to).and_then(|index| self.nodes.get_mut(index)) {
            node.wire(direction.opposite(), from);
        }
    }
}

impl NavigationQuery for NavGraph {
    fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        self.node(node)?.neighbor(direction)
    }

    fn adjacent(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(Node::adjacency).unwrap_or_default()
    }

    fn coord(&self, node: NodeId) -> Option<NodeCoord> {
        self.node(node).map(Node::coord)
    }

    fn elevation(&self, node: NodeId) -> Option<f32> {
        self.node(node).map(Node::elevation)
    }
}

/// Reasons graph construction fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The spacing leaves no room for a single node.
    #[error("node spacing {spacing} leaves no navigation nodes on a {size}-cell field")]
    EmptyGrid {
        /// Size of the height field.
        size: u32,
        /// Requested node spacing.
        spacing: u32,
    },
    /// No walkable node with a walkable neighbor lies on the scanned column.
    #[error("no walkable start node in column {column} from row {from_row} onward")]
    NoStartNode {
        /// Column that was scanned.
        column: u32,
        /// Row the scan began at.
        from_row: u32,
    },
}

/// Builds the navigation graph for a flattened height field.
///
/// Nodes sample the field every `spacing` cells, centred inside the field.
/// A depth-first traversal from the start node wires mutual edges between
/// walkable grid neighbors and stocks every reached node with a collectible.
pub fn build(
    field: &HeightField,
    thresholds: Thresholds,
    spacing: u32,
) -> Result<NavGraph, NavigationError> {
    let size = field.size();
    let nodes_per_axis = if spacing == 0 { 0 } else { size / spacing };
    if nodes_per_axis == 0 {
        return Err(NavigationError::EmptyGrid { size, spacing });
    }

    let gap = (size - spacing * nodes_per_axis) / 2;
    let mut nodes = Vec::with_capacity(usize::try_from(nodes_per_axis.pow(2)).unwrap_or(0));
    for row in 0..nodes_per_axis {
        for column in 0..nodes_per_axis {
            let position = WorldPosition::new(
                gap + column * spacing + spacing / 2,
                gap + row * spacing + spacing / 2,
            );
            let elevation = field.at(position).unwrap_or(thresholds.water());
            nodes.push(Node {
                coord: NodeCoord::new(column, row),
                position,
                elevation,
                walkable: thresholds.is_walkable(elevation),
                visited: false,
                collectible: None,
                neighbors: [None; 4],
                adjacency: Vec::new(),
            });
        }
    }

    let mut graph = NavGraph {
        nodes_per_axis,
        spacing,
        nodes,
        start: NodeId::new(0),
        component: Vec::new(),
    };
    graph.start = graph.find_start()?;
    graph.traverse(graph.start);
    let _ = graph.restock();
    Ok(graph)
}

fn slot(id: NodeId) -> Option<usize> {
    usize::try_from(id.get()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds::new(0.5, 10.0);

    /// `.` is walkable land, `^` snow, anything else water.
    fn field_from_rows(spacing: u32, rows: &[&str]) -> HeightField {
        let extent = rows.len() as u32;
        let mut field = HeightField::filled(extent * spacing, 0.0);
        for (row, line) in rows.iter().enumerate() {
            for (column, tile) in line.chars().enumerate() {
                let elevation = match tile {
                    '.' => 1.0,
                    '^' => 20.0,
                    _ => 0.0,
                };
                let x = column as u32 * spacing + spacing / 2;
                let z = row as u32 * spacing + spacing / 2;
                *field.get_mut(x, z).expect("cell inside field") = elevation;
            }
        }
        field
    }

    fn id(graph: &NavGraph, column: u32, row: u32) -> NodeId {
        graph
            .node_at(NodeCoord::new(column, row))
            .expect("coordinate inside grid")
    }

    #[test]
    fn open_grid_connects_every_node() {
        let field = field_from_rows(2, &["....", "....", "....", "...."]);
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        assert_eq!(graph.component().len(), 16);
        assert_eq!(graph.collectible_count(), 16);
        assert_eq!(graph.start(), id(&graph, 2, 1));
        let centre = graph.node(id(&graph, 1, 1)).expect("node");
        assert_eq!(centre.adjacency().len(), 4);
        let corner = graph.node(id(&graph, 0, 0)).expect("node");
        assert_eq!(corner.adjacency().len(), 2);
    }

    #[test]
    fn reached_corners_hold_bonus_collectibles() {
        let field = field_from_rows(2, &["....", "....", "....", "...."]);
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        for (column, row) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
            let node = graph.node(id(&graph, column, row)).expect("node");
            assert_eq!(node.collectible(), Some(Collectible::Bonus));
        }
        let inner = graph.node(id(&graph, 1, 2)).expect("node");
        assert_eq!(inner.collectible(), Some(Collectible::Ordinary));
    }

    #[test]
    fn isolated_pockets_stay_unwired() {
        let field = field_from_rows(
            2,
            &[
                ".####", //
                "#...#", //
                "#####", //
                "#.#.#", //
                "#####",
            ],
        );
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        assert_eq!(graph.start(), id(&graph, 2, 1));
        assert_eq!(graph.component().len(), 3);
        assert_eq!(graph.collectible_count(), 3);

        for (column, row) in [(0, 0), (1, 3), (3, 3)] {
            let pocket = graph.node(id(&graph, column, row)).expect("node");
            assert!(pocket.is_walkable());
            assert!(!pocket.was_visited());
            assert!(pocket.adjacency().is_empty());
            assert_eq!(pocket.collectible(), None);
        }
    }

    #[test]
    fn start_scan_skips_nodes_without_walkable_neighbors() {
        let field = field_from_rows(
            2,
            &[
                "#####", //
                "##.##", //
                "#####", //
                "##.##", //
                "##.##",
            ],
        );
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        assert_eq!(graph.start(), id(&graph, 2, 3));
        assert_eq!(graph.component().len(), 2);
    }

    #[test]
    fn missing_start_node_is_reported() {
        let field = field_from_rows(2, &["....", "^^^^", "####", "..#."]);
        let error = build(&field, THRESHOLDS, 2).expect_err("no start");
        assert_eq!(
            error,
            NavigationError::NoStartNode {
                column: 2,
                from_row: 1
            }
        );
    }

    #[test]
    fn edges_are_mutual() {
        let field = field_from_rows(2, &["..#.", ".#..", "....", "#..#"]);
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        for node in graph.nodes() {
            let here = graph.node_at(node.coord()).expect("coord");
            for direction in Direction::ALL {
                if let Some(other) = node.neighbor(direction) {
                    assert_eq!(
                        graph.neighbor(other, direction.opposite()),
                        Some(here),
                        "edge {here:?} -> {other:?} is one-sided"
                    );
                }
            }
            assert_eq!(
                node.adjacency().len(),
                Direction::ALL
                    .into_iter()
                    .filter(|direction| node.neighbor(*direction).is_some())
                    .count()
            );
        }
    }

    #[test]
    fn snow_and_water_block_traversal() {
        let field = field_from_rows(2, &["....", "..^.", "..#.", "...."]);
        let graph = build(&field, THRESHOLDS, 2).expect("graph");

        assert_eq!(graph.component().len(), 14);
        assert_eq!(graph.neighbor(id(&graph, 1, 1), Direction::East), None);
        assert_eq!(graph.neighbor(id(&graph, 2, 0), Direction::South), None);
    }

    #[test]
    fn zero_spacing_is_rejected() {
        let field = HeightField::filled(4, 1.0);
        assert_eq!(
            build(&field, THRESHOLDS, 0).expect_err("empty grid"),
            NavigationError::EmptyGrid {
                size: 4,
                spacing: 0
            }
        );
    }

    #[test]
    fn restock_replaces_consumed_collectibles() {
        let field = field_from_rows(2, &["....", "....", "....", "...."]);
        let mut graph = build(&field, THRESHOLDS, 2).expect("graph");

        let corner = id(&graph, 0, 0);
        assert_eq!(graph.take_collectible(corner), Some(Collectible::Bonus));
        assert_eq!(graph.take_collectible(corner), None);
        assert_eq!(graph.collectible_count(), 15);

        assert_eq!(graph.restock(), 16);
        assert_eq!(
            graph.node(corner).and_then(Node::collectible),
            Some(Collectible::Bonus)
        );
    }
}
