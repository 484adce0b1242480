//! Pickup of collectibles placed on the navigation graph.

use maze_chase_core::NodeId;

use crate::{navigation::NavGraph, scoring::GameState};

/// Consumes the collectible held by `node`, if any, and decrements the
/// remaining tally.
///
/// Returns the points the collectible is worth, or zero when the node was
/// already empty.
pub fn collect(graph: &mut NavGraph, node: NodeId, state: &mut GameState) -> u32 {
    match graph.take_collectible(node) {
        Some(collectible) => {
            state.consume_one();
            collectible.points()
        }
        None => 0,
    }
}

/// Collectibles left in the maze.
#[must_use]
pub fn remaining(state: &GameState) -> u32 {
    state.remaining()
}
