//! Score bookkeeping and runner/wanderer collision detection.

use maze_chase_core::{Direction, NavigationQuery, NodeId, Outcome};

/// Score, collectible tally and outcome of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    score: u32,
    remaining: u32,
    outcome: Outcome,
}

impl GameState {
    /// Creates a fresh run state for a maze holding `remaining` collectibles.
    #[must_use]
    pub const fn new(remaining: u32) -> Self {
        Self {
            score: 0,
            remaining,
            outcome: Outcome::InProgress,
        }
    }

    /// Points accumulated during the run.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Collectibles left in the maze.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Result of the run so far.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Adds `points` to the score and declares the run won once the last
    /// collectible is gone.
    ///
    /// Returns the outcome when this call changed it.
    pub fn credit(&mut self, points: u32) -> Option<Outcome> {
        self.score = self.score.saturating_add(points);
        if self.remaining == 0 && self.outcome == Outcome::InProgress {
            self.outcome = Outcome::Won;
            return Some(Outcome::Won);
        }
        None
    }

    /// Declares the run lost unless it already ended.
    ///
    /// Returns `true` when the outcome changed.
    pub fn lose(&mut self) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = Outcome::Lost;
        true
    }

    pub(crate) fn consume_one(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub(crate) fn restart(&mut self, remaining: u32) {
        *self = Self::new(remaining);
    }
}

/// Reports whether a wanderer shares the runner's node or occupies the node
/// the runner is heading into.
///
/// The second case keeps the runner from passing through a wanderer that is
/// walking the same edge the other way.
#[must_use]
pub fn runner_caught<Q, I>(
    nav: &Q,
    runner: NodeId,
    heading: Option<Direction>,
    wanderers: I,
) -> bool
where
    Q: NavigationQuery + ?Sized,
    I: IntoIterator<Item = NodeId>,
{
    let ahead = heading.and_then(|direction| nav.neighbor(runner, direction));
    wanderers
        .into_iter()
        .any(|node| node == runner || Some(node) == ahead)
}
