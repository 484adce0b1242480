#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity controllers that move the runner and the wanderers along the
//! navigation graph one edge at a time.
//!
//! Controllers only read the graph through [`NavigationQuery`]. The world
//! owns the controllers, feeds them elapsed time through a [`StepClock`] and
//! turns the reported steps into events.

use maze_chase_core::{Direction, NavigationQuery, NodeId};
use rand::Rng;

/// Accumulates scaled elapsed time until a whole edge has been covered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepClock {
    accumulated: f32,
}

impl StepClock {
    /// Creates an empty clock.
    #[must_use]
    pub const fn new() -> Self {
        Self { accumulated: 0.0 }
    }

    /// Adds `elapsed * spacing * rate` and reports whether the total exceeded
    /// `spacing`.
    ///
    /// A due step empties the clock; the overshoot is dropped, so a single
    /// call never yields more than one step.
    pub fn advance(&mut self, elapsed: f32, spacing: f32, rate: f32) -> bool {
        self.accumulated += elapsed * spacing * rate;
        if self.accumulated > spacing {
            self.accumulated = 0.0;
            return true;
        }
        false
    }

    /// Fraction of the current edge already covered, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, spacing: f32) -> f32 {
        if spacing <= 0.0 {
            return 0.0;
        }
        (self.accumulated / spacing).clamp(0.0, 1.0)
    }

    /// Empties the clock.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

/// Result of a single runner step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunnerStep {
    /// The runner has no heading and stays put.
    Idle {
        /// Node the runner occupies.
        at: NodeId,
    },
    /// The heading led into a wall; the heading was cleared.
    Blocked {
        /// Node the runner remains on.
        at: NodeId,
    },
    /// The runner crossed one edge.
    Moved {
        /// Node the runner left.
        from: NodeId,
        /// Node the runner arrived at.
        to: NodeId,
        /// Whether the destination lies higher than the origin.
        climbed: bool,
    },
}

/// Player-controlled entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Runner {
    node: NodeId,
    heading: Option<Direction>,
    pending: Option<Direction>,
    clock: StepClock,
}

impl Runner {
    /// Creates a stationary runner on the provided node.
    #[must_use]
    pub const fn new(node: NodeId) -> Self {
        Self {
            node,
            heading: None,
            pending: None,
            clock: StepClock::new(),
        }
    }

    /// Node the runner occupies.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Direction the runner keeps moving in.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Steering input waiting for the next step.
    #[must_use]
    pub const fn pending(&self) -> Option<Direction> {
        self.pending
    }

    /// Direction the next step will take: pending input if any, otherwise
    /// the current heading.
    #[must_use]
    pub fn intended_heading(&self) -> Option<Direction> {
        self.pending.or(self.heading)
    }

    /// Clock pacing the runner's steps.
    #[must_use]
    pub const fn clock(&self) -> &StepClock {
        &self.clock
    }

    /// Mutable access to the clock pacing the runner's steps.
    pub fn clock_mut(&mut self) -> &mut StepClock {
        &mut self.clock
    }

    /// Records steering input. Later input replaces earlier input until the
    /// next step consumes it.
    pub fn steer(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    /// Neighbor the runner is heading into, if the heading has an edge.
    #[must_use]
    pub fn next_node<Q: NavigationQuery + ?Sized>(&self, nav: &Q) -> Option<NodeId> {
        self.heading
            .and_then(|direction| nav.neighbor(self.node, direction))
    }

    /// Applies pending input, then follows the heading across one edge.
    pub fn step<Q: NavigationQuery + ?Sized>(&mut self, nav: &Q) -> RunnerStep {
        if let Some(direction) = self.pending.take() {
            self.heading = Some(direction);
        }

        let Some(direction) = self.heading else {
            return RunnerStep::Idle { at: self.node };
        };

        let Some(next) = nav.neighbor(self.node, direction) else {
            self.heading = None;
            return RunnerStep::Blocked { at: self.node };
        };

        let from = self.node;
        let climbed = match (nav.elevation(from), nav.elevation(next)) {
            (Some(here), Some(there)) => there > here,
            _ => false,
        };
        self.node = next;
        RunnerStep::Moved {
            from,
            to: next,
            climbed,
        }
    }

    /// Places the runner on `node` with no heading, input or progress.
    pub fn reset(&mut self, node: NodeId) {
        *self = Self::new(node);
    }
}

/// Result of a single wanderer step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WandererStep {
    /// The wanderer crossed one edge.
    Moved {
        /// Node the wanderer left.
        from: NodeId,
        /// Node the wanderer arrived at.
        to: NodeId,
        /// Heading picked at random during the step, if any.
        redirected: Option<Direction>,
    },
    /// The wanderer's node has no edges.
    Stalled {
        /// Node the wanderer remains on.
        at: NodeId,
    },
}

/// Autonomous entity performing a random walk.
///
/// A wanderer keeps its heading until it hits a wall or its countdown runs
/// out, then turns toward a uniformly chosen neighbor.
#[derive(Clone, Debug, PartialEq)]
pub struct Wanderer {
    node: NodeId,
    heading: Option<Direction>,
    countdown: u32,
    period: u32,
    clock: StepClock,
}

impl Wanderer {
    /// Creates a wanderer whose countdown starts at `period`.
    #[must_use]
    pub fn new(node: NodeId, heading: Option<Direction>, period: u32) -> Self {
        let period = period.max(1);
        Self {
            node,
            heading,
            countdown: period,
            period,
            clock: StepClock::new(),
        }
    }

    /// Overrides the steps left before the next forced heading change.
    #[must_use]
    pub fn with_countdown(mut self, countdown: u32) -> Self {
        self.countdown = countdown.max(1);
        self
    }

    /// Node the wanderer occupies.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Direction the wanderer keeps moving in.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Steps left before the next forced heading change.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Clock pacing the wanderer's steps.
    #[must_use]
    pub const fn clock(&self) -> &StepClock {
        &self.clock
    }

    /// Mutable access to the clock pacing the wanderer's steps.
    pub fn clock_mut(&mut self) -> &mut StepClock {
        &mut self.clock
    }

    /// Neighbor the wanderer is heading into, if the heading has an edge.
    #[must_use]
    pub fn next_node<Q: NavigationQuery + ?Sized>(&self, nav: &Q) -> Option<NodeId> {
        self.heading
            .and_then(|direction| nav.neighbor(self.node, direction))
    }

    /// Picks a random heading when the current one leads into a wall.
    ///
    /// Returns the new heading when one was picked.
    pub fn settle<Q, R>(&mut self, nav: &Q, rng: &mut R) -> Option<Direction>
    where
        Q: NavigationQuery + ?Sized,
        R: Rng,
    {
        if self.next_node(nav).is_some() {
            return None;
        }
        self.randomize(nav, rng)
    }

    /// Crosses one edge, turning first when the heading is blocked and
    /// afterwards when the countdown runs out.
    pub fn step<Q, R>(&mut self, nav: &Q, rng: &mut R) -> WandererStep
    where
        Q: NavigationQuery + ?Sized,
        R: Rng,
    {
        let mut redirected = None;
        let mut target = self.next_node(nav);
        if target.is_none() {
            redirected = self.randomize(nav, rng);
            target = self.next_node(nav);
        }

        let Some(next) = target else {
            return WandererStep::Stalled { at: self.node };
        };

        let from = self.node;
        self.node = next;
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            if let Some(heading) = self.randomize(nav, rng) {
                redirected = Some(heading);
            }
        }

        WandererStep::Moved {
            from,
            to: next,
            redirected,
        }
    }

    /// Places the wanderer on `node` with a full countdown and no progress.
    pub fn reset(&mut self, node: NodeId, heading: Option<Direction>) {
        *self = Self::new(node, heading, self.period);
    }

    fn randomize<Q, R>(&mut self, nav: &Q, rng: &mut R) -> Option<Direction>
    where
        Q: NavigationQuery + ?Sized,
        R: Rng,
    {
        self.countdown = self.period;
        let adjacent = nav.adjacent(self.node);
        if adjacent.is_empty() {
            self.heading = None;
            return None;
        }

        let pick = adjacent[rng.gen_range(0..adjacent.len())];
        self.heading = match (nav.coord(self.node), nav.coord(pick)) {
            (Some(here), Some(there)) => Direction::between(here, there),
            _ => None,
        };
        self.heading
    }
}

#[cfg(test)]
mod tests {
    use super::StepClock;

    #[test]
    fn clock_fires_once_spacing_is_exceeded() {
        let mut clock = StepClock::new();
        assert!(!clock.advance(0.5, 10.0, 1.0));
        assert!((clock.progress(10.0) - 0.5).abs() < f32::EPSILON);
        assert!(!clock.advance(0.5, 10.0, 1.0));
        assert!(clock.advance(0.1, 10.0, 1.0));
        assert_eq!(clock.progress(10.0), 0.0);
    }

    #[test]
    fn rate_scales_the_accumulation() {
        let mut slow = StepClock::new();
        let mut fast = StepClock::new();
        assert!(!slow.advance(0.6, 2.0, 1.0));
        assert!(fast.advance(0.6, 2.0, 2.0));
    }

    #[test]
    fn overshoot_is_dropped() {
        let mut clock = StepClock::new();
        assert!(clock.advance(5.0, 2.0, 1.0));
        assert!(!clock.advance(0.4, 2.0, 1.0));
    }

    #[test]
    fn degenerate_spacing_reports_no_progress() {
        let mut clock = StepClock::new();
        let _ = clock.advance(1.0, 0.0, 1.0);
        assert_eq!(clock.progress(0.0), 0.0);
        clock.reset();
        assert_eq!(clock, StepClock::default());
    }
}
