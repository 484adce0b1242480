//! Scripted input source that stands in for a keyboard.

use maze_chase_core::Direction;
use maze_chase_rendering::{FrameInput, Scene};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Starts the run and periodically steers the runner toward a random
/// walkable neighbor.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    steer_every: u32,
    frame: u64,
}

impl Autopilot {
    pub(crate) fn new(seed: u64, steer_every: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            steer_every,
            frame: 0,
        }
    }

    /// Input for the next frame given the scene the player currently sees.
    pub(crate) fn next_input(&mut self, scene: &Scene) -> FrameInput {
        let frame = self.frame;
        self.frame += 1;

        if !scene.running {
            return FrameInput {
                steer: None,
                start: !scene.outcome.is_terminal(),
            };
        }

        let due = self.steer_every > 0 && frame % u64::from(self.steer_every) == 0;
        FrameInput {
            steer: if due { self.pick_direction(scene) } else { None },
            start: false,
        }
    }

    fn pick_direction(&mut self, scene: &Scene) -> Option<Direction> {
        let here = scene.runner()?.coord;
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                here.step(*direction, scene.nodes_per_axis)
                    .map(|next| next.row() * scene.nodes_per_axis + next.column())
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| scene.nodes.get(index))
                    .is_some_and(|node| node.walkable)
            })
            .collect();

        if open.is_empty() {
            return None;
        }
        Some(open[self.rng.gen_range(0..open.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{Command, HeightField};
    use maze_chase_world::{self as world, query, Thresholds, World, WorldConfig};

    fn corridor_world() -> World {
        let config = WorldConfig {
            world_size: 8,
            node_spacing: 2,
            wanderer_count: 0,
            ..WorldConfig::default()
        };
        let mut field = HeightField::filled(8, 0.0);
        *field.get_mut(5, 3).expect("cell") = 1.0;
        *field.get_mut(5, 5).expect("cell") = 1.0;
        World::from_terrain(config, 5, field, Thresholds::new(0.5, 10.0)).expect("world")
    }

    fn scene_of(world: &World) -> Scene {
        Scene::from_snapshot(&query::snapshot(world)).expect("scene")
    }

    #[test]
    fn idle_world_is_started_first() {
        let world = corridor_world();
        let mut autopilot = Autopilot::new(1, 1);
        let input = autopilot.next_input(&scene_of(&world));
        assert_eq!(
            input,
            FrameInput {
                steer: None,
                start: true
            }
        );
    }

    #[test]
    fn steering_only_targets_walkable_neighbors() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        world::apply(&mut world, Command::Start, &mut events);
        let scene = scene_of(&world);

        let mut autopilot = Autopilot::new(9, 1);
        for _ in 0..10 {
            let input = autopilot.next_input(&scene);
            assert!(!input.start);
            assert_eq!(input.steer, Some(Direction::South));
        }
    }

    #[test]
    fn steering_follows_the_cadence() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        world::apply(&mut world, Command::Start, &mut events);
        let scene = scene_of(&world);

        let mut autopilot = Autopilot::new(9, 3);
        let steered: Vec<bool> = (0..6)
            .map(|_| autopilot.next_input(&scene).steer.is_some())
            .collect();
        assert_eq!(steered, vec![true, false, false, true, false, false]);
    }
}
