use maze_chase_core::{Collectible, Command, Direction, NavigationQuery, NodeCoord};
use maze_chase_world::{query, World, WorldConfig, WorldError};

const SEEDS: [u64; 4] = [0, 7, 42, 0xdead_beef];

fn generated(seed: u64) -> World {
    World::new(WorldConfig::default(), seed).expect("playable terrain")
}

#[test]
fn thresholds_are_ordered_and_lakes_flattened() {
    for seed in SEEDS {
        let world = generated(seed);
        let thresholds = query::thresholds(&world);
        assert!(thresholds.water() <= thresholds.snow());

        let field = query::height_field(&world);
        assert_eq!(field.size(), 256);
        assert!(field
            .cells()
            .iter()
            .all(|elevation| *elevation >= thresholds.water()));
    }
}

#[test]
fn edges_are_mutual_and_walkable() {
    for seed in SEEDS {
        let world = generated(seed);
        let graph = query::graph(&world);

        for node in graph.nodes() {
            let here = graph.node_at(node.coord()).expect("coord inside grid");
            for direction in Direction::ALL {
                let Some(other) = node.neighbor(direction) else {
                    continue;
                };
                assert!(node.is_walkable());
                assert!(graph.node(other).expect("neighbor").is_walkable());
                assert_eq!(graph.neighbor(other, direction.opposite()), Some(here));
            }
        }
    }
}

#[test]
fn every_reached_node_holds_exactly_one_collectible() {
    for seed in SEEDS {
        let world = generated(seed);
        let graph = query::graph(&world);

        assert_eq!(graph.collectible_count() as usize, graph.component().len());
        assert_eq!(query::remaining(&world), graph.collectible_count());
        for node in graph.nodes() {
            assert_eq!(node.was_visited(), node.collectible().is_some());
            if !node.was_visited() {
                assert!(node.adjacency().is_empty());
            }
        }
    }
}

#[test]
fn bonus_collectibles_only_sit_on_corners() {
    for seed in SEEDS {
        let world = generated(seed);
        let graph = query::graph(&world);
        let last = graph.nodes_per_axis() - 1;
        let corners = [
            NodeCoord::new(0, 0),
            NodeCoord::new(last, 0),
            NodeCoord::new(0, last),
            NodeCoord::new(last, last),
        ];

        for node in graph.nodes() {
            if node.collectible() == Some(Collectible::Bonus) {
                assert!(corners.contains(&node.coord()));
            }
        }
    }
}

#[test]
fn entities_spawn_inside_the_reachable_component() {
    for seed in SEEDS {
        let world = generated(seed);
        let graph = query::graph(&world);

        let runner = query::runner_node(&world);
        assert_eq!(runner, graph.start());
        let start = graph.coord(runner).expect("start coord");
        assert_eq!(start.column(), graph.nodes_per_axis() / 2);
        assert!(start.row() >= graph.nodes_per_axis() / 4);

        let wanderers = query::wanderer_nodes(&world);
        assert_eq!(wanderers.len(), 4);
        for node in wanderers {
            assert_ne!(node, runner);
            assert!(graph.component().contains(&node));
        }
    }
}

#[test]
fn starting_keeps_wanderers_off_the_runner() {
    for seed in SEEDS {
        let mut world = generated(seed);
        let mut events = Vec::new();
        maze_chase_world::apply(&mut world, Command::Start, &mut events);

        assert!(query::is_running(&world));
        let runner = query::runner_node(&world);
        let graph = query::graph(&world);
        for node in query::wanderer_nodes(&world) {
            assert_ne!(node, runner);
            assert!(graph.component().contains(&node));
        }
    }
}

#[test]
fn same_seed_builds_the_same_world() {
    let first = query::snapshot(&generated(99));
    let second = query::snapshot(&generated(99));
    assert_eq!(first, second);

    let other = query::snapshot(&generated(100));
    assert_ne!(first.height_field, other.height_field);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = WorldConfig {
        world_size: 100,
        ..WorldConfig::default()
    };
    assert!(matches!(
        World::new(config, 1),
        Err(WorldError::Config(_))
    ));
}
