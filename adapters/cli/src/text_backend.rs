//! Headless rendering backend that drives the simulation at a fixed frame
//! rate and reports the final scene as text.

use std::{io::Write, time::Duration};

use anyhow::Result as AnyResult;
use maze_chase_core::{Collectible, EntityKind};
use maze_chase_rendering::{FrameInput, Presentation, RenderingBackend, Scene, TerrainBand};
use tracing::{debug, info};

use crate::autopilot::Autopilot;

/// Rendering backend that writes a run summary to any [`Write`] sink.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    frames: u32,
    frame_time: Duration,
    autopilot: Autopilot,
    show_map: bool,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W, frames: u32, frame_time: Duration, autopilot: Autopilot) -> Self {
        Self {
            out,
            frames,
            frame_time,
            autopilot,
            show_map: false,
        }
    }

    /// Appends an ASCII map of the final scene to the summary.
    #[must_use]
    pub(crate) fn with_map(mut self, show_map: bool) -> Self {
        self.show_map = show_map;
        self
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static,
    {
        let Self {
            mut out,
            frames,
            frame_time,
            mut autopilot,
            show_map,
        } = self;
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;

        writeln!(out, "{window_title}")?;

        let mut played = 0;
        while played < frames {
            let input = autopilot.next_input(&scene);
            if input.start {
                debug!(frame = played, "autopilot starts the run");
            }
            update_scene(frame_time, input, &mut scene)?;
            played += 1;
            if scene.outcome.is_terminal() {
                break;
            }
        }
        info!(frames = played, outcome = ?scene.outcome, score = scene.score, "run finished");

        for line in &scene.hud {
            writeln!(out, "{line}")?;
        }
        writeln!(
            out,
            "outcome: {:?}, score: {}, remaining: {}, frames: {played}",
            scene.outcome, scene.score, scene.remaining
        )?;

        if show_map {
            for row in map_rows(&scene) {
                writeln!(out, "{row}")?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Renders the node grid top row first.
///
/// `@` marks the runner, `W` a wanderer, `$` a bonus collectible, `.` an
/// ordinary collectible, `~` water and `^` snow.
fn map_rows(scene: &Scene) -> Vec<String> {
    let extent = usize::try_from(scene.nodes_per_axis).unwrap_or(0);
    let mut grid = vec![vec![' '; extent]; extent];

    let mut put = |column: u32, row: u32, glyph: char| {
        let (Ok(column), Ok(row)) = (usize::try_from(column), usize::try_from(row)) else {
            return;
        };
        if let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *cell = glyph;
        }
    };

    for node in &scene.nodes {
        if node.walkable {
            continue;
        }
        let glyph = if node.band == TerrainBand::Snow { '^' } else { '~' };
        put(node.coord.column(), node.coord.row(), glyph);
    }

    for marker in &scene.markers {
        let Ok(node) = scene.node(marker.node) else {
            continue;
        };
        let glyph = match marker.collectible {
            Collectible::Ordinary => '.',
            Collectible::Bonus => '$',
        };
        put(node.coord.column(), node.coord.row(), glyph);
    }

    // Runner last so it stays visible when a wanderer shares its node.
    for entity in scene.entities.iter().rev() {
        let glyph = match entity.kind {
            EntityKind::Runner => '@',
            EntityKind::Wanderer(_) => 'W',
        };
        put(entity.coord.column(), entity.coord.row(), glyph);
    }

    grid.into_iter().map(|cells| cells.into_iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{Command, HeightField};
    use maze_chase_rendering::{CLEAR_COLOR, WINDOW_TITLE};
    use maze_chase_world::{self as world, query, Thresholds, World, WorldConfig};

    fn open_world(wanderer_count: u32) -> World {
        let config = WorldConfig {
            world_size: 8,
            node_spacing: 2,
            wanderer_count,
            ..WorldConfig::default()
        };
        World::from_terrain(
            config,
            3,
            HeightField::filled(8, 1.0),
            Thresholds::new(0.0, 10.0),
        )
        .expect("world")
    }

    fn run_headless(world: World, frames: u32, show_map: bool) -> String {
        let scene = Scene::from_snapshot(&query::snapshot(&world)).expect("scene");
        let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
        let mut output = Vec::new();
        let backend = TextBackend::new(
            &mut output,
            frames,
            Duration::from_millis(1500),
            Autopilot::new(11, 1),
        )
        .with_map(show_map);

        let mut world = world;
        backend
            .run(presentation, move |dt, input, scene| {
                let mut events = Vec::new();
                if input.start {
                    world::apply(&mut world, Command::Start, &mut events);
                }
                if let Some(direction) = input.steer {
                    world::apply(&mut world, Command::Steer { direction }, &mut events);
                }
                world::apply(&mut world, Command::Tick { dt }, &mut events);
                scene.refresh(&query::snapshot(&world))?;
                Ok(())
            })
            .expect("run");
        String::from_utf8(output).expect("utf-8")
    }

    #[test]
    fn summary_reports_frames_and_score() {
        let output = run_headless(open_world(0), 5, false);
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some(WINDOW_TITLE));
        assert!(output.contains("Score: "));
        assert!(output.contains("frames: 5"));
        assert!(output.contains("outcome: InProgress"));
    }

    #[test]
    fn zero_frames_leave_the_world_idle() {
        let output = run_headless(open_world(0), 0, false);
        assert!(output.contains("Score: 0"));
        assert!(output.contains("remaining: 16"));
        assert!(output.contains("frames: 0"));
    }

    #[test]
    fn map_shows_every_node_row() {
        let output = run_headless(open_world(1), 1, true);
        let map: Vec<&str> = output.lines().rev().take(4).collect();
        assert!(map.iter().all(|row| row.chars().count() == 4));
        assert_eq!(map.iter().filter(|row| row.contains('@')).count(), 1);
        assert!(map.iter().any(|row| row.contains('$')));
    }

    #[test]
    fn map_marks_impassable_terrain() {
        let world = open_world(0);
        let mut scene = Scene::from_snapshot(&query::snapshot(&world)).expect("scene");
        scene.nodes[0].walkable = false;
        scene.nodes[0].band = TerrainBand::Snow;
        scene.nodes[1].walkable = false;
        scene.nodes[1].band = TerrainBand::Water;
        scene.markers.clear();

        let rows = map_rows(&scene);
        assert!(rows[0].starts_with("^~"));
    }
}
