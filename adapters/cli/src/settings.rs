//! Optional TOML settings file for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_chase_world::WorldConfig;
use serde::Deserialize;

/// World parameters plus the pacing of the headless run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) world: WorldConfig,
    pub(crate) run: RunSettings,
}

/// Pacing of the headless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct RunSettings {
    pub(crate) frames: u32,
    pub(crate) frame_ms: u64,
    pub(crate) steer_every: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 1800,
            frame_ms: 33,
            steer_every: 15,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or falls back to defaults without one.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load settings file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).context("settings are not valid toml")?;
        settings
            .world
            .validate()
            .context("invalid [world] settings")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let settings = Settings::load(None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.run.frame_ms, 33);
    }

    #[test]
    fn sections_may_be_partial() {
        let settings = Settings::parse(
            "[world]\nwanderer_count = 2\n\n[run]\nframes = 90\n",
        )
        .expect("valid settings");
        assert_eq!(settings.world.wanderer_count, 2);
        assert_eq!(settings.world.world_size, 256);
        assert_eq!(settings.run.frames, 90);
        assert_eq!(settings.run.steer_every, 15);
    }

    #[test]
    fn invalid_world_is_rejected() {
        let error = Settings::parse("[world]\nworld_size = 100\n").expect_err("invalid size");
        assert!(format!("{error:#}").contains("world_size"));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let error = Settings::load(Some(Path::new("/nonexistent/maze-chase.toml")))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/maze-chase.toml"));
    }
}
