//! Tunable parameters for world generation and entity pacing.

use serde::Deserialize;
use thiserror::Error;

/// Aggregated knobs controlling generation, spawning and pacing.
///
/// Every field falls back to its default when absent, so partial
/// configuration files only need to name the values they change.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells along each axis of the height field; must be a power of two.
    pub world_size: u32,
    /// Distance in cells between neighboring navigation nodes.
    pub node_spacing: u32,
    /// Number of wanderers placed in the maze.
    pub wanderer_count: u32,
    /// Wanderer steps between forced heading changes.
    pub wander_period: u32,
    /// Wanderer tick-rate multiplier while the runner is not climbing.
    pub normal_wander_rate: f32,
    /// Wanderer tick-rate multiplier while the runner climbs.
    pub slow_wander_rate: f32,
    /// Order statistic of the sampled elevations used as the water line.
    pub water_percentile: f32,
    /// Order statistic of the sampled elevations used as the snow line.
    pub snow_percentile: f32,
    /// Terrain generations attempted before giving up on a seed.
    pub generation_attempts: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_size: 256,
            node_spacing: 10,
            wanderer_count: 4,
            wander_period: 5,
            normal_wander_rate: 2.0,
            slow_wander_rate: 1.0,
            water_percentile: 0.10,
            snow_percentile: 0.90,
            generation_attempts: 8,
        }
    }
}

impl WorldConfig {
    /// Checks that the configuration describes a world that can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size < 2 || !self.world_size.is_power_of_two() {
            return Err(ConfigError::WorldSize {
                size: self.world_size,
            });
        }

        if self.node_spacing == 0 || self.node_spacing > self.world_size {
            return Err(ConfigError::NodeSpacing {
                spacing: self.node_spacing,
                size: self.world_size,
            });
        }

        if self.wander_period == 0 {
            return Err(ConfigError::WanderPeriod);
        }

        if !(self.normal_wander_rate > 0.0 && self.slow_wander_rate > 0.0) {
            return Err(ConfigError::WanderRate);
        }

        let water = self.water_percentile;
        let snow = self.snow_percentile;
        if !(0.0..=1.0).contains(&water) || !(0.0..=1.0).contains(&snow) || water > snow {
            return Err(ConfigError::Percentiles { water, snow });
        }

        if self.generation_attempts == 0 {
            return Err(ConfigError::GenerationAttempts);
        }

        Ok(())
    }
}

/// Reasons a [`WorldConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The height field size is not a power of two of at least two cells.
    #[error("world_size must be a power of two no smaller than 2 (received {size})")]
    WorldSize {
        /// Size that failed validation.
        size: u32,
    },
    /// The node spacing is zero or exceeds the world size.
    #[error("node_spacing must lie in 1..={size} (received {spacing})")]
    NodeSpacing {
        /// Spacing that failed validation.
        spacing: u32,
        /// World size the spacing was checked against.
        size: u32,
    },
    /// Wanderers would never change heading on their own.
    #[error("wander_period must be positive")]
    WanderPeriod,
    /// A wanderer rate is zero, negative or not a number.
    #[error("wanderer rates must be positive")]
    WanderRate,
    /// The threshold percentiles are outside `0..=1` or out of order.
    #[error("percentiles must satisfy 0 <= water ({water}) <= snow ({snow}) <= 1")]
    Percentiles {
        /// Configured water percentile.
        water: f32,
        /// Configured snow percentile.
        snow: f32,
    },
    /// No generation attempt would ever run.
    #[error("generation_attempts must be positive")]
    GenerationAttempts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = WorldConfig::default();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_sizes_that_cannot_be_halved_evenly() {
        let config = WorldConfig {
            world_size: 200,
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::WorldSize { size: 200 })
        );
    }

    #[test]
    fn rejects_spacing_wider_than_world() {
        let config = WorldConfig {
            world_size: 8,
            node_spacing: 16,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NodeSpacing { spacing: 16, size: 8 })
        ));
    }

    #[test]
    fn rejects_inverted_percentiles() {
        let config = WorldConfig {
            water_percentile: 0.8,
            snow_percentile: 0.2,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Percentiles { .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WorldConfig =
            toml::from_str("wanderer_count = 2\nnode_spacing = 8\n").expect("valid toml");
        assert_eq!(config.wanderer_count, 2);
        assert_eq!(config.node_spacing, 8);
        assert_eq!(config.world_size, 256);
        assert_eq!(config.wander_period, 5);
    }
}
