//! Water and snow lines derived from sampled elevations.

use maze_chase_core::HeightField;

/// Elevation bounds separating water, walkable land and snow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    water: f32,
    snow: f32,
}

impl Thresholds {
    /// Creates thresholds from explicit bounds.
    #[must_use]
    pub const fn new(water: f32, snow: f32) -> Self {
        Self { water, snow }
    }

    /// Elevation at or below which terrain counts as water.
    #[must_use]
    pub const fn water(&self) -> f32 {
        self.water
    }

    /// Elevation at or above which terrain counts as snow.
    #[must_use]
    pub const fn snow(&self) -> f32 {
        self.snow
    }

    /// Reports whether an elevation lies strictly between both bounds.
    #[must_use]
    pub fn is_walkable(&self, elevation: f32) -> bool {
        self.water < elevation && elevation < self.snow
    }
}

/// Samples every `stride`-th row and column and picks the requested order
/// statistics as the water and snow lines.
///
/// Uses partial selection, so the cost stays linear in the sample size.
#[must_use]
pub fn compute(
    field: &HeightField,
    stride: u32,
    water_percentile: f32,
    snow_percentile: f32,
) -> Thresholds {
    let size = field.size();
    let step = usize::try_from(stride.max(1)).unwrap_or(1);

    let mut samples: Vec<f32> = Vec::new();
    for z in (0..size).step_by(step) {
        for x in (0..size).step_by(step) {
            if let Some(elevation) = field.get(x, z) {
                samples.push(elevation);
            }
        }
    }

    if samples.is_empty() {
        return Thresholds::new(0.0, 0.0);
    }

    let water = order_statistic(&mut samples, water_percentile);
    let snow = order_statistic(&mut samples, snow_percentile);
    Thresholds::new(water, snow)
}

/// Raises every cell below `water` to exactly `water`, returning how many
/// cells changed.
pub fn flatten(field: &mut HeightField, water: f32) -> usize {
    let mut raised = 0;
    for cell in field.cells_mut() {
        if *cell < water {
            *cell = water;
            raised += 1;
        }
    }
    raised
}

fn order_statistic(samples: &mut [f32], percentile: f32) -> f32 {
    let last = samples.len() - 1;
    let rank = (samples.len() as f32 * percentile.clamp(0.0, 1.0)).floor() as usize;
    let (_, value, _) = samples.select_nth_unstable_by(rank.min(last), f32::total_cmp);
    *value
}
