//! Recursive midpoint-displacement terrain generation.

use maze_chase_core::HeightField;
use rand::Rng;

/// Elevations at the corners of a square in `0.0..=1.0`, ordered top-left,
/// top-right, bottom-right, bottom-left.
pub type Corners = [f32; 4];

/// Generates a height field, drawing the four corner elevations from `rng`.
pub fn generate_seeded<R: Rng>(size: u32, rng: &mut R) -> HeightField {
    let corners = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
    generate(size, corners, rng)
}

/// Generates a `size * size` height field from explicit corner elevations.
///
/// The center of the first subdivision is pinned to the maximum so that a
/// high landmass always forms around the middle of the map. Every cell ends
/// up in `0.0..=size / 2 - 1`.
pub fn generate<R: Rng>(size: u32, corners: Corners, rng: &mut R) -> HeightField {
    let mut field = HeightField::filled(size, f32::NAN);
    if size == 0 {
        return field;
    }

    let corners = corners.map(|corner| corner.clamp(0.0, 1.0));
    let mut divider = Divider {
        field: &mut field,
        rng,
        extent: size,
        scale: ((size / 2) as f32 - 1.0).max(0.0),
    };
    divider.divide(0, 0, size, corners);
    field
}

struct Divider<'a, R> {
    field: &'a mut HeightField,
    rng: &'a mut R,
    extent: u32,
    scale: f32,
}

impl<R: Rng> Divider<'_, R> {
    fn divide(&mut self, x: u32, z: u32, size: u32, corners: Corners) {
        let [c1, c2, c3, c4] = corners;
        let average = (c1 + c2 + c3 + c4) / 4.0;

        if size <= 1 {
            if let Some(cell) = self.field.get_mut(x, z) {
                debug_assert!(cell.is_nan(), "cell ({x}, {z}) written twice");
                *cell = average * self.scale;
            }
            return;
        }

        let half = size / 2;
        let mid = if size == self.extent {
            1.0
        } else {
            let max_displacement = half as f32 / self.extent as f32 * 3.0;
            let displaced = average + (self.rng.gen::<f32>() - 0.5) * max_displacement;
            displaced.clamp(0.0, 1.0)
        };

        let e1 = (c1 + c2) / 2.0;
        let e2 = (c2 + c3) / 2.0;
        let e3 = (c3 + c4) / 2.0;
        let e4 = (c4 + c1) / 2.0;

        self.divide(x, z, half, [c1, e1, mid, e4]);
        self.divide(x + half, z, half, [e1, c2, e2, mid]);
        self.divide(x + half, z + half, half, [mid, e2, c3, e3]);
        self.divide(x, z + half, half, [e4, mid, e3, c4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn every_cell_is_written_within_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let field = generate_seeded(64, &mut rng);
        let ceiling = field.max_elevation();

        assert_eq!(field.cells().len(), 64 * 64);
        for value in field.cells() {
            assert!(!value.is_nan(), "unwritten cell");
            assert!((0.0..=ceiling).contains(value), "{value} outside range");
        }
    }

    #[test]
    fn same_seed_and_corners_reproduce_the_field() {
        let corners = [0.2, 0.4, 0.6, 0.8];
        let first = generate(32, corners, &mut ChaCha8Rng::seed_from_u64(5));
        let second = generate(32, corners, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        let corners = [0.5; 4];
        let first = generate(32, corners, &mut ChaCha8Rng::seed_from_u64(1));
        let second = generate(32, corners, &mut ChaCha8Rng::seed_from_u64(2));
        assert_ne!(first, second);
    }

    #[test]
    fn flat_corners_on_two_cell_world_skip_displacement() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let field = generate(2, [0.0; 4], &mut rng);
        assert!(field.cells().iter().all(|value| *value == 0.0));
    }

    #[test]
    fn forced_peak_raises_the_centre() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let field = generate(64, [0.0; 4], &mut rng);
        let centre = field.get(32, 32).expect("centre cell");
        let corner = field.get(0, 0).expect("corner cell");
        assert!(centre > corner);
    }
}
