// src/heightfield.rs
//! Procedural elevation for the infinite grid.
//!
//! Every consumer (tile placement, appearance selection, camera grounding)
//! must go through [`HeightField::elevation`] so the scale constants agree.

use bevy::prelude::*;
use noise::{NoiseFn, Simplex};

/// Grid cells → noise domain. About a 100-cell feature wavelength.
pub const NOISE_SCALE: f64 = 0.01;
/// Noise output → elevation buckets `0..=4`.
pub const ELEVATION_AMPLITUDE: f64 = 4.0;

/// Pure, seeded height function over integer grid coordinates.
#[derive(Resource, Clone)]
pub struct HeightField {
    seed: u32,
    noise: Simplex,
}

impl HeightField {
    pub fn new(seed: u32) -> Self {
        Self { seed, noise: Simplex::new(seed) }
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Raw gradient noise in `[-1, 1]` at a grid cell.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> f64 {
        let v = self.noise.get([x as f64 * NOISE_SCALE, y as f64 * NOISE_SCALE]);
        v.clamp(-1.0, 1.0)
    }

    /// `max(0, round(noise * 4))`; never negative, at most 4.
    #[inline]
    pub fn elevation(&self, x: i32, y: i32) -> i32 {
        let h = (self.sample(x, y) * ELEVATION_AMPLITUDE).round() as i32;
        h.max(0)
    }

    /// Continuous world-space height for anything that rides the surface
    /// (the demo camera focus), using the same bucket as the tile under it.
    pub fn height_at_world(&self, world_x: f32, world_z: f32, tile_size: f32) -> f32 {
        let x = (world_x / tile_size).floor() as i32;
        let y = (world_z / tile_size).floor() as i32;
        self.elevation(x, y) as f32 * tile_size
    }
}

impl Default for HeightField {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_is_pure() {
        let field = HeightField::new(7);
        for (x, y) in [(0, 0), (-120, 33), (5_000, -9_999), (i32::MAX / 2, 17)] {
            assert_eq!(field.elevation(x, y), field.elevation(x, y));
        }
        let again = HeightField::new(7);
        assert_eq!(field.elevation(412, -87), again.elevation(412, -87));
    }

    #[test]
    fn elevation_stays_in_bucket_range() {
        let field = HeightField::new(1);
        for y in (-400..400).step_by(7) {
            for x in (-400..400).step_by(11) {
                let e = field.elevation(x, y);
                assert!((0..=4).contains(&e), "elevation {e} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn terrain_is_smooth_between_neighbours() {
        // one-cell steps move the noise domain by 0.01, far below a bucket
        let field = HeightField::new(3);
        for x in -200..200 {
            let a = field.elevation(x, 10);
            let b = field.elevation(x + 1, 10);
            assert!((a - b).abs() <= 1, "jump between ({x},10) and ({},10)", x + 1);
        }
    }

    #[test]
    fn terrain_is_not_flat() {
        let field = HeightField::new(0);
        let mut seen = std::collections::BTreeSet::new();
        for y in (-1_000..1_000).step_by(25) {
            for x in (-1_000..1_000).step_by(25) {
                seen.insert(field.elevation(x, y));
            }
        }
        assert!(seen.len() >= 3, "only saw buckets {seen:?}");
        assert!(seen.contains(&0));
    }
}
