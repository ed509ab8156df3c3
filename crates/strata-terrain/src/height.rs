//! Bounded terrain height sampling.
//!
//! Wraps [`NoiseGenerator`] and clamps its output into a configured
//! [`HeightRange`]. Positions are world-space surface points, so the same
//! field serves the planet and the ring without knowing which shape it is on.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::noise_gen::{NoiseGenerator, NoiseParams};

/// Inclusive bounds on generated terrain height, in engine units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: f64,
    pub max: f64,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1_500.0,
        }
    }
}

impl HeightRange {
    /// Create a range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Clamp `value` into the range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` inside the range, in `[0, 1]`.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Samples terrain height at world-space surface points.
#[derive(Clone, Debug)]
pub struct HeightGenerator {
    noise: NoiseGenerator,
    range: HeightRange,
}

impl HeightGenerator {
    /// Create a height generator from noise parameters and output bounds.
    #[must_use]
    pub fn new(params: NoiseParams, range: HeightRange) -> Self {
        Self {
            noise: NoiseGenerator::new(params),
            range: HeightRange::new(range.min, range.max),
        }
    }

    /// Height at `position`, clamped to the configured range.
    #[must_use]
    pub fn get(&self, position: DVec3) -> f64 {
        self.range.clamp(self.noise.get_vec(position))
    }

    pub fn range(&self) -> HeightRange {
        self.range
    }

    pub fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_within_range() {
        let generator = HeightGenerator::new(
            NoiseParams {
                height: 5_000.0,
                exponentiation: 1.0,
                ..Default::default()
            },
            HeightRange::new(100.0, 900.0),
        );
        for i in 0..1_000 {
            let p = DVec3::new(i as f64 * 73.0, 40_000.0, i as f64 * -29.0);
            let h = generator.get(p);
            assert!((100.0..=900.0).contains(&h), "height {h} escaped [100, 900]");
        }
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let range = HeightRange::new(10.0, -10.0);
        assert_eq!(range.min, -10.0);
        assert_eq!(range.max, 10.0);
    }

    #[test]
    fn test_normalize_handles_empty_range() {
        let range = HeightRange::new(5.0, 5.0);
        assert_eq!(range.normalize(5.0), 0.0);
        let range = HeightRange::new(0.0, 200.0);
        assert!((range.normalize(50.0) - 0.25).abs() < 1e-12);
        assert_eq!(range.normalize(-1.0), 0.0);
        assert_eq!(range.normalize(1_000.0), 1.0);
    }

    #[test]
    fn test_matches_raw_noise_inside_range() {
        let params = NoiseParams {
            seed: 11,
            ..Default::default()
        };
        let generator = HeightGenerator::new(
            params,
            HeightRange::new(0.0, params.height),
        );
        let raw = NoiseGenerator::new(params);
        let p = DVec3::new(1_234.0, -5_678.0, 40_000.0);
        assert_eq!(generator.get(p).to_bits(), raw.get_vec(p).to_bits());
    }
}
