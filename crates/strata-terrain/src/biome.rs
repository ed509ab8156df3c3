//! Coarse biome classification from elevation and a low-frequency noise field.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::noise_gen::{NoiseGenerator, NoiseParams, NoiseType};

/// Terrain below this elevation is always desert.
pub const DESERT_MAX_ELEVATION: f64 = 180.0;

/// Normalized biome-noise band classified as forest.
pub const FOREST_NOISE_BAND: (f64, f64) = (0.35, 0.65);

/// Broad surface category steering texture selection and scenery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Desert,
    Forest,
    Arid,
}

/// Classifies world positions into a [`Biome`].
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    noise: NoiseGenerator,
    desert_max_elevation: f64,
    forest_band: (f64, f64),
}

impl BiomeClassifier {
    /// Noise parameters producing broad, continent-sized biome regions.
    #[must_use]
    pub fn default_params(seed: u64) -> NoiseParams {
        NoiseParams {
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            exponentiation: 1.0,
            height: 1.0,
            scale: 20_000.0,
            seed: seed.wrapping_add(0x5EED_B10E),
            noise_type: NoiseType::Simplex,
        }
    }

    #[must_use]
    pub fn new(params: NoiseParams) -> Self {
        Self {
            noise: NoiseGenerator::new(params),
            desert_max_elevation: DESERT_MAX_ELEVATION,
            forest_band: FOREST_NOISE_BAND,
        }
    }

    /// Override the desert elevation threshold.
    #[must_use]
    pub fn with_desert_max_elevation(mut self, elevation: f64) -> Self {
        self.desert_max_elevation = elevation;
        self
    }

    /// Biome noise at `position`, normalized to `[0, 1]`.
    #[must_use]
    pub fn sample(&self, position: DVec3) -> f64 {
        let height = self.noise.params().height;
        if height <= 0.0 {
            return 0.0;
        }
        (self.noise.get_vec(position) / height).clamp(0.0, 1.0)
    }

    /// Classify a surface point at the given elevation above the base surface.
    #[must_use]
    pub fn classify(&self, position: DVec3, elevation: f64) -> Biome {
        if elevation < self.desert_max_elevation {
            return Biome::Desert;
        }
        let n = self.sample(position);
        let (lo, hi) = self.forest_band;
        if n >= lo && n <= hi {
            Biome::Forest
        } else {
            Biome::Arid
        }
    }
}
