//! Direct vertex colouring for paths that do not use texture splatting.

use glam::{DVec3, Vec3};

use crate::height::HeightRange;
use crate::noise_gen::{NoiseGenerator, NoiseParams};

const SAND: Vec3 = Vec3::new(0.82, 0.74, 0.55);
const GRASS: Vec3 = Vec3::new(0.30, 0.45, 0.20);
const ROCK: Vec3 = Vec3::new(0.45, 0.41, 0.38);
const SNOW: Vec3 = Vec3::new(0.95, 0.95, 0.97);

/// Elevation bands, as fractions of the height range, and their colours.
const GRADIENT: [(f32, Vec3); 4] = [(0.0, SAND), (0.15, GRASS), (0.6, ROCK), (0.85, SNOW)];

/// Maps elevation plus a little noise to an RGB colour in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ColourGenerator {
    noise: NoiseGenerator,
    range: HeightRange,
}

impl ColourGenerator {
    #[must_use]
    pub fn new(params: NoiseParams, range: HeightRange) -> Self {
        Self {
            noise: NoiseGenerator::new(params),
            range,
        }
    }

    /// Vertex colour for a surface point at `elevation`.
    #[must_use]
    pub fn get_colour(&self, position: DVec3, elevation: f64) -> [f32; 3] {
        let t = self.range.normalize(elevation) as f32;
        let noise_height = self.noise.params().height;
        let variation = if noise_height > 0.0 {
            (self.noise.get_vec(position) / noise_height) as f32
        } else {
            0.5
        };

        let base = sample_gradient(t);
        let shade = 0.9 + 0.2 * variation;
        (base * shade).clamp(Vec3::ZERO, Vec3::ONE).to_array()
    }
}

fn sample_gradient(t: f32) -> Vec3 {
    let mut prev = GRADIENT[0];
    if t <= prev.0 {
        return prev.1;
    }
    for &(stop, colour) in &GRADIENT[1..] {
        if t <= stop {
            let f = (t - prev.0) / (stop - prev.0);
            return prev.1.lerp(colour, f);
        }
        prev = (stop, colour);
    }
    prev.1
}
