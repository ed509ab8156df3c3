//! Multi-octave fractal noise over 3D world positions.
//!
//! Composites several octaves of a coherent noise source, normalizes by the
//! accumulated amplitude, then sculpts the result with an exponent so that
//! low ground flattens into plains and high ground sharpens into peaks.

use noise::{NoiseFn, Perlin, Simplex, Value};
use serde::{Deserialize, Serialize};

/// Coherent noise source used for every octave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseType {
    /// Simplex gradient noise.
    #[default]
    Simplex,
    /// Perlin gradient noise.
    Perlin,
    /// Lattice value noise.
    Value,
}

/// Configuration for multi-octave noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Exponent applied to the normalized `[0, 1]` sum.
    pub exponentiation: f64,
    /// Output scale: results lie in `[0, height]`.
    pub height: f64,
    /// Feature size. Positions are divided by this before sampling.
    pub scale: f64,
    /// Seed for the noise source.
    pub seed: u64,
    /// Which noise source to use.
    pub noise_type: NoiseType,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 10,
            persistence: 0.5,
            lacunarity: 1.9,
            exponentiation: 3.5,
            height: 1_500.0,
            scale: 4_000.0,
            seed: 1,
            noise_type: NoiseType::Simplex,
        }
    }
}

impl NoiseParams {
    /// Smallest accepted `scale`.
    pub const MIN_SCALE: f64 = 1e-6;

    /// Clamp degenerate values into a usable range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = Self {
            octaves: self.octaves.max(1),
            scale: if self.scale.is_finite() {
                self.scale.max(Self::MIN_SCALE)
            } else {
                Self::MIN_SCALE
            },
            exponentiation: if self.exponentiation.is_finite() {
                self.exponentiation.max(0.0)
            } else {
                1.0
            },
            ..self
        };
        if clean != self {
            tracing::warn!(original = ?self, ?clean, "noise parameters clamped");
        }
        clean
    }
}

/// The `noise` crate takes `u32` seeds; fold the high half in so every bit
/// of the world seed matters.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[derive(Clone, Debug)]
enum Source {
    Simplex(Simplex),
    Perlin(Perlin),
    Value(Value),
}

impl Source {
    fn new(noise_type: NoiseType, seed: u64) -> Self {
        let seed = fold_seed(seed);
        match noise_type {
            NoiseType::Simplex => Source::Simplex(Simplex::new(seed)),
            NoiseType::Perlin => Source::Perlin(Perlin::new(seed)),
            NoiseType::Value => Source::Value(Value::new(seed)),
        }
    }

    #[inline]
    fn sample(&self, p: [f64; 3]) -> f64 {
        match self {
            Source::Simplex(n) => n.get(p),
            Source::Perlin(n) => n.get(p),
            Source::Value(n) => n.get(p),
        }
    }
}

/// Evaluates fractal noise at arbitrary 3D positions.
///
/// Holds no mutable state: two generators built from equal parameters
/// return bit-identical values for equal positions on any thread.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    source: Source,
    params: NoiseParams,
}

impl NoiseGenerator {
    /// Create a generator; degenerate parameters are clamped.
    #[must_use]
    pub fn new(params: NoiseParams) -> Self {
        let params = params.sanitized();
        Self {
            source: Source::new(params.noise_type, params.seed),
            params,
        }
    }

    /// Sample the field. The result lies in `[0, height]`.
    #[must_use]
    pub fn get(&self, x: f64, y: f64, z: f64) -> f64 {
        let p = &self.params;
        let xs = x / p.scale;
        let ys = y / p.scale;
        let zs = z / p.scale;

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut normalization = 0.0;
        let mut total = 0.0;
        for _ in 0..p.octaves {
            let sample = self
                .source
                .sample([xs * frequency, ys * frequency, zs * frequency]);
            total += (sample * 0.5 + 0.5).clamp(0.0, 1.0) * amplitude;
            normalization += amplitude;
            amplitude *= p.persistence;
            frequency *= p.lacunarity;
        }

        if normalization <= 0.0 {
            return 0.0;
        }
        (total / normalization).powf(p.exponentiation) * p.height
    }

    /// Sample at a [`glam::DVec3`].
    #[inline]
    #[must_use]
    pub fn get_vec(&self, position: glam::DVec3) -> f64 {
        self.get(position.x, position.y, position.z)
    }

    /// The (sanitized) parameters.
    #[must_use]
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }
}
