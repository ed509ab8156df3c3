//! Per-frame data the terrain shaders consume.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Vec3};

/// Logarithmic depth encoding.
///
/// Maps view depth `w` in `[0, far]` to `[-1, 1]` as
/// `log2(max(eps, 1 + w)) * coefficient - 1`, with
/// `coefficient = 2 / log2(far + 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogDepth {
    far: f32,
    coefficient: f32,
}

impl LogDepth {
    const EPSILON: f32 = 1e-6;

    #[must_use]
    pub fn new(far: f32) -> Self {
        let far = far.max(1.0);
        Self {
            far,
            coefficient: 2.0 / (far + 1.0).log2(),
        }
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    #[must_use]
    pub fn encode(&self, view_depth: f32) -> f32 {
        (1.0 + view_depth).max(Self::EPSILON).log2() * self.coefficient - 1.0
    }
}

/// Uniform block shared by every terrain chunk.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TerrainUniform {
    /// Camera world position, added back to camera-relative offsets.
    pub camera_position: [f32; 3],
    pub log_depth_coefficient: f32,
    /// Normalized direction toward the sun.
    pub sun_direction: [f32; 3],
    /// Elapsed time in seconds.
    pub time: f32,
}

static_assertions::assert_eq_size!(TerrainUniform, [u8; 32]);

impl TerrainUniform {
    #[must_use]
    pub fn new(camera: DVec3, sun_direction: Vec3, log_depth: &LogDepth, time: f32) -> Self {
        Self {
            camera_position: camera.as_vec3().to_array(),
            log_depth_coefficient: log_depth.coefficient(),
            sun_direction: sun_direction.normalize_or(Vec3::Y).to_array(),
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient_formula() {
        let depth = LogDepth::new(1_000_000.0);
        let expected = 2.0 / (1_000_001.0_f32).log2();
        assert!((depth.coefficient() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_encode_spans_clip_range() {
        let depth = LogDepth::new(5_000_000.0);
        assert!((depth.encode(0.0) + 1.0).abs() < 1e-6);
        assert!((depth.encode(5_000_000.0) - 1.0).abs() < 1e-4);
        let mid = depth.encode(1_000.0);
        assert!(mid > -1.0 && mid < 1.0, "encoded {mid}");
    }

    #[test]
    fn test_encode_is_monotonic() {
        let depth = LogDepth::new(1e7);
        let mut previous = depth.encode(0.0);
        for i in 1..100 {
            let value = depth.encode(i as f32 * 1e5);
            assert!(value > previous, "depth not increasing at {i}");
            previous = value;
        }
    }

    #[test]
    fn test_uniform_normalizes_sun() {
        let uniform = TerrainUniform::new(
            DVec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 10.0, 0.0),
            &LogDepth::new(100.0),
            0.5,
        );
        assert_eq!(uniform.sun_direction, [0.0, 1.0, 0.0]);
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 32);
    }
}
