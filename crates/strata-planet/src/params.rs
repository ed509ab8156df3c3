//! Translation from the persisted configuration to generator parameters.

use glam::DVec3;
use strata_config::{ShapeKind, TerrainConfig};
use strata_cubesphere::{QuadtreeParams, RingParams, ShapeParams};
use strata_mesh::TerrainParams;
use strata_terrain::{BiomeClassifier, HeightRange, NoiseParams, TextureSplatter};

/// Smallest accepted quadtree cell size.
pub const MIN_CELL_SIZE: f64 = 1.0;

/// Smallest accepted body radius.
pub const MIN_RADIUS: f64 = 1.0;

fn positive_or(value: f64, floor: f64, name: &'static str) -> f64 {
    if value.is_finite() && value >= floor {
        value
    } else {
        tracing::warn!(field = name, value, clamped = floor, "configuration value clamped");
        floor
    }
}

#[must_use]
pub fn shape_params(config: &TerrainConfig) -> ShapeParams {
    match config.shape {
        ShapeKind::Planet => ShapeParams::Planet,
        ShapeKind::Ring => ShapeParams::Ring(RingParams {
            lat_cutoff: config.ring_latitude_cutoff,
            lat_fade: config.ring_latitude_fade,
            drop_exponent: config.ring_drop_exponent,
            cull_latitude: config.ring_cull_latitude,
        }),
    }
}

/// Cube half-width for the configured shape.
#[must_use]
pub fn shape_radius(config: &TerrainConfig) -> f64 {
    match config.shape {
        ShapeKind::Planet => positive_or(config.planet_radius, MIN_RADIUS, "planet_radius"),
        ShapeKind::Ring => positive_or(config.ring_major_radius, MIN_RADIUS, "ring_major_radius"),
    }
}

/// World-space center of the configured shape. Planets sit at the origin.
#[must_use]
pub fn shape_center(config: &TerrainConfig) -> DVec3 {
    match config.shape {
        ShapeKind::Planet => DVec3::ZERO,
        ShapeKind::Ring => DVec3::from_array(config.ring_offset),
    }
}

#[must_use]
pub fn noise_params(config: &TerrainConfig) -> NoiseParams {
    NoiseParams {
        height: config.noise_height.max(0.0),
        scale: config.noise_scale,
        seed: config.seed,
        ..Default::default()
    }
}

#[must_use]
pub fn terrain_params(config: &TerrainConfig) -> TerrainParams {
    let noise = noise_params(config);
    TerrainParams {
        shape: shape_params(config),
        radius: shape_radius(config),
        center: shape_center(config),
        noise,
        biome: BiomeClassifier::default_params(config.seed),
        colour_noise: TextureSplatter::default_colour_params(config.seed),
        height_range: HeightRange::new(0.0, noise.height),
    }
}

#[must_use]
pub fn quadtree_params(config: &TerrainConfig) -> QuadtreeParams {
    QuadtreeParams {
        radius: shape_radius(config),
        min_node_size: positive_or(config.qt_min_cell_size, MIN_CELL_SIZE, "qt_min_cell_size"),
    }
}

/// Grid cells per chunk edge, at least one.
#[must_use]
pub fn chunk_resolution(config: &TerrainConfig) -> u32 {
    config.qt_min_cell_resolution.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_mapping() {
        let config = TerrainConfig::default();
        let params = terrain_params(&config);
        assert_eq!(params.shape, ShapeParams::Planet);
        assert_eq!(params.radius, config.planet_radius);
        assert_eq!(params.center, DVec3::ZERO);
        assert_eq!(params.noise.height, config.noise_height);
        assert_eq!(params.noise.scale, config.noise_scale);
        assert_eq!(params.height_range.max, config.noise_height);
    }

    #[test]
    fn test_ring_mapping() {
        let config = TerrainConfig {
            shape: ShapeKind::Ring,
            ring_offset: [10.0, 20.0, 30.0],
            ..Default::default()
        };
        let params = terrain_params(&config);
        assert!(params.shape.is_ring());
        assert_eq!(params.radius, config.ring_major_radius);
        assert_eq!(params.center, DVec3::new(10.0, 20.0, 30.0));
        let ShapeParams::Ring(ring) = params.shape else {
            panic!("expected ring parameters");
        };
        assert_eq!(ring.lat_cutoff, config.ring_latitude_cutoff);
        assert_eq!(ring.cull_latitude, config.ring_cull_latitude);
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let config = TerrainConfig {
            qt_min_cell_size: -4.0,
            qt_min_cell_resolution: 0,
            planet_radius: f64::NAN,
            ..Default::default()
        };
        let qt = quadtree_params(&config);
        assert_eq!(qt.min_node_size, MIN_CELL_SIZE);
        assert_eq!(qt.radius, MIN_RADIUS);
        assert_eq!(chunk_resolution(&config), 1);
    }
}
