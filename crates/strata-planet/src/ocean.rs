//! Ocean surface patches that follow the terrain chunk set.
//!
//! Each live chunk gets a coarse water patch at `radius + sea_level`,
//! projected with the terrain's own projector, tinted by water depth.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Vec3};
use rustc_hash::FxHashMap;
use strata_cubesphere::{ChunkKey, Projector, ShapeProjector};
use strata_mesh::TerrainParams;
use strata_terrain::HeightGenerator;

use crate::chunk::TerrainChunk;

/// Ocean configuration for a body.
#[derive(Clone, Debug)]
pub struct OceanParams {
    /// Sea level above the undisplaced surface.
    pub sea_level: f64,
    /// Grid cells per patch edge.
    pub resolution: u32,
    /// Deep water color (linear RGB).
    pub deep_color: [f32; 3],
    /// Shallow water color (linear RGB).
    pub shallow_color: [f32; 3],
    /// Depth at which water reaches the deep color.
    pub color_depth: f32,
}

impl Default for OceanParams {
    fn default() -> Self {
        Self {
            sea_level: 120.0,
            resolution: 8,
            deep_color: [0.01, 0.03, 0.15],
            shallow_color: [0.0, 0.5, 0.6],
            color_depth: 50.0,
        }
    }
}

/// GPU uniform for ocean shading.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct OceanUniform {
    pub deep_color: [f32; 3],
    pub color_depth: f32,
    pub shallow_color: [f32; 3],
    pub sea_level: f32,
    pub sun_direction: [f32; 3],
    pub time: f32,
}

static_assertions::assert_eq_size!(OceanUniform, [u8; 48]);

impl OceanUniform {
    pub fn from_params(params: &OceanParams, sun_direction: Vec3, time: f32) -> Self {
        Self {
            deep_color: params.deep_color,
            color_depth: params.color_depth,
            shallow_color: params.shallow_color,
            sea_level: params.sea_level as f32,
            sun_direction: sun_direction.normalize_or(Vec3::Y).to_array(),
            time,
        }
    }
}

/// Water color for a given depth, blending shallow to deep.
pub fn compute_water_color(depth: f32, params: &OceanParams) -> [f32; 3] {
    let t = (depth / params.color_depth).clamp(0.0, 1.0);
    [
        params.shallow_color[0] + (params.deep_color[0] - params.shallow_color[0]) * t,
        params.shallow_color[1] + (params.deep_color[1] - params.shallow_color[1]) * t,
        params.shallow_color[2] + (params.deep_color[2] - params.shallow_color[2]) * t,
    ]
}

/// Water surface for one chunk: unindexed triangles relative to the chunk origin.
#[derive(Clone, Debug, Default)]
pub struct OceanPatch {
    /// Positions relative to the chunk origin, three floats per vertex.
    pub positions: Vec<f32>,
    /// Depth-tinted linear RGB per vertex.
    pub colours: Vec<f32>,
}

impl OceanPatch {
    /// Number of water vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Returns true if the chunk holds no water.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Water patches for the live chunk set.
pub struct Ocean {
    params: OceanParams,
    projector: Projector,
    center: DVec3,
    heights: HeightGenerator,
    patches: FxHashMap<ChunkKey, OceanPatch>,
    enabled: bool,
}

impl Ocean {
    /// Ocean for a body, projected with the body's own projector.
    pub fn new(params: OceanParams, terrain: &TerrainParams, enabled: bool) -> Self {
        Self {
            projector: terrain.shape.projector(terrain.radius),
            center: terrain.center,
            heights: HeightGenerator::new(terrain.noise, terrain.height_range),
            patches: FxHashMap::default(),
            params,
            enabled,
        }
    }

    pub fn params(&self) -> &OceanParams {
        &self.params
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.patches.clear();
        }
    }

    /// Water patch of a live chunk.
    pub fn patch(&self, key: &ChunkKey) -> Option<&OceanPatch> {
        self.patches.get(key)
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    pub fn uniform(&self, sun_direction: Vec3, time: f32) -> OceanUniform {
        OceanUniform::from_params(&self.params, sun_direction, time)
    }

    /// Build the water patch for a newly created chunk.
    pub fn insert(&mut self, chunk: &TerrainChunk) {
        if !self.enabled {
            return;
        }
        let patch = self.build_patch(chunk);
        self.patches.insert(chunk.key, patch);
    }

    /// Drop the patch of a recycled chunk.
    pub fn remove(&mut self, key: &ChunkKey) {
        self.patches.remove(key);
    }

    pub fn clear(&mut self) {
        self.patches.clear();
    }

    fn build_patch(&self, chunk: &TerrainChunk) -> OceanPatch {
        let res = self.params.resolution.max(1) as usize;
        let side = res + 1;
        let radius = self.projector.radius();
        let center = chunk.bounds.center();
        let half = chunk.size * 0.5;
        let step = chunk.size / res as f64;

        let mut points = Vec::with_capacity(side * side);
        for j in 0..side {
            for i in 0..side {
                let local = DVec3::new(
                    center.x - half + i as f64 * step,
                    center.y - half + j as f64 * step,
                    radius,
                );
                let projected = self.projector.project(chunk.transform.apply(local));
                let surface = self.center + projected.position;
                let water = self.center + projected.displaced(self.params.sea_level);
                let ground = self.heights.get(surface) * projected.height_mask;
                let depth = (self.params.sea_level * projected.height_mask - ground) as f32;
                points.push((projected, water, depth));
            }
        }

        let mut patch = OceanPatch::default();
        let inward = self.projector.faces_inward();
        for j in 0..res {
            for i in 0..res {
                let a = j * side + i;
                let b = a + 1;
                let c = a + side + 1;
                let d = a + side;
                let tris = if inward {
                    [[a, c, b], [a, d, c]]
                } else {
                    [[a, b, c], [a, c, d]]
                };
                for tri in tris {
                    let corners = tri.map(|v| points[v].0);
                    if self.projector.culls_triangle(&corners) {
                        continue;
                    }
                    // Fully dry triangles are skipped.
                    if tri.iter().all(|&v| points[v].2 <= 0.0) {
                        continue;
                    }
                    for v in tri {
                        let (_, water, depth) = points[v];
                        patch
                            .positions
                            .extend((water - chunk.origin).as_vec3().to_array());
                        patch.colours.extend(compute_water_color(depth.max(0.0), &self.params));
                    }
                }
            }
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkGeometry, ChunkMesh};
    use strata_cubesphere::{ChunkKey, CubeFace, RingParams, ShapeParams, ring_height_mask};
    use strata_mesh::{BuildRequest, BuildResult};
    use strata_terrain::{BiomeClassifier, HeightRange, NoiseParams, TextureSplatter};

    const RADIUS: f64 = 10_000.0;

    fn terrain(shape: ShapeParams, center: DVec3) -> TerrainParams {
        let noise = NoiseParams::default();
        TerrainParams {
            shape,
            radius: RADIUS,
            center,
            noise,
            biome: BiomeClassifier::default_params(noise.seed),
            colour_noise: TextureSplatter::default_colour_params(noise.seed),
            height_range: HeightRange::new(0.0, noise.height),
        }
    }

    fn chunk(key: ChunkKey, terrain: &TerrainParams) -> TerrainChunk {
        TerrainChunk {
            key,
            transform: key.face.transform(),
            bounds: key.bounds(terrain.radius),
            size: key.size(terrain.radius),
            origin: BuildRequest::for_key(key, 1, terrain).origin,
            mesh: ChunkMesh {
                render_offset: Vec3::ZERO,
                visible: true,
            },
            geometry: ChunkGeometry::from_result(&BuildResult::empty(key)),
        }
    }

    fn ocean(sea_level: f64, resolution: u32, terrain: &TerrainParams) -> Ocean {
        let params = OceanParams {
            sea_level,
            resolution,
            ..Default::default()
        };
        Ocean::new(params, terrain, true)
    }

    fn water_at(patch: &OceanPatch, origin: DVec3, vertex: usize) -> DVec3 {
        let p = &patch.positions[vertex * 3..vertex * 3 + 3];
        origin + DVec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]))
    }

    #[test]
    fn test_planet_water_sits_at_sea_level() {
        let terrain = terrain(ShapeParams::Planet, DVec3::ZERO);
        // Above the highest terrain, so every triangle is wet.
        let sea_level = 2_000.0;
        let mut ocean = ocean(sea_level, 8, &terrain);
        let key = ChunkKey {
            face: CubeFace::NegY,
            depth: 2,
            x: 1,
            y: 2,
        };
        let chunk = chunk(key, &terrain);
        ocean.insert(&chunk);

        let patch = ocean.patch(&key).expect("patch for inserted chunk");
        assert_eq!(patch.vertex_count(), 8 * 8 * 2 * 3);
        assert_eq!(patch.colours.len(), patch.positions.len());
        for v in 0..patch.vertex_count() {
            let radius = water_at(patch, chunk.origin, v).length();
            assert!(
                (radius - (RADIUS + sea_level)).abs() < 1e-2,
                "water vertex {v} at radius {radius}"
            );
        }
    }

    #[test]
    fn test_dry_patches_are_empty() {
        let terrain = terrain(ShapeParams::Planet, DVec3::ZERO);
        // Terrain never goes below zero, so nothing is under water.
        let mut ocean = ocean(-1.0, 8, &terrain);
        let key = ChunkKey::root(CubeFace::PosX);
        ocean.insert(&chunk(key, &terrain));
        assert!(ocean.patch(&key).is_some_and(OceanPatch::is_empty));
    }

    #[test]
    fn test_ring_water_follows_height_mask() {
        let center = DVec3::new(500.0, -200.0, 1_000.0);
        let terrain = terrain(ShapeParams::Ring(RingParams::default()), center);
        let ring = RingParams::default();
        let sea_level = 2_000.0;
        let mut ocean = ocean(sea_level, 16, &terrain);

        let mut vertices = 0;
        let mut faded = 0;
        let depth = 3;
        let grid = ChunkKey::grid_size(depth);
        for y in 0..grid {
            for x in 0..grid {
                let key = ChunkKey {
                    face: CubeFace::PosX,
                    depth,
                    x,
                    y,
                };
                let chunk = chunk(key, &terrain);
                ocean.insert(&chunk);
                let Some(patch) = ocean.patch(&key) else {
                    panic!("{key} has no patch");
                };
                for v in 0..patch.vertex_count() {
                    let local = water_at(patch, chunk.origin, v) - center;
                    let latitude = local.y / RADIUS;
                    assert!(
                        latitude.abs() <= ring.cull_latitude + 1e-6,
                        "{key}: water at latitude {latitude} survived culling"
                    );
                    let mask = ring_height_mask(latitude, &ring);
                    assert!(mask > 0.0, "{key}: water vertex with mask {mask}");
                    let equatorial = DVec3::new(local.x, 0.0, local.z).length();
                    let expected = RADIUS - sea_level * mask;
                    assert!(
                        (equatorial - expected).abs() < 1e-2,
                        "{key}: water at {equatorial}, expected {expected}"
                    );
                    if mask < 1.0 {
                        faded += 1;
                    }
                }
                vertices += patch.vertex_count();
            }
        }
        assert!(vertices > 0, "ring band should hold water");
        assert!(faded > 0, "water should fade toward the band edges");
    }

    #[test]
    fn test_remove_and_disable_drop_patches() {
        let terrain = terrain(ShapeParams::Planet, DVec3::ZERO);
        let mut ocean = ocean(2_000.0, 4, &terrain);
        let keys = ChunkKey::root(CubeFace::PosZ).children();
        for key in keys {
            ocean.insert(&chunk(key, &terrain));
        }
        assert_eq!(ocean.patch_count(), 4);
        ocean.remove(&keys[0]);
        assert!(ocean.patch(&keys[0]).is_none());
        ocean.set_enabled(false);
        assert_eq!(ocean.patch_count(), 0);
        ocean.insert(&chunk(keys[1], &terrain));
        assert_eq!(ocean.patch_count(), 0);
    }

    #[test]
    fn test_water_color_blends_shallow_to_deep() {
        let params = OceanParams::default();
        assert_eq!(compute_water_color(0.0, &params), params.shallow_color);
        let deep = compute_water_color(1_000.0, &params);
        for c in 0..3 {
            assert!((deep[c] - params.deep_color[c]).abs() < 1e-6);
        }
        let mid = compute_water_color(params.color_depth * 0.5, &params);
        for c in 0..3 {
            let lo = params.shallow_color[c].min(params.deep_color[c]);
            let hi = params.shallow_color[c].max(params.deep_color[c]);
            assert!((lo..=hi).contains(&mid[c]), "channel {c} = {} outside blend", mid[c]);
        }
    }

    #[test]
    fn test_negative_depth_is_shallow() {
        let params = OceanParams::default();
        assert_eq!(compute_water_color(-10.0, &params), params.shallow_color);
    }

    #[test]
    fn test_uniform_layout() {
        let uniform = OceanUniform::from_params(&OceanParams::default(), Vec3::X, 1.0);
        assert_eq!(uniform.sun_direction, [1.0, 0.0, 0.0]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 48);
    }
}
