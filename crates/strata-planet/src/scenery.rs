//! Scattered surface props (trees, rocks, bushes) for nearby chunks.
//!
//! Placement walks a fixed grid of cells in each face plane. Every cell
//! seeds its own RNG from `(seed, face, cell_x, cell_y)`, so an instance
//! lands on the same spot whichever LOD leaf currently covers it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::{DVec2, DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use strata_config::SceneryConfig;
use strata_cubesphere::{ChunkKey, CubeFace, Projector, ShapeProjector};
use strata_mesh::TerrainParams;
use strata_terrain::HeightGenerator;

/// Kind of prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    /// Tall prop, weighted by `tree_ratio`.
    Tree,
    /// Weighted by `rock_ratio`.
    Rock,
    /// Weighted by `bush_ratio`.
    Bush,
}

/// One placed prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneryInstance {
    /// What to draw.
    pub species: Species,
    /// World-space position on the displaced surface.
    pub position: DVec3,
    /// Local vertical at the instance.
    pub up: DVec3,
    /// Rotation about `up`, in radians.
    pub rotation: f32,
    /// Uniform scale in `[0.8, 1.2)`.
    pub scale: f32,
}

/// Placement tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneryParams {
    /// World seed; every cell's RNG derives from it.
    pub seed: u64,
    /// Edge length of a placement cell in the face plane.
    pub cell_size: f64,
    /// Chunks larger than this get no scenery.
    pub max_node_size: f64,
    /// Probability that a cell holds an instance.
    pub density: f64,
    /// Relative share of trees.
    pub tree_ratio: f64,
    /// Relative share of rocks.
    pub rock_ratio: f64,
    /// Relative share of bushes.
    pub bush_ratio: f64,
    /// Instances on terrain below this height are skipped.
    pub sea_level: f64,
}

impl SceneryParams {
    /// Placement parameters from configuration, with out-of-range values
    /// clamped.
    pub fn from_config(config: &SceneryConfig, seed: u64, sea_level: f64) -> Self {
        Self {
            seed,
            cell_size: config.cell_size.max(1.0),
            max_node_size: config.max_node_size,
            density: config.density.clamp(0.0, 1.0),
            tree_ratio: config.tree_ratio.max(0.0),
            rock_ratio: config.rock_ratio.max(0.0),
            bush_ratio: config.bush_ratio.max(0.0),
            sea_level,
        }
    }

    fn pick_species(&self, roll: f64) -> Option<Species> {
        let total = self.tree_ratio + self.rock_ratio + self.bush_ratio;
        if total <= 0.0 {
            return None;
        }
        let r = roll * total;
        if r < self.tree_ratio {
            Some(Species::Tree)
        } else if r < self.tree_ratio + self.rock_ratio {
            Some(Species::Rock)
        } else {
            Some(Species::Bush)
        }
    }
}

/// Deterministic RNG for one placement cell.
pub fn cell_rng(seed: u64, face: CubeFace, cell_x: i64, cell_y: i64) -> ChaCha8Rng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    face.index().hash(&mut hasher);
    cell_x.hash(&mut hasher);
    cell_y.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

/// Scenery for the live chunk set.
pub struct Scenery {
    params: SceneryParams,
    projector: Projector,
    center: DVec3,
    heights: HeightGenerator,
    instances: FxHashMap<ChunkKey, Vec<SceneryInstance>>,
    enabled: bool,
}

impl Scenery {
    /// Scenery for a body, placed with the body's own projector and heights.
    pub fn new(params: SceneryParams, terrain: &TerrainParams, enabled: bool) -> Self {
        Self {
            projector: terrain.shape.projector(terrain.radius),
            center: terrain.center,
            heights: HeightGenerator::new(terrain.noise, terrain.height_range),
            instances: FxHashMap::default(),
            params,
            enabled,
        }
    }

    /// Placement parameters.
    pub fn params(&self) -> &SceneryParams {
        &self.params
    }

    /// Whether new chunks get scenery.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn placement on or off. Disabling drops every instance.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.instances.clear();
        }
    }

    /// Instances placed in one chunk; empty if none.
    pub fn instances(&self, key: &ChunkKey) -> &[SceneryInstance] {
        self.instances.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every populated chunk with its instances.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &[SceneryInstance])> {
        self.instances.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Instances across all chunks.
    pub fn instance_count(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    /// Populate a newly created chunk.
    pub fn insert(&mut self, key: ChunkKey) {
        if !self.enabled {
            return;
        }
        let placed = self.place(key);
        if !placed.is_empty() {
            self.instances.insert(key, placed);
        }
    }

    /// Drop the instances of a recycled chunk.
    pub fn remove(&mut self, key: &ChunkKey) {
        self.instances.remove(key);
    }

    /// Drop every instance.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Instances whose placement point falls inside `key`.
    pub fn place(&self, key: ChunkKey) -> Vec<SceneryInstance> {
        let radius = self.projector.radius();
        if key.size(radius) > self.params.max_node_size {
            return Vec::new();
        }
        let bounds = key.bounds(radius);
        let transform = key.face.transform();
        let cell = self.params.cell_size;

        let x0 = (bounds.min.x / cell).floor() as i64;
        let x1 = (bounds.max.x / cell).ceil() as i64;
        let y0 = (bounds.min.y / cell).floor() as i64;
        let y1 = (bounds.max.y / cell).ceil() as i64;

        let mut out = Vec::new();
        for cy in y0..y1 {
            for cx in x0..x1 {
                let mut rng = cell_rng(self.params.seed, key.face, cx, cy);
                if rng.random::<f64>() >= self.params.density {
                    continue;
                }
                let local = DVec2::new(
                    (cx as f64 + rng.random::<f64>()) * cell,
                    (cy as f64 + rng.random::<f64>()) * cell,
                );
                let Some(species) = self.params.pick_species(rng.random::<f64>()) else {
                    continue;
                };
                let rotation = rng.random_range(0.0..std::f32::consts::TAU);
                let scale = rng.random_range(0.8..1.2_f32);

                if !bounds.contains_half_open(local) {
                    continue;
                }
                let projected = self
                    .projector
                    .project(transform.apply(DVec3::new(local.x, local.y, radius)));
                if self.projector.culls_triangle(&[projected; 3]) {
                    continue;
                }
                let height = self.heights.get(self.center + projected.position);
                if height < self.params.sea_level {
                    continue;
                }
                out.push(SceneryInstance {
                    species,
                    position: self.center + projected.displaced(height),
                    up: projected.up,
                    rotation,
                    scale,
                });
            }
        }
        out
    }
}
