//! Planet and ringworld terrain: chunk lifetimes, render groups, ocean and
//! scenery, driven by a cube-sphere quadtree around the camera.
//!
//! [`TerrainChunkManager`] is the entry point. Call
//! [`TerrainChunkManager::update`] once per frame with the camera's world
//! position; live chunks are then available through
//! [`TerrainChunkManager::chunks`] and the per-face [`RenderGroup`]s.

pub mod camera;
pub mod chunk;
pub mod manager;
pub mod ocean;
pub mod params;
pub mod scenery;

pub use camera::{LogDepth, TerrainUniform};
pub use chunk::{ChunkGeometry, ChunkMesh, RenderGroup, TerrainChunk};
pub use manager::{FrameStats, TerrainChunkManager};
pub use ocean::{Ocean, OceanParams, OceanPatch, OceanUniform, compute_water_color};
pub use params::{
    chunk_resolution, noise_params, quadtree_params, shape_center, shape_params, shape_radius,
    terrain_params,
};
pub use scenery::{Scenery, SceneryInstance, SceneryParams, Species, cell_rng};
