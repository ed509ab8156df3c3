//! Self-contained chunk build inputs and outputs.
//!
//! A [`BuildRequest`] carries everything a worker needs to rebuild the
//! generators and sample a chunk, so no state is shared between threads.
//! A [`BuildResult`] carries flat `f32` arrays, one entry group per vertex,
//! three vertices per triangle.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use strata_cubesphere::{ChunkKey, FaceTransform, ShapeParams, ShapeProjector};
use strata_terrain::{HeightRange, NoiseParams};

/// Generator parameters shared by every chunk of one body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Planet or ring, with the ring's latitude tunables.
    pub shape: ShapeParams,
    /// Cube half-width: planet radius or ring major radius.
    pub radius: f64,
    /// World-space center of the shape.
    pub center: DVec3,
    /// Height field.
    pub noise: NoiseParams,
    /// Low-frequency field that selects the biome.
    pub biome: NoiseParams,
    /// Field that varies texture weights and vertex colour.
    pub colour_noise: NoiseParams,
    /// Bounds heights are clamped to.
    pub height_range: HeightRange,
}

/// Input to [`crate::build_chunk`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Identity of the leaf being built; echoed back in the result.
    pub key: ChunkKey,
    /// Face-local chunk center `(cx, cy)` with the face plane distance as `z`.
    pub offset: DVec3,
    pub transform: FaceTransform,
    /// Edge length of the chunk in the face plane.
    pub width: f64,
    /// Grid cells per edge; the grid has `(resolution + 1)^2` points.
    pub resolution: u32,
    pub radius: f64,
    /// World-space center of the shape.
    pub center: DVec3,
    /// World-space origin that output positions are relative to.
    pub origin: DVec3,
    pub shape: ShapeParams,
    pub noise_params: NoiseParams,
    pub biome_params: NoiseParams,
    pub colour_noise_params: NoiseParams,
    pub height_range: HeightRange,
}

impl BuildRequest {
    /// Request for the chunk covering `key`.
    ///
    /// The origin is the projected, undisplaced chunk center.
    #[must_use]
    pub fn for_key(key: ChunkKey, resolution: u32, params: &TerrainParams) -> Self {
        let center2: DVec2 = key.center(params.radius);
        let offset = DVec3::new(center2.x, center2.y, params.radius);
        let transform = key.face.transform();
        let projector = params.shape.projector(params.radius);
        let origin = params.center + projector.project(transform.apply(offset)).position;
        Self {
            key,
            offset,
            transform,
            width: key.size(params.radius),
            resolution,
            radius: params.radius,
            center: params.center,
            origin,
            shape: params.shape,
            noise_params: params.noise,
            biome_params: params.biome,
            colour_noise_params: params.colour_noise,
            height_range: params.height_range,
        }
    }
}

/// Output of [`crate::build_chunk`]: unindexed triangle soup.
///
/// Per vertex: `positions`, `normals`, `colours` and `coords` hold 3 floats,
/// `uvs` holds 2, `weights1` (texture indices) and `weights2` (strengths)
/// hold 4 each. All three vertices of a triangle share their weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Key of the request this result answers.
    pub key: ChunkKey,
    /// Positions relative to the request origin.
    pub positions: Vec<f32>,
    /// Unit vertex normals.
    pub normals: Vec<f32>,
    /// Linear RGB vertex colours.
    pub colours: Vec<f32>,
    /// Grid-relative texture coordinates, two per vertex.
    pub uvs: Vec<f32>,
    /// World-space positions for triplanar texturing.
    pub coords: Vec<f32>,
    /// Texture layer indices of the triangle's four strongest layers.
    pub weights1: Vec<f32>,
    /// Strengths matching `weights1`, summing to 1.
    pub weights2: Vec<f32>,
}

impl BuildResult {
    /// An empty result, produced when every triangle is culled.
    #[must_use]
    pub fn empty(key: ChunkKey) -> Self {
        Self {
            key,
            positions: Vec::new(),
            normals: Vec::new(),
            colours: Vec::new(),
            uvs: Vec::new(),
            coords: Vec::new(),
            weights1: Vec::new(),
            weights2: Vec::new(),
        }
    }

    /// Number of emitted vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of emitted triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Returns true if every triangle was culled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bytes held by all attribute arrays.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        let floats = self.positions.len()
            + self.normals.len()
            + self.colours.len()
            + self.uvs.len()
            + self.coords.len()
            + self.weights1.len()
            + self.weights2.len();
        floats * std::mem::size_of::<f32>()
    }
}
