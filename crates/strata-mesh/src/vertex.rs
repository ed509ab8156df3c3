//! Interleaved vertex layout for GPU upload.

use crate::request::BuildResult;

/// One interleaved terrain vertex.
///
/// Layout (88 bytes total, all `f32`):
///   - `position` (3): relative to the chunk origin
///   - `normal` (3)
///   - `colour` (3)
///   - `uv` (2)
///   - `coords` (3): world-space position for triplanar sampling
///   - `weights1` (4): texture-array indices
///   - `weights2` (4): blend strengths
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub colour: [f32; 3],
    pub uv: [f32; 2],
    pub coords: [f32; 3],
    pub weights1: [f32; 4],
    pub weights2: [f32; 4],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 88]);

fn take<const N: usize>(data: &[f32], vertex: usize) -> [f32; N] {
    let mut out = [0.0; N];
    if let Some(src) = data.get(vertex * N..vertex * N + N) {
        out.copy_from_slice(src);
    }
    out
}

impl BuildResult {
    /// Interleave the attribute arrays.
    #[must_use]
    pub fn interleave(&self) -> Vec<TerrainVertex> {
        (0..self.vertex_count())
            .map(|v| TerrainVertex {
                position: take(&self.positions, v),
                normal: take(&self.normals, v),
                colour: take(&self.colours, v),
                uv: take(&self.uvs, v),
                coords: take(&self.coords, v),
                weights1: take(&self.weights1, v),
                weights2: take(&self.weights2, v),
            })
            .collect()
    }

    /// Raw bytes of the position array.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Raw bytes of an interleaved vertex buffer.
#[must_use]
pub fn vertex_bytes(vertices: &[TerrainVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_cubesphere::{ChunkKey, CubeFace};

    fn two_vertex_result() -> BuildResult {
        BuildResult {
            key: ChunkKey::root(CubeFace::PosX),
            positions: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            normals: vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            colours: vec![0.5; 6],
            uvs: vec![0.0, 0.0, 1.0, 0.5],
            coords: vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            weights1: vec![0.0, 1.0, 3.0, 4.0, 0.0, 1.0, 3.0, 4.0],
            weights2: vec![0.7, 0.1, 0.1, 0.1, 0.7, 0.1, 0.1, 0.1],
        }
    }

    #[test]
    fn test_interleave_preserves_attributes() {
        let vertices = two_vertex_result().interleave();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].uv, [1.0, 0.5]);
        assert_eq!(vertices[0].coords, [10.0, 20.0, 30.0]);
        assert_eq!(vertices[0].weights1, [0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_byte_views_match_sizes() {
        let result = two_vertex_result();
        let vertices = result.interleave();
        assert_eq!(vertex_bytes(&vertices).len(), 2 * std::mem::size_of::<TerrainVertex>());
        assert_eq!(result.position_bytes().len(), 6 * 4);
    }

    #[test]
    fn test_empty_result_interleaves_to_nothing() {
        let result = BuildResult::empty(ChunkKey::root(CubeFace::NegY));
        assert!(result.interleave().is_empty());
        assert!(vertex_bytes(&result.interleave()).is_empty());
    }
}
