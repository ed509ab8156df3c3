//! Renderable terrain chunks and the per-face groups that hold them.

use glam::{DVec3, Vec3};
use strata_cubesphere::{Aabb2, ChunkKey, CubeFace, FaceTransform};
use strata_mesh::{BuildResult, TerrainVertex, vertex_bytes};

/// Vertex storage for one chunk. Exclusively owned by its chunk.
#[derive(Debug)]
pub struct ChunkGeometry {
    vertices: Vec<TerrainVertex>,
    disposed: bool,
}

impl ChunkGeometry {
    #[must_use]
    pub fn from_result(result: &BuildResult) -> Self {
        Self {
            vertices: result.interleave(),
            disposed: false,
        }
    }

    /// Interleaved vertices, empty once disposed.
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Raw vertex bytes for upload.
    pub fn bytes(&self) -> &[u8] {
        vertex_bytes(&self.vertices)
    }

    /// Number of vertices held.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if no vertices are held.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns true after [`Self::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the vertex storage.
    pub fn dispose(&mut self) {
        self.vertices = Vec::new();
        self.disposed = true;
    }
}

/// Scene-graph node placing a chunk's geometry relative to the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkMesh {
    /// `origin - camera`, in render space.
    pub render_offset: Vec3,
    /// Whether the mesh is drawn.
    pub visible: bool,
}

/// One live chunk: a quadtree leaf with its built geometry.
#[derive(Debug)]
pub struct TerrainChunk {
    /// Quadtree leaf this chunk covers.
    pub key: ChunkKey,
    /// Transform of the chunk's cube face.
    pub transform: FaceTransform,
    /// Local-plane bounds of the leaf.
    pub bounds: Aabb2,
    /// Edge length in the face plane.
    pub size: f64,
    /// World-space origin the vertex positions are relative to.
    pub origin: DVec3,
    /// Scene-graph placement.
    pub mesh: ChunkMesh,
    /// Built vertices, owned by this chunk alone.
    pub geometry: ChunkGeometry,
}

impl TerrainChunk {
    /// Cube face the chunk lies on.
    pub fn face(&self) -> CubeFace {
        self.key.face
    }

    /// Move the mesh so it renders correctly for a camera at `camera`.
    pub fn reposition(&mut self, camera: DVec3) {
        self.mesh.render_offset = (self.origin - camera).as_vec3();
    }
}

/// Render group for one cube face; lists the keys of its child chunks.
#[derive(Clone, Debug)]
pub struct RenderGroup {
    face: CubeFace,
    transform: FaceTransform,
    children: Vec<ChunkKey>,
    /// Whether the group is attached to the render graph.
    pub visible: bool,
}

impl RenderGroup {
    /// An empty, visible group for `face`.
    #[must_use]
    pub fn new(face: CubeFace) -> Self {
        Self {
            face,
            transform: face.transform(),
            children: Vec::new(),
            visible: true,
        }
    }

    /// The group's cube face.
    pub fn face(&self) -> CubeFace {
        self.face
    }

    /// Transform shared by every child chunk.
    pub fn transform(&self) -> FaceTransform {
        self.transform
    }

    /// Keys of the attached chunks.
    pub fn children(&self) -> &[ChunkKey] {
        &self.children
    }

    /// Returns true if `key` is attached.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.children.contains(key)
    }

    /// Attach a chunk. Adding a key twice is a no-op.
    pub fn add(&mut self, key: ChunkKey) {
        if !self.children.contains(&key) {
            self.children.push(key);
        }
    }

    /// Detach a child. Returns whether it was present.
    pub fn remove(&mut self, key: &ChunkKey) -> bool {
        match self.children.iter().position(|k| k == key) {
            Some(i) => {
                self.children.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Detach every chunk.
    pub fn clear(&mut self) {
        self.children.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_add_is_idempotent() {
        let mut group = RenderGroup::new(CubeFace::PosX);
        let key = ChunkKey::root(CubeFace::PosX);
        group.add(key);
        group.add(key);
        assert_eq!(group.children(), &[key]);
    }

    #[test]
    fn test_group_remove_detaches_child() {
        let mut group = RenderGroup::new(CubeFace::NegZ);
        let keys = ChunkKey::root(CubeFace::NegZ).children();
        for key in keys {
            group.add(key);
        }
        assert!(group.remove(&keys[1]));
        assert!(!group.remove(&keys[1]));
        assert!(!group.contains(&keys[1]));
        assert_eq!(group.children().len(), 3);
    }

    #[test]
    fn test_dispose_releases_vertices() {
        let mut result = BuildResult::empty(ChunkKey::root(CubeFace::PosY));
        result.positions = vec![0.0; 9];
        result.normals = vec![0.0; 9];
        let mut geometry = ChunkGeometry::from_result(&result);
        assert_eq!(geometry.vertex_count(), 3);
        geometry.dispose();
        assert!(geometry.is_disposed());
        assert!(geometry.is_empty());
        assert!(geometry.bytes().is_empty());
    }

    #[test]
    fn test_reposition_is_camera_relative() {
        let mut chunk = TerrainChunk {
            key: ChunkKey::root(CubeFace::PosZ),
            transform: CubeFace::PosZ.transform(),
            bounds: ChunkKey::root(CubeFace::PosZ).bounds(100.0),
            size: 200.0,
            origin: DVec3::new(0.0, 0.0, 100.0),
            mesh: ChunkMesh {
                render_offset: Vec3::ZERO,
                visible: true,
            },
            geometry: ChunkGeometry::from_result(&BuildResult::empty(ChunkKey::root(CubeFace::PosZ))),
        };
        chunk.reposition(DVec3::new(0.0, 0.0, 150.0));
        assert_eq!(chunk.mesh.render_offset, Vec3::new(0.0, 0.0, -50.0));
    }
}
