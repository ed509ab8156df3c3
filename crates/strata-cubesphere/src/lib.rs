//! Cube-sphere geometry: face transforms, shape projection (sphere and ring),
//! chunk keys, and the stateless per-query face quadtree.

mod bounds;
mod chunk_key;
mod cube_face;
mod projection;
mod quadtree;

pub use bounds::Aabb2;
pub use chunk_key::ChunkKey;
pub use cube_face::{CubeFace, FaceTransform};
pub use projection::{
    MIN_DROP_EXPONENT, MIN_LATITUDE_FADE, Projected, Projector, RingParams, RingProjector,
    ShapeParams, ShapeProjector, SphereProjector, ring_height_mask,
};
pub use quadtree::{
    CubeQuadtree, FaceChildren, FaceQuadtree, MAX_DEPTH, NodeId, QuadLeaf, QuadNode,
    QuadtreeParams, SPLIT_DISTANCE_FACTOR,
};
