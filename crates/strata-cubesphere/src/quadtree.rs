//! Per-face quadtrees for distance-based LOD subdivision.
//!
//! Every query rebuilds all six trees from their roots. Nodes live in a
//! per-face arena and refer to their children by index, so no tree state
//! survives from one query to the next.

use glam::{DVec2, DVec3};

use crate::{Aabb2, ChunkKey, CubeFace, FaceTransform, Projector, ShapeProjector};

/// A node subdivides while the camera is closer to its projected center than
/// `size * SPLIT_DISTANCE_FACTOR`.
pub const SPLIT_DISTANCE_FACTOR: f64 = 1.0;

/// Hard cap on subdivision depth, independent of `min_node_size`.
pub const MAX_DEPTH: u8 = 24;

/// Parameters shared by all six face trees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadtreeParams {
    /// Half-width of each face (the root node's size is twice this).
    pub radius: f64,
    /// Nodes of this size or smaller never subdivide.
    pub min_node_size: f64,
}

/// Index of a node within its face's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A node in a face quadtree.
///
/// A node is a leaf iff `children` is `None`.
#[derive(Clone, Debug)]
pub struct QuadNode {
    /// Integer address of this node.
    pub key: ChunkKey,
    /// Local-plane bounds.
    pub bounds: Aabb2,
    /// Local-plane center.
    pub center: DVec2,
    /// Edge length.
    pub size: f64,
    /// Center projected onto the undisplaced surface, in shape-local space.
    pub world_center: DVec3,
    /// Child nodes, ordered as [`ChunkKey::children`].
    pub children: Option<[NodeId; 4]>,
}

impl QuadNode {
    /// Subdivision depth.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.key.depth
    }

    /// Returns true if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A leaf produced by a quadtree query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadLeaf {
    /// Stable identity of the leaf.
    pub key: ChunkKey,
    /// Local-plane bounds.
    pub bounds: Aabb2,
    /// Local-plane center.
    pub center: DVec2,
    /// Edge length.
    pub size: f64,
    /// Center projected onto the undisplaced surface, in shape-local space.
    pub world_center: DVec3,
    /// Distance from the query camera to `world_center`.
    pub distance: f64,
}

/// The quadtree for one cube face.
#[derive(Clone, Debug)]
pub struct FaceQuadtree {
    face: CubeFace,
    transform: FaceTransform,
    nodes: Vec<QuadNode>,
}

impl FaceQuadtree {
    /// Create a tree holding a single root node covering the face.
    #[must_use]
    pub fn new(face: CubeFace, params: &QuadtreeParams, projector: &Projector) -> Self {
        let mut tree = Self {
            face,
            transform: face.transform(),
            nodes: Vec::new(),
        };
        tree.reset(params, projector);
        tree
    }

    /// Which face this tree covers.
    #[must_use]
    pub fn face(&self) -> CubeFace {
        self.face
    }

    /// The face's local-to-cube transform.
    #[must_use]
    pub fn transform(&self) -> FaceTransform {
        self.transform
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &QuadNode {
        &self.nodes[0]
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.0 as usize]
    }

    /// Total number of nodes (interior and leaf).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn reset(&mut self, params: &QuadtreeParams, projector: &Projector) {
        self.nodes.clear();
        let root = self.make_node(ChunkKey::root(self.face), params, projector);
        self.nodes.push(root);
    }

    fn make_node(&self, key: ChunkKey, params: &QuadtreeParams, projector: &Projector) -> QuadNode {
        let center = key.center(params.radius);
        let size = key.size(params.radius);
        let cube_point = self
            .transform
            .apply(DVec3::new(center.x, center.y, params.radius));
        QuadNode {
            key,
            bounds: key.bounds(params.radius),
            center,
            size,
            world_center: projector.project(cube_point).position,
            children: None,
        }
    }

    /// Rebuild the tree from its root for a camera in shape-local space.
    pub fn insert(&mut self, camera: DVec3, params: &QuadtreeParams, projector: &Projector) {
        self.reset(params, projector);

        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            if !should_split(node, camera, params) {
                continue;
            }
            let child_keys = node.key.children();
            let first = self.nodes.len() as u32;
            for key in child_keys {
                let child = self.make_node(key, params, projector);
                self.nodes.push(child);
            }
            let ids = [
                NodeId(first),
                NodeId(first + 1),
                NodeId(first + 2),
                NodeId(first + 3),
            ];
            self.nodes[id.0 as usize].children = Some(ids);
            stack.extend(ids);
        }
    }

    /// All leaves in depth-first order.
    #[must_use]
    pub fn leaves(&self, camera: DVec3) -> Vec<QuadLeaf> {
        let mut out = Vec::new();
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match node.children {
                Some(children) => stack.extend(children.iter().rev()),
                None => out.push(QuadLeaf {
                    key: node.key,
                    bounds: node.bounds,
                    center: node.center,
                    size: node.size,
                    world_center: node.world_center,
                    distance: camera.distance(node.world_center),
                }),
            }
        }
        out
    }
}

/// Children are never smaller than `min_node_size`, so a node splits only
/// when half its size still reaches the minimum.
fn should_split(node: &QuadNode, camera: DVec3, params: &QuadtreeParams) -> bool {
    node.key.depth < MAX_DEPTH
        && node.size > params.min_node_size
        && node.size * 0.5 >= params.min_node_size
        && camera.distance(node.world_center) < node.size * SPLIT_DISTANCE_FACTOR
}

/// Leaves of one face together with the face's transform.
#[derive(Clone, Debug)]
pub struct FaceChildren {
    /// The face.
    pub face: CubeFace,
    /// Local-to-cube transform of the face.
    pub transform: FaceTransform,
    /// Current leaves.
    pub leaves: Vec<QuadLeaf>,
}

/// Six face quadtrees sharing one projector.
#[derive(Clone, Debug)]
pub struct CubeQuadtree {
    params: QuadtreeParams,
    projector: Projector,
    faces: Vec<FaceQuadtree>,
    camera: DVec3,
}

impl CubeQuadtree {
    /// Create six unsubdivided face trees.
    #[must_use]
    pub fn new(params: QuadtreeParams, projector: Projector) -> Self {
        let faces = CubeFace::ALL
            .iter()
            .map(|&face| FaceQuadtree::new(face, &params, &projector))
            .collect();
        Self {
            params,
            projector,
            faces,
            camera: DVec3::ZERO,
        }
    }

    /// The quadtree parameters.
    #[must_use]
    pub fn params(&self) -> &QuadtreeParams {
        &self.params
    }

    /// The projector used to place node centers.
    #[must_use]
    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Access one face's tree.
    #[must_use]
    pub fn face(&self, face: CubeFace) -> &FaceQuadtree {
        &self.faces[face.index()]
    }

    /// Rebuild all six trees for a camera in shape-local space.
    pub fn insert(&mut self, camera: DVec3) {
        self.camera = camera;
        for tree in &mut self.faces {
            tree.insert(camera, &self.params, &self.projector);
        }
    }

    /// Leaves of every face from the most recent [`Self::insert`].
    #[must_use]
    pub fn children(&self) -> Vec<FaceChildren> {
        self.faces
            .iter()
            .map(|tree| FaceChildren {
                face: tree.face(),
                transform: tree.transform(),
                leaves: tree.leaves(self.camera),
            })
            .collect()
    }

    /// Upper bound on leaf depth implied by the parameters.
    #[must_use]
    pub fn depth_bound(&self) -> u32 {
        let root = 2.0 * self.params.radius;
        let ratio = root / self.params.min_node_size.max(f64::MIN_POSITIVE);
        (ratio.log2().ceil().max(0.0) as u32 + 1).min(MAX_DEPTH as u32)
    }
}
