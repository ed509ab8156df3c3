//! Unique chunk identifier on the cube.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{Aabb2, CubeFace};

/// Uniquely identifies a quadtree leaf (and the chunk built for it).
///
/// - `face`: which of the 6 cube faces this chunk belongs to.
/// - `depth`: subdivision depth. Depth 0 is the whole face.
/// - `x`, `y`: grid coordinates within the face at this depth. At depth `d`
///   the face is divided into a `2^d × 2^d` grid.
///
/// The integer address determines the node's center and size exactly, so
/// the key hashes and compares without any floating-point fuzz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Which cube face this chunk belongs to.
    pub face: CubeFace,
    /// Subdivision depth (0 = whole face).
    pub depth: u8,
    /// Horizontal grid coordinate within the face at this depth.
    pub x: u32,
    /// Vertical grid coordinate within the face at this depth.
    pub y: u32,
}

impl ChunkKey {
    /// The key covering a whole face.
    #[must_use]
    pub fn root(face: CubeFace) -> Self {
        Self {
            face,
            depth: 0,
            x: 0,
            y: 0,
        }
    }

    /// Number of cells along one axis at the given depth.
    #[must_use]
    pub fn grid_size(depth: u8) -> u32 {
        1u32 << depth
    }

    /// Edge length of this node in a face of half-width `radius`.
    #[must_use]
    pub fn size(&self, radius: f64) -> f64 {
        2.0 * radius / Self::grid_size(self.depth) as f64
    }

    /// Center of this node in the face-local plane.
    #[must_use]
    pub fn center(&self, radius: f64) -> DVec2 {
        let size = self.size(radius);
        DVec2::new(
            -radius + (self.x as f64 + 0.5) * size,
            -radius + (self.y as f64 + 0.5) * size,
        )
    }

    /// Local-plane bounds of this node.
    #[must_use]
    pub fn bounds(&self, radius: f64) -> Aabb2 {
        Aabb2::from_center_size(self.center(radius), self.size(radius))
    }

    /// The four child keys at the next depth.
    ///
    /// Children are ordered: \[(x, y), (x+1, y), (x, y+1), (x+1, y+1)\].
    #[must_use]
    pub fn children(&self) -> [ChunkKey; 4] {
        let depth = self.depth + 1;
        let cx = self.x * 2;
        let cy = self.y * 2;
        [(cx, cy), (cx + 1, cy), (cx, cy + 1), (cx + 1, cy + 1)].map(|(x, y)| ChunkKey {
            face: self.face,
            depth,
            x,
            y,
        })
    }

    /// The parent key, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<ChunkKey> {
        (self.depth > 0).then(|| ChunkKey {
            face: self.face,
            depth: self.depth - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/d{}/{}x{}", self.face, self.depth, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_covers_entire_face() {
        let root = ChunkKey::root(CubeFace::PosY);
        let b = root.bounds(100.0);
        assert_eq!(b.min, DVec2::new(-100.0, -100.0));
        assert_eq!(b.max, DVec2::new(100.0, 100.0));
    }

    #[test]
    fn test_children_cover_parent_exactly() {
        let parent = ChunkKey {
            face: CubeFace::NegZ,
            depth: 3,
            x: 5,
            y: 2,
        };
        let radius = 4000.0;
        let area: f64 = parent.children().iter().map(|c| c.bounds(radius).area()).sum();
        assert!((area - parent.bounds(radius).area()).abs() < 1e-6);
        for child in parent.children() {
            assert_eq!(child.parent(), Some(parent));
            assert!(parent.bounds(radius).contains(child.center(radius)));
        }
    }

    #[test]
    fn test_root_has_no_parent() {
        assert_eq!(ChunkKey::root(CubeFace::PosX).parent(), None);
    }

    #[test]
    fn test_display_includes_face_and_address() {
        let key = ChunkKey {
            face: CubeFace::PosZ,
            depth: 2,
            x: 1,
            y: 3,
        };
        assert_eq!(key.to_string(), "+Z/d2/1x3");
    }
}
