//! Axis-aligned bounds in a face's local plane.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in face-local plane coordinates.
///
/// Invariant: `min.x <= max.x` and `min.y <= max.y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: DVec2,
    /// Maximum corner.
    pub max: DVec2,
}

impl Aabb2 {
    /// Create a rectangle from two corners, sorting components.
    #[must_use]
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a square from its center and full edge length.
    #[must_use]
    pub fn from_center_size(center: DVec2, size: f64) -> Self {
        let half = DVec2::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths.
    #[must_use]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        let s = self.size();
        s.x * s.y
    }

    /// Returns true if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Like [`Self::contains`] but excludes the max edges, so a point on a
    /// shared edge belongs to exactly one of two neighbors.
    #[must_use]
    pub fn contains_half_open(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Returns true if the interiors overlap (shared edges do not count).
    #[must_use]
    pub fn overlaps_interior(&self, other: &Aabb2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_corners() {
        let b = Aabb2::new(DVec2::new(3.0, -1.0), DVec2::new(-2.0, 4.0));
        assert_eq!(b.min, DVec2::new(-2.0, -1.0));
        assert_eq!(b.max, DVec2::new(3.0, 4.0));
        assert_eq!(b.area(), 25.0);
    }

    #[test]
    fn test_edge_neighbors_do_not_overlap() {
        let a = Aabb2::from_center_size(DVec2::new(0.5, 0.5), 1.0);
        let b = Aabb2::from_center_size(DVec2::new(1.5, 0.5), 1.0);
        assert!(!a.overlaps_interior(&b));
        assert!(a.contains(DVec2::new(1.0, 0.5)));
        assert!(b.contains(DVec2::new(1.0, 0.5)));
        assert!(!a.contains_half_open(DVec2::new(1.0, 0.5)));
        assert!(b.contains_half_open(DVec2::new(1.0, 0.5)));
    }

    #[test]
    fn test_nested_boxes_overlap() {
        let outer = Aabb2::from_center_size(DVec2::ZERO, 4.0);
        let inner = Aabb2::from_center_size(DVec2::new(1.0, 1.0), 1.0);
        assert!(outer.overlaps_interior(&inner));
        assert_eq!(inner.center(), DVec2::new(1.0, 1.0));
    }
}
