//! Shape projection: mapping pre-projection cube points onto the body.
//!
//! Two shapes are supported:
//! - **Sphere**: the cube point is normalized and scaled by the radius.
//! - **Ring**: the cube point's direction is split into an equatorial
//!   direction and a latitude. The equatorial direction places the point on a
//!   circle of the major radius and the latitude becomes a vertical offset
//!   along the ring axis (+Y), producing a band. Terrain on the ring faces
//!   inward, toward the axis.
//!
//! All positions are in shape-local space (shape center at the origin). The
//! terrain builder, ocean and scenery all go through [`ShapeProjector`], so
//! they agree on where every surface point lies.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Smallest latitude fade width accepted by [`RingParams::sanitized`].
pub const MIN_LATITUDE_FADE: f64 = 1e-6;

/// Smallest drop exponent accepted by [`RingParams::sanitized`].
pub const MIN_DROP_EXPONENT: f64 = 1e-3;

/// A cube point projected onto the undisplaced surface of a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Surface position in shape-local space.
    pub position: DVec3,
    /// Unit vector along which height displaces the surface.
    pub up: DVec3,
    /// Latitude in radians (angle of the cube direction above the XZ plane).
    pub latitude: f64,
    /// Height attenuation in `[0, 1]`. Always 1 on a sphere.
    pub height_mask: f64,
}

impl Projected {
    /// Surface position displaced by `height`, attenuated by the height mask.
    #[inline]
    #[must_use]
    pub fn displaced(&self, height: f64) -> DVec3 {
        self.position + self.up * (height * self.height_mask)
    }
}

/// Maps pre-projection cube points onto a body's surface.
pub trait ShapeProjector {
    /// Project a cube-space point onto the undisplaced surface.
    fn project(&self, cube_point: DVec3) -> Projected;

    /// Half-width of the cube the faces are laid out on.
    fn radius(&self) -> f64;

    /// Whether a triangle with these projected corners must be dropped.
    fn culls_triangle(&self, _corners: &[Projected; 3]) -> bool {
        false
    }

    /// Whether terrain faces toward the shape's interior, which flips
    /// triangle winding relative to the cube face.
    fn faces_inward(&self) -> bool {
        false
    }
}

/// Sphere projection around the shape origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereProjector {
    radius: f64,
}

impl SphereProjector {
    /// Create a sphere projector of the given radius.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl ShapeProjector for SphereProjector {
    fn project(&self, cube_point: DVec3) -> Projected {
        let dir = cube_point.normalize_or(DVec3::Y);
        Projected {
            position: dir * self.radius,
            up: dir,
            latitude: dir.y.clamp(-1.0, 1.0).asin(),
            height_mask: 1.0,
        }
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Latitude fade and culling parameters for a ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingParams {
    /// Latitude (radians) below which terrain keeps full height.
    pub lat_cutoff: f64,
    /// Width (radians) of the band over which height fades to zero.
    pub lat_fade: f64,
    /// Exponent applied to the normalized fade position.
    pub drop_exponent: f64,
    /// Triangles with a vertex beyond this latitude (radians) are dropped.
    pub cull_latitude: f64,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            lat_cutoff: 0.02,
            lat_fade: 0.05,
            drop_exponent: 1.5,
            cull_latitude: 0.1,
        }
    }
}

impl RingParams {
    /// Clamp every field into its safe range.
    ///
    /// Bad values (e.g. a negative fade from a UI slider) are corrected and
    /// logged rather than rejected.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = Self {
            lat_cutoff: finite_or(self.lat_cutoff, 0.0).clamp(0.0, FRAC_PI_2),
            lat_fade: finite_or(self.lat_fade, MIN_LATITUDE_FADE).max(MIN_LATITUDE_FADE),
            drop_exponent: finite_or(self.drop_exponent, 1.0).max(MIN_DROP_EXPONENT),
            cull_latitude: finite_or(self.cull_latitude, FRAC_PI_2).clamp(0.0, FRAC_PI_2),
        };
        if clean != self {
            tracing::warn!(original = ?self, ?clean, "ring parameters clamped");
        }
        clean
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Height attenuation for a ring vertex at `latitude`.
///
/// `1 - clamp01((|lat| - lat_cutoff) / lat_fade) ^ drop_exponent`
#[inline]
#[must_use]
pub fn ring_height_mask(latitude: f64, params: &RingParams) -> f64 {
    let t = ((latitude.abs() - params.lat_cutoff) / params.lat_fade).clamp(0.0, 1.0);
    1.0 - t.powf(params.drop_exponent)
}

/// Ring projection: an inward-facing band of the given major radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingProjector {
    radius: f64,
    params: RingParams,
}

impl RingProjector {
    /// Create a ring projector; the parameters are sanitized.
    #[must_use]
    pub fn new(radius: f64, params: RingParams) -> Self {
        Self {
            radius,
            params: params.sanitized(),
        }
    }

    /// The sanitized ring parameters.
    #[must_use]
    pub fn params(&self) -> &RingParams {
        &self.params
    }
}

impl ShapeProjector for RingProjector {
    fn project(&self, cube_point: DVec3) -> Projected {
        let dir = cube_point.normalize_or(DVec3::X);
        let latitude = dir.y.clamp(-1.0, 1.0).asin();
        // At the poles the equatorial direction is undefined; those points are
        // far past any cull latitude.
        let equatorial = DVec3::new(dir.x, 0.0, dir.z).normalize_or(DVec3::X);
        Projected {
            position: equatorial * self.radius + DVec3::Y * (latitude * self.radius),
            up: -equatorial,
            latitude,
            height_mask: ring_height_mask(latitude, &self.params),
        }
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn culls_triangle(&self, corners: &[Projected; 3]) -> bool {
        corners.iter().any(|c| {
            c.latitude.abs() > self.params.cull_latitude || c.height_mask <= 0.0
        })
    }

    fn faces_inward(&self) -> bool {
        true
    }
}

/// Serializable shape selection carried by build requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ShapeParams {
    /// Pure sphere projection.
    #[default]
    Planet,
    /// Ring band with latitude fade and culling.
    Ring(RingParams),
}

impl ShapeParams {
    /// Build the projector for this shape with the given radius.
    #[must_use]
    pub fn projector(&self, radius: f64) -> Projector {
        match self {
            ShapeParams::Planet => Projector::Sphere(SphereProjector::new(radius)),
            ShapeParams::Ring(params) => Projector::Ring(RingProjector::new(radius, *params)),
        }
    }

    /// Whether this is a ring shape.
    #[must_use]
    pub fn is_ring(&self) -> bool {
        matches!(self, ShapeParams::Ring(_))
    }
}

/// Either projector, dispatched statically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projector {
    /// Sphere projection.
    Sphere(SphereProjector),
    /// Ring projection.
    Ring(RingProjector),
}

impl ShapeProjector for Projector {
    #[inline]
    fn project(&self, cube_point: DVec3) -> Projected {
        match self {
            Projector::Sphere(p) => p.project(cube_point),
            Projector::Ring(p) => p.project(cube_point),
        }
    }

    fn radius(&self) -> f64 {
        match self {
            Projector::Sphere(p) => p.radius(),
            Projector::Ring(p) => p.radius(),
        }
    }

    fn culls_triangle(&self, corners: &[Projected; 3]) -> bool {
        match self {
            Projector::Sphere(p) => p.culls_triangle(corners),
            Projector::Ring(p) => p.culls_triangle(corners),
        }
    }

    fn faces_inward(&self) -> bool {
        match self {
            Projector::Sphere(p) => p.faces_inward(),
            Projector::Ring(p) => p.faces_inward(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CubeFace;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_sphere_face_center_maps_to_normal() {
        let projector = SphereProjector::new(1000.0);
        for face in CubeFace::ALL {
            let p = projector.project(face.transform().apply(DVec3::new(0.0, 0.0, 1000.0)));
            assert!((p.position - face.normal() * 1000.0).length() < EPSILON);
            assert!((p.up - face.normal()).length() < EPSILON);
            assert_eq!(p.height_mask, 1.0);
        }
    }

    #[test]
    fn test_sphere_round_trip_radius_plus_height() {
        let radius = 6_000_000.0;
        let projector = SphereProjector::new(radius);
        for face in CubeFace::ALL {
            for (x, y) in [(0.3, -0.7), (-1.0, 1.0), (0.9, 0.1)] {
                let cube = face.transform().apply(DVec3::new(x * radius, y * radius, radius));
                let height = 1234.5;
                let displaced = projector.project(cube).displaced(height);
                let relative = (displaced.length() - (radius + height)).abs() / (radius + height);
                assert!(relative < 1e-12, "relative error {relative} on {face:?}");
            }
        }
    }

    #[test]
    fn test_ring_mask_scenario_values() {
        let params = RingParams {
            lat_cutoff: 0.02,
            lat_fade: 0.05,
            drop_exponent: 1.5,
            cull_latitude: 0.1,
        };
        assert_eq!(ring_height_mask(0.1, &params), 0.0);
        assert_eq!(ring_height_mask(0.02, &params), 1.0);
        assert_eq!(ring_height_mask(-0.02, &params), 1.0);
        let mid = ring_height_mask(0.045, &params);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_ring_equator_lies_on_major_radius() {
        let projector = RingProjector::new(50_000.0, RingParams::default());
        let p = projector.project(DVec3::new(1.0, 0.0, 0.0));
        assert!((p.position - DVec3::new(50_000.0, 0.0, 0.0)).length() < EPSILON);
        assert!((p.up - DVec3::NEG_X).length() < EPSILON);
        assert_eq!(p.latitude, 0.0);
    }

    #[test]
    fn test_ring_latitude_becomes_vertical_offset() {
        let radius = 10_000.0;
        let projector = RingProjector::new(radius, RingParams::default());
        let lat: f64 = 0.05;
        let p = projector.project(DVec3::new(lat.cos(), lat.sin(), 0.0));
        assert!((p.latitude - lat).abs() < EPSILON);
        assert!((p.position.y - lat * radius).abs() < 1e-6);
        let horizontal = DVec3::new(p.position.x, 0.0, p.position.z).length();
        assert!((horizontal - radius).abs() < 1e-6);
    }

    #[test]
    fn test_ring_culls_high_latitude_triangles() {
        let projector = RingProjector::new(1000.0, RingParams::default());
        let low = projector.project(DVec3::new(1.0, 0.0, 0.0));
        let high = projector.project(DVec3::new(1.0, 0.5, 0.0));
        assert!(!projector.culls_triangle(&[low, low, low]));
        assert!(projector.culls_triangle(&[low, low, high]));
    }

    #[test]
    fn test_negative_fade_is_clamped() {
        let params = RingParams {
            lat_fade: -0.5,
            drop_exponent: 0.0,
            ..RingParams::default()
        }
        .sanitized();
        assert_eq!(params.lat_fade, MIN_LATITUDE_FADE);
        assert_eq!(params.drop_exponent, MIN_DROP_EXPONENT);
        assert!(ring_height_mask(0.5, &params).is_finite());
    }

    #[test]
    fn test_shape_params_selects_projector() {
        assert!(matches!(
            ShapeParams::Planet.projector(1.0),
            Projector::Sphere(_)
        ));
        let ring = ShapeParams::Ring(RingParams::default());
        assert!(ring.is_ring());
        let projector = ring.projector(2.0);
        assert!(projector.faces_inward());
        assert_eq!(projector.radius(), 2.0);
    }
}
