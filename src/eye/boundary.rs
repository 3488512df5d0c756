//! Boundary half-spaces of the eye's visible region.
//!
//! A 3D eye is bounded by six planes (left, right, near, far, top, bottom),
//! a 2D eye by four (left, right, top, bottom). Normals point out of the
//! visible region, so a point is inside when its signed distance to every
//! plane is non-positive.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Result of a visibility query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Entirely inside every half-space.
    Visible,
    /// Possibly straddling a plane.
    SemiVisible,
    /// Entirely outside at least one half-space.
    Invisible,
}

/// A plane `normal · p = distance`, with a unit outward normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    /// Unit normal pointing out of the visible region.
    pub normal: Vec3,
    /// Offset along the normal.
    pub distance: f32,
}

impl Plane {
    /// Plane with outward `normal` through `point`.
    #[must_use]
    pub fn through(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Plane `a x + b y + c z = d`, normalized.
    #[must_use]
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        let len = (a * a + b * b + c * c).sqrt();
        if len > 0.0 {
            Self {
                normal: Vec3::new(a / len, b / len, c / len),
                distance: d / len,
            }
        } else {
            Self::default()
        }
    }

    /// Signed distance from `point`: positive outside, negative inside.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Coefficients `[a, b, c, d]` of `a x + b y + c z = d`.
    #[must_use]
    pub fn coefficients(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.distance]
    }
}

/// The planes bounding an eye's visible region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundary {
    /// Bounding planes, four in 2D and six in 3D.
    pub planes: Vec<Plane>,
}

impl Boundary {
    /// Boundary made of `planes`.
    #[must_use]
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }

    /// Extract the six planes of a projection · view matrix with a
    /// `[-1, 1]` depth range (Gribb/Hartmann).
    #[must_use]
    pub fn from_view_projection(vp: Mat4) -> Self {
        let row = |i: usize| vp.row(i);
        let (row0, row1, row2, row3) = (row(0), row(1), row(2), row(3));

        // Inside is `plane · (p, 1) >= 0`; flip into `n · p <= d` form.
        let outward = |v: Vec4| Plane::from_coefficients(-v.x, -v.y, -v.z, v.w);
        Self {
            planes: vec![
                outward(row3 + row0),
                outward(row3 - row0),
                outward(row3 + row2),
                outward(row3 - row2),
                outward(row3 - row1),
                outward(row3 + row1),
            ],
        }
    }

    /// Signed distance from `point` to plane `index`, if it exists.
    #[must_use]
    pub fn distance_to_boundary(&self, index: usize, point: Vec3) -> Option<f32> {
        self.planes.get(index).map(|p| p.distance_to_point(point))
    }

    /// Whether `point` lies inside every half-space.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) <= 0.0)
    }

    /// Classify a ball.
    #[must_use]
    pub fn ball_visibility(&self, center: Vec3, radius: f32) -> Visibility {
        let mut all_in = true;
        for plane in &self.planes {
            let d = plane.distance_to_point(center);
            if d > radius {
                return Visibility::Invisible;
            }
            if d > 0.0 || -d < radius {
                all_in = false;
            }
        }
        if all_in {
            Visibility::Visible
        } else {
            Visibility::SemiVisible
        }
    }

    /// Classify an axis-aligned box given by two opposite corners. Planar
    /// boundaries only test the four corners of the `z` face of `p1`.
    #[must_use]
    pub fn box_visibility(&self, p1: Vec3, p2: Vec3) -> Visibility {
        let planar = self.planes.len() == 4;
        let corners = if planar { 4 } else { 8 };
        let corner = |c: usize| {
            Vec3::new(
                if c & 4 == 0 { p2.x } else { p1.x },
                if c & 2 == 0 { p2.y } else { p1.y },
                if planar || c & 1 != 0 { p1.z } else { p2.z },
            )
        };
        let mut all_in = true;
        for plane in &self.planes {
            let mut all_out = true;
            for c in 0..corners {
                let c = if planar { c << 1 } else { c };
                if plane.distance_to_point(corner(c)) > 0.0 {
                    all_in = false;
                } else {
                    all_out = false;
                }
            }
            if all_out {
                return Visibility::Invisible;
            }
        }
        if all_in {
            Visibility::Visible
        } else {
            Visibility::SemiVisible
        }
    }

    /// Plane coefficients, one `[a, b, c, d]` row per plane.
    #[must_use]
    pub fn equations(&self) -> Vec<[f32; 4]> {
        self.planes.iter().map(Plane::coefficients).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Boundary {
        Boundary::new(vec![
            Plane::through(Vec3::NEG_X, Vec3::new(-1.0, 0.0, 0.0)),
            Plane::through(Vec3::X, Vec3::new(1.0, 0.0, 0.0)),
            Plane::through(Vec3::NEG_Y, Vec3::new(0.0, -1.0, 0.0)),
            Plane::through(Vec3::Y, Vec3::new(0.0, 1.0, 0.0)),
            Plane::through(Vec3::NEG_Z, Vec3::new(0.0, 0.0, -1.0)),
            Plane::through(Vec3::Z, Vec3::new(0.0, 0.0, 1.0)),
        ])
    }

    #[test]
    fn point_outside_one_plane_is_not_visible() {
        let b = cube();
        assert!(b.contains_point(Vec3::ZERO));
        assert!(!b.contains_point(Vec3::new(1.5, 0.0, 0.0)));
        assert_eq!(b.distance_to_boundary(1, Vec3::new(1.5, 0.0, 0.0)), Some(0.5));
        assert_eq!(b.distance_to_boundary(9, Vec3::ZERO), None);
    }

    #[test]
    fn ball_classification() {
        let b = cube();
        assert_eq!(b.ball_visibility(Vec3::ZERO, 0.5), Visibility::Visible);
        assert_eq!(b.ball_visibility(Vec3::new(1.0, 0.0, 0.0), 0.5), Visibility::SemiVisible);
        assert_eq!(b.ball_visibility(Vec3::new(3.0, 0.0, 0.0), 0.5), Visibility::Invisible);
    }

    #[test]
    fn box_classification() {
        let b = cube();
        let inner = b.box_visibility(Vec3::splat(-0.5), Vec3::splat(0.5));
        assert_eq!(inner, Visibility::Visible);
        let straddling = b.box_visibility(Vec3::splat(0.5), Vec3::splat(1.5));
        assert_eq!(straddling, Visibility::SemiVisible);
        let outside = b.box_visibility(Vec3::splat(2.0), Vec3::splat(3.0));
        assert_eq!(outside, Visibility::Invisible);
    }

    #[test]
    fn planes_from_matrix_match_frustum() {
        let proj = Mat4::perspective_rh_gl(45.0_f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let b = Boundary::from_view_projection(proj * view);

        assert!(b.contains_point(Vec3::ZERO));
        assert!(!b.contains_point(Vec3::new(0.0, 0.0, 20.0)));
        assert!(!b.contains_point(Vec3::new(0.0, 0.0, -200.0)));
        assert_eq!(b.ball_visibility(Vec3::ZERO, 1.0), Visibility::Visible);
        assert_eq!(b.ball_visibility(Vec3::new(100.0, 0.0, 0.0), 1.0), Visibility::Invisible);
    }
}
