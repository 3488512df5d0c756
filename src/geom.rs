//! Geometry helpers layered on top of glam.
//!
//! glam supplies the vector, quaternion and matrix types. This module adds
//! the handful of operations the frame and path code needs that glam does
//! not ship: non-flipping slerp, quaternion log/exp and squad tangents,
//! rotations built from a rotated basis, and screen rectangles.

use glam::{Mat3, Quat, Vec3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tolerance used for "is this value zero" tests.
pub const EPSILON: f32 = 1e-6;

/// Whether `value` is close enough to zero to be treated as zero.
#[inline]
#[must_use]
pub fn is_zero(value: f32) -> bool {
    value.abs() < EPSILON
}

/// Number of spatial dimensions a frame or eye lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Planar scene: positions have `z = 0`, rotations are about Z.
    Two,
    /// Spatial scene.
    #[default]
    Three,
}

impl Dimension {
    /// Whether this is the planar dimension.
    #[must_use]
    pub fn is_2d(self) -> bool {
        self == Self::Two
    }
}

/// Orientation convention of the scene's screen axes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    /// Screen Y grows upwards in scene space (the default).
    #[default]
    Right,
    /// Screen Y grows downwards in scene space.
    Left,
}

impl Handedness {
    /// Whether the scene is left handed.
    #[must_use]
    pub fn is_left(self) -> bool {
        self == Self::Left
    }

    /// The opposite convention.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }
}

/// Axis-aligned screen rectangle in pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners, in any order.
    #[must_use]
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Rotation of `angle` radians about `axis`, or identity when the axis is
/// degenerate.
#[must_use]
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    let len = axis.length();
    if is_zero(len) {
        Quat::IDENTITY
    } else {
        Quat::from_axis_angle(axis / len, angle)
    }
}

/// Shortest rotation taking direction `from` onto direction `to`.
#[must_use]
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(a), Some(b)) => Quat::from_rotation_arc(a, b),
        _ => Quat::IDENTITY,
    }
}

/// Rotation whose image of the canonical X, Y, Z axes is the given basis.
#[must_use]
pub fn from_rotated_basis(x: Vec3, y: Vec3, z: Vec3) -> Quat {
    let basis = Mat3::from_cols(
        x.normalize_or_zero(),
        y.normalize_or_zero(),
        z.normalize_or_zero(),
    );
    Quat::from_mat3(&basis).normalize()
}

/// Composition of rotations about X (`roll`), Y (`pitch`) and Z (`yaw`),
/// applied as `qy * qz * qx`.
#[must_use]
pub fn from_euler_angles(roll: f32, pitch: f32, yaw: f32) -> Quat {
    let qx = Quat::from_axis_angle(Vec3::X, roll);
    let qy = Quat::from_axis_angle(Vec3::Y, pitch);
    let qz = Quat::from_axis_angle(Vec3::Z, yaw);
    qy * qz * qx
}

/// Signed angle of a rotation about the Z axis.
#[must_use]
pub fn planar_angle(q: Quat) -> f32 {
    2.0 * q.z.atan2(q.w)
}

/// Rotation axis and angle, with a Z axis reported for the identity.
#[must_use]
pub fn to_axis_angle(q: Quat) -> (Vec3, f32) {
    let (axis, angle) = q.normalize().to_axis_angle();
    if axis.length_squared() < EPSILON {
        (Vec3::Z, 0.0)
    } else {
        (axis, angle)
    }
}

/// Component of `v` along `axis`.
#[must_use]
pub fn project_on_axis(v: Vec3, axis: Vec3) -> Vec3 {
    let norm2 = axis.length_squared();
    if is_zero(norm2) {
        Vec3::ZERO
    } else {
        axis * (v.dot(axis) / norm2)
    }
}

/// Component of `v` orthogonal to `normal`.
#[must_use]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project_on_axis(v, normal)
}

/// Spherical interpolation that never flips to the shorter arc.
///
/// Squad relies on the unflipped path between its tangent quaternions.
#[must_use]
pub fn slerp_unflipped(a: Quat, b: Quat, t: f32) -> Quat {
    let cos_angle = a.dot(b);
    let (c1, c2) = if 1.0 - cos_angle.abs() < 0.01 {
        (1.0 - t, t)
    } else {
        let angle = cos_angle.abs().clamp(-1.0, 1.0).acos();
        let sin_angle = angle.sin();
        (
            ((1.0 - t) * angle).sin() / sin_angle,
            (t * angle).sin() / sin_angle,
        )
    };
    Quat::from_xyzw(
        c1 * a.x + c2 * b.x,
        c1 * a.y + c2 * b.y,
        c1 * a.z + c2 * b.z,
        c1 * a.w + c2 * b.w,
    )
}

/// Quaternion logarithm (pure quaternion result).
#[must_use]
pub fn quat_ln(q: Quat) -> Quat {
    let v = Vec3::new(q.x, q.y, q.z);
    let len = v.length();
    if len < EPSILON {
        Quat::from_xyzw(q.x, q.y, q.z, 0.0)
    } else {
        let coef = q.w.clamp(-1.0, 1.0).acos() / len;
        Quat::from_xyzw(q.x * coef, q.y * coef, q.z * coef, 0.0)
    }
}

/// Quaternion exponential of a pure quaternion.
#[must_use]
pub fn quat_exp(q: Quat) -> Quat {
    let v = Vec3::new(q.x, q.y, q.z);
    let theta = v.length();
    if theta < EPSILON {
        Quat::from_xyzw(q.x, q.y, q.z, theta.cos())
    } else {
        let coef = theta.sin() / theta;
        Quat::from_xyzw(q.x * coef, q.y * coef, q.z * coef, theta.cos())
    }
}

fn ln_dif(a: Quat, b: Quat) -> Quat {
    quat_ln((a.inverse() * b).normalize())
}

/// Squad tangent at `center` given its neighbours.
#[must_use]
pub fn squad_tangent(before: Quat, center: Quat, after: Quat) -> Quat {
    let l1 = ln_dif(center, before);
    let l2 = ln_dif(center, after);
    let e = Quat::from_xyzw(
        -0.25 * (l1.x + l2.x),
        -0.25 * (l1.y + l2.y),
        -0.25 * (l1.z + l2.z),
        -0.25 * (l1.w + l2.w),
    );
    center * quat_exp(e)
}

/// Spherical quadrangle interpolation between `a` and `b`.
#[must_use]
pub fn squad(a: Quat, tangent_a: Quat, tangent_b: Quat, b: Quat, t: f32) -> Quat {
    let ab = slerp_unflipped_shortest(a, b, t);
    let tangents = slerp_unflipped(tangent_a, tangent_b, t);
    slerp_unflipped(ab, tangents, 2.0 * t * (1.0 - t)).normalize()
}

fn slerp_unflipped_shortest(a: Quat, b: Quat, t: f32) -> Quat {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    slerp_unflipped(a, b, t)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn rotated_basis_recovers_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 0.7);
        let rebuilt = from_rotated_basis(q * Vec3::X, q * Vec3::Y, q * Vec3::Z);
        assert!(rebuilt.dot(q).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn euler_composition_order() {
        let q = from_euler_angles(0.0, FRAC_PI_2, 0.0);
        assert!((q * Vec3::X).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn planar_angle_round_trip() {
        let q = Quat::from_rotation_z(-1.2);
        assert!((planar_angle(q) + 1.2).abs() < 1e-5);
    }

    #[test]
    fn ln_exp_inverse() {
        let q = Quat::from_axis_angle(Vec3::Y, 0.8);
        let back = quat_exp(quat_ln(q));
        assert!(back.abs_diff_eq(q, 1e-5));
    }

    #[test]
    fn squad_hits_endpoints() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(1.0);
        let ta = squad_tangent(a, a, b);
        let tb = squad_tangent(a, b, b);
        assert!(squad(a, ta, tb, b, 0.0).dot(a).abs() > 1.0 - 1e-5);
        assert!(squad(a, ta, tb, b, 1.0).dot(b).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn degenerate_axis_is_identity() {
        assert_eq!(axis_angle(Vec3::ZERO, 1.0), Quat::IDENTITY);
        assert_eq!(rotation_between(Vec3::ZERO, Vec3::X), Quat::IDENTITY);
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners((10.0, 40.0), (2.0, 20.0));
        assert_eq!(r, Rect::new(2.0, 20.0, 8.0, 20.0));
        assert_eq!(r.center_x(), 6.0);
        assert_eq!(r.center_y(), 30.0);
    }
}
