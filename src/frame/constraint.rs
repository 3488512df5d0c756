//! Axis/plane constraints filtering frame motion.

use glam::{Quat, Vec3};

use super::{Frame, FrameRef};
use crate::geom;

/// How a translation or rotation is restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintType {
    /// No restriction.
    #[default]
    Free,
    /// Only along (translation) or about (rotation) the direction.
    Axis,
    /// Only within the plane orthogonal to the direction. Rotations are
    /// left free.
    Plane,
    /// No motion at all.
    Forbidden,
}

/// Coordinate system the constraint directions are expressed in.
#[derive(Debug, Clone, Default)]
pub enum ConstraintSpace {
    /// The constrained frame's own coordinate system.
    #[default]
    Local,
    /// World coordinates.
    World,
    /// The coordinate system of an eye frame.
    Eye(FrameRef),
}

/// Restricts a frame's translations and rotations to an axis or a plane.
#[derive(Debug, Clone, Default)]
pub struct AxisPlaneConstraint {
    /// Translation restriction.
    pub translation_type: ConstraintType,
    /// Axis or plane normal for translations.
    pub translation_direction: Vec3,
    /// Rotation restriction.
    pub rotation_type: ConstraintType,
    /// Rotation axis.
    pub rotation_direction: Vec3,
    /// Space the directions are expressed in.
    pub space: ConstraintSpace,
}

impl AxisPlaneConstraint {
    /// Unrestricted constraint in `space`.
    #[must_use]
    pub fn new(space: ConstraintSpace) -> Self {
        Self {
            space,
            ..Self::default()
        }
    }

    /// Set the translation restriction.
    #[must_use]
    pub fn with_translation(mut self, kind: ConstraintType, direction: Vec3) -> Self {
        self.translation_type = kind;
        self.translation_direction = direction;
        self
    }

    /// Set the rotation restriction.
    #[must_use]
    pub fn with_rotation(mut self, kind: ConstraintType, direction: Vec3) -> Self {
        self.rotation_type = kind;
        self.rotation_direction = direction;
        self
    }

    /// Filter a translation expressed in `frame`'s reference coordinates.
    #[must_use]
    pub fn constrain_translation(&self, t: Vec3, frame: &Frame) -> Vec3 {
        match self.translation_type {
            ConstraintType::Free => t,
            ConstraintType::Forbidden => Vec3::ZERO,
            ConstraintType::Axis => match self.translation_axis(frame) {
                Some(axis) => geom::project_on_axis(t, axis),
                None => t,
            },
            ConstraintType::Plane => match self.translation_axis(frame) {
                Some(normal) => geom::project_on_plane(t, normal),
                None => t,
            },
        }
    }

    /// Filter a rotation expressed in `frame`'s local coordinates.
    #[must_use]
    pub fn constrain_rotation(&self, q: Quat, frame: &Frame) -> Quat {
        match self.rotation_type {
            ConstraintType::Free | ConstraintType::Plane => q,
            ConstraintType::Forbidden => Quat::IDENTITY,
            ConstraintType::Axis => {
                let Some(axis) = self.rotation_axis(frame) else {
                    return q;
                };
                let vector = geom::project_on_axis(Vec3::new(q.x, q.y, q.z), axis);
                geom::axis_angle(vector, 2.0 * q.w.clamp(-1.0, 1.0).acos())
            }
        }
    }

    /// Translation direction in the frame's reference coordinates.
    fn translation_axis(&self, frame: &Frame) -> Option<Vec3> {
        let dir = self.translation_direction;
        match &self.space {
            ConstraintSpace::Local => Some(frame.rotation() * dir),
            ConstraintSpace::World => Some(frame.parent_transform_of(dir)),
            ConstraintSpace::Eye(eye) => eye_to_world(eye, dir)
                .map(|world| frame.parent_transform_of(world)),
        }
    }

    /// Rotation axis in the frame's local coordinates.
    fn rotation_axis(&self, frame: &Frame) -> Option<Vec3> {
        let dir = self.rotation_direction;
        match &self.space {
            ConstraintSpace::Local => Some(dir),
            ConstraintSpace::World => Some(frame.transform_of(dir)),
            ConstraintSpace::Eye(eye) => {
                eye_to_world(eye, dir).map(|world| frame.transform_of(world))
            }
        }
    }
}

fn eye_to_world(eye: &FrameRef, dir: Vec3) -> Option<Vec3> {
    let frame = eye.try_borrow();
    if frame.is_none() {
        log::warn!("eye constraint ignored: the eye frame is being modified");
    }
    frame.map(|f| f.inverse_transform_of(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Dimension;

    #[test]
    fn axis_translation_projects_onto_axis() {
        let mut frame = Frame::new();
        frame.set_constraint(Some(
            AxisPlaneConstraint::new(ConstraintSpace::World)
                .with_translation(ConstraintType::Axis, Vec3::X),
        ));
        frame.translate(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(frame.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn plane_translation_drops_normal_component() {
        let mut frame = Frame::new();
        frame.set_constraint(Some(
            AxisPlaneConstraint::new(ConstraintSpace::Local)
                .with_translation(ConstraintType::Plane, Vec3::Z),
        ));
        frame.translate(Vec3::new(1.0, 1.0, 5.0));
        assert_eq!(frame.position(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn forbidden_rotation_is_identity() {
        let mut frame = Frame::new();
        frame.set_constraint(Some(
            AxisPlaneConstraint::new(ConstraintSpace::Local)
                .with_rotation(ConstraintType::Forbidden, Vec3::ZERO),
        ));
        frame.rotate(Quat::from_rotation_x(1.0));
        assert_eq!(frame.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn axis_rotation_keeps_only_axis_component() {
        let mut frame = Frame::new();
        frame.set_constraint(Some(
            AxisPlaneConstraint::new(ConstraintSpace::Local)
                .with_rotation(ConstraintType::Axis, Vec3::Y),
        ));
        frame.rotate(Quat::from_rotation_y(0.5) * Quat::from_rotation_x(0.3));
        let (axis, _) = geom::to_axis_angle(frame.rotation());
        assert!(axis.abs().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn eye_space_translation_follows_eye_axes() {
        let eye = FrameRef::new(Frame::from_pose(
            Dimension::Three,
            Vec3::ZERO,
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        ));
        let mut frame = Frame::new();
        frame.set_constraint(Some(
            AxisPlaneConstraint::new(ConstraintSpace::Eye(eye))
                .with_translation(ConstraintType::Axis, Vec3::X),
        ));
        frame.translate(Vec3::new(3.0, 2.0, 0.0));
        assert!(frame.position().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }
}
