//! Positioned, oriented, scaled coordinate systems.
//!
//! A [`Frame`] stores a local transform (translation, rotation, per-axis
//! scaling) relative to an optional reference frame. World quantities
//! (position, orientation, magnitude) and coordinate conversions compose
//! through the reference-frame chain.
//!
//! Frames that other frames hang off are shared through [`FrameRef`]. The
//! child holds the reference, the parent never knows its children.
//!
//! # Invariants
//!
//! - Every scaling component is strictly positive.
//! - The reference-frame chain is acyclic. [`Frame::set_reference_frame`]
//!   walks the candidate's ancestors and refuses the attach when the frame
//!   would become its own ancestor.
//! - A frame with a reference frame scales uniformly, and so does its
//!   reference frame's world magnitude. Root planar frames may scale x and
//!   y independently.

pub mod constraint;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use constraint::{AxisPlaneConstraint, ConstraintSpace, ConstraintType};
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::error::VantageError;
use crate::geom::{self, Dimension};

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique frame identity. Clones receive a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        Self(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Shared handle to a frame that can serve as a reference frame.
#[derive(Clone)]
pub struct FrameRef(Rc<RefCell<Frame>>);

impl FrameRef {
    /// Wrap a frame in a shared handle.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self(Rc::new(RefCell::new(frame)))
    }

    /// Borrow the frame.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Frame> {
        self.0.borrow()
    }

    /// Mutably borrow the frame.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Frame> {
        self.0.borrow_mut()
    }

    /// Borrow the frame unless it is mutably borrowed elsewhere.
    #[must_use]
    pub fn try_borrow(&self) -> Option<Ref<'_, Frame>> {
        self.0.try_borrow().ok()
    }

    /// Whether both handles point at the same frame.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(frame) => write!(f, "FrameRef({:?})", frame.id),
            Err(_) => write!(f, "FrameRef(<borrowed>)"),
        }
    }
}

/// Iterator over a frame's reference-frame chain, nearest first.
pub struct Ancestors {
    next: Option<FrameRef>,
}

impl Iterator for Ancestors {
    type Item = FrameRef;

    fn next(&mut self) -> Option<FrameRef> {
        let current = self.next.take()?;
        self.next = current.borrow().reference.clone();
        Some(current)
    }
}

/// A coordinate system in a 2D or 3D scene.
pub struct Frame {
    id: FrameId,
    dimension: Dimension,
    translation: Vec3,
    rotation: Quat,
    scaling: Vec3,
    reference: Option<FrameRef>,
    constraint: Option<AxisPlaneConstraint>,
    revision: u64,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("translation", &self.translation)
            .field("rotation", &self.rotation)
            .field("scaling", &self.scaling)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl Clone for Frame {
    fn clone(&self) -> Self {
        Self {
            id: FrameId::next(),
            dimension: self.dimension,
            translation: self.translation,
            rotation: self.rotation,
            scaling: self.scaling,
            reference: self.reference.clone(),
            constraint: self.constraint.clone(),
            revision: 0,
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Identity frame in a 3D scene.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(Dimension::Three)
    }

    /// Identity frame in a planar scene.
    #[must_use]
    pub fn new_2d() -> Self {
        Self::with_dimension(Dimension::Two)
    }

    /// Identity frame living in `dimension`.
    #[must_use]
    pub fn with_dimension(dimension: Dimension) -> Self {
        Self {
            id: FrameId::next(),
            dimension,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scaling: Vec3::ONE,
            reference: None,
            constraint: None,
            revision: 0,
        }
    }

    /// Root frame at `position` with `orientation`.
    #[must_use]
    pub fn from_pose(
        dimension: Dimension,
        position: Vec3,
        orientation: Quat,
    ) -> Self {
        let mut frame = Self::with_dimension(dimension);
        frame.translation = position;
        frame.rotation = orientation.normalize();
        frame
    }

    /// Root frame carrying this frame's world pose (position, orientation
    /// and magnitude), detached from any reference frame.
    #[must_use]
    pub fn world_snapshot(&self) -> Self {
        let mut frame = Self::with_dimension(self.dimension);
        frame.translation = self.position();
        frame.rotation = self.orientation();
        frame.scaling = self.magnitude();
        frame
    }

    // ── Identity and bookkeeping ────────────────────────────────────────

    /// Frame identity.
    #[must_use]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Dimension the frame lives in.
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of local modifications so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Digest of the revisions along the reference chain. Changes whenever
    /// this frame or any ancestor is modified or re-parented.
    #[must_use]
    pub fn pose_stamp(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.id.hash(&mut hasher);
        self.revision.hash(&mut hasher);
        for ancestor in self.ancestors() {
            let frame = ancestor.borrow();
            frame.id.hash(&mut hasher);
            frame.revision.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn modified(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ── Reference frame ─────────────────────────────────────────────────

    /// The frame this one is expressed in, if any.
    #[must_use]
    pub fn reference_frame(&self) -> Option<&FrameRef> {
        self.reference.as_ref()
    }

    /// Walk the reference-frame chain, nearest ancestor first.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.reference.clone(),
        }
    }

    /// Whether `frame` appears in this frame's reference chain.
    #[must_use]
    pub fn is_descendant_of(&self, frame: &FrameRef) -> bool {
        self.ancestors().any(|a| a.ptr_eq(frame))
    }

    /// Attach to (or detach from) a reference frame.
    ///
    /// The local transform is kept, so the world pose changes with the new
    /// reference. An ancestor that is currently mutably borrowed can only be
    /// this frame itself (single-threaded access), so it counts as a cycle.
    pub fn set_reference_frame(
        &mut self,
        reference: Option<FrameRef>,
    ) -> Result<(), VantageError> {
        if let Some(parent) = &reference {
            let mut cursor = Some(parent.clone());
            while let Some(node) = cursor {
                let frame =
                    node.try_borrow().ok_or(VantageError::CyclicReference)?;
                if frame.id == self.id {
                    return Err(VantageError::CyclicReference);
                }
                cursor = frame.reference.clone();
            }
            if !is_uniform(self.scaling, self.dimension) {
                return Err(VantageError::NonUniformScaling {
                    scaling: self.scaling.to_array(),
                });
            }
            let parent_magnitude = parent.borrow().magnitude();
            if !is_uniform(parent_magnitude, self.dimension) {
                return Err(VantageError::NonUniformScaling {
                    scaling: parent_magnitude.to_array(),
                });
            }
        }
        self.reference = reference;
        self.modified();
        Ok(())
    }

    /// Constraint filtering translations and rotations, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<&AxisPlaneConstraint> {
        self.constraint.as_ref()
    }

    /// Install or remove a constraint.
    pub fn set_constraint(&mut self, constraint: Option<AxisPlaneConstraint>) {
        self.constraint = constraint;
    }

    // ── Local transform ─────────────────────────────────────────────────

    /// Translation relative to the reference frame.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation relative to the reference frame.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Scaling relative to the reference frame.
    #[must_use]
    pub fn scaling(&self) -> Vec3 {
        self.scaling
    }

    /// Set the local translation, bypassing the constraint.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.modified();
    }

    /// Set the local rotation, bypassing the constraint.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.modified();
    }

    /// Set the local scaling.
    ///
    /// Planar frames keep a unit Z scaling. Non-positive components, and
    /// non-uniform scaling on a frame with a reference frame, are rejected
    /// and leave the frame untouched.
    pub fn set_scaling(&mut self, scaling: Vec3) -> Result<(), VantageError> {
        let scaling = if self.dimension.is_2d() {
            Vec3::new(scaling.x, scaling.y, 1.0)
        } else {
            scaling
        };
        check_scaling(scaling, self.dimension, self.reference.is_some())?;
        self.scaling = scaling;
        self.modified();
        Ok(())
    }

    /// Set the same scaling on every axis.
    pub fn set_uniform_scaling(&mut self, s: f32) -> Result<(), VantageError> {
        self.set_scaling(Vec3::splat(s))
    }

    /// Set the local translation through the constraint.
    pub fn set_translation_with_constraint(&mut self, translation: Vec3) {
        let delta = translation - self.translation;
        let delta = self.constrain_translation(delta);
        self.translation += delta;
        self.modified();
    }

    /// Set the local rotation through the constraint.
    pub fn set_rotation_with_constraint(&mut self, rotation: Quat) {
        let delta = self.rotation.inverse() * rotation.normalize();
        let delta = self.constrain_rotation(delta);
        self.rotation = (self.rotation * delta).normalize();
        self.modified();
    }

    // ── World transform ─────────────────────────────────────────────────

    /// World position of the origin.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.inverse_coordinates_of(Vec3::ZERO)
    }

    /// World orientation.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        match &self.reference {
            Some(parent) => {
                (parent.borrow().orientation() * self.rotation).normalize()
            }
            None => self.rotation,
        }
    }

    /// World scaling (componentwise product along the chain).
    #[must_use]
    pub fn magnitude(&self) -> Vec3 {
        match &self.reference {
            Some(parent) => parent.borrow().magnitude() * self.scaling,
            None => self.scaling,
        }
    }

    /// Move the origin to a world position, bypassing the constraint.
    pub fn set_position(&mut self, position: Vec3) {
        let local = self.parent_coordinates_of(position);
        self.set_translation(local);
    }

    /// Move the origin to a world position through the constraint.
    pub fn set_position_with_constraint(&mut self, position: Vec3) {
        let local = self.parent_coordinates_of(position);
        self.set_translation_with_constraint(local);
    }

    /// Set the world orientation, bypassing the constraint.
    pub fn set_orientation(&mut self, orientation: Quat) {
        let local = self.parent_rotation_of(orientation);
        self.set_rotation(local);
    }

    /// Set the world orientation through the constraint.
    pub fn set_orientation_with_constraint(&mut self, orientation: Quat) {
        let local = self.parent_rotation_of(orientation);
        self.set_rotation_with_constraint(local);
    }

    /// Set the world scaling.
    pub fn set_magnitude(&mut self, magnitude: Vec3) -> Result<(), VantageError> {
        let local = match &self.reference {
            Some(parent) => magnitude / parent.borrow().magnitude(),
            None => magnitude,
        };
        self.set_scaling(local)
    }

    /// Set the world position and orientation in one step.
    pub fn set_position_and_orientation(
        &mut self,
        position: Vec3,
        orientation: Quat,
    ) {
        self.set_position(position);
        self.set_orientation(orientation);
    }

    fn parent_coordinates_of(&self, world: Vec3) -> Vec3 {
        match &self.reference {
            Some(parent) => parent.borrow().coordinates_of(world),
            None => world,
        }
    }

    fn parent_rotation_of(&self, orientation: Quat) -> Quat {
        match &self.reference {
            Some(parent) => parent.borrow().orientation().inverse() * orientation,
            None => orientation,
        }
    }

    /// Express a world vector in the reference frame's coordinates.
    #[must_use]
    pub fn parent_transform_of(&self, world: Vec3) -> Vec3 {
        match &self.reference {
            Some(parent) => parent.borrow().transform_of(world),
            None => world,
        }
    }

    // ── Motion ──────────────────────────────────────────────────────────

    /// Translate by `t`, expressed in the reference frame.
    pub fn translate(&mut self, t: Vec3) {
        let t = self.constrain_translation(t);
        self.translation += t;
        self.modified();
    }

    /// Translate by a world-space vector.
    pub fn translate_world(&mut self, t: Vec3) {
        let local = self.parent_transform_of(t);
        self.translate(local);
    }

    /// Rotate by `q`, expressed in the local coordinate system.
    pub fn rotate(&mut self, q: Quat) {
        let q = self.constrain_rotation(q.normalize());
        self.rotation = (self.rotation * q).normalize();
        self.modified();
    }

    /// Rotate by the local rotation `q` around a world point.
    pub fn rotate_around_point(&mut self, q: Quat, point: Vec3) {
        let q = self.constrain_rotation(q.normalize());
        let orientation = self.orientation();
        let world = orientation * q * orientation.inverse();
        let position = point + world * (self.position() - point);
        self.rotation = (self.rotation * q).normalize();
        let local = self.parent_coordinates_of(position);
        self.translation = local;
        self.modified();
    }

    /// Multiply the local scaling by `s` on every axis.
    pub fn scale(&mut self, s: f32) -> Result<(), VantageError> {
        self.set_scaling(self.scaling * s)
    }

    fn constrain_translation(&self, t: Vec3) -> Vec3 {
        match &self.constraint {
            Some(c) => c.constrain_translation(t, self),
            None => t,
        }
    }

    fn constrain_rotation(&self, q: Quat) -> Quat {
        match &self.constraint {
            Some(c) => c.constrain_rotation(q, self),
            None => q,
        }
    }

    // ── Coordinate conversions ──────────────────────────────────────────

    /// Local coordinates of a point given in the reference frame.
    #[must_use]
    pub fn local_coordinates_of(&self, src: Vec3) -> Vec3 {
        (self.rotation.inverse() * (src - self.translation)) / self.scaling
    }

    /// Reference-frame coordinates of a local point.
    #[must_use]
    pub fn local_inverse_coordinates_of(&self, src: Vec3) -> Vec3 {
        self.rotation * (self.scaling * src) + self.translation
    }

    /// Local coordinates of a world point.
    #[must_use]
    pub fn coordinates_of(&self, world: Vec3) -> Vec3 {
        self.local_coordinates_of(self.parent_coordinates_of(world))
    }

    /// World coordinates of a local point.
    #[must_use]
    pub fn inverse_coordinates_of(&self, src: Vec3) -> Vec3 {
        let mut p = self.local_inverse_coordinates_of(src);
        for ancestor in self.ancestors() {
            p = ancestor.borrow().local_inverse_coordinates_of(p);
        }
        p
    }

    /// Local components of a vector given in the reference frame.
    #[must_use]
    pub fn local_transform_of(&self, src: Vec3) -> Vec3 {
        (self.rotation.inverse() * src) / self.scaling
    }

    /// Reference-frame components of a local vector.
    #[must_use]
    pub fn local_inverse_transform_of(&self, src: Vec3) -> Vec3 {
        self.rotation * (self.scaling * src)
    }

    /// Local components of a world vector.
    #[must_use]
    pub fn transform_of(&self, world: Vec3) -> Vec3 {
        self.local_transform_of(self.parent_transform_of(world))
    }

    /// World components of a local vector.
    #[must_use]
    pub fn inverse_transform_of(&self, src: Vec3) -> Vec3 {
        let mut v = self.local_inverse_transform_of(src);
        for ancestor in self.ancestors() {
            v = ancestor.borrow().local_inverse_transform_of(v);
        }
        v
    }

    /// World direction of the local X axis.
    #[must_use]
    pub fn x_axis(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    /// World direction of the local Y axis.
    #[must_use]
    pub fn y_axis(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    /// World direction of the local Z axis.
    #[must_use]
    pub fn z_axis(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    /// Local transform as a matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scaling,
            self.rotation,
            self.translation,
        )
    }

    /// Local-to-world transform as a matrix.
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        match &self.reference {
            Some(parent) => parent.borrow().world_matrix() * self.matrix(),
            None => self.matrix(),
        }
    }

    // ── Alignment ───────────────────────────────────────────────────────

    /// Move the origin onto its orthogonal projection on a world line.
    pub fn project_on_line(&mut self, origin: Vec3, direction: Vec3) {
        let position = self.position();
        let shift = origin - position;
        let along = geom::project_on_axis(shift, direction);
        self.set_position(position + shift - along);
    }

    /// Snap the frame's axes onto the closest axes of `other` (the world
    /// when `None`).
    ///
    /// An axis pair is aligned when the absolute cosine between them is at
    /// least `threshold`; a second axis is then aligned the same way. With
    /// `move_frame`, the frame also translates so that `other`'s origin
    /// keeps its local coordinates.
    pub fn align_with_frame(
        &mut self,
        other: Option<&Frame>,
        move_frame: bool,
        threshold: f32,
    ) {
        let basis = [Vec3::X, Vec3::Y, Vec3::Z];
        let target = basis.map(|d| {
            other.map_or(d, |f| f.inverse_transform_of(d).normalize_or_zero())
        });
        let own = basis.map(|d| self.inverse_transform_of(d).normalize_or_zero());

        let old = self.world_snapshot();
        let mut best = (0, 0);
        let mut max_proj = 0.0;
        for (i, t) in target.iter().enumerate() {
            for (j, o) in own.iter().enumerate() {
                let proj = t.dot(*o).abs();
                if proj >= max_proj {
                    best = (i, j);
                    max_proj = proj;
                }
            }
        }

        let coef = target[best.0].dot(own[best.1]);
        if coef.abs() >= threshold {
            self.rotate_onto(own[best.1], target[best.0]);

            let d = (best.1 + 1) % 3;
            let dir = self.inverse_transform_of(basis[d]).normalize_or_zero();
            let mut second = 0;
            let mut max = 0.0;
            for (i, t) in target.iter().enumerate() {
                let proj = t.dot(dir).abs();
                if proj > max {
                    second = i;
                    max = proj;
                }
            }
            if max >= threshold {
                self.rotate_onto(dir, target[second]);
            }
        }

        if move_frame {
            let center = other.map_or(Vec3::ZERO, Frame::position);
            let local = old.coordinates_of(center);
            let position = center - self.orientation() * (old.scaling * local);
            self.set_position(position);
        }
    }

    /// Apply the world rotation taking `from` onto `to` or onto `-to`,
    /// whichever is closer.
    fn rotate_onto(&mut self, from: Vec3, to: Vec3) {
        let target = if from.dot(to) >= 0.0 { to } else { -to };
        let world = geom::rotation_between(from, target);
        let orientation = self.orientation();
        self.set_orientation(world * orientation);
    }
}

/// World pose of a frame: position, orientation and magnitude.
///
/// A detached value that the eye models, viewpoints and keyframes pass
/// around instead of borrowing live frames. The conversions are exact for
/// root frames and for chains of uniformly scaled frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
    /// World scaling.
    pub magnitude: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            magnitude: Vec3::ONE,
        }
    }
}

impl Pose {
    /// Pose at `position` with `orientation` and unit magnitude.
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            magnitude: Vec3::ONE,
        }
    }

    /// World pose of `frame`.
    #[must_use]
    pub fn of(frame: &Frame) -> Self {
        Self {
            position: frame.position(),
            orientation: frame.orientation(),
            magnitude: frame.magnitude(),
        }
    }

    /// Move `frame` to this pose. The magnitude is only written when it
    /// differs, so frames with a reference frame keep their scaling rule.
    pub fn apply_to(&self, frame: &mut Frame) -> Result<(), VantageError> {
        frame.set_position_and_orientation(self.position, self.orientation);
        if !frame.magnitude().abs_diff_eq(self.magnitude, geom::EPSILON) {
            frame.set_magnitude(self.magnitude)?;
        }
        Ok(())
    }

    /// Pose coordinates of a world point.
    #[must_use]
    pub fn coordinates_of(&self, world: Vec3) -> Vec3 {
        (self.orientation.inverse() * (world - self.position)) / self.magnitude
    }

    /// World coordinates of a point given in pose coordinates.
    #[must_use]
    pub fn inverse_coordinates_of(&self, local: Vec3) -> Vec3 {
        self.orientation * (self.magnitude * local) + self.position
    }

    /// Pose components of a world vector.
    #[must_use]
    pub fn transform_of(&self, world: Vec3) -> Vec3 {
        (self.orientation.inverse() * world) / self.magnitude
    }

    /// World components of a vector given in pose coordinates.
    #[must_use]
    pub fn inverse_transform_of(&self, local: Vec3) -> Vec3 {
        self.orientation * (self.magnitude * local)
    }

    /// World direction of the local X axis.
    #[must_use]
    pub fn x_axis(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// World direction of the local Y axis.
    #[must_use]
    pub fn y_axis(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// World direction of the local Z axis.
    #[must_use]
    pub fn z_axis(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

fn is_uniform(s: Vec3, dimension: Dimension) -> bool {
    let tol = geom::EPSILON * s.abs().max_element().max(1.0);
    let xy = (s.x - s.y).abs() <= tol;
    if dimension.is_2d() {
        xy
    } else {
        xy && (s.x - s.z).abs() <= tol
    }
}

/// Validate a scaling against the positivity and uniformity rules.
pub(crate) fn check_scaling(
    scaling: Vec3,
    dimension: Dimension,
    has_reference: bool,
) -> Result<(), VantageError> {
    if scaling.min_element() <= 0.0 || !scaling.is_finite() {
        return Err(VantageError::InvalidScaling {
            scaling: scaling.to_array(),
        });
    }
    if has_reference && !is_uniform(scaling, dimension) {
        return Err(VantageError::NonUniformScaling {
            scaling: scaling.to_array(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn non_positive_scaling_is_rejected() {
        let mut frame = Frame::new();
        for bad in [0.0, -1.0] {
            assert!(matches!(
                frame.set_scaling(Vec3::new(1.0, bad, 1.0)),
                Err(VantageError::InvalidScaling { .. })
            ));
            assert!(frame.scale(bad).is_err());
        }
        assert_eq!(frame.scaling(), Vec3::ONE);
    }

    #[test]
    fn root_planar_frame_allows_non_uniform_scaling() {
        let mut frame = Frame::new_2d();
        frame.set_scaling(Vec3::new(2.0, 3.0, 7.0)).unwrap();
        assert_eq!(frame.scaling(), Vec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn parented_frame_requires_uniform_scaling() {
        let parent = FrameRef::new(Frame::new_2d());
        let mut child = Frame::new_2d();
        child.set_reference_frame(Some(parent.clone())).unwrap();
        assert!(matches!(
            child.set_scaling(Vec3::new(2.0, 3.0, 1.0)),
            Err(VantageError::NonUniformScaling { .. })
        ));
        child.set_uniform_scaling(2.0).unwrap();

        let mut stretched = Frame::new_2d();
        stretched.set_scaling(Vec3::new(1.0, 4.0, 1.0)).unwrap();
        assert!(stretched.set_reference_frame(Some(parent)).is_err());
        assert!(stretched.reference_frame().is_none());
    }

    #[test]
    fn cycles_are_refused_at_attach_time() {
        let a = FrameRef::new(Frame::new());
        let b = FrameRef::new(Frame::new());
        let c = FrameRef::new(Frame::new());
        b.borrow_mut().set_reference_frame(Some(a.clone())).unwrap();
        c.borrow_mut().set_reference_frame(Some(b.clone())).unwrap();

        let result = a.borrow_mut().set_reference_frame(Some(c.clone()));
        assert!(matches!(result, Err(VantageError::CyclicReference)));
        assert!(a.borrow().reference_frame().is_none());

        let own = a.borrow_mut().set_reference_frame(Some(a.clone()));
        assert!(own.is_err());
        assert_eq!(c.borrow().ancestors().count(), 2);
        assert!(c.borrow().is_descendant_of(&a));
    }

    #[test]
    fn conversions_compose_through_parents() {
        let parent = FrameRef::new(Frame::from_pose(
            Dimension::Three,
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
        ));
        parent.borrow_mut().set_uniform_scaling(2.0).unwrap();
        let mut child = Frame::new();
        child.set_reference_frame(Some(parent)).unwrap();
        child.set_translation(Vec3::new(1.0, 0.0, 0.0));

        assert!(close(child.position(), Vec3::new(10.0, 2.0, 0.0)));
        assert!(close(child.magnitude(), Vec3::splat(2.0)));
        let world = Vec3::new(3.0, -4.0, 5.0);
        assert!(close(child.inverse_coordinates_of(child.coordinates_of(world)), world));
        let v = Vec3::new(0.5, 1.0, -2.0);
        assert!(close(child.inverse_transform_of(child.transform_of(v)), v));
        assert!(close(child.x_axis(), Vec3::Y));

        child.set_position(Vec3::new(0.0, 0.0, 4.0));
        assert!(close(child.position(), Vec3::new(0.0, 0.0, 4.0)));
        let m = child.world_matrix();
        assert!(close(m.transform_point3(Vec3::ZERO), child.position()));
    }

    #[test]
    fn rotate_around_point_keeps_distance() {
        let mut frame = Frame::from_pose(
            Dimension::Three,
            Vec3::new(0.0, 0.0, 5.0),
            Quat::IDENTITY,
        );
        frame.rotate_around_point(Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO);
        assert!(close(frame.position(), Vec3::new(5.0, 0.0, 0.0)));
        assert!(close(frame.z_axis(), Vec3::X));
    }

    #[test]
    fn project_on_line_moves_to_closest_point() {
        let mut frame = Frame::from_pose(
            Dimension::Three,
            Vec3::new(3.0, 4.0, 0.0),
            Quat::IDENTITY,
        );
        frame.project_on_line(Vec3::ZERO, Vec3::X);
        assert!(close(frame.position(), Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn align_snaps_to_world_axes() {
        let mut frame = Frame::from_pose(
            Dimension::Three,
            Vec3::ZERO,
            Quat::from_rotation_z(0.2),
        );
        frame.align_with_frame(None, false, 0.85);
        let x = frame.x_axis();
        assert!(x.abs().abs_diff_eq(Vec3::X, 1e-4));
    }

    #[test]
    fn pose_stamp_tracks_ancestor_changes() {
        let parent = FrameRef::new(Frame::new());
        let mut child = Frame::new();
        child.set_reference_frame(Some(parent.clone())).unwrap();
        let before = child.pose_stamp();
        assert_eq!(before, child.pose_stamp());
        parent.borrow_mut().translate(Vec3::X);
        assert_ne!(before, child.pose_stamp());
    }

    #[test]
    fn pose_conversions_match_frame() {
        let mut frame = Frame::from_pose(
            Dimension::Three,
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.4),
        );
        frame.set_uniform_scaling(2.0).unwrap();
        let pose = Pose::of(&frame);
        let p = Vec3::new(-2.0, 0.5, 7.0);
        assert!(close(pose.coordinates_of(p), frame.coordinates_of(p)));
        assert!(close(pose.inverse_transform_of(p), frame.inverse_transform_of(p)));

        let mut other = Frame::new();
        pose.apply_to(&mut other).unwrap();
        assert!(close(other.position(), frame.position()));
        assert!(close(other.magnitude(), Vec3::splat(2.0)));
    }

    #[test]
    fn clones_get_fresh_ids() {
        let frame = Frame::new();
        let copy = frame.clone();
        assert_ne!(frame.id(), copy.id());
        assert_eq!(frame.translation(), copy.translation());
    }
}
