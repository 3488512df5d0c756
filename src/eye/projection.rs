//! Immutable snapshot of an eye's matrices.

use glam::{Mat4, Vec3, Vec4};

use super::model::{EyeKind, EyeModel, Lens};
use crate::frame::{Frame, Pose};
use crate::geom;

/// Everything a gesture needs to know about the eye at one instant.
///
/// Built by the eye after its matrices are recomputed; grabbers read it
/// instead of borrowing the eye, which may itself be the grabber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Eye parameters.
    pub lens: Lens,
    /// World pose of the eye frame.
    pub pose: Pose,
    /// Eye pivot, in world coordinates.
    pub anchor: Vec3,
    /// World to eye matrix.
    pub view: Mat4,
    /// Eye to clip matrix.
    pub projection: Mat4,
}

impl Viewpoint {
    /// Snapshot computed from scratch.
    #[must_use]
    pub fn new(lens: Lens, pose: Pose, anchor: Vec3) -> Self {
        let model = lens.kind.model();
        Self {
            lens,
            pose,
            anchor,
            view: model.view_matrix(&pose),
            projection: model.projection_matrix(&lens, &pose, anchor),
        }
    }

    fn model(&self) -> &'static dyn EyeModel {
        self.lens.kind.model()
    }

    /// Projection kind.
    #[must_use]
    pub fn kind(&self) -> EyeKind {
        self.lens.kind
    }

    /// Whether the eye is planar.
    #[must_use]
    pub fn is_2d(&self) -> bool {
        self.lens.kind.is_2d()
    }

    /// Whether the screen Y axis points down in the scene.
    #[must_use]
    pub fn is_left_handed(&self) -> bool {
        self.lens.is_left_handed()
    }

    /// Viewport width in pixels.
    #[must_use]
    pub fn screen_width(&self) -> f32 {
        self.lens.width()
    }

    /// Viewport height in pixels.
    #[must_use]
    pub fn screen_height(&self) -> f32 {
        self.lens.height()
    }

    /// Vertical field of view, in radians.
    #[must_use]
    pub fn field_of_view(&self) -> f32 {
        self.lens.field_of_view
    }

    /// World direction the eye looks at.
    #[must_use]
    pub fn view_direction(&self) -> Vec3 {
        self.model().view_direction(&self.pose)
    }

    /// Half extents of the visible region at the anchor, in world units.
    #[must_use]
    pub fn boundary_width_height(&self) -> [f32; 2] {
        self.model()
            .boundary_width_height(&self.lens, &self.pose, self.anchor)
    }

    /// World units covered by one pixel at `position`.
    #[must_use]
    pub fn pixel_scene_ratio(&self, position: Vec3) -> f32 {
        self.model()
            .pixel_scene_ratio(&self.lens, &self.pose, self.anchor, position)
    }

    /// World ray (origin, unit direction) through a pixel.
    #[must_use]
    pub fn convert_click_to_line(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        self.model()
            .convert_click_to_line(&self.lens, &self.pose, self.anchor, (x, y))
    }

    /// Rigid eye frame (no scaling) at the eye's pose.
    #[must_use]
    pub fn eye_frame(&self) -> Frame {
        Frame::from_pose(
            self.kind().dimension(),
            self.pose.position,
            self.pose.orientation,
        )
    }

    /// Projection and view combined.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Screen coordinates of a world point: pixels in x and y (origin
    /// top-left), depth in `[0, 1]` between the clipping planes. `None`
    /// when the point sits on the eye plane.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if geom::is_zero(clip.w) {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let (w, h) = (self.screen_width(), self.screen_height());
        Some(Vec3::new(
            (ndc.x * 0.5 + 0.5) * w,
            h * (0.5 - 0.5 * ndc.y),
            ndc.z * 0.5 + 0.5,
        ))
    }

    /// World point at screen coordinates (pixels, depth in `[0, 1]`).
    /// `None` when the matrices are singular.
    #[must_use]
    pub fn unproject(&self, screen: Vec3) -> Option<Vec3> {
        let vp = self.view_projection();
        let det = vp.determinant();
        if det.abs() <= f32::MIN_POSITIVE || !det.is_finite() {
            return None;
        }
        let (w, h) = (self.screen_width(), self.screen_height());
        let ndc = Vec4::new(
            screen.x / w * 2.0 - 1.0,
            ((screen.y - h) / -h) * 2.0 - 1.0,
            screen.z * 2.0 - 1.0,
            1.0,
        );
        let world = vp.inverse() * ndc;
        if world.w.abs() <= f32::MIN_POSITIVE {
            return None;
        }
        Some(world.truncate() / world.w)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use glam::Quat;

    use super::*;

    fn viewpoint(kind: EyeKind) -> Viewpoint {
        let lens = Lens {
            kind,
            field_of_view: FRAC_PI_3,
            ..Lens::default()
        };
        let position = if kind.is_2d() {
            Vec3::ZERO
        } else {
            Vec3::new(0.0, 0.0, 300.0)
        };
        Viewpoint::new(lens, Pose::new(position, Quat::IDENTITY), Vec3::ZERO)
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let view = viewpoint(EyeKind::Perspective3D);
        let Some(p) = view.project(Vec3::ZERO) else {
            unreachable!("origin is in front of the eye");
        };
        assert!((p.x - 400.0).abs() < 1e-2);
        assert!((p.y - 300.0).abs() < 1e-2);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn projection_round_trips() {
        for kind in [EyeKind::Perspective3D, EyeKind::Orthographic3D, EyeKind::Window2D] {
            let view = viewpoint(kind);
            let world = Vec3::new(12.0, -7.0, 0.0);
            let screen = view.project(world).unwrap();
            let back = view.unproject(screen).unwrap();
            assert!(back.abs_diff_eq(world, 1e-2), "{kind:?}: {back:?}");
        }
    }

    #[test]
    fn screen_y_grows_downwards_when_right_handed() {
        let view = viewpoint(EyeKind::Perspective3D);
        let up = view.project(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(up.y < 300.0);

        let mut lens = view.lens;
        lens.handedness = lens.handedness.flipped();
        let flipped = Viewpoint::new(lens, view.pose, view.anchor);
        let down = flipped.project(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(down.y > 300.0);
    }

    #[test]
    fn click_line_hits_the_projected_point() {
        for kind in [EyeKind::Perspective3D, EyeKind::Orthographic3D] {
            let view = viewpoint(kind);
            let world = Vec3::new(20.0, 15.0, 0.0);
            let screen = view.project(world).unwrap();
            let (origin, dir) = view.convert_click_to_line(screen.x, screen.y);
            let t = (world - origin).dot(dir);
            let closest = origin + dir * t;
            assert!(closest.abs_diff_eq(world, 1e-2), "{kind:?}: {closest:?}");
        }
    }

    #[test]
    fn pixel_ratio_matches_projection() {
        let view = viewpoint(EyeKind::Perspective3D);
        let ratio = view.pixel_scene_ratio(Vec3::ZERO);
        let a = view.project(Vec3::ZERO).unwrap();
        let b = view.project(Vec3::new(ratio * 10.0, 0.0, 0.0)).unwrap();
        assert!(((b.x - a.x) - 10.0).abs() < 1e-2);
    }
}
