//! Eye models: the mode-specific half of the eye.
//!
//! [`EyeKind`] selects an [`EyeModel`]. The camera model covers the
//! perspective and orthographic 3D eyes, the window model the planar eye.
//! Models are stateless: they read a [`Lens`] and the eye's world
//! [`Pose`], and mutate the eye frame passed to them.
//!
//! Units: the 3D view matrix divides by the eye's magnitude, so projection
//! parameters (`z_near`, `z_far`, orthographic extents) are expressed in
//! eye units. [`EyeModel::boundary_width_height`] is in world units.

use std::f32::consts::FRAC_PI_3;

use glam::{Mat4, Vec3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::boundary::Plane;
use crate::frame::{Frame, Pose};
use crate::geom::{self, Dimension, Handedness, Rect};

/// Which projection an eye uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EyeKind {
    /// 3D perspective camera.
    #[default]
    Perspective3D,
    /// 3D orthographic camera.
    Orthographic3D,
    /// 2D window.
    Window2D,
}

impl EyeKind {
    /// Model implementing this kind.
    #[must_use]
    pub fn model(self) -> &'static dyn EyeModel {
        match self {
            Self::Perspective3D | Self::Orthographic3D => &CameraModel,
            Self::Window2D => &WindowModel,
        }
    }

    /// Scene dimension of this kind.
    #[must_use]
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Perspective3D | Self::Orthographic3D => Dimension::Three,
            Self::Window2D => Dimension::Two,
        }
    }

    /// Whether this is the planar kind.
    #[must_use]
    pub fn is_2d(self) -> bool {
        self == Self::Window2D
    }
}

/// Eye parameters that are not part of the frame pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    /// Projection kind.
    pub kind: EyeKind,
    /// Viewport width in pixels (at least 1).
    pub screen_width: u32,
    /// Viewport height in pixels (at least 1).
    pub screen_height: u32,
    /// Vertical field of view, in radians.
    pub field_of_view: f32,
    /// Center of the scene's bounding ball.
    pub scene_center: Vec3,
    /// Radius of the scene's bounding ball.
    pub scene_radius: f32,
    /// Screen axis convention.
    pub handedness: Handedness,
    /// Fraction of the clipping span kept in front of the eye (perspective).
    pub z_near_coefficient: f32,
    /// Multiple of the scene radius between the scene center and the
    /// clipping planes.
    pub z_clipping_coefficient: f32,
    /// Orthographic half height per unit of anchor depth. Follows the
    /// field of view and compensates anchor moves.
    pub ortho_coefficient: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            kind: EyeKind::default(),
            screen_width: 800,
            screen_height: 600,
            field_of_view: FRAC_PI_3,
            scene_center: Vec3::ZERO,
            scene_radius: 100.0,
            handedness: Handedness::Right,
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            ortho_coefficient: (FRAC_PI_3 / 2.0).tan(),
        }
    }
}

impl Lens {
    /// Viewport width as a float.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.screen_width.max(1) as f32
    }

    /// Viewport height as a float.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.screen_height.max(1) as f32
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width() / self.height()
    }

    /// Horizontal field of view derived from the vertical one.
    #[must_use]
    pub fn horizontal_field_of_view(&self) -> f32 {
        2.0 * ((self.field_of_view / 2.0).tan() * self.aspect_ratio()).atan()
    }

    /// Whether the screen Y axis points down in the scene.
    #[must_use]
    pub fn is_left_handed(&self) -> bool {
        self.handedness.is_left()
    }

    /// Set the vertical field of view and the matching orthographic
    /// coefficient.
    pub fn set_field_of_view(&mut self, fov: f32) {
        self.field_of_view = fov;
        self.ortho_coefficient = (fov / 2.0).tan();
    }
}

/// Mode-specific eye behaviour.
pub trait EyeModel {
    /// World to eye transform.
    fn view_matrix(&self, pose: &Pose) -> Mat4;

    /// Eye to clip transform (`[-1, 1]` depth).
    fn projection_matrix(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Mat4;

    /// Half extents of the visible region at the anchor, in world units.
    fn boundary_width_height(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> [f32; 2];

    /// World direction the eye looks at.
    fn view_direction(&self, pose: &Pose) -> Vec3;

    /// Near clipping distance, in eye units.
    fn z_near(&self, lens: &Lens, pose: &Pose) -> f32;

    /// Far clipping distance, in eye units.
    fn z_far(&self, lens: &Lens, pose: &Pose) -> f32;

    /// World units covered by one pixel at `position`.
    fn pixel_scene_ratio(&self, lens: &Lens, pose: &Pose, anchor: Vec3, position: Vec3) -> f32;

    /// Outward planes bounding the visible region, in world coordinates.
    fn boundary_planes(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Vec<Plane>;

    /// World ray (origin, unit direction) through pixel `(x, y)`.
    fn convert_click_to_line(
        &self,
        lens: &Lens,
        pose: &Pose,
        anchor: Vec3,
        pixel: (f32, f32),
    ) -> (Vec3, Vec3);

    /// Turn (3D) or move (2D) the eye frame so that it looks at `target`.
    fn look_at(&self, frame: &mut Frame, target: Vec3);

    /// Place the eye frame so that the ball fills the viewport.
    fn fit_ball(&self, lens: &Lens, frame: &mut Frame, anchor: Vec3, center: Vec3, radius: f32);

    /// Rotate the eye frame so that its Y axis matches the world `up`,
    /// orbiting the anchor unless `no_move`.
    fn set_up_vector(&self, frame: &mut Frame, anchor: Vec3, up: Vec3, no_move: bool);
}

// ── Camera ──────────────────────────────────────────────────────────────

/// Perspective and orthographic 3D eyes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraModel;

impl CameraModel {
    /// Depth of the scene center in front of the eye, in eye units.
    fn distance_to_scene_center(lens: &Lens, pose: &Pose) -> f32 {
        pose.coordinates_of(lens.scene_center).z.abs()
    }

    /// Orthographic half extents at the anchor depth, in world units.
    fn ortho_half_extents(lens: &Lens, pose: &Pose, anchor: Vec3) -> [f32; 2] {
        let depth = (pose.coordinates_of(anchor).z * pose.magnitude.z).abs();
        let half = depth * lens.ortho_coefficient;
        let aspect = lens.aspect_ratio();
        if aspect < 1.0 {
            [half, half / aspect]
        } else {
            [half * aspect, half]
        }
    }

    /// Point of the click line through `pixel` at the scene center depth.
    fn point_on_center_plane(lens: &Lens, pose: &Pose, anchor: Vec3, pixel: (f32, f32)) -> Vec3 {
        let (origin, dir) = Self.convert_click_to_line(lens, pose, anchor, pixel);
        let vd = Self.view_direction(pose);
        let depth = (lens.scene_center - origin).dot(vd);
        let along = dir.dot(vd);
        if geom::is_zero(along) {
            origin
        } else {
            origin + dir * (depth / along)
        }
    }

    /// Place the eye frame so that `rect` (in pixels) fills the viewport.
    pub fn fit_screen_region(lens: &Lens, frame: &mut Frame, anchor: Vec3, rect: Rect) {
        let pose = Pose::of(frame);
        let vd = Self.view_direction(&pose);
        let center = Self::point_on_center_plane(lens, &pose, anchor, (rect.center_x(), rect.center_y()));
        let point_x = Self::point_on_center_plane(lens, &pose, anchor, (rect.x, rect.center_y()));
        let point_y = Self::point_on_center_plane(lens, &pose, anchor, (rect.center_x(), rect.y));

        let half_x = (point_x - center).length();
        let half_y = (point_y - center).length();
        let distance = match lens.kind {
            EyeKind::Orthographic3D => {
                let coef = lens.ortho_coefficient;
                let aspect = lens.aspect_ratio();
                let dist = (center - anchor).dot(vd);
                let dist_x = half_x / coef / if aspect < 1.0 { 1.0 } else { aspect };
                let dist_y = half_y / coef / if aspect < 1.0 { 1.0 / aspect } else { 1.0 };
                dist + dist_x.max(dist_y)
            }
            _ => {
                let dist_x = half_x / (lens.horizontal_field_of_view() / 2.0).sin();
                let dist_y = half_y / (lens.field_of_view / 2.0).sin();
                dist_x.max(dist_y)
            }
        };
        frame.set_position_with_constraint(center - vd * distance);
    }

    /// Point the eye along `direction`, keeping its X axis horizontal.
    pub fn set_view_direction(frame: &mut Frame, direction: Vec3) {
        if direction.length_squared() < 1e-10 {
            return;
        }
        let up = frame.y_axis();
        let mut x_axis = direction.cross(up);
        if x_axis.length_squared() < 1e-10 {
            x_axis = frame.x_axis();
        }
        let q = geom::from_rotated_basis(x_axis, x_axis.cross(direction), -direction);
        frame.set_orientation_with_constraint(q);
    }
}

impl EyeModel for CameraModel {
    fn view_matrix(&self, pose: &Pose) -> Mat4 {
        Mat4::from_scale_rotation_translation(pose.magnitude, pose.orientation, pose.position)
            .inverse()
    }

    fn projection_matrix(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Mat4 {
        let near = self.z_near(lens, pose);
        let far = self.z_far(lens, pose);
        let mut projection = match lens.kind {
            EyeKind::Orthographic3D => {
                let [w, h] = Self::ortho_half_extents(lens, pose, anchor);
                let (w, h) = (w / pose.magnitude.x, h / pose.magnitude.y);
                Mat4::orthographic_rh_gl(-w, w, -h, h, near, far)
            }
            _ => Mat4::perspective_rh_gl(lens.field_of_view, lens.aspect_ratio(), near, far),
        };
        if lens.is_left_handed() {
            projection.y_axis.y = -projection.y_axis.y;
        }
        projection
    }

    fn boundary_width_height(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> [f32; 2] {
        Self::ortho_half_extents(lens, pose, anchor)
    }

    fn view_direction(&self, pose: &Pose) -> Vec3 {
        -pose.z_axis()
    }

    fn z_near(&self, lens: &Lens, pose: &Pose) -> f32 {
        let radius = lens.scene_radius / pose.magnitude.z;
        let z_min = match lens.kind {
            EyeKind::Orthographic3D => 0.0,
            _ => lens.z_near_coefficient * lens.z_clipping_coefficient * radius,
        };
        let z = Self::distance_to_scene_center(lens, pose) - lens.z_clipping_coefficient * radius;
        z.max(z_min)
    }

    fn z_far(&self, lens: &Lens, pose: &Pose) -> f32 {
        let radius = lens.scene_radius / pose.magnitude.z;
        Self::distance_to_scene_center(lens, pose) + lens.z_clipping_coefficient * radius
    }

    fn pixel_scene_ratio(&self, lens: &Lens, pose: &Pose, anchor: Vec3, position: Vec3) -> f32 {
        match lens.kind {
            EyeKind::Orthographic3D => {
                2.0 * self.boundary_width_height(lens, pose, anchor)[1] / lens.height()
            }
            _ => {
                let depth = (pose.coordinates_of(position).z * pose.magnitude.z).abs();
                2.0 * depth * (lens.field_of_view / 2.0).tan() / lens.height()
            }
        }
    }

    fn boundary_planes(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Vec<Plane> {
        let pos = pose.position;
        let vd = self.view_direction(pose);
        let up = pose.y_axis();
        let right = pose.x_axis();
        let z_near = self.z_near(lens, pose) * pose.magnitude.z;
        let z_far = self.z_far(lens, pose) * pose.magnitude.z;

        let near = Plane::through(-vd, pos + vd * z_near);
        let far = Plane::through(vd, pos + vd * z_far);
        let (left, right_plane, top, bottom) = match lens.kind {
            EyeKind::Orthographic3D => {
                let [w, h] = self.boundary_width_height(lens, pose, anchor);
                (
                    Plane::through(-right, pos - right * w),
                    Plane::through(right, pos + right * w),
                    Plane::through(up, pos + up * h),
                    Plane::through(-up, pos - up * h),
                )
            }
            _ => {
                let half_h = lens.horizontal_field_of_view() / 2.0;
                let (sh, ch) = half_h.sin_cos();
                let half_v = lens.field_of_view / 2.0;
                let (sv, cv) = half_v.sin_cos();
                (
                    Plane::through(-vd * sh - right * ch, pos),
                    Plane::through(-vd * sh + right * ch, pos),
                    Plane::through(-vd * sv + up * cv, pos),
                    Plane::through(-vd * sv - up * cv, pos),
                )
            }
        };
        vec![left, right_plane, near, far, top, bottom]
    }

    fn convert_click_to_line(
        &self,
        lens: &Lens,
        pose: &Pose,
        anchor: Vec3,
        (x, y): (f32, f32),
    ) -> (Vec3, Vec3) {
        let (w, h) = (lens.width(), lens.height());
        let sx = 2.0 * x / w - 1.0;
        let sy = if lens.is_left_handed() {
            2.0 * y / h - 1.0
        } else {
            2.0 * (h - y) / h - 1.0
        };
        match lens.kind {
            EyeKind::Orthographic3D => {
                let [wh0, wh1] = self.boundary_width_height(lens, pose, anchor);
                let offset = pose.orientation * Vec3::new(sx * wh0, sy * wh1, 0.0);
                (pose.position + offset, self.view_direction(pose))
            }
            _ => {
                let t = (lens.field_of_view / 2.0).tan();
                let local = Vec3::new(sx * t * lens.aspect_ratio(), sy * t, -1.0);
                (pose.position, (pose.orientation * local).normalize())
            }
        }
    }

    fn look_at(&self, frame: &mut Frame, target: Vec3) {
        let direction = target - frame.position();
        Self::set_view_direction(frame, direction);
    }

    fn fit_ball(&self, lens: &Lens, frame: &mut Frame, anchor: Vec3, center: Vec3, radius: f32) {
        let pose = Pose::of(frame);
        let vd = self.view_direction(&pose);
        let distance = match lens.kind {
            EyeKind::Orthographic3D => {
                (center - anchor).dot(vd) + radius / lens.ortho_coefficient
            }
            _ => {
                let y_view = radius / (lens.field_of_view / 2.0).sin();
                let x_view = radius / (lens.horizontal_field_of_view() / 2.0).sin();
                x_view.max(y_view)
            }
        };
        frame.set_position_with_constraint(center - vd * distance);
    }

    fn set_up_vector(&self, frame: &mut Frame, anchor: Vec3, up: Vec3, no_move: bool) {
        let orientation = frame.orientation();
        let q = geom::rotation_between(Vec3::Y, orientation.inverse() * up);
        if !no_move {
            let local = orientation.inverse() * (anchor - frame.position());
            frame.set_position(anchor - (orientation * q) * local);
        }
        frame.rotate(q);
    }
}

// ── Window ──────────────────────────────────────────────────────────────

/// Depth range of the planar projection.
const WINDOW_Z_NEAR: f32 = -10.0;
const WINDOW_Z_FAR: f32 = 10.0;

/// The planar eye.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowModel;

impl WindowModel {
    /// Scale the eye so that `rect` (in pixels) fills the viewport, then
    /// center it on the rectangle.
    pub fn fit_screen_region(lens: &Lens, frame: &mut Frame, rect: Rect, center: Vec3) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            log::warn!("cannot fit an empty screen region");
            return;
        }
        let rect_ratio = rect.width / rect.height;
        let factor = if lens.aspect_ratio() < rect_ratio {
            rect.width / lens.width()
        } else {
            rect.height / lens.height()
        };
        let scaling = frame.scaling();
        let scaled = Vec3::new(scaling.x * factor, scaling.y * factor, scaling.z);
        if let Err(err) = frame.set_scaling(scaled) {
            log::warn!("cannot fit screen region: {err}");
            return;
        }
        WindowModel.look_at(frame, center);
    }
}

impl EyeModel for WindowModel {
    fn view_matrix(&self, pose: &Pose) -> Mat4 {
        Mat4::from_rotation_translation(pose.orientation, pose.position).inverse()
    }

    fn projection_matrix(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Mat4 {
        let [w, h] = self.boundary_width_height(lens, pose, anchor);
        let (bottom, top) = if lens.is_left_handed() { (h, -h) } else { (-h, h) };
        Mat4::orthographic_rh_gl(-w, w, bottom, top, WINDOW_Z_NEAR, WINDOW_Z_FAR)
    }

    fn boundary_width_height(&self, lens: &Lens, pose: &Pose, _anchor: Vec3) -> [f32; 2] {
        [
            pose.magnitude.x * lens.width() / 2.0,
            pose.magnitude.y * lens.height() / 2.0,
        ]
    }

    fn view_direction(&self, pose: &Pose) -> Vec3 {
        if pose.z_axis().z > 0.0 {
            Vec3::NEG_Z
        } else {
            Vec3::Z
        }
    }

    fn z_near(&self, _lens: &Lens, _pose: &Pose) -> f32 {
        WINDOW_Z_NEAR
    }

    fn z_far(&self, _lens: &Lens, _pose: &Pose) -> f32 {
        WINDOW_Z_FAR
    }

    fn pixel_scene_ratio(&self, lens: &Lens, pose: &Pose, anchor: Vec3, _position: Vec3) -> f32 {
        2.0 * self.boundary_width_height(lens, pose, anchor)[1] / lens.height()
    }

    fn boundary_planes(&self, lens: &Lens, pose: &Pose, anchor: Vec3) -> Vec<Plane> {
        let pos = pose.position;
        let up = pose.y_axis();
        let right = pose.x_axis();
        let [w, h] = self.boundary_width_height(lens, pose, anchor);
        vec![
            Plane::through(-right, pos - right * w),
            Plane::through(right, pos + right * w),
            Plane::through(up, pos + up * h),
            Plane::through(-up, pos - up * h),
        ]
    }

    fn convert_click_to_line(
        &self,
        lens: &Lens,
        pose: &Pose,
        anchor: Vec3,
        (x, y): (f32, f32),
    ) -> (Vec3, Vec3) {
        let [w, h] = self.boundary_width_height(lens, pose, anchor);
        let sx = 2.0 * x / lens.width() - 1.0;
        let sy = if lens.is_left_handed() {
            2.0 * y / lens.height() - 1.0
        } else {
            1.0 - 2.0 * y / lens.height()
        };
        let offset = pose.orientation * Vec3::new(sx * w, sy * h, 0.0);
        (pose.position + offset, self.view_direction(pose))
    }

    fn look_at(&self, frame: &mut Frame, target: Vec3) {
        let z = frame.position().z;
        frame.set_position(Vec3::new(target.x, target.y, z));
    }

    fn fit_ball(&self, lens: &Lens, frame: &mut Frame, _anchor: Vec3, center: Vec3, radius: f32) {
        let size = lens.width().min(lens.height());
        let s = 2.0 * radius / size;
        if let Err(err) = frame.set_scaling(Vec3::new(s, s, 1.0)) {
            log::warn!("cannot fit ball: {err}");
            return;
        }
        self.look_at(frame, center);
    }

    fn set_up_vector(&self, frame: &mut Frame, anchor: Vec3, up: Vec3, no_move: bool) {
        let orientation = frame.orientation();
        let local_up = orientation.inverse() * up;
        let angle = local_up.x.atan2(local_up.y);
        let q = geom::axis_angle(Vec3::Z, -angle);
        if !no_move {
            let local = orientation.inverse() * (anchor - frame.position());
            frame.set_position(anchor - (orientation * q) * local);
        }
        frame.rotate(q);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use super::*;

    fn lens(kind: EyeKind) -> Lens {
        Lens {
            kind,
            field_of_view: FRAC_PI_3,
            ..Lens::default()
        }
    }

    #[test]
    fn clipping_planes_bracket_the_scene() {
        let lens = lens(EyeKind::Perspective3D);
        let pose = Pose::new(Vec3::new(0.0, 0.0, 300.0), glam::Quat::IDENTITY);
        let near = CameraModel.z_near(&lens, &pose);
        let far = CameraModel.z_far(&lens, &pose);
        let span = 3.0_f32.sqrt() * 100.0;
        assert!((near - (300.0 - span)).abs() < 1e-3);
        assert!((far - (300.0 + span)).abs() < 1e-3);
    }

    #[test]
    fn near_plane_never_crosses_the_eye() {
        let lens = lens(EyeKind::Perspective3D);
        let inside = Pose::new(Vec3::new(0.0, 0.0, 10.0), glam::Quat::IDENTITY);
        let near = CameraModel.z_near(&lens, &inside);
        assert!(near > 0.0);
        assert!((near - 0.005 * 3.0_f32.sqrt() * 100.0).abs() < 1e-4);
    }

    #[test]
    fn fit_ball_frames_the_whole_ball() {
        let lens = lens(EyeKind::Perspective3D);
        let mut frame = Frame::new();
        CameraModel.fit_ball(&lens, &mut frame, Vec3::ZERO, Vec3::ZERO, 100.0);
        let pose = Pose::of(&frame);
        let planes = CameraModel.boundary_planes(&lens, &pose, Vec3::ZERO);
        for plane in &planes[..2] {
            assert!(plane.distance_to_point(Vec3::ZERO) <= -100.0 + 1e-2);
        }
    }

    #[test]
    fn window_fit_ball_scales_to_the_short_side() {
        let lens = lens(EyeKind::Window2D);
        let mut frame = Frame::new_2d();
        WindowModel.fit_ball(&lens, &mut frame, Vec3::ZERO, Vec3::new(5.0, 6.0, 0.0), 300.0);
        assert!(frame.scaling().abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-6));
        assert_eq!(frame.position(), Vec3::new(5.0, 6.0, 0.0));
    }

    #[test]
    fn look_at_points_the_view_direction() {
        let mut frame = Frame::from_pose(Dimension::Three, Vec3::new(10.0, 0.0, 0.0), glam::Quat::IDENTITY);
        CameraModel.look_at(&mut frame, Vec3::ZERO);
        let vd = CameraModel.view_direction(&Pose::of(&frame));
        assert!(vd.abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(frame.x_axis().y.abs() < 1e-5);
    }

    #[test]
    fn up_vector_rotation_keeps_the_anchor_in_place() {
        let anchor = Vec3::ZERO;
        let mut frame = Frame::from_pose(Dimension::Three, Vec3::new(0.0, 0.0, 50.0), glam::Quat::IDENTITY);
        let before = frame.coordinates_of(anchor);
        CameraModel.set_up_vector(&mut frame, anchor, Vec3::X, false);
        assert!(frame.y_axis().abs_diff_eq(Vec3::X, 1e-5));
        assert!(frame.coordinates_of(anchor).abs_diff_eq(before, 1e-3));
    }
}
