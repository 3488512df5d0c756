//! The eye: a camera (3D) or window (2D) looking at the scene.
//!
//! [`Eye`] owns an [`InteractiveEyeFrame`], the [`Lens`] parameters and the
//! cached view and projection matrices. Matrices are only recomputed when
//! asked ([`Eye::compute_matrices`]); [`Eye::viewpoint`] snapshots the
//! cached state for gesture dispatch and projection.
//!
//! Boundary planes are cached against the eye frame's pose stamp, the lens
//! revision and the anchor. Keyframed paths live in [`paths`].
//!
//! # Units
//!
//! Positions, radii and the values returned by the geometric queries are
//! world units. `z_near`/`z_far` and the projection matrix are expressed in
//! eye units (world units divided by the eye's magnitude).

pub mod boundary;
pub mod model;
mod paths;
pub mod projection;

use std::fmt;

pub use boundary::{Boundary, Plane, Visibility};
use glam::{Mat4, Quat, Vec3};
pub use model::{CameraModel, EyeKind, EyeModel, Lens, WindowModel};
pub use projection::Viewpoint;
use rustc_hash::FxHashMap;

use crate::agent::keyboard::KeyAction;
use crate::agent::{Grabber, InteractiveGrabber};
use crate::error::VantageError;
use crate::event::Event;
use crate::frame::{self, Frame, FrameRef, Pose};
use crate::geom::{self, Handedness, Rect};
use crate::interactive::{
    Action, ClickAction, InteractiveEyeFrame, MotionAction, ALIGN_THRESHOLD,
};
use crate::path::{KeyFrameInterpolator, DEFAULT_PERIOD};
use crate::timing::Tick;

/// Fly speed as a fraction of the scene radius.
const FLY_SPEED_RATIO: f32 = 0.01;

/// Fly-speed multiple used by the keyboard move actions.
const KEY_MOVE_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundaryStamp {
    pose: u64,
    revision: u64,
    anchor: Vec3,
}

/// A camera or window onto the scene.
pub struct Eye {
    frame: InteractiveEyeFrame,
    lens: Lens,
    view: Mat4,
    projection: Mat4,

    boundary: Boundary,
    boundary_stamp: Option<BoundaryStamp>,
    auto_boundary: bool,
    /// Bumped by every lens change.
    revision: u64,

    paths: FxHashMap<i32, KeyFrameInterpolator>,
    interpolation: KeyFrameInterpolator,
    key_frame_period: u64,

    /// Pixel corners of a zoom-on-region gesture in progress.
    zoom_region: Option<[(f32, f32); 2]>,
}

impl fmt::Debug for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eye")
            .field("kind", &self.lens.kind)
            .field("frame", &self.frame)
            .field("paths", &self.paths.len())
            .finish_non_exhaustive()
    }
}

impl Default for Eye {
    fn default() -> Self {
        Self::new(EyeKind::default())
    }
}

impl Clone for Eye {
    /// Deep copy: the clone drives its own copy of the eye frame and owns
    /// copies of the paths and matrices.
    fn clone(&self) -> Self {
        Self {
            frame: self.frame.duplicate(),
            lens: self.lens,
            view: self.view,
            projection: self.projection,
            boundary: self.boundary.clone(),
            boundary_stamp: None,
            auto_boundary: self.auto_boundary,
            revision: self.revision,
            paths: self.paths.clone(),
            interpolation: self.interpolation.clone(),
            key_frame_period: self.key_frame_period,
            zoom_region: None,
        }
    }
}

impl Eye {
    /// Eye of `kind` on an 800×600 viewport, framing a scene of radius
    /// 100 around the origin.
    #[must_use]
    pub fn new(kind: EyeKind) -> Self {
        Self::with_lens(Lens {
            kind,
            ..Lens::default()
        })
    }

    /// Eye with explicit lens parameters, looking at the whole scene.
    #[must_use]
    pub fn with_lens(lens: Lens) -> Self {
        let frame = Frame::with_dimension(lens.kind.dimension());
        let mut eye = Self {
            frame: InteractiveEyeFrame::new(frame),
            lens,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            boundary: Boundary::default(),
            boundary_stamp: None,
            auto_boundary: true,
            revision: 0,
            paths: FxHashMap::default(),
            interpolation: KeyFrameInterpolator::new(),
            key_frame_period: DEFAULT_PERIOD,
            zoom_region: None,
        };
        eye.lens.screen_width = lens.screen_width.max(1);
        eye.lens.screen_height = lens.screen_height.max(1);
        eye.frame
            .base_mut()
            .set_fly_speed(FLY_SPEED_RATIO * lens.scene_radius);
        eye.frame.set_anchor(lens.scene_center);
        eye.show_entire_scene();
        eye.compute_matrices();
        eye
    }

    // ── Frame ───────────────────────────────────────────────────────────

    /// The eye's interactive frame.
    #[must_use]
    pub fn frame(&self) -> &InteractiveEyeFrame {
        &self.frame
    }

    /// Mutable access to the eye's interactive frame.
    pub fn frame_mut(&mut self) -> &mut InteractiveEyeFrame {
        &mut self.frame
    }

    /// Replace the eye frame. The anchor carries over; a frame of the
    /// wrong dimension is rejected.
    pub fn set_frame(&mut self, mut frame: InteractiveEyeFrame) {
        let dimension = frame.frame().borrow().dimension();
        if dimension != self.lens.kind.dimension() {
            log::warn!("eye frame of dimension {dimension:?} rejected by a {:?} eye", self.lens.kind);
            return;
        }
        frame.set_anchor(self.frame.anchor());
        self.frame = frame;
        self.boundary_stamp = None;
    }

    fn frame_ref(&self) -> &FrameRef {
        self.frame.frame()
    }

    /// World pose of the eye frame.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::of(&self.frame_ref().borrow())
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.frame_ref().borrow().position()
    }

    /// Move the eye.
    pub fn set_position(&mut self, position: Vec3) {
        self.frame_ref().borrow_mut().set_position(position);
    }

    /// World orientation.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.frame_ref().borrow().orientation()
    }

    /// Turn the eye.
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.frame_ref().borrow_mut().set_orientation(orientation);
    }

    /// Check the eye frame's scaling and, when it has one, its reference
    /// frame's.
    pub fn validate_scaling(&self) -> Result<(), VantageError> {
        let eye_frame = self.frame_ref().borrow();
        frame::check_scaling(
            eye_frame.scaling(),
            eye_frame.dimension(),
            eye_frame.reference_frame().is_some(),
        )?;
        for ancestor in eye_frame.ancestors() {
            let ancestor = ancestor.borrow();
            frame::check_scaling(
                ancestor.scaling(),
                ancestor.dimension(),
                ancestor.reference_frame().is_some(),
            )?;
        }
        Ok(())
    }

    // ── Lens ────────────────────────────────────────────────────────────

    /// Current lens parameters.
    #[must_use]
    pub fn lens(&self) -> &Lens {
        &self.lens
    }

    fn lens_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn model(&self) -> &'static dyn EyeModel {
        self.lens.kind.model()
    }

    /// Projection kind.
    #[must_use]
    pub fn kind(&self) -> EyeKind {
        self.lens.kind
    }

    /// Switch between the two 3D kinds. Planar eyes cannot become 3D and
    /// vice versa.
    pub fn set_kind(&mut self, kind: EyeKind) {
        if kind.dimension() != self.lens.kind.dimension() {
            log::warn!("cannot turn a {:?} eye into a {kind:?} eye", self.lens.kind);
            return;
        }
        self.lens.kind = kind;
        self.lens_changed();
    }

    /// Toggle perspective and orthographic projection.
    pub fn toggle_kind(&mut self) {
        match self.lens.kind {
            EyeKind::Perspective3D => self.set_kind(EyeKind::Orthographic3D),
            EyeKind::Orthographic3D => self.set_kind(EyeKind::Perspective3D),
            EyeKind::Window2D => log::warn!("a planar eye has a single kind"),
        }
    }

    /// Whether the eye is planar.
    #[must_use]
    pub fn is_2d(&self) -> bool {
        self.lens.kind.is_2d()
    }

    /// Viewport width in pixels.
    #[must_use]
    pub fn screen_width(&self) -> u32 {
        self.lens.screen_width
    }

    /// Viewport height in pixels.
    #[must_use]
    pub fn screen_height(&self) -> u32 {
        self.lens.screen_height
    }

    /// Resize the viewport. Zero dimensions are clamped to 1.
    pub fn set_screen_width_and_height(&mut self, width: u32, height: u32) {
        self.lens.screen_width = width.max(1);
        self.lens.screen_height = height.max(1);
        self.lens_changed();
    }

    /// `[x, y, width, height]` of the viewport, with the origin at the
    /// bottom-left corner and a negative height (screen y grows downward).
    #[must_use]
    pub fn viewport(&self) -> [f32; 4] {
        let (w, h) = (self.lens.width(), self.lens.height());
        [0.0, h, w, -h]
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.lens.aspect_ratio()
    }

    /// Vertical field of view, in radians.
    #[must_use]
    pub fn field_of_view(&self) -> f32 {
        self.lens.field_of_view
    }

    /// Set the vertical field of view, in radians.
    pub fn set_field_of_view(&mut self, fov: f32) {
        self.lens.set_field_of_view(fov);
        self.lens_changed();
    }

    /// Horizontal field of view, in radians.
    #[must_use]
    pub fn horizontal_field_of_view(&self) -> f32 {
        self.lens.horizontal_field_of_view()
    }

    /// Set the horizontal field of view through the vertical one.
    pub fn set_horizontal_field_of_view(&mut self, hfov: f32) {
        let fov = 2.0 * ((hfov / 2.0).tan() / self.aspect_ratio()).atan();
        self.set_field_of_view(fov);
    }

    /// Screen axis convention.
    #[must_use]
    pub fn handedness(&self) -> Handedness {
        self.lens.handedness
    }

    /// Whether the screen Y axis points down in the scene.
    #[must_use]
    pub fn is_left_handed(&self) -> bool {
        self.lens.is_left_handed()
    }

    /// Set the screen axis convention.
    pub fn set_handedness(&mut self, handedness: Handedness) {
        self.lens.handedness = handedness;
        self.lens_changed();
    }

    /// Flip the screen Y axis.
    pub fn flip(&mut self) {
        self.set_handedness(self.lens.handedness.flipped());
    }

    /// Near plane coefficient.
    #[must_use]
    pub fn z_near_coefficient(&self) -> f32 {
        self.lens.z_near_coefficient
    }

    /// Set the near plane coefficient.
    pub fn set_z_near_coefficient(&mut self, coefficient: f32) {
        self.lens.z_near_coefficient = coefficient;
        self.lens_changed();
    }

    /// Clipping coefficient.
    #[must_use]
    pub fn z_clipping_coefficient(&self) -> f32 {
        self.lens.z_clipping_coefficient
    }

    /// Set the clipping coefficient.
    pub fn set_z_clipping_coefficient(&mut self, coefficient: f32) {
        self.lens.z_clipping_coefficient = coefficient;
        self.lens_changed();
    }

    /// Near clipping distance, in eye units.
    #[must_use]
    pub fn z_near(&self) -> f32 {
        self.model().z_near(&self.lens, &self.pose())
    }

    /// Far clipping distance, in eye units.
    #[must_use]
    pub fn z_far(&self) -> f32 {
        self.model().z_far(&self.lens, &self.pose())
    }

    // ── Scene ───────────────────────────────────────────────────────────

    /// Radius of the scene's bounding ball.
    #[must_use]
    pub fn scene_radius(&self) -> f32 {
        self.lens.scene_radius
    }

    /// Set the scene radius. Also resets the fly speed to 1% of it.
    /// Non-positive radii are ignored.
    pub fn set_scene_radius(&mut self, radius: f32) {
        if radius <= 0.0 {
            log::warn!("scene radius must be positive, {radius} ignored");
            return;
        }
        self.lens.scene_radius = radius;
        self.frame.base_mut().set_fly_speed(FLY_SPEED_RATIO * radius);
        self.lens_changed();
    }

    /// Center of the scene's bounding ball.
    #[must_use]
    pub fn scene_center(&self) -> Vec3 {
        self.lens.scene_center
    }

    /// Set the scene center. Planar eyes keep it in the `z = 0` plane.
    pub fn set_scene_center(&mut self, center: Vec3) {
        self.lens.scene_center = center;
        if self.is_2d() {
            self.lens.scene_center.z = 0.0;
        }
        self.lens_changed();
    }

    /// Set center and radius from an axis-aligned box.
    pub fn set_scene_bounding_box(&mut self, min: Vec3, max: Vec3) {
        self.set_scene_center((min + max) / 2.0);
        self.set_scene_radius(0.5 * (max - min).length());
    }

    /// Point rotations pivot on.
    #[must_use]
    pub fn anchor(&self) -> Vec3 {
        self.frame.anchor()
    }

    /// Set the pivot. An orthographic eye rescales so that the visible
    /// extent does not jump.
    pub fn set_anchor(&mut self, anchor: Vec3) {
        let pose = self.pose();
        let previous = (pose.coordinates_of(self.anchor()).z).abs();
        self.frame.set_anchor(anchor);
        if self.lens.kind == EyeKind::Orthographic3D {
            let current = (pose.coordinates_of(self.anchor()).z).abs();
            if !geom::is_zero(previous) && !geom::is_zero(current) {
                self.lens.ortho_coefficient *= previous / current;
            }
        }
        self.lens_changed();
    }

    /// Distance from the eye to the scene center along the view axis.
    #[must_use]
    pub fn distance_to_scene_center(&self) -> f32 {
        self.distance_along_view(self.lens.scene_center)
    }

    /// Distance from the eye to the anchor along the view axis.
    #[must_use]
    pub fn distance_to_anchor(&self) -> f32 {
        self.distance_along_view(self.anchor())
    }

    fn distance_along_view(&self, point: Vec3) -> f32 {
        let frame = self.frame_ref().borrow();
        (frame.position() - point).dot(frame.z_axis()).abs()
    }

    // ── Matrices ────────────────────────────────────────────────────────

    /// Recompute the view matrix from the frame pose.
    pub fn compute_view(&mut self) {
        self.view = self.model().view_matrix(&self.pose());
    }

    /// Recompute the projection matrix from the lens and pose.
    pub fn compute_projection(&mut self) {
        self.projection =
            self.model()
                .projection_matrix(&self.lens, &self.pose(), self.anchor());
    }

    /// Recompute both matrices.
    pub fn compute_matrices(&mut self) {
        self.compute_view();
        self.compute_projection();
    }

    /// Cached world to eye matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Cached eye to clip matrix.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Snapshot of the cached matrices and parameters.
    #[must_use]
    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint {
            lens: self.lens,
            pose: self.pose(),
            anchor: self.anchor(),
            view: self.view,
            projection: self.projection,
        }
    }

    /// Screen coordinates of a world point under the cached matrices.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        self.viewpoint().project(world)
    }

    /// World point at screen coordinates under the cached matrices.
    #[must_use]
    pub fn unproject(&self, screen: Vec3) -> Option<Vec3> {
        self.viewpoint().unproject(screen)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// World direction the eye looks at.
    #[must_use]
    pub fn view_direction(&self) -> Vec3 {
        self.model().view_direction(&self.pose())
    }

    /// World direction of the screen's up axis.
    #[must_use]
    pub fn up_vector(&self) -> Vec3 {
        self.frame_ref().borrow().y_axis()
    }

    /// World direction of the screen's right axis.
    #[must_use]
    pub fn right_vector(&self) -> Vec3 {
        self.frame_ref().borrow().x_axis()
    }

    /// Half extents of the visible region at the anchor, in world units.
    #[must_use]
    pub fn boundary_width_height(&self) -> [f32; 2] {
        self.model()
            .boundary_width_height(&self.lens, &self.pose(), self.anchor())
    }

    /// World units covered by one pixel at `position`.
    #[must_use]
    pub fn pixel_scene_ratio(&self, position: Vec3) -> f32 {
        self.model()
            .pixel_scene_ratio(&self.lens, &self.pose(), self.anchor(), position)
    }

    /// World ray (origin, unit direction) through pixel `(x, y)`.
    #[must_use]
    pub fn convert_click_to_line(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        self.model()
            .convert_click_to_line(&self.lens, &self.pose(), self.anchor(), (x, y))
    }

    /// Scene point under a pixel. Planar eyes return the point in the
    /// `z = 0` plane; 3D eyes intersect the click ray with the plane through
    /// the scene center facing the eye, and fail when that plane is behind.
    #[must_use]
    pub fn point_under_pixel(&self, x: f32, y: f32) -> Option<Vec3> {
        let (origin, dir) = self.convert_click_to_line(x, y);
        if self.is_2d() {
            return Some(Vec3::new(origin.x, origin.y, 0.0));
        }
        let vd = self.view_direction();
        let along = dir.dot(vd);
        if geom::is_zero(along) {
            return None;
        }
        let t = (self.lens.scene_center - origin).dot(vd) / along;
        (t > 0.0).then(|| origin + dir * t)
    }

    // ── Boundary ────────────────────────────────────────────────────────

    /// Whether boundary planes follow the eye automatically.
    #[must_use]
    pub fn are_boundary_equations_enabled(&self) -> bool {
        self.auto_boundary
    }

    /// Let boundary queries refresh the planes when the eye moved.
    pub fn enable_boundary_equations(&mut self) {
        self.auto_boundary = true;
    }

    /// Freeze the boundary planes.
    pub fn disable_boundary_equations(&mut self) {
        self.auto_boundary = false;
    }

    fn current_stamp(&self) -> BoundaryStamp {
        BoundaryStamp {
            pose: self.frame_ref().borrow().pose_stamp(),
            revision: self.revision,
            anchor: self.anchor(),
        }
    }

    /// Recompute the boundary planes if the eye changed since the last
    /// computation, and return them.
    pub fn compute_boundary_equations(&mut self) -> &Boundary {
        let stamp = self.current_stamp();
        if self.boundary_stamp != Some(stamp) {
            let planes =
                self.model()
                    .boundary_planes(&self.lens, &self.pose(), self.anchor());
            self.boundary = Boundary::new(planes);
            self.boundary_stamp = Some(stamp);
            log::trace!("boundary equations recomputed");
        }
        &self.boundary
    }

    /// Boundary used by the visibility queries. With automatic updates
    /// disabled the cached planes are returned as they are.
    fn boundary_for(&mut self, query: &str) -> &Boundary {
        if self.auto_boundary {
            return self.compute_boundary_equations();
        }
        if self.boundary_stamp != Some(self.current_stamp()) {
            log::warn!(
                "{query}: boundary equations may be outdated, enable automatic updates"
            );
        }
        &self.boundary
    }

    /// Plane coefficients, one `[a, b, c, d]` row per plane.
    pub fn boundary_equations(&mut self) -> Vec<[f32; 4]> {
        self.boundary_for("boundary_equations").equations()
    }

    /// Signed distance from `point` to boundary plane `index`: positive
    /// outside. `None` for an index out of range.
    pub fn distance_to_boundary(&mut self, index: usize, point: Vec3) -> Option<f32> {
        self.boundary_for("distance_to_boundary")
            .distance_to_boundary(index, point)
    }

    /// Whether `point` is inside the visible region.
    pub fn point_is_visible(&mut self, point: Vec3) -> bool {
        self.boundary_for("point_is_visible").contains_point(point)
    }

    /// Classify a ball against the visible region.
    pub fn ball_is_visible(&mut self, center: Vec3, radius: f32) -> Visibility {
        self.boundary_for("ball_is_visible")
            .ball_visibility(center, radius)
    }

    /// Classify an axis-aligned box against the visible region.
    pub fn box_is_visible(&mut self, p1: Vec3, p2: Vec3) -> Visibility {
        self.boundary_for("box_is_visible").box_visibility(p1, p2)
    }

    // ── Placement ───────────────────────────────────────────────────────

    /// Turn (3D) or move (2D) the eye so that it looks at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.model()
            .look_at(&mut self.frame_ref().borrow_mut(), target);
    }

    /// Point the eye along `direction`, keeping its X axis horizontal.
    pub fn set_view_direction(&mut self, direction: Vec3) {
        if self.is_2d() {
            log::warn!("a planar eye always looks along the Z axis");
            return;
        }
        CameraModel::set_view_direction(&mut self.frame_ref().borrow_mut(), direction);
    }

    /// Rotate the eye so that its up axis matches `up`. Unless `no_move`,
    /// the eye orbits the anchor.
    pub fn set_up_vector(&mut self, up: Vec3, no_move: bool) {
        let anchor = self.anchor();
        self.model()
            .set_up_vector(&mut self.frame_ref().borrow_mut(), anchor, up, no_move);
        self.frame.base_mut().update_fly_up_vector();
    }

    /// Place the eye so that the ball fills the viewport.
    pub fn fit_ball(&mut self, center: Vec3, radius: f32) {
        let anchor = self.anchor();
        self.model().fit_ball(
            &self.lens,
            &mut self.frame_ref().borrow_mut(),
            anchor,
            center,
            radius,
        );
    }

    /// Place the eye so that the box fills the viewport.
    pub fn fit_bounding_box(&mut self, min: Vec3, max: Vec3) {
        let diameter = (max - min).abs().max_element();
        self.fit_ball((min + max) / 2.0, 0.5 * diameter);
    }

    /// Place the eye so that a pixel rectangle fills the viewport.
    pub fn fit_screen_region(&mut self, rect: Rect) {
        let mut frame = self.frame_ref().borrow_mut();
        self.fit_screen_region_on(&mut frame, rect);
    }

    fn fit_screen_region_on(&self, frame: &mut Frame, rect: Rect) {
        match self.lens.kind {
            EyeKind::Window2D => {
                let (center, _) = WindowModel.convert_click_to_line(
                    &self.lens,
                    &Pose::of(frame),
                    self.anchor(),
                    (rect.center_x(), rect.center_y()),
                );
                WindowModel::fit_screen_region(&self.lens, frame, rect, center);
            }
            _ => CameraModel::fit_screen_region(&self.lens, frame, self.anchor(), rect),
        }
    }

    /// Fit the scene's bounding ball.
    pub fn show_entire_scene(&mut self) {
        self.fit_ball(self.lens.scene_center, self.lens.scene_radius);
    }

    /// Move the eye so that the scene center is at the middle of the
    /// screen, keeping the orientation.
    pub fn center_scene(&mut self) {
        let center = self.lens.scene_center;
        let direction = self.view_direction();
        let mut frame = self.frame_ref().borrow_mut();
        let position = frame.position();
        let along = geom::project_on_axis(center - position, direction);
        frame.set_position(center - along);
    }

    /// Move the anchor to the scene point under a pixel. Returns whether a
    /// point was found.
    pub fn set_anchor_from_pixel(&mut self, x: f32, y: f32) -> bool {
        match self.point_under_pixel(x, y) {
            Some(point) => {
                self.set_anchor(point);
                self.frame.show_anchor_hint();
                true
            }
            None => false,
        }
    }

    // ── Grabber ─────────────────────────────────────────────────────────

    /// Advance the eye frame's continuations and the running paths.
    pub fn update(&mut self, now: Tick) {
        self.frame.update(now);
        self.update_paths(now);
    }

    fn perform_click(&mut self, kind: ClickAction, x: f32, y: f32) {
        match kind {
            ClickAction::CenterFrame => self.center_scene(),
            ClickAction::AlignFrame => self
                .frame_ref()
                .borrow_mut()
                .align_with_frame(None, true, ALIGN_THRESHOLD),
            ClickAction::ZoomOnPixel => {
                let _ = self.interpolate_to_zoom_on_pixel(x, y);
            }
            ClickAction::AnchorFromPixel => {
                if !self.set_anchor_from_pixel(x, y) {
                    log::debug!("no scene point under pixel ({x}, {y})");
                }
            }
            ClickAction::Custom => {}
        }
    }

    /// Pixel rectangle of the zoom-on-region gesture in progress.
    #[must_use]
    pub fn zoom_region(&self) -> Option<Rect> {
        self.zoom_region.map(|[a, b]| Rect::from_corners(a, b))
    }

    fn zoom_on_region_gesture(&mut self, event: &Event) {
        let Some(pointer) = event.pointer() else {
            return;
        };
        let corners = match self.zoom_region {
            Some([start, _]) if !event.is_fired() => [start, pointer],
            _ => [pointer, pointer],
        };
        if event.is_flushed() {
            self.zoom_region = None;
            let rect = Rect::from_corners(corners[0], corners[1]);
            if rect.width < 1.0 || rect.height < 1.0 {
                log::debug!("zoom region too small, ignored");
                return;
            }
            self.interpolate_to_zoom_on_region(rect);
        } else {
            self.zoom_region = Some(corners);
        }
    }

    /// Run the bound action on `event`. Click actions and region zooms are
    /// handled here, every other gesture by the eye frame.
    pub fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        match (InteractiveGrabber::action(&self.frame), event) {
            (Some(Action::Click(kind)), Event::Click(click)) if kind != ClickAction::Custom => {
                self.perform_click(kind, click.x, click.y);
            }
            (Some(action), Event::Dof2(_) | Event::Dof3(_) | Event::Dof6(_))
                if action.motion() == Some(MotionAction::ZoomOnRegion) =>
            {
                self.zoom_on_region_gesture(event);
            }
            _ => self.frame.perform_interaction(event, view),
        }
    }

    /// Apply a keyboard-level action.
    pub fn perform_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::MoveLeft => self.move_in_screen(-1.0, 0.0),
            KeyAction::MoveRight => self.move_in_screen(1.0, 0.0),
            KeyAction::MoveUp => self.move_in_screen(0.0, 1.0),
            KeyAction::MoveDown => self.move_in_screen(0.0, -1.0),
            KeyAction::InterpolateToFitScene => self.interpolate_to_fit_scene(),
            KeyAction::ShowAll => self.show_entire_scene(),
            KeyAction::ToggleEyeKind => self.toggle_kind(),
            KeyAction::AddKeyFrameToPath(key) => self.add_key_frame_to_path(key),
            KeyAction::PlayPath(key) => self.play_path(key),
            KeyAction::DeletePath(key) => self.delete_path(key),
        }
    }

    fn move_in_screen(&mut self, x: f32, y: f32) {
        let step = KEY_MOVE_STEP * self.frame.base().fly_speed();
        let y = if self.is_left_handed() { -y } else { y };
        let local = Vec3::new(x * step, y * step, 0.0);
        let mut frame = self.frame_ref().borrow_mut();
        let world = if self.is_2d() {
            Pose::of(&frame).inverse_transform_of(local)
        } else {
            frame.orientation() * local
        };
        frame.translate_world(world);
    }
}

impl Grabber for Eye {
    /// The eye is never picked; agents reach it as a default grabber.
    fn check_if_grabs_input(&self, _event: &Event, _view: &Viewpoint) -> bool {
        false
    }

    fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        Self::perform_interaction(self, event, view);
    }

    fn update(&mut self, now: Tick) {
        Self::update(self, now);
    }
}

impl InteractiveGrabber for Eye {
    fn action(&self) -> Option<Action> {
        InteractiveGrabber::action(&self.frame)
    }

    fn set_action(&mut self, action: Option<Action>) {
        if action.and_then(|a| a.motion()) != Some(MotionAction::ZoomOnRegion) {
            self.zoom_region = None;
        }
        self.frame.set_action(action);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use super::*;
    use crate::event::{Button, ClickEvent, Dof2Event};
    use crate::interactive::Dof2Action;

    fn scenario_eye() -> Eye {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.set_field_of_view(FRAC_PI_3);
        eye.set_scene_radius(100.0);
        eye.set_position(Vec3::new(0.0, 0.0, 300.0));
        eye.look_at(Vec3::ZERO);
        eye.compute_matrices();
        eye
    }

    #[test]
    fn origin_projects_near_the_viewport_center() {
        let eye = scenario_eye();
        let screen = eye.project(Vec3::ZERO).unwrap();
        assert!((screen.x - 400.0).abs() < 0.5);
        assert!((screen.y - 300.0).abs() < 0.5);
        assert!(screen.z > 0.0 && screen.z < 1.0);
        let back = eye.unproject(screen).unwrap();
        assert!(back.abs_diff_eq(Vec3::ZERO, 1e-2));
    }

    #[test]
    fn window_round_trips_screen_points() {
        let mut eye = Eye::new(EyeKind::Window2D);
        eye.compute_matrices();
        let screen = Vec3::new(120.0, 480.0, 0.5);
        let world = eye.unproject(screen).unwrap();
        let again = eye.project(world).unwrap();
        assert!(again.abs_diff_eq(screen, 1e-2));
    }

    #[test]
    fn entire_scene_is_visible_after_showing_it() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.show_entire_scene();
        assert_ne!(eye.ball_is_visible(Vec3::ZERO, 100.0), Visibility::Invisible);
        assert_eq!(eye.ball_is_visible(Vec3::ZERO, 10.0), Visibility::Visible);
        assert!(eye.point_is_visible(Vec3::ZERO));
        assert!(!eye.point_is_visible(eye.position() + eye.view_direction() * -10.0));
    }

    #[test]
    fn visibility_is_monotonic() {
        let mut eye = scenario_eye();
        let behind = Vec3::new(0.0, 0.0, 400.0);
        assert!(!eye.point_is_visible(behind));
        assert_eq!(eye.ball_is_visible(behind, 1.0), Visibility::Invisible);
        let count = eye.boundary_equations().len();
        assert_eq!(count, 6);
        for i in 0..count {
            let d = eye.distance_to_boundary(i, Vec3::ZERO).unwrap();
            assert!(d < -10.0);
        }
        assert_ne!(eye.ball_is_visible(Vec3::ZERO, 5.0), Visibility::Invisible);
    }

    #[test]
    fn planar_eye_has_four_planes() {
        let mut eye = Eye::new(EyeKind::Window2D);
        assert_eq!(eye.boundary_equations().len(), 4);
        let outside = Vec3::new(10_000.0, 0.0, 0.0);
        assert!(!eye.point_is_visible(outside));
        assert_eq!(
            eye.box_is_visible(Vec3::splat(-1.0), Vec3::splat(1.0)),
            Visibility::Visible
        );
    }

    #[test]
    fn frozen_boundary_keeps_old_planes() {
        let mut eye = scenario_eye();
        let before = eye.boundary_equations();
        eye.disable_boundary_equations();
        eye.set_position(Vec3::new(0.0, 0.0, 1000.0));
        assert_eq!(eye.boundary_equations(), before);
        eye.enable_boundary_equations();
        assert_ne!(eye.boundary_equations(), before);
    }

    #[test]
    fn invalid_scene_radius_is_ignored() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.set_scene_radius(-5.0);
        assert!((eye.scene_radius() - 100.0).abs() < f32::EPSILON);
        eye.set_scene_radius(50.0);
        assert!((eye.frame().base().fly_speed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_screen_size_is_clamped() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.set_screen_width_and_height(0, 0);
        assert_eq!((eye.screen_width(), eye.screen_height()), (1, 1));
    }

    #[test]
    fn center_scene_puts_center_on_the_view_axis() {
        let mut eye = scenario_eye();
        eye.set_position(Vec3::new(40.0, -20.0, 300.0));
        eye.center_scene();
        assert!(eye.position().abs_diff_eq(Vec3::new(0.0, 0.0, 300.0), 1e-3));
    }

    #[test]
    fn anchor_from_pixel_hits_the_center_plane() {
        let mut eye = scenario_eye();
        assert!(eye.set_anchor_from_pixel(400.0, 300.0));
        assert!(eye.anchor().abs_diff_eq(Vec3::ZERO, 1e-2));
        assert!(eye.frame().anchor_hint());
    }

    #[test]
    fn click_action_centers_the_scene() {
        let mut eye = scenario_eye();
        eye.set_position(Vec3::new(40.0, 0.0, 300.0));
        eye.set_action(Some(Action::Click(ClickAction::CenterFrame)));
        let view = eye.viewpoint();
        let click = Event::from(ClickEvent::new(10.0, 10.0, Button::Left));
        eye.perform_interaction(&click, &view);
        assert!(eye.position().x.abs() < 1e-3);
    }

    #[test]
    fn zoom_on_region_fits_the_dragged_rectangle() {
        let mut eye = scenario_eye();
        let Some(action) = Dof2Action::new(MotionAction::ZoomOnRegion) else {
            unreachable!("zoom on region is a 2-DOF action");
        };
        eye.set_action(Some(Action::Dof2(action)));
        let view = eye.viewpoint();
        let start = Event::from(Dof2Event::absolute(300.0, 200.0).fired());
        let end = Event::from(Dof2Event::absolute(500.0, 400.0).flushed());
        eye.perform_interaction(&start, &view);
        assert!(eye.zoom_region().is_some());
        eye.perform_interaction(&end, &view);
        assert!(eye.zoom_region().is_none());
        assert!(eye.any_interpolation_is_started());
    }

    #[test]
    fn clone_is_independent() {
        let eye = scenario_eye();
        let mut copy = eye.clone();
        copy.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(eye.position().abs_diff_eq(Vec3::new(0.0, 0.0, 300.0), 1e-5));
        assert_eq!(copy.view(), eye.view());
    }

    #[test]
    fn kind_toggles_between_3d_projections_only() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.toggle_kind();
        assert_eq!(eye.kind(), EyeKind::Orthographic3D);
        eye.set_kind(EyeKind::Window2D);
        assert_eq!(eye.kind(), EyeKind::Orthographic3D);
    }

    #[test]
    fn up_vector_is_applied() {
        let mut eye = scenario_eye();
        eye.set_up_vector(Vec3::X, false);
        assert!(eye.up_vector().abs_diff_eq(Vec3::X, 1e-4));
    }
}
