//! The eye's own interactive frame.
//!
//! Moving the eye is the inverse of moving the scene: a drag to the right
//! shifts the eye to the left. Rotations pivot on the anchor instead of the
//! frame origin. Kinds without an eye-specific rule fall back to the plain
//! tables, applied to the eye frame.

use glam::{Quat, Vec3};

use super::{dispatch, Action, Interaction, InteractiveFrame, MotionAction};
use crate::agent::{Grabber, InteractiveGrabber};
use crate::event::{Dof1Event, Dof2Event, Dof3Event, Dof6Event, Event, MotionMeta};
use crate::eye::{EyeKind, Viewpoint};
use crate::frame::{Frame, FrameRef};
use crate::geom;
use crate::timing::{Tick, TimerTask};

/// How long visual hints stay up, in milliseconds.
pub const HINT_DURATION: u64 = 1000;

/// Wheel-to-distance coefficient of the eye zoom.
const WHEEL_ZOOM_COEF: f32 = 8e-4;

/// Interactive frame of an eye.
#[derive(Debug)]
pub struct InteractiveEyeFrame {
    inner: InteractiveFrame,
    anchor: Vec3,
    cad_axis: Vec3,
    anchor_hint: bool,
    zoom_hint: Option<Vec3>,
    hint_timer: TimerTask,
}

impl InteractiveEyeFrame {
    /// Make `frame` the interactive frame of an eye.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self::from_ref(FrameRef::new(frame))
    }

    /// Make an already shared frame the interactive frame of an eye.
    #[must_use]
    pub fn from_ref(frame: FrameRef) -> Self {
        Self {
            inner: InteractiveFrame::from_ref(frame),
            anchor: Vec3::ZERO,
            cad_axis: Vec3::Z,
            anchor_hint: false,
            zoom_hint: None,
            hint_timer: TimerTask::new(),
        }
    }

    /// Independent copy driving a clone of the eye frame.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let frame = FrameRef::new(self.frame().borrow().clone());
        Self {
            inner: self.inner.duplicate(frame),
            anchor: self.anchor,
            cad_axis: self.cad_axis,
            anchor_hint: false,
            zoom_hint: None,
            hint_timer: TimerTask::new(),
        }
    }

    /// Settings and continuation state shared with plain frames.
    #[must_use]
    pub fn base(&self) -> &InteractiveFrame {
        &self.inner
    }

    /// Mutable access to the shared settings.
    pub fn base_mut(&mut self) -> &mut InteractiveFrame {
        &mut self.inner
    }

    /// Shared handle to the eye frame.
    #[must_use]
    pub fn frame(&self) -> &FrameRef {
        self.inner.frame()
    }

    /// World point rotations pivot on.
    #[must_use]
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Set the pivot. Planar frames keep it in the `z = 0` plane.
    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
        if self.frame().borrow().dimension().is_2d() {
            self.anchor.z = 0.0;
        }
    }

    /// World axis of CAD rotations.
    #[must_use]
    pub fn cad_axis(&self) -> Vec3 {
        self.cad_axis
    }

    /// Set the CAD axis. Zero vectors are ignored.
    pub fn set_cad_axis(&mut self, axis: Vec3) {
        if let Some(axis) = axis.try_normalize() {
            self.cad_axis = axis;
        }
    }

    /// Whether the anchor hint is showing.
    #[must_use]
    pub fn anchor_hint(&self) -> bool {
        self.anchor_hint
    }

    /// World point of the zoom hint, while it is showing.
    #[must_use]
    pub fn zoom_hint(&self) -> Option<Vec3> {
        self.zoom_hint
    }

    /// Show the anchor hint for [`HINT_DURATION`].
    pub fn show_anchor_hint(&mut self) {
        self.anchor_hint = true;
        self.hint_timer.run_once(HINT_DURATION);
    }

    /// Show the zoom hint at `point` for [`HINT_DURATION`].
    pub fn show_zoom_hint(&mut self, point: Vec3) {
        self.zoom_hint = Some(point);
        self.hint_timer.run_once(HINT_DURATION);
    }

    /// Advance hints and continuations. Spins pivot on the anchor.
    pub fn update(&mut self, now: Tick) {
        if self.hint_timer.poll(now) {
            self.anchor_hint = false;
            self.zoom_hint = None;
        }
        self.inner.update_about(now, Some(self.anchor));
    }

    /// Run the bound action on `event`.
    pub fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        let Some(action) = self.inner.action else {
            return;
        };
        if super::is_motionless_release(event, action) {
            self.inner.end_gesture(action);
        } else if let Some(interaction) = Interaction::new(event, action) {
            self.execute(&interaction, view);
        }
        if event.is_flushed() {
            self.inner.direction_lock = None;
        }
    }

    /// Run a reduced interaction. Click actions belong to the eye and are
    /// ignored here.
    pub(crate) fn execute(&mut self, interaction: &Interaction, view: &Viewpoint) {
        match interaction {
            Interaction::Click(..) => {}
            Interaction::Custom(event) => self.inner.perform_custom_action(event, view),
            _ if view.is_2d() => self.execute_2d(interaction, view),
            _ => self.execute_3d(interaction, view),
        }
    }

    fn spin_about_anchor(&mut self, rotation: Quat, meta: &MotionMeta) {
        self.inner.set_spinning_rotation(rotation);
        self.inner.spin_or_start(meta, Some(self.anchor));
    }

    // ── 3D ──────────────────────────────────────────────────────────────

    fn execute_3d(&mut self, interaction: &Interaction, view: &Viewpoint) {
        match *interaction {
            Interaction::Dof1 { event, kind, wheel } => {
                if !self.dof1_3d(&event, kind, wheel, view) {
                    dispatch::execute_3d(&mut self.inner, interaction, view);
                }
            }
            Interaction::Dof2(event, kind) => {
                if !self.dof2_3d(&event, kind, view) {
                    dispatch::execute_3d(&mut self.inner, interaction, view);
                }
            }
            Interaction::Dof3(event, kind) => self.dof3_3d(&event, kind, view),
            Interaction::Dof6(event, kind) => self.dof6_3d(&event, kind, view),
            Interaction::Click(..) | Interaction::Custom(_) => {}
        }
    }

    /// Screen displacement to scene units at the anchor's depth.
    fn fit_to_anchor(&self, t: Vec3, view: &Viewpoint) -> Vec3 {
        match view.kind() {
            EyeKind::Perspective3D => {
                let depth = view.pose.coordinates_of(self.anchor).z * view.pose.magnitude.z;
                t * (2.0 * (view.field_of_view() / 2.0).tan() * depth.abs()
                    / view.screen_height())
            }
            EyeKind::Orthographic3D | EyeKind::Window2D => {
                let [w, h] = view.boundary_width_height();
                Vec3::new(
                    t.x * 2.0 * w / view.screen_width(),
                    t.y * 2.0 * h / view.screen_height(),
                    t.z,
                )
            }
        }
    }

    fn translate_in_eye(&self, t: Vec3, view: &Viewpoint) {
        let t = self.fit_to_anchor(t, view) * self.inner.translation_sensitivity();
        self.frame()
            .borrow_mut()
            .translate_world(view.pose.orientation * t);
    }

    fn screen_y(dy: f32, view: &Viewpoint) -> f32 {
        if view.is_left_handed() {
            -dy
        } else {
            dy
        }
    }

    /// Eye-specific one-axis rules. `false` defers to the plain table.
    fn dof1_3d(&self, e: &Dof1Event, kind: MotionAction, wheel: bool, view: &Viewpoint) -> bool {
        match kind {
            MotionAction::Scale => {
                dispatch::scale_by_delta(&self.inner, self.inner.delta1(e, wheel), true, view);
            }
            MotionAction::Zoom => {
                let depth = view.pose.coordinates_of(self.anchor).z * view.pose.magnitude.z;
                let coef = depth.abs().max(0.2 * view.lens.scene_radius);
                let delta = if wheel {
                    coef * e.delta() * -self.inner.wheel_sensitivity() * WHEEL_ZOOM_COEF
                } else {
                    -coef * e.delta() / view.screen_height()
                };
                self.frame()
                    .borrow_mut()
                    .translate_world(view.pose.orientation * Vec3::new(0.0, 0.0, delta));
            }
            _ => return false,
        }
        true
    }

    /// Eye-specific two-axis rules. `false` defers to the plain table.
    fn dof2_3d(&mut self, e: &Dof2Event, kind: MotionAction, view: &Viewpoint) -> bool {
        match kind {
            MotionAction::Rotate | MotionAction::CadRotate | MotionAction::ScreenRotate
                if !e.relative =>
            {
                log::warn!("{kind} needs relative events");
            }
            MotionAction::Rotate => {
                let Some(center) = view.project(self.anchor) else {
                    return true;
                };
                let q = self.inner.deformed_ball_quaternion(e, center.x, center.y, view);
                self.spin_about_anchor(q, &e.meta);
            }
            MotionAction::CadRotate => {
                let Some(center) = view.project(self.anchor) else {
                    return true;
                };
                let q = self.cad_quaternion(e, center.x, center.y, view);
                self.spin_about_anchor(q, &e.meta);
            }
            MotionAction::ScreenRotate => {
                let Some(center) = view.project(self.anchor) else {
                    return true;
                };
                let angle = (e.y - center.y).atan2(e.x - center.x)
                    - (e.prev_y() - center.y).atan2(e.prev_x() - center.x);
                let angle = if view.is_left_handed() { -angle } else { angle };
                self.spin_about_anchor(geom::axis_angle(Vec3::Z, angle), &e.meta);
                self.inner.update_fly_up_vector();
            }
            MotionAction::ScreenTranslate => {
                let t = match self.inner.original_direction(e) {
                    1 => Vec3::new(-e.delta_x(), 0.0, 0.0),
                    -1 => Vec3::new(0.0, Self::screen_y(e.delta_y(), view), 0.0),
                    _ => return true,
                };
                self.translate_in_eye(t, view);
            }
            MotionAction::Translate => {
                let t = Vec3::new(-e.delta_x(), Self::screen_y(e.delta_y(), view), 0.0);
                self.translate_in_eye(t, view);
            }
            _ => return false,
        }
        true
    }

    fn dof3_3d(&self, e: &Dof3Event, kind: MotionAction, view: &Viewpoint) {
        let [dx, dy, dz] = e.deltas();
        match kind {
            MotionAction::RotateXyz => {
                let q = geom::from_euler_angles(-dx, -dy, dz);
                self.frame().borrow_mut().rotate(q);
            }
            MotionAction::TranslateXyz => {
                self.translate_in_eye(Vec3::new(-dx, Self::screen_y(dy, view), -dz), view);
            }
            _ => dispatch::unsupported(kind, view),
        }
    }

    fn dof6_3d(&self, e: &Dof6Event, kind: MotionAction, view: &Viewpoint) {
        if kind != MotionAction::TranslateXyzRotateXyz {
            dispatch::unsupported(kind, view);
            return;
        }
        let [dx, dy, dz] = e.translation_deltas();
        self.translate_in_eye(Vec3::new(-dx, Self::screen_y(dy, view), -dz), view);
        let [rx, ry, rz] = e.rotation_deltas();
        self.frame()
            .borrow_mut()
            .rotate(geom::from_euler_angles(-rx, -ry, rz));
    }

    /// Rotation about the CAD axis (horizontal drag) composed with a
    /// rotation about the eye's X axis (vertical drag).
    fn cad_quaternion(&self, e: &Dof2Event, cx: f32, cy: f32, view: &Viewpoint) -> Quat {
        let s = self.inner.rotation_sensitivity();
        let left = view.is_left_handed();
        let vertical = |y: f32| if left { y - cy } else { cy - y };
        let px = s * (e.prev_x() - cx) / view.screen_width();
        let py = s * vertical(e.prev_y()) / view.screen_height();
        let dx = s * (e.x - cx) / view.screen_width();
        let dy = s * vertical(e.y) / view.screen_height();

        let axis = view.pose.orientation.inverse() * self.cad_axis;
        let world_angle = s * if left { dx - px } else { px - dx };
        let x_angle = s * (dy - py);
        geom::axis_angle(axis, world_angle) * geom::axis_angle(Vec3::X, x_angle)
    }

    // ── 2D ──────────────────────────────────────────────────────────────

    fn execute_2d(&mut self, interaction: &Interaction, view: &Viewpoint) {
        let handled = match *interaction {
            Interaction::Dof1 { event, kind, wheel } => {
                if kind == MotionAction::Scale {
                    let delta = self.inner.delta1(&event, wheel);
                    dispatch::scale_by_delta(&self.inner, delta, true, view);
                    true
                } else {
                    false
                }
            }
            Interaction::Dof2(event, kind) => self.dof2_2d(&event, kind, view),
            Interaction::Dof6(event, MotionAction::TranslateXyzRotateXyz) => {
                let [dx, dy, _] = event.translation_deltas();
                self.translate_2d(dx, dy, view);
                let [rx, _, _] = event.rotation_deltas();
                let angle = rx * self.inner.rotation_sensitivity();
                let angle = if view.is_left_handed() { -angle } else { angle };
                let rotation = geom::axis_angle(Vec3::Z, angle);
                if event.relative {
                    self.spin_about_anchor(rotation, &event.meta);
                } else {
                    self.frame().borrow_mut().rotate(rotation);
                }
                true
            }
            _ => false,
        };
        if !handled {
            dispatch::execute_2d(&mut self.inner, interaction, view);
        }
    }

    /// Planar translation opposite to the drag, one pixel mapping to the
    /// eye's scaling.
    fn translate_2d(&self, dx: f32, dy: f32, view: &Viewpoint) {
        let t = Vec3::new(-dx, Self::screen_y(dy, view), 0.0) * self.inner.translation_sensitivity();
        let world = view.pose.inverse_transform_of(t);
        self.frame().borrow_mut().translate_world(world);
    }

    fn dof2_2d(&mut self, e: &Dof2Event, kind: MotionAction, view: &Viewpoint) -> bool {
        match kind {
            MotionAction::Rotate | MotionAction::ScreenRotate => {
                let Some(center) = view.project(self.anchor) else {
                    return true;
                };
                let angle = self.inner.screen_angle(e, center.x, center.y);
                let angle = if view.is_left_handed() { -angle } else { angle };
                let rotation = geom::axis_angle(Vec3::Z, angle);
                if e.relative {
                    self.spin_about_anchor(rotation, &e.meta);
                } else {
                    self.frame().borrow_mut().rotate(rotation);
                }
            }
            MotionAction::ScreenTranslate => match self.inner.original_direction(e) {
                1 => self.translate_2d(e.delta_x(), 0.0, view),
                -1 => self.translate_2d(0.0, e.delta_y(), view),
                _ => {}
            },
            MotionAction::Translate => self.translate_2d(e.delta_x(), e.delta_y(), view),
            _ => return false,
        }
        true
    }
}

impl Grabber for InteractiveEyeFrame {
    fn check_if_grabs_input(&self, event: &Event, view: &Viewpoint) -> bool {
        self.inner.check_if_grabs_input(event, view)
    }

    fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        Self::perform_interaction(self, event, view);
    }

    fn update(&mut self, now: Tick) {
        Self::update(self, now);
    }
}

impl InteractiveGrabber for InteractiveEyeFrame {
    fn action(&self) -> Option<Action> {
        self.inner.action
    }

    fn set_action(&mut self, action: Option<Action>) {
        self.inner.action = action;
    }
}
