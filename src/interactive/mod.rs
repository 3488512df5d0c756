//! Frames that respond to gestures.
//!
//! An [`InteractiveFrame`] wraps a shared [`FrameRef`] with everything a
//! gesture needs: the bound [`Action`], sensitivities, damping friction and
//! the spin/toss continuation state. Events arrive through the agent layer
//! together with a [`Viewpoint`] snapshot of the eye, then flow through the
//! planar or spatial dispatch table in [`dispatch`].
//!
//! [`InteractiveEyeFrame`] specializes the tables for the eye itself:
//! every gesture is inverted (the scene must follow the pointer while the
//! eye moves the other way) and rotations pivot on the eye's anchor.
//!
//! # Continuation
//!
//! Relative rotations seed a spin, fly actions seed a toss. With a
//! positive damping friction the seeded velocity decays by the friction
//! factor every period until it drops below a threshold. With zero
//! friction the step is applied once and nothing is scheduled.

pub mod action;
pub(crate) mod dispatch;
pub mod eye_frame;
pub mod motion;

use std::f32::consts::PI;
use std::fmt;

pub use action::{
    Action, ClickAction, Dof1Action, Dof2Action, Dof3Action, Dof6Action,
    Interaction, MotionAction,
};
pub use eye_frame::InteractiveEyeFrame;
use glam::{Quat, Vec3};
use motion::Inertia;

use crate::agent::{Grabber, InteractiveGrabber};
use crate::event::{Dof1Event, Dof2Event, Event, MotionMeta};
use crate::eye::{EyeKind, Viewpoint};
use crate::frame::{Frame, FrameRef};
use crate::geom;
use crate::timing::Tick;

/// Default pick window edge, in pixels.
pub const DEFAULT_GRAB_THRESHOLD: f32 = 20.0;

/// Cosine above which [`ClickAction::AlignFrame`] snaps two axes.
pub const ALIGN_THRESHOLD: f32 = 0.85;

/// Handler for [`MotionAction::Custom`] and [`ClickAction::Custom`].
pub type CustomHandler = Box<dyn FnMut(&mut Frame, &Event, &Viewpoint)>;

/// Whether `event` releases a gesture without moving. Custom handlers still
/// receive such releases.
pub(crate) fn is_motionless_release(event: &Event, action: Action) -> bool {
    event.is_flushed() && event.is_null() && action.motion() != Some(MotionAction::Custom)
}

/// A frame driven by gestures.
pub struct InteractiveFrame {
    frame: FrameRef,
    action: Option<Action>,

    rotation_sensitivity: f32,
    translation_sensitivity: f32,
    spinning_sensitivity: f32,
    wheel_sensitivity: f32,
    damping_friction: f32,
    fly_speed: f32,
    fly_up: Vec3,
    grab_threshold: f32,
    adaptive_grab_threshold: bool,

    spinning_rotation: Quat,
    spin: Inertia,
    tossing_direction: Vec3,
    toss: Inertia,
    /// Axis fixed by the first movement of a screen translation:
    /// `Some(true)` horizontal, `Some(false)` vertical.
    direction_lock: Option<bool>,

    custom: Option<CustomHandler>,
}

impl fmt::Debug for InteractiveFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveFrame")
            .field("frame", &self.frame)
            .field("action", &self.action)
            .field("damping_friction", &self.damping_friction)
            .field("spinning", &self.spin.is_active())
            .field("tossing", &self.toss.is_active())
            .finish_non_exhaustive()
    }
}

impl Default for InteractiveFrame {
    fn default() -> Self {
        Self::new(Frame::new())
    }
}

impl InteractiveFrame {
    /// Make `frame` interactive.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self::from_ref(FrameRef::new(frame))
    }

    /// Make an already shared frame interactive.
    #[must_use]
    pub fn from_ref(frame: FrameRef) -> Self {
        Self {
            frame,
            action: None,
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            spinning_sensitivity: 0.3,
            wheel_sensitivity: 20.0,
            damping_friction: 0.5,
            fly_speed: 1.0,
            fly_up: Vec3::Y,
            grab_threshold: DEFAULT_GRAB_THRESHOLD,
            adaptive_grab_threshold: false,
            spinning_rotation: Quat::IDENTITY,
            spin: Inertia::default(),
            tossing_direction: Vec3::ZERO,
            toss: Inertia::default(),
            direction_lock: None,
            custom: None,
        }
    }

    /// Shared handle to the underlying frame.
    #[must_use]
    pub fn frame(&self) -> &FrameRef {
        &self.frame
    }

    /// Interactive frame driving `frame` with this frame's settings. The
    /// bound action, continuations and custom handler are not carried.
    #[must_use]
    pub fn duplicate(&self, frame: FrameRef) -> Self {
        Self {
            rotation_sensitivity: self.rotation_sensitivity,
            translation_sensitivity: self.translation_sensitivity,
            spinning_sensitivity: self.spinning_sensitivity,
            wheel_sensitivity: self.wheel_sensitivity,
            damping_friction: self.damping_friction,
            fly_speed: self.fly_speed,
            fly_up: self.fly_up,
            grab_threshold: self.grab_threshold,
            adaptive_grab_threshold: self.adaptive_grab_threshold,
            ..Self::from_ref(frame)
        }
    }

    // ── Settings ────────────────────────────────────────────────────────

    /// Multiplier applied to rotation gestures.
    #[must_use]
    pub fn rotation_sensitivity(&self) -> f32 {
        self.rotation_sensitivity
    }

    /// Set the rotation multiplier.
    pub fn set_rotation_sensitivity(&mut self, sensitivity: f32) {
        self.rotation_sensitivity = sensitivity;
    }

    /// Multiplier applied to translation gestures.
    #[must_use]
    pub fn translation_sensitivity(&self) -> f32 {
        self.translation_sensitivity
    }

    /// Set the translation multiplier.
    pub fn set_translation_sensitivity(&mut self, sensitivity: f32) {
        self.translation_sensitivity = sensitivity;
    }

    /// Minimum gesture speed (pixels per millisecond) that starts a spin.
    #[must_use]
    pub fn spinning_sensitivity(&self) -> f32 {
        self.spinning_sensitivity
    }

    /// Set the minimum spin speed.
    pub fn set_spinning_sensitivity(&mut self, sensitivity: f32) {
        self.spinning_sensitivity = sensitivity;
    }

    /// Multiplier applied to wheel values.
    #[must_use]
    pub fn wheel_sensitivity(&self) -> f32 {
        self.wheel_sensitivity
    }

    /// Set the wheel multiplier.
    pub fn set_wheel_sensitivity(&mut self, sensitivity: f32) {
        self.wheel_sensitivity = sensitivity;
    }

    /// Fraction of the velocity lost at every continuation step.
    #[must_use]
    pub fn damping_friction(&self) -> f32 {
        self.damping_friction
    }

    /// Set the friction, clamped to `[0, 1]`.
    pub fn set_damping_friction(&mut self, friction: f32) {
        self.damping_friction = friction.clamp(0.0, 1.0);
    }

    /// Distance covered by one fly step, in scene units.
    #[must_use]
    pub fn fly_speed(&self) -> f32 {
        self.fly_speed
    }

    /// Set the fly step.
    pub fn set_fly_speed(&mut self, speed: f32) {
        self.fly_speed = speed;
    }

    /// World direction fly actions treat as "up".
    #[must_use]
    pub fn fly_up_vector(&self) -> Vec3 {
        self.fly_up
    }

    /// Set the fly up direction.
    pub fn set_fly_up_vector(&mut self, up: Vec3) {
        if let Some(up) = up.try_normalize() {
            self.fly_up = up;
        }
    }

    /// Make the frame's current Y axis the fly up direction.
    pub fn update_fly_up_vector(&mut self) {
        let up = self.frame.borrow().y_axis();
        self.set_fly_up_vector(up);
    }

    /// Pick window edge: pixels, or scene units when adaptive.
    #[must_use]
    pub fn grab_threshold(&self) -> f32 {
        self.grab_threshold
    }

    /// Whether the pick window scales with the frame on screen.
    #[must_use]
    pub fn adaptive_grab_threshold(&self) -> bool {
        self.adaptive_grab_threshold
    }

    /// Set the pick window edge. Negative thresholds are ignored.
    pub fn set_grab_threshold(&mut self, threshold: f32, adaptive: bool) {
        if threshold < 0.0 {
            log::warn!("negative grab threshold {threshold} ignored");
            return;
        }
        self.grab_threshold = threshold;
        self.adaptive_grab_threshold = adaptive;
    }

    /// Pick window edge in pixels under `view`.
    #[must_use]
    pub fn grab_threshold_pixels(&self, view: &Viewpoint) -> f32 {
        if !self.adaptive_grab_threshold {
            return self.grab_threshold;
        }
        let frame = self.frame.borrow();
        let ratio = view.pixel_scene_ratio(frame.position());
        if geom::is_zero(ratio) {
            self.grab_threshold
        } else {
            self.grab_threshold * frame.magnitude().x / ratio
        }
    }

    /// Install the handler run by custom actions.
    pub fn set_custom_handler(&mut self, handler: Option<CustomHandler>) {
        self.custom = handler;
    }

    /// Whether an action is currently bound.
    #[must_use]
    pub fn is_in_interaction(&self) -> bool {
        self.action.is_some()
    }

    // ── Picking ─────────────────────────────────────────────────────────

    /// Whether the event's pointer falls in the square pick window around
    /// the frame's projected origin. One-axis events never pick.
    #[must_use]
    pub fn check_if_grabs_input(&self, event: &Event, view: &Viewpoint) -> bool {
        let Some((x, y)) = event.pointer() else {
            return false;
        };
        let position = self.frame.borrow().position();
        let Some(projected) = view.project(position) else {
            return false;
        };
        let half = self.grab_threshold_pixels(view) / 2.0;
        (x - projected.x).abs() < half && (y - projected.y).abs() < half
    }

    // ── Spinning ────────────────────────────────────────────────────────

    /// Rotation applied at every spin step, in local coordinates.
    #[must_use]
    pub fn spinning_rotation(&self) -> Quat {
        self.spinning_rotation
    }

    /// Set the spin step.
    pub fn set_spinning_rotation(&mut self, rotation: Quat) {
        self.spinning_rotation = rotation.normalize();
    }

    /// Whether a spin continuation is registered.
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.spin.is_active()
    }

    /// Spin continuation period, if spinning.
    #[must_use]
    pub fn spin_period(&self) -> Option<u64> {
        self.spin.period()
    }

    /// Cancel the spin. Idempotent.
    pub fn stop_spinning(&mut self) {
        self.spin.stop();
    }

    /// Apply the spin step now, then seed a damped continuation unless
    /// the gesture was slower than the spinning sensitivity.
    pub fn start_spinning(&mut self, meta: &MotionMeta) {
        self.start_spinning_about(meta, None);
    }

    /// One spin step.
    pub fn spin(&mut self) {
        self.spin_about(None);
    }

    pub(crate) fn start_spinning_about(
        &mut self,
        meta: &MotionMeta,
        pivot: Option<Vec3>,
    ) {
        self.apply_spin(pivot);
        if meta.speed < self.spinning_sensitivity {
            self.spin.stop();
            return;
        }
        self.spin.start(meta);
    }

    pub(crate) fn spin_about(&mut self, pivot: Option<Vec3>) {
        if self.damping_friction > 0.0 {
            if self.spin.speed() == 0.0 {
                self.stop_spinning();
                return;
            }
            self.apply_spin(pivot);
            let ratio = self.spin.damp(self.damping_friction);
            let (axis, angle) = geom::to_axis_angle(self.spinning_rotation);
            self.spinning_rotation = geom::axis_angle(axis, angle * ratio);
        } else {
            self.apply_spin(pivot);
        }
    }

    /// Spin or apply once, depending on the friction.
    pub(crate) fn spin_or_start(&mut self, meta: &MotionMeta, pivot: Option<Vec3>) {
        if geom::is_zero(self.damping_friction) {
            self.stop_spinning();
            self.spin_about(pivot);
        } else {
            self.start_spinning_about(meta, pivot);
        }
    }

    fn apply_spin(&self, pivot: Option<Vec3>) {
        let mut frame = self.frame.borrow_mut();
        match pivot {
            Some(point) => frame.rotate_around_point(self.spinning_rotation, point),
            None => frame.rotate(self.spinning_rotation),
        }
    }

    // ── Tossing ─────────────────────────────────────────────────────────

    /// Translation applied at every toss step, in reference coordinates.
    #[must_use]
    pub fn tossing_direction(&self) -> Vec3 {
        self.tossing_direction
    }

    /// Set the toss step.
    pub fn set_tossing_direction(&mut self, direction: Vec3) {
        self.tossing_direction = direction;
    }

    /// Whether a toss continuation is registered.
    #[must_use]
    pub fn is_tossing(&self) -> bool {
        self.toss.is_active()
    }

    /// Cancel the toss. Idempotent.
    pub fn stop_tossing(&mut self) {
        self.toss.stop();
    }

    /// Apply the toss step now and seed a damped continuation.
    pub fn start_tossing(&mut self, meta: &MotionMeta) {
        self.apply_toss();
        self.toss.start(meta);
    }

    /// One toss step.
    pub fn toss(&mut self) {
        if self.damping_friction > 0.0 {
            if self.toss.speed() == 0.0 {
                self.stop_tossing();
                return;
            }
            self.apply_toss();
            let ratio = self.toss.damp(self.damping_friction);
            self.tossing_direction *= ratio;
        } else {
            self.apply_toss();
        }
    }

    pub(crate) fn toss_or_start(&mut self, meta: &MotionMeta) {
        if geom::is_zero(self.damping_friction) {
            self.stop_tossing();
            self.toss();
        } else {
            self.start_tossing(meta);
        }
    }

    fn apply_toss(&self) {
        self.frame.borrow_mut().translate(self.tossing_direction);
    }

    /// Advance the continuations to `now`.
    pub fn update(&mut self, now: Tick) {
        self.update_about(now, None);
    }

    pub(crate) fn update_about(&mut self, now: Tick, pivot: Option<Vec3>) {
        if self.spin.poll(now) {
            self.spin_about(pivot);
        }
        if self.toss.poll(now) {
            self.toss();
        }
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Run the bound action on `event`.
    pub fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        let Some(action) = self.action else {
            log::trace!("no action bound, event ignored");
            return;
        };
        if is_motionless_release(event, action) {
            self.end_gesture(action);
        } else if let Some(interaction) = Interaction::new(event, action) {
            self.execute(&interaction, view);
        }
        if event.is_flushed() {
            self.direction_lock = None;
        }
    }

    /// A motionless release ends the gesture without moving the frame. Fly
    /// actions stop tossing, spins keep the continuation the drag seeded.
    pub(crate) fn end_gesture(&mut self, action: Action) {
        if action.motion().is_some_and(MotionAction::is_fly) {
            self.stop_tossing();
        }
    }

    pub(crate) fn execute(&mut self, interaction: &Interaction, view: &Viewpoint) {
        match interaction {
            Interaction::Click(_, kind) => self.execute_click(*kind, view),
            Interaction::Custom(event) => self.perform_custom_action(event, view),
            _ if view.is_2d() => dispatch::execute_2d(self, interaction, view),
            _ => dispatch::execute_3d(self, interaction, view),
        }
    }

    fn execute_click(&self, kind: ClickAction, view: &Viewpoint) {
        match kind {
            ClickAction::CenterFrame => self
                .frame
                .borrow_mut()
                .project_on_line(view.pose.position, view.view_direction()),
            ClickAction::AlignFrame => {
                let eye = view.eye_frame();
                self.frame
                    .borrow_mut()
                    .align_with_frame(Some(&eye), false, ALIGN_THRESHOLD);
            }
            ClickAction::ZoomOnPixel | ClickAction::AnchorFromPixel => {
                log::warn!("{kind:?} is only available for the eye");
            }
            ClickAction::Custom => {}
        }
    }

    pub(crate) fn perform_custom_action(&mut self, event: &Event, view: &Viewpoint) {
        match self.custom.as_mut() {
            Some(handler) => handler(&mut self.frame.borrow_mut(), event, view),
            None => log::warn!(
                "custom action on {:?} has no handler installed",
                self.frame
            ),
        }
    }

    // ── Gesture helpers ─────────────────────────────────────────────────

    /// One-axis quantity, with the wheel multiplier for wheel events.
    pub(crate) fn delta1(&self, event: &Dof1Event, wheel: bool) -> f32 {
        if wheel {
            event.delta() * self.wheel_sensitivity
        } else {
            event.delta()
        }
    }

    /// Angle (radians) of a one-axis rotation gesture.
    pub(crate) fn compute_angle(
        &self,
        event: &Dof1Event,
        wheel: bool,
        view: &Viewpoint,
    ) -> f32 {
        PI * self.delta1(event, wheel) / view.screen_width()
    }

    /// Convert a pixel displacement into scene units at the frame's depth.
    pub(crate) fn scale_to_fit(&self, t: Vec3, view: &Viewpoint) -> Vec3 {
        let position = self.frame.borrow().position();
        match view.kind() {
            EyeKind::Perspective3D => {
                let depth =
                    view.pose.coordinates_of(position).z * view.pose.magnitude.z;
                let k = 2.0 * (view.field_of_view() / 2.0).tan() * depth.abs()
                    / view.screen_height();
                t * k
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

    /// Translate by `t` given in eye coordinates.
    pub(crate) fn translate_from_eye(&self, t: Vec3, sensitivity: f32, view: &Viewpoint) {
        let t = t * sensitivity;
        let world = if view.is_2d() {
            view.pose.inverse_transform_of(t)
        } else {
            view.pose.orientation * t
        };
        self.frame.borrow_mut().translate_world(world);
    }

    /// Rotate about the eye's axes by roll (X), pitch (Y) and yaw (Z).
    pub(crate) fn rotate_around_eye_axes(
        &self,
        roll: f32,
        pitch: f32,
        yaw: f32,
        view: &Viewpoint,
    ) {
        let left = view.is_left_handed();
        let q = geom::from_euler_angles(
            if left { roll } else { -roll },
            pitch,
            if left { yaw } else { -yaw },
        );
        let axis = view.pose.orientation * Vec3::new(-q.x, -q.y, -q.z);
        let mut frame = self.frame.borrow_mut();
        let local = frame.orientation().inverse() * axis;
        frame.rotate(Quat::from_xyzw(local.x, local.y, local.z, q.w));
    }

    /// Arcball rotation of a drag around the screen point `(cx, cy)`,
    /// expressed in eye coordinates.
    pub(crate) fn deformed_ball_quaternion(
        &self,
        event: &Dof2Event,
        cx: f32,
        cy: f32,
        view: &Viewpoint,
    ) -> Quat {
        let s = self.rotation_sensitivity;
        let left = view.is_left_handed();
        let vertical = |y: f32| if left { y - cy } else { cy - y };
        let px = s * (event.prev_x() - cx) / view.screen_width();
        let py = s * vertical(event.prev_y()) / view.screen_height();
        let dx = s * (event.x - cx) / view.screen_width();
        let dy = s * vertical(event.y) / view.screen_height();

        let p1 = Vec3::new(px, py, project_on_ball(px, py));
        let p2 = Vec3::new(dx, dy, project_on_ball(dx, dy));
        let axis = p2.cross(p1);
        let denominator = p1.length_squared() * p2.length_squared();
        if geom::is_zero(denominator) {
            return Quat::IDENTITY;
        }
        let sin = (axis.length_squared() / denominator).sqrt().min(1.0);
        geom::axis_angle(axis, 2.0 * sin.asin())
    }

    /// Fly steering: pitch about the local X axis, yaw about the fly up
    /// direction.
    pub(crate) fn roll_pitch_quaternion(&self, event: &Dof2Event, view: &Viewpoint) -> Quat {
        let s = self.rotation_sensitivity;
        let dx = event.delta_x();
        let dy = if view.is_left_handed() {
            event.delta_y()
        } else {
            -event.delta_y()
        };
        let rot_x = geom::axis_angle(Vec3::X, s * dy / view.screen_height());
        let up = self.frame.borrow().transform_of(self.fly_up);
        let rot_y = geom::axis_angle(up, s * -dx / view.screen_width());
        rot_y * rot_x
    }

    /// Drive steering: yaw about the local Y axis.
    pub(crate) fn turn_quaternion(&self, event: &Dof1Event, view: &Viewpoint) -> Quat {
        geom::axis_angle(
            Vec3::Y,
            self.rotation_sensitivity * -event.delta() / view.screen_width(),
        )
    }

    /// Screen-space angle swept by a drag around `(cx, cy)`, in screen
    /// orientation (clockwise positive), times the rotation sensitivity.
    pub(crate) fn screen_angle(&self, event: &Dof2Event, cx: f32, cy: f32) -> f32 {
        let angle = if event.relative {
            (event.y - cy).atan2(event.x - cx)
                - (event.prev_y() - cy).atan2(event.prev_x() - cx)
        } else {
            event.x
        };
        angle * self.rotation_sensitivity
    }

    /// Axis fixed by the first non-diagonal movement of the gesture:
    /// `1` horizontal, `-1` vertical, `0` still undecided.
    pub(crate) fn original_direction(&mut self, event: &Dof2Event) -> i8 {
        if event.meta.fired {
            self.direction_lock = None;
        }
        if self.direction_lock.is_none() {
            let (ax, ay) = (event.delta_x().abs(), event.delta_y().abs());
            if ax != ay {
                self.direction_lock = Some(ax > ay);
            }
        }
        match self.direction_lock {
            Some(true) => 1,
            Some(false) => -1,
            None => 0,
        }
    }
}

/// Height of the deformed arcball above `(x, y)`.
fn project_on_ball(x: f32, y: f32) -> f32 {
    const SIZE2: f32 = 1.0;
    const LIMIT: f32 = SIZE2 * 0.5;
    let d = x * x + y * y;
    if d < LIMIT {
        (SIZE2 - d).sqrt()
    } else {
        LIMIT / d.sqrt()
    }
}

impl Grabber for InteractiveFrame {
    fn check_if_grabs_input(&self, event: &Event, view: &Viewpoint) -> bool {
        Self::check_if_grabs_input(self, event, view)
    }

    fn perform_interaction(&mut self, event: &Event, view: &Viewpoint) {
        Self::perform_interaction(self, event, view);
    }

    fn update(&mut self, now: Tick) {
        Self::update(self, now);
    }
}

impl InteractiveGrabber for InteractiveFrame {
    fn action(&self) -> Option<Action> {
        self.action
    }

    fn set_action(&mut self, action: Option<Action>) {
        self.action = action;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Arity, Button, ClickEvent, Dof2Event};
    use crate::eye::Lens;
    use crate::frame::Pose;

    fn viewpoint() -> Viewpoint {
        Viewpoint::new(
            Lens::default(),
            Pose::new(Vec3::new(0.0, 0.0, 300.0), Quat::IDENTITY),
            Vec3::ZERO,
        )
    }

    fn bind(frame: &mut InteractiveFrame, kind: MotionAction) {
        let Some(action) = Action::for_motion(kind, Arity::Dof2) else {
            unreachable!("{kind} is a 2-DOF action");
        };
        frame.set_action(Some(action));
    }

    fn drag(dx: f32, dy: f32, speed: f32) -> Event {
        let mut event = Dof2Event::relative(400.0 + dx, 300.0 + dy, dx, dy);
        event.meta.speed = speed;
        Event::from(event)
    }

    #[test]
    fn zero_friction_rotation_applies_once() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        frame.set_damping_friction(0.0);
        bind(&mut frame, MotionAction::Rotate);

        frame.perform_interaction(&drag(10.0, 0.0, 5.0), &view);
        let rotated = frame.frame().borrow().orientation();
        assert!(!rotated.abs_diff_eq(Quat::IDENTITY, 1e-6));
        assert!(!frame.is_spinning());

        for now in (0..400).step_by(10) {
            frame.update(now);
        }
        assert!(frame.frame().borrow().orientation().abs_diff_eq(rotated, 1e-6));
    }

    #[test]
    fn second_rotation_replaces_the_spin() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Rotate);

        frame.perform_interaction(&drag(10.0, 0.0, 5.0), &view);
        frame.perform_interaction(&drag(0.0, 10.0, 5.0), &view);
        assert!(frame.is_spinning());
        assert_eq!(frame.spin_period(), Some(motion::DEFAULT_PERIOD));

        frame.stop_spinning();
        assert!(!frame.is_spinning());
    }

    #[test]
    fn zero_friction_stops_a_running_spin() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        frame.set_damping_friction(0.5);
        bind(&mut frame, MotionAction::Rotate);
        frame.perform_interaction(&drag(10.0, 0.0, 5.0), &view);
        assert!(frame.is_spinning());

        frame.set_damping_friction(0.0);
        frame.perform_interaction(&drag(10.0, 0.0, 5.0), &view);
        assert!(!frame.is_spinning());
    }

    #[test]
    fn motionless_release_keeps_the_spin() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Rotate);
        frame.perform_interaction(&drag(10.0, 0.0, 5.0), &view);
        let rotated = frame.frame().borrow().orientation();

        let release = Event::from(Dof2Event::relative(410.0, 300.0, 0.0, 0.0).flushed());
        frame.perform_interaction(&release, &view);
        assert!(frame.is_spinning());
        assert_eq!(frame.frame().borrow().orientation(), rotated);
    }

    #[test]
    fn damped_spin_dies_out() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        frame.set_damping_friction(0.5);
        bind(&mut frame, MotionAction::Rotate);
        frame.perform_interaction(&drag(10.0, 0.0, 1.0), &view);
        assert!(frame.is_spinning());

        let mut now = 0;
        while frame.is_spinning() && now < 60_000 {
            frame.update(now);
            now += 10;
        }
        assert!(!frame.is_spinning());
    }

    #[test]
    fn slow_gesture_does_not_spin() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Rotate);
        frame.perform_interaction(&drag(10.0, 0.0, 0.1), &view);
        assert!(!frame.is_spinning());
        assert!(!frame.frame().borrow().orientation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn absolute_event_on_rotate_is_ignored() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Rotate);
        frame.perform_interaction(&Event::from(Dof2Event::absolute(410.0, 300.0)), &view);
        assert_eq!(frame.frame().borrow().orientation(), Quat::IDENTITY);
    }

    #[test]
    fn translation_follows_the_pointer() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Translate);
        frame.perform_interaction(&drag(10.0, 20.0, 0.0), &view);

        let position = frame.frame().borrow().position();
        let Some(screen) = view.project(position) else {
            unreachable!("frame is in front of the eye");
        };
        assert!((screen.x - 410.0).abs() < 1e-2);
        assert!((screen.y - 320.0).abs() < 1e-2);
    }

    #[test]
    fn picking_uses_a_square_window() {
        let view = viewpoint();
        let frame = InteractiveFrame::default();
        let near = Event::from(ClickEvent::new(405.0, 302.0, Button::Left));
        let far = Event::from(ClickEvent::new(450.0, 300.0, Button::Left));
        assert!(frame.check_if_grabs_input(&near, &view));
        assert!(!frame.check_if_grabs_input(&far, &view));
        let wheel = Event::from(Dof1Event::wheel(1.0));
        assert!(!frame.check_if_grabs_input(&wheel, &view));
    }

    #[test]
    fn custom_action_runs_the_handler() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        bind(&mut frame, MotionAction::Custom);
        frame.set_custom_handler(Some(Box::new(|f: &mut Frame, _: &Event, _: &Viewpoint| {
            f.translate(Vec3::X);
        })));
        frame.perform_interaction(&drag(1.0, 0.0, 0.0), &view);
        assert_eq!(frame.frame().borrow().position(), Vec3::X);
    }

    #[test]
    fn fly_without_friction_moves_once() {
        let view = viewpoint();
        let mut frame = InteractiveFrame::default();
        frame.set_damping_friction(0.0);
        frame.set_fly_speed(2.0);
        bind(&mut frame, MotionAction::MoveForward);
        frame.perform_interaction(&drag(0.0, 0.0, 1.0), &view);
        assert!(!frame.is_tossing());
        let position = frame.frame().borrow().position();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }
}
