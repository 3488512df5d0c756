//! Gesture tables for plain interactive frames.
//!
//! Displacements are read in screen space, expressed in the eye's
//! coordinate system and then mapped into the frame's reference frame, so
//! a frame follows the pointer whatever its own orientation.

use glam::Vec3;

use super::{Interaction, InteractiveFrame, MotionAction};
use crate::event::{Dof1Event, Dof2Event, Dof3Event, Dof6Event, MotionMeta};
use crate::eye::Viewpoint;
use crate::geom;

/// Run a motion interaction on a frame of a 3D scene.
pub(crate) fn execute_3d(f: &mut InteractiveFrame, interaction: &Interaction, view: &Viewpoint) {
    match *interaction {
        Interaction::Dof1 { event, kind, wheel } => dof1_3d(f, &event, kind, wheel, view),
        Interaction::Dof2(event, kind) => dof2_3d(f, &event, kind, view),
        Interaction::Dof3(event, kind) => dof3_3d(f, &event, kind, view),
        Interaction::Dof6(event, kind) => dof6_3d(f, &event, kind, view),
        Interaction::Click(..) | Interaction::Custom(_) => {}
    }
}

/// Run a motion interaction on a frame of a planar scene.
pub(crate) fn execute_2d(f: &mut InteractiveFrame, interaction: &Interaction, view: &Viewpoint) {
    match *interaction {
        Interaction::Dof1 { event, kind, wheel } => dof1_2d(f, &event, kind, wheel, view),
        Interaction::Dof2(event, kind) => dof2_2d(f, &event, kind, view),
        Interaction::Dof3(event, kind) => dof3_2d(f, &event, kind, view),
        Interaction::Dof6(event, kind) => dof6_2d(f, &event, kind, view),
        Interaction::Click(..) | Interaction::Custom(_) => {}
    }
}

pub(crate) fn unsupported(kind: MotionAction, view: &Viewpoint) {
    if kind.is_eye_only() {
        log::warn!("{kind} is only available for the eye");
    } else if view.is_2d() {
        log::warn!("{kind} is not available in 2D");
    } else {
        log::warn!("{kind} is not handled here");
    }
}

/// Multiply the frame's scaling by the factor a one-axis delta maps to.
pub(crate) fn scale_by_delta(f: &InteractiveFrame, delta: f32, invert: bool, view: &Viewpoint) {
    let s = 1.0 + delta.abs() / view.screen_height();
    let grow = (delta >= 0.0) != invert;
    let factor = if grow { s } else { 1.0 / s };
    if let Err(err) = f.frame().borrow_mut().scale(factor) {
        log::warn!("scale by {factor} rejected: {err}");
    }
}

/// Point the toss along the frame's local `direction` and start it.
pub(crate) fn fly(f: &mut InteractiveFrame, meta: &MotionMeta, direction: Vec3) {
    let world = f.frame().borrow().rotation() * direction;
    f.set_tossing_direction(world);
    f.toss_or_start(meta);
}

fn translation_sensitivity(f: &InteractiveFrame, wheel: bool) -> f32 {
    if wheel {
        1.0
    } else {
        f.translation_sensitivity()
    }
}

fn screen_y(dy: f32, view: &Viewpoint) -> f32 {
    if view.is_left_handed() {
        dy
    } else {
        -dy
    }
}

// ── 3D ──────────────────────────────────────────────────────────────────

fn dof1_3d(
    f: &InteractiveFrame,
    e: &Dof1Event,
    kind: MotionAction,
    wheel: bool,
    view: &Viewpoint,
) {
    let sensitivity = translation_sensitivity(f, wheel);
    match kind {
        MotionAction::RotateX => {
            let angle = f.compute_angle(e, wheel, view);
            f.rotate_around_eye_axes(angle, 0.0, 0.0, view);
        }
        MotionAction::RotateY => {
            let angle = f.compute_angle(e, wheel, view);
            f.rotate_around_eye_axes(0.0, -angle, 0.0, view);
        }
        MotionAction::RotateZ => {
            let angle = f.compute_angle(e, wheel, view);
            f.rotate_around_eye_axes(0.0, 0.0, -angle, view);
        }
        MotionAction::TranslateX => {
            let t = f.scale_to_fit(Vec3::new(f.delta1(e, wheel), 0.0, 0.0), view);
            f.translate_from_eye(t, sensitivity, view);
        }
        MotionAction::TranslateY => {
            let dy = screen_y(f.delta1(e, wheel), view);
            let t = f.scale_to_fit(Vec3::new(0.0, dy, 0.0), view);
            f.translate_from_eye(t, sensitivity, view);
        }
        MotionAction::TranslateZ => {
            let t = f.scale_to_fit(Vec3::new(0.0, 0.0, f.delta1(e, wheel)), view);
            f.translate_from_eye(t, sensitivity, view);
        }
        MotionAction::Scale => scale_by_delta(f, f.delta1(e, wheel), false, view),
        MotionAction::Zoom => {
            let position = f.frame().borrow().position();
            let distance = (view.pose.position - position).length();
            let dz = distance * f.delta1(e, wheel) / view.screen_height();
            f.translate_from_eye(Vec3::new(0.0, 0.0, dz), 1.0, view);
        }
        _ => unsupported(kind, view),
    }
}

fn dof2_3d(f: &mut InteractiveFrame, e: &Dof2Event, kind: MotionAction, view: &Viewpoint) {
    if kind.is_fly() && e.meta.flushed {
        f.stop_tossing();
        return;
    }
    match kind {
        MotionAction::Drive => {
            let q = f.turn_quaternion(&e.dof1(true), view);
            f.frame().borrow_mut().rotate(q);
            let step = f.fly_speed();
            fly(f, &e.meta, Vec3::new(0.0, 0.0, step));
        }
        MotionAction::MoveForward => {
            let q = f.roll_pitch_quaternion(e, view);
            f.frame().borrow_mut().rotate(q);
            let step = f.fly_speed();
            fly(f, &e.meta, Vec3::new(0.0, 0.0, -step));
        }
        MotionAction::MoveBackward => {
            let q = f.roll_pitch_quaternion(e, view);
            f.frame().borrow_mut().rotate(q);
            let step = f.fly_speed();
            fly(f, &e.meta, Vec3::new(0.0, 0.0, step));
        }
        MotionAction::LookAround => {
            let q = f.roll_pitch_quaternion(e, view);
            f.frame().borrow_mut().rotate(q);
        }
        MotionAction::Rotate => {
            if !e.relative {
                log::warn!("{kind} needs relative events");
                return;
            }
            let position = f.frame().borrow().position();
            let Some(center) = view.project(position) else {
                return;
            };
            let q = f.deformed_ball_quaternion(e, center.x, center.y, view);
            let (axis, angle) = geom::to_axis_angle(q);
            let world = view.pose.orientation * axis;
            let local = f.frame().borrow().orientation().inverse() * world;
            f.set_spinning_rotation(geom::axis_angle(local, -angle));
            f.spin_or_start(&e.meta, None);
        }
        MotionAction::ScreenRotate => {
            let position = f.frame().borrow().position();
            let Some(center) = view.project(position) else {
                return;
            };
            let angle = f.screen_angle(e, center.x, center.y);
            let world = view.pose.orientation * Vec3::NEG_Z;
            let local = f.frame().borrow().orientation().inverse() * world;
            let angle = if view.is_left_handed() { -angle } else { angle };
            f.set_spinning_rotation(geom::axis_angle(local, angle));
            f.spin_or_start(&e.meta, None);
        }
        MotionAction::ScreenTranslate => {
            let t = match f.original_direction(e) {
                1 => Vec3::new(e.delta_x(), 0.0, 0.0),
                -1 => Vec3::new(0.0, screen_y(e.delta_y(), view), 0.0),
                _ => return,
            };
            let t = f.scale_to_fit(t, view);
            f.translate_from_eye(t, f.translation_sensitivity(), view);
        }
        MotionAction::Translate => {
            let t = Vec3::new(e.delta_x(), screen_y(e.delta_y(), view), 0.0);
            let t = f.scale_to_fit(t, view);
            f.translate_from_eye(t, f.translation_sensitivity(), view);
        }
        _ => unsupported(kind, view),
    }
}

fn translate_xyz(f: &InteractiveFrame, [dx, dy, dz]: [f32; 3], view: &Viewpoint) {
    let t = f.scale_to_fit(Vec3::new(dx, screen_y(dy, view), dz), view);
    f.translate_from_eye(t, f.translation_sensitivity(), view);
}

fn dof3_3d(f: &InteractiveFrame, e: &Dof3Event, kind: MotionAction, view: &Viewpoint) {
    let [dx, dy, dz] = e.deltas();
    match kind {
        MotionAction::RotateXyz => f.rotate_around_eye_axes(dx, -dy, -dz, view),
        MotionAction::TranslateXyz => translate_xyz(f, [dx, dy, dz], view),
        _ => unsupported(kind, view),
    }
}

fn dof6_3d(f: &InteractiveFrame, e: &Dof6Event, kind: MotionAction, view: &Viewpoint) {
    match kind {
        MotionAction::TranslateXyzRotateXyz => {
            translate_xyz(f, e.translation_deltas(), view);
            let [rx, ry, rz] = e.rotation_deltas();
            f.rotate_around_eye_axes(rx, -ry, -rz, view);
        }
        _ => unsupported(kind, view),
    }
}

// ── 2D ──────────────────────────────────────────────────────────────────

/// In-plane rotation by a screen angle (clockwise positive on screen).
fn planar_rotation(angle: f32, view: &Viewpoint) -> glam::Quat {
    let angle = if view.is_left_handed() { angle } else { -angle };
    geom::axis_angle(Vec3::Z, angle)
}

fn dof1_2d(
    f: &InteractiveFrame,
    e: &Dof1Event,
    kind: MotionAction,
    wheel: bool,
    view: &Viewpoint,
) {
    let sensitivity = translation_sensitivity(f, wheel);
    match kind {
        MotionAction::RotateZ => {
            let angle = f.compute_angle(e, wheel, view);
            f.frame().borrow_mut().rotate(planar_rotation(angle, view));
        }
        MotionAction::TranslateX => {
            let t = f.scale_to_fit(Vec3::new(f.delta1(e, wheel), 0.0, 0.0), view);
            f.translate_from_eye(t, sensitivity, view);
        }
        MotionAction::TranslateY => {
            let dy = screen_y(f.delta1(e, wheel), view);
            let t = f.scale_to_fit(Vec3::new(0.0, dy, 0.0), view);
            f.translate_from_eye(t, sensitivity, view);
        }
        MotionAction::Scale => scale_by_delta(f, f.delta1(e, wheel), false, view),
        _ => unsupported(kind, view),
    }
}

fn dof2_2d(f: &mut InteractiveFrame, e: &Dof2Event, kind: MotionAction, view: &Viewpoint) {
    if kind.is_fly() && e.meta.flushed {
        f.stop_tossing();
        return;
    }
    let position = f.frame().borrow().position();
    match kind {
        MotionAction::Rotate | MotionAction::ScreenRotate => {
            let Some(center) = view.project(position) else {
                return;
            };
            let rotation = planar_rotation(f.screen_angle(e, center.x, center.y), view);
            if e.relative {
                f.set_spinning_rotation(rotation);
                f.spin_or_start(&e.meta, None);
            } else {
                f.frame().borrow_mut().rotate(rotation);
            }
        }
        MotionAction::MoveForward | MotionAction::MoveBackward => {
            if let Some(center) = view.project(position) {
                let rotation = planar_rotation(f.screen_angle(e, center.x, center.y), view);
                f.frame().borrow_mut().rotate(rotation);
            }
            let step = if kind == MotionAction::MoveForward {
                f.fly_speed()
            } else {
                -f.fly_speed()
            };
            fly(f, &e.meta, Vec3::new(step, 0.0, 0.0));
        }
        MotionAction::ScreenTranslate => {
            let t = match f.original_direction(e) {
                1 => Vec3::new(e.delta_x(), 0.0, 0.0),
                -1 => Vec3::new(0.0, screen_y(e.delta_y(), view), 0.0),
                _ => return,
            };
            let t = f.scale_to_fit(t, view);
            f.translate_from_eye(t, f.translation_sensitivity(), view);
        }
        MotionAction::Translate => {
            let t = Vec3::new(e.delta_x(), screen_y(e.delta_y(), view), 0.0);
            let t = f.scale_to_fit(t, view);
            f.translate_from_eye(t, f.translation_sensitivity(), view);
        }
        _ => unsupported(kind, view),
    }
}

fn dof3_2d(f: &InteractiveFrame, e: &Dof3Event, kind: MotionAction, view: &Viewpoint) {
    let [dx, dy, dz] = e.deltas();
    match kind {
        MotionAction::TranslateXyz => translate_xyz(f, [dx, dy, 0.0], view),
        MotionAction::RotateXyz => {
            f.frame().borrow_mut().rotate(planar_rotation(dz, view));
        }
        _ => unsupported(kind, view),
    }
}

fn dof6_2d(f: &InteractiveFrame, e: &Dof6Event, kind: MotionAction, view: &Viewpoint) {
    match kind {
        MotionAction::TranslateXyzRotateXyz => {
            let [dx, dy, _] = e.translation_deltas();
            translate_xyz(f, [dx, dy, 0.0], view);
            let [_, _, rz] = e.rotation_deltas();
            f.frame().borrow_mut().rotate(planar_rotation(rz, view));
        }
        _ => unsupported(kind, view),
    }
}
