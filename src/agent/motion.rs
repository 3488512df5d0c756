//! Pointer-style agent driving an eye and the frames of its scene.
//!
//! [`MotionAgent`] is an [`Agent`] preset with two branches: one holding
//! the eye (also the default grabber), one holding the scene's interactive
//! frames. Each branch carries its own bindings, so the same drag rotates
//! the eye around the scene or a picked frame in place.

use std::cell::RefCell;
use std::rc::Rc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::profile::Profile;
use super::{AnyGrabber, Agent, BranchId, InteractiveGrabber, InteractiveGrabberRef};
use crate::error::VantageError;
use crate::event::{
    Arity, Button, ClickEvent, ClickShortcut, Dof1Event, Dof2Event, Event, Modifiers,
    MotionShortcut,
};
use crate::eye::{Eye, Viewpoint};
use crate::interactive::{ClickAction, MotionAction};

/// Default wheel sensitivity.
pub const DEFAULT_WHEEL_SENSITIVITY: f32 = 1.0;

/// Which branch a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The eye.
    Eye,
    /// The scene's interactive frames.
    Frame,
}

/// When the tracked grabber is re-picked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PickingMode {
    /// On hover and on button press.
    #[default]
    Move,
    /// On click only.
    Click,
}

/// Agent with an eye branch and a frame branch.
#[derive(Debug)]
pub struct MotionAgent {
    agent: Agent,
    eye: Rc<RefCell<Eye>>,
    eye_branch: BranchId,
    frame_branch: BranchId,
    picking_mode: PickingMode,
    wheel_sensitivity: f32,
    previous: Option<Event>,
}

impl MotionAgent {
    /// Agent driving `eye`, with the default bindings for the eye's
    /// dimension.
    #[must_use]
    pub fn new(name: impl Into<String>, eye: Rc<RefCell<Eye>>) -> Self {
        let name = name.into();
        let mut agent = Agent::new(name.clone());
        let eye_branch = agent.append_branch(format!("{name}_eye_branch"));
        let frame_branch = agent.append_branch(format!("{name}_frame_branch"));
        let _ = agent.set_frame_branch(frame_branch);
        let mut this = Self {
            agent,
            eye,
            eye_branch,
            frame_branch,
            picking_mode: PickingMode::default(),
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            previous: None,
        };
        this.reset_default_grabber();
        this.set_default_bindings();
        this
    }

    /// The underlying agent.
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Mutable underlying agent.
    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    /// The driven eye.
    #[must_use]
    pub fn eye(&self) -> &Rc<RefCell<Eye>> {
        &self.eye
    }

    /// Branch holding the eye.
    #[must_use]
    pub fn eye_branch(&self) -> BranchId {
        self.eye_branch
    }

    /// Branch holding the scene's frames.
    #[must_use]
    pub fn frame_branch(&self) -> BranchId {
        self.frame_branch
    }

    fn branch_id(&self, target: Target) -> BranchId {
        match target {
            Target::Eye => self.eye_branch,
            Target::Frame => self.frame_branch,
        }
    }

    fn eye_handle(&self) -> InteractiveGrabberRef {
        self.eye.clone()
    }

    /// Put the eye back in its branch and make it the default grabber.
    pub fn reset_default_grabber(&mut self) {
        let eye = self.eye_handle();
        if let Err(e) = self.agent.add_grabber_to_branch(Rc::clone(&eye), self.eye_branch) {
            log::warn!("{}: {e}", self.agent.name());
            return;
        }
        let _ = self
            .agent
            .set_default_grabber(&AnyGrabber::Interactive(eye));
    }

    // ── Frames ──────────────────────────────────────────────────────────

    /// Add a frame to the frame branch.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::UnknownBranch`] when the frame branch was
    /// pruned.
    pub fn add_frame<G: InteractiveGrabber + 'static>(
        &mut self,
        frame: Rc<RefCell<G>>,
    ) -> Result<bool, VantageError> {
        self.agent.add_grabber_to_branch(frame, self.frame_branch)
    }

    /// Remove a frame added with [`MotionAgent::add_frame`].
    pub fn remove_frame<G: InteractiveGrabber + 'static>(&mut self, frame: Rc<RefCell<G>>) -> bool {
        self.agent.remove_grabber(&AnyGrabber::interactive(frame))
    }

    // ── Settings ────────────────────────────────────────────────────────

    /// When the tracked grabber is re-picked.
    #[must_use]
    pub fn picking_mode(&self) -> PickingMode {
        self.picking_mode
    }

    /// Set when the tracked grabber is re-picked.
    pub fn set_picking_mode(&mut self, mode: PickingMode) {
        self.picking_mode = mode;
    }

    /// Scale applied to wheel deltas. Negative values invert the wheel.
    #[must_use]
    pub fn wheel_sensitivity(&self) -> f32 {
        self.wheel_sensitivity
    }

    /// Set the scale applied to wheel deltas.
    pub fn set_wheel_sensitivity(&mut self, sensitivity: f32) {
        self.wheel_sensitivity = sensitivity;
        self.agent.set_sensitivities(Arity::Dof1, vec![sensitivity]);
    }

    // ── Bindings ────────────────────────────────────────────────────────

    /// Restore the mouse-style bindings for the eye's dimension.
    ///
    /// | Shortcut | Eye | Frame |
    /// |---|---|---|
    /// | left drag | rotate | rotate |
    /// | middle drag | zoom (scale in 2D) | scale |
    /// | right drag | translate | translate |
    /// | shift + left drag | zoom on region | |
    /// | shift + middle drag | screen translate | screen translate |
    /// | shift + right drag | screen rotate | screen rotate |
    /// | wheel | zoom (scale in 2D) | scale |
    /// | left double click | align | align |
    /// | right double click | center | center |
    /// | shift + left double click | zoom on pixel | |
    /// | shift + right double click | anchor from pixel (3D) | |
    pub fn set_default_bindings(&mut self) {
        let planar = self.eye.try_borrow().is_ok_and(|e| e.is_2d());
        for target in [Target::Eye, Target::Frame] {
            self.remove_motion_bindings(target);
            self.remove_click_bindings(target);
        }
        let plain = MotionShortcut::plain;
        let shift = |b| MotionShortcut::new(Modifiers::SHIFT, b);
        let eye_zoom = if planar {
            MotionAction::Scale
        } else {
            MotionAction::Zoom
        };

        for (shortcut, action) in [
            (plain(Button::Left), MotionAction::Rotate),
            (plain(Button::Middle), eye_zoom),
            (plain(Button::Right), MotionAction::Translate),
            (shift(Button::Left), MotionAction::ZoomOnRegion),
            (shift(Button::Middle), MotionAction::ScreenTranslate),
            (shift(Button::Right), MotionAction::ScreenRotate),
            (plain(Button::Wheel), eye_zoom),
        ] {
            self.set_binding(Target::Eye, shortcut, action);
        }
        for (shortcut, action) in [
            (plain(Button::Left), MotionAction::Rotate),
            (plain(Button::Middle), MotionAction::Scale),
            (plain(Button::Right), MotionAction::Translate),
            (shift(Button::Middle), MotionAction::ScreenTranslate),
            (shift(Button::Right), MotionAction::ScreenRotate),
            (plain(Button::Wheel), MotionAction::Scale),
        ] {
            self.set_binding(Target::Frame, shortcut, action);
        }

        for target in [Target::Eye, Target::Frame] {
            self.set_click_binding(target, ClickShortcut::double(Button::Left), ClickAction::AlignFrame);
            self.set_click_binding(target, ClickShortcut::double(Button::Right), ClickAction::CenterFrame);
        }
        self.set_click_binding(
            Target::Eye,
            ClickShortcut::new(Modifiers::SHIFT, Button::Left, 2),
            ClickAction::ZoomOnPixel,
        );
        if !planar {
            self.set_click_binding(
                Target::Eye,
                ClickShortcut::new(Modifiers::SHIFT, Button::Right, 2),
                ClickAction::AnchorFromPixel,
            );
        }
    }

    /// Motion bindings of `target`'s branch.
    #[must_use]
    pub fn motion_profile(&self, target: Target) -> Option<&Profile<MotionShortcut, MotionAction>> {
        self.agent
            .branch(self.branch_id(target))
            .map(super::Branch::motion_profile)
    }

    /// Click bindings of `target`'s branch.
    #[must_use]
    pub fn click_profile(&self, target: Target) -> Option<&Profile<ClickShortcut, ClickAction>> {
        self.agent
            .branch(self.branch_id(target))
            .map(super::Branch::click_profile)
    }

    fn motion_profile_mut(&mut self, target: Target) -> Option<&mut Profile<MotionShortcut, MotionAction>> {
        let id = self.branch_id(target);
        let profile = self
            .agent
            .branch_mut(id)
            .map(super::Branch::motion_profile_mut);
        if profile.is_none() {
            log::warn!("{target:?} branch {id} was pruned");
        }
        profile
    }

    fn click_profile_mut(&mut self, target: Target) -> Option<&mut Profile<ClickShortcut, ClickAction>> {
        let id = self.branch_id(target);
        let profile = self
            .agent
            .branch_mut(id)
            .map(super::Branch::click_profile_mut);
        if profile.is_none() {
            log::warn!("{target:?} branch {id} was pruned");
        }
        profile
    }

    /// Bind a motion shortcut for `target`.
    pub fn set_binding(&mut self, target: Target, shortcut: MotionShortcut, action: MotionAction) {
        if target == Target::Frame && action.is_eye_only() {
            log::warn!("{action} only applies to the eye, frames will ignore {shortcut}");
        }
        if let Some(profile) = self.motion_profile_mut(target) {
            let _ = profile.set_binding(shortcut, action);
        }
    }

    /// Bind a click shortcut for `target`.
    pub fn set_click_binding(&mut self, target: Target, shortcut: ClickShortcut, action: ClickAction) {
        if target == Target::Frame && action.is_eye_only() {
            log::warn!("{action:?} only applies to the eye, frames will ignore {shortcut}");
        }
        if let Some(profile) = self.click_profile_mut(target) {
            let _ = profile.set_binding(shortcut, action);
        }
    }

    /// Unbind a motion shortcut for `target`.
    pub fn remove_binding(&mut self, target: Target, shortcut: &MotionShortcut) {
        if let Some(profile) = self.motion_profile_mut(target) {
            let _ = profile.remove_binding(shortcut);
        }
    }

    /// Unbind a click shortcut for `target`.
    pub fn remove_click_binding(&mut self, target: Target, shortcut: &ClickShortcut) {
        if let Some(profile) = self.click_profile_mut(target) {
            let _ = profile.remove_binding(shortcut);
        }
    }

    /// Whether a motion shortcut is bound for `target`.
    #[must_use]
    pub fn has_binding(&self, target: Target, shortcut: &MotionShortcut) -> bool {
        self.motion_profile(target)
            .is_some_and(|p| p.has_binding(shortcut))
    }

    /// Whether a click shortcut is bound for `target`.
    #[must_use]
    pub fn has_click_binding(&self, target: Target, shortcut: &ClickShortcut) -> bool {
        self.click_profile(target)
            .is_some_and(|p| p.has_binding(shortcut))
    }

    /// Motion action bound to `shortcut` for `target`.
    #[must_use]
    pub fn action(&self, target: Target, shortcut: &MotionShortcut) -> Option<MotionAction> {
        self.motion_profile(target).and_then(|p| p.action(shortcut))
    }

    /// Click action bound to `shortcut` for `target`.
    #[must_use]
    pub fn click_action(&self, target: Target, shortcut: &ClickShortcut) -> Option<ClickAction> {
        self.click_profile(target).and_then(|p| p.action(shortcut))
    }

    /// Whether `action` is bound to any motion shortcut for `target`.
    #[must_use]
    pub fn is_action_bound(&self, target: Target, action: MotionAction) -> bool {
        self.motion_profile(target)
            .is_some_and(|p| p.is_action_bound(action))
    }

    /// Whether `action` is bound to any click shortcut for `target`.
    #[must_use]
    pub fn is_click_action_bound(&self, target: Target, action: ClickAction) -> bool {
        self.click_profile(target)
            .is_some_and(|p| p.is_action_bound(action))
    }

    /// Drop every motion binding of `target`.
    pub fn remove_motion_bindings(&mut self, target: Target) {
        if let Some(profile) = self.motion_profile_mut(target) {
            profile.remove_bindings();
        }
    }

    /// Drop every click binding of `target`.
    pub fn remove_click_bindings(&mut self, target: Target) {
        if let Some(profile) = self.click_profile_mut(target) {
            profile.remove_bindings();
        }
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Fresh snapshot of the eye, with its matrices recomputed. `None`
    /// while the eye is borrowed elsewhere.
    #[must_use]
    pub fn viewpoint(&self) -> Option<Viewpoint> {
        let Ok(mut eye) = self.eye.try_borrow_mut() else {
            log::warn!("{}: eye is busy", self.agent.name());
            return None;
        };
        eye.compute_matrices();
        Some(eye.viewpoint())
    }

    /// Re-pick the tracked grabber for `event`.
    pub fn update_tracked_grabber(&mut self, event: &Event) -> Option<AnyGrabber> {
        let view = self.viewpoint()?;
        self.agent.update_tracked_grabber(event, &view)
    }

    /// Route `event` through the agent. Returns whether a grabber acted.
    pub fn handle(&self, event: Event) -> bool {
        self.viewpoint()
            .is_some_and(|view| self.agent.handle(event, &view))
    }

    /// Link `event` to the previous motion event, so its delay and speed
    /// are known, then route it. A flushed event ends the chain.
    fn deliver(&mut self, event: Event) -> bool {
        let mut event = event;
        if let Some(previous) = &self.previous {
            event.link_previous(previous);
        }
        self.previous = (!event.is_flushed()).then_some(event);
        self.handle(event)
    }

    /// Pointer moved with no button held.
    pub fn move_pointer(&mut self, event: Dof2Event) -> bool {
        let event = Event::from(event);
        if self.picking_mode == PickingMode::Move {
            let _ = self.update_tracked_grabber(&event);
        }
        self.deliver(event)
    }

    /// Button pressed: the first event of a drag. It reaches the grabber
    /// even without motion, so per-gesture state restarts.
    pub fn press(&mut self, event: Dof2Event) -> bool {
        let event = Event::from(event.fired());
        if self.picking_mode == PickingMode::Move {
            let _ = self.update_tracked_grabber(&event);
        }
        self.deliver(event)
    }

    /// Pointer moved with a button held.
    pub fn drag(&mut self, event: Dof2Event) -> bool {
        self.deliver(event.into())
    }

    /// Button released: the last event of a drag.
    pub fn release(&mut self, event: Dof2Event) -> bool {
        self.deliver(event.flushed().into())
    }

    /// Wheel turned.
    pub fn wheel(&mut self, event: Dof1Event) -> bool {
        self.deliver(event.into())
    }

    /// Button clicked.
    pub fn click(&mut self, event: ClickEvent) -> bool {
        let event = Event::from(event);
        if self.picking_mode == PickingMode::Click {
            let _ = self.update_tracked_grabber(&event);
        }
        self.handle(event)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use glam::Vec3;

    use super::*;
    use crate::eye::EyeKind;
    use crate::frame::Frame;
    use crate::interactive::InteractiveFrame;
    use crate::timing::Tick;

    fn scenario() -> (Rc<RefCell<Eye>>, MotionAgent) {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.set_field_of_view(FRAC_PI_3);
        eye.set_scene_radius(100.0);
        eye.set_position(Vec3::new(0.0, 0.0, 300.0));
        eye.look_at(Vec3::ZERO);
        let eye = Rc::new(RefCell::new(eye));
        let agent = MotionAgent::new("mouse", Rc::clone(&eye));
        (eye, agent)
    }

    #[test]
    fn eye_is_the_default_grabber() {
        let (eye, agent) = scenario();
        let handle = AnyGrabber::interactive(eye);
        assert!(agent.agent().default_grabber().is_some_and(|g| g.same(&handle)));
        let eye_ref: InteractiveGrabberRef = agent.eye().clone();
        assert_eq!(agent.agent().branch_of(&eye_ref), Some(agent.eye_branch()));
    }

    #[test]
    fn zero_friction_rotate_on_eye_applies_once() {
        let (eye, mut agent) = scenario();
        eye.borrow_mut().frame_mut().base_mut().set_damping_friction(0.0);
        assert_eq!(
            agent.action(Target::Eye, &MotionShortcut::plain(Button::Left)),
            Some(MotionAction::Rotate)
        );
        let before = eye.borrow().orientation();

        let mut drag = Dof2Event::relative(410.0, 300.0, 10.0, 0.0).with_id(Button::Left);
        drag.meta.speed = 5.0;
        assert!(agent.drag(drag));

        let after = eye.borrow().orientation();
        assert!(!after.abs_diff_eq(before, 1e-6));
        assert!(!eye.borrow().frame().base().is_spinning());

        for now in (0..400).step_by(10) {
            eye.borrow_mut().update(now);
        }
        assert!(eye.borrow().orientation().abs_diff_eq(after, 1e-6));
    }

    fn drag_at(agent: &mut MotionAgent, x: f32, dx: f32, now: Tick) -> bool {
        agent.drag(Dof2Event::relative(x, 100.0, dx, 0.0).with_id(Button::Left).at(now))
    }

    #[test]
    fn fast_drag_through_the_agent_spins_the_eye() {
        let (eye, mut agent) = scenario();
        let press = Dof2Event::relative(100.0, 100.0, 0.0, 0.0).with_id(Button::Left).at(0);
        assert!(agent.press(press));
        for step in 1..=5u16 {
            let x = 100.0 + 30.0 * f32::from(step);
            assert!(drag_at(&mut agent, x, 30.0, Tick::from(step) * 10));
        }
        assert!(eye.borrow().frame().base().is_spinning());

        let release = Dof2Event::relative(250.0, 100.0, 0.0, 0.0).with_id(Button::Left).at(60);
        assert!(agent.release(release));
        assert!(eye.borrow().frame().base().is_spinning());
    }

    #[test]
    fn slow_drag_through_the_agent_does_not_spin() {
        let (eye, mut agent) = scenario();
        let press = Dof2Event::relative(100.0, 100.0, 0.0, 0.0).with_id(Button::Left).at(0);
        assert!(agent.press(press));
        assert!(drag_at(&mut agent, 102.0, 2.0, 100));
        assert!(!eye.borrow().frame().base().is_spinning());
    }

    #[test]
    fn release_ends_the_linked_chain() {
        let (_eye, mut agent) = scenario();
        let press = Dof2Event::relative(100.0, 100.0, 0.0, 0.0).with_id(Button::Left).at(0);
        let _ = agent.press(press);
        let _ = drag_at(&mut agent, 130.0, 30.0, 10);
        let release = Dof2Event::relative(130.0, 100.0, 0.0, 0.0).with_id(Button::Left).at(20);
        let _ = agent.release(release);
        assert!(agent.previous.is_none());
    }

    #[test]
    fn picked_frame_receives_frame_bindings() {
        let (eye, mut agent) = scenario();
        let frame = Rc::new(RefCell::new(InteractiveFrame::new(Frame::new())));
        assert_eq!(agent.add_frame(Rc::clone(&frame)).ok(), Some(true));
        let eye_before = eye.borrow().position();

        // The frame sits at the origin, projected at the screen center.
        assert!(!agent.move_pointer(Dof2Event::absolute(400.0, 300.0)));
        assert!(agent
            .agent()
            .tracked_grabber()
            .is_some_and(|g| g.same(&AnyGrabber::interactive(Rc::clone(&frame)))));

        assert!(agent.wheel(Dof1Event::wheel(1.0)));
        assert_eq!(
            frame.borrow().action().and_then(|a| a.motion()),
            Some(MotionAction::Scale)
        );
        assert!(eye.borrow().position().abs_diff_eq(eye_before, 1e-6));

        // Hovering away hands events back to the eye.
        let _ = agent.move_pointer(Dof2Event::absolute(20.0, 20.0));
        assert!(agent.agent().tracked_grabber().is_none());
        assert!(agent.wheel(Dof1Event::wheel(1.0)));
        assert!(!eye.borrow().position().abs_diff_eq(eye_before, 1e-6));
    }

    #[test]
    fn click_picking_ignores_hover() {
        let (_eye, mut agent) = scenario();
        agent.set_picking_mode(PickingMode::Click);
        let frame = Rc::new(RefCell::new(InteractiveFrame::new(Frame::new())));
        let _ = agent.add_frame(Rc::clone(&frame));

        let _ = agent.move_pointer(Dof2Event::absolute(400.0, 300.0));
        assert!(agent.agent().tracked_grabber().is_none());

        let _ = agent.click(ClickEvent::new(400.0, 300.0, Button::Left));
        assert!(agent.agent().tracked_grabber().is_some());
    }

    #[test]
    fn bindings_are_per_target() {
        let (_eye, mut agent) = scenario();
        let ctrl_left = MotionShortcut::new(Modifiers::CTRL, Button::Left);
        agent.set_binding(Target::Frame, ctrl_left, MotionAction::TranslateZ);
        assert!(agent.has_binding(Target::Frame, &ctrl_left));
        assert!(!agent.has_binding(Target::Eye, &ctrl_left));
        assert!(agent.is_action_bound(Target::Eye, MotionAction::ZoomOnRegion));
        assert!(!agent.is_action_bound(Target::Frame, MotionAction::ZoomOnRegion));
        assert!(agent.is_click_action_bound(Target::Eye, ClickAction::AnchorFromPixel));

        agent.remove_binding(Target::Frame, &ctrl_left);
        assert!(!agent.has_binding(Target::Frame, &ctrl_left));
        agent.remove_motion_bindings(Target::Eye);
        assert_eq!(agent.motion_profile(Target::Eye).map(Profile::len), Some(0));
    }

    #[test]
    fn planar_eye_scales_instead_of_zooming() {
        let eye = Rc::new(RefCell::new(Eye::new(EyeKind::Window2D)));
        let agent = MotionAgent::new("mouse", eye);
        assert_eq!(
            agent.action(Target::Eye, &MotionShortcut::plain(Button::Wheel)),
            Some(MotionAction::Scale)
        );
        assert!(!agent.is_click_action_bound(Target::Eye, ClickAction::AnchorFromPixel));
    }

    #[test]
    fn wheel_sensitivity_scales_wheel_events() {
        let (_eye, mut agent) = scenario();
        agent.set_wheel_sensitivity(-2.0);
        let scale = agent.agent().sensitivities(Arity::Dof1);
        assert!(scale.len() == 1 && (scale[0] + 2.0).abs() < f32::EPSILON);
        assert!((agent.wheel_sensitivity() + 2.0).abs() < f32::EPSILON);
    }
}
