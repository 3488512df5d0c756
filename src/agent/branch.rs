//! Branches: independent binding sets sharing one agent.
//!
//! A branch owns a pool of profile-bound grabbers plus the click and
//! motion profiles that turn an event's shortcut into the action those
//! grabbers perform. Distinct branches let the eye and the scene's frames
//! answer the same shortcut differently.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use super::profile::Profile;
use super::{addr, InteractiveGrabberRef};
use crate::event::{ClickShortcut, Event, MotionShortcut};
use crate::eye::Viewpoint;
use crate::interactive::{Action, ClickAction, MotionAction};

/// Identifies a branch within its agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub(super) u32);

impl BranchId {
    /// Raw id.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named pool of profile-bound grabbers with its own bindings.
pub struct Branch {
    id: BranchId,
    name: String,
    grabbers: Vec<InteractiveGrabberRef>,
    click_profile: Profile<ClickShortcut, ClickAction>,
    motion_profile: Profile<MotionShortcut, MotionAction>,
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("grabbers", &self.grabbers.len())
            .field("click_profile", &self.click_profile)
            .field("motion_profile", &self.motion_profile)
            .finish()
    }
}

impl Branch {
    pub(super) fn new(id: BranchId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            grabbers: Vec::new(),
            click_profile: Profile::new(),
            motion_profile: Profile::new(),
        }
    }

    /// Id within the owning agent.
    #[must_use]
    pub fn id(&self) -> BranchId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Grabbers ────────────────────────────────────────────────────────

    /// Grabbers in append order.
    #[must_use]
    pub fn grabbers(&self) -> &[InteractiveGrabberRef] {
        &self.grabbers
    }

    /// Whether `grabber` belongs to this branch.
    #[must_use]
    pub fn has_grabber(&self, grabber: &InteractiveGrabberRef) -> bool {
        let target = addr(grabber);
        self.grabbers.iter().any(|g| addr(g) == target)
    }

    pub(super) fn add_grabber(&mut self, grabber: InteractiveGrabberRef) -> bool {
        if self.has_grabber(&grabber) {
            return false;
        }
        self.grabbers.push(grabber);
        true
    }

    pub(super) fn remove_grabber(&mut self, target: *const ()) -> bool {
        let before = self.grabbers.len();
        self.grabbers.retain(|g| addr(g) != target);
        self.grabbers.len() != before
    }

    pub(super) fn reset(&mut self) {
        self.grabbers.clear();
    }

    /// First grabber, in append order, that claims `event`.
    pub(super) fn pick(&self, event: &Event, view: &Viewpoint) -> Option<InteractiveGrabberRef> {
        self.grabbers
            .iter()
            .find(|g| {
                g.try_borrow()
                    .is_ok_and(|g| g.check_if_grabs_input(event, view))
            })
            .cloned()
    }

    // ── Profiles ────────────────────────────────────────────────────────

    /// Click shortcut bindings.
    #[must_use]
    pub fn click_profile(&self) -> &Profile<ClickShortcut, ClickAction> {
        &self.click_profile
    }

    /// Mutable click shortcut bindings.
    pub fn click_profile_mut(&mut self) -> &mut Profile<ClickShortcut, ClickAction> {
        &mut self.click_profile
    }

    /// Motion shortcut bindings.
    #[must_use]
    pub fn motion_profile(&self) -> &Profile<MotionShortcut, MotionAction> {
        &self.motion_profile
    }

    /// Mutable motion shortcut bindings.
    pub fn motion_profile_mut(&mut self) -> &mut Profile<MotionShortcut, MotionAction> {
        &mut self.motion_profile
    }

    /// Action `event` resolves to, typed for the event's arity.
    #[must_use]
    pub fn resolve(&self, event: &Event) -> Option<Action> {
        if let Event::Click(click) = event {
            let shortcut = click.shortcut();
            let action = self.click_profile.action(&shortcut);
            if action.is_none() {
                log::trace!("{}: click {shortcut} is unbound", self.name);
            }
            return action.map(Action::Click);
        }
        let shortcut = match event {
            Event::Dof1(e) => e.shortcut(),
            Event::Dof2(e) => e.shortcut(),
            Event::Dof3(e) => e.shortcut(),
            Event::Dof6(e) => e.shortcut(),
            Event::Click(_) => return None,
        };
        let Some(kind) = self.motion_profile.action(&shortcut) else {
            log::trace!("{}: motion {shortcut} is unbound", self.name);
            return None;
        };
        let action = Action::for_motion(kind, event.arity());
        if action.is_none() {
            log::debug!(
                "{}: {kind} needs more degrees of freedom than {:?} events carry",
                self.name,
                event.arity()
            );
        }
        action
    }

    /// Resolve `event` and run the bound action on `grabber`. Returns
    /// whether anything was dispatched.
    pub(super) fn handle(
        &self,
        grabber: &InteractiveGrabberRef,
        event: &Event,
        view: &Viewpoint,
    ) -> bool {
        let Some(action) = self.resolve(event) else {
            return false;
        };
        let Ok(mut grabber) = grabber.try_borrow_mut() else {
            log::warn!("{}: grabber is busy, {action:?} dropped", self.name);
            return false;
        };
        grabber.set_action(Some(action));
        grabber.perform_interaction(event, view);
        true
    }

    /// One-line summary followed by the bindings, sorted.
    #[must_use]
    pub fn info(&self) -> String {
        let mut out = format!(
            "{} ({} grabbers)\n",
            self.name,
            self.grabbers.len()
        );
        let mut motion: Vec<String> = self
            .motion_profile
            .bindings()
            .map(|(s, a)| format!("  {s} -> {a}"))
            .collect();
        motion.sort();
        let mut click: Vec<String> = self
            .click_profile
            .bindings()
            .map(|(s, a)| format!("  {s} -> {a:?}"))
            .collect();
        click.sort();
        if !motion.is_empty() {
            out.push_str(" Motion bindings:\n");
            for line in motion {
                let _ = writeln!(out, " {line}");
            }
        }
        if !click.is_empty() {
            out.push_str(" Click bindings:\n");
            for line in click {
                let _ = writeln!(out, " {line}");
            }
        }
        out
    }
}
