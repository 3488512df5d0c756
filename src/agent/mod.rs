//! Event routing: which object a gesture targets and what it does.
//!
//! An [`Agent`] owns two kinds of grabbers:
//!
//! - plain [`Grabber`]s in its own pool, which receive events directly and
//!   interpret them however they like;
//! - profile-bound [`InteractiveGrabber`]s, which always live in a
//!   [`Branch`]. The branch resolves the event's shortcut to an action
//!   before the grabber sees it.
//!
//! Per event, the agent first settles the tracked grabber
//! ([`Agent::update_tracked_grabber`], plain pool before branches), then
//! dispatches to it, or to the default grabber when nothing is tracked.
//!
//! Grabbers are shared `Rc<RefCell<_>>` handles compared by address. Pools
//! are snapshotted before iteration, so a grabber may be removed while an
//! event is in flight.

pub mod branch;
pub mod handler;
pub mod keyboard;
pub mod motion;
pub mod profile;

use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::rc::Rc;

pub use branch::{Branch, BranchId};
pub use handler::InputHandler;
pub use keyboard::{default_key_bindings, KeyAction, KeyAgent};
pub use motion::{MotionAgent, PickingMode, Target, DEFAULT_WHEEL_SENSITIVITY};
pub use profile::Profile;
use rustc_hash::FxHashMap;

use crate::error::VantageError;
use crate::event::{Arity, Event};
use crate::eye::Viewpoint;
use crate::interactive::Action;
use crate::timing::Tick;

// ── Grabber traits ──────────────────────────────────────────────────────

/// Anything an agent can route events to.
pub trait Grabber {
    /// Whether `event` targets this object (the pick test).
    fn check_if_grabs_input(&self, event: &Event, view: &Viewpoint) -> bool;

    /// React to `event`.
    fn perform_interaction(&mut self, event: &Event, view: &Viewpoint);

    /// Advance time-driven state to `now`.
    fn update(&mut self, _now: Tick) {}
}

/// A grabber whose behaviour is chosen by a branch's bindings.
pub trait InteractiveGrabber: Grabber {
    /// Currently bound action.
    fn action(&self) -> Option<Action>;

    /// Bind the action the next [`Grabber::perform_interaction`] runs.
    fn set_action(&mut self, action: Option<Action>);
}

/// Shared handle to a plain grabber.
pub type GrabberRef = Rc<RefCell<dyn Grabber>>;

/// Shared handle to a profile-bound grabber.
pub type InteractiveGrabberRef = Rc<RefCell<dyn InteractiveGrabber>>;

/// Address identifying a shared grabber, independent of the trait object
/// it is viewed through.
pub(crate) fn addr<T: ?Sized>(grabber: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(grabber).cast::<()>()
}

/// A plain or profile-bound grabber handle.
#[derive(Clone)]
pub enum AnyGrabber {
    /// Receives events directly.
    Plain(GrabberRef),
    /// Receives events through its branch's bindings.
    Interactive(InteractiveGrabberRef),
}

impl fmt::Debug for AnyGrabber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_interactive() { "Interactive" } else { "Plain" };
        write!(f, "{kind}({:p})", self.addr())
    }
}

impl AnyGrabber {
    /// Wrap a plain grabber.
    #[must_use]
    pub fn plain<G: Grabber + 'static>(grabber: Rc<RefCell<G>>) -> Self {
        Self::Plain(grabber)
    }

    /// Wrap a profile-bound grabber.
    #[must_use]
    pub fn interactive<G: InteractiveGrabber + 'static>(grabber: Rc<RefCell<G>>) -> Self {
        Self::Interactive(grabber)
    }

    /// Whether the grabber goes through a branch.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive(_))
    }

    pub(crate) fn addr(&self) -> *const () {
        match self {
            Self::Plain(g) => addr(g),
            Self::Interactive(g) => addr(g),
        }
    }

    /// Whether both handles point at the same object.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    /// Pick test. A grabber that is already borrowed never claims.
    #[must_use]
    pub fn grabs(&self, event: &Event, view: &Viewpoint) -> bool {
        match self {
            Self::Plain(g) => g
                .try_borrow()
                .is_ok_and(|g| g.check_if_grabs_input(event, view)),
            Self::Interactive(g) => g
                .try_borrow()
                .is_ok_and(|g| g.check_if_grabs_input(event, view)),
        }
    }

    /// Advance the grabber's time-driven state.
    pub fn update(&self, now: Tick) {
        let updated = match self {
            Self::Plain(g) => g.try_borrow_mut().ok().map(|mut g| g.update(now)),
            Self::Interactive(g) => g.try_borrow_mut().ok().map(|mut g| g.update(now)),
        };
        if updated.is_none() {
            log::warn!("grabber {:p} is busy, tick {now} skipped", self.addr());
        }
    }
}

// ── Agent ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Slot {
    grabber: AnyGrabber,
    /// Owning branch of an interactive grabber.
    branch: Option<BranchId>,
}

/// Routes device-neutral events to grabbers.
pub struct Agent {
    name: String,
    tracking: bool,
    pool: Vec<GrabberRef>,
    branches: Vec<Branch>,
    next_branch: u32,
    frame_branch: Option<BranchId>,
    tracked: Option<Slot>,
    default: Option<Slot>,
    sensitivities: FxHashMap<Arity, Vec<f32>>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tracking", &self.tracking)
            .field("pool", &self.pool.len())
            .field("branches", &self.branches)
            .field("tracked", &self.tracked)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Agent with empty pools and tracking enabled.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracking: true,
            pool: Vec::new(),
            branches: Vec::new(),
            next_branch: 0,
            frame_branch: None,
            tracked: None,
            default: None,
            sensitivities: FxHashMap::default(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether events may change the tracked grabber.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Enable or disable tracking. Disabling drops the tracked grabber, so
    /// every event goes to the default grabber.
    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
        if !tracking {
            self.tracked = None;
        }
    }

    // ── Sensitivities ───────────────────────────────────────────────────

    /// Per-axis scale applied to events of `arity`. Missing entries are 1.
    #[must_use]
    pub fn sensitivities(&self, arity: Arity) -> &[f32] {
        self.sensitivities.get(&arity).map_or(&[][..], Vec::as_slice)
    }

    /// Set the per-axis scale for events of `arity`.
    pub fn set_sensitivities(&mut self, arity: Arity, values: Vec<f32>) {
        let _ = self.sensitivities.insert(arity, values);
    }

    // ── Grabbers ────────────────────────────────────────────────────────

    /// Add a plain grabber to the pool. Profile-bound grabbers need a
    /// branch and are rejected with [`VantageError::BranchRequired`].
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::BranchRequired`] for interactive grabbers.
    pub fn add_grabber(&mut self, grabber: AnyGrabber) -> Result<bool, VantageError> {
        match grabber {
            AnyGrabber::Interactive(_) => Err(VantageError::BranchRequired),
            AnyGrabber::Plain(g) => {
                if self.has_grabber(&AnyGrabber::Plain(Rc::clone(&g))) {
                    return Ok(false);
                }
                self.pool.push(g);
                Ok(true)
            }
        }
    }

    /// Add a profile-bound grabber to `branch`. Returns `false` when the
    /// grabber already belongs to this agent.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::UnknownBranch`] when `branch` is not one of
    /// this agent's branches.
    pub fn add_grabber_to_branch(
        &mut self,
        grabber: InteractiveGrabberRef,
        branch: BranchId,
    ) -> Result<bool, VantageError> {
        if self.branch(branch).is_none() {
            return Err(VantageError::UnknownBranch(branch.get()));
        }
        if self.has_grabber(&AnyGrabber::Interactive(Rc::clone(&grabber))) {
            return Ok(false);
        }
        Ok(self
            .branch_mut(branch)
            .is_some_and(|b| b.add_grabber(grabber)))
    }

    /// Add any grabber where it belongs: plain grabbers to the pool,
    /// profile-bound ones to the designated frame branch.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::BranchRequired`] for interactive grabbers
    /// when no frame branch is designated.
    pub fn register(&mut self, grabber: AnyGrabber) -> Result<bool, VantageError> {
        match grabber {
            AnyGrabber::Interactive(g) => match self.frame_branch {
                Some(branch) => self.add_grabber_to_branch(g, branch),
                None => Err(VantageError::BranchRequired),
            },
            plain @ AnyGrabber::Plain(_) => self.add_grabber(plain),
        }
    }

    /// Remove `grabber` from the pool or its branch. Clears the tracked and
    /// default grabbers when they are the removed one.
    pub fn remove_grabber(&mut self, grabber: &AnyGrabber) -> bool {
        let target = grabber.addr();
        let before = self.pool.len();
        self.pool.retain(|g| addr(g) != target);
        let mut removed = self.pool.len() != before;
        if !removed {
            removed = self
                .branches
                .iter_mut()
                .any(|b| b.remove_grabber(target));
        }
        if removed {
            self.forget(|slot| slot.grabber.addr() == target);
        }
        removed
    }

    /// Empty the pool and every branch.
    pub fn remove_grabbers(&mut self) {
        self.pool.clear();
        for branch in &mut self.branches {
            branch.reset();
        }
        self.tracked = None;
        self.default = None;
    }

    /// Whether `grabber` is in the pool or in any branch.
    #[must_use]
    pub fn has_grabber(&self, grabber: &AnyGrabber) -> bool {
        let target = grabber.addr();
        self.pool.iter().any(|g| addr(g) == target)
            || self
                .branches
                .iter()
                .any(|b| b.grabbers().iter().any(|g| addr(g) == target))
    }

    /// Every grabber: the plain pool, then each branch in order.
    #[must_use]
    pub fn grabbers(&self) -> Vec<AnyGrabber> {
        self.pool
            .iter()
            .map(|g| AnyGrabber::Plain(Rc::clone(g)))
            .chain(self.branches.iter().flat_map(|b| {
                b.grabbers()
                    .iter()
                    .map(|g| AnyGrabber::Interactive(Rc::clone(g)))
            }))
            .collect()
    }

    // ── Branches ────────────────────────────────────────────────────────

    /// Append a new, empty branch.
    pub fn append_branch(&mut self, name: impl Into<String>) -> BranchId {
        let id = BranchId(self.next_branch);
        self.next_branch += 1;
        self.branches.push(Branch::new(id, name));
        id
    }

    /// Branch `id`.
    #[must_use]
    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id() == id)
    }

    /// Mutable branch `id`, for editing its profiles.
    pub fn branch_mut(&mut self, id: BranchId) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.id() == id)
    }

    /// Branches in append order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Branch owning `grabber`.
    #[must_use]
    pub fn branch_of(&self, grabber: &InteractiveGrabberRef) -> Option<BranchId> {
        self.branches
            .iter()
            .find(|b| b.has_grabber(grabber))
            .map(Branch::id)
    }

    /// Empty branch `id`, keeping its bindings.
    pub fn reset_branch(&mut self, id: BranchId) -> bool {
        let Some(branch) = self.branch_mut(id) else {
            return false;
        };
        branch.reset();
        self.forget(|slot| slot.branch == Some(id));
        true
    }

    /// Reset then remove branch `id`.
    pub fn prune_branch(&mut self, id: BranchId) -> bool {
        if !self.reset_branch(id) {
            return false;
        }
        self.branches.retain(|b| b.id() != id);
        if self.frame_branch == Some(id) {
            self.frame_branch = None;
        }
        true
    }

    /// Branch that [`Agent::register`] sends profile-bound grabbers to.
    #[must_use]
    pub fn frame_branch(&self) -> Option<BranchId> {
        self.frame_branch
    }

    /// Designate the branch [`Agent::register`] sends profile-bound
    /// grabbers to.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::UnknownBranch`] when `id` is not one of this
    /// agent's branches.
    pub fn set_frame_branch(&mut self, id: BranchId) -> Result<(), VantageError> {
        if self.branch(id).is_none() {
            return Err(VantageError::UnknownBranch(id.get()));
        }
        self.frame_branch = Some(id);
        Ok(())
    }

    fn forget(&mut self, matches: impl Fn(&Slot) -> bool) {
        if self.tracked.as_ref().is_some_and(&matches) {
            self.tracked = None;
        }
        if self.default.as_ref().is_some_and(&matches) {
            self.default = None;
        }
    }

    fn slot_for(&self, grabber: &AnyGrabber) -> Option<Slot> {
        match grabber {
            AnyGrabber::Plain(g) => {
                let target = addr(g);
                self.pool.iter().any(|p| addr(p) == target).then(|| Slot {
                    grabber: grabber.clone(),
                    branch: None,
                })
            }
            AnyGrabber::Interactive(g) => self.branch_of(g).map(|id| Slot {
                grabber: grabber.clone(),
                branch: Some(id),
            }),
        }
    }

    // ── Tracked and default grabbers ────────────────────────────────────

    /// Grabber the agent is tracking.
    #[must_use]
    pub fn tracked_grabber(&self) -> Option<&AnyGrabber> {
        self.tracked.as_ref().map(|s| &s.grabber)
    }

    /// Grabber receiving events when nothing is tracked.
    #[must_use]
    pub fn default_grabber(&self) -> Option<&AnyGrabber> {
        self.default.as_ref().map(|s| &s.grabber)
    }

    /// Grabber the next event goes to.
    #[must_use]
    pub fn input_grabber(&self) -> Option<&AnyGrabber> {
        self.tracked_grabber().or_else(|| self.default_grabber())
    }

    /// Make `grabber` the default. It must already be in the pool or in one
    /// of the branches, whose bindings will then route its events.
    pub fn set_default_grabber(&mut self, grabber: &AnyGrabber) -> bool {
        match self.slot_for(grabber) {
            Some(slot) => {
                self.default = Some(slot);
                true
            }
            None => {
                log::warn!(
                    "{}: default grabber must belong to the agent first",
                    self.name
                );
                false
            }
        }
    }

    /// Make a profile-bound grabber the default, adding it to `branch`
    /// first when the agent does not hold it yet.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::UnknownBranch`] when the grabber has to be
    /// added and `branch` is not one of this agent's branches.
    pub fn set_default_interactive_grabber(
        &mut self,
        grabber: InteractiveGrabberRef,
        branch: BranchId,
    ) -> Result<bool, VantageError> {
        let handle = AnyGrabber::Interactive(Rc::clone(&grabber));
        if !self.has_grabber(&handle) {
            let _ = self.add_grabber_to_branch(grabber, branch)?;
        }
        Ok(self.set_default_grabber(&handle))
    }

    /// Clear the default grabber.
    pub fn reset_default_grabber(&mut self) {
        self.default = None;
    }

    /// Settle the tracked grabber for `event`. The current one is kept
    /// while it still claims the event; otherwise the plain pool is
    /// scanned first, then each branch in append order.
    pub fn update_tracked_grabber(&mut self, event: &Event, view: &Viewpoint) -> Option<AnyGrabber> {
        if !self.tracking {
            return None;
        }
        if let Some(slot) = &self.tracked {
            if slot.grabber.grabs(event, view) {
                return Some(slot.grabber.clone());
            }
        }
        let previous = self.tracked.take();

        let pool = self.pool.clone();
        let picked = pool
            .into_iter()
            .map(AnyGrabber::Plain)
            .find(|g| g.grabs(event, view))
            .map(|grabber| Slot {
                grabber,
                branch: None,
            })
            .or_else(|| {
                self.branches.iter().find_map(|b| {
                    b.pick(event, view).map(|g| Slot {
                        grabber: AnyGrabber::Interactive(g),
                        branch: Some(b.id()),
                    })
                })
            });

        if previous.is_some() || picked.is_some() {
            log::trace!(
                "{}: tracking {:?}",
                self.name,
                picked.as_ref().map(|s| &s.grabber)
            );
        }
        self.tracked = picked;
        self.tracked_grabber().cloned()
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Route `event` to the tracked grabber, or to the default one.
    /// Returns whether a grabber acted on it.
    ///
    /// Relative motion carrying no delta is dropped unless it ends a
    /// gesture. Motion is scaled by the arity's sensitivities first.
    pub fn handle(&self, event: Event, view: &Viewpoint) -> bool {
        let mut event = event;
        // Gesture boundaries pass even when null: grabbers reset per-gesture
        // state on the fired event and finish on the flushed one.
        if event.is_relative() && event.is_null() && !event.is_fired() && !event.is_flushed() {
            log::trace!("{}: null event dropped", self.name);
            return false;
        }
        let arity = event.arity();
        event.modulate(self.sensitivities(arity));

        let Some(slot) = self.tracked.clone().or_else(|| self.default.clone()) else {
            return false;
        };
        match slot.grabber {
            AnyGrabber::Plain(g) => {
                let Ok(mut g) = g.try_borrow_mut() else {
                    log::warn!("{}: grabber is busy, event dropped", self.name);
                    return false;
                };
                g.perform_interaction(&event, view);
                true
            }
            AnyGrabber::Interactive(g) => {
                let Some(branch) = slot.branch.and_then(|id| self.branch(id)) else {
                    log::debug!("{}: grabber has no reachable branch", self.name);
                    return false;
                };
                branch.handle(&g, &event, view)
            }
        }
    }

    /// Tick every grabber once.
    pub fn update(&self, now: Tick) {
        for grabber in self.grabbers() {
            grabber.update(now);
        }
    }

    /// Human-readable summary of pools and bindings.
    #[must_use]
    pub fn info(&self) -> String {
        let mut out = format!("Agent: {}\n", self.name);
        let _ = writeln!(
            out,
            "Tracking: {}",
            if self.tracking { "on" } else { "off" }
        );
        let _ = writeln!(out, "Plain grabbers: {}", self.pool.len());
        if !self.branches.is_empty() {
            out.push_str("Branches:\n");
            for (i, branch) in self.branches.iter().enumerate() {
                let _ = write!(out, "{}. {}", i + 1, branch.info());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::event::{Button, ClickEvent, Dof1Event, Dof2Event, MotionShortcut};
    use crate::eye::Lens;
    use crate::frame::{Frame, Pose};
    use crate::interactive::{InteractiveFrame, MotionAction};

    fn viewpoint() -> Viewpoint {
        Viewpoint::new(
            Lens::default(),
            Pose::new(Vec3::new(0.0, 0.0, 300.0), Quat::IDENTITY),
            Vec3::ZERO,
        )
    }

    /// Plain grabber claiming every pointer event and counting deliveries.
    #[derive(Default)]
    struct Counter {
        claims: bool,
        received: usize,
        last: Option<Event>,
    }

    impl Grabber for Counter {
        fn check_if_grabs_input(&self, event: &Event, _view: &Viewpoint) -> bool {
            self.claims && event.pointer().is_some()
        }

        fn perform_interaction(&mut self, event: &Event, _view: &Viewpoint) {
            self.received += 1;
            self.last = Some(*event);
        }
    }

    fn counter(claims: bool) -> Rc<RefCell<Counter>> {
        Rc::new(RefCell::new(Counter {
            claims,
            ..Counter::default()
        }))
    }

    fn frame_at_origin() -> Rc<RefCell<InteractiveFrame>> {
        Rc::new(RefCell::new(InteractiveFrame::new(Frame::new())))
    }

    fn center() -> Event {
        Dof2Event::absolute(400.0, 300.0).into()
    }

    #[test]
    fn plain_grabber_wins_over_branch_grabber() {
        let mut agent = Agent::new("mouse");
        let branch = agent.append_branch("frames");
        let plain = counter(true);
        let frame = frame_at_origin();
        assert_eq!(agent.add_grabber_to_branch(frame, branch).ok(), Some(true));
        assert_eq!(agent.add_grabber(AnyGrabber::plain(Rc::clone(&plain))).ok(), Some(true));

        let tracked = agent.update_tracked_grabber(&center(), &viewpoint());
        let Some(tracked) = tracked else {
            unreachable!("both grabbers claim the screen center");
        };
        assert!(tracked.same(&AnyGrabber::plain(plain)));
    }

    #[test]
    fn interactive_grabber_without_branch_is_rejected() {
        let mut agent = Agent::new("mouse");
        let frame = AnyGrabber::interactive(frame_at_origin());
        assert!(matches!(
            agent.add_grabber(frame.clone()),
            Err(VantageError::BranchRequired)
        ));
        assert!(matches!(agent.register(frame.clone()), Err(VantageError::BranchRequired)));
        assert!(!agent.has_grabber(&frame));

        let AnyGrabber::Interactive(handle) = frame else {
            unreachable!("built as interactive");
        };
        assert!(matches!(
            agent.add_grabber_to_branch(handle, BranchId(7)),
            Err(VantageError::UnknownBranch(7))
        ));
    }

    #[test]
    fn register_uses_the_frame_branch() {
        let mut agent = Agent::new("mouse");
        let branch = agent.append_branch("frames");
        assert!(agent.set_frame_branch(branch).is_ok());
        let frame = AnyGrabber::interactive(frame_at_origin());
        assert_eq!(agent.register(frame.clone()).ok(), Some(true));
        assert_eq!(agent.register(frame.clone()).ok(), Some(false));
        assert!(agent.branch(branch).is_some_and(|b| b.grabbers().len() == 1));
    }

    #[test]
    fn tracking_is_sticky() {
        let mut agent = Agent::new("mouse");
        let first = counter(true);
        let second = counter(true);
        let _ = agent.add_grabber(AnyGrabber::plain(Rc::clone(&first)));
        let _ = agent.add_grabber(AnyGrabber::plain(Rc::clone(&second)));
        let _ = agent.update_tracked_grabber(&center(), &viewpoint());

        assert!(agent
            .tracked_grabber()
            .is_some_and(|g| g.same(&AnyGrabber::plain(Rc::clone(&first)))));
        first.borrow_mut().claims = false;
        let _ = agent.update_tracked_grabber(&center(), &viewpoint());
        assert!(agent
            .tracked_grabber()
            .is_some_and(|g| g.same(&AnyGrabber::plain(Rc::clone(&second)))));
        first.borrow_mut().claims = true;
        let _ = agent.update_tracked_grabber(&center(), &viewpoint());
        assert!(agent
            .tracked_grabber()
            .is_some_and(|g| g.same(&AnyGrabber::plain(second))));
    }

    #[test]
    fn null_relative_events_pass_only_at_gesture_boundaries() {
        let mut agent = Agent::new("mouse");
        let plain = counter(false);
        let handle = AnyGrabber::plain(Rc::clone(&plain));
        let _ = agent.add_grabber(handle.clone());
        assert!(agent.set_default_grabber(&handle));

        let idle: Event = Dof2Event::relative(10.0, 10.0, 0.0, 0.0).into();
        assert!(!agent.handle(idle, &viewpoint()));
        assert_eq!(plain.borrow().received, 0);

        let press: Event = Dof2Event::relative(10.0, 10.0, 0.0, 0.0).fired().into();
        assert!(agent.handle(press, &viewpoint()));
        assert_eq!(plain.borrow().received, 1);

        let release: Event = Dof2Event::relative(10.0, 10.0, 0.0, 0.0).flushed().into();
        assert!(agent.handle(release, &viewpoint()));
        assert_eq!(plain.borrow().received, 2);
    }

    #[test]
    fn sensitivities_scale_motion() {
        let mut agent = Agent::new("mouse");
        let plain = counter(false);
        let handle = AnyGrabber::plain(Rc::clone(&plain));
        let _ = agent.add_grabber(handle.clone());
        assert!(agent.set_default_grabber(&handle));
        agent.set_sensitivities(Arity::Dof1, vec![20.0]);

        assert!(agent.handle(Dof1Event::wheel(0.5).into(), &viewpoint()));
        let received = plain.borrow().last;
        let Some(Event::Dof1(wheel)) = received else {
            unreachable!("a wheel event was delivered");
        };
        assert!((wheel.dx - 10.0).abs() < 1e-6);
    }

    #[test]
    fn branch_default_grabber_gets_bound_action() {
        let mut agent = Agent::new("mouse");
        let branch = agent.append_branch("frames");
        let frame = frame_at_origin();
        let grabber: InteractiveGrabberRef = frame.clone();
        assert!(matches!(
            agent.set_default_interactive_grabber(Rc::clone(&grabber), BranchId(9)),
            Err(VantageError::UnknownBranch(9))
        ));
        assert!(matches!(
            agent.set_default_interactive_grabber(grabber, branch),
            Ok(true)
        ));
        if let Some(b) = agent.branch_mut(branch) {
            let _ = b
                .motion_profile_mut()
                .set_binding(MotionShortcut::plain(Button::Right), MotionAction::Translate);
        }

        // Unbound shortcut: nothing happens.
        let left: Event = Dof2Event::relative(410.0, 300.0, 10.0, 0.0)
            .with_id(Button::Left)
            .into();
        assert!(!agent.handle(left, &viewpoint()));
        assert_eq!(frame.borrow().action(), None);

        let right: Event = Dof2Event::relative(410.0, 300.0, 10.0, 0.0)
            .with_id(Button::Right)
            .into();
        assert!(agent.handle(right, &viewpoint()));
        assert_eq!(
            frame.borrow().action().and_then(|a| a.motion()),
            Some(MotionAction::Translate)
        );
        assert!(frame.borrow().frame().borrow().position().x > 0.0);
    }

    #[test]
    fn removing_a_grabber_clears_tracking_and_default() {
        let mut agent = Agent::new("mouse");
        let plain = AnyGrabber::plain(counter(true));
        let _ = agent.add_grabber(plain.clone());
        assert!(agent.set_default_grabber(&plain));
        let _ = agent.update_tracked_grabber(&center(), &viewpoint());
        assert!(agent.tracked_grabber().is_some());

        assert!(agent.remove_grabber(&plain));
        assert!(agent.tracked_grabber().is_none());
        assert!(agent.default_grabber().is_none());
        assert!(!agent.remove_grabber(&plain));
    }

    #[test]
    fn prune_branch_forgets_its_grabbers() {
        let mut agent = Agent::new("mouse");
        let branch = agent.append_branch("frames");
        assert!(agent.set_frame_branch(branch).is_ok());
        let frame = AnyGrabber::interactive(frame_at_origin());
        let _ = agent.register(frame.clone());
        assert!(agent.set_default_grabber(&frame));

        assert!(agent.prune_branch(branch));
        assert!(agent.branch(branch).is_none());
        assert!(agent.default_grabber().is_none());
        assert_eq!(agent.frame_branch(), None);
        assert!(!agent.prune_branch(branch));
    }

    #[test]
    fn plain_grabbers_receive_clicks_directly() {
        let mut agent = Agent::new("mouse");
        let plain = counter(true);
        let _ = agent.add_grabber(AnyGrabber::plain(Rc::clone(&plain)));
        let click: Event = ClickEvent::new(400.0, 300.0, Button::Left).into();
        let _ = agent.update_tracked_grabber(&click, &viewpoint());
        assert!(agent.handle(click, &viewpoint()));
        assert_eq!(plain.borrow().received, 1);
        assert!(agent.info().contains("Plain grabbers: 1"));
    }
}
