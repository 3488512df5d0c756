//! Owner of every agent in a scene.

use rustc_hash::FxHashSet;

use super::{Agent, AnyGrabber, MotionAgent};
use crate::timing::Tick;

/// Registers grabbers with every agent and ticks them once per update.
#[derive(Debug, Default)]
pub struct InputHandler {
    agents: Vec<Agent>,
    motion_agents: Vec<MotionAgent>,
}

impl InputHandler {
    /// Handler with no agents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `agent`, returning its index.
    pub fn register_agent(&mut self, agent: Agent) -> usize {
        self.agents.push(agent);
        self.agents.len() - 1
    }

    /// Take ownership of `agent`, returning its index.
    pub fn register_motion_agent(&mut self, agent: MotionAgent) -> usize {
        self.motion_agents.push(agent);
        self.motion_agents.len() - 1
    }

    /// Plain agent at `index`.
    #[must_use]
    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    /// Mutable plain agent at `index`.
    pub fn agent_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.agents.get_mut(index)
    }

    /// Motion agent at `index`.
    #[must_use]
    pub fn motion_agent(&self, index: usize) -> Option<&MotionAgent> {
        self.motion_agents.get(index)
    }

    /// Mutable motion agent at `index`.
    pub fn motion_agent_mut(&mut self, index: usize) -> Option<&mut MotionAgent> {
        self.motion_agents.get_mut(index)
    }

    /// Every agent, plain ones first.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents
            .iter()
            .chain(self.motion_agents.iter().map(MotionAgent::agent))
    }

    fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents
            .iter_mut()
            .chain(self.motion_agents.iter_mut().map(MotionAgent::agent_mut))
    }

    /// First agent called `name`.
    #[must_use]
    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents().find(|a| a.name() == name)
    }

    /// Register `grabber` with every agent: plain grabbers go to the pool,
    /// profile-bound ones to each agent's frame branch. Agents without a
    /// frame branch skip profile-bound grabbers. Returns how many agents
    /// took it.
    pub fn add_in_all_agent_pools(&mut self, grabber: &AnyGrabber) -> usize {
        let mut added = 0;
        for agent in self.agents_mut() {
            match agent.register(grabber.clone()) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => log::debug!("{}: {e}", agent.name()),
            }
        }
        added
    }

    /// Remove `grabber` from every agent. Returns how many agents held it.
    pub fn remove_from_all_agent_pools(&mut self, grabber: &AnyGrabber) -> usize {
        self.agents_mut()
            .map(|agent| agent.remove_grabber(grabber))
            .filter(|removed| *removed)
            .count()
    }

    /// Whether any agent holds `grabber`.
    #[must_use]
    pub fn is_in_any_agent_pool(&self, grabber: &AnyGrabber) -> bool {
        self.agents().any(|a| a.has_grabber(grabber))
    }

    /// Tick every registered grabber once, however many agents share it.
    pub fn update(&self, now: Tick) {
        let mut seen = FxHashSet::default();
        for grabber in self.agents().flat_map(Agent::grabbers) {
            if seen.insert(grabber.addr()) {
                grabber.update(now);
            }
        }
    }

    /// Summary of every agent.
    #[must_use]
    pub fn info(&self) -> String {
        self.agents().map(Agent::info).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::agent::{Grabber, InteractiveGrabber};
    use crate::event::{Dof2Event, Event};
    use crate::eye::{Eye, EyeKind, Viewpoint};
    use crate::frame::Frame;
    use crate::interactive::{Action, Dof2Action, InteractiveFrame, MotionAction};

    #[derive(Default)]
    struct Ticker {
        ticks: usize,
    }

    impl Grabber for Ticker {
        fn check_if_grabs_input(&self, _event: &Event, _view: &Viewpoint) -> bool {
            false
        }

        fn perform_interaction(&mut self, _event: &Event, _view: &Viewpoint) {}

        fn update(&mut self, _now: Tick) {
            self.ticks += 1;
        }
    }

    fn handler() -> (InputHandler, Rc<RefCell<Eye>>) {
        let eye = Rc::new(RefCell::new(Eye::new(EyeKind::Perspective3D)));
        let mut handler = InputHandler::new();
        let _ = handler.register_agent(Agent::new("plain"));
        let _ = handler.register_motion_agent(MotionAgent::new("mouse", Rc::clone(&eye)));
        (handler, eye)
    }

    #[test]
    fn interactive_frames_reach_agents_with_a_frame_branch() {
        let (mut handler, _eye) = handler();
        let frame = AnyGrabber::interactive(Rc::new(RefCell::new(InteractiveFrame::new(Frame::new()))));
        assert_eq!(handler.add_in_all_agent_pools(&frame), 1);
        assert!(handler
            .agent_by_name("mouse")
            .is_some_and(|a| a.has_grabber(&frame)));
        assert!(handler.agent_by_name("plain").is_some_and(|a| !a.has_grabber(&frame)));

        assert_eq!(handler.remove_from_all_agent_pools(&frame), 1);
        assert!(!handler.is_in_any_agent_pool(&frame));
    }

    #[test]
    fn shared_grabbers_tick_once() {
        let (mut handler, _eye) = handler();
        let ticker = Rc::new(RefCell::new(Ticker::default()));
        assert_eq!(handler.add_in_all_agent_pools(&AnyGrabber::plain(Rc::clone(&ticker))), 2);
        handler.update(16);
        assert_eq!(ticker.borrow().ticks, 1);
    }

    #[test]
    fn update_drives_spinning_frames() {
        let (mut handler, _eye) = handler();
        let frame = Rc::new(RefCell::new(InteractiveFrame::new(Frame::new())));
        let _ = handler.add_in_all_agent_pools(&AnyGrabber::interactive(Rc::clone(&frame)));
        if let Some(action) = Dof2Action::new(MotionAction::Rotate) {
            frame.borrow_mut().set_action(Some(Action::Dof2(action)));
        }
        let mut drag = Dof2Event::relative(410.0, 300.0, 10.0, 0.0);
        drag.meta.speed = 5.0;
        let view = handler
            .motion_agent(0)
            .and_then(MotionAgent::viewpoint);
        let Some(view) = view else {
            unreachable!("eye is not borrowed");
        };
        frame.borrow_mut().perform_interaction(&Event::from(drag), &view);
        assert!(frame.borrow().is_spinning());

        let start = frame.borrow().frame().borrow().orientation();
        for now in (0..200).step_by(10) {
            handler.update(now);
        }
        let end = frame.borrow().frame().borrow().orientation();
        assert!(!end.abs_diff_eq(start, 1e-6));
        assert!(frame.borrow().frame().borrow().position().abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
