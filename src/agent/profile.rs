//! Shortcut → action binding tables.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Maps shortcuts of type `S` to actions of type `A`.
///
/// A shortcut binds at most one action; an action may be bound to any
/// number of shortcuts.
#[derive(Clone)]
pub struct Profile<S, A> {
    bindings: HashMap<S, A>,
}

impl<S, A> Default for Profile<S, A> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<S: fmt::Display, A: fmt::Debug> fmt::Debug for Profile<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(s, a)| (s.to_string(), a)))
            .finish()
    }
}

impl<S, A> Profile<S, A>
where
    S: Eq + Hash + Copy,
    A: Copy + PartialEq,
{
    /// Empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `shortcut` to `action`, returning the action it replaced.
    pub fn set_binding(&mut self, shortcut: S, action: A) -> Option<A> {
        self.bindings.insert(shortcut, action)
    }

    /// Unbind `shortcut`, returning the action it was bound to.
    pub fn remove_binding(&mut self, shortcut: &S) -> Option<A> {
        self.bindings.remove(shortcut)
    }

    /// Whether `shortcut` is bound.
    #[must_use]
    pub fn has_binding(&self, shortcut: &S) -> bool {
        self.bindings.contains_key(shortcut)
    }

    /// Action bound to `shortcut`.
    #[must_use]
    pub fn action(&self, shortcut: &S) -> Option<A> {
        self.bindings.get(shortcut).copied()
    }

    /// Whether any shortcut is bound to `action`.
    #[must_use]
    pub fn is_action_bound(&self, action: A) -> bool {
        self.bindings.values().any(|a| *a == action)
    }

    /// Every shortcut bound to `action`.
    #[must_use]
    pub fn shortcuts_for(&self, action: A) -> Vec<S> {
        self.bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(s, _)| *s)
            .collect()
    }

    /// Drop every binding.
    pub fn remove_bindings(&mut self) {
        self.bindings.clear();
    }

    /// Iterate over `(shortcut, action)` pairs in arbitrary order.
    pub fn bindings(&self) -> impl Iterator<Item = (&S, &A)> {
        self.bindings.iter()
    }

    /// Number of bound shortcuts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<S, A> FromIterator<(S, A)> for Profile<S, A>
where
    S: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (S, A)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Button, Modifiers, MotionShortcut};
    use crate::interactive::MotionAction;

    #[test]
    fn bind_rebind_and_unbind() {
        let left = MotionShortcut::plain(Button::Left);
        let mut profile = Profile::new();
        assert_eq!(profile.set_binding(left, MotionAction::Rotate), None);
        assert_eq!(
            profile.set_binding(left, MotionAction::Translate),
            Some(MotionAction::Rotate)
        );
        assert!(profile.has_binding(&left));
        assert_eq!(profile.action(&left), Some(MotionAction::Translate));
        assert!(!profile.is_action_bound(MotionAction::Rotate));

        assert_eq!(profile.remove_binding(&left), Some(MotionAction::Translate));
        assert!(!profile.has_binding(&left));
        assert!(profile.is_empty());
    }

    #[test]
    fn modifiers_distinguish_shortcuts() {
        let profile: Profile<_, _> = [
            (MotionShortcut::plain(Button::Left), MotionAction::Rotate),
            (
                MotionShortcut::new(Modifiers::SHIFT, Button::Left),
                MotionAction::ZoomOnRegion,
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(profile.len(), 2);
        assert_eq!(
            profile.action(&MotionShortcut::new(Modifiers::SHIFT, Button::Left)),
            Some(MotionAction::ZoomOnRegion)
        );
        assert_eq!(
            profile.action(&MotionShortcut::new(Modifiers::CTRL, Button::Left)),
            None
        );
    }

    #[test]
    fn shortcuts_for_lists_every_binding_of_an_action() {
        let mut profile = Profile::new();
        let _ = profile.set_binding(MotionShortcut::plain(Button::Middle), MotionAction::Zoom);
        let _ = profile.set_binding(MotionShortcut::plain(Button::Wheel), MotionAction::Zoom);
        let _ = profile.set_binding(MotionShortcut::plain(Button::Left), MotionAction::Rotate);
        assert_eq!(profile.shortcuts_for(MotionAction::Zoom).len(), 2);

        profile.remove_bindings();
        assert!(profile.is_empty());
    }
}
