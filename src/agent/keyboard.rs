//! Keyboard shortcuts for eye-level commands.
//!
//! Key presses never pick a target: they resolve to a [`KeyAction`] the
//! host applies to its eye, either itself or through
//! [`KeyAgent::handle_on`].

use serde::{Deserialize, Serialize};

use super::profile::Profile;
use crate::event::{Key, KeyEvent, KeyboardShortcut, Modifiers, NamedKey};
use crate::eye::Eye;

/// Eye-level command bound to a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Move the eye left by a step proportional to the fly speed.
    MoveLeft,
    /// Move the eye right.
    MoveRight,
    /// Move the eye up.
    MoveUp,
    /// Move the eye down.
    MoveDown,
    /// Smoothly bring the whole scene into view.
    InterpolateToFitScene,
    /// Bring the whole scene into view at once.
    ShowAll,
    /// Switch between perspective and orthographic projection.
    ToggleEyeKind,
    /// Record the eye's pose into path `key`.
    AddKeyFrameToPath(i32),
    /// Start or stop playing path `key`.
    PlayPath(i32),
    /// Delete path `key`.
    DeletePath(i32),
}

/// The stock keyboard bindings:
///
/// | Shortcut | Action |
/// |---|---|
/// | arrows | move the eye |
/// | `s` / `S` | interpolate to fit / show all |
/// | `e` | toggle eye kind |
/// | `1`..`3` | play path |
/// | Ctrl+`1`..`3` | add keyframe |
/// | Alt+`1`..`3` | delete path |
#[must_use]
pub fn default_key_bindings() -> Vec<(KeyboardShortcut, KeyAction)> {
    let named = |k| KeyboardShortcut::new(Modifiers::empty(), Key::Named(k));
    let mut bindings = vec![
        (named(NamedKey::Left), KeyAction::MoveLeft),
        (named(NamedKey::Right), KeyAction::MoveRight),
        (named(NamedKey::Up), KeyAction::MoveUp),
        (named(NamedKey::Down), KeyAction::MoveDown),
        (KeyboardShortcut::char('s'), KeyAction::InterpolateToFitScene),
        (KeyboardShortcut::char('S'), KeyAction::ShowAll),
        (KeyboardShortcut::char('e'), KeyAction::ToggleEyeKind),
    ];
    for (c, key) in [('1', 1), ('2', 2), ('3', 3)] {
        bindings.push((KeyboardShortcut::char(c), KeyAction::PlayPath(key)));
        bindings.push((
            KeyboardShortcut::new(Modifiers::CTRL, Key::Char(c)),
            KeyAction::AddKeyFrameToPath(key),
        ));
        bindings.push((
            KeyboardShortcut::new(Modifiers::ALT, Key::Char(c)),
            KeyAction::DeletePath(key),
        ));
    }
    bindings
}

/// Resolves key presses to [`KeyAction`]s.
#[derive(Debug, Clone)]
pub struct KeyAgent {
    name: String,
    profile: Profile<KeyboardShortcut, KeyAction>,
}

impl Default for KeyAgent {
    fn default() -> Self {
        Self::new("keyboard")
    }
}

impl KeyAgent {
    /// Agent with the [`default_key_bindings`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile: default_key_bindings().into_iter().collect(),
        }
    }

    /// Agent with no bindings.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile: Profile::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shortcut bindings.
    #[must_use]
    pub fn profile(&self) -> &Profile<KeyboardShortcut, KeyAction> {
        &self.profile
    }

    /// Mutable shortcut bindings.
    pub fn profile_mut(&mut self) -> &mut Profile<KeyboardShortcut, KeyAction> {
        &mut self.profile
    }

    /// Bind `shortcut` to `action`.
    pub fn set_binding(&mut self, shortcut: KeyboardShortcut, action: KeyAction) {
        let _ = self.profile.set_binding(shortcut, action);
    }

    /// Unbind `shortcut`.
    pub fn remove_binding(&mut self, shortcut: &KeyboardShortcut) {
        let _ = self.profile.remove_binding(shortcut);
    }

    /// Whether `shortcut` is bound.
    #[must_use]
    pub fn has_binding(&self, shortcut: &KeyboardShortcut) -> bool {
        self.profile.has_binding(shortcut)
    }

    /// Bind an unmodified character key to play path `key`.
    pub fn set_key_to_play_path(&mut self, c: char, key: i32) {
        self.set_binding(KeyboardShortcut::char(c), KeyAction::PlayPath(key));
    }

    /// Action `event` resolves to.
    #[must_use]
    pub fn handle(&self, event: &KeyEvent) -> Option<KeyAction> {
        let shortcut = event.shortcut();
        let action = self.profile.action(&shortcut);
        if action.is_none() {
            log::trace!("{}: key {shortcut} is unbound", self.name);
        }
        action
    }

    /// Resolve `event` and apply the action to `eye`. Returns whether a
    /// binding matched.
    pub fn handle_on(&self, event: &KeyEvent, eye: &mut Eye) -> bool {
        self.handle(event).is_some_and(|action| {
            eye.perform_key_action(action);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::eye::EyeKind;

    fn press(modifiers: Modifiers, key: Key) -> KeyEvent {
        KeyEvent::new(modifiers, key)
    }

    #[test]
    fn default_bindings_resolve() {
        let agent = KeyAgent::default();
        assert_eq!(
            agent.handle(&press(Modifiers::empty(), Key::Char('s'))),
            Some(KeyAction::InterpolateToFitScene)
        );
        assert_eq!(
            agent.handle(&press(Modifiers::empty(), Key::Char('S'))),
            Some(KeyAction::ShowAll)
        );
        assert_eq!(
            agent.handle(&press(Modifiers::CTRL, Key::Char('2'))),
            Some(KeyAction::AddKeyFrameToPath(2))
        );
        assert_eq!(
            agent.handle(&press(Modifiers::ALT, Key::Char('3'))),
            Some(KeyAction::DeletePath(3))
        );
        assert_eq!(agent.handle(&press(Modifiers::SHIFT, Key::Char('1'))), None);
    }

    #[test]
    fn rebinding_replaces_the_action() {
        let mut agent = KeyAgent::empty("keys");
        agent.set_key_to_play_path('p', 4);
        assert!(agent.has_binding(&KeyboardShortcut::char('p')));
        assert_eq!(
            agent.handle(&press(Modifiers::empty(), Key::Char('p'))),
            Some(KeyAction::PlayPath(4))
        );
        agent.remove_binding(&KeyboardShortcut::char('p'));
        assert_eq!(agent.handle(&press(Modifiers::empty(), Key::Char('p'))), None);
    }

    #[test]
    fn key_presses_drive_the_eye() {
        let agent = KeyAgent::default();
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.set_position(Vec3::new(0.0, 0.0, 300.0));

        assert!(agent.handle_on(&press(Modifiers::CTRL, Key::Char('1')), &mut eye));
        assert!(eye.path(1).is_some());

        let before = eye.position();
        assert!(agent.handle_on(&press(Modifiers::empty(), Key::Named(NamedKey::Right)), &mut eye));
        assert!(eye.position().x > before.x);

        assert!(agent.handle_on(&press(Modifiers::empty(), Key::Char('e')), &mut eye));
        assert_eq!(eye.kind(), EyeKind::Orthographic3D);

        assert!(agent.handle_on(&press(Modifiers::ALT, Key::Char('1')), &mut eye));
        assert!(eye.path(1).is_none());
        assert!(!agent.handle_on(&press(Modifiers::empty(), Key::Char('z')), &mut eye));
    }

    #[test]
    fn actions_serialize_in_snake_case() {
        let json = serde_json::to_string(&KeyAction::PlayPath(2)).unwrap_or_default();
        assert_eq!(json, r#"{"play_path":2}"#);
        let json = serde_json::to_string(&KeyAction::ShowAll).unwrap_or_default();
        assert_eq!(json, r#""show_all""#);
    }
}
