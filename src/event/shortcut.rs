//! Shortcuts: the lookup keys profiles bind actions to.
//!
//! Two shortcuts bind the same action exactly when they compare equal, so
//! every field takes part in equality and hashing.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Button, Key, Modifiers};

/// Modifier mask + button + click count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct ClickShortcut {
    /// Modifier keys held during the click.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Clicked button.
    pub button: Button,
    /// 1 for a single click, 2 for a double click, ...
    #[serde(default = "one")]
    pub click_count: u8,
}

const fn one() -> u8 {
    1
}

impl ClickShortcut {
    /// Shortcut for a click with modifiers.
    #[must_use]
    pub fn new(modifiers: Modifiers, button: Button, click_count: u8) -> Self {
        Self {
            modifiers,
            button,
            click_count,
        }
    }

    /// Unmodified single click.
    #[must_use]
    pub fn single(button: Button) -> Self {
        Self::new(Modifiers::empty(), button, 1)
    }

    /// Unmodified double click.
    #[must_use]
    pub fn double(button: Button) -> Self {
        Self::new(Modifiers::empty(), button, 2)
    }
}

/// Modifier mask + motion id (button held during a drag, or the wheel).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct MotionShortcut {
    /// Modifier keys held during the gesture.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Motion id.
    pub id: Button,
}

impl MotionShortcut {
    /// Shortcut for a gesture with modifiers.
    #[must_use]
    pub fn new(modifiers: Modifiers, id: Button) -> Self {
        Self { modifiers, id }
    }

    /// Unmodified gesture.
    #[must_use]
    pub fn plain(id: Button) -> Self {
        Self::new(Modifiers::empty(), id)
    }
}

/// Modifier mask + key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct KeyboardShortcut {
    /// Modifier keys held with the key.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// The key.
    pub key: Key,
}

impl KeyboardShortcut {
    /// Shortcut for a key with modifiers.
    #[must_use]
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Unmodified character key. Case matters: `'s'` and `'S'` differ.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(Modifiers::empty(), Key::Char(c))
    }
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: Modifiers) -> fmt::Result {
    for (name, _) in modifiers.iter_names() {
        write!(f, "{name}+")?;
    }
    Ok(())
}

impl fmt::Display for ClickShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers)?;
        write!(f, "{}", self.button)?;
        match self.click_count {
            1 => Ok(()),
            2 => write!(f, " (double click)"),
            n => write!(f, " ({n} clicks)"),
        }
    }
}

impl fmt::Display for MotionShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers)?;
        write!(f, "{}", self.id)
    }
}

impl fmt::Display for KeyboardShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers)?;
        write!(f, "{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equality_covers_every_field() {
        let a = ClickShortcut::single(Button::Left);
        assert_eq!(a, ClickShortcut::new(Modifiers::empty(), Button::Left, 1));
        assert_ne!(a, ClickShortcut::double(Button::Left));
        assert_ne!(a, ClickShortcut::new(Modifiers::SHIFT, Button::Left, 1));

        let set: HashSet<_> = [
            MotionShortcut::plain(Button::Left),
            MotionShortcut::plain(Button::Left),
            MotionShortcut::new(Modifiers::CTRL, Button::Left),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn char_shortcuts_are_case_sensitive() {
        assert_ne!(KeyboardShortcut::char('s'), KeyboardShortcut::char('S'));
    }

    #[test]
    fn display_lists_modifiers() {
        let s = MotionShortcut::new(Modifiers::SHIFT | Modifiers::CTRL, Button::Right);
        assert_eq!(s.to_string(), "SHIFT+CTRL+right");
        assert_eq!(
            ClickShortcut::double(Button::Left).to_string(),
            "left (double click)"
        );
    }
}
