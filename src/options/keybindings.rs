use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::{default_key_bindings, KeyAction, KeyAgent};
use crate::event::{Key, KeyboardShortcut, Modifiers};

/// One keyboard shortcut and its action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyBinding {
    /// Modifier keys, e.g. `"CTRL"`.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// The key, e.g. `{ char = "s" }` or `{ named = "left" }`.
    pub key: Key,
    /// Bound action.
    pub action: KeyAction,
}

impl KeyBinding {
    /// Lookup key of this binding.
    #[must_use]
    pub fn shortcut(&self) -> KeyboardShortcut {
        KeyboardShortcut::new(self.modifiers, self.key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Configurable keyboard bindings. The list replaces the stock bindings
/// wholesale.
pub struct KeyBindingOptions {
    /// Bindings in priority order: a later entry for the same shortcut
    /// wins.
    pub bindings: Vec<KeyBinding>,
    /// Reverse lookup cache (shortcut → action). Rebuilt on load.
    #[serde(skip)]
    shortcut_to_action: HashMap<KeyboardShortcut, KeyAction>,
}

impl Default for KeyBindingOptions {
    fn default() -> Self {
        let bindings = default_key_bindings()
            .into_iter()
            .map(|(shortcut, action)| KeyBinding {
                modifiers: shortcut.modifiers,
                key: shortcut.key,
                action,
            })
            .collect();

        let mut opts = Self {
            bindings,
            shortcut_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl PartialEq for KeyBindingOptions {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
    }
}

impl KeyBindingOptions {
    /// Rebuild the reverse lookup map (shortcut → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.shortcut_to_action.clear();
        for binding in &self.bindings {
            let _ = self
                .shortcut_to_action
                .insert(binding.shortcut(), binding.action);
        }
    }

    /// Look up the action for a shortcut.
    #[must_use]
    pub fn lookup(&self, shortcut: &KeyboardShortcut) -> Option<KeyAction> {
        self.shortcut_to_action.get(shortcut).copied()
    }

    /// Replace `agent`'s bindings with these.
    pub fn apply_to(&self, agent: &mut KeyAgent) {
        let profile = agent.profile_mut();
        profile.remove_bindings();
        for binding in &self.bindings {
            let _ = profile.set_binding(binding.shortcut(), binding.action);
        }
    }
}
