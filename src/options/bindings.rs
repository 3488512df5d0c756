use serde::{Deserialize, Serialize};

use crate::agent::{MotionAgent, Target};
use crate::event::{Button, ClickShortcut, Modifiers, MotionShortcut};
use crate::interactive::{ClickAction, MotionAction};

/// A motion shortcut bound for one target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MotionBinding {
    /// Eye or frame branch.
    pub target: Target,
    /// Modifier keys, e.g. `"SHIFT | CTRL"`.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Button held during the drag, or the wheel.
    pub button: Button,
    /// Bound gesture.
    pub action: MotionAction,
}

impl MotionBinding {
    /// Lookup key of this binding.
    #[must_use]
    pub fn shortcut(&self) -> MotionShortcut {
        MotionShortcut::new(self.modifiers, self.button)
    }
}

/// A click shortcut bound for one target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickBinding {
    /// Eye or frame branch.
    pub target: Target,
    /// Modifier keys.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Clicked button.
    pub button: Button,
    /// 1 for a single click, 2 for a double click.
    #[serde(default = "single")]
    pub click_count: u8,
    /// Bound action.
    pub action: ClickAction,
}

const fn single() -> u8 {
    1
}

impl ClickBinding {
    /// Lookup key of this binding.
    #[must_use]
    pub fn shortcut(&self) -> ClickShortcut {
        ClickShortcut::new(self.modifiers, self.button, self.click_count)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Pointer bindings layered over (or replacing) the stock ones.
pub struct BindingOptions {
    /// Clear the stock bindings of both targets before applying these.
    pub replace_defaults: bool,
    /// Motion bindings.
    pub motion: Vec<MotionBinding>,
    /// Click bindings.
    pub click: Vec<ClickBinding>,
}

impl BindingOptions {
    /// Install the bindings on `agent`. Later entries for the same
    /// shortcut win.
    pub fn apply_to(&self, agent: &mut MotionAgent) {
        if self.replace_defaults {
            for target in [Target::Eye, Target::Frame] {
                agent.remove_motion_bindings(target);
                agent.remove_click_bindings(target);
            }
        }
        for binding in &self.motion {
            agent.set_binding(binding.target, binding.shortcut(), binding.action);
        }
        for binding in &self.click {
            agent.set_click_binding(binding.target, binding.shortcut(), binding.action);
        }
    }
}
