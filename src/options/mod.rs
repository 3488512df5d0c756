//! Interaction options with TOML preset support.
//!
//! Every tweakable setting of the eye, the interactive frames and the
//! agents is consolidated here. Options serialize to/from TOML so a host
//! can keep named presets on disk and hand the UI-exposed subset to a
//! settings panel through [`Options::json_schema`].

mod agent;
mod bindings;
mod eye;
mod frame;
mod keybindings;

use std::path::Path;

pub use agent::AgentOptions;
pub use bindings::{BindingOptions, ClickBinding, MotionBinding};
pub use eye::EyeOptions;
pub use frame::FrameOptions;
pub use keybindings::{KeyBinding, KeyBindingOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::{KeyAgent, MotionAgent};
use crate::error::VantageError;
use crate::eye::Eye;
use crate::interactive::InteractiveFrame;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[frame]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Projection and scene parameters.
    pub eye: EyeOptions,
    /// Gesture tuning of the eye's own frame.
    pub eye_frame: FrameOptions,
    /// Gesture tuning of scene frames.
    pub frame: FrameOptions,
    /// Pointer agent behavior.
    pub agent: AgentOptions,
    /// Pointer bindings.
    #[schemars(skip)]
    pub bindings: BindingOptions,
    /// Keyboard bindings.
    #[schemars(skip)]
    pub keybindings: KeyBindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VantageError> {
        let content = std::fs::read_to_string(path).map_err(VantageError::Io)?;
        let mut opts: Self = toml::from_str(&content)
            .map_err(|e| VantageError::OptionsParse(e.to_string()))?;
        opts.keybindings.rebuild_reverse_map();
        log::debug!("loaded options from {}", path.display());
        Ok(opts)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VantageError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VantageError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VantageError::Io)?;
        }
        std::fs::write(path, content).map_err(VantageError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Apply the eye and eye-frame sections.
    pub fn apply_to_eye(&self, eye: &mut Eye) {
        self.eye.apply_to(eye);
        self.eye_frame.apply_to(eye.frame_mut().base_mut());
    }

    /// Apply the frame section to a scene frame.
    pub fn apply_to_frame(&self, frame: &mut InteractiveFrame) {
        self.frame.apply_to(frame);
    }

    /// Apply the agent and pointer binding sections.
    pub fn apply_to_agent(&self, agent: &mut MotionAgent) {
        self.agent.apply_to(agent);
        self.bindings.apply_to(agent);
    }

    /// Apply the keyboard bindings.
    pub fn apply_to_key_agent(&self, agent: &mut KeyAgent) {
        self.keybindings.apply_to(agent);
    }
}
