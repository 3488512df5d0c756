use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::{MotionAgent, PickingMode, DEFAULT_WHEEL_SENSITIVITY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Pointer", inline)]
#[serde(default)]
/// Pointer agent behavior.
pub struct AgentOptions {
    /// When frames under the pointer get picked.
    #[schemars(title = "Picking")]
    pub picking_mode: PickingMode,
    /// Multiplier on wheel deltas before they reach a grabber.
    #[schemars(title = "Wheel Sensitivity", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub wheel_sensitivity: f32,
    /// Pick grabbers at all. Off routes every event to the default grabber.
    #[schemars(title = "Picking Enabled")]
    pub tracking: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            picking_mode: PickingMode::default(),
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            tracking: true,
        }
    }
}

impl AgentOptions {
    /// Push these options into `agent`.
    pub fn apply_to(&self, agent: &mut MotionAgent) {
        agent.set_picking_mode(self.picking_mode);
        agent.set_wheel_sensitivity(self.wheel_sensitivity);
        agent.agent_mut().set_tracking(self.tracking);
    }
}
