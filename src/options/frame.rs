use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::interactive::InteractiveFrame;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Frame", inline)]
#[serde(default)]
/// Gesture tuning of an interactive frame.
pub struct FrameOptions {
    /// Rotation gain.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub rotation_sensitivity: f32,
    /// Translation gain.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub translation_sensitivity: f32,
    /// Release speed, in pixels per millisecond, above which a rotation
    /// keeps spinning.
    #[schemars(title = "Spin Threshold", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub spinning_sensitivity: f32,
    /// Wheel gain.
    #[schemars(title = "Wheel Speed", range(min = 1.0, max = 100.0), extend("step" = 1.0))]
    pub wheel_sensitivity: f32,
    /// Fraction of spin and toss speed lost per update. 0 applies the
    /// gesture once, 1 stops at once.
    #[schemars(title = "Damping", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub damping_friction: f32,
    /// Fly speed in scene units per update. Unset keeps the value derived
    /// from the scene radius.
    #[schemars(skip)]
    pub fly_speed: Option<f32>,
    /// Picking radius in pixels, or in scene units when adaptive.
    #[schemars(title = "Grab Threshold", range(min = 1.0, max = 100.0), extend("step" = 1.0))]
    pub grab_threshold: f32,
    /// Scale the grab threshold with the frame's projected size.
    #[schemars(skip)]
    pub adaptive_grab_threshold: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            spinning_sensitivity: 0.3,
            wheel_sensitivity: 20.0,
            damping_friction: 0.5,
            fly_speed: None,
            grab_threshold: 20.0,
            adaptive_grab_threshold: false,
        }
    }
}

impl FrameOptions {
    /// Push these options into `frame`.
    pub fn apply_to(&self, frame: &mut InteractiveFrame) {
        frame.set_rotation_sensitivity(self.rotation_sensitivity);
        frame.set_translation_sensitivity(self.translation_sensitivity);
        frame.set_spinning_sensitivity(self.spinning_sensitivity);
        frame.set_wheel_sensitivity(self.wheel_sensitivity);
        frame.set_damping_friction(self.damping_friction);
        if let Some(speed) = self.fly_speed {
            frame.set_fly_speed(speed);
        }
        frame.set_grab_threshold(self.grab_threshold, self.adaptive_grab_threshold);
    }
}
