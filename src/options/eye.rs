use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::eye::{Eye, EyeKind, Lens};
use crate::geom::Handedness;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Eye", inline)]
#[serde(default)]
/// Projection and scene parameters of the eye.
pub struct EyeOptions {
    /// Projection kind. Applying a kind of the other dimension is refused;
    /// build a fresh eye from [`EyeOptions::lens`] instead.
    #[schemars(title = "Projection")]
    pub kind: EyeKind,
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 10.0, max = 120.0), extend("step" = 1.0))]
    pub field_of_view: f32,
    /// Radius of the scene's bounding ball.
    #[schemars(title = "Scene Radius", range(min = 0.01))]
    pub scene_radius: f32,
    /// Center of the scene's bounding ball.
    #[schemars(skip)]
    pub scene_center: [f32; 3],
    /// Near plane placement, as a fraction of the clipping span.
    #[schemars(skip)]
    pub z_near_coefficient: f32,
    /// Distance from the scene center to the clipping planes, in scene
    /// radii.
    #[schemars(skip)]
    pub z_clipping_coefficient: f32,
    /// Screen axis convention.
    #[schemars(title = "Handedness")]
    pub handedness: Handedness,
    /// Recompute frustum planes whenever the eye moves.
    #[schemars(title = "Frustum Culling")]
    pub boundary_equations: bool,
    /// Milliseconds between keyframes recorded from the keyboard.
    #[schemars(title = "Key Frame Period", range(min = 1, max = 1000), extend("step" = 10))]
    pub key_frame_period: u64,
}

impl Default for EyeOptions {
    fn default() -> Self {
        Self {
            kind: EyeKind::Perspective3D,
            field_of_view: 60.0,
            scene_radius: 100.0,
            scene_center: [0.0; 3],
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            handedness: Handedness::Right,
            boundary_equations: true,
            key_frame_period: 40,
        }
    }
}

impl EyeOptions {
    /// Lens described by these options on a `width`×`height` viewport.
    #[must_use]
    pub fn lens(&self, width: u32, height: u32) -> Lens {
        let field_of_view = self.field_of_view.to_radians();
        Lens {
            kind: self.kind,
            screen_width: width,
            screen_height: height,
            field_of_view,
            scene_center: Vec3::from_array(self.scene_center),
            scene_radius: self.scene_radius,
            handedness: self.handedness,
            z_near_coefficient: self.z_near_coefficient,
            z_clipping_coefficient: self.z_clipping_coefficient,
            ortho_coefficient: (field_of_view / 2.0).tan(),
        }
    }

    /// Push these options into an existing eye.
    pub fn apply_to(&self, eye: &mut Eye) {
        eye.set_kind(self.kind);
        eye.set_field_of_view(self.field_of_view.to_radians());
        eye.set_handedness(self.handedness);
        eye.set_z_near_coefficient(self.z_near_coefficient);
        eye.set_z_clipping_coefficient(self.z_clipping_coefficient);
        eye.set_scene_radius(self.scene_radius);
        eye.set_scene_center(Vec3::from_array(self.scene_center));
        if self.boundary_equations {
            eye.enable_boundary_equations();
        } else {
            eye.disable_boundary_equations();
        }
        eye.set_key_frame_period(self.key_frame_period);
    }
}
