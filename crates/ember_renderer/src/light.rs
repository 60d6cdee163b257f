use std::f32::consts::PI;

use ember_core::LightDescription;
use ember_math::Vec3;

/// An omnidirectional point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// Irradiance scale at `distance`: intensity spread over a sphere's area.
    #[inline]
    pub fn falloff(&self, distance: f32) -> f32 {
        self.intensity / (4.0 * PI * distance * distance)
    }
}

impl From<&LightDescription> for PointLight {
    fn from(description: &LightDescription) -> Self {
        Self::new(description.position, description.intensity)
    }
}
