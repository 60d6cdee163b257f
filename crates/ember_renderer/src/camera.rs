//! Pinhole camera.
//!
//! The camera looks down its local -Z axis with +Y up. The image plane sits
//! at distance 1 and spans [-aspect, aspect] x [-1, 1], which gives a 90°
//! vertical field of view.

use ember_core::CameraDescription;
use ember_math::{Mat3, Ray, Vec3};

/// Pinhole camera generating one ray through the center of each pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    /// Camera-to-world rotation.
    rotation: Mat3,
    width: u32,
    height: u32,
    aspect_ratio: f32,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Mat3, width: u32, height: u32) -> Self {
        Self {
            position,
            rotation,
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
        }
    }

    pub fn from_description(description: &CameraDescription, width: u32, height: u32) -> Self {
        Self::new(description.position, description.rotation, width, height)
    }

    /// A camera at `look_from` pointed at `look_at`, with world +Y as up.
    pub fn look_at(look_from: Vec3, look_at: Vec3, width: u32, height: u32) -> Self {
        let w = (look_from - look_at).normalize();
        let u = Vec3::Y.cross(w).normalize();
        let v = w.cross(u);
        Self::new(look_from, Mat3::from_cols(u, v, w), width, height)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// World-space view direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Primary ray through the center of pixel (`row`, `col`).
    ///
    /// Row 0 is the top of the image.
    pub fn get_ray(&self, row: u32, col: u32) -> Ray {
        let ndc_x = (col as f32 + 0.5) / self.width as f32;
        let ndc_y = (row as f32 + 0.5) / self.height as f32;

        let x = (2.0 * ndc_x - 1.0) * self.aspect_ratio;
        let y = 1.0 - 2.0 * ndc_y;

        Ray::new(self.position, self.rotation * Vec3::new(x, y, -1.0))
    }

    /// Move along the camera's local X axis.
    pub fn truck(&mut self, step: f32) {
        self.position += self.rotation * Vec3::new(step, 0.0, 0.0);
    }

    /// Move along the camera's local Y axis.
    pub fn boom(&mut self, step: f32) {
        self.position += self.rotation * Vec3::new(0.0, step, 0.0);
    }

    /// Move along the view direction. Positive steps move forward.
    pub fn dolly(&mut self, step: f32) {
        self.position += self.rotation * Vec3::new(0.0, 0.0, -step);
    }

    /// Rotate around the local Y axis by `degrees`.
    pub fn pan(&mut self, degrees: f32) {
        self.rotation *= Mat3::from_rotation_y(degrees.to_radians());
    }

    /// Rotate around the local X axis by `degrees`.
    pub fn tilt(&mut self, degrees: f32) {
        self.rotation *= Mat3::from_rotation_x(degrees.to_radians());
    }

    /// Rotate around the local Z axis by `degrees`.
    pub fn roll(&mut self, degrees: f32) {
        self.rotation *= Mat3::from_rotation_z(degrees.to_radians());
    }
}
