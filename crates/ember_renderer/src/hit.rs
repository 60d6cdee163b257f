//! HitRecord for ray-mesh intersection.

use ember_math::{Ray, Vec3};

/// Record of the nearest ray-triangle intersection found so far.
///
/// A record starts out with `t = ray.t_max` and no hit. Every accepted
/// triangle test overwrites it and lowers `t`, so `t` doubles as the running
/// upper bound that discards farther triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Unit geometric normal of the hit triangle (winding order A, B, C)
    pub face_normal: Vec3,
    /// Vertex normals interpolated with the barycentric weights
    pub smooth_normal: Vec3,
    /// Ray parameter of the hit
    pub t: f32,
    /// Barycentric coordinates; the weights are `(1 - u - v, u, v)`
    pub u: f32,
    pub v: f32,
    /// Index into the scene's material list
    pub material: usize,
    /// Whether anything has been hit
    pub hit: bool,
}

impl HitRecord {
    /// An empty record bounded by the ray's maximum distance.
    pub fn new(ray: &Ray) -> Self {
        Self {
            p: Vec3::ZERO,
            face_normal: Vec3::ZERO,
            smooth_normal: Vec3::ZERO,
            t: ray.t_max,
            u: 0.0,
            v: 0.0,
            material: 0,
            hit: false,
        }
    }

    /// The normal to shade with.
    #[inline]
    pub fn normal(&self, smooth_shading: bool) -> Vec3 {
        if smooth_shading {
            self.smooth_normal
        } else {
            self.face_normal
        }
    }
}
