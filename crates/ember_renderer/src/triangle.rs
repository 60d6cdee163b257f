//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{hit::HitRecord, mesh::TriangleMesh};
use ember_math::{Interval, Ray, Vec3, EPSILON};

/// A triangle of a [`TriangleMesh`], referenced by its three vertex indices.
#[derive(Debug, Clone, Copy)]
pub struct Triangle<'a> {
    mesh: &'a TriangleMesh,
    indices: [u32; 3],
}

impl<'a> Triangle<'a> {
    /// Create a view of one triangle of `mesh`.
    ///
    /// The indices must already be valid for the mesh; [`TriangleMesh::new`]
    /// guarantees this for every triangle it stores.
    pub fn new(mesh: &'a TriangleMesh, indices: [u32; 3]) -> Self {
        Self { mesh, indices }
    }

    /// Vertex positions A, B, C.
    pub fn vertices(&self) -> [Vec3; 3] {
        let positions = self.mesh.positions();
        self.indices.map(|i| positions[i as usize])
    }

    /// Test the ray against this triangle.
    ///
    /// Hits farther than `rec.t` are rejected. On success the record is
    /// overwritten and `true` is returned.
    pub fn intersect(&self, ray: &Ray, rec: &mut HitRecord) -> bool {
        let [a, b, c] = self.vertices();
        let Some((t, u, v)) = intersect_triangle(ray, a, b, c, rec.t) else {
            return false;
        };

        let normals = self.mesh.normals();
        let [na, nb, nc] = self.indices.map(|i| normals[i as usize]);

        rec.p = ray.at(t);
        rec.face_normal = (b - a).cross(c - a).normalize();
        rec.smooth_normal = na * (1.0 - u - v) + nb * u + nc * v;
        rec.t = t;
        rec.u = u;
        rec.v = v;
        rec.material = self.mesh.material_index();
        rec.hit = true;

        true
    }
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Two-sided: no back-face culling. Returns `(t, u, v)` for a hit with
/// `0 <= t <= t_max`, or `None` when the ray is parallel to the triangle's
/// plane or passes outside it.
pub fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3, t_max: f32) -> Option<(f32, f32, f32)> {
    let edge1 = b - a;
    let edge2 = c - a;

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);

    // Ray is parallel to the triangle's plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !Interval::UNIT.contains(u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if !Interval::new(0.0, t_max).contains(t) {
        return None;
    }

    Some((t, u, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]], 3).unwrap()
    }

    #[test]
    fn test_triangle_hit_reports_barycentrics() {
        let mesh = unit_triangle();
        let tri = Triangle::new(&mesh, [0, 1, 2]);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z);
        let mut rec = HitRecord::new(&ray);

        assert!(tri.intersect(&ray, &mut rec));
        assert!(rec.hit);
        assert!((rec.t - 1.0).abs() < 1e-6);
        assert!(rec.u >= 0.0 && rec.v >= 0.0);
        assert!(rec.u + rec.v <= 1.0);
        assert!((rec.u - 0.2).abs() < 1e-6);
        assert!((rec.v - 0.2).abs() < 1e-6);
        assert!((rec.p - Vec3::new(0.2, 0.2, 0.0)).length() < 1e-6);
        assert_eq!(rec.face_normal, Vec3::Z);
        assert_eq!(rec.material, 3);
    }

    #[test]
    fn test_triangle_is_two_sided() {
        let mesh = unit_triangle();
        let tri = Triangle::new(&mesh, [0, 1, 2]);
        let ray = Ray::new(Vec3::new(0.2, 0.2, -1.0), Vec3::Z);
        let mut rec = HitRecord::new(&ray);

        assert!(tri.intersect(&ray, &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-6);
        // The geometric normal keeps the winding orientation.
        assert_eq!(rec.face_normal, Vec3::Z);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);

        // Inside the triangle's plane
        let ray = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::X);
        assert!(intersect_triangle(&ray, a, b, c, f32::MAX).is_none());

        // Above the plane, parallel to it
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(intersect_triangle(&ray, a, b, c, f32::MAX).is_none());
    }

    #[test]
    fn test_ray_outside_triangle_misses() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.8, 0.8, 1.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, a, b, c, f32::MAX).is_none());

        let ray = Ray::new(Vec3::new(-0.1, 0.5, 1.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, a, b, c, f32::MAX).is_none());
    }

    #[test]
    fn test_triangle_behind_origin_misses() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::Z);
        assert!(intersect_triangle(&ray, a, b, c, f32::MAX).is_none());
    }

    #[test]
    fn test_farther_than_record_is_rejected() {
        let mesh = unit_triangle();
        let tri = Triangle::new(&mesh, [0, 1, 2]);
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z);
        let mut rec = HitRecord::new(&ray);
        rec.t = 0.5;

        assert!(!tri.intersect(&ray, &mut rec));
        assert!(!rec.hit);
        assert_eq!(rec.t, 0.5);

        let shadow = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z).with_max_distance(0.99);
        assert!(intersect_triangle(&shadow, Vec3::ZERO, Vec3::X, Vec3::Y, shadow.t_max).is_none());
    }

    #[test]
    fn test_smooth_normal_interpolates_vertex_normals() {
        // A tent: two triangles sharing the edge along Y, tilted opposite ways.
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
            0,
        )
        .unwrap();

        let tri = Triangle::new(&mesh, [0, 1, 2]);
        let ray = Ray::new(Vec3::new(-0.2, 0.3, 5.0), Vec3::NEG_Z);
        let mut rec = HitRecord::new(&ray);
        assert!(tri.intersect(&ray, &mut rec));

        // The shared edge vertices carry the averaged (straight up) normal, so the
        // interpolated normal leans less than the face normal.
        let face_tilt = rec.face_normal.dot(Vec3::Z);
        let smooth_tilt = rec.smooth_normal.normalize().dot(Vec3::Z);
        assert!(smooth_tilt > face_tilt);
    }
}
