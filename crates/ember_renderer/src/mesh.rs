//! Triangle mesh with per-vertex normals and a bounding box.

use ember_core::MeshDescription;
use ember_math::{Aabb, Ray, Vec3};
use thiserror::Error;

use crate::{hit::HitRecord, triangle::Triangle};

/// Errors raised while building a mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// An indexed triangle mesh.
///
/// Vertex normals are the normalized sum of the unnormalized face normals of
/// every triangle touching the vertex, so larger faces weigh more.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    material_index: usize,
    bounds: Aabb,
}

impl TriangleMesh {
    /// Build a mesh, validating indices and computing normals and bounds.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        material_index: usize,
    ) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        for (triangle, tri) in indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        let normals = compute_normals(&positions, &indices);

        let mut bounds = Aabb::EMPTY;
        for &p in &positions {
            bounds.expand_by(p);
        }

        Ok(Self {
            positions,
            normals,
            indices,
            material_index,
            bounds,
        })
    }

    /// Build a mesh from a loaded scene object.
    pub fn from_description(description: MeshDescription) -> Result<Self, MeshError> {
        Self::new(
            description.vertices,
            description.triangles,
            description.material_index,
        )
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn material_index(&self) -> usize {
        self.material_index
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate the mesh's triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle<'_>> + '_ {
        self.indices.iter().map(move |&tri| Triangle::new(self, tri))
    }

    /// Find the nearest hit closer than `rec.t`.
    ///
    /// Every triangle is tested; because each accepted hit lowers `rec.t`,
    /// the record ends up holding the closest one.
    pub fn intersect(&self, ray: &Ray, rec: &mut HitRecord) -> bool {
        if self.indices.is_empty() || !self.bounds.intersect(ray) {
            return false;
        }

        let mut hit_anything = false;
        for triangle in self.triangles() {
            if triangle.intersect(ray, rec) {
                hit_anything = true;
            }
        }
        hit_anything
    }

    /// Returns true as soon as any triangle is hit closer than `rec.t`.
    pub fn intersect_any(&self, ray: &Ray, rec: &mut HitRecord) -> bool {
        if self.indices.is_empty() || !self.bounds.intersect(ray) {
            return false;
        }

        self.triangles().any(|triangle| triangle.intersect(ray, rec))
    }
}

fn compute_normals(positions: &[Vec3], indices: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices {
        let [a, b, c] = tri.map(|i| positions[i as usize]);
        let face = (b - a).cross(c - a);
        for &i in tri {
            normals[i as usize] += face;
        }
    }

    let mut unused = 0;
    for n in &mut normals {
        if *n == Vec3::ZERO {
            unused += 1;
        }
        *n = n.normalize_or_zero();
    }
    if unused > 0 {
        log::debug!("{} vertices have no usable normal", unused);
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A stack of unit squares in the XY plane at the given heights.
    fn stacked_quads(heights: &[f32]) -> TriangleMesh {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for &z in heights {
            let base = positions.len() as u32;
            positions.extend([
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ]);
            indices.push([base, base + 1, base + 2]);
            indices.push([base, base + 2, base + 3]);
        }
        TriangleMesh::new(positions, indices, 0).unwrap()
    }

    #[test]
    fn test_index_out_of_range() {
        let err = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 3]], 0)
            .unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                triangle: 0,
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_vertex_normals_are_unit_and_weighted() {
        let mesh = stacked_quads(&[0.0]);
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_bounds_contain_all_vertices() {
        let mesh = stacked_quads(&[-2.0, 3.0]);
        for &p in mesh.positions() {
            assert!(mesh.bounds().contains(p));
        }
        assert_eq!(mesh.bounds().min, Vec3::new(-1.0, -1.0, -2.0));
        assert_eq!(mesh.bounds().max, Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_intersect_returns_closest_hit() {
        // Scan order puts the farthest layer first.
        let mesh = stacked_quads(&[-4.0, 2.0, -1.0, 0.5]);
        let ray = Ray::new(Vec3::new(0.3, -0.2, 10.0), Vec3::NEG_Z);
        let mut rec = HitRecord::new(&ray);

        assert!(mesh.intersect(&ray, &mut rec));
        assert!((rec.t - 8.0).abs() < 1e-5);
        assert!((rec.p.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_respects_record_bound() {
        let mesh = stacked_quads(&[0.0]);
        let ray = Ray::new(Vec3::new(0.3, -0.2, 5.0), Vec3::NEG_Z).with_max_distance(4.0);
        let mut rec = HitRecord::new(&ray);

        assert!(!mesh.intersect(&ray, &mut rec));
        assert!(!mesh.intersect_any(&ray, &mut rec));
    }

    #[test]
    fn test_intersect_any() {
        let mesh = stacked_quads(&[0.0, 1.0]);
        let hit = Ray::new(Vec3::new(0.3, -0.2, 5.0), Vec3::NEG_Z);
        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);

        assert!(mesh.intersect_any(&hit, &mut HitRecord::new(&hit)));
        assert!(!mesh.intersect_any(&miss, &mut HitRecord::new(&miss)));
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let mesh = TriangleMesh::new(Vec::new(), Vec::new(), 0).unwrap();
        let ray = Ray::default();
        assert!(!mesh.intersect(&ray, &mut HitRecord::new(&ray)));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_from_description() {
        let description = MeshDescription::new(
            2,
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        );
        let mesh = TriangleMesh::from_description(description).unwrap();
        assert_eq!(mesh.material_index(), 2);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
