//! Renderable scene: meshes, materials, lights and camera.

use ember_core::{Material, SceneDescription};
use ember_math::Ray;
use thiserror::Error;

use crate::{
    camera::Camera,
    hit::HitRecord,
    light::PointLight,
    mesh::{MeshError, TriangleMesh},
    Color,
};

/// Errors raised while building a scene from a description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Mesh {mesh}: {source}")]
    Mesh {
        mesh: usize,
        #[source]
        source: MeshError,
    },

    #[error("Mesh {mesh} uses material {material}, but the scene has {count} materials")]
    MaterialOutOfRange {
        mesh: usize,
        material: usize,
        count: usize,
    },
}

/// An immutable scene, shared by reference between render threads.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<TriangleMesh>,
    materials: Vec<Material>,
    lights: Vec<PointLight>,
    camera: Camera,
    background: Color,
    width: u32,
    height: u32,
}

impl Scene {
    /// Build a scene, validating every mesh and its material index.
    pub fn new(description: SceneDescription) -> Result<Self, SceneError> {
        let SceneDescription {
            settings,
            camera,
            lights,
            materials,
            objects,
        } = description;

        let meshes = objects
            .into_iter()
            .enumerate()
            .map(|(mesh, object)| {
                if object.material_index >= materials.len() {
                    return Err(SceneError::MaterialOutOfRange {
                        mesh,
                        material: object.material_index,
                        count: materials.len(),
                    });
                }
                TriangleMesh::from_description(object)
                    .map_err(|source| SceneError::Mesh { mesh, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scene = Self {
            meshes,
            materials,
            lights: lights.iter().map(PointLight::from).collect(),
            camera: Camera::from_description(&camera, settings.width, settings.height),
            background: settings.background_color,
            width: settings.width,
            height: settings.height,
        };

        log::debug!(
            "Built scene with {} meshes ({} triangles), {} lights",
            scene.meshes.len(),
            scene.triangle_count(),
            scene.lights.len()
        );

        Ok(scene)
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(TriangleMesh::triangle_count).sum()
    }

    /// Nearest hit across all meshes closer than `rec.t`.
    pub fn intersect(&self, ray: &Ray, rec: &mut HitRecord) -> bool {
        let mut hit_anything = false;
        for mesh in &self.meshes {
            if mesh.intersect(ray, rec) {
                hit_anything = true;
            }
        }
        hit_anything
    }

    /// Occlusion query for shadow rays.
    ///
    /// Meshes with transparent materials don't block light.
    pub fn intersect_any(&self, ray: &Ray) -> bool {
        let mut rec = HitRecord::new(ray);
        self.meshes.iter().any(|mesh| {
            !self.materials[mesh.material_index()].is_transparent()
                && mesh.intersect_any(ray, &mut rec)
        })
    }

    /// Nearest hit along the ray, if any.
    pub fn trace(&self, ray: &Ray) -> Option<HitRecord> {
        let mut rec = HitRecord::new(ray);
        self.intersect(ray, &mut rec).then_some(rec)
    }
}
