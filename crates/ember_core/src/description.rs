//! Scene description bundle.
//!
//! These are the plain, already-validated values a renderer consumes. They
//! carry no behavior beyond small constructors and queries, and know nothing
//! about the file format they were loaded from.

use ember_math::{Mat3, Vec3};

/// Surface response of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    /// Lambertian surface lit by the scene's point lights.
    Diffuse { albedo: Vec3 },
    /// Perfect mirror.
    Reflective { albedo: Vec3 },
    /// Transparent dielectric with the given index of refraction.
    Refractive { ior: f32 },
    /// Flat color, no lighting. Useful for debugging geometry.
    Constant { albedo: Vec3 },
}

impl MaterialKind {
    /// Short lowercase name, matching the scene file `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Diffuse { .. } => "diffuse",
            MaterialKind::Reflective { .. } => "reflective",
            MaterialKind::Refractive { .. } => "refractive",
            MaterialKind::Constant { .. } => "constant",
        }
    }
}

/// A material as referenced by meshes through their material index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Interpolate vertex normals across triangles instead of using the
    /// flat face normal.
    pub smooth_shading: bool,
}

impl Material {
    pub fn new(kind: MaterialKind, smooth_shading: bool) -> Self {
        Self {
            kind,
            smooth_shading,
        }
    }

    pub fn diffuse(albedo: Vec3) -> Self {
        Self::new(MaterialKind::Diffuse { albedo }, false)
    }

    pub fn reflective(albedo: Vec3) -> Self {
        Self::new(MaterialKind::Reflective { albedo }, false)
    }

    pub fn refractive(ior: f32) -> Self {
        Self::new(MaterialKind::Refractive { ior }, false)
    }

    pub fn constant(albedo: Vec3) -> Self {
        Self::new(MaterialKind::Constant { albedo }, false)
    }

    /// Returns a copy with smooth shading switched on or off.
    pub fn with_smooth_shading(mut self, smooth_shading: bool) -> Self {
        self.smooth_shading = smooth_shading;
        self
    }

    /// Transparent materials don't cast hard shadows.
    pub fn is_transparent(&self) -> bool {
        matches!(self.kind, MaterialKind::Refractive { .. })
    }
}

/// Global scene settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsDescription {
    /// Radiance returned by rays that leave the scene.
    pub background_color: Vec3,
    pub width: u32,
    pub height: u32,
}

/// Camera pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDescription {
    pub position: Vec3,
    /// Camera-to-world rotation: `rotation * d` maps a camera-space
    /// direction into world space.
    pub rotation: Mat3,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
        }
    }
}

/// A point light with inverse-square falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescription {
    pub position: Vec3,
    pub intensity: f32,
}

/// Raw triangle mesh data. Indices are not validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDescription {
    pub material_index: usize,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshDescription {
    pub fn new(material_index: usize, vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            material_index,
            vertices,
            triangles,
        }
    }
}

/// Everything needed to build a renderable scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub settings: SettingsDescription,
    pub camera: CameraDescription,
    pub lights: Vec<LightDescription>,
    pub materials: Vec<Material>,
    pub objects: Vec<MeshDescription>,
}

impl SceneDescription {
    /// Total number of triangles across all meshes.
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles.len()).sum()
    }

    /// Total number of vertices across all meshes.
    pub fn vertex_count(&self) -> usize {
        self.objects.iter().map(|o| o.vertices.len()).sum()
    }
}
