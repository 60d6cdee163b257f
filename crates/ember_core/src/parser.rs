//! `.crtscene` loading.
//!
//! Scene files are JSON documents. They are first deserialized into loose
//! `Raw*` structs mirroring the file layout, then validated and converted
//! into a [`SceneDescription`].

use std::fs;
use std::path::Path;

use ember_math::{Mat3, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::description::{
    CameraDescription, LightDescription, Material, MaterialKind, MeshDescription,
    SceneDescription, SettingsDescription,
};

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object {object}: {field} has {len} values, expected a multiple of 3")]
    FlatArray {
        object: usize,
        field: &'static str,
        len: usize,
    },

    #[error("Material {index} ({kind}) is missing its {property}")]
    MissingProperty {
        index: usize,
        kind: &'static str,
        property: &'static str,
    },

    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Deserialize, Debug)]
struct RawScene {
    settings: RawSettings,
    camera: RawCamera,
    #[serde(default)]
    lights: Option<Vec<RawLight>>,
    materials: Vec<RawMaterial>,
    objects: Vec<RawObject>,
}

#[derive(Deserialize, Debug)]
struct RawSettings {
    background_color: [f32; 3],
    image_settings: RawImageSettings,
}

#[derive(Deserialize, Debug)]
struct RawImageSettings {
    width: u32,
    height: u32,
}

#[derive(Deserialize, Debug)]
struct RawCamera {
    position: [f32; 3],
    /// Row-major 3x3 rotation.
    matrix: [f32; 9],
}

#[derive(Deserialize, Debug)]
struct RawLight {
    intensity: f32,
    position: [f32; 3],
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum RawMaterialType {
    Diffuse,
    Reflective,
    Refractive,
    Constant,
}

#[derive(Deserialize, Debug)]
struct RawMaterial {
    #[serde(rename = "type")]
    kind: RawMaterialType,
    albedo: Option<[f32; 3]>,
    ior: Option<f32>,
    #[serde(default)]
    smooth_shading: bool,
}

#[derive(Deserialize, Debug)]
struct RawObject {
    #[serde(default)]
    material_index: usize,
    vertices: Vec<f32>,
    triangles: Vec<u32>,
}

/// Load a `.crtscene` file from disk.
pub fn load_scene<P: AsRef<Path>>(path: P) -> ParseResult<SceneDescription> {
    let path = path.as_ref();
    log::debug!("Reading scene file {}", path.display());
    let contents = fs::read_to_string(path)?;
    parse_scene(&contents)
}

/// Parse a `.crtscene` document from a string.
pub fn parse_scene(contents: &str) -> ParseResult<SceneDescription> {
    let raw: RawScene = serde_json::from_str(contents)?;

    let settings = convert_settings(&raw.settings)?;
    let camera = convert_camera(&raw.camera);

    let lights = match raw.lights {
        Some(lights) => lights.iter().map(convert_light).collect(),
        None => {
            log::warn!("Scene has no lights");
            Vec::new()
        }
    };

    let materials = raw
        .materials
        .iter()
        .enumerate()
        .map(|(index, material)| convert_material(index, material))
        .collect::<ParseResult<Vec<_>>>()?;

    let objects = raw
        .objects
        .into_iter()
        .enumerate()
        .map(|(index, object)| convert_object(index, object))
        .collect::<ParseResult<Vec<_>>>()?;

    let scene = SceneDescription {
        settings,
        camera,
        lights,
        materials,
        objects,
    };

    log::debug!(
        "Parsed scene: {}x{}, {} objects, {} triangles, {} lights, {} materials",
        scene.settings.width,
        scene.settings.height,
        scene.objects.len(),
        scene.triangle_count(),
        scene.lights.len(),
        scene.materials.len()
    );

    Ok(scene)
}

fn convert_settings(raw: &RawSettings) -> ParseResult<SettingsDescription> {
    let RawImageSettings { width, height } = raw.image_settings;
    if width == 0 || height == 0 {
        return Err(ParseError::InvalidImageSize { width, height });
    }

    Ok(SettingsDescription {
        background_color: Vec3::from_array(raw.background_color),
        width,
        height,
    })
}

fn convert_camera(raw: &RawCamera) -> CameraDescription {
    // The file stores rows and directions are transformed as row vectors
    // (d · M). Loading the rows as glam columns gives Mᵀ, so `rotation * d`
    // computes the same product.
    CameraDescription {
        position: Vec3::from_array(raw.position),
        rotation: Mat3::from_cols_array(&raw.matrix),
    }
}

fn convert_light(raw: &RawLight) -> LightDescription {
    LightDescription {
        position: Vec3::from_array(raw.position),
        intensity: raw.intensity,
    }
}

fn convert_material(index: usize, raw: &RawMaterial) -> ParseResult<Material> {
    let missing = |kind: &'static str, property: &'static str| ParseError::MissingProperty {
        index,
        kind,
        property,
    };
    let albedo = |kind: &'static str| {
        raw.albedo
            .map(Vec3::from_array)
            .ok_or_else(|| missing(kind, "albedo"))
    };

    let kind = match raw.kind {
        RawMaterialType::Diffuse => MaterialKind::Diffuse {
            albedo: albedo("diffuse")?,
        },
        RawMaterialType::Reflective => MaterialKind::Reflective {
            albedo: albedo("reflective")?,
        },
        RawMaterialType::Constant => MaterialKind::Constant {
            albedo: albedo("constant")?,
        },
        RawMaterialType::Refractive => MaterialKind::Refractive {
            ior: raw.ior.ok_or_else(|| missing("refractive", "ior"))?,
        },
    };

    Ok(Material::new(kind, raw.smooth_shading))
}

fn convert_object(index: usize, raw: RawObject) -> ParseResult<MeshDescription> {
    if raw.vertices.len() % 3 != 0 {
        return Err(ParseError::FlatArray {
            object: index,
            field: "vertices",
            len: raw.vertices.len(),
        });
    }
    if raw.triangles.len() % 3 != 0 {
        return Err(ParseError::FlatArray {
            object: index,
            field: "triangles",
            len: raw.triangles.len(),
        });
    }

    let vertices = raw
        .vertices
        .chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect();
    let triangles = raw
        .triangles
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    Ok(MeshDescription::new(raw.material_index, vertices, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "settings": {
            "background_color": [0.1, 0.2, 0.3],
            "image_settings": { "width": 64, "height": 36 }
        },
        "camera": {
            "position": [0, 1, 5],
            "matrix": [1, 0, 0, 0, 1, 0, 0, 0, 1]
        },
        "lights": [
            { "intensity": 800, "position": [0, 4, 0] }
        ],
        "materials": [
            { "type": "diffuse", "albedo": [0.5, 0.5, 0.5], "smooth_shading": true },
            { "type": "refractive", "ior": 1.5, "smooth_shading": false },
            { "type": "reflective", "albedo": [1, 1, 1] }
        ],
        "objects": [
            {
                "material_index": 1,
                "vertices": [0, 0, 0,  1, 0, 0,  0, 1, 0,  1, 1, 0],
                "triangles": [0, 1, 2,  1, 3, 2]
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_scene() {
        let scene = parse_scene(SCENE).unwrap();

        assert_eq!(scene.settings.width, 64);
        assert_eq!(scene.settings.height, 36);
        assert_eq!(scene.settings.background_color, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(scene.camera.rotation, Mat3::IDENTITY);

        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.lights[0].intensity, 800.0);

        assert_eq!(scene.materials.len(), 3);
        assert!(scene.materials[0].smooth_shading);
        assert_eq!(scene.materials[1].kind, MaterialKind::Refractive { ior: 1.5 });
        assert!(!scene.materials[2].smooth_shading);

        assert_eq!(scene.objects.len(), 1);
        let object = &scene.objects[0];
        assert_eq!(object.material_index, 1);
        assert_eq!(object.vertices[3], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(object.triangles, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_camera_matrix_is_row_major() {
        let json = SCENE.replace(
            "[1, 0, 0, 0, 1, 0, 0, 0, 1]",
            "[0, 0, -1, 0, 1, 0, 1, 0, 0]",
        );
        let scene = parse_scene(&json).unwrap();

        // Row vector (1, 0, 0) times M is M's first row.
        let d = scene.camera.rotation * Vec3::X;
        assert!((d - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_missing_lights_is_allowed() {
        let mut value: serde_json::Value = serde_json::from_str(SCENE).unwrap();
        value.as_object_mut().unwrap().remove("lights");
        let json = value.to_string();
        let scene = parse_scene(&json).unwrap();
        assert!(scene.lights.is_empty());
    }

    #[test]
    fn test_missing_albedo_is_rejected() {
        let json = SCENE.replace(r#""albedo": [1, 1, 1]"#, r#""smooth_shading": false"#);
        let err = parse_scene(&json).unwrap_err();

        match err {
            ParseError::MissingProperty {
                index, property, ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(property, "albedo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_ior_is_rejected() {
        let json = SCENE.replace(r#""ior": 1.5, "#, "");
        assert!(matches!(
            parse_scene(&json),
            Err(ParseError::MissingProperty { index: 1, property: "ior", .. })
        ));
    }

    #[test]
    fn test_ragged_vertex_array_is_rejected() {
        let json = SCENE.replace("1, 1, 0],", "1, 1],");
        assert!(matches!(
            parse_scene(&json),
            Err(ParseError::FlatArray { field: "vertices", len: 11, .. })
        ));
    }

    #[test]
    fn test_unknown_material_type_is_rejected() {
        let json = SCENE.replace(r#""type": "diffuse""#, r#""type": "velvet""#);
        assert!(matches!(parse_scene(&json), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_zero_image_size_is_rejected() {
        let json = SCENE.replace(r#""width": 64"#, r#""width": 0"#);
        assert!(matches!(
            parse_scene(&json),
            Err(ParseError::InvalidImageSize { width: 0, height: 36 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_scene("/definitely/not/here.crtscene").unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
