//! Ember Core - scene description for the Ember ray tracer.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `MeshDescription`,
//!   `Material`, `LightDescription`, ...
//! - **Scene loading**: `.crtscene` JSON parsing and validation
//!
//! # Example
//!
//! ```ignore
//! use ember_core::load_scene;
//!
//! let scene = load_scene("scene0.crtscene")?;
//! println!("Loaded {} objects, {} triangles",
//!     scene.objects.len(),
//!     scene.triangle_count());
//! ```

pub mod description;
pub mod parser;

// Re-export commonly used types
pub use description::{
    CameraDescription, LightDescription, Material, MaterialKind, MeshDescription,
    SceneDescription, SettingsDescription,
};
pub use parser::{load_scene, parse_scene, ParseError, ParseResult};
