//! Ember Renderer - multithreaded CPU ray tracer
//!
//! Whitted-style ray tracing of triangle meshes: diffuse surfaces lit by
//! point lights with hard shadows, mirrors, and glass with Fresnel
//! blending. Rendering is split across a fixed [`ThreadPool`].

mod camera;
mod hit;
mod light;
mod material;
mod mesh;
mod output;
mod partition;
mod renderer;
mod scene;
mod thread_pool;
mod triangle;

pub use camera::Camera;
pub use hit::HitRecord;
pub use light::PointLight;
pub use material::{fresnel, reflect, refract, shade};
pub use mesh::{MeshError, TriangleMesh};
pub use output::{ImageBuffer, ImageError, ImageFormat, Rgb};
pub use partition::{chunk_count, chunk_owner, partition_chunks, Chunk};
pub use renderer::{
    color_to_rgb, ray_color, render, render_into, render_pixel, render_serial, RenderConfig,
    RenderError,
};
pub use scene::{Scene, SceneError};
pub use thread_pool::{PoolError, Scope, ThreadPool};
pub use triangle::{intersect_triangle, Triangle};

/// Linear RGB color
pub type Color = ember_math::Vec3;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
