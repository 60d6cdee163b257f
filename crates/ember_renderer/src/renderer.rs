//! Whole-image rendering.
//!
//! One primary ray per pixel center. The pixel buffer is split into chunks
//! (see [`partition`](crate::partition)) and each pool thread renders its own
//! chunks straight into the output, so no locking is needed and the result
//! is the same for any thread count.

use std::time::Instant;

use ember_math::{Interval, Ray};
use thiserror::Error;

use crate::{
    material::shade,
    output::{ImageBuffer, Rgb},
    partition::{chunk_count, partition_chunks, Chunk},
    scene::Scene,
    thread_pool::{PoolError, ThreadPool},
    Color,
};

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Maximum secondary ray depth. Rays deeper than this see the background.
    pub max_depth: u32,
    /// Consecutive pixels per unit of work
    pub pixels_per_chunk: usize,
    /// Offset along the normal for shadow ray origins
    pub shadow_bias: f32,
    /// Offset along the normal for reflected ray origins
    pub reflection_bias: f32,
    /// Offset against the normal for refracted ray origins
    pub refraction_bias: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            pixels_per_chunk: 16,
            shadow_bias: 1e-2,
            reflection_bias: 1e-3,
            refraction_bias: 1e-4,
        }
    }
}

impl RenderConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// # Panics
    ///
    /// Panics if `pixels_per_chunk` is zero.
    pub fn with_pixels_per_chunk(mut self, pixels_per_chunk: usize) -> Self {
        assert!(pixels_per_chunk > 0, "pixels_per_chunk must be positive");
        self.pixels_per_chunk = pixels_per_chunk;
        self
    }
}

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render task failed: {0}")]
    Pool(#[from] PoolError),
}

/// Color seen along a ray: the shaded nearest hit, or the background.
pub fn ray_color(scene: &Scene, ray: &Ray, config: &RenderConfig) -> Color {
    match scene.trace(ray) {
        Some(hit) => shade(scene, ray, &hit, config),
        None => scene.background(),
    }
}

/// Convert a linear color to 8-bit, clamping each channel to [0, 1].
pub fn color_to_rgb(color: Color) -> Rgb {
    color
        .to_array()
        .map(|c| (Interval::UNIT.clamp(c) * 255.0) as u8)
}

/// Render the pixel at row-major index `index`.
pub fn render_pixel(scene: &Scene, index: usize, config: &RenderConfig) -> Rgb {
    let width = scene.width() as usize;
    let row = (index / width) as u32;
    let col = (index % width) as u32;

    let ray = scene.camera().get_ray(row, col);
    color_to_rgb(ray_color(scene, &ray, config))
}

fn render_chunks(scene: &Scene, chunks: Vec<Chunk<'_, Rgb>>, config: &RenderConfig) {
    for chunk in chunks {
        for (offset, pixel) in chunk.pixels.iter_mut().enumerate() {
            *pixel = render_pixel(scene, chunk.start + offset, config);
        }
    }
}

/// Render the scene on the pool's threads.
pub fn render(
    scene: &Scene,
    pool: &ThreadPool,
    config: &RenderConfig,
) -> Result<ImageBuffer, RenderError> {
    let mut image = ImageBuffer::new(scene.width(), scene.height());
    render_into(scene, pool, config, &mut image)?;
    Ok(image)
}

/// Render the scene into an existing image of the scene's size.
///
/// # Panics
///
/// Panics if the image size doesn't match the scene.
pub fn render_into(
    scene: &Scene,
    pool: &ThreadPool,
    config: &RenderConfig,
    image: &mut ImageBuffer,
) -> Result<(), RenderError> {
    assert_eq!(
        (image.width, image.height),
        (scene.width(), scene.height()),
        "image size doesn't match the scene"
    );

    let start = Instant::now();
    let task_count = pool.thread_count();
    log::debug!(
        "Rendering {}x{} in {} chunks of {} pixels on {} threads",
        scene.width(),
        scene.height(),
        chunk_count(scene.pixel_count(), config.pixels_per_chunk),
        config.pixels_per_chunk,
        task_count
    );

    let tasks = partition_chunks(&mut image.pixels, config.pixels_per_chunk, task_count);
    pool.scoped(|scope| {
        for chunks in tasks {
            scope.execute(move || render_chunks(scene, chunks, config));
        }
    })?;

    log::debug!("Rendered in {:.2?}", start.elapsed());
    Ok(())
}

/// Render on the calling thread. Produces the same image as [`render`].
pub fn render_serial(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let mut image = ImageBuffer::new(scene.width(), scene.height());
    for (index, pixel) in image.pixels.iter_mut().enumerate() {
        *pixel = render_pixel(scene, index, config);
    }
    image
}
