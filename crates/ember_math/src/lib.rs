// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Machine epsilon used by the intersection tests (half of `f32::EPSILON`,
/// i.e. the unit roundoff for `f32`).
pub const EPSILON: f32 = f32::EPSILON * 0.5;

/// Conservative bound on the rounding error of `n` chained floating-point
/// operations: `n·ε / (1 − n·ε)`.
#[inline]
pub fn gamma(n: u32) -> f32 {
    let n = n as f32;
    (n * EPSILON) / (1.0 - n * EPSILON)
}
