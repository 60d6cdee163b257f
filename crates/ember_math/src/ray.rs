use crate::Vec3;

/// A ray in 3D space.
///
/// `direction` is always unit length. `t_max` bounds the distance at which a
/// hit is still accepted (shadow rays set it to the light distance), and
/// `depth` counts the number of bounces that produced this ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_max: f32,
    pub depth: u32,
}

impl Ray {
    /// Create a new primary ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            t_max: f32::MAX,
            depth: 0,
        }
    }

    /// Returns the same ray with its hit distance bounded by `t_max`.
    #[inline]
    pub fn with_max_distance(mut self, t_max: f32) -> Self {
        self.t_max = t_max;
        self
    }

    /// Returns the same ray tagged with a recursion depth.
    #[inline]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}
