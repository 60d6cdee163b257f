use crate::{gamma, Ray, Vec3};

/// Axis-Aligned Bounding Box.
///
/// Only ever used as a boolean pre-filter in front of the exact triangle
/// tests. A box grows through [`Aabb::union_with`] and [`Aabb::expand_by`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box containing nothing. Expanding it by a point yields that point.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(-f32::MAX),
    };

    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns true if no point has been added to the box yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to also enclose `other`.
    pub fn union_with(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow the box to also enclose point `p`.
    pub fn expand_by(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns true if `p` lies inside or on the boundary of the box.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Test if a ray hits this box (Kay-Kajiya slab method).
    ///
    /// The far slab distance is widened by `1 + 2·gamma(3)` so that grazing
    /// hits are not lost to rounding in the three operations per axis.
    pub fn intersect(&self, ray: &Ray) -> bool {
        let mut t0 = 0.0_f32;
        let mut t1 = f32::MAX;

        for axis in 0..3 {
            let inv_dir = 1.0 / ray.direction[axis];
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_dir;
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_dir;

            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }

            t_far *= 1.0 + 2.0 * gamma(3);
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return false;
            }
        }

        true
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
