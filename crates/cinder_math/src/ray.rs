//! Ray type for path tracing.
//!
//! A ray stores its origin, a normalized direction, and the componentwise
//! reciprocal of that direction so the AABB slab test needs no divisions.

use glam::Vec3;

/// A ray with origin, unit direction, and precomputed reciprocal direction.
///
/// Immutable once constructed; each bounce builds a fresh ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized here.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's unit direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the componentwise reciprocal of the direction.
    ///
    /// Components are infinite where the direction is zero; the slab
    /// test handles that through IEEE interval arithmetic.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));

        // Direction is normalized, so t is a distance
        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_ray_inv_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0));

        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.inv_direction().y, 1.0);
        assert!(ray.inv_direction().x.is_infinite());
    }
}
