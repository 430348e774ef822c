// Re-export glam for convenience
pub use glam::*;

// cinder math types
mod aabb;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

/// Tolerance for floating-point comparisons of positions and directions.
pub const CMP_EPSILON: f32 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_epsilon_compare() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = a + Vec3::splat(CMP_EPSILON * 0.5);
        assert!(a.abs_diff_eq(b, CMP_EPSILON));
        assert!(!a.abs_diff_eq(b + Vec3::X, CMP_EPSILON));
    }
}
