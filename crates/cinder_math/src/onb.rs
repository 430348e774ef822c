//! Orthonormal basis construction.

use glam::Vec3;

/// A right-handed orthonormal basis with `w` as the primary axis.
///
/// Built with the branchless construction of Duff et al. (2017), which is
/// stable for any unit `w` including the poles.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis around the unit vector `w`.
    pub fn from_w(w: Vec3) -> Self {
        let sign = 1.0_f32.copysign(w.z);
        let a = -1.0 / (sign + w.z);
        let b = w.x * w.y * a;
        Self {
            u: Vec3::new(1.0 + sign * w.x * w.x * a, sign * b, -sign * w.x),
            v: Vec3::new(b, sign + w.y * w.y * a, -w.y),
            w,
        }
    }

    /// Transform a vector from basis-local coordinates to world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(onb: &Onb) {
        assert!((onb.u.length() - 1.0).abs() < 1e-5);
        assert!((onb.v.length() - 1.0).abs() < 1e-5);
        assert!((onb.w.length() - 1.0).abs() < 1e-5);
        assert!(onb.u.dot(onb.v).abs() < 1e-5);
        assert!(onb.u.dot(onb.w).abs() < 1e-5);
        assert!(onb.v.dot(onb.w).abs() < 1e-5);
    }

    #[test]
    fn test_onb_orthonormal() {
        for w in [
            Vec3::Z,
            -Vec3::Z,
            Vec3::Y,
            Vec3::new(1.0, 2.0, 3.0).normalize(),
            Vec3::new(-0.3, 0.1, -0.9).normalize(),
        ] {
            let onb = Onb::from_w(w);
            assert_orthonormal(&onb);
            assert!(onb.w.abs_diff_eq(w, 1e-6));
        }
    }

    #[test]
    fn test_onb_local_z_maps_to_w() {
        let w = Vec3::new(0.2, -0.5, 0.7).normalize();
        let onb = Onb::from_w(w);
        assert!(onb.local(Vec3::Z).abs_diff_eq(w, 1e-5));
    }
}
