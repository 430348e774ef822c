//! Monte Carlo sampling helpers.
//!
//! Direction and point warps plus the balance heuristic used by the
//! multiple-importance-sampling estimator.

use crate::gen_f32;
use cinder_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Sample a direction on the hemisphere around +z with cosine weighting.
///
/// pdf(w) = cos(theta) / pi.
pub fn cosine_sample_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    let z = (1.0 - u1).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Sample a direction from a cosine-power lobe around +z.
///
/// pdf(w) = (n + 1) / (2 pi) * cos(alpha)^n, with alpha the angle to +z.
pub fn sample_power_cosine_lobe(exponent: f32, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let cos_alpha = u1.powf(1.0 / (exponent + 1.0));
    let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(sin_alpha * phi.cos(), sin_alpha * phi.sin(), cos_alpha)
}

/// Uniformly sample barycentric coordinates on a triangle.
///
/// The sqrt warp maps the unit square onto the barycentric simplex
/// without rejection; returns (u, v) with u >= 0, v >= 0, u + v <= 1.
pub fn uniform_sample_triangle(rng: &mut dyn RngCore) -> (f32, f32) {
    let su0 = gen_f32(rng).sqrt();
    (1.0 - su0, gen_f32(rng) * su0)
}

/// Weight samples from two strategies using the balance heuristic.
///
/// w = pdf_a / (pdf_a + pdf_b); both densities must share a measure.
#[inline]
pub fn balance_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    pdf_a / (pdf_a + pdf_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_hemisphere_upper_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mean_z = 0.0;
        for _ in 0..2000 {
            let w = cosine_sample_hemisphere(&mut rng);
            assert!(w.z >= 0.0);
            assert!((w.length() - 1.0).abs() < 1e-4);
            mean_z += w.z;
        }
        // E[cos(theta)] = 2/3 for cosine weighting
        mean_z /= 2000.0;
        assert!((mean_z - 2.0 / 3.0).abs() < 0.03);
    }

    #[test]
    fn test_power_lobe_concentrates() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut min_z: f32 = 1.0;
        for _ in 0..2000 {
            let w = sample_power_cosine_lobe(200.0, &mut rng);
            assert!((w.length() - 1.0).abs() < 1e-4);
            min_z = min_z.min(w.z);
        }
        // A sharp lobe stays close to its axis
        assert!(min_z > 0.8);
    }

    #[test]
    fn test_uniform_triangle_barycentrics() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..2000 {
            let (u, v) = uniform_sample_triangle(&mut rng);
            assert!(u >= 0.0 && v >= 0.0 && u + v <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_balance_heuristic() {
        assert_eq!(balance_heuristic(1.0, 1.0), 0.5);
        assert!((balance_heuristic(3.0, 1.0) - 0.75).abs() < 1e-6);

        // Complementary weights sum to one
        let (a, b) = (0.3, 1.7);
        let sum = balance_heuristic(a, b) + balance_heuristic(b, a);
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
