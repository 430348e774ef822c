//! cinder CPU renderer
//!
//! A Monte Carlo path tracer over an index-arena scene: triangles and
//! materials live in contiguous buffers and are referenced by integer
//! index, a BVH accelerates nearest-hit queries, and three estimators
//! (plain path tracing, next-event estimation, multiple importance
//! sampling) turn camera rays into pixel radiance.

mod bvh;
mod camera;
mod error;
mod integrator;
mod material;
mod primitive;
mod renderer;
mod sampling;
mod scene;
mod tile;
mod triangle;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{RenderError, SceneError};
pub use integrator::{radiance, Estimator};
pub use material::{BsdfSample, Material, MaterialKind};
pub use primitive::{AaQuad, BoxShape, HitData, Sphere};
pub use renderer::{
    color_to_rgb, render, render_image, render_pixel, ImageBuffer, RenderConfig,
};
pub use scene::{LightSample, Scene};
pub use tile::{generate_tiles, render_tile, Tile, TileResult, DEFAULT_TILE_SIZE};
pub use triangle::Triangle;

/// Re-export common math types from cinder_math
pub use cinder_math::{Aabb, Interval, Onb, Ray, Vec3};

use rand::RngCore;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Minimum accepted ray parameter; rejects self-intersections at the origin.
pub const T_MIN: f32 = 1e-3;
/// Far bound for ray parameters.
pub const T_MAX: f32 = f32::MAX;
/// Determinant threshold below which a ray counts as parallel to a triangle.
pub const TRI_EPSILON: f32 = 1e-4;
/// Padding added to every BVH bounding box side.
pub const AABB_PAD: f32 = 0.05;
/// Maximum triangles per BVH leaf.
pub const LEAF_SIZE: usize = 8;
/// Shadow rays cast per next-event-estimation bounce.
pub const NUM_SHADOW_RAYS: u32 = 1;
/// Whether emissive triangles radiate from both faces.
pub const TWO_SIDED_LIGHTS: bool = true;
/// Probability densities below this are treated as zero.
pub const PDF_EPSILON: f32 = 1e-6;
/// Tolerance when matching a shadow-ray hit against a sampled light point.
pub const VIS_EPSILON: f32 = 1e-3;

/// Generate a uniform f32 in [0, 1) from any RNG.
///
/// Object-safe helper so hot paths can take `&mut dyn RngCore`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    // 24 high bits give every representable value in [0, 1)
    (rng.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }
}
