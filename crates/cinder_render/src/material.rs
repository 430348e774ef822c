//! Material model: tagged surface kinds with importance sampling.
//!
//! Materials are shared read-only entries in the scene's table,
//! referenced by index from primitives. Each kind has a sampling rule
//! (direction + throughput weight), plus `eval`/`pdf` for the NEE and
//! MIS estimators.
//!
//! BSDF convention: the Lambertian 1/pi is folded into the albedo, i.e.
//! eval() returns f = albedo for diffuse surfaces, so the cosine-weighted
//! sample weight is pi * albedo. The Phong lobe uses the matching
//! normalization, f = specular * (n+2)/2 * cos(alpha)^n, sampled with the
//! true lobe density (n+1)/(2 pi) * cos(alpha)^n, which puts the
//! (n+2)/(n+1) correction in the sampled throughput. pdf() always returns
//! the true solid-angle density.

use crate::{
    sampling::{cosine_sample_hemisphere, sample_power_cosine_lobe},
    Color, TWO_SIDED_LIGHTS,
};
use cinder_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Surface kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Ideal diffuse reflector
    Lambertian,
    /// Perfect specular mirror
    Mirror,
    /// Glossy cosine-power lobe
    Phong,
}

/// A surface material: kind tag plus shared parameter slots.
///
/// The Phong exponent is meaningful only for the Phong kind; emission
/// applies to any kind.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub kind: MaterialKind,
    /// Diffuse albedo
    pub albedo: Color,
    /// Specular tint
    pub specular: Color,
    /// Phong exponent
    pub exponent: f32,
    /// Emitted radiance Le
    pub emission: Color,
}

/// One sampled outgoing direction with its throughput update.
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    /// Unit outgoing direction
    pub direction: Vec3,
    /// f * cos / pdf, the factor multiplied into the path throughput
    pub weight: Color,
    /// Solid-angle density of the sampled direction (1.0 for deltas)
    pub pdf: f32,
    /// True for delta distributions (mirror)
    pub specular: bool,
}

impl Material {
    /// Ideal diffuse surface.
    pub fn lambertian(albedo: Color) -> Self {
        Self {
            kind: MaterialKind::Lambertian,
            albedo,
            specular: Color::ZERO,
            exponent: 0.0,
            emission: Color::ZERO,
        }
    }

    /// Perfect mirror with a specular tint.
    pub fn mirror(tint: Color) -> Self {
        Self {
            kind: MaterialKind::Mirror,
            albedo: Color::ZERO,
            specular: tint,
            exponent: 0.0,
            emission: Color::ZERO,
        }
    }

    /// Glossy Phong lobe.
    pub fn phong(specular: Color, exponent: f32) -> Self {
        Self {
            kind: MaterialKind::Phong,
            albedo: Color::ZERO,
            specular,
            exponent,
            emission: Color::ZERO,
        }
    }

    /// Diffuse area-light emitter.
    pub fn emissive(emission: Color) -> Self {
        Self {
            emission,
            ..Self::lambertian(Color::ZERO)
        }
    }

    /// Attach emitted radiance to any base material.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// True if the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission != Color::ZERO
    }

    /// True for delta (non-sampleable-by-NEE) surfaces.
    pub fn is_specular(&self) -> bool {
        self.kind == MaterialKind::Mirror
    }

    /// Emitted radiance toward the viewer.
    ///
    /// Back faces emit only when two-sided lighting is enabled.
    pub fn emitted(&self, front_face: bool) -> Color {
        if front_face || TWO_SIDED_LIGHTS {
            self.emission
        } else {
            Color::ZERO
        }
    }

    /// Sample an outgoing direction for a ray arriving along `wi_in`.
    ///
    /// `normal` is the forward-facing surface normal. Returns `None` when
    /// the sample is absorbed or degenerate (contributes zero radiance).
    pub fn sample(&self, wi_in: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Option<BsdfSample> {
        match self.kind {
            MaterialKind::Lambertian => {
                let local = cosine_sample_hemisphere(rng);
                if local.z <= 0.0 {
                    return None;
                }
                let direction = Onb::from_w(normal).local(local);
                Some(BsdfSample {
                    direction,
                    // f * cos / pdf = albedo * cos / (cos / pi)
                    weight: PI * self.albedo,
                    pdf: local.z / PI,
                    specular: false,
                })
            }

            MaterialKind::Mirror => {
                let direction = reflect(wi_in, normal);
                if direction.dot(normal) <= 0.0 {
                    return None;
                }
                Some(BsdfSample {
                    direction,
                    weight: self.specular,
                    pdf: 1.0,
                    specular: true,
                })
            }

            MaterialKind::Phong => {
                let mirror_dir = reflect(wi_in, normal);
                if mirror_dir.dot(normal) <= 0.0 {
                    return None;
                }
                let local = sample_power_cosine_lobe(self.exponent, rng);
                let direction = Onb::from_w(mirror_dir).local(local);

                // Lobe samples below the surface are rejected, not flipped
                let cos_out = direction.dot(normal);
                if cos_out <= 0.0 {
                    return None;
                }

                let n = self.exponent;
                Some(BsdfSample {
                    direction,
                    weight: PI * (n + 2.0) / (n + 1.0) * cos_out * self.specular,
                    pdf: (n + 1.0) / (2.0 * PI) * local.z.max(0.0).powf(n),
                    specular: false,
                })
            }
        }
    }

    /// Evaluate f for a given pair of directions (see module convention).
    ///
    /// `wi_in` points toward the surface, `wo` away from it. Zero for
    /// directions below the hemisphere and for delta surfaces.
    pub fn eval(&self, wi_in: Vec3, normal: Vec3, wo: Vec3) -> Color {
        if wo.dot(normal) <= 0.0 {
            return Color::ZERO;
        }
        match self.kind {
            MaterialKind::Lambertian => self.albedo,
            MaterialKind::Mirror => Color::ZERO,
            MaterialKind::Phong => {
                let cos_alpha = reflect(wi_in, normal).dot(wo).max(0.0);
                let n = self.exponent;
                (n + 2.0) / 2.0 * cos_alpha.powf(n) * self.specular
            }
        }
    }

    /// Solid-angle density with which `sample` would pick `wo`.
    ///
    /// Zero for delta surfaces and for directions below the hemisphere.
    pub fn pdf(&self, wi_in: Vec3, normal: Vec3, wo: Vec3) -> f32 {
        if wo.dot(normal) <= 0.0 {
            return 0.0;
        }
        match self.kind {
            MaterialKind::Lambertian => wo.dot(normal) / PI,
            MaterialKind::Mirror => 0.0,
            MaterialKind::Phong => {
                let cos_alpha = reflect(wi_in, normal).dot(wo).max(0.0);
                let n = self.exponent;
                (n + 1.0) / (2.0 * PI) * cos_alpha.powf(n)
            }
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
