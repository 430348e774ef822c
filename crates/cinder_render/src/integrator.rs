//! Monte Carlo light-transport estimators.
//!
//! Three estimators of increasing sophistication share the same iterative
//! bounce loop: plain path tracing, next-event estimation (NEE), and NEE
//! combined with BSDF sampling through the balance heuristic (MIS). Each
//! traces one camera ray to a radiance value; per-sample degeneracies
//! (parallel rays, zero pdfs, non-finite terms) contribute zero instead
//! of propagating.

use crate::{
    material::Material,
    renderer::RenderConfig,
    sampling::balance_heuristic,
    scene::Scene,
    Color, Ray, NUM_SHADOW_RAYS, PDF_EPSILON, T_MAX, T_MIN, VIS_EPSILON,
};
use cinder_math::{Interval, Vec3};
use rand::RngCore;

/// Which light-transport estimator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// BSDF sampling only; lights are found by random walk
    Plain,
    /// Shadow rays toward area lights at every diffuse bounce
    Nee,
    /// NEE and BSDF sampling combined with the balance heuristic
    Mis,
}

/// Compute the radiance carried by one camera ray.
pub fn radiance(
    scene: &Scene,
    ray: &Ray,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let value = match config.estimator {
        Estimator::Plain => trace_plain(scene, *ray, config, rng),
        Estimator::Nee => trace_nee(scene, *ray, config, rng),
        Estimator::Mis => trace_mis(scene, *ray, config, rng),
    };

    // A sample is never allowed to poison the pixel
    if value.is_finite() {
        value.max(Color::ZERO)
    } else {
        Color::ZERO
    }
}

/// Plain estimator: accumulate emission at every hit, importance-sample
/// the BSDF for the next segment, stop at the depth cutoff or on escape.
fn trace_plain(scene: &Scene, mut ray: Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;

    for _ in 0..config.max_depth {
        let Some(hit) = scene.hit(&ray, Interval::new(T_MIN, T_MAX)) else {
            radiance += throughput * background(&ray, config);
            break;
        };

        let material = *scene.material(hit.material);
        radiance += throughput * material.emitted(hit.front_face);

        let Some(sample) = material.sample(ray.direction(), hit.normal, rng) else {
            break;
        };
        throughput *= sample.weight;
        if throughput.max_element() <= 0.0 {
            break;
        }

        ray = bounce_ray(hit.point, hit.normal, sample.direction);
    }

    radiance
}

/// NEE estimator: at every non-specular bounce sample the lights
/// directly; emissive hits terminate the path and count only when the
/// previous bounce could not have sampled them (camera ray or mirror).
fn trace_nee(scene: &Scene, mut ray: Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut specular_bounce = true;

    for _ in 0..config.max_depth {
        let Some(hit) = scene.hit(&ray, Interval::new(T_MIN, T_MAX)) else {
            radiance += throughput * background(&ray, config);
            break;
        };

        let material = *scene.material(hit.material);
        if material.is_emissive() {
            // Direct light was already gathered at the previous diffuse
            // bounce; adding Le again would double count.
            if specular_bounce {
                radiance += throughput * material.emitted(hit.front_face);
            }
            break;
        }

        if !material.is_specular() {
            let direct = sample_direct(
                scene,
                hit.point,
                hit.normal,
                ray.direction(),
                &material,
                rng,
                false,
            );
            radiance += throughput * direct;
        }

        let Some(sample) = material.sample(ray.direction(), hit.normal, rng) else {
            break;
        };
        throughput *= sample.weight;
        if throughput.max_element() <= 0.0 {
            break;
        }
        specular_bounce = sample.specular;

        ray = bounce_ray(hit.point, hit.normal, sample.direction);
    }

    radiance
}

/// MIS estimator: light sampling and BSDF sampling combined with the
/// balance heuristic, both pdfs compared in the solid-angle measure.
fn trace_mis(scene: &Scene, mut ray: Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut specular_bounce = true;
    // Solid-angle pdf of the BSDF sample that produced the current ray
    let mut prev_pdf = 1.0_f32;

    for _ in 0..config.max_depth {
        let Some(hit) = scene.hit(&ray, Interval::new(T_MIN, T_MAX)) else {
            radiance += throughput * background(&ray, config);
            break;
        };

        let material = *scene.material(hit.material);
        if material.is_emissive() {
            let emitted = material.emitted(hit.front_face);
            let weight = if specular_bounce {
                1.0
            } else {
                // Density with which NEE would have picked this point,
                // converted to solid angle; direction is unit so hit.t
                // is the distance to the light.
                let pdf_light = hit
                    .triangle
                    .map(|tri| {
                        let cos_y = scene.light_cosine(
                            scene.triangle(tri).normal(),
                            ray.direction(),
                        );
                        if cos_y <= PDF_EPSILON {
                            0.0
                        } else {
                            scene.light_pdf_area(tri) * hit.t * hit.t / cos_y
                        }
                    })
                    .unwrap_or(0.0);
                if pdf_light <= PDF_EPSILON {
                    // NEE cannot sample this emitter; BSDF sampling is
                    // the only strategy and takes full weight.
                    1.0
                } else {
                    balance_heuristic(prev_pdf, pdf_light)
                }
            };
            radiance += weight * throughput * emitted;
            break;
        }

        if !material.is_specular() {
            let direct = sample_direct(
                scene,
                hit.point,
                hit.normal,
                ray.direction(),
                &material,
                rng,
                true,
            );
            radiance += throughput * direct;
        }

        let Some(sample) = material.sample(ray.direction(), hit.normal, rng) else {
            break;
        };
        throughput *= sample.weight;
        if throughput.max_element() <= 0.0 {
            break;
        }
        specular_bounce = sample.specular;
        prev_pdf = sample.pdf;

        ray = bounce_ray(hit.point, hit.normal, sample.direction);
    }

    radiance
}

/// Estimate direct lighting at a surface point by sampling the lights.
///
/// Casts `NUM_SHADOW_RAYS` shadow rays toward uniformly sampled points on
/// uniformly chosen emissive triangles; unoccluded samples contribute
/// `Le * f * G / pdf_area` with the geometric term
/// `G = cos_x * cos_y / dist^2`. With `mis` set, each contribution is
/// additionally weighted against the BSDF's density for that direction.
fn sample_direct(
    scene: &Scene,
    point: Vec3,
    normal: Vec3,
    wi_in: Vec3,
    material: &Material,
    rng: &mut dyn RngCore,
    mis: bool,
) -> Color {
    let mut sum = Color::ZERO;

    for _ in 0..NUM_SHADOW_RAYS {
        let Some(light) = scene.sample_light(rng) else {
            return Color::ZERO;
        };

        let to_light = light.point - point;
        let dist2 = to_light.length_squared();
        if dist2 <= PDF_EPSILON {
            continue;
        }
        let dist = dist2.sqrt();
        let wi = to_light / dist;

        let cos_x = normal.dot(wi);
        if cos_x <= 0.0 {
            continue;
        }
        let cos_y = scene.light_cosine(light.normal, wi);
        if cos_y <= PDF_EPSILON {
            continue;
        }

        let f = material.eval(wi_in, normal, wi);
        if f == Color::ZERO {
            continue;
        }

        // Occlusion check: the shadow ray must land on the sampled point
        let shadow = bounce_ray(point, normal, wi);
        let Some(occluder) = scene.hit(&shadow, Interval::new(T_MIN, T_MAX)) else {
            continue;
        };
        if !occluder
            .point
            .abs_diff_eq(light.point, VIS_EPSILON * (1.0 + dist))
        {
            continue;
        }

        let g = cos_x * cos_y / dist2;
        let mut contribution = light.emission * f * g / light.pdf_area;

        if mis {
            let pdf_light = light.pdf_area * dist2 / cos_y;
            if pdf_light <= PDF_EPSILON {
                continue;
            }
            let pdf_bsdf = material.pdf(wi_in, normal, wi);
            contribution *= balance_heuristic(pdf_light, pdf_bsdf);
        }

        if contribution.is_finite() {
            sum += contribution;
        }
    }

    sum / NUM_SHADOW_RAYS as f32
}

/// New ray leaving a surface, origin nudged along the facing normal to
/// avoid immediate self-re-intersection.
#[inline]
fn bounce_ray(point: Vec3, normal: Vec3, direction: Vec3) -> Ray {
    Ray::new(point + T_MIN * normal, direction)
}

/// Background radiance for escaped rays.
fn background(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// Vertical white-to-blue sky gradient.
fn sky_gradient(ray: &Ray) -> Color {
    let a = 0.5 * (ray.direction().y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sphere, Triangle};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn quad_triangles(y: f32, half: f32, material: u32) -> Vec<Triangle> {
        let a = Vec3::new(-half, y, -half);
        let b = Vec3::new(half, y, -half);
        let c = Vec3::new(half, y, half);
        let d = Vec3::new(-half, y, half);
        vec![
            Triangle::new(a, b, c, material),
            Triangle::new(a, c, d, material),
        ]
    }

    /// Diffuse floor at y=0 with a square area light at y=2.
    fn light_over_floor() -> Scene {
        let materials = vec![
            Material::lambertian(Color::splat(0.5)),
            Material::emissive(Color::splat(4.0)),
        ];
        let mut triangles = quad_triangles(0.0, 4.0, 0);
        triangles.extend(quad_triangles(2.0, 0.75, 1));
        Scene::new(triangles, vec![], vec![], materials).unwrap()
    }

    fn config(estimator: Estimator, max_depth: u32) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 1,
            max_depth,
            estimator,
            background: Color::ZERO,
            use_sky_gradient: false,
            seed: 0,
            threads: None,
        }
    }

    fn average(scene: &Scene, ray: &Ray, cfg: &RenderConfig, samples: u32, seed: u64) -> Color {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sum = Color::ZERO;
        for _ in 0..samples {
            sum += radiance(scene, ray, cfg, &mut rng);
        }
        sum / samples as f32
    }

    #[test]
    fn test_direct_light_view_is_le() {
        let scene = light_over_floor();
        // Straight up into the light from just above the floor, off the
        // quad's diagonal so exactly one triangle owns the hit
        let ray = Ray::new(Vec3::new(0.1, 0.5, 0.25), Vec3::Y);

        for estimator in [Estimator::Plain, Estimator::Nee, Estimator::Mis] {
            let cfg = config(estimator, 5);
            let mut rng = StdRng::seed_from_u64(1);
            let value = radiance(&scene, &ray, &cfg, &mut rng);
            assert!(
                value.abs_diff_eq(Color::splat(4.0), 1e-4),
                "{estimator:?} returned {value} for a direct light view"
            );
        }
    }

    #[test]
    fn test_escape_returns_background() {
        let scene = light_over_floor();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);

        let mut cfg = config(Estimator::Plain, 5);
        cfg.background = Color::new(0.1, 0.2, 0.3);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(radiance(&scene, &ray, &cfg, &mut rng).abs_diff_eq(cfg.background, 1e-6));

        cfg.use_sky_gradient = true;
        let value = radiance(&scene, &ray, &cfg, &mut rng);
        // Horizontal ray: halfway between white and blue
        assert!(value.abs_diff_eq(Color::new(0.75, 0.85, 1.0), 1e-5));
    }

    #[test]
    fn test_estimators_agree_on_quad_light_scene() {
        let scene = light_over_floor();
        // Camera ray hitting the floor away from straight under the light
        let origin = Vec3::new(0.0, 2.5, 3.0);
        let target = Vec3::new(0.5, 0.0, 0.5);
        let ray = Ray::new(origin, target - origin);

        let samples = 50_000;
        let plain = average(&scene, &ray, &config(Estimator::Plain, 8), samples, 101);
        let nee = average(&scene, &ray, &config(Estimator::Nee, 8), samples, 202);
        let mis = average(&scene, &ray, &config(Estimator::Mis, 8), samples, 303);

        let tol = 0.08;
        let rel = |a: Color, b: Color| (a - b).length() / a.length().max(1e-6);
        assert!(rel(nee, plain) < tol, "plain {plain} vs nee {nee}");
        assert!(rel(nee, mis) < tol, "nee {nee} vs mis {mis}");
        assert!(nee.min_element() > 0.0);
    }

    #[test]
    fn test_radiance_non_negative_and_finite() {
        let materials = vec![
            Material::lambertian(Color::new(0.8, 0.3, 0.2)),
            Material::mirror(Color::splat(0.9)),
            Material::phong(Color::splat(0.7), 40.0),
            Material::emissive(Color::splat(6.0)),
        ];
        let mut triangles = quad_triangles(0.0, 5.0, 0);
        triangles.extend(quad_triangles(3.0, 0.5, 3));
        let spheres = vec![
            Sphere::new(Vec3::new(-1.0, 1.0, 0.0), 1.0, 1),
            Sphere::new(Vec3::new(1.5, 1.0, 0.0), 1.0, 2),
        ];
        let scene = Scene::new(triangles, spheres, vec![], materials).unwrap();

        let mut rng = StdRng::seed_from_u64(77);
        for estimator in [Estimator::Plain, Estimator::Nee, Estimator::Mis] {
            let cfg = config(estimator, 5);
            for _ in 0..500 {
                let origin = Vec3::new(
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(0.2..4.0),
                    rng.gen_range(-4.0..4.0),
                );
                let dir = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                if dir.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new(origin, dir);
                let value = radiance(&scene, &ray, &cfg, &mut rng);
                assert!(value.is_finite());
                assert!(value.min_element() >= 0.0);
            }
        }
    }
}
