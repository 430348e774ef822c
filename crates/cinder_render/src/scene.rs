//! Immutable scene aggregate.
//!
//! Triangles, analytic primitives and materials live in contiguous owned
//! buffers; primitives reference materials by index. Construction builds
//! the BVH (reordering the triangle arena) and collects the emissive
//! triangles as light sources. After that the scene is read-only and can
//! be shared by reference across all render workers without locks.

use crate::{
    error::SceneError,
    material::Material,
    primitive::{BoxShape, HitData, Sphere},
    sampling::uniform_sample_triangle,
    triangle::Triangle,
    BvhNode, Color, Ray, TWO_SIDED_LIGHTS,
};
use cinder_math::{Interval, Vec3};
use rand::RngCore;

/// A point sampled on an emissive triangle.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Sampled point on the light surface
    pub point: Vec3,
    /// Geometric normal of the light at the point
    pub normal: Vec3,
    /// Emitted radiance of the light material
    pub emission: Color,
    /// Area-measure density: 1 / (num_lights * triangle_area)
    pub pdf_area: f32,
    /// Arena index of the sampled triangle
    pub triangle: u32,
}

/// A static scene: primitive arenas, material table, light list, BVH.
#[derive(Debug)]
pub struct Scene {
    triangles: Vec<Triangle>,
    spheres: Vec<Sphere>,
    boxes: Vec<BoxShape>,
    materials: Vec<Material>,
    /// Arena indices of emissive triangles
    lights: Vec<u32>,
    bvh: BvhNode,
}

impl Scene {
    /// Build a scene. The triangle arena is reordered by BVH
    /// construction; material indices are validated up front.
    pub fn new(
        mut triangles: Vec<Triangle>,
        spheres: Vec<Sphere>,
        boxes: Vec<BoxShape>,
        materials: Vec<Material>,
    ) -> Result<Self, SceneError> {
        let check = |index: u32| {
            if (index as usize) < materials.len() {
                Ok(())
            } else {
                Err(SceneError::MaterialOutOfRange {
                    index,
                    len: materials.len(),
                })
            }
        };
        for tri in &triangles {
            check(tri.material)?;
        }
        for sphere in &spheres {
            check(sphere.material)?;
        }
        for shape in &boxes {
            check(shape.material)?;
        }

        let bvh = BvhNode::new(&mut triangles);

        // Light indices refer to the arena after reordering
        let lights: Vec<u32> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| materials[tri.material as usize].is_emissive())
            .map(|(i, _)| i as u32)
            .collect();

        log::info!(
            "scene: {} triangles ({} emissive), {} spheres, {} boxes, {} materials",
            triangles.len(),
            lights.len(),
            spheres.len(),
            boxes.len(),
            materials.len()
        );

        Ok(Self {
            triangles,
            spheres,
            boxes,
            materials,
            lights,
            bvh,
        })
    }

    /// Material table lookup.
    #[inline]
    pub fn material(&self, index: u32) -> &Material {
        &self.materials[index as usize]
    }

    /// Triangle arena lookup (post-reorder indices).
    #[inline]
    pub fn triangle(&self, index: u32) -> &Triangle {
        &self.triangles[index as usize]
    }

    /// Number of emissive triangles.
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Nearest intersection across the BVH and the linear primitives.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitData> {
        let mut rec = HitData::default();
        let mut closest = ray_t.max;
        let mut hit_anything = false;

        if self.bvh.hit(ray, &self.triangles, ray_t, &mut rec) {
            hit_anything = true;
            closest = rec.t;
        }
        for sphere in &self.spheres {
            if sphere.hit(ray, Interval::new(ray_t.min, closest), &mut rec) {
                hit_anything = true;
                closest = rec.t;
            }
        }
        for shape in &self.boxes {
            if shape.hit(ray, Interval::new(ray_t.min, closest), &mut rec) {
                hit_anything = true;
                closest = rec.t;
            }
        }

        hit_anything.then_some(rec)
    }

    /// Uniformly pick a light triangle, then a uniform point on it.
    ///
    /// Returns `None` when the scene has no lights or the pick is
    /// degenerate (zero-area light).
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        if self.lights.is_empty() {
            return None;
        }

        let pick = (rng.next_u32() as usize) % self.lights.len();
        let index = self.lights[pick];
        let tri = &self.triangles[index as usize];

        let area = tri.area();
        if area <= 0.0 {
            return None;
        }

        let (u, v) = uniform_sample_triangle(rng);
        let point = tri.v0 + u * (tri.v1 - tri.v0) + v * (tri.v2 - tri.v0);

        Some(LightSample {
            point,
            normal: tri.normal(),
            emission: self.materials[tri.material as usize].emission,
            pdf_area: 1.0 / (self.lights.len() as f32 * area),
            triangle: index,
        })
    }

    /// Area-measure density with which `sample_light` picks a point on
    /// the given triangle; zero if it is not a light.
    pub fn light_pdf_area(&self, triangle: u32) -> f32 {
        if !self.lights.contains(&triangle) {
            return 0.0;
        }
        let area = self.triangles[triangle as usize].area();
        if area <= 0.0 {
            return 0.0;
        }
        1.0 / (self.lights.len() as f32 * area)
    }

    /// Cosine between a light's surface and a direction toward a viewer.
    ///
    /// `dir_to_light` points from the shaded point to the light. With
    /// two-sided lights the sign of the normal is irrelevant.
    pub fn light_cosine(&self, normal: Vec3, dir_to_light: Vec3) -> f32 {
        let cos = normal.dot(-dir_to_light);
        if TWO_SIDED_LIGHTS {
            cos.abs()
        } else {
            cos.max(0.0)
        }
    }
}
