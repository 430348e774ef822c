//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Triangles live in a contiguous arena owned by the scene and reference
//! their material by index.

use crate::{primitive::HitData, Ray, AABB_PAD, TRI_EPSILON};
use cinder_math::{Aabb, Interval, Vec3};

/// A triangle in the scene arena.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Vertices
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Pre-computed edge vectors (v1-v0, v2-v0)
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    /// Index into the scene's material table
    pub material: u32,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: u32) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize_or_zero();

        Self {
            v0,
            v1,
            v2,
            edge1,
            edge2,
            normal,
            material,
        }
    }

    /// Create a triangle with a pre-computed normal (for smooth shading).
    pub fn with_normal(v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3, material: u32) -> Self {
        Self {
            normal: normal.normalize(),
            ..Self::new(v0, v1, v2, material)
        }
    }

    /// Geometric (face) normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Centroid of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Surface area; zero for degenerate triangles.
    pub fn area(&self) -> f32 {
        0.5 * self.edge1.cross(self.edge2).length()
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns true and fills the record if the ray hits strictly inside
    /// `ray_t`. A near-zero determinant (ray parallel to the plane, or a
    /// zero-area triangle) is a miss, never a division by zero.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitData) -> bool {
        let h = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(h);

        if det.abs() < TRI_EPSILON {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = inv_det * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        // t computed last; accept only inside the open interval
        let t = inv_det * self.edge2.dot(q);
        if !ray_t.surrounds(t) {
            return false;
        }

        rec.t = t;
        rec.point = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.material = self.material;
        rec.triangle = None;
        true
    }

    /// Bounding box of the vertices, padded on all sides.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.v0, self.v1)
            .grow(self.v2)
            .pad(AABB_PAD)
    }
}

/// Bounding box of a triangle run, padded on all sides.
///
/// Componentwise min/max reduction over every vertex; the padding keeps
/// planar runs representable as a non-degenerate slab volume.
pub fn triangle_bounds(triangles: &[Triangle]) -> Aabb {
    let bounds = triangles.iter().fold(Aabb::EMPTY, |acc, tri| {
        acc.grow(tri.v0).grow(tri.v1).grow(tri.v2)
    });
    bounds.pad(AABB_PAD)
}
