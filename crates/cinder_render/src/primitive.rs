//! Analytic primitives: spheres, axis-aligned quads and boxes.
//!
//! Triangles have their own module since they are what the BVH indexes;
//! the primitives here are intersected linearly by the scene.

use crate::Ray;
use cinder_math::{Interval, Vec3};

/// Record of a ray-surface intersection.
///
/// Transient: created fresh per query and discarded after use. The
/// material is an arena index, so `Default` needs no placeholder object.
#[derive(Debug, Clone, Copy)]
pub struct HitData {
    /// Parametric distance along the ray
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at the intersection (always points against the ray)
    pub normal: Vec3,
    /// Index into the scene's material table
    pub material: u32,
    /// Index of the hit triangle in the scene arena, if one was hit
    pub triangle: Option<u32>,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl Default for HitData {
    fn default() -> Self {
        Self {
            t: 0.0,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: 0,
            triangle: None,
            front_face: false,
        }
    }
}

impl HitData {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// A sphere primitive.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: u32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: u32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Solve |O + tD - C|^2 = r^2 for the nearest root inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitData) -> bool {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        // Nearest root first; a tangent hit is the double root
        let sqrtd = discriminant.sqrt();
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.point = ray.at(root);
        let outward_normal = (rec.point - self.center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        rec.material = self.material;
        rec.triangle = None;
        true
    }
}

/// An axis-aligned quad: one fixed coordinate, a 2D extent in the others.
#[derive(Debug, Clone, Copy)]
pub struct AaQuad {
    /// Index of the fixed coordinate axis (0=X, 1=Y, 2=Z)
    axis: usize,
    /// Plane offset along the fixed axis
    k: f32,
    /// Extent along axis (axis+1)%3
    u_range: Interval,
    /// Extent along axis (axis+2)%3
    v_range: Interval,
    pub material: u32,
}

impl AaQuad {
    /// Create a quad in the plane `coord[axis] == k`.
    pub fn new(axis: usize, k: f32, u_range: Interval, v_range: Interval, material: u32) -> Self {
        Self {
            axis: axis % 3,
            k,
            u_range,
            v_range,
            material,
        }
    }

    /// Outward normal of the supporting plane (positive axis direction).
    pub fn plane_normal(&self) -> Vec3 {
        match self.axis {
            0 => Vec3::X,
            1 => Vec3::Y,
            _ => Vec3::Z,
        }
    }

    /// Intersect with the supporting plane, then bound-check the
    /// remaining two coordinates.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitData) -> bool {
        // A ray parallel to the plane produces an infinite or NaN t,
        // which the interval check rejects.
        let t = (self.k - ray.origin()[self.axis]) * ray.inv_direction()[self.axis];
        if !ray_t.surrounds(t) {
            return false;
        }

        let point = ray.at(t);
        let u_axis = (self.axis + 1) % 3;
        let v_axis = (self.axis + 2) % 3;
        if !self.u_range.contains(point[u_axis]) || !self.v_range.contains(point[v_axis]) {
            return false;
        }

        rec.t = t;
        rec.point = point;
        rec.set_face_normal(ray, self.plane_normal());
        rec.material = self.material;
        rec.triangle = None;
        true
    }
}

/// An axis-aligned box, intersected as the union of its six quads.
#[derive(Debug, Clone)]
pub struct BoxShape {
    quads: [AaQuad; 6],
    pub material: u32,
}

impl BoxShape {
    /// Create a box from opposite corners.
    pub fn new(p0: Vec3, p1: Vec3, material: u32) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);
        let ranges = |axis: usize| {
            let u_axis = (axis + 1) % 3;
            let v_axis = (axis + 2) % 3;
            (
                Interval::new(min[u_axis], max[u_axis]),
                Interval::new(min[v_axis], max[v_axis]),
            )
        };

        let mut quads = [AaQuad::new(0, 0.0, Interval::EMPTY, Interval::EMPTY, material); 6];
        for axis in 0..3 {
            let (u_range, v_range) = ranges(axis);
            quads[axis * 2] = AaQuad::new(axis, min[axis], u_range, v_range, material);
            quads[axis * 2 + 1] = AaQuad::new(axis, max[axis], u_range, v_range, material);
        }

        Self { quads, material }
    }

    /// The closest quad hit wins; false if none of the six are in range.
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitData) -> bool {
        let mut hit_anything = false;
        let mut closest = ray_t.max;

        for quad in &self.quads {
            if quad.hit(ray, Interval::new(ray_t.min, closest), rec) {
                hit_anything = true;
                closest = rec.t;
            }
        }

        hit_anything
    }
}
