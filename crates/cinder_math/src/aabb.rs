use crate::{Interval, Ray};
use glam::Vec3;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D
/// volume. Construction keeps the invariant `min <= max` on each axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow the box to include a point.
    pub fn grow(&self, p: Vec3) -> Aabb {
        Aabb::surrounding(self, &Aabb::from_points(p, p))
    }

    /// Pad the box by `delta` on all six sides.
    ///
    /// Degenerate (planar or single-point) primitive sets still yield a
    /// non-zero-volume box, which keeps the slab test reliable.
    pub fn pad(&self, delta: f32) -> Aabb {
        Aabb {
            x: self.x.expand(delta),
            y: self.y.expand(delta),
            z: self.z.expand(delta),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method using the ray's precomputed reciprocal direction: the
    /// running [min, max] intersection of the three axis slabs must stay
    /// non-empty and overlap `ray_t`.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let origin = r.origin();
        let inv_dir = r.inv_direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = inv_dir[axis];

            let mut t0 = (slab.min - origin[axis]) * adinv;
            let mut t1 = (slab.max - origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Squared distance from a point to the nearest point of the box.
    ///
    /// Zero if the point is inside. Used to order BVH children
    /// front-to-back relative to the ray origin.
    pub fn distance_squared(&self, p: Vec3) -> f32 {
        let mut d2 = 0.0;
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let v = p[axis];
            if v < slab.min {
                d2 += (slab.min - v) * (slab.min - v);
            } else if v > slab.max {
                d2 += (v - slab.max) * (v - slab.max);
            }
        }
        d2
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.x.min <= other.x.min
            && self.x.max >= other.x.max
            && self.y.min <= other.y.min
            && self.y.max >= other.y.max
            && self.z.min <= other.z.min
            && self.z.max >= other.z.max
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(
            (self.x.min + self.x.max) * 0.5,
            (self.y.min + self.y.max) * 0.5,
            (self.z.min + self.z.max) * 0.5,
        )
    }

    /// An empty AABB (contains nothing).
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 3.0), Vec3::new(0.0, 10.0, -3.0));

        // Corners are sorted per axis
        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 3.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);
        assert!(surrounding.contains(&box1));
        assert!(surrounding.contains(&box2));
    }

    #[test]
    fn test_aabb_pad_degenerate() {
        // A planar set of points yields a zero-thickness box
        let flat = Aabb::from_points(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0))
            .grow(Vec3::new(0.5, 0.0, 0.5));
        assert_eq!(flat.y.size(), 0.0);

        let padded = flat.pad(0.05);
        assert!(padded.y.size() > 0.0);
        assert!(padded.contains(&flat));
        assert!(padded.min().cmple(padded.max()).all());
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box behind the reachable range
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 1.0)));
    }

    #[test]
    fn test_aabb_hit_axis_parallel() {
        // Ray parallel to a slab axis: reciprocal direction is infinite
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        let inside = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&inside, Interval::new(0.0, 100.0)));

        let outside = Ray::new(Vec3::new(2.0, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&outside, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_distance_squared() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        assert_eq!(aabb.distance_squared(Vec3::ZERO), 0.0);
        assert_eq!(aabb.distance_squared(Vec3::new(3.0, 0.0, 0.0)), 4.0);
        assert_eq!(aabb.distance_squared(Vec3::new(2.0, 2.0, 0.0)), 2.0);
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }
}
