//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built once per scene over the triangle arena: construction reorders
//! the arena so every leaf references a contiguous subrange. Traversal
//! descends into the child nearest the ray origin first so the running
//! closest-hit distance can prune the far child.

use crate::{
    primitive::HitData,
    triangle::{triangle_bounds, Triangle},
    Ray, LEAF_SIZE,
};
use cinder_math::{Aabb, Interval};

/// BVH node - either a branch with two children or a leaf referencing a
/// subrange of the reordered triangle arena.
///
/// Using an enum keeps traversal free of dynamic dispatch.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node referencing `[first, first + count)` of the arena.
    Leaf {
        first: usize,
        count: usize,
        bbox: Aabb,
    },
    /// Empty scene; never intersects.
    Empty,
}

impl BvhNode {
    /// Build a BVH over the triangle arena, reordering it in place.
    pub fn new(triangles: &mut [Triangle]) -> Self {
        if triangles.is_empty() {
            return BvhNode::Empty;
        }
        let node = Self::build(triangles, 0, 0);
        log::debug!(
            "built BVH over {} triangles, depth {}",
            triangles.len(),
            node.depth()
        );
        node
    }

    /// Recursive median-split construction.
    ///
    /// The split axis cycles x -> y -> z with recursion depth (passed
    /// explicitly; the builder keeps no global state). The subrange is
    /// sorted by centroid along that axis and split at the midpoint, so
    /// depth stays logarithmic even for coincident centroids.
    fn build(triangles: &mut [Triangle], first: usize, depth: usize) -> Self {
        let n = triangles.len();

        if n <= LEAF_SIZE {
            return BvhNode::Leaf {
                first,
                count: n,
                bbox: triangle_bounds(triangles),
            };
        }

        let axis = depth % 3;
        triangles.sort_unstable_by(|a, b| {
            let a_val = a.centroid()[axis];
            let b_val = b.centroid()[axis];
            a_val.partial_cmp(&b_val).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = n / 2;
        let (left_tris, right_tris) = triangles.split_at_mut(mid);
        let left = Self::build(left_tris, first, depth + 1);
        let right = Self::build(right_tris, first + mid, depth + 1);

        // Parent bounds are the exact union of the children's, so a ray
        // that misses the parent cannot hit anything inside it.
        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// Find the nearest triangle intersection in this subtree.
    ///
    /// `ray_t.max` carries the closest distance found so far; subtrees
    /// whose boxes are unreachable within it are pruned without visiting
    /// their primitives.
    pub fn hit(
        &self,
        ray: &Ray,
        triangles: &[Triangle],
        ray_t: Interval,
        rec: &mut HitData,
    ) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf { first, count, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let mut hit_anything = false;
                let mut closest = ray_t.max;

                for (offset, tri) in triangles[*first..*first + *count].iter().enumerate() {
                    let interval = Interval::new(ray_t.min, closest);
                    if tri.hit(ray, interval, rec) {
                        hit_anything = true;
                        closest = rec.t;
                        rec.triangle = Some((first + offset) as u32);
                    }
                }
                hit_anything
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                // Descend into the nearer child first so its hit can
                // shrink the interval before the far child is tested.
                let origin = ray.origin();
                let left_d2 = left.bounding_box().distance_squared(origin);
                let right_d2 = right.bounding_box().distance_squared(origin);
                let (near, far) = if left_d2 <= right_d2 {
                    (left, right)
                } else {
                    (right, left)
                };

                let hit_near = near.hit(ray, triangles, ray_t, rec);
                let far_max = if hit_near { rec.t } else { ray_t.max };
                let hit_far = far.hit(ray, triangles, Interval::new(ray_t.min, far_max), rec);

                hit_near || hit_far
            }
        }
    }

    /// Bounding box of the subtree.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Depth of the subtree (1 for a leaf).
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{T_MAX, T_MIN};
    use cinder_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn interval() -> Interval {
        Interval::new(T_MIN, T_MAX)
    }

    /// A small z-facing triangle centered at `c`.
    fn tri_at(c: Vec3) -> Triangle {
        Triangle::new(
            c + Vec3::new(-0.4, -0.4, 0.0),
            c + Vec3::new(0.4, -0.4, 0.0),
            c + Vec3::new(0.0, 0.4, 0.0),
            0,
        )
    }

    fn random_triangles(rng: &mut StdRng, n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|_| {
                let c = Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let jitter = |rng: &mut StdRng| {
                    Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    )
                };
                Triangle::new(c + jitter(rng), c + jitter(rng), c + jitter(rng), 0)
            })
            .collect()
    }

    fn brute_force(ray: &Ray, triangles: &[Triangle]) -> Option<HitData> {
        let mut rec = HitData::default();
        let mut closest = T_MAX;
        let mut any = false;
        for tri in triangles {
            if tri.hit(ray, Interval::new(T_MIN, closest), &mut rec) {
                any = true;
                closest = rec.t;
            }
        }
        any.then_some(rec)
    }

    fn assert_containment(node: &BvhNode) {
        if let BvhNode::Branch { left, right, bbox } = node {
            assert!(bbox.contains(&left.bounding_box()));
            assert!(bbox.contains(&right.bounding_box()));
            assert_containment(left);
            assert_containment(right);
        }
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(&mut []);
        assert!(matches!(bvh, BvhNode::Empty));

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut rec = HitData::default();
        assert!(!bvh.hit(&ray, &[], interval(), &mut rec));
    }

    #[test]
    fn test_bvh_leaf_threshold_exact() {
        // Exactly LEAF_SIZE triangles must stay a single leaf
        let mut tris: Vec<Triangle> =
            (0..8).map(|i| tri_at(Vec3::new(i as f32 * 2.0, 0.0, -5.0))).collect();
        let bvh = BvhNode::new(&mut tris);
        assert!(matches!(bvh, BvhNode::Leaf { count: 8, .. }));
    }

    #[test]
    fn test_bvh_leaf_threshold_split() {
        // One more than LEAF_SIZE forces one branch with two leaves
        let mut tris: Vec<Triangle> =
            (0..9).map(|i| tri_at(Vec3::new(i as f32 * 2.0, 0.0, -5.0))).collect();
        let bvh = BvhNode::new(&mut tris);

        match bvh {
            BvhNode::Branch { left, right, .. } => {
                assert!(matches!(*left, BvhNode::Leaf { count: 4, .. }));
                assert!(matches!(*right, BvhNode::Leaf { first: 4, count: 5, .. }));
            }
            _ => panic!("expected a branch over two leaves"),
        }
    }

    #[test]
    fn test_bvh_containment_invariant() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut tris = random_triangles(&mut rng, 200);
        let bvh = BvhNode::new(&mut tris);
        assert_containment(&bvh);
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut tris = random_triangles(&mut rng, 300);
        let reference = tris.clone();
        let bvh = BvhNode::new(&mut tris);

        let mut checked = 0;
        for _ in 0..500 {
            let origin = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
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

            let expected = brute_force(&ray, &reference);
            let mut rec = HitData::default();
            let hit = bvh.hit(&ray, &tris, interval(), &mut rec);

            match expected {
                Some(exp) => {
                    assert!(hit, "BVH missed a hit at t={}", exp.t);
                    assert!((rec.t - exp.t).abs() < 1e-3);
                    assert!(rec.point.abs_diff_eq(exp.point, 1e-2));
                    checked += 1;
                }
                None => assert!(!hit, "BVH found a phantom hit at t={}", rec.t),
            }
        }
        assert!(checked > 20, "too few intersecting rays to be meaningful");
    }

    #[test]
    fn test_bvh_nearest_of_stacked_triangles() {
        // Two parallel triangles along one ray; the closer one must win
        let mut tris = vec![tri_at(Vec3::new(0.0, 0.0, -8.0)), tri_at(Vec3::new(0.0, 0.0, -3.0))];
        let bvh = BvhNode::new(&mut tris);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitData::default();
        assert!(bvh.hit(&ray, &tris, interval(), &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!(rec.triangle.is_some());
    }
}
