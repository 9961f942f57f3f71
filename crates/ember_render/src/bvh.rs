//! Bounding volume hierarchy.
//!
//! Binary tree over shared scene objects. Each node picks a random split
//! axis, orders its objects by bounding-box minimum along it and splits at
//! the median.

use crate::error::{RenderError, RenderResult};
use crate::hittable::{hit_closest, HitRecord, Hittable, HittableList};
use ember_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Objects per leaf; larger sets are split.
const LEAF_MAX_SIZE: usize = 2;

pub enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// One or two objects tested linearly.
    Leaf {
        objects: Vec<Arc<dyn Hittable>>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Build a BVH whose boxes cover the shutter window `[time0, time1]`.
    ///
    /// Fails with [`RenderError::EmptyBvh`] when `objects` is empty.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyBvh);
        }

        let boxed = objects
            .into_iter()
            .map(|object| {
                let bbox = object.bounding_box(time0, time1);
                (object, bbox)
            })
            .collect();
        let root = Self::build(boxed, rng);

        let (branches, leaves) = root.node_counts();
        log::debug!("Built BVH: {} branches, {} leaves", branches, leaves);

        Ok(root)
    }

    /// Build from the contents of a flat list.
    pub fn from_list(
        list: HittableList,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        Self::new(list.into_objects(), time0, time1, rng)
    }

    /// Recursive construction over `(object, box)` pairs. Never called empty.
    fn build(mut objects: Vec<(Arc<dyn Hittable>, Aabb)>, rng: &mut dyn RngCore) -> Self {
        let bbox = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        if objects.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: objects.into_iter().map(|(object, _)| object).collect(),
                bbox,
            };
        }

        let axis: usize = rng.gen_range(0..3);
        objects.sort_by(|(_, a), (_, b)| {
            a.axis_interval(axis)
                .min
                .total_cmp(&b.axis_interval(axis).min)
        });

        let mid = objects.len() / 2;
        let right_objects = objects.split_off(mid);

        let left = Self::build(objects, rng);
        let right = Self::build(right_objects, rng);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// `(branches, leaves)` in this subtree.
    pub fn node_counts(&self) -> (usize, usize) {
        match self {
            BvhNode::Leaf { .. } => (0, 1),
            BvhNode::Branch { left, right, .. } => {
                let (lb, ll) = left.node_counts();
                let (rb, rl) = right.node_counts();
                (lb + rb + 1, ll + rl)
            }
        }
    }

    /// Same as [`Hittable::hit`], also adding the number of nodes whose box
    /// was tested to `visits`.
    pub fn hit_counting<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
        visits: &mut usize,
    ) -> bool {
        *visits += 1;

        match self {
            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                hit_closest(objects, ray, ray_t, rec, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit_counting(ray, ray_t, rec, rng, visits);

                // The right child only has to beat the left's hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right =
                    right.hit_counting(ray, ray_t.with_max(right_max), rec, rng, visits);

                hit_left || hit_right
            }
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut visits = 0;
        self.hit_counting(ray, ray_t, rec, rng, &mut visits)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
