//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of boxes over shared primitives. Each level partitions on a
//! randomly chosen axis and splits at the median, so construction stays
//! cheap and the expected depth is logarithmic.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use log::{debug, error};
use rand::{Rng, RngCore};
use thiserror::Error;
use umbra_math::{Aabb, Interval, Ray};

/// Errors raised while building a BVH.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot build a BVH over an empty scene")]
    EmptyScene,

    #[error("primitive {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

/// Interior node of the hierarchy.
///
/// Leaves are the primitives themselves. A partition holding a single
/// primitive stores it as both children.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

/// Primitive paired with its box over the build's time span.
type BuildItem = (Arc<dyn Hittable>, Aabb);

impl BvhNode {
    /// Build a BVH over `objects`, using boxes valid for `[time0, time1]`.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BuildError> {
        if objects.is_empty() {
            error!("BVH construction failed: scene is empty");
            return Err(BuildError::EmptyScene);
        }

        let mut items: Vec<BuildItem> = Vec::with_capacity(objects.len());
        for (index, object) in objects.into_iter().enumerate() {
            let Some(bbox) = object.bounding_box(time0, time1) else {
                error!("BVH construction failed: primitive {index} has no bounding box");
                return Err(BuildError::MissingBoundingBox { index });
            };
            items.push((object, bbox));
        }

        let count = items.len();
        let (root, depth) = Self::build(&mut items, rng);
        debug!("Built BVH over {} primitives (depth {})", count, depth);

        Ok(root)
    }

    /// Recursive construction. Returns the node and the depth below it.
    fn build(items: &mut [BuildItem], rng: &mut dyn RngCore) -> (Self, usize) {
        let axis = rng.gen_range(0..3usize);

        // Stable sort keeps ties in their incoming order
        items.sort_by(|a, b| {
            let a_min = a.1.axis_interval(axis).min;
            let b_min = b.1.axis_interval(axis).min;
            a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
        });

        let bbox = items[1..]
            .iter()
            .fold(items[0].1, |acc, (_, b)| Aabb::surrounding(&acc, b));

        let (left, right, depth): (Arc<dyn Hittable>, Arc<dyn Hittable>, usize) = match items.len() {
            1 => (items[0].0.clone(), items[0].0.clone(), 1),
            2 => (items[0].0.clone(), items[1].0.clone(), 1),
            n => {
                let mid = n / 2;
                let (left_items, right_items) = items.split_at_mut(mid);
                let (left, left_depth) = Self::build(left_items, rng);
                let (right, right_depth) = Self::build(right_items, rng);
                (
                    Arc::new(left),
                    Arc::new(right),
                    1 + left_depth.max(right_depth),
                )
            }
        };

        (Self { left, right, bbox }, depth)
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t, rng);

        // A single-primitive leaf is queried once; stochastic geometry
        // would otherwise draw twice
        if Arc::ptr_eq(&self.left, &self.right) {
            return hit_left;
        }

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.right.hit(ray, Interval::new(ray_t.min, right_max), rng);

        hit_right.or(hit_left)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}
