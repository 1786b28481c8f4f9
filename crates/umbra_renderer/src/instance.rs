//! Instancing wrappers that move a shared child into world space.
//!
//! Both wrappers transform the incoming ray into the child's local frame,
//! delegate, and map the hit back. The child is shared, so the same geometry
//! can be placed many times without duplicating it.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

/// Geometry displaced by a constant offset.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { object, offset }
    }
}

impl Hittable for Translate {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        // Direction is unchanged, so the child's normal and face flag carry over
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.object
            .bounding_box(time0, time1)
            .map(|bbox| bbox.translate(self.offset))
    }
}

/// Geometry rotated about the Y axis.
///
/// The world-space bounding box is computed once here from the child's box
/// over the unit shutter interval.
pub struct RotateY {
    object: Arc<dyn Hittable>,
    /// Local-to-world rotation
    transform: Mat4,
    /// World-to-local rotation
    inv_transform: Mat4,
    bbox: Option<Aabb>,
}

impl RotateY {
    pub fn new(object: Arc<dyn Hittable>, angle_degrees: f32) -> Self {
        let transform = Mat4::from_rotation_y(angle_degrees.to_radians());
        let inv_transform = transform.inverse();
        let bbox = object
            .bounding_box(0.0, 1.0)
            .map(|local| transform.transform_aabb(&local));

        if bbox.is_none() {
            log::warn!("RotateY wraps an unbounded object; it cannot be placed in a BVH");
        }

        Self {
            object,
            transform,
            inv_transform,
            bbox,
        }
    }
}

impl Hittable for RotateY {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(
            self.inv_transform.transform_point3(ray.origin()),
            self.inv_transform.transform_vector3(ray.direction()),
            ray.time(),
        );

        // Rotation preserves t and the sign of dot(direction, normal),
        // so only the point and normal need mapping back.
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p = self.transform.transform_point3(rec.p);
        rec.normal = self.transform.transform_vector3(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        self.bbox
    }
}
