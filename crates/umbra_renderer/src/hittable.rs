//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::Material;
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Borrows the material of the primitive that produced it, so a record
/// never outlives the scene it was found in.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The stored normal always points against the ray; `front_face`
    /// records which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementors are immutable after construction, so a scene can be
/// traversed from many threads at once without locking.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with parameter in `ray_t`, if any.
    ///
    /// `rng` is only consumed by stochastic geometry (participating media).
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>>;

    /// Box enclosing the object over the shutter interval `[time0, time1]`.
    ///
    /// `None` only for unbounded geometry.
    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb>;
}

/// A list of hittable objects, tested by linear scan.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Hand the objects over, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl From<Vec<Arc<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Arc<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if let Some(rec) = object.hit(ray, interval, rng) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let mut iter = self.objects.iter();
        let first = iter.next()?.bounding_box(time0, time1)?;

        iter.try_fold(first, |acc, object| {
            object
                .bounding_box(time0, time1)
                .map(|b| Aabb::surrounding(&acc, &b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Unbounded stand-in used to check bounding-box propagation.
    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit<'a>(&'a self, _ray: &Ray, _ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
            None
        }

        fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
            None
        }
    }

    fn sphere_at(z: f32) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ))
    }

    #[test]
    fn test_list_returns_nearest_hit() {
        let mut list = HittableList::new();
        // Far sphere first, so the scan must narrow the interval
        list.add(sphere_at(-10.0));
        list.add(sphere_at(-3.0));
        list.add(sphere_at(-6.0));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();

        assert!((rec.t - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_bounding_box() {
        let mut list = HittableList::new();
        assert!(list.bounding_box(0.0, 1.0).is_none());

        list.add(sphere_at(-10.0));
        list.add(sphere_at(-3.0));
        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.z.min, -10.5);
        assert_eq!(bbox.z.max, -2.5);

        list.add(Arc::new(Unbounded));
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_set_face_normal() {
        let material = Lambertian::from_color(Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);

        let front = HitRecord::new(&ray, 1.0, Vec3::Z, &material, (0.0, 0.0));
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);

        let back = HitRecord::new(&ray, 1.0, -Vec3::Z, &material, (0.0, 0.0));
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
    }
}
