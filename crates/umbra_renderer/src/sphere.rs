//! Sphere primitives, static and moving.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let t = solve_sphere(ray, self.center, self.radius, ray_t)?;
        let outward_normal = (ray.at(t) - self.center) / self.radius;

        Some(HitRecord::new(
            ray,
            t,
            outward_normal,
            self.material.as_ref(),
            sphere_uv(outward_normal),
        ))
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}

/// A sphere whose center moves linearly from `center0` at `time0`
/// to `center1` at `time1`.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center at the given time. Times outside the keyframes extrapolate.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let t = solve_sphere(ray, center, self.radius, ray_t)?;
        let outward_normal = (ray.at(t) - center) / self.radius;

        Some(HitRecord::new(
            ray,
            t,
            outward_normal,
            self.material.as_ref(),
            sphere_uv(outward_normal),
        ))
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let c0 = self.center(time0);
        let c1 = self.center(time1);
        let box0 = Aabb::from_points(c0 - rvec, c0 + rvec);
        let box1 = Aabb::from_points(c1 - rvec, c1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

/// Smallest root of |O + tD - C|² = r² inside `ray_t`, falling back to the
/// larger root.
fn solve_sphere(ray: &Ray, center: Vec3, radius: f32, ray_t: Interval) -> Option<f32> {
    // No surface to hit, and no normal to divide out
    if radius <= 0.0 {
        return None;
    }

    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    let mut root = (h - sqrtd) / a;
    if !ray_t.contains(root) {
        root = (h + sqrtd) / a;
        if !ray_t.contains(root) {
            return None;
        }
    }

    Some(root)
}

/// UV coordinates for a point on the unit sphere.
///
/// u: angle around the Y axis from X=-1, v: angle from Y=-1 to Y=+1.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}
