//! Axis-aligned rectangles.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Half-thickness given to the flat axis of a rectangle's bounding box.
const PLANE_PADDING: f32 = 0.0001;

/// A rectangle lying in a plane of constant coordinate `k` along one axis.
///
/// The in-plane axes are XY (normal Z),
/// YZ (normal X), XZ (normal Y). `(a0, a1)` bounds the first in-plane axis
/// and `(b0, b1)` the second.
pub struct AaRect {
    /// Axis the rectangle is perpendicular to (0=X, 1=Y, 2=Z)
    normal_axis: usize,
    a_axis: usize,
    b_axis: usize,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
}

impl AaRect {
    /// Rectangle `[x0, x1] × [y0, y1]` at `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(2, 0, 1, (x0, x1), (y0, y1), k, material)
    }

    /// Rectangle `[y0, y1] × [z0, z1]` at `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(0, 1, 2, (y0, y1), (z0, z1), k, material)
    }

    /// Rectangle `[x0, x1] × [z0, z1]` at `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(1, 0, 2, (x0, x1), (z0, z1), k, material)
    }

    fn new(
        normal_axis: usize,
        a_axis: usize,
        b_axis: usize,
        (a0, a1): (f32, f32),
        (b0, b1): (f32, f32),
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            normal_axis,
            a_axis,
            b_axis,
            a: Interval::new(a0.min(a1), a0.max(a1)),
            b: Interval::new(b0.min(b1), b0.max(b1)),
            k,
            material,
        }
    }

    fn outward_normal(&self) -> Vec3 {
        let mut n = Vec3::ZERO;
        n[self.normal_axis] = 1.0;
        n
    }
}

impl Hittable for AaRect {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let d = ray.direction()[self.normal_axis];
        // Parallel to the plane
        if d == 0.0 {
            return None;
        }
        // Zero-area rectangles have no surface to parameterize
        if self.a.size() <= 0.0 || self.b.size() <= 0.0 {
            return None;
        }

        let t = (self.k - ray.origin()[self.normal_axis]) / d;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);
        let (pa, pb) = (p[self.a_axis], p[self.b_axis]);
        if !self.a.contains(pa) || !self.b.contains(pb) {
            return None;
        }

        let u = (pa - self.a.min) / self.a.size();
        let v = (pb - self.b.min) / self.b.size();

        let mut rec = HitRecord::new(ray, t, self.outward_normal(), self.material.as_ref(), (u, v));
        // Keep the point exactly on the plane
        rec.p[self.normal_axis] = self.k;
        Some(rec)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[self.a_axis] = self.a.min;
        hi[self.a_axis] = self.a.max;
        lo[self.b_axis] = self.b.min;
        hi[self.b_axis] = self.b.max;
        lo[self.normal_axis] = self.k - PLANE_PADDING;
        hi[self.normal_axis] = self.k + PLANE_PADDING;

        Some(Aabb::from_points(lo, hi))
    }
}
