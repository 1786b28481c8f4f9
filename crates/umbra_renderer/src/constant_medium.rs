//! Homogeneous participating medium (fog, smoke).

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::gen_f32;
use crate::{Color, Isotropic, Material, Texture};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Gap between the entry crossing and the search for the exit crossing.
const EXIT_SEARCH_OFFSET: f32 = 0.0001;

/// Constant-density volume filling a closed boundary shape.
///
/// A ray crossing the volume scatters at an exponentially distributed
/// distance; if that distance exceeds the path inside the boundary the ray
/// passes through untouched.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, phase_function: Arc<dyn Material>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
        }
    }

    /// Medium with an isotropic phase function of the given texture.
    pub fn with_texture(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self::new(boundary, density, Arc::new(Isotropic::new(albedo)))
    }

    pub fn with_color(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self::new(boundary, density, Arc::new(Isotropic::from_color(albedo)))
    }
}

/// Distance travelled before scattering, for a uniform draw `u` in (0, 1].
#[inline]
fn free_path(neg_inv_density: f32, u: f32) -> f32 {
    neg_inv_density * u.ln()
}

impl Hittable for ConstantMedium {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY),
            rng,
        )?;

        let inside = Interval::new(entry.t, exit.t).intersect(&ray_t);
        if inside.min >= inside.max {
            return None;
        }
        // Never scatter behind the ray origin
        let t_enter = inside.min.max(0.0);
        let t_exit = inside.max;

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - [0,1) keeps the draw in (0,1], so ln never sees zero
        let hit_distance = free_path(self.neg_inv_density, 1.0 - gen_f32(rng));

        // The path leaves the volume before scattering
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // Normal and face are meaningless inside a volume
            normal: Vec3::X,
            material: self.phase_function.as_ref(),
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}
