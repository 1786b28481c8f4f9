//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    AaRect, Material,
};
use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// A closed axis-aligned box between two corners.
pub struct BoxShape {
    bbox: Aabb,
    sides: HittableList,
}

impl BoxShape {
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let (lo, hi) = (p0.min(p1), p0.max(p1));
        let mut sides = HittableList::new();

        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, lo.z, material.clone())));
        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, hi.z, material.clone())));

        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, lo.x, material.clone())));
        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, hi.x, material.clone())));

        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, lo.y, material.clone())));
        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, hi.y, material)));

        Self {
            bbox: Aabb::from_points(lo, hi),
            sides,
        }
    }
}

impl Hittable for BoxShape {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_box() -> BoxShape {
        BoxShape::new(
            Vec3::ZERO,
            Vec3::ONE,
            Arc::new(Lambertian::from_color(Vec3::splat(0.73))),
        )
    }

    #[test]
    fn test_box_has_six_sides() {
        assert_eq!(unit_box().sides.len(), 6);
    }

    #[test]
    fn test_box_hit_from_each_axis() {
        let cube = unit_box();
        let mut rng = StdRng::seed_from_u64(0);
        let interval = Interval::new(0.001, f32::INFINITY);

        let cases = [
            (Vec3::new(-2.0, 0.5, 0.5), Vec3::X, -Vec3::X),
            (Vec3::new(0.5, 3.0, 0.5), -Vec3::Y, Vec3::Y),
            (Vec3::new(0.5, 0.5, -1.0), Vec3::Z, -Vec3::Z),
        ];

        for (origin, dir, expected_normal) in cases {
            let rec = cube.hit(&Ray::new(origin, dir, 0.0), interval, &mut rng).unwrap();
            assert_eq!(rec.normal, expected_normal);
        }
    }

    #[test]
    fn test_box_nearest_face_wins() {
        let cube = unit_box();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z, 0.0);

        let rec = cube.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_bounding_box_is_corner_pair() {
        let cube = BoxShape::new(
            Vec3::new(3.0, 2.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Arc::new(Lambertian::from_color(Vec3::ONE)),
        );
        let bbox = cube.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bbox.max(), Vec3::new(3.0, 2.0, 1.0));
    }
}
