// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds bounding-box transformation for instanced geometry.

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 bounding-box transforms.
pub trait Mat4Ext {
    /// Bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let transformed = self.transform_point3(corner);
            result_min = result_min.min(transformed);
            result_max = result_max.max(transformed);
        }

        Aabb::from_points(result_min, result_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_transform_aabb_identity() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = Mat4::IDENTITY.transform_aabb(&aabb);

        assert!((transformed.min() - aabb.min()).length() < 0.001);
        assert!((transformed.max() - aabb.max()).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let transformed = mat.transform_aabb(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));

        assert!((transformed.min() - Vec3::splat(5.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::splat(6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_y() {
        // A unit cube at the origin turned 90 degrees about Y lands in -Z
        let mat = Mat4::from_rotation_y(PI / 2.0);
        let transformed = mat.transform_aabb(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));

        assert!((transformed.min() - Vec3::new(0.0, 0.0, -1.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::new(1.0, 1.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        // 45 degrees about Y: the footprint diagonal becomes the new extent
        let mat = Mat4::from_rotation_y(PI / 4.0);
        let transformed = mat.transform_aabb(&Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE));
        let half_diagonal = 2.0_f32.sqrt();

        assert!((transformed.x.max - half_diagonal).abs() < 0.001);
        assert!((transformed.z.min + half_diagonal).abs() < 0.001);
        assert!((transformed.y.max - 1.0).abs() < 0.001);
    }
}
