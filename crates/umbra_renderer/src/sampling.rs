//! Random sampling helpers.
//!
//! Every helper draws from the caller's generator; there is no global RNG.

use rand::{Rng, RngCore};
use umbra_math::Vec3;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform float in [min, max).
#[inline]
pub fn gen_range_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Vector with each component uniform in [min, max).
pub fn random_vec3(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        gen_range_f32(rng, min, max),
        gen_range_f32(rng, min, max),
        gen_range_f32(rng, min, max),
    )
}

/// Uniform point strictly inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Point in the unit ball flipped into the hemisphere around `normal`.
pub fn random_in_hemisphere(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    let p = random_in_unit_sphere(rng);
    if p.dot(normal) > 0.0 {
        p
    } else {
        -p
    }
}

/// Uniform point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range_f32(rng, -1.0, 1.0), gen_range_f32(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// True if every component is close to zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f32 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_range_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let x = gen_range_f32(&mut rng, -3.0, 2.0);
            assert!((-3.0..2.0).contains(&x));
        }
    }

    #[test]
    fn test_unit_sphere_samples() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            assert!(random_in_unit_sphere(&mut rng).length_squared() < 1.0);
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemisphere_samples_face_normal() {
        let mut rng = StdRng::seed_from_u64(3);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        for _ in 0..1000 {
            assert!(random_in_hemisphere(&mut rng, normal).dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_unit_disk_samples() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let p = random_in_unit_disk(&mut rng);
            assert_eq!(p.z, 0.0);
            assert!(p.length_squared() < 1.0);
        }
    }

    #[test]
    fn test_near_zero() {
        assert!(near_zero(Vec3::splat(1e-9)));
        assert!(!near_zero(Vec3::new(0.0, 1e-3, 0.0)));
    }
}
