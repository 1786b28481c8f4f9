//! Perlin gradient noise.

use crate::sampling::random_vec3;
use rand::{Rng, RngCore};
use umbra_math::Vec3;

const POINT_COUNT: usize = 256;

/// Gradient noise over a 256-cell lattice with random unit gradients.
pub struct Perlin {
    rand_vecs: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let rand_vecs = (0..POINT_COUNT)
            .map(|_| loop {
                let v = random_vec3(rng, -1.0, 1.0);
                if v.length_squared() > 1e-12 {
                    break v.normalize();
                }
            })
            .collect();

        Self {
            rand_vecs,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothed noise value in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let f = p - p.floor();
        // Hermite smoothing
        let w = f * f * (Vec3::splat(3.0) - 2.0 * f);

        // Casts saturate far from the origin; the lattice index only needs
        // the low 8 bits, so wrap instead of overflowing
        let i = p.x.floor() as i32;
        let j = p.y.floor() as i32;
        let k = p.z.floor() as i32;

        let mut accum = 0.0;
        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let gradient = self.rand_vecs[self.perm_x[(i.wrapping_add(di) & 255) as usize]
                        ^ self.perm_y[(j.wrapping_add(dj) & 255) as usize]
                        ^ self.perm_z[(k.wrapping_add(dk) & 255) as usize]];

                    let (fi, fj, fk) = (di as f32, dj as f32, dk as f32);
                    let weight = Vec3::new(f.x - fi, f.y - fj, f.z - fk);
                    accum += (fi * w.x + (1.0 - fi) * (1.0 - w.x))
                        * (fj * w.y + (1.0 - fj) * (1.0 - w.y))
                        * (fk * w.z + (1.0 - fk) * (1.0 - w.z))
                        * gradient.dot(weight);
                }
            }
        }

        accum
    }

    /// Sum of `depth` octaves, each at double frequency and half weight.
    pub fn turb(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

/// Fisher-Yates shuffled identity permutation.
fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    for i in (1..POINT_COUNT).rev() {
        let target = rng.gen_range(0..=i);
        p.swap(i, target);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_perm_is_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = generate_perm(&mut rng);
        p.sort_unstable();
        assert_eq!(p, (0..POINT_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_noise_vanishes_on_lattice_points() {
        let mut rng = StdRng::seed_from_u64(4);
        let perlin = Perlin::new(&mut rng);
        assert!(perlin.noise(Vec3::new(3.0, -2.0, 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_is_bounded_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(5);
        let perlin = Perlin::new(&mut rng);

        for i in 0..500 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.05);
            let n = perlin.noise(p);
            assert!(n.abs() <= 2.0);
            assert_eq!(n, perlin.noise(p));
            assert!(perlin.turb(p, 7) >= 0.0);
        }
    }

    #[test]
    fn test_noise_far_from_origin() {
        let mut rng = StdRng::seed_from_u64(6);
        let perlin = Perlin::new(&mut rng);

        // Lattice indices saturate out here and must wrap rather than overflow
        for p in [
            Vec3::new(3.0e9, 0.5, 0.5),
            Vec3::new(-3.0e9, 0.5, -0.5),
            Vec3::splat(f32::MAX),
        ] {
            assert!(perlin.noise(p).is_finite());
        }

        // Seven octaves double an already large point
        assert!(perlin.turb(Vec3::new(2.0e7, 1.0, 1.0), 7).is_finite());
    }
}
