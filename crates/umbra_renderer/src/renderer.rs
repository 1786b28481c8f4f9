//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard depth cutoff
//! - Anti-aliasing via jittered multi-sampling
//! - Bucketed parallel rendering with reproducible per-bucket streams

use std::time::Instant;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::sampling::gen_f32;
use crate::{Camera, Color, Hittable, RAY_EPSILON};
use log::{info, warn};
use rand::RngCore;
use rayon::prelude::*;
use umbra_math::{Interval, Ray};

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Base seed; each bucket derives its own stream from it
    pub seed: u64,
    /// Edge length of the square render buckets, in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Compute the color seen by a ray.
///
/// Paths end at the depth cutoff, at a miss (returning `background`) or when
/// the surface absorbs the ray. Malformed rays contribute black.
pub fn ray_color(
    ray: &Ray,
    background: Color,
    world: &dyn Hittable,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    if !ray.is_well_formed() {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(RAY_EPSILON, f32::INFINITY), rng) else {
        return background;
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, background, world, depth - 1, rng);
            emission + result.attenuation * scattered_color
        }
        None => emission,
    }
}

/// Averaged radiance for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelEstimate {
    /// Mean linear radiance over all samples
    pub color: Color,
    /// Samples discarded as black because they were not finite
    pub dropped_samples: u32,
}

/// Render a single pixel with multi-sampling.
///
/// `x` runs left to right and `y` top to bottom in image space.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> PixelEstimate {
    if config.samples_per_pixel == 0 {
        return PixelEstimate {
            color: Color::ZERO,
            dropped_samples: 0,
        };
    }

    let u_span = camera.image_width.saturating_sub(1).max(1) as f32;
    let v_span = camera.image_height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    let mut dropped_samples = 0;

    for _ in 0..config.samples_per_pixel {
        let u = (x as f32 + gen_f32(rng)) / u_span;
        let v = 1.0 - (y as f32 + gen_f32(rng)) / v_span;
        let ray = camera.get_ray(u, v, rng);
        let sample = ray_color(&ray, config.background, world, config.max_depth, rng);

        if sample.is_finite() {
            pixel_color += sample;
        } else {
            dropped_samples += 1;
        }
    }

    PixelEstimate {
        color: pixel_color / config.samples_per_pixel as f32,
        dropped_samples,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Linear radiance image, row-major from the top-left pixel.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Gamma-corrected RGB bytes, three per pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb8(*c)).collect()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Render the entire scene to an image buffer.
///
/// Buckets are traced in parallel. Each one seeds its own generator from
/// `config.seed`, so the result does not depend on thread scheduling.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> ImageBuffer {
    let width = camera.image_width;
    let height = camera.image_height;
    let buckets = generate_buckets(width, height, config.bucket_size);

    info!(
        "Rendering {}x{} at {} spp, depth {} ({} buckets)",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, world, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    let mut dropped_samples: u64 = 0;
    for result in &results {
        image.write_bucket(result);
        dropped_samples += u64::from(result.dropped_samples);
    }

    if dropped_samples > 0 {
        warn!("Dropped {} non-finite samples", dropped_samples);
    }
    info!("Render finished in {:.2?}", start.elapsed());

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HitRecord;
    use crate::sampling::{gen_range_f32, random_unit_vector, random_vec3};
    use crate::{
        BvhNode, Dielectric, HittableList, Lambertian, Material, Metal, ScatterResult, Sphere, Vec3,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn single_sphere_world() -> HittableList {
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray())));
        world
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, 4.0, -1.0)), [128, 255, 0]);
        assert_eq!(color_to_rgb8(Color::new(f32::NAN, 0.0, 0.0))[0], 0);
    }

    #[test]
    fn test_depth_exhausted_is_black() {
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);

        assert_eq!(ray_color(&ray, Color::ONE, &world, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_degenerate_ray_is_black() {
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(0);

        let nan_dir = Ray::new(Vec3::ZERO, Vec3::new(f32::NAN, 0.0, -1.0), 0.0);
        let zero_dir = Ray::new(Vec3::ZERO, Vec3::ZERO, 0.0);
        let inf_origin = Ray::new(Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::Z, 0.0);

        for ray in [nan_dir, zero_dir, inf_origin] {
            assert_eq!(ray_color(&ray, Color::ONE, &world, 10, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(0);
        let background = Color::new(0.2, 0.3, 0.4);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);

        assert_eq!(ray_color(&ray, background, &world, 10, &mut rng), background);
    }

    #[test]
    fn test_ground_sphere_is_attenuated() {
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, gray())));
        let background = Color::new(0.7, 0.8, 1.0);
        let mut rng = StdRng::seed_from_u64(9);

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);
        let color = ray_color(&ray, background, &world, 50, &mut rng);

        assert!(color.cmpgt(Color::ZERO).all(), "black: {color:?}");
        assert!(color.cmplt(Color::ONE).all(), "white: {color:?}");
        assert!(color.cmplt(background).all());
    }

    #[test]
    fn test_energy_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();
        for i in 0..30 {
            let material: Arc<dyn Material> = match i % 3 {
                0 => Arc::new(Lambertian::from_color(random_vec3(&mut rng, 0.0, 1.0))),
                1 => Arc::new(Metal::new(random_vec3(&mut rng, 0.0, 1.0), gen_f32(&mut rng))),
                _ => Arc::new(Dielectric::new(1.5)),
            };
            let center = random_vec3(&mut rng, -5.0, 5.0);
            let radius = gen_range_f32(&mut rng, 0.2, 1.5);
            objects.push(Arc::new(Sphere::new(center, radius, material)));
        }
        let world = BvhNode::new(objects, 0.0, 1.0, &mut rng).unwrap();

        for _ in 0..500 {
            let origin = random_vec3(&mut rng, -8.0, 8.0);
            let ray = Ray::new(origin, random_unit_vector(&mut rng), 0.0);
            let color = ray_color(&ray, Color::ONE, &world, 20, &mut rng);

            assert!(color.is_finite());
            assert!(color.cmpge(Color::ZERO).all());
            assert!(color.cmple(Color::splat(1.0 + 1e-4)).all(), "gained energy: {color:?}");
        }
    }

    #[test]
    fn test_render_pixel() {
        let world = single_sphere_world();

        let mut camera = Camera::new().with_resolution(11, 11);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::new(0.5, 0.7, 1.0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel hits the sphere
        let estimate = render_pixel(&camera, &world, 5, 5, &config, &mut rng);
        assert!(estimate.color.length() > 0.0);
        assert!(estimate.color.cmplt(config.background).all());
        assert_eq!(estimate.dropped_samples, 0);

        // Corner pixel misses it
        let corner = render_pixel(&camera, &world, 0, 0, &config, &mut rng);
        assert!((corner.color - config.background).length() < 1e-5);
    }

    struct Poison;

    impl Material for Poison {
        fn scatter(&self, _: &Ray, _: &HitRecord, _: &mut dyn RngCore) -> Option<ScatterResult> {
            None
        }

        fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
            Color::splat(f32::NAN)
        }
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Arc::new(Poison))));

        let mut camera = Camera::new().with_resolution(11, 11);
        camera.initialize();
        let config = RenderConfig {
            samples_per_pixel: 8,
            max_depth: 5,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let estimate = render_pixel(&camera, &world, 5, 5, &config, &mut rng);
        assert_eq!(estimate.color, Color::ZERO);
        assert_eq!(estimate.dropped_samples, 8);
    }

    #[test]
    fn test_render_is_reproducible() {
        let world = single_sphere_world();
        let mut camera = Camera::new().with_resolution(20, 12);
        camera.initialize();
        let config = RenderConfig {
            samples_per_pixel: 2,
            max_depth: 4,
            background: Color::new(0.5, 0.7, 1.0),
            seed: 7,
            bucket_size: 8,
        };

        let first = render(&camera, &world, &config);
        let second = render(&camera, &world, &config);

        assert_eq!(first.width, 20);
        assert_eq!(first.height, 12);
        assert_eq!(first.pixels, second.pixels);
        assert_eq!(first.to_rgb8().len(), 20 * 12 * 3);
    }

    #[test]
    fn test_image_buffer_write_bucket() {
        let mut image = ImageBuffer::new(4, 4);
        let bucket = crate::Bucket::new(2, 1, 2, 2, 0, (1, 0));
        let pixels = vec![Color::X, Color::Y, Color::Z, Color::ONE];
        image.write_bucket(&BucketResult::new(bucket, pixels, 0));

        assert_eq!(image.get(2, 1), Color::X);
        assert_eq!(image.get(3, 1), Color::Y);
        assert_eq!(image.get(2, 2), Color::Z);
        assert_eq!(image.get(3, 2), Color::ONE);
        assert_eq!(image.get(0, 0), Color::ZERO);
    }
}
