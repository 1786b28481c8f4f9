//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use crate::renderer::render_pixel;
use crate::{Camera, Color, Hittable, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
    /// Column and row of the bucket in the tile grid
    pub grid: (u32, u32),
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize, grid: (u32, u32)) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
            grid,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's random stream.
    ///
    /// Depends only on the base seed and the grid position, never on the
    /// render order or the thread that picks the bucket up.
    pub fn seed(&self, base_seed: u64) -> u64 {
        let (col, row) = self.grid;
        let position = (u64::from(row) << 32) | u64::from(col);
        base_seed ^ position.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Split a `width` x `height` image into square buckets, centre-out.
///
/// Edge buckets are cropped to the image. `index` is the position in the
/// returned render order; `grid` stays the bucket's column and row.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let cols = width.div_ceil(size);
    let rows = height.div_ceil(size);

    let mut buckets: Vec<Bucket> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col, row)))
        .map(|(col, row)| {
            let (x, y) = (col * size, row * size);
            Bucket::new(x, y, size.min(width - x), size.min(height - y), 0, (col, row))
        })
        .collect();

    // Squared distance between bucket and image centres, in half-pixel units
    buckets.sort_by_key(|b| {
        let dx = 2 * i64::from(b.x) + i64::from(b.width) - i64::from(width);
        let dy = 2 * i64::from(b.y) + i64::from(b.height) - i64::from(height);
        dx * dx + dy * dy
    });

    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }

    buckets
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket.seed(config.seed));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut dropped_samples = 0;

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let estimate = render_pixel(camera, world, global_x, global_y, config, &mut rng);
            dropped_samples += estimate.dropped_samples;
            pixels.push(estimate.color);
        }
    }

    BucketResult::new(*bucket, pixels, dropped_samples)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
    /// Non-finite samples discarded across the bucket
    pub dropped_samples: u32,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>, dropped_samples: u32) -> Self {
        Self {
            bucket,
            pixels,
            dropped_samples,
        }
    }
}
