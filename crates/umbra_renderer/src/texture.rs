//! Textures map surface coordinates and points to colors.

use std::path::Path;
use std::sync::Arc;

use crate::{Color, Perlin};
use rand::RngCore;
use umbra_core::ImageData;
use umbra_math::{Interval, Vec3};

/// Spatial frequency of the checker pattern.
const CHECKER_FREQUENCY: f32 = 10.0;

/// Octaves summed by the marble turbulence.
const TURBULENCE_DEPTH: u32 = 7;

/// Color returned by image textures with no pixel data.
const MISSING_IMAGE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A single constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3-D checker pattern alternating between two textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self { even, odd }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let sines = (CHECKER_FREQUENCY * p.x).sin()
            * (CHECKER_FREQUENCY * p.y).sin()
            * (CHECKER_FREQUENCY * p.z).sin();

        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like grey pattern driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turb(self.scale * p, TURBULENCE_DEPTH);
        Color::ONE * 0.5 * (1.0 + phase.sin())
    }
}

/// Nearest-pixel lookup into decoded RGB image data.
///
/// Without image data every lookup returns solid cyan, so a missing file
/// shows up in the render instead of failing it.
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    pub fn new(image: Arc<ImageData>) -> Self {
        if image.is_empty() {
            return Self::missing();
        }
        Self { image: Some(image) }
    }

    /// Load an image file, degrading to the debug color if it can't be read.
    pub fn open(path: impl AsRef<Path>) -> Self {
        match ImageData::load(path.as_ref()) {
            Ok(image) => Self::new(Arc::new(image)),
            Err(err) => {
                log::warn!("{err}; image texture will render as cyan");
                Self::missing()
            }
        }
    }

    /// Texture standing in for an image that could not be loaded.
    pub fn missing() -> Self {
        Self { image: None }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return MISSING_IMAGE_COLOR;
        };

        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        // Flip V to image coordinates
        let v = 1.0 - unit.clamp(v);

        // ImageData::pixel clamps i == width and j == height
        let i = (u * image.width() as f32) as u32;
        let j = (v * image.height() as f32) as u32;

        let pixel = image.pixel(i, j);
        let color_scale = 1.0 / 255.0;
        Color::new(
            color_scale * pixel[0] as f32,
            color_scale * pixel[1] as f32,
            color_scale * pixel[2] as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::new(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.3, 0.9, Vec3::splat(7.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let even = Color::new(0.2, 0.3, 0.1);
        let odd = Color::splat(0.9);
        let tex = CheckerTexture::from_colors(even, odd);

        // All sines positive
        assert_eq!(tex.value(0.0, 0.0, Vec3::splat(0.05)), even);
        // One sine negative
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.05, 0.05, 0.05)), odd);
    }

    #[test]
    fn test_noise_texture_is_grey_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let tex = NoiseTexture::new(4.0, &mut rng);

        for i in 0..100 {
            let c = tex.value(0.0, 0.0, Vec3::new(i as f32 * 0.13, 1.0, i as f32 * -0.07));
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
            assert!((0.0..=1.0).contains(&c.x));
        }
    }

    #[test]
    fn test_image_texture_uv_mapping() {
        // 2x2: top row red, green; bottom row blue, white
        #[rustfmt::skip]
        let pixels = vec![
            255, 0, 0,    0, 255, 0,
            0, 0, 255,    255, 255, 255,
        ];
        let image = Arc::new(ImageData::new(2, 2, pixels).unwrap());
        let tex = ImageTexture::new(image);

        // v = 1 is the top row of the image
        assert_eq!(tex.value(0.0, 1.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.9, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.1, 0.1, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        // u = 1, v = 0 maps to index (width, height) and must clamp
        assert_eq!(tex.value(1.0, 0.0, Vec3::ZERO), Color::ONE);
        // Out-of-range coordinates clamp too
        assert_eq!(tex.value(-3.0, 5.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_image_is_cyan() {
        let tex = ImageTexture::missing();
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(0.0, 1.0, 1.0));

        let tex = ImageTexture::open("no/such/earthmap.jpg");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(0.0, 1.0, 1.0));
    }
}
