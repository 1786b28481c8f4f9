//! Texture image loading and caching.
//!
//! Images are decoded once into 8-bit RGB and shared behind an `Arc`, so any
//! number of image textures can sample the same pixels without copying.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Bytes per pixel of decoded image data (RGB).
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    LoadError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded RGB image, one byte per channel, row-major, top row first.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Wrap an existing RGB byte buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> TextureResult<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an image file into RGB bytes.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::LoadError {
            path: path.to_path_buf(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        Self::new(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB bytes at column `i`, row `j`. Out-of-range indices are clamped.
    pub fn pixel(&self, i: u32, j: u32) -> [u8; 3] {
        let i = i.min(self.width.saturating_sub(1)) as usize;
        let j = j.min(self.height.saturating_sub(1)) as usize;
        let idx = (j * self.width as usize + i) * BYTES_PER_PIXEL;

        match self.pixels.get(idx..idx + BYTES_PER_PIXEL) {
            Some(p) => [p[0], p[1], p[2]],
            None => [0, 0, 0],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Size of the pixel buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Cache for decoded texture images.
///
/// Images are loaded on first request and shared afterwards.
pub struct TextureCache {
    images: HashMap<PathBuf, Arc<ImageData>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
        }
    }

    /// Load an image, using the cache if it was loaded before.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureResult<Arc<ImageData>> {
        let path = path.as_ref();

        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }

        let image = Arc::new(ImageData::load(path)?);
        self.images.insert(path.to_path_buf(), image.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            image.width(),
            image.height(),
            image.size_bytes() as f32 / 1024.0
        );

        Ok(image)
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
