//! Umbra Core - image data shared by the renderer and its front ends.
//!
//! This crate provides:
//!
//! - **Image data**: 8-bit RGB pixels, row-major, as consumed by image textures
//! - **Texture loading**: decoding image files and caching them by path

pub mod texture;

// Re-export commonly used types
pub use texture::{ImageData, TextureCache, TextureError, TextureResult};
