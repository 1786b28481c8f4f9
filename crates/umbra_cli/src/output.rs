//! Writing rendered images to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use umbra_renderer::{color_to_rgb8, ImageBuffer};

/// Save `image` to `path`, choosing the format from the extension.
///
/// `.ppm` writes plain-text P3; anything else goes through the `image` crate.
pub fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_ppm(image, &mut writer)?;
        writer.flush()?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
            .context("Pixel buffer does not match image dimensions")?;
        rgb.save(path)
            .with_context(|| format!("Failed to encode {}", path.display()))?;
    }

    log::info!("Wrote {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}

/// Plain-text PPM, one `r g b` triplet per line, top row first.
pub fn write_ppm(image: &ImageBuffer, out: &mut impl Write) -> Result<()> {
    writeln!(out, "P3\n{} {}\n255", image.width, image.height)?;
    for color in &image.pixels {
        let [r, g, b] = color_to_rgb8(*color);
        writeln!(out, "{} {} {}", r, g, b)?;
    }
    Ok(())
}
