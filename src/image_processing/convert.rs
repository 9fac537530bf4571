use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

use super::codec::{load_raster, save_raster_as};
use crate::error::{Error, Result};

/// PNG path that replaces a JPEG: same directory and stem, `.png` extension
pub fn png_path_for(jpeg_path: &Path) -> PathBuf {
    jpeg_path.with_extension("png")
}

/// Re-encode a JPEG as PNG next to it, then delete the JPEG.
///
/// The source is only removed once the PNG has been written, so a decode or
/// encode failure leaves the JPEG untouched. Returns the PNG path.
pub fn convert_jpeg_to_png(jpeg_path: &Path) -> Result<PathBuf> {
    let raster = load_raster(jpeg_path)?;
    let png_path = png_path_for(jpeg_path);

    save_raster_as(&raster, &png_path, ImageFormat::Png)?;

    fs::remove_file(jpeg_path).map_err(|source| Error::Io {
        path: jpeg_path.to_path_buf(),
        source,
    })?;

    Ok(png_path)
}
