use image::{DynamicImage, ImageBuffer, Luma, Primitive};
use std::collections::BTreeSet;
use std::path::Path;

use super::codec::{load_raster, save_raster, Raster};
use crate::error::{Error, Result};

/// Values a binary mask may contain before remapping
pub const ALLOWED_MASK_VALUES: [u16; 2] = [0, 255];

/// Foreground value in the source mask
pub const FOREGROUND_IN: u16 = 255;

/// Foreground value written to the label
pub const FOREGROUND_OUT: u16 = 1;

/// Sorted set of distinct values in a single-channel image
pub fn distinct_values(raster: &Raster) -> Result<BTreeSet<u16>> {
    match raster.image() {
        DynamicImage::ImageLuma8(buf) => {
            let mut seen = [false; 256];
            for pixel in buf.pixels() {
                seen[pixel[0] as usize] = true;
            }
            Ok((0u16..256).filter(|v| seen[*v as usize]).collect())
        }
        DynamicImage::ImageLuma16(buf) => Ok(buf.pixels().map(|p| p[0]).collect()),
        _ => Err(Error::BandCount {
            bands: raster.band_count(),
        }),
    }
}

/// Turn a 0/255 segmentation mask into a 0/1 label mask.
///
/// The input must have exactly one band and contain no value other than
/// 0 and 255; otherwise nothing is produced. The output keeps the input's
/// shape and pixel format.
pub fn remap_binary_mask(raster: &Raster) -> Result<Raster> {
    let bands = raster.band_count();
    if bands != 1 {
        return Err(Error::BandCount { bands });
    }

    let values = distinct_values(raster)?;
    if !values.iter().all(|v| ALLOWED_MASK_VALUES.contains(v)) {
        return Err(Error::PixelValues {
            values: values.into_iter().collect(),
        });
    }

    let remapped = match raster.image() {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(remap_foreground(buf, FOREGROUND_IN as u8, FOREGROUND_OUT as u8))
        }
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(remap_foreground(buf, FOREGROUND_IN, FOREGROUND_OUT))
        }
        _ => {
            return Err(Error::UnsupportedFormat(raster.format().to_string()));
        }
    };

    Raster::new(remapped)
}

/// Read a mask from `input`, remap it and write the label to `output`.
pub fn remap_mask_file(input: &Path, output: &Path) -> Result<()> {
    let raster = load_raster(input)?;
    let label = remap_binary_mask(&raster)?;
    save_raster(&label, output)
}

fn remap_foreground<T: Primitive>(
    buf: &ImageBuffer<Luma<T>, Vec<T>>,
    from: T,
    to: T,
) -> ImageBuffer<Luma<T>, Vec<T>> {
    let mut out = buf.clone();
    for pixel in out.pixels_mut() {
        if pixel[0] == from {
            pixel[0] = to;
        }
    }
    out
}
