use image::{DynamicImage, ImageFormat, ImageReader};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Pixel layout of a decoded image.
///
/// Carried next to the pixel buffer so transforms can check band count and
/// depth up front instead of matching on the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    L8,
    La8,
    Rgb8,
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl PixelFormat {
    pub fn of(image: &DynamicImage) -> Result<Self> {
        let format = match image {
            DynamicImage::ImageLuma8(_) => PixelFormat::L8,
            DynamicImage::ImageLumaA8(_) => PixelFormat::La8,
            DynamicImage::ImageRgb8(_) => PixelFormat::Rgb8,
            DynamicImage::ImageRgba8(_) => PixelFormat::Rgba8,
            DynamicImage::ImageLuma16(_) => PixelFormat::L16,
            DynamicImage::ImageLumaA16(_) => PixelFormat::La16,
            DynamicImage::ImageRgb16(_) => PixelFormat::Rgb16,
            DynamicImage::ImageRgba16(_) => PixelFormat::Rgba16,
            DynamicImage::ImageRgb32F(_) => PixelFormat::Rgb32F,
            DynamicImage::ImageRgba32F(_) => PixelFormat::Rgba32F,
            other => return Err(Error::UnsupportedFormat(format!("{:?}", other.color()))),
        };
        Ok(format)
    }

    /// Number of channels per pixel
    pub fn band_count(self) -> u8 {
        match self {
            PixelFormat::L8 | PixelFormat::L16 => 1,
            PixelFormat::La8 | PixelFormat::La16 => 2,
            PixelFormat::Rgb8 | PixelFormat::Rgb16 | PixelFormat::Rgb32F => 3,
            PixelFormat::Rgba8 | PixelFormat::Rgba16 | PixelFormat::Rgba32F => 4,
        }
    }

    pub fn bits_per_band(self) -> u8 {
        match self {
            PixelFormat::L8 | PixelFormat::La8 | PixelFormat::Rgb8 | PixelFormat::Rgba8 => 8,
            PixelFormat::L16 | PixelFormat::La16 | PixelFormat::Rgb16 | PixelFormat::Rgba16 => 16,
            PixelFormat::Rgb32F | PixelFormat::Rgba32F => 32,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} ({} band(s) of {} bits)",
            self,
            self.band_count(),
            self.bits_per_band()
        )
    }
}

/// A decoded image tagged with its pixel format
#[derive(Debug, Clone)]
pub struct Raster {
    format: PixelFormat,
    image: DynamicImage,
}

impl Raster {
    pub fn new(image: DynamicImage) -> Result<Self> {
        let format = PixelFormat::of(&image)?;
        Ok(Self { format, image })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn band_count(&self) -> u8 {
        self.format.band_count()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Open and decode an image file.
///
/// The container format is sniffed from the file content first and falls
/// back to the extension, so a PNG saved as `.jpg` still decodes.
pub fn load_raster(path: &Path) -> Result<Raster> {
    let reader = ImageReader::open(path)
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let image = reader.decode().map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    Raster::new(image)
}

/// Encode a raster to `path`, inferring the format from its extension.
pub fn save_raster(raster: &Raster, path: &Path) -> Result<()> {
    raster.image.save(path).map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a raster to `path` in an explicit format.
pub fn save_raster_as(raster: &Raster, path: &Path, format: ImageFormat) -> Result<()> {
    raster
        .image
        .save_with_format(path, format)
        .map_err(|source| Error::ImageSave {
            path: path.to_path_buf(),
            source,
        })
}
