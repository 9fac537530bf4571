use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{imageops, DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use std::path::Path;

use super::codec::{load_raster, save_raster, PixelFormat, Raster};
use crate::error::{Error, Result};

/// Target size for a 2x reduction, rounding down
pub fn half_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width / 2, height / 2)
}

/// Halve both dimensions of an image with a Lanczos3 filter.
///
/// The pixel format of the input is preserved. Fails when either halved
/// dimension would be zero.
pub fn downsample_half(raster: &Raster) -> Result<Raster> {
    let (src_width, src_height) = raster.dimensions();
    let (width, height) = half_dimensions(src_width, src_height);

    if width < 1 || height < 1 {
        return Err(Error::TooSmall {
            width: src_width,
            height: src_height,
        });
    }

    let resized = match raster.format() {
        PixelFormat::L8 | PixelFormat::La8 | PixelFormat::Rgb8 | PixelFormat::Rgba8 => {
            resize_8bit(raster.image(), width, height)?
        }
        // fast_image_resize wants aligned u16/f32 buffers for these,
        // the image crate's own Lanczos3 handles them directly
        _ => raster
            .image()
            .resize_exact(width, height, imageops::FilterType::Lanczos3),
    };

    Raster::new(resized)
}

/// Read `input`, halve it and write the result to `output`.
pub fn downsample_file(input: &Path, output: &Path) -> Result<()> {
    let raster = load_raster(input)?;
    let halved = downsample_half(&raster)?;
    save_raster(&halved, output)
}

/// Resize an 8-bit image to exact dimensions with fast_image_resize
fn resize_8bit(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    let pixel_type = match img {
        DynamicImage::ImageLuma8(_) => PixelType::U8,
        DynamicImage::ImageLumaA8(_) => PixelType::U8x2,
        DynamicImage::ImageRgb8(_) => PixelType::U8x3,
        DynamicImage::ImageRgba8(_) => PixelType::U8x4,
        other => {
            return Err(Error::UnsupportedFormat(format!("{:?}", other.color())));
        }
    };

    let src_image = Image::from_vec_u8(
        img.width(),
        img.height(),
        img.as_bytes().to_vec(),
        pixel_type,
    )
    .map_err(|e| Error::Resample(e.to_string()))?;

    let mut dst_image = Image::new(width, height, pixel_type);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| Error::Resample(e.to_string()))?;

    let dst_pixels = dst_image.buffer().to_vec();
    let rebuilt = match pixel_type {
        PixelType::U8 => GrayImage::from_raw(width, height, dst_pixels).map(DynamicImage::ImageLuma8),
        PixelType::U8x2 => {
            GrayAlphaImage::from_raw(width, height, dst_pixels).map(DynamicImage::ImageLumaA8)
        }
        PixelType::U8x3 => RgbImage::from_raw(width, height, dst_pixels).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, dst_pixels).map(DynamicImage::ImageRgba8),
    };

    rebuilt.ok_or_else(|| {
        Error::Resample(format!(
            "destination buffer does not match {}x{} {:?}",
            width, height, pixel_type
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{ImageBuffer, Luma, Rgb, Rgba};

    fn create_test_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn raster(img: DynamicImage) -> Raster {
        Raster::new(img).unwrap()
    }

    #[test]
    fn test_half_dimensions() {
        assert_eq!(half_dimensions(100, 50), (50, 25));
        assert_eq!(half_dimensions(7, 5), (3, 2));
        assert_eq!(half_dimensions(1, 10), (0, 5));
    }

    #[test]
    fn test_downsample_rgb() {
        let src = raster(DynamicImage::ImageRgb8(create_test_image(101, 64)));
        let halved = downsample_half(&src).unwrap();

        assert_eq!(halved.dimensions(), (50, 32));
        assert_eq!(halved.format(), PixelFormat::Rgb8);
    }

    #[test]
    fn test_downsample_keeps_grayscale() {
        let gray = GrayImage::from_fn(9, 4, |x, _| Luma([(x * 20) as u8]));
        let halved = downsample_half(&raster(DynamicImage::ImageLuma8(gray))).unwrap();

        assert_eq!(halved.dimensions(), (4, 2));
        assert_eq!(halved.format(), PixelFormat::L8);
    }

    #[test]
    fn test_downsample_keeps_alpha() {
        let rgba = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let halved = downsample_half(&raster(DynamicImage::ImageRgba8(rgba))).unwrap();

        assert_eq!(halved.dimensions(), (4, 4));
        assert_eq!(halved.format(), PixelFormat::Rgba8);
    }

    #[test]
    fn test_downsample_16bit() {
        let wide = ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(6, 10, Luma([4000]));
        let halved = downsample_half(&raster(DynamicImage::ImageLuma16(wide))).unwrap();

        assert_eq!(halved.dimensions(), (3, 5));
        assert_eq!(halved.format(), PixelFormat::L16);
    }

    #[test]
    fn test_flat_image_stays_flat() {
        let gray = GrayImage::from_pixel(16, 16, Luma([200]));
        let halved = downsample_half(&raster(DynamicImage::ImageLuma8(gray))).unwrap();

        for pixel in halved.image().to_luma8().pixels() {
            assert!((pixel[0] as i32 - 200).abs() <= 1);
        }
    }

    #[test]
    fn test_too_small() {
        for (w, h) in [(1, 10), (10, 1), (1, 1)] {
            let src = raster(DynamicImage::ImageRgb8(create_test_image(w, h)));
            let err = downsample_half(&src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SchemaViolation);
            assert!(matches!(err, Error::TooSmall { .. }));
        }
    }

    #[test]
    fn test_downsample_file_too_small_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("thin.png");
        let output = dir.path().join("out.png");
        create_test_image(1, 8).save(&input).unwrap();

        assert!(downsample_file(&input, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_downsample_file_keeps_extension_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.bmp");
        let output = dir.path().join("scan_half.bmp");
        create_test_image(20, 12).save(&input).unwrap();

        downsample_file(&input, &output).unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (10, 6));
        assert_eq!(
            image::ImageFormat::from_path(&output).unwrap(),
            image::ImageFormat::Bmp
        );
    }
}
