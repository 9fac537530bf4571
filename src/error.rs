//! Error types for labelprep.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`Error`], used by the binaries to decide
/// between a usage failure and a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad invocation: missing input folder or nothing to process.
    Usage,
    /// A file could not be read, decoded, encoded, written or removed.
    IoFailure,
    /// The image content does not satisfy the transform's preconditions.
    SchemaViolation,
}

/// Main error type for the labelprep library.
#[derive(Error, Debug)]
pub enum Error {
    /// The input path is not an existing directory.
    #[error("input folder {} does not exist", .path.display())]
    MissingInputDir { path: PathBuf },

    /// Discovery found no file with an accepted extension.
    #[error("no {} files found in {}", .extensions.join("/"), .dir.display())]
    NoMatchingFiles {
        dir: PathBuf,
        extensions: Vec<String>,
    },

    /// Failed to open or decode an image file.
    #[error("failed to load image from {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write an image file.
    #[error("failed to save image to {}: {source}", .path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Halving would produce an empty image.
    #[error("image of {width}x{height} is too small to downsample")]
    TooSmall { width: u32, height: u32 },

    /// A label mask must have exactly one band.
    #[error("image is not single-channel, it has {bands} bands")]
    BandCount { bands: u8 },

    /// A label mask may only contain 0 and 255.
    #[error("pixel values {values:?} do not match the allowed set {{0, 255}}")]
    PixelValues { values: Vec<u16> },

    /// The decoder produced a pixel layout this crate does not handle.
    #[error("unsupported pixel layout {0}")]
    UnsupportedFormat(String),

    /// The resampler rejected the source or destination buffer.
    #[error("resampling failed: {0}")]
    Resample(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingInputDir { .. } | Error::NoMatchingFiles { .. } => ErrorKind::Usage,
            Error::ImageLoad { .. }
            | Error::ImageSave { .. }
            | Error::Io { .. }
            | Error::Resample(_) => ErrorKind::IoFailure,
            Error::TooSmall { .. }
            | Error::BandCount { .. }
            | Error::PixelValues { .. }
            | Error::UnsupportedFormat(_) => ErrorKind::SchemaViolation,
        }
    }
}

/// Result type alias for labelprep operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let usage = Error::MissingInputDir {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(usage.kind(), ErrorKind::Usage);

        let io = Error::Io {
            path: PathBuf::from("a.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.kind(), ErrorKind::IoFailure);

        assert_eq!(Error::BandCount { bands: 3 }.kind(), ErrorKind::SchemaViolation);
        assert_eq!(
            Error::TooSmall { width: 1, height: 9 }.kind(),
            ErrorKind::SchemaViolation
        );
    }

    #[test]
    fn test_messages() {
        let err = Error::PixelValues {
            values: vec![0, 128, 255],
        };
        assert_eq!(
            err.to_string(),
            "pixel values [0, 128, 255] do not match the allowed set {0, 255}"
        );

        let err = Error::NoMatchingFiles {
            dir: PathBuf::from("masks"),
            extensions: vec!["jpg".to_string(), "JPG".to_string()],
        };
        assert_eq!(err.to_string(), "no jpg/JPG files found in masks");

        assert_eq!(
            Error::BandCount { bands: 3 }.to_string(),
            "image is not single-channel, it has 3 bands"
        );
    }
}
