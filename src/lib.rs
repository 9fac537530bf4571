// Library exports shared by the downsample, remap-labels and jpg2png binaries
pub mod cli;
pub mod error;
pub mod image_processing;
pub mod utils;

// Re-export commonly used types
pub use cli::{CommonArgs, OnError};
pub use error::{Error, ErrorKind, Result};
pub use image_processing::batch::{BatchReport, ErrorPolicy, FileOutcome};
pub use image_processing::codec::{PixelFormat, Raster};
pub use image_processing::{ProcessingConfig, ProcessingEngine, RunOutcome, Utility};
