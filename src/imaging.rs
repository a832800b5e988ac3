//! Image decoding and display preprocessing.
//!
//! Images are decoded into `f64` arrays, split into 2-D channels, min-max
//! normalized per channel and re-encoded for display.

pub mod channels;
pub mod decode;
pub mod encode;
pub mod normalize;

use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

pub use channels::{ChannelAxis, split_channels};
pub use decode::decode_image;
pub use encode::{DisplayEncoding, encode_image};
pub use normalize::{NormalizedImage, TargetDtype, normalize_image};

/// One 2-D intensity plane of a decoded image.
pub type Channel = Array2<f64>;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to decode TIFF {path}: {source}")]
    Tiff {
        path: PathBuf,
        source: tiff::TiffError,
    },
    #[error("Unsupported sample format in TIFF {0}")]
    TiffSampleFormat(PathBuf),
    #[error("Unsupported image shape {shape:?}; expected 2 or 3 dimensions")]
    UnsupportedShape { shape: Vec<usize> },
    #[error("Channel axis {axis} is out of range for a {ndim}-dimensional image")]
    AxisOutOfRange { axis: usize, ndim: usize },
    #[error(
        "Unsupported normalization target `{0}`; expected one of uint8, uint16, float32, float64"
    )]
    UnsupportedTarget(String),
    #[error("Unknown channel axis `{0}`; expected `smallest` or an axis index")]
    UnknownChannelAxis(String),
    #[error("Unknown display encoding `{0}`; expected `jpeg` or `png`")]
    UnknownEncoding(String),
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Invalid image array shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Decode an image file and split it into channels.
pub fn load_channels(path: &Path, axis: ChannelAxis) -> Result<Vec<Channel>, ImagingError> {
    split_channels(decode_image(path)?, axis)
}

/// Normalize one channel onto `target` and encode it for display.
pub fn preprocess_channel(
    channel: &Channel,
    target: TargetDtype,
    encoding: DisplayEncoding,
) -> Result<Vec<u8>, ImagingError> {
    encode_image(&normalize_image(channel, target), encoding)
}
