use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{ImagingError, NormalizedImage};

/// Compressed format handed to the display host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayEncoding {
    #[default]
    Jpeg,
    Png,
}

impl DisplayEncoding {
    fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

impl FromStr for DisplayEncoding {
    type Err = ImagingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(ImagingError::UnknownEncoding(value.to_string())),
        }
    }
}

impl fmt::Display for DisplayEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        })
    }
}

/// Encode a normalized channel as a grayscale image.
///
/// PNG keeps 16-bit depth; JPEG is 8-bit only, so deeper data is reduced.
/// Float channels in `[0, 1]` are scaled onto the integer range first.
pub fn encode_image(image: &NormalizedImage, encoding: DisplayEncoding) -> Result<Vec<u8>, ImagingError> {
    let dynamic = match image {
        NormalizedImage::U8(array) => DynamicImage::ImageLuma8(gray8(array)),
        NormalizedImage::U16(array) => DynamicImage::ImageLuma16(gray16(array)),
        NormalizedImage::F32(array) => unit_to_dynamic(&array.mapv(f64::from), encoding),
        NormalizedImage::F64(array) => unit_to_dynamic(array, encoding),
    };
    let dynamic = match (encoding, dynamic) {
        (DisplayEncoding::Jpeg, image @ DynamicImage::ImageLuma8(_)) => image,
        (DisplayEncoding::Jpeg, other) => DynamicImage::ImageLuma8(other.to_luma8()),
        (DisplayEncoding::Png, image) => image,
    };
    let mut bytes = Vec::new();
    dynamic
        .write_to(&mut Cursor::new(&mut bytes), encoding.format())
        .map_err(ImagingError::Encode)?;
    Ok(bytes)
}

fn unit_to_dynamic(array: &Array2<f64>, encoding: DisplayEncoding) -> DynamicImage {
    match encoding {
        DisplayEncoding::Jpeg => DynamicImage::ImageLuma8(gray8(
            &array.mapv(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8),
        )),
        DisplayEncoding::Png => DynamicImage::ImageLuma16(gray16(
            &array.mapv(|v| (v * 65535.0).round().clamp(0.0, 65535.0) as u16),
        )),
    }
}

fn gray8(array: &Array2<u8>) -> GrayImage {
    let (rows, cols) = array.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([array[[y as usize, x as usize]]])
    })
}

fn gray16(array: &Array2<u16>) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    let (rows, cols) = array.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([array[[y as usize, x as usize]]])
    })
}
