//! Min-max intensity normalization onto a target pixel type.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{Channel, ImagingError};

/// Pixel type a channel is normalized onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetDtype {
    #[default]
    U8,
    U16,
    F32,
    F64,
}

impl TargetDtype {
    /// Upper bound of the output range; the lower bound is always zero.
    pub fn max_value(self) -> f64 {
        match self {
            Self::U8 => f64::from(u8::MAX),
            Self::U16 => f64::from(u16::MAX),
            Self::F32 | Self::F64 => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl FromStr for TargetDtype {
    type Err = ImagingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uint8" | "u8" => Ok(Self::U8),
            "uint16" | "u16" => Ok(Self::U16),
            "float32" | "f32" => Ok(Self::F32),
            "float64" | "f64" => Ok(Self::F64),
            _ => Err(ImagingError::UnsupportedTarget(value.to_string())),
        }
    }
}

impl TryFrom<String> for TargetDtype {
    type Error = ImagingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetDtype> for String {
    fn from(value: TargetDtype) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for TargetDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalized channel in its target pixel type.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedImage {
    U8(Array2<u8>),
    U16(Array2<u16>),
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl NormalizedImage {
    /// `(rows, columns)` of the channel.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Self::U8(array) => array.dim(),
            Self::U16(array) => array.dim(),
            Self::F32(array) => array.dim(),
            Self::F64(array) => array.dim(),
        }
    }
}

/// Linearly map `image` so its minimum becomes 0 and its maximum becomes the
/// target type's maximum. Integer targets round to nearest.
///
/// A constant (or empty) image has no range to stretch and maps to all zeros.
pub fn normalize_image(image: &Channel, target: TargetDtype) -> NormalizedImage {
    let scaled = min_max_scale(image, target.max_value());
    match target {
        TargetDtype::U8 => NormalizedImage::U8(scaled.mapv(|v| v.round().clamp(0.0, 255.0) as u8)),
        TargetDtype::U16 => {
            NormalizedImage::U16(scaled.mapv(|v| v.round().clamp(0.0, 65535.0) as u16))
        }
        TargetDtype::F32 => NormalizedImage::F32(scaled.mapv(|v| v as f32)),
        TargetDtype::F64 => NormalizedImage::F64(scaled),
    }
}

fn min_max_scale(image: &Channel, target_max: f64) -> Array2<f64> {
    let (min, max) = image
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        return Array2::zeros(image.raw_dim());
    }
    // Divide last so exact half steps stay exact before rounding.
    image.mapv(|v| (v - min) * target_max / range)
}
