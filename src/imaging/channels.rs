use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayD, Axis, Ix2};
use serde::{Deserialize, Serialize};

use super::{Channel, ImagingError};

/// Which axis of a 3-D image holds the channels.
///
/// `Smallest` picks the axis with the fewest entries, taking the first one on
/// ties. That guess is wrong for images with more channels than rows or
/// columns; set `Fixed` when the layout is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "AxisSetting", into = "AxisSetting")]
pub enum ChannelAxis {
    #[default]
    Smallest,
    Fixed(usize),
}

/// TOML form: `"smallest"` or an axis index.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AxisSetting {
    Index(usize),
    Name(String),
}

impl TryFrom<AxisSetting> for ChannelAxis {
    type Error = ImagingError;

    fn try_from(value: AxisSetting) -> Result<Self, Self::Error> {
        match value {
            AxisSetting::Index(axis) => Ok(Self::Fixed(axis)),
            AxisSetting::Name(name) => name.parse(),
        }
    }
}

impl From<ChannelAxis> for AxisSetting {
    fn from(value: ChannelAxis) -> Self {
        match value {
            ChannelAxis::Smallest => Self::Name("smallest".to_string()),
            ChannelAxis::Fixed(axis) => Self::Index(axis),
        }
    }
}

impl FromStr for ChannelAxis {
    type Err = ImagingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("smallest") {
            return Ok(Self::Smallest);
        }
        trimmed
            .parse::<usize>()
            .map(Self::Fixed)
            .map_err(|_| ImagingError::UnknownChannelAxis(value.to_string()))
    }
}

impl fmt::Display for ChannelAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smallest => f.write_str("smallest"),
            Self::Fixed(axis) => write!(f, "{axis}"),
        }
    }
}

impl ChannelAxis {
    /// Resolve the axis index for an image of the given shape.
    pub fn resolve(self, shape: &[usize]) -> Result<usize, ImagingError> {
        match self {
            Self::Smallest => shape
                .iter()
                .enumerate()
                .min_by_key(|(_, extent)| **extent)
                .map(|(axis, _)| axis)
                .ok_or(ImagingError::UnsupportedShape {
                    shape: shape.to_vec(),
                }),
            Self::Fixed(axis) if axis < shape.len() => Ok(axis),
            Self::Fixed(axis) => Err(ImagingError::AxisOutOfRange {
                axis,
                ndim: shape.len(),
            }),
        }
    }
}

/// Split a decoded image into 2-D channels.
///
/// 2-D images are a single channel. 3-D images yield one channel per index
/// along the resolved channel axis, in axis order.
pub fn split_channels(image: ArrayD<f64>, axis: ChannelAxis) -> Result<Vec<Channel>, ImagingError> {
    match image.ndim() {
        2 => Ok(vec![image.into_dimensionality::<Ix2>()?]),
        3 => {
            let channel_axis = axis.resolve(image.shape())?;
            image
                .axis_iter(Axis(channel_axis))
                .map(|plane| -> Result<Channel, ImagingError> {
                    Ok(plane.into_dimensionality::<Ix2>()?.to_owned())
                })
                .collect()
        }
        _ => Err(ImagingError::UnsupportedShape {
            shape: image.shape().to_vec(),
        }),
    }
}
