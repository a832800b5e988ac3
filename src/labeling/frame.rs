use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::session::LabelingSession;
use crate::imaging::{self, ChannelAxis, DisplayEncoding, ImagingError, TargetDtype};

/// One-based position within the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    /// Filled fraction for a progress bar.
    pub fn fraction(self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// An encoded channel ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    /// Manifest column the channel came from.
    pub column: String,
    /// Channel index within that column's image.
    pub channel: usize,
    pub width: usize,
    pub height: usize,
    pub encoding: DisplayEncoding,
    pub bytes: Vec<u8>,
}

/// Everything the host shows for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub row: usize,
    pub images: Vec<DisplayImage>,
    pub progress: Progress,
    pub current_label: Option<String>,
    pub labeled: usize,
    /// Rows per assigned label, in label order.
    pub label_counts: BTreeMap<String, usize>,
}

impl Frame {
    /// The current row's readout with no images attached.
    pub fn without_images(session: &LabelingSession) -> Self {
        Self {
            row: session.index(),
            images: Vec::new(),
            progress: session.progress(),
            current_label: session.current_row().label.clone(),
            labeled: session.labeled_count(),
            label_counts: session.result().label_counts(),
        }
    }
}

/// Turns the session's current row into a [`Frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLoader {
    pub channel_axis: ChannelAxis,
    pub target: TargetDtype,
    pub encoding: DisplayEncoding,
}

impl FrameLoader {
    pub fn new(channel_axis: ChannelAxis, target: TargetDtype, encoding: DisplayEncoding) -> Self {
        Self {
            channel_axis,
            target,
            encoding,
        }
    }

    /// Decode every path column of the current row, split channels and encode
    /// each one. Channels are ordered by column, then by channel index.
    pub fn load(&self, session: &LabelingSession) -> Result<Frame, ImagingError> {
        let row = session.current_row();
        let columns = session.result().path_columns();
        let mut images = Vec::new();
        for (column, path) in columns.iter().zip(&row.paths) {
            let channels = imaging::load_channels(path, self.channel_axis)?;
            for (channel, plane) in channels.iter().enumerate() {
                let (height, width) = plane.dim();
                images.push(DisplayImage {
                    column: column.clone(),
                    channel,
                    width,
                    height,
                    encoding: self.encoding,
                    bytes: imaging::preprocess_channel(plane, self.target, self.encoding)?,
                });
            }
        }
        debug!(row = session.index(), images = images.len(), "Loaded frame");
        Ok(Frame {
            images,
            ..Frame::without_images(session)
        })
    }
}
