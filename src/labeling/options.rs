use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::frame::FrameLoader;
use crate::imaging::{ChannelAxis, DisplayEncoding, TargetDtype};

/// Thumbnails per grid row in the desktop UI.
pub const DEFAULT_GRID_COLUMNS: usize = 3;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid labeling options at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Grid must have at least one column")]
    ZeroGridColumns,
}

/// Settings for one labeling run, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelingOptions {
    /// Label vocabulary, one button each, in display order.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub channel_axis: ChannelAxis,
    #[serde(default)]
    pub display_target: TargetDtype,
    #[serde(default)]
    pub encoding: DisplayEncoding,
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,
    /// Default destination of the export button.
    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

impl Default for LabelingOptions {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            start_index: 0,
            channel_axis: ChannelAxis::default(),
            display_target: TargetDtype::default(),
            encoding: DisplayEncoding::default(),
            grid_columns: default_grid_columns(),
            export_path: None,
        }
    }
}

impl LabelingOptions {
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = toml::from_str(&text).map_err(|source| OptionsError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        if options.grid_columns == 0 {
            return Err(OptionsError::ZeroGridColumns);
        }
        Ok(options)
    }

    pub fn frame_loader(&self) -> FrameLoader {
        FrameLoader::new(self.channel_axis, self.display_target, self.encoding)
    }
}

fn default_grid_columns() -> usize {
    DEFAULT_GRID_COLUMNS
}
