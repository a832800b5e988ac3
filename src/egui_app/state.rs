//! Shared state types for the egui UI.

use std::collections::BTreeMap;

use egui::{Color32, ColorImage};

use crate::egui_app::style::{self, StatusTone};
use crate::labeling::Progress;

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub tone: StatusTone,
    pub badge_label: String,
    pub badge_color: Color32,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self::new("Waiting for the first row", StatusTone::Idle)
    }

    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
            badge_label: style::status_badge_label(tone).into(),
            badge_color: style::status_badge_color(tone),
        }
    }
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self::idle()
    }
}

/// One decoded channel ready to be uploaded as a texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Thumbnail {
    /// Shown under the image, e.g. `mask [0]`.
    pub caption: String,
    /// Channel `[width, height]`, known even when decoding failed.
    pub size: [usize; 2],
    /// `None` when the display bytes could not be decoded.
    pub image: Option<ColorImage>,
}

/// Everything the renderer needs to draw the current row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameView {
    pub row: Option<usize>,
    pub thumbnails: Vec<Thumbnail>,
    pub progress: Option<Progress>,
    pub current_label: Option<String>,
    pub labeled: usize,
    pub label_counts: BTreeMap<String, usize>,
    /// Bumped whenever the thumbnails change so textures can be re-uploaded.
    pub generation: u64,
}

impl FrameView {
    /// Text for the progress bar, `"3/10"` once a row has been shown.
    pub fn progress_text(&self) -> String {
        match self.progress {
            Some(progress) => progress.to_string(),
            None => "-".into(),
        }
    }

    pub fn progress_fraction(&self) -> f32 {
        self.progress.map(Progress::fraction).unwrap_or(0.0)
    }

    /// Per-label counts for the footer, e.g. `alive 2 | dead 1`.
    pub fn label_summary(&self) -> String {
        self.label_counts
            .iter()
            .map(|(label, count)| format!("{label} {count}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
