use egui::ColorImage;
use tracing::warn;

use crate::egui_app::state::{FrameView, StatusBarState, Thumbnail};
use crate::egui_app::style::StatusTone;
use crate::labeling::{DisplayHost, DisplayImage, Frame};

/// Keeps the latest frame as decoded RGBA images for the egui renderer.
#[derive(Debug, Default)]
pub struct EguiHost {
    view: FrameView,
    status: StatusBarState,
}

impl EguiHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &FrameView {
        &self.view
    }

    pub fn status(&self) -> &StatusBarState {
        &self.status
    }

    pub fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.status = StatusBarState::new(text, tone);
    }

    /// Show a row that could not be displayed: no thumbnails, but progress and
    /// label readout follow the session. The status is left as reported.
    pub fn show_unavailable(&mut self, frame: Frame) {
        self.view = self.view_of(frame, Vec::new());
    }

    fn view_of(&self, frame: Frame, thumbnails: Vec<Thumbnail>) -> FrameView {
        FrameView {
            row: Some(frame.row),
            thumbnails,
            progress: Some(frame.progress),
            current_label: frame.current_label,
            labeled: frame.labeled,
            label_counts: frame.label_counts,
            generation: self.view.generation + 1,
        }
    }
}

impl DisplayHost for EguiHost {
    fn render(&mut self, frame: Frame) {
        let thumbnails: Vec<Thumbnail> = frame.images.iter().map(decode_thumbnail).collect();
        let failed = thumbnails.iter().filter(|thumb| thumb.image.is_none()).count();
        let label = frame.current_label.as_deref().unwrap_or("unlabeled");
        if failed > 0 {
            self.set_status(
                format!("Row {}: {failed} channel(s) could not be shown", frame.progress),
                StatusTone::Warning,
            );
        } else {
            self.set_status(
                format!("Row {} ({label})", frame.progress),
                StatusTone::Info,
            );
        }
        self.view = self.view_of(frame, thumbnails);
    }

    fn show_error(&mut self, message: &str) {
        self.set_status(message, StatusTone::Error);
    }
}

fn decode_thumbnail(image: &DisplayImage) -> Thumbnail {
    let caption = format!("{} [{}]", image.column, image.channel);
    let size = [image.width, image.height];
    let decoded = match image::load_from_memory(&image.bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(err) => {
            warn!(column = %image.column, channel = image.channel, error = %err, "Failed to decode display image");
            return Thumbnail {
                caption,
                size,
                image: None,
            };
        }
    };
    let decoded_size = [decoded.width() as usize, decoded.height() as usize];
    Thumbnail {
        caption,
        size,
        image: Some(ColorImage::from_rgba_unmultiplied(
            decoded_size,
            decoded.as_raw(),
        )),
    }
}
