//! Turns UI events into widget actions and keeps the host status current.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::egui_app::host::EguiHost;
use crate::egui_app::state::{FrameView, StatusBarState};
use crate::egui_app::style::StatusTone;
use crate::labeling::{
    Frame, LabelingOptions, LabelingSession, LabelingWidget, Transition, UserAction, WidgetError,
};

/// Owns the labeling widget for the lifetime of the window.
pub struct LabelingController {
    widget: LabelingWidget<EguiHost>,
    grid_columns: usize,
    export_path: Option<PathBuf>,
}

impl LabelingController {
    pub fn new(session: LabelingSession, options: &LabelingOptions) -> Self {
        Self {
            widget: LabelingWidget::new(session, options.frame_loader(), EguiHost::new()),
            grid_columns: options.grid_columns.max(1),
            export_path: options.export_path.clone(),
        }
    }

    /// Show the starting row.
    pub fn start(&mut self) {
        let result = self.widget.start();
        self.settle(result);
    }

    pub fn previous(&mut self) -> Option<Transition> {
        self.dispatch(UserAction::Previous)
    }

    pub fn next(&mut self) -> Option<Transition> {
        self.dispatch(UserAction::Next)
    }

    pub fn choose_label(&mut self, label: &str) -> Option<Transition> {
        self.dispatch(UserAction::Label(label.to_string()))
    }

    /// Label by position in the vocabulary, as used by the digit hotkeys.
    pub fn choose_label_at(&mut self, index: usize) -> Option<Transition> {
        let label = self.labels().get(index)?.clone();
        self.choose_label(&label)
    }

    /// Export to the remembered path. Returns false when none is known yet.
    pub fn export(&mut self) -> bool {
        match self.export_path.clone() {
            Some(path) => {
                self.export_to(&path);
                true
            }
            None => false,
        }
    }

    /// Export to `path` and remember it for the next export.
    pub fn export_to(&mut self, path: &Path) {
        if self.widget.export(path).is_ok() {
            let session = self.widget.session();
            let message = format!(
                "Saved {} ({}/{} labeled)",
                path.display(),
                session.labeled_count(),
                session.len()
            );
            self.widget.host_mut().set_status(message, StatusTone::Info);
            self.export_path = Some(path.to_path_buf());
        }
    }

    pub fn labels(&self) -> &[String] {
        self.widget.session().labels()
    }

    pub fn view(&self) -> &FrameView {
        self.widget.host().view()
    }

    pub fn status(&self) -> &StatusBarState {
        self.widget.host().status()
    }

    pub fn grid_columns(&self) -> usize {
        self.grid_columns
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.widget.session().is_complete()
    }

    pub fn session(&self) -> &LabelingSession {
        self.widget.session()
    }

    fn dispatch(&mut self, action: UserAction) -> Option<Transition> {
        let was_complete = self.is_complete();
        match self.widget.on_user_action(action) {
            Ok(transition) => {
                if !was_complete && self.is_complete() {
                    info!(rows = self.session().len(), "Every row is labeled");
                    self.widget
                        .host_mut()
                        .set_status("Every row is labeled; export to save", StatusTone::Info);
                }
                Some(transition)
            }
            Err(WidgetError::Refresh { transition, .. }) => {
                self.show_unavailable();
                transition
            }
            Err(WidgetError::Session(_)) => None,
        }
    }

    fn settle(&mut self, result: Result<(), WidgetError>) {
        if let Err(WidgetError::Refresh { .. }) = result {
            self.show_unavailable();
        }
    }

    fn show_unavailable(&mut self) {
        let frame = Frame::without_images(self.widget.session());
        self.widget.host_mut().show_unavailable(frame);
    }
}
