use std::path::Path;

use tracing::{info, warn};

use super::action::{Transition, UserAction};
use super::frame::{Frame, FrameLoader};
use super::session::LabelingSession;
use super::{SessionError, WidgetError};

/// Presentation side of the labeling UI.
///
/// Every refresh replaces the whole frame; hosts never receive diffs.
pub trait DisplayHost {
    fn render(&mut self, frame: Frame);
    fn show_error(&mut self, message: &str);
}

/// A labeling session bound to a display host.
///
/// The host is refreshed at start and after every transition. When a row
/// cannot be displayed the transition still stands: the error goes to the
/// host and the caller, and the user can move past the broken row.
pub struct LabelingWidget<H> {
    session: LabelingSession,
    loader: FrameLoader,
    host: H,
}

impl<H: DisplayHost> LabelingWidget<H> {
    pub fn new(session: LabelingSession, loader: FrameLoader, host: H) -> Self {
        Self {
            session,
            loader,
            host,
        }
    }

    /// Show the starting row.
    pub fn start(&mut self) -> Result<(), WidgetError> {
        self.refresh()
    }

    /// Apply a user action, then refresh the host.
    pub fn on_user_action(&mut self, action: UserAction) -> Result<Transition, WidgetError> {
        let transition = match self.session.apply(&action) {
            Ok(transition) => transition,
            Err(err) => {
                self.host.show_error(&err.to_string());
                return Err(err.into());
            }
        };
        if transition.wrapped(&action) {
            info!(
                from = transition.from,
                to = transition.to,
                "Wrapped around the manifest"
            );
        }
        self.render_current(Some(transition.clone()))?;
        Ok(transition)
    }

    /// Re-render the current row without moving.
    pub fn refresh(&mut self) -> Result<(), WidgetError> {
        self.render_current(None)
    }

    fn render_current(&mut self, transition: Option<Transition>) -> Result<(), WidgetError> {
        match self.loader.load(&self.session) {
            Ok(frame) => {
                self.host.render(frame);
                Ok(())
            }
            Err(source) => {
                let row = self.session.index();
                warn!(row, error = %source, "Failed to display row");
                self.host.show_error(&format!("Row {}: {source}", row + 1));
                Err(WidgetError::Refresh {
                    row,
                    transition,
                    source,
                })
            }
        }
    }

    /// Write the current table to `path`.
    pub fn export(&mut self, path: &Path) -> Result<(), SessionError> {
        let result = self.session.export(path);
        if let Err(err) = &result {
            self.host.show_error(&err.to_string());
        }
        result
    }

    pub fn session(&self) -> &LabelingSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
