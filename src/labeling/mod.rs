//! Interactive labeling of manifest rows.
//!
//! [`LabelingSession`] is the pure navigation state machine over an owned
//! manifest copy. [`LabelingWidget`] pairs a session with a [`FrameLoader`]
//! and a [`DisplayHost`], refreshing the host after every transition.

pub mod action;
pub mod frame;
pub mod options;
pub mod session;
pub mod widget;

use thiserror::Error;

use crate::imaging::ImagingError;
use crate::manifest::ManifestError;

pub use action::{Transition, UserAction};
pub use frame::{DisplayImage, Frame, FrameLoader, Progress};
pub use options::{LabelingOptions, OptionsError};
pub use session::LabelingSession;
pub use widget::{DisplayHost, LabelingWidget};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot label an empty manifest")]
    EmptyManifest,
    #[error("Start index {start} is out of range for {len} rows")]
    StartOutOfRange { start: usize, len: usize },
    #[error("Label `{0}` is not in the label vocabulary")]
    UnknownLabel(String),
    #[error("Label vocabulary contains an empty label")]
    EmptyLabel,
    #[error("Label `{0}` appears more than once in the label vocabulary")]
    DuplicateLabel(String),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The transition was applied but the new row could not be displayed.
    #[error("Failed to display row {row}: {source}")]
    Refresh {
        row: usize,
        transition: Option<Transition>,
        #[source]
        source: ImagingError,
    },
}
