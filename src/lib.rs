//! Library exports for the labeling binaries and integration tests.
/// Per-user application directories.
pub mod app_dirs;
/// Raw/mask pairing and manifest sampling.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Image decoding, channel splitting and display preprocessing.
pub mod imaging;
/// Labeling session, frame loading and display host seam.
pub mod labeling;
/// Tracing setup for the binaries.
pub mod logging;
/// Manifest CSV model.
pub mod manifest;
