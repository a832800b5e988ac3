//! egui desktop host for the labeling widget.

/// Controller driving the labeling widget from UI events.
pub mod controller;
/// [`DisplayHost`](crate::labeling::DisplayHost) implementation backed by egui textures.
pub mod host;
/// Plain view state consumed by the renderer.
pub mod state;
/// Palette and status badge colors.
pub mod style;
/// eframe application and layout.
pub mod ui;
