//! egui renderer for the labeling window.

use eframe::egui::{
    self, Align, Color32, Frame, Key, Layout, RichText, TextureHandle, TextureOptions, Ui, Vec2,
};

use crate::egui_app::controller::LabelingController;
use crate::egui_app::style;
use crate::labeling::{LabelingOptions, LabelingSession};

/// Minimum viewport size in logical pixels.
pub const MIN_VIEWPORT_SIZE: Vec2 = Vec2::new(640.0, 480.0);
/// Longest edge of a thumbnail in logical pixels.
const THUMBNAIL_EDGE: f32 = 300.0;
/// Digit keys that pick a label by its position.
const LABEL_HOTKEYS: [Key; 9] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

/// Renders the labeling window around a [`LabelingController`].
pub struct EguiApp {
    controller: LabelingController,
    visuals_set: bool,
    textures: Vec<Option<TextureHandle>>,
    texture_generation: Option<u64>,
}

impl EguiApp {
    /// Create the app and show the starting row.
    pub fn new(session: LabelingSession, options: &LabelingOptions) -> Self {
        let mut controller = LabelingController::new(session, options);
        controller.start();
        Self {
            controller,
            visuals_set: false,
            textures: Vec::new(),
            texture_generation: None,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    /// Re-upload textures when the host has rendered a new frame.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let view = self.controller.view();
        if self.texture_generation == Some(view.generation) {
            return;
        }
        self.textures = view
            .thumbnails
            .iter()
            .enumerate()
            .map(|(index, thumb)| {
                thumb.image.clone().map(|image| {
                    ctx.load_texture(format!("thumbnail_{index}"), image, TextureOptions::LINEAR)
                })
            })
            .collect();
        self.texture_generation = Some(view.generation);
    }

    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(Key::ArrowLeft)) {
            self.controller.previous();
        }
        if ctx.input(|i| i.key_pressed(Key::ArrowRight)) {
            self.controller.next();
        }
        let pressed = ctx.input(|i| LABEL_HOTKEYS.iter().position(|key| i.key_pressed(*key)));
        if let Some(index) = pressed {
            self.controller.choose_label_at(index);
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(Key::S)) {
            self.export();
        }
    }

    fn export(&mut self) {
        if self.controller.export() {
            return;
        }
        let dialog = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("labels.csv");
        if let Some(path) = dialog.save_file() {
            self.controller.export_to(&path);
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("top_bar")
            .frame(Frame::new().fill(palette.bg_primary).inner_margin(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Mask labeling").color(Color32::WHITE));
                    ui.add_space(8.0);
                    ui.separator();
                    if let Some(path) = self.controller.export_path() {
                        ui.label(RichText::new(path.display().to_string()).color(palette.text_muted));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui
                            .button(RichText::new("Export").color(Color32::WHITE))
                            .on_hover_text("Save labels as CSV (Ctrl+S)")
                            .clicked()
                        {
                            self.export();
                        }
                    });
                });
            });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(Frame::new().fill(Color32::from_rgb(0, 0, 0)))
            .show(ctx, |ui| {
                let status = self.controller.status();
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    ui.painter().circle_filled(
                        ui.cursor().min + egui::vec2(9.0, 11.0),
                        9.0,
                        status.badge_color,
                    );
                    ui.add_space(24.0);
                    ui.label(RichText::new(&status.badge_label).color(Color32::WHITE));
                    ui.separator();
                    ui.label(RichText::new(&status.text).color(Color32::WHITE));
                });
            });
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls")
            .frame(Frame::new().fill(style::palette().bg_secondary).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("< previous").clicked() {
                        self.controller.previous();
                    }
                    if ui.button("next >").clicked() {
                        self.controller.next();
                    }
                    ui.separator();
                    self.render_label_buttons(ui);
                });
                ui.add_space(6.0);
                let view = self.controller.view();
                let progress = egui::ProgressBar::new(view.progress_fraction())
                    .text(view.progress_text());
                ui.add(progress);
                let mut counts = format!("{} labeled", view.labeled);
                if !view.label_counts.is_empty() {
                    counts.push_str(&format!(": {}", view.label_summary()));
                }
                ui.label(RichText::new(counts).color(style::palette().text_muted));
            });
    }

    fn render_label_buttons(&mut self, ui: &mut Ui) {
        let labels = self.controller.labels().to_vec();
        let current = self.controller.view().current_label.clone();
        for (index, label) in labels.iter().enumerate() {
            let mut button = egui::Button::new(RichText::new(label).color(Color32::WHITE));
            if current.as_deref() == Some(label.as_str()) {
                button = button.fill(style::current_label_fill());
            }
            let mut response = ui.add(button);
            if index < LABEL_HOTKEYS.len() {
                response = response.on_hover_text(format!("Hotkey {}", index + 1));
            }
            if response.clicked() {
                self.controller.choose_label(label);
            }
        }
    }

    fn render_grid(&mut self, ui: &mut Ui) {
        let view = self.controller.view();
        if view.thumbnails.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Nothing to show for this row").color(style::palette().text_muted));
            });
            return;
        }
        let columns = self.controller.grid_columns();
        egui::ScrollArea::vertical()
            .id_salt("thumbnail_scroll")
            .show(ui, |ui| {
                egui::Grid::new("thumbnail_grid")
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        for (index, thumb) in view.thumbnails.iter().enumerate() {
                            ui.vertical(|ui| {
                                let size = fit_thumbnail(Vec2::new(
                                    thumb.size[0] as f32,
                                    thumb.size[1] as f32,
                                ));
                                match self.textures.get(index).and_then(Option::as_ref) {
                                    Some(texture) => {
                                        let response = ui.add(
                                            egui::Image::new((texture.id(), size))
                                                .bg_fill(style::palette().bg_primary),
                                        );
                                        ui.painter().rect_stroke(
                                            response.rect,
                                            0.0,
                                            style::thumbnail_border(),
                                            egui::StrokeKind::Outside,
                                        );
                                    }
                                    None => {
                                        ui.add_sized(
                                            size,
                                            egui::Label::new(
                                                RichText::new("unavailable")
                                                    .color(style::palette().warning),
                                            ),
                                        );
                                    }
                                }
                                ui.label(
                                    RichText::new(&thumb.caption)
                                        .color(style::palette().accent_mint),
                                );
                            });
                            if (index + 1) % columns == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });
    }
}

/// Scale `size` so its longest edge is [`THUMBNAIL_EDGE`].
fn fit_thumbnail(size: Vec2) -> Vec2 {
    let longest = size.x.max(size.y);
    if longest <= 0.0 {
        return Vec2::splat(THUMBNAIL_EDGE);
    }
    size * (THUMBNAIL_EDGE / longest)
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.handle_hotkeys(ctx);
        self.sync_textures(ctx);
        self.render_top_bar(ctx);
        self.render_status(ctx);
        self.render_controls(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.render_grid(ui));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnails_scale_to_longest_edge() {
        assert_eq!(fit_thumbnail(Vec2::new(600.0, 300.0)), Vec2::new(300.0, 150.0));
        assert_eq!(fit_thumbnail(Vec2::new(10.0, 20.0)), Vec2::new(150.0, 300.0));
        assert_eq!(fit_thumbnail(Vec2::ZERO), Vec2::splat(300.0));
    }
}
