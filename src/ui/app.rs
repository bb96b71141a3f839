//! Main application struct and eframe integration.

use crate::session::{Session, SessionState};
use crate::ui::components::{ControlBar, MessageList};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::path::Path;
use tracing::warn;

pub struct MazraApp {
    session: Session,
    theme: Theme,
}

impl MazraApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self { session, theme }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let strings = self.session.locale().strings();
        let title = strings.app_title;
        let toggle_label = strings.toggle_label;
        let camera_hint = strings.camera_hint;

        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(title)
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // Switching language mid-cycle is queued; the
                        // orchestrator applies it once idle.
                        if ui.button(toggle_label).clicked() {
                            self.session.toggle_locale();
                        }

                        // Photos arrive by dropping an image file onto
                        // the window; the icon only carries the hint.
                        ui.label(RichText::new("📷").size(16.0))
                            .on_hover_text(camera_hint);
                    });
                });
            });
    }

    fn show_error_banner(&self, ctx: &egui::Context) {
        let Some(message) = self.session.error_message() else {
            return;
        };

        TopBottomPanel::top("error_banner")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.error.gamma_multiply(0.25))
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                let layout = if self.session.locale().is_rtl() {
                    egui::Layout::right_to_left(egui::Align::Center)
                } else {
                    egui::Layout::left_to_right(egui::Align::Center)
                };
                ui.with_layout(layout, |ui| {
                    ui.label(RichText::new(message).size(13.0).color(self.theme.error));
                });
            });
    }

    fn show_control_bar(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ControlBar::new(&mut self.session, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.session, &self.theme).show(ui);
            });
    }

    /// A photo dropped onto the window becomes an analysis request.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());

        for file in dropped {
            let Some(path) = file.path else { continue };
            let Some(mime) = image_mime(&path) else {
                warn!(?path, "dropped file is not a supported image");
                continue;
            };

            match std::fs::read(&path) {
                Ok(bytes) => {
                    let uri = crate::completion::image_data_uri(mime, &bytes);
                    self.session.submit_image(uri);
                }
                Err(e) => warn!(?path, "failed to read dropped image: {}", e),
            }
        }
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}

impl eframe::App for MazraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.poll_events();
        self.handle_dropped_files(ctx);

        self.show_header(ctx);
        self.show_error_banner(ctx);
        self.show_control_bar(ctx);
        self.show_content(ctx);

        // Keep polling while a worker is active so its terminal event is
        // picked up without user input.
        if self.session.state() != SessionState::Idle {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_from_extension() {
        assert_eq!(image_mime(Path::new("leaf.jpg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("soil.JPEG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("crop.png")), Some("image/png"));
        assert_eq!(image_mime(Path::new("field.webp")), Some("image/webp"));
    }

    #[test]
    fn test_non_image_files_are_rejected() {
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("photo")), None);
        assert_eq!(image_mime(Path::new("archive.tar.gz")), None);
    }
}
