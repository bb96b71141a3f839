//! Conversation history component
//!
//! Renders the transcript as chat bubbles, plus the typing indicator
//! while a completion request is in flight.

use crate::session::{Session, SessionState};
use crate::transcript::{Speaker, Turn};
use crate::ui::theme::Theme;
use egui::{self, Align, RichText};

pub struct MessageList<'a> {
    session: &'a Session,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(session: &'a Session, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let turns = self.session.transcript().turns();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    if turns.is_empty() && self.session.state() != SessionState::Processing {
                        self.show_empty_state(ui);
                    } else {
                        for turn in turns {
                            self.show_turn(ui, turn);
                            ui.add_space(self.theme.spacing_sm);
                        }

                        if self.session.state() == SessionState::Processing {
                            self.show_typing_indicator(ui);
                        }
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        let strings = self.session.locale().strings();

        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.label(
                RichText::new(strings.empty_title)
                    .size(24.0)
                    .color(self.theme.text_primary),
            );

            ui.add_space(self.theme.spacing);

            ui.label(
                RichText::new(strings.empty_hint)
                    .size(14.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_turn(&self, ui: &mut egui::Ui, turn: &Turn) {
        let strings = self.session.locale().strings();
        let is_user = matches!(turn.speaker, Speaker::User);

        let (bubble_color, text_color, label) = if is_user {
            (self.theme.user_bubble, egui::Color32::WHITE, strings.user_label)
        } else {
            (
                self.theme.assistant_bubble,
                self.theme.text_primary,
                strings.assistant_label,
            )
        };

        // User turns on the right, assistant on the left; mirrored for
        // the right-to-left locale.
        let (user_side, assistant_side) = if self.session.locale().is_rtl() {
            (Align::LEFT, Align::RIGHT)
        } else {
            (Align::RIGHT, Align::LEFT)
        };
        let align = if is_user { user_side } else { assistant_side };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(label)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    if turn.has_image() {
                        ui.label(
                            RichText::new(format!("📷 {}", strings.image_marker))
                                .size(12.0)
                                .color(text_color.gamma_multiply(0.8)),
                        );
                        ui.add_space(2.0);
                    }

                    ui.label(RichText::new(&turn.text).color(text_color));
                });

            let time_str = turn.timestamp.format("%H:%M").to_string();
            ui.label(
                RichText::new(time_str)
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_typing_indicator(&self, ui: &mut egui::Ui) {
        let align = if self.session.locale().is_rtl() {
            Align::RIGHT
        } else {
            Align::LEFT
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            egui::Frame::none()
                .fill(self.theme.assistant_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for i in 0..3 {
                            let t = ui.ctx().input(|input| input.time);
                            let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                            ui.label(
                                RichText::new("●")
                                    .size(10.0)
                                    .color(self.theme.text_muted.gamma_multiply(alpha)),
                            );
                        }
                    });
                });
        });

        ui.ctx().request_repaint();
    }
}
