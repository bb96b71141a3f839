//! Bottom control bar: the single primary button and the status line.
//!
//! One button carries the whole interaction; its icon, color and the
//! status caption underneath all derive from the session state.

use crate::session::{PrimaryAction, Session, SessionState};
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

pub struct ControlBar<'a> {
    session: &'a mut Session,
    theme: &'a Theme,
}

impl<'a> ControlBar<'a> {
    pub fn new(session: &'a mut Session, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let strings = self.session.locale().strings();
        let state = self.session.state();

        let (icon, color, status) = match state {
            SessionState::Idle => ("🎤", self.theme.primary, strings.status_idle),
            SessionState::Listening => ("⏹", self.theme.listening, strings.status_listening),
            SessionState::Processing => ("⏳", self.theme.text_muted, strings.status_processing),
            SessionState::Speaking => ("🔊", self.theme.primary, strings.status_speaking),
        };

        let enabled = self.session.primary_action() != PrimaryAction::Disabled;

        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_sm);

            let button = egui::Button::new(
                RichText::new(icon).size(24.0).color(egui::Color32::WHITE),
            )
            .min_size(Vec2::splat(56.0))
            .rounding(self.theme.button_rounding)
            .fill(color);

            let response = ui.add_enabled(enabled, button);

            if response.clicked() {
                self.session.trigger_primary_action();
            }

            // Pulsing ring while the microphone is open.
            if state == SessionState::Listening {
                let t = ui.ctx().input(|input| input.time);
                let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

                let painter = ui.painter();
                let center = response.rect.center();
                let radius = response.rect.width() / 2.0 + 2.0 + pulse * 3.0;

                painter.circle_stroke(
                    center,
                    radius,
                    egui::Stroke::new(
                        2.0 * pulse,
                        self.theme.listening.gamma_multiply(1.0 - pulse * 0.5),
                    ),
                );

                ui.ctx().request_repaint();
            }

            ui.add_space(self.theme.spacing_sm);

            ui.label(
                RichText::new(status)
                    .size(13.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(self.theme.spacing_sm);
        });
    }
}
