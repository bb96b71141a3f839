//! Visual theme shared by all components.

use egui::Color32;

pub struct Theme {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub primary: Color32,
    pub user_bubble: Color32,
    pub assistant_bubble: Color32,
    pub listening: Color32,
    pub error: Color32,
    pub spacing: f32,
    pub spacing_sm: f32,
    pub spacing_lg: f32,
    pub card_rounding: f32,
    pub bubble_rounding: f32,
    pub button_rounding: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg_primary: Color32::from_rgb(18, 22, 18),
            bg_secondary: Color32::from_rgb(28, 34, 28),
            bg_tertiary: Color32::from_rgb(40, 48, 40),
            text_primary: Color32::from_rgb(230, 235, 228),
            text_muted: Color32::from_rgb(140, 150, 140),
            primary: Color32::from_rgb(76, 175, 80),
            user_bubble: Color32::from_rgb(46, 110, 60),
            assistant_bubble: Color32::from_rgb(40, 48, 40),
            listening: Color32::from_rgb(220, 70, 70),
            error: Color32::from_rgb(200, 80, 80),
            spacing: 12.0,
            spacing_sm: 6.0,
            spacing_lg: 24.0,
            card_rounding: 8.0,
            bubble_rounding: 12.0,
            button_rounding: 28.0,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        ctx.set_visuals(visuals);
    }
}
