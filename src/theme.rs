use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};
use photochat::Role;

#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub text_on_accent: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_12: u8,
    pub photo_max_width: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0x14, 0x10, 0x13),
            surface_1: Color32::from_rgb(0x1C, 0x17, 0x1B),
            surface_2: Color32::from_rgb(0x2A, 0x22, 0x28),
            accent_primary: Color32::from_rgb(0xC0, 0x3A, 0x5E),
            accent_muted: Color32::from_rgb(0x9C, 0x2F, 0x4D),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            text_primary: Color32::from_rgb(0xF1, 0xEA, 0xEE),
            text_muted: Color32::from_rgb(0x9E, 0x92, 0x99),
            text_on_accent: Color32::from_rgb(0xFF, 0xF8, 0xFA),
            spacing_8: 8.0,
            spacing_12: 12.0,
            radius_12: 12,
            photo_max_width: 320.0,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.surface_1;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.accent_muted;
        visuals.widgets.active.bg_fill = self.accent_primary;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.hyperlink_color = self.accent_primary;
        visuals.extreme_bg_color = self.surface_0;

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(17.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(15.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    /// User bubbles use the accent color, assistant bubbles a neutral surface.
    pub fn bubble_frame(&self, role: Role) -> Frame {
        let fill = match role {
            Role::User => self.accent_muted,
            Role::Assistant => self.surface_2,
        };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::NONE)
    }

    pub fn bubble_text_color(&self, role: Role) -> Color32 {
        match role {
            Role::User => self.text_on_accent,
            Role::Assistant => self.text_primary,
        }
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_2)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, 10))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::NONE)
    }
}
