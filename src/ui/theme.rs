use egui::style::{Selection, WidgetVisuals, Widgets};
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const BG_PURE_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub const BG_PANEL: Color32 = Color32::from_rgb(10, 8, 6);
pub const BG_WIDGET: Color32 = Color32::from_rgb(24, 20, 15);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(38, 31, 22);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(52, 42, 28);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(176, 170, 160);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(112, 106, 98);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(232, 226, 214);

/// Same hue as the fractal's material.
pub const ACCENT_GOLD: Color32 = Color32::from_rgb(0xaa, 0x88, 0x44);
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(46, 172, 35);
pub const ACCENT_RED: Color32 = Color32::from_rgb(172, 35, 35);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(196, 117, 35);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(90, 72, 36, 77);
pub const BORDER_ACCENT: Color32 = ACCENT_GOLD;

fn widget(bg: Color32, stroke: Stroke, fg: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: stroke,
        rounding: Rounding::same(4.0),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.widgets = Widgets {
        noninteractive: WidgetVisuals {
            weak_bg_fill: BG_PANEL,
            ..widget(BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_MUTED, 0.0)
        },
        inactive: widget(BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_PRIMARY, 0.0),
        hovered: widget(BG_WIDGET_HOVER, Stroke::new(1.0, BORDER_ACCENT), TEXT_BRIGHT, 1.0),
        active: widget(BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_GOLD), TEXT_BRIGHT, 1.0),
        open: widget(BG_WIDGET_ACTIVE, Stroke::new(1.0, BORDER_ACCENT), TEXT_BRIGHT, 0.0),
    };
    visuals.selection = Selection {
        bg_fill: ACCENT_GOLD.gamma_multiply(0.4),
        stroke: Stroke::new(1.0, ACCENT_GOLD),
    };
    visuals.warn_fg_color = ACCENT_ORANGE;
    visuals.error_fg_color = ACCENT_RED;
    visuals.faint_bg_color = BG_PANEL;
    visuals.extreme_bg_color = BG_PURE_BLACK;
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_ACCENT);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.slider_trailing_fill = true;
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(12.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
