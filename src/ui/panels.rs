use egui::{Color32, Context, RichText, Ui};

use crate::renderer::CameraMode;
use crate::ui::actions::UiActions;
use crate::ui::state::UiState;
use crate::ui::theme::*;

/// Read-only numbers the panel displays each frame.
pub struct PanelStats {
    pub fps: f32,
    pub display_level: u32,
    pub max_display_level: u32,
    pub vertices: usize,
    pub faces: usize,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rotating: bool,
    pub at_floor: bool,
    pub at_ceiling: bool,
}

pub fn draw_side_panel(ctx: &Context, state: &mut UiState, stats: &PanelStats) -> UiActions {
    let mut actions = UiActions::default();
    let enabled = !state.is_blocked();

    egui::SidePanel::right("control_panel")
        .min_width(260.0)
        .max_width(360.0)
        .default_width(280.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.heading(RichText::new("SIERPINSKI").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Tetrahedral fractal").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "LEVEL");
                ui.horizontal(|ui| {
                    let minus = egui::Button::new(RichText::new("-").color(BG_PURE_BLACK).strong())
                        .fill(if stats.at_floor { BG_WIDGET } else { ACCENT_RED })
                        .min_size(egui::vec2(40.0, 32.0));
                    if ui.add(minus).clicked() {
                        actions.decrease_level = true;
                    }

                    ui.label(
                        RichText::new(format!("{}", stats.display_level))
                            .color(TEXT_BRIGHT)
                            .size(22.0)
                            .strong(),
                    );

                    let plus = egui::Button::new(RichText::new("+").color(BG_PURE_BLACK).strong())
                        .fill(ACCENT_GREEN)
                        .min_size(egui::vec2(40.0, 32.0));
                    if ui.add_enabled(!stats.at_ceiling, plus).clicked() {
                        actions.increase_level = true;
                    }
                });
                ui.label(
                    RichText::new(format!("max {}", stats.max_display_level))
                        .color(TEXT_MUTED)
                        .size(10.0),
                );
                ui.add_space(16.0);

                section_header(ui, "ROTATION");
                let (text, color) = if stats.rotating {
                    ("Stop", ACCENT_ORANGE)
                } else {
                    ("Rotate", ACCENT_GOLD)
                };
                if ui
                    .add(
                        egui::Button::new(RichText::new(text).color(BG_PURE_BLACK))
                            .fill(color)
                            .min_size(egui::vec2(ui.available_width(), 32.0)),
                    )
                    .clicked()
                {
                    actions.toggle_rotation = true;
                }
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "VIEW");
                ui.checkbox(&mut state.wireframe, "Wireframe");
                camera_controls(ui, &mut state.camera_mode);
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                });
                ui.add_space(16.0);

                if state.show_stats {
                    stats_panel(ui, stats);
                }
            });
        });

    actions
}

/// Modal for the pending warning. Returns an action set with
/// `dismiss_warning` raised once the user acknowledges it.
pub fn draw_warning_modal(ctx: &Context, state: &UiState) -> UiActions {
    let mut actions = UiActions::default();
    let Some(message) = &state.pending_warning else {
        return actions;
    };

    egui::Area::new(egui::Id::new("warning_backdrop"))
        .order(egui::Order::Middle)
        .fixed_pos(egui::Pos2::ZERO)
        .show(ctx, |ui| {
            let screen = ctx.screen_rect();
            ui.painter()
                .rect_filled(screen, 0.0, Color32::from_black_alpha(150));
            ui.allocate_rect(screen, egui::Sense::click());
        });

    egui::Window::new("Warning")
        .order(egui::Order::Foreground)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new(message).color(TEXT_BRIGHT));
            ui.add_space(12.0);
            let ok = egui::Button::new(RichText::new("OK").color(BG_PURE_BLACK))
                .fill(ACCENT_GOLD)
                .min_size(egui::vec2(96.0, 28.0));
            if ui.add(ok).clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                actions.dismiss_warning = true;
            }
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn camera_controls(ui: &mut Ui, mode: &mut CameraMode) {
    ui.horizontal(|ui| {
        ui.label("Camera:");
        if ui.selectable_label(*mode == CameraMode::Orbital, "Orbital").clicked() {
            *mode = CameraMode::Orbital;
        }
        if ui.selectable_label(*mode == CameraMode::Free, "Free").clicked() {
            *mode = CameraMode::Free;
        }
    });
}

fn stats_panel(ui: &mut Ui, stats: &PanelStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id =
                Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 60.0 {
                ACCENT_GREEN
            } else if stats.fps >= 30.0 {
                ACCENT_ORANGE
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    stat_row(ui, "FPS", format!("{:.0}", stats.fps), fps_color);
                    stat_row(ui, "Vertices", fmt_num(stats.vertices), ACCENT_GOLD);
                    stat_row(ui, "Faces", fmt_num(stats.faces), ACCENT_GOLD);
                    stat_row(ui, "Cached", fmt_num(stats.cache_entries), TEXT_PRIMARY);
                    stat_row(ui, "Hits", stats.cache_hits.to_string(), TEXT_PRIMARY);
                    stat_row(ui, "Misses", stats.cache_misses.to_string(), TEXT_PRIMARY);
                });
        });
}

fn stat_row(ui: &mut Ui, name: &str, value: String, color: Color32) {
    ui.label(RichText::new(name).color(TEXT_MUTED));
    ui.label(RichText::new(value).color(color));
    ui.end_row();
}

pub fn draw_help_overlay(ctx: &Context, pos: [f32; 3], mode: CameraMode) {
    let hint = match mode {
        CameraMode::Orbital => "RMB+Drag - Orbit | Scroll - Zoom",
        CameraMode::Free => "WASD - Move | RMB+Drag - Look | Scroll - Speed",
    };

    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new(hint).color(TEXT_MUTED));
                    ui.label(
                        RichText::new(format!("Pos: ({:.0}, {:.0}, {:.0})", pos[0], pos[1], pos[2]))
                            .color(TEXT_MUTED),
                    );
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::fmt_num;

    #[test]
    fn large_counts_are_abbreviated() {
        assert_eq!(fmt_num(64), "64");
        assert_eq!(fmt_num(16_384), "16.4K");
        assert_eq!(fmt_num(4_194_304), "4.19M");
    }
}
