use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::{Priority, Status};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_ROW_HOVER: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 14);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
pub const FLASH_OUTLINE: Color32 = Color32::from_rgb(239, 68, 68);
pub const ERROR_BG: Color32 = Color32::from_rgb(58, 28, 32);

pub const PROGRESS_OVERLAY: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 55);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const HEADER_HEIGHT: f32 = 80.0;
pub const HANDLE_WIDTH: f32 = 8.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 8.0; // vertical inset so bars don't touch row edges
pub const CHILD_BAR_INSET: f32 = 10.0;
pub const CHILD_BAR_OPACITY: f32 = 0.75;
pub const TOOLBAR_HEIGHT: f32 = 36.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_badge() -> FontId {
    FontId::proportional(16.0)
}

pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::Todo | Status::Other => Color32::from_rgb(128, 128, 128),
        Status::Planning => Color32::from_rgb(139, 92, 246),
        Status::InProgress => Color32::from_rgb(33, 150, 243),
        Status::Review => Color32::from_rgb(255, 193, 7),
        Status::Blocked => Color32::from_rgb(229, 57, 53),
        Status::Done => Color32::from_rgb(76, 175, 80),
        Status::Cancelled => Color32::from_rgb(96, 96, 110),
    }
}

pub fn priority_color(priority: Priority) -> Color32 {
    match priority {
        Priority::Low => TEXT_DIM,
        Priority::Medium => Color32::from_rgb(234, 179, 8),
        Priority::High => Color32::from_rgb(249, 115, 22),
        Priority::Urgent => Color32::from_rgb(239, 68, 68),
    }
}

/// `color` with its alpha scaled by `opacity`.
pub fn faded(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.extreme_bg_color = BG_DARK;
    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    // (widget state, fill, border, text)
    let states = [
        (&mut visuals.widgets.noninteractive, BG_PANEL, BORDER_SUBTLE, TEXT_SECONDARY),
        (&mut visuals.widgets.inactive, Color32::from_rgb(40, 42, 54), BORDER_SUBTLE, TEXT_PRIMARY),
        (&mut visuals.widgets.hovered, Color32::from_rgb(50, 53, 68), ACCENT, TEXT_PRIMARY),
        (&mut visuals.widgets.active, Color32::from_rgb(58, 62, 80), ACCENT, Color32::WHITE),
    ];
    for (widget, fill, border, text) in states {
        widget.bg_fill = fill;
        widget.weak_bg_fill = fill;
        widget.bg_stroke = Stroke::new(1.0, border);
        widget.fg_stroke = Stroke::new(1.0, text);
        widget.rounding = Rounding::same(4.0);
    }
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(6.0, 4.0);
        style.spacing.button_padding = egui::vec2(8.0, 3.0);
    });
}
