use std::time::Instant;

use egui::{Align2, Color32, Context, RichText, Window};
use egui_phosphor::regular as icons;

use crate::model::{GanttBoard, Notice};
use crate::ui::theme;

const ROLLBACK_NOTE: &str = "The bar was moved back to its last saved position.";

/// Toasts in the bottom-right corner plus the modal error surface.
pub fn show_notifications(ctx: &Context, board: &mut GanttBoard, now: Instant) {
    show_toasts(ctx, board, now);
    show_error_surface(ctx, board);
}

fn show_toasts(ctx: &Context, board: &mut GanttBoard, now: Instant) {
    if board.toasts().is_empty() {
        return;
    }
    let mut dismissed = None;

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, [-16.0, -40.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(360.0);
            for (i, toast) in board.toasts().iter().enumerate() {
                egui::Frame::popup(ui.style())
                    .fill(theme::ERROR_BG)
                    .stroke(egui::Stroke::new(1.0, theme::FLASH_OUTLINE))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(icons::WARNING_CIRCLE).color(theme::FLASH_OUTLINE).size(16.0));
                            ui.label(RichText::new(&toast.message).strong());
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                                if ui.add(egui::Button::new(icons::X).frame(false)).clicked() {
                                    dismissed = Some(i);
                                }
                            });
                        });
                        notice_body(ui, toast);
                        let left = toast.expires_at.saturating_duration_since(now).as_secs() + 1;
                        ui.label(RichText::new(format!("Closes in {left}s")).size(9.5).color(theme::TEXT_DIM));
                    });
                ui.add_space(6.0);
            }
        });

    if let Some(i) = dismissed {
        board.dismiss_toast(i);
    }
}

fn show_error_surface(ctx: &Context, board: &mut GanttBoard) {
    let Some(notice) = board.error_surface().cloned() else {
        return;
    };
    let mut close = ctx.input(|i| i.key_pressed(egui::Key::Enter));

    Window::new(RichText::new(format!("{} Change not saved", icons::WARNING)).strong().size(14.0))
        .id(egui::Id::new("error_surface"))
        .resizable(false)
        .collapsible(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([380.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new(&notice.message).size(13.0).color(theme::TEXT_PRIMARY));
            notice_body(ui, &notice);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                let ok = egui::Button::new(RichText::new("OK").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([90.0, 28.0], ok).clicked() {
                    close = true;
                }
            });
        });

    if close {
        board.dismiss_error_surface();
    }
}

fn notice_body(ui: &mut egui::Ui, notice: &Notice) {
    if let Some(detail) = &notice.detail {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(icons::CALENDAR).color(theme::TEXT_SECONDARY));
            ui.label(RichText::new(detail).color(theme::TEXT_SECONDARY));
        });
    }
    if let Some(suggestion) = &notice.suggestion {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(icons::LIGHTBULB).color(theme::ACCENT));
            ui.label(RichText::new(suggestion).color(theme::TEXT_SECONDARY));
        });
    }
    if notice.rolled_back {
        ui.label(RichText::new(ROLLBACK_NOTE).size(10.0).italics().color(theme::TEXT_DIM));
    }
}
