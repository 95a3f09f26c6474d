//! Read-only list shown instead of the chart on narrow windows.

use egui::{Color32, RichText, Ui};

use crate::model::{GanttBoard, RowKind};
use crate::ui::project_bar::duration_label;
use crate::ui::theme;

pub fn show_compact_list(board: &GanttBoard, ui: &mut Ui) {
    ui.add_space(4.0);
    ui.label(
        RichText::new("Widen the window to drag bars on the timeline.")
            .size(11.0)
            .color(theme::TEXT_DIM),
    );
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .id_salt("compact_list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let layout = board.layout();
            for row in layout.rows() {
                if let Some(group) = row.group_index.and_then(|g| layout.groups().get(g)) {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        let (dot, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot.center(), 4.0, group.color);
                        ui.label(RichText::new(&group.name).strong().size(13.0));
                        ui.label(
                            RichText::new(format!("{}% · {}", group.progress.round() as i32, duration_label(group.duration_days)))
                                .size(10.5)
                                .color(theme::TEXT_SECONDARY),
                        );
                    });
                    continue;
                }
                let Some(item) = row.item_index.and_then(|i| board.items().get(i)) else {
                    continue;
                };
                let span = board.displayed_span(item);

                let frame = egui::Frame {
                    fill: theme::BG_PANEL,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin {
                        left: if row.kind == RowKind::Child { 16.0 } else { 0.0 },
                        ..egui::Margin::ZERO
                    },
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };
                frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        let (dot, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot.center(), 3.0, item.color);
                        ui.add(egui::Label::new(RichText::new(&item.name).size(12.0).color(theme::TEXT_PRIMARY)).truncate());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.add(
                                egui::ProgressBar::new(item.progress / 100.0)
                                    .desired_width(48.0)
                                    .fill(item.color)
                                    .rounding(egui::Rounding::same(3.0)),
                            );
                            ui.label(
                                RichText::new(format!("{} → {}", span.start.format("%d/%m"), span.end.format("%d/%m")))
                                    .size(10.0)
                                    .color(theme::TEXT_SECONDARY),
                            );
                        });
                    });
                });
                ui.add_space(1.0);
            }

            if layout.rows().is_empty() {
                ui.label(RichText::new("Nothing to show").color(Color32::GRAY));
            }
        });
}
