use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::app::GanttApp;
use crate::model::{DisplayMode, ViewMode};
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.set_min_height(theme::TOOLBAR_HEIGHT);

        ui.menu_button(RichText::new("  File  ").size(13.0), |ui| {
            if ui.button(format!("{}  Open schedule...", icons::FOLDER_OPEN)).clicked() {
                app.open_schedule();
                ui.close_menu();
            }
            if ui.button(format!("{}  Use sample schedule", icons::SPARKLE)).clicked() {
                app.use_sample_schedule();
                ui.close_menu();
            }
        });

        ui.separator();

        for mode in ViewMode::ALL {
            if ui.selectable_label(app.board.view_mode() == mode, mode.label()).clicked() {
                app.set_view_mode(mode);
            }
        }

        ui.separator();

        for (mode, label) in [(DisplayMode::Tasks, "Tasks"), (DisplayMode::Projects, "Projects")] {
            if ui.selectable_label(app.board.display_mode() == mode, label).clicked() {
                app.set_display_mode(mode);
            }
        }

        ui.separator();

        if ui
            .button(format!("{}  Refresh", icons::ARROWS_CLOCKWISE))
            .on_hover_text("Reload tasks and projects")
            .clicked()
        {
            app.refresh();
        }
        if ui.button(format!("{}  Today", icons::CALENDAR)).clicked() {
            app.go_to_today();
        }

        let active = !app.filters.is_empty();
        let filter_label = if active {
            RichText::new(format!("{}  Filters •", icons::FUNNEL)).color(theme::ACCENT)
        } else {
            RichText::new(format!("{}  Filters", icons::FUNNEL))
        };
        let filters_enabled = app.board.display_mode() == DisplayMode::Tasks;
        if ui
            .add_enabled(filters_enabled, egui::SelectableLabel::new(app.show_filters, filter_label))
            .on_disabled_hover_text("Filters apply to tasks only")
            .clicked()
        {
            app.show_filters = !app.show_filters;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let source = app
                .backend
                .path()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sample schedule".to_string());
            ui.label(RichText::new(source).size(11.0).weak());
            if app.board.is_fetching() || app.board.commits_in_flight() > 0 {
                ui.spinner();
            }
        });
    });
}
