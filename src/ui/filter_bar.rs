use std::collections::BTreeSet;

use chrono::NaiveDate;
use egui::{RichText, Ui};
use egui_phosphor::regular as icons;

use crate::model::{Priority, ScheduleSnapshot, Status, TaskFilters};
use crate::ui::theme;

/// Render the task filter row. Returns true when `filters` changed.
pub fn show_filter_bar(filters: &mut TaskFilters, snapshot: &ScheduleSnapshot, today: NaiveDate, ui: &mut Ui) -> bool {
    let before = filters.clone();

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;
        ui.label(RichText::new(icons::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        ui.add(
            egui::TextEdit::singleline(&mut filters.search)
                .hint_text("Search tasks or people...")
                .desired_width(180.0),
        );

        multi_select(ui, "Status", &mut filters.statuses, Status::ALL.iter().map(|s| (*s, s.label().to_string())));
        multi_select(
            ui,
            "Priority",
            &mut filters.priorities,
            Priority::ALL.iter().map(|p| (*p, p.label().to_string())),
        );

        let people: BTreeSet<String> = snapshot.tasks.iter().filter_map(|t| t.assignee.clone()).collect();
        multi_select(ui, "Assignee", &mut filters.assignees, people.into_iter().map(|a| (a.clone(), a)));
        multi_select(
            ui,
            "Project",
            &mut filters.projects,
            snapshot.projects.iter().map(|p| (p.id, p.name.clone())),
        );

        date_bound(ui, "From", "filter_from", &mut filters.date_from, today);
        date_bound(ui, "To", "filter_to", &mut filters.date_to, today);

        if !filters.is_empty() && ui.button(format!("{} Clear", icons::X)).clicked() {
            *filters = TaskFilters::default();
        }
    });

    *filters != before
}

/// A drop-down of checkboxes; an empty selection means "any".
fn multi_select<T, I>(ui: &mut Ui, title: &str, selected: &mut Vec<T>, options: I)
where
    T: PartialEq + Clone,
    I: IntoIterator<Item = (T, String)>,
{
    let caption = if selected.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({})", selected.len())
    };
    ui.menu_button(caption, |ui| {
        for (value, label) in options {
            let mut on = selected.contains(&value);
            if ui.checkbox(&mut on, label).changed() {
                if on {
                    selected.push(value);
                } else {
                    selected.retain(|v| *v != value);
                }
            }
        }
    });
}

fn date_bound(ui: &mut Ui, label: &str, salt: &str, bound: &mut Option<NaiveDate>, today: NaiveDate) {
    let mut enabled = bound.is_some();
    if ui.checkbox(&mut enabled, label).changed() {
        *bound = enabled.then_some(today);
    }
    if let Some(date) = bound {
        ui.add(egui_extras::DatePickerButton::new(date).id_salt(salt));
    }
}
