use chrono::{Datelike, NaiveDate};
use egui::{Align2, Painter, Pos2, Rect, Stroke, Vec2};

use crate::model::{DateRange, ViewConfig, ViewMode};
use crate::ui::theme;

/// One column of the time header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderColumn {
    pub start: NaiveDate,
    pub x: f32,
    pub label: String,
    pub sub_label: String,
    /// Month/year caption, set on the first column of each month.
    pub context: Option<String>,
}

/// Header columns for `range` in `config`'s unit.
pub fn header_columns(config: &ViewConfig, range: &DateRange) -> Vec<HeaderColumn> {
    let mut previous_month = None;
    (0..config.total_units(range.start, range.end))
        .map(|i| {
            let start = config.unit_start(range.start, i);
            let month = (start.year(), start.month());
            let context = (config.mode != ViewMode::Month && previous_month != Some(month))
                .then(|| start.format("%b %Y").to_string());
            previous_month = Some(month);
            HeaderColumn {
                start,
                x: config.unit_position(start, range.start),
                label: config.label(start),
                sub_label: config.sub_label(start),
                context,
            }
        })
        .collect()
}

/// Paint the header; `rect` spans the full canvas width.
pub fn paint_time_header(painter: &Painter, rect: Rect, config: &ViewConfig, range: &DateRange, today: NaiveDate) {
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for column in header_columns(config, range) {
        let x = rect.left() + column.x;
        painter.line_segment(
            [Pos2::new(x, rect.top() + 24.0), Pos2::new(x, rect.bottom())],
            Stroke::new(0.5, theme::GRID_LINE),
        );

        if let Some(context) = &column.context {
            painter.text(
                Pos2::new(x + 4.0, rect.top() + 12.0),
                Align2::LEFT_CENTER,
                context,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }

        let weekend = config.mode == ViewMode::Day && column.start.weekday().num_days_from_monday() >= 5;
        let is_today = config.mode == ViewMode::Day && column.start == today;
        let color = if is_today {
            theme::TODAY_LINE
        } else if weekend {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        painter.text(
            Pos2::new(x + 4.0, rect.top() + 42.0),
            Align2::LEFT_CENTER,
            &column.label,
            theme::font_header(),
            color,
        );
        painter.text(
            Pos2::new(x + 4.0, rect.top() + 62.0),
            Align2::LEFT_CENTER,
            &column.sub_label,
            theme::font_sub(),
            theme::TEXT_DIM,
        );
    }

    if range.contains(today) {
        let x = rect.left() + config.unit_position(today, range.start);
        let badge = Rect::from_min_size(Pos2::new(x - 21.0, rect.bottom() - 14.0), Vec2::new(42.0, 14.0));
        painter.rect_filled(badge, egui::Rounding::same(3.0), theme::TODAY_LINE);
        painter.text(
            badge.center(),
            Align2::CENTER_CENTER,
            "Today",
            theme::font_small(),
            egui::Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_columns_are_labelled_by_iso_week() {
        let config = ViewConfig::for_mode(ViewMode::Week);
        let range = DateRange { start: d(2024, 1, 29), end: d(2024, 2, 19) };
        let columns = header_columns(&config, &range);

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].label, "W05");
        assert_eq!(columns[1].x, 100.0);
        assert_eq!(columns[1].sub_label, "05 Feb");
        assert_eq!(columns[0].context.as_deref(), Some("Jan 2024"));
        assert_eq!(columns[1].context.as_deref(), Some("Feb 2024"));
        assert_eq!(columns[2].context, None);
    }

    #[test]
    fn month_columns_step_by_calendar_month() {
        let config = ViewConfig::for_mode(ViewMode::Month);
        let range = DateRange { start: d(2023, 11, 1), end: d(2024, 2, 10) };
        let columns = header_columns(&config, &range);

        let labels: Vec<_> = columns.iter().map(|c| (c.label.as_str(), c.sub_label.as_str())).collect();
        assert_eq!(labels, vec![("Nov", "2023"), ("Dec", "2023"), ("Jan", "2024"), ("Feb", "2024")]);
        assert_eq!(columns[3].x, 360.0);
        assert!(columns.iter().all(|c| c.context.is_none()));
    }
}
