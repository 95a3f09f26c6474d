//! Project bars: read-only summaries of a whole project's period.

use chrono::NaiveDate;
use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Stroke, Vec2};

use crate::model::{ScheduleItem, ViewConfig};
use crate::ui::theme;

/// Bars narrower than this don't get a duration badge.
pub const BADGE_MIN_WIDTH: f32 = 200.0;
pub const PROGRESS_TICKS: usize = 10;

const TICK_STRIP_HEIGHT: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectBarGeometry {
    pub bar: Rect,
    pub progress: Rect,
    /// Ten marks along the bottom edge, paired with whether each is reached.
    pub ticks: Vec<(Rect, bool)>,
    pub badge: Option<Rect>,
}

impl ProjectBarGeometry {
    pub fn new(config: &ViewConfig, range_start: NaiveDate, item: &ScheduleItem, row: Rect) -> Self {
        let x = row.left() + config.unit_position(item.start, range_start);
        let width = config.bar_width(item.start, item.end);
        let height = (row.height() - theme::BAR_INSET * 1.5).max(6.0);
        let bar = Rect::from_min_size(Pos2::new(x, row.center().y - height / 2.0), Vec2::new(width, height));
        let progress = item.progress.clamp(0.0, 100.0);

        let tick_w = width / PROGRESS_TICKS as f32;
        let reached = (progress / 10.0).floor() as usize;
        let ticks = (0..PROGRESS_TICKS)
            .map(|i| {
                let rect = Rect::from_min_size(
                    Pos2::new(bar.left() + i as f32 * tick_w + 1.0, bar.bottom() - TICK_STRIP_HEIGHT - 2.0),
                    Vec2::new((tick_w - 2.0).max(0.5), TICK_STRIP_HEIGHT),
                );
                (rect, i < reached)
            })
            .collect();

        let badge = (width > BADGE_MIN_WIDTH).then(|| {
            Rect::from_min_size(Pos2::new(bar.right() - 58.0, bar.top() + 4.0), Vec2::new(52.0, 16.0))
        });

        Self {
            bar,
            progress: Rect::from_min_size(bar.min, Vec2::new(width * progress / 100.0, height)),
            ticks,
            badge,
        }
    }
}

pub fn duration_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// Lines of the hover tooltip: name, dates, progress, duration.
pub fn tooltip_lines(item: &ScheduleItem) -> [String; 4] {
    [
        item.name.clone(),
        format!("{} → {}", item.start.format("%d/%m/%Y"), item.end.format("%d/%m/%Y")),
        format!("Progress: {}%", item.progress.round() as i32),
        format!("Duration: {}", duration_label(item.duration_days())),
    ]
}

pub fn paint_project_bar(painter: &Painter, geometry: &ProjectBarGeometry, item: &ScheduleItem, hovered: bool) {
    let bar = geometry.bar;
    let rounding = Rounding::same(theme::BAR_ROUNDING + 2.0);

    painter.rect_filled(bar.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(45));
    painter.rect_filled(bar, rounding, theme::faded(item.color, 0.35));
    painter.rect_filled(geometry.progress, rounding, theme::faded(item.color, 0.9));
    painter.rect_stroke(
        bar,
        rounding,
        Stroke::new(if hovered { 2.0 } else { 1.0 }, item.color),
    );

    for (tick, reached) in &geometry.ticks {
        let color = if *reached {
            Color32::from_white_alpha(170)
        } else {
            Color32::from_white_alpha(40)
        };
        painter.rect_filled(*tick, Rounding::same(1.0), color);
    }

    let clipped = painter.with_clip_rect(bar.intersect(painter.clip_rect()));
    if bar.width() > 40.0 {
        clipped.text(
            Pos2::new(bar.left() + 8.0, bar.center().y - 3.0),
            Align2::LEFT_CENTER,
            format!("{}  {}%", item.name, item.progress.round() as i32),
            theme::font_bar(),
            theme::TEXT_ON_BAR,
        );
    }

    if let Some(badge) = geometry.badge {
        painter.rect_filled(badge, Rounding::same(8.0), Color32::from_black_alpha(90));
        painter.text(
            badge.center(),
            Align2::CENTER_CENTER,
            format!("{} d", item.duration_days()),
            theme::font_small(),
            theme::TEXT_ON_BAR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status, ViewMode};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn project(start: NaiveDate, end: NaiveDate, progress: f32) -> ScheduleItem {
        ScheduleItem {
            id: Uuid::new_v4(),
            name: "Warehouse".into(),
            start,
            end,
            progress,
            color: Color32::BLUE,
            assignee: "Ana".into(),
            priority: Priority::High,
            status: Status::InProgress,
            parent_id: None,
            project_id: None,
            dated: true,
        }
    }

    fn row() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(4000.0, 60.0))
    }

    #[test]
    fn wide_bars_get_a_badge() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let narrow = project(d(2024, 1, 1), d(2024, 1, 4), 0.0);
        assert!(ProjectBarGeometry::new(&config, d(2024, 1, 1), &narrow, row()).badge.is_none());

        let wider = project(d(2024, 1, 1), d(2024, 1, 10), 0.0);
        assert!(ProjectBarGeometry::new(&config, d(2024, 1, 1), &wider, row()).badge.is_some());
    }

    #[test]
    fn ticks_follow_progress() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let item = project(d(2024, 1, 1), d(2024, 1, 11), 47.0);
        let geometry = ProjectBarGeometry::new(&config, d(2024, 1, 1), &item, row());
        assert_eq!(geometry.ticks.len(), PROGRESS_TICKS);
        assert_eq!(geometry.ticks.iter().filter(|(_, reached)| *reached).count(), 4);
        assert_eq!(geometry.progress.width(), 235.0);
    }

    #[test]
    fn tooltip_lists_name_dates_progress_duration() {
        let item = project(d(2024, 3, 1), d(2024, 3, 31), 62.4);
        let [name, dates, progress, duration] = tooltip_lines(&item);
        assert_eq!(name, "Warehouse");
        assert_eq!(dates, "01/03/2024 → 31/03/2024");
        assert_eq!(progress, "Progress: 62%");
        assert_eq!(duration, "Duration: 30 days");
    }
}
