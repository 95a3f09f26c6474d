use chrono::NaiveDate;
use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Stroke, Vec2};

use crate::model::{DateSpan, DragKind, ScheduleItem, ViewConfig};
use crate::ui::theme;

/// Where a task bar and its hit regions sit on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskBarGeometry {
    pub bar: Rect,
    /// Completed part of the bar.
    pub progress: Rect,
    pub left_handle: Rect,
    pub right_handle: Rect,
    pub opacity: f32,
}

impl TaskBarGeometry {
    /// `row` is the row's rect on the canvas; `progress` is in percent.
    pub fn new(
        config: &ViewConfig,
        range_start: NaiveDate,
        span: DateSpan,
        row: Rect,
        child: bool,
        progress: f32,
    ) -> Self {
        let x = row.left() + config.unit_position(span.start, range_start);
        let width = config.bar_width(span.start, span.end);
        let inset = if child { theme::CHILD_BAR_INSET } else { theme::BAR_INSET };
        let height = (row.height() - inset * 2.0).max(4.0);
        let bar = Rect::from_min_size(Pos2::new(x, row.center().y - height / 2.0), Vec2::new(width, height));

        let done = width * progress.clamp(0.0, 100.0) / 100.0;
        let half = theme::HANDLE_WIDTH / 2.0;
        Self {
            bar,
            progress: Rect::from_min_size(bar.min, Vec2::new(done, height)),
            left_handle: Rect::from_x_y_ranges(bar.left() - half..=bar.left() + half, bar.y_range()),
            right_handle: Rect::from_x_y_ranges(bar.right() - half..=bar.right() + half, bar.y_range()),
            opacity: if child { theme::CHILD_BAR_OPACITY } else { 1.0 },
        }
    }

    /// Everything that reacts to the pointer.
    pub fn hit_rect(&self) -> Rect {
        self.bar.union(self.left_handle).union(self.right_handle)
    }

    /// Which gesture a press at `pos` starts.
    pub fn hit_test(&self, pos: Pos2) -> Option<DragKind> {
        if !self.hit_rect().contains(pos) {
            return None;
        }
        let on_left = self.left_handle.contains(pos);
        let on_right = self.right_handle.contains(pos);
        Some(match (on_left, on_right) {
            // Bars narrower than two handles: nearest edge wins.
            (true, true) if (pos.x - self.bar.left()) <= (self.bar.right() - pos.x) => DragKind::ResizeLeft,
            (true, true) => DragKind::ResizeRight,
            (true, false) => DragKind::ResizeLeft,
            (false, true) => DragKind::ResizeRight,
            (false, false) => DragKind::Move,
        })
    }

    /// Gesture and origin x for a drag. egui reports the drag only once the
    /// pointer has left its threshold, so the press point decides; the
    /// current pointer is the fallback.
    pub fn grab(&self, press_origin: Option<Pos2>, pointer: Option<Pos2>) -> Option<(DragKind, f32)> {
        let pos = press_origin.or(pointer)?;
        Some((self.hit_test(pos).unwrap_or(DragKind::Move), pos.x))
    }

    pub fn shows_name(&self) -> bool {
        self.bar.width() > 30.0
    }

    pub fn shows_percentage(&self) -> bool {
        self.bar.width() > 70.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskBarFlags {
    pub hovered: bool,
    pub dragging: bool,
}

pub fn paint_task_bar(painter: &Painter, geometry: &TaskBarGeometry, item: &ScheduleItem, flags: TaskBarFlags) {
    let bar = geometry.bar;
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let fill = theme::faded(item.color, geometry.opacity);

    painter.rect_filled(bar.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar, rounding, fill);
    let highlight = Rect::from_min_size(bar.min, Vec2::new(bar.width(), (bar.height() * 0.45).max(4.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if item.progress > 0.0 {
        painter.rect_filled(geometry.progress, rounding, theme::PROGRESS_OVERLAY);
        if item.progress < 98.0 {
            let tick_x = geometry.progress.right();
            painter.line_segment(
                [Pos2::new(tick_x, bar.top() + 2.0), Pos2::new(tick_x, bar.bottom() - 2.0)],
                Stroke::new(1.0, Color32::from_white_alpha(60)),
            );
        }
    }

    if flags.dragging {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    let text_color = theme::faded(theme::TEXT_ON_BAR, geometry.opacity.max(0.9));
    let clipped = painter.with_clip_rect(bar.intersect(painter.clip_rect()));
    if geometry.shows_name() {
        let galley = painter.layout_no_wrap(item.name.clone(), theme::font_bar(), text_color);
        let text_y = bar.center().y - galley.size().y / 2.0;
        clipped.galley(Pos2::new(bar.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
    if geometry.shows_percentage() {
        clipped.text(
            Pos2::new(bar.right() - 6.0, bar.center().y),
            Align2::RIGHT_CENTER,
            format!("{}%", item.progress.round() as i32),
            theme::font_small(),
            text_color,
        );
    }

    // Resize grips are only revealed on hover.
    if flags.hovered || flags.dragging {
        let grip_h = bar.height() * 0.55;
        let grip_y = bar.center().y - grip_h / 2.0;
        for x in [bar.left() - 1.5, bar.right() - 2.5] {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(x, grip_y), Vec2::new(4.0, grip_h)),
                Rounding::same(2.0),
                theme::HANDLE_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewMode;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(height: f32) -> Rect {
        Rect::from_min_size(Pos2::new(0.0, 100.0), Vec2::new(2000.0, height))
    }

    #[test]
    fn bar_sits_at_mapped_offset_with_progress() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let span = DateSpan::new(d(2024, 1, 3), d(2024, 1, 7));
        let geometry = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(60.0), false, 25.0);

        assert_eq!(geometry.bar.left(), 100.0);
        assert_eq!(geometry.bar.width(), 200.0);
        assert_eq!(geometry.progress.width(), 50.0);
        assert_eq!(geometry.bar.height(), 60.0 - 2.0 * theme::BAR_INSET);
        assert_eq!(geometry.opacity, 1.0);
    }

    #[test]
    fn child_bars_are_thinner_and_faded() {
        let config = ViewConfig::for_mode(ViewMode::Week);
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 15));
        let parent = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(60.0), false, 0.0);
        let child = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(42.0), true, 0.0);
        assert!(child.bar.height() < parent.bar.height());
        assert!(child.opacity < 1.0);
    }

    #[test]
    fn hit_regions_split_into_handles_and_body() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 5));
        let geometry = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(60.0), false, 0.0);
        let y = geometry.bar.center().y;

        assert_eq!(geometry.hit_test(Pos2::new(1.0, y)), Some(DragKind::ResizeLeft));
        assert_eq!(geometry.hit_test(Pos2::new(-3.0, y)), Some(DragKind::ResizeLeft));
        assert_eq!(geometry.hit_test(Pos2::new(100.0, y)), Some(DragKind::Move));
        assert_eq!(geometry.hit_test(Pos2::new(199.0, y)), Some(DragKind::ResizeRight));
        assert_eq!(geometry.hit_test(Pos2::new(100.0, 0.0)), None);
        assert_eq!(geometry.hit_test(Pos2::new(260.0, y)), None);
    }

    #[test]
    fn grab_uses_press_point_not_dragged_pointer() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 5));
        let geometry = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(60.0), false, 0.0);
        let y = geometry.bar.center().y;

        let press = Pos2::new(geometry.bar.right() + 2.0, y);
        let dragged = Pos2::new(press.x + 6.0, y);
        assert_eq!(geometry.hit_test(dragged), None);
        assert_eq!(geometry.grab(Some(press), Some(dragged)), Some((DragKind::ResizeRight, press.x)));

        let press = Pos2::new(geometry.bar.left() + 2.0, y);
        let dragged = Pos2::new(press.x + 6.0, y);
        assert_eq!(geometry.grab(Some(press), Some(dragged)), Some((DragKind::ResizeLeft, press.x)));

        assert_eq!(geometry.grab(None, Some(dragged)), Some((DragKind::Move, dragged.x)));
        assert_eq!(geometry.grab(None, None), None);
    }

    #[test]
    fn tiny_bars_resize_from_nearest_edge() {
        let config = ViewConfig::for_mode(ViewMode::Month);
        let span = DateSpan::new(d(2024, 1, 10), d(2024, 1, 10));
        let geometry = TaskBarGeometry::new(&config, d(2024, 1, 1), span, row(60.0), false, 0.0);
        assert_eq!(geometry.bar.width(), crate::model::timeline::MIN_BAR_WIDTH);
        let y = geometry.bar.center().y;
        assert_eq!(geometry.hit_test(Pos2::new(geometry.bar.left() + 1.0, y)), Some(DragKind::ResizeLeft));
        assert_eq!(geometry.hit_test(Pos2::new(geometry.bar.right() - 1.0, y)), Some(DragKind::ResizeRight));
        assert!(!geometry.shows_name());
    }
}
