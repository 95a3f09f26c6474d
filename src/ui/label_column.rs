use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Stroke, Vec2};

use crate::model::{GroupSummary, LayoutRow, RowKind, ScheduleItem, ScheduleLayout};
use crate::ui::project_bar::duration_label;
use crate::ui::theme;

/// Left-hand column text for every row, aligned with the canvas rows.
pub fn paint_label_column(painter: &Painter, rect: Rect, layout: &ScheduleLayout, items: &[ScheduleItem]) {
    painter.rect_filled(rect, 0.0, theme::BG_PANEL);

    for (i, row) in layout.rows().iter().enumerate() {
        let row_rect = Rect::from_min_size(
            Pos2::new(rect.left(), rect.top() + row.offset),
            Vec2::new(rect.width(), row.height),
        );
        if !painter.clip_rect().intersects(row_rect) {
            continue;
        }

        match (row.group_index, row.item_index) {
            (Some(g), _) => paint_group_header(painter, row_rect, &layout.groups()[g]),
            (None, Some(idx)) => paint_item_label(painter, row_rect, row, &items[idx], i % 2 == 0),
            (None, None) => {}
        }

        painter.line_segment(
            [row_rect.left_bottom(), row_rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    painter.line_segment(
        [rect.right_top(), rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn paint_group_header(painter: &Painter, rect: Rect, group: &GroupSummary) {
    painter.rect_filled(rect, 0.0, theme::faded(group.color, 0.12));
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(4.0, rect.height())),
        0.0,
        group.color,
    );

    let title = match group.number {
        Some(n) => format!("{n}. {}", group.name),
        None => group.name.clone(),
    };
    let clipped = painter.with_clip_rect(rect.shrink2(Vec2::new(10.0, 0.0)));
    clipped.text(
        Pos2::new(rect.left() + 14.0, rect.top() + rect.height() * 0.35),
        Align2::LEFT_CENTER,
        title,
        theme::font_bar(),
        theme::TEXT_PRIMARY,
    );

    let tasks = if group.task_count == 1 {
        "1 task".to_string()
    } else {
        format!("{} tasks", group.task_count)
    };
    clipped.text(
        Pos2::new(rect.left() + 14.0, rect.top() + rect.height() * 0.7),
        Align2::LEFT_CENTER,
        format!("{tasks} · {}", duration_label(group.duration_days)),
        theme::font_small(),
        theme::TEXT_SECONDARY,
    );

    // Progress pill on the right.
    let pill = Rect::from_min_size(
        Pos2::new(rect.right() - 52.0, rect.center().y - 9.0),
        Vec2::new(44.0, 18.0),
    );
    painter.rect_filled(pill, Rounding::same(9.0), theme::faded(group.color, 0.8));
    painter.text(
        pill.center(),
        Align2::CENTER_CENTER,
        format!("{}%", group.progress.round() as i32),
        theme::font_small(),
        Color32::WHITE,
    );
}

fn paint_item_label(painter: &Painter, rect: Rect, row: &LayoutRow, item: &ScheduleItem, even: bool) {
    painter.rect_filled(rect, 0.0, if even { theme::BG_PANEL } else { theme::BG_DARK });

    let child = row.kind == RowKind::Child;
    let indent = if child { 30.0 } else { 14.0 };
    let center_y = rect.center().y;

    painter.circle_filled(Pos2::new(rect.left() + indent - 6.0, center_y), 3.0, theme::status_color(item.status));

    let name_color = if child { theme::TEXT_SECONDARY } else { theme::TEXT_PRIMARY };
    let clipped = painter.with_clip_rect(rect.intersect(Rect::from_min_max(
        rect.min,
        Pos2::new(rect.right() - 64.0, rect.bottom()),
    )));
    let name_y = if child { center_y } else { center_y - 7.0 };
    clipped.text(
        Pos2::new(rect.left() + indent, name_y),
        Align2::LEFT_CENTER,
        &item.name,
        theme::font_bar(),
        name_color,
    );
    if !child {
        clipped.text(
            Pos2::new(rect.left() + indent, center_y + 9.0),
            Align2::LEFT_CENTER,
            &item.assignee,
            theme::font_small(),
            theme::TEXT_DIM,
        );
    }

    let chip_x = rect.right() - 58.0;
    painter.circle_filled(Pos2::new(chip_x, center_y), 3.5, theme::priority_color(item.priority));
    painter.text(
        Pos2::new(chip_x + 8.0, center_y),
        Align2::LEFT_CENTER,
        item.status.label(),
        theme::font_small(),
        theme::status_color(item.status),
    );
}
