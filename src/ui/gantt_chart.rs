use std::time::Instant;

use chrono::Datelike;
use egui::{
    scroll_area::ScrollBarVisibility, Align2, Color32, CursorIcon, Id, Key, Painter, Pos2, Rect, Rounding,
    ScrollArea, Sense, Stroke, Ui, UiBuilder, Vec2,
};
use tracing::debug;

use crate::model::{
    DisplayMode, DragKind, GanttBoard, LayoutRow, Pane, RowKind, ScheduleBackend, ScheduleItem, ViewMode,
};
use crate::ui::header::paint_time_header;
use crate::ui::label_column::paint_label_column;
use crate::ui::project_bar::{paint_project_bar, tooltip_lines, ProjectBarGeometry};
use crate::ui::task_bar::{paint_task_bar, TaskBarFlags, TaskBarGeometry};
use crate::ui::theme;

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Render the chart: corner, time header, label column and bar canvas.
pub fn show_gantt_chart(
    ui: &mut Ui,
    board: &mut GanttBoard,
    backend: &mut dyn ScheduleBackend,
    label_width: f32,
    now: Instant,
) {
    let full = ui.available_rect_before_wrap();
    let offset = board.scroll.begin_frame();
    let config = *board.config();
    let range = board.range();
    let today = board.today();

    let corner = Rect::from_min_size(full.min, Vec2::new(label_width, HEADER_HEIGHT));
    let header_rect = Rect::from_min_max(Pos2::new(corner.right(), full.top()), Pos2::new(full.right(), corner.bottom()));
    let labels_rect = Rect::from_min_max(Pos2::new(full.left(), corner.bottom()), Pos2::new(corner.right(), full.bottom()));
    let canvas_rect = Rect::from_min_max(corner.right_bottom(), full.right_bottom());

    let content = Vec2::new(
        config.total_width(&range).max(canvas_rect.width()),
        board.layout().total_height().max(canvas_rect.height()),
    );

    paint_corner(ui.painter(), corner, board);

    let header = ui
        .allocate_new_ui(UiBuilder::new().max_rect(header_rect), |ui| {
            ScrollArea::horizontal()
                .id_salt("timeline_header")
                .auto_shrink([false, false])
                .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden)
                .scroll_offset(Vec2::new(offset.x, 0.0))
                .show(ui, |ui| {
                    let (rect, _) = ui.allocate_exact_size(Vec2::new(content.x, HEADER_HEIGHT), Sense::hover());
                    paint_time_header(ui.painter(), rect, &config, &range, today);
                })
        })
        .inner;
    board.scroll.report(Pane::Header, header.state.offset);

    let labels = ui
        .allocate_new_ui(UiBuilder::new().max_rect(labels_rect), |ui| {
            ScrollArea::vertical()
                .id_salt("timeline_labels")
                .auto_shrink([false, false])
                .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden)
                .scroll_offset(Vec2::new(0.0, offset.y))
                .show(ui, |ui| {
                    let (rect, _) = ui.allocate_exact_size(Vec2::new(label_width, content.y), Sense::hover());
                    paint_label_column(ui.painter(), rect, board.layout(), board.items());
                })
        })
        .inner;
    board.scroll.report(Pane::Labels, labels.state.offset);

    let canvas = ui
        .allocate_new_ui(UiBuilder::new().max_rect(canvas_rect), |ui| {
            ScrollArea::both()
                .id_salt("timeline_canvas")
                .auto_shrink([false, false])
                .drag_to_scroll(false)
                .scroll_offset(offset)
                .show(ui, |ui| show_canvas(ui, board, backend, content, now))
        })
        .inner;
    board.scroll.report(Pane::Canvas, canvas.state.offset);
}

fn paint_corner(painter: &Painter, rect: Rect, board: &GanttBoard) {
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], Stroke::new(1.0, theme::BORDER_SUBTLE));
    painter.line_segment([rect.right_top(), rect.right_bottom()], Stroke::new(1.0, theme::BORDER_SUBTLE));

    let title = match board.display_mode() {
        DisplayMode::Tasks => "Tasks",
        DisplayMode::Projects => "Projects",
    };
    painter.text(
        Pos2::new(rect.left() + 14.0, rect.top() + 30.0),
        Align2::LEFT_CENTER,
        title,
        theme::font_badge(),
        theme::TEXT_PRIMARY,
    );
    painter.text(
        Pos2::new(rect.left() + 14.0, rect.top() + 54.0),
        Align2::LEFT_CENTER,
        format!("{} shown · {} view", board.items().len(), board.view_mode().label()),
        theme::font_small(),
        theme::TEXT_DIM,
    );
}

fn show_canvas(ui: &mut Ui, board: &mut GanttBoard, backend: &mut dyn ScheduleBackend, size: Vec2, now: Instant) {
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;

    painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
    paint_grid(&painter, response.rect, board);

    if ui.input(|i| i.key_pressed(Key::Escape)) && board.cancel_drag() {
        debug!("drag cancelled from keyboard");
    }

    let dragged_id = board.drag_state().map(|s| s.item_id);
    let rows: Vec<LayoutRow> = board.layout().rows().to_vec();
    let mut drag_seen = false;

    for (i, row) in rows.iter().enumerate() {
        let row_rect = Rect::from_min_size(origin + Vec2::new(0.0, row.offset), Vec2::new(size.x, row.height));
        let Some(index) = row.item_index else {
            if let Some(g) = row.group_index {
                paint_group_band(&painter, row_rect, board, g);
            }
            continue;
        };
        let Some(item) = board.items().get(index).cloned() else {
            continue;
        };
        if !ui.clip_rect().intersects(row_rect) && dragged_id != Some(item.id) {
            continue;
        }

        if i % 2 == 1 {
            painter.rect_filled(row_rect, 0.0, theme::BG_ROW_HOVER);
        }

        match board.display_mode() {
            DisplayMode::Tasks => drag_seen |= task_bar(ui, &painter, board, backend, now, &item, row, row_rect),
            DisplayMode::Projects => project_bar(ui, &painter, board, &item, row_rect),
        }

        if board.is_flashing(item.id, now) {
            painter.rect_stroke(row_rect.shrink(1.5), 0.0, Stroke::new(3.0, theme::FLASH_OUTLINE));
        }
    }

    if board.drag_state().is_some() && !drag_seen {
        debug!("pointer lost during drag");
        board.cancel_drag();
    }
}

fn paint_grid(painter: &Painter, rect: Rect, board: &GanttBoard) {
    let config = board.config();
    let range = board.range();

    for i in 0..config.total_units(range.start, range.end) {
        let start = config.unit_start(range.start, i);
        let x = rect.left() + config.unit_position(start, range.start);
        if config.mode == ViewMode::Day && start.weekday().num_days_from_monday() >= 5 {
            painter.rect_filled(
                Rect::from_x_y_ranges(x..=x + config.unit_width, rect.y_range()),
                0.0,
                Color32::from_black_alpha(30),
            );
        }
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }

    for y in board.layout().grid_line_offsets() {
        painter.line_segment(
            [Pos2::new(rect.left(), rect.top() + y), Pos2::new(rect.right(), rect.top() + y)],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    let today = board.today();
    if range.contains(today) {
        let x = rect.left() + config.unit_position(today, range.start);
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.5, theme::TODAY_LINE),
        );
    }
}

/// Faint band over a project's period on its header row.
fn paint_group_band(painter: &Painter, row: Rect, board: &GanttBoard, group_index: usize) {
    let Some(group) = board.layout().groups().get(group_index) else {
        return;
    };
    painter.rect_filled(row, 0.0, theme::faded(group.color, 0.06));
    let Some((start, end)) = group.period else {
        return;
    };
    let config = board.config();
    let range_start = board.range().start;
    let x = row.left() + config.unit_position(start, range_start);
    let band = Rect::from_min_size(
        Pos2::new(x, row.top() + theme::BAR_INSET * 2.0),
        Vec2::new(config.bar_width(start, end), row.height() - theme::BAR_INSET * 4.0),
    );
    painter.rect_filled(band, Rounding::same(3.0), theme::faded(group.color, 0.22));
    painter.rect_stroke(band, Rounding::same(3.0), Stroke::new(1.0, theme::faded(group.color, 0.6)));
}

/// Draw a task bar and feed its pointer events to the board. Returns true
/// when this bar carries the active drag.
#[allow(clippy::too_many_arguments)]
fn task_bar(
    ui: &Ui,
    painter: &Painter,
    board: &mut GanttBoard,
    backend: &mut dyn ScheduleBackend,
    now: Instant,
    item: &ScheduleItem,
    row: &LayoutRow,
    row_rect: Rect,
) -> bool {
    let child = row.kind == RowKind::Child;
    let range_start = board.range().start;
    let geometry = TaskBarGeometry::new(board.config(), range_start, board.displayed_span(item), row_rect, child, item.progress);

    let response = ui.interact(
        geometry.hit_rect(),
        ui.make_persistent_id(("task-bar", item.id)),
        Sense::click_and_drag(),
    );
    let pointer_x = response
        .interact_pointer_pos()
        .or_else(|| ui.input(|i| i.pointer.latest_pos()))
        .map(|p| p.x);

    if response.drag_started() {
        let press_origin = ui.input(|i| i.pointer.press_origin());
        if let Some((kind, x)) = geometry.grab(press_origin, response.interact_pointer_pos()) {
            if let Err(e) = board.pointer_down(item.id, kind, x) {
                debug!(error = %e, "drag not started");
            }
        }
    }

    let mut carries_drag = false;
    if let Some(kind) = board.drag_state().filter(|s| s.item_id == item.id).map(|s| s.kind) {
        carries_drag = true;
        if response.drag_stopped() {
            match pointer_x {
                Some(x) => {
                    board.pointer_up(x, backend, now);
                }
                None => {
                    board.cancel_drag();
                }
            }
        } else if response.dragged() {
            if let Some(x) = pointer_x {
                board.pointer_move(x);
            }
            ui.ctx().set_cursor_icon(match kind {
                DragKind::Move => CursorIcon::Grabbing,
                DragKind::ResizeLeft | DragKind::ResizeRight => CursorIcon::ResizeHorizontal,
            });
        }
    }

    let dragging = board.drag_state().is_some_and(|s| s.item_id == item.id);
    let span = board.displayed_span(item);
    let geometry = TaskBarGeometry::new(board.config(), range_start, span, row_rect, child, item.progress);

    if response.hovered() && !dragging {
        if let Some(kind) = response.hover_pos().and_then(|p| geometry.hit_test(p)) {
            ui.ctx().set_cursor_icon(match kind {
                DragKind::Move => CursorIcon::Grab,
                DragKind::ResizeLeft | DragKind::ResizeRight => CursorIcon::ResizeHorizontal,
            });
        }
    }

    paint_task_bar(
        painter,
        &geometry,
        item,
        TaskBarFlags {
            hovered: response.hovered(),
            dragging,
        },
    );

    if response.hovered() || dragging {
        egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), Id::new(("task-tip", item.id)), |ui| {
            ui.strong(&item.name);
            ui.label(format!("{} → {}", span.start.format("%d/%m/%Y"), span.end.format("%d/%m/%Y")));
            ui.label(format!("Progress: {}%", item.progress.round() as i32));
            ui.label(format!("{} · {} · {}", item.assignee, item.status.label(), item.priority.label()));
            if !item.dated {
                ui.label(egui::RichText::new("Dates missing, placeholder shown").color(theme::TEXT_DIM));
            }
        });
    }

    carries_drag
}

fn project_bar(ui: &Ui, painter: &Painter, board: &mut GanttBoard, item: &ScheduleItem, row_rect: Rect) {
    let geometry = ProjectBarGeometry::new(board.config(), board.range().start, item, row_rect);
    let response = ui.interact(
        geometry.bar,
        ui.make_persistent_id(("project-bar", item.id)),
        Sense::click_and_drag(),
    );

    if response.drag_started() {
        let x = ui
            .input(|i| i.pointer.press_origin())
            .or(response.interact_pointer_pos())
            .map_or(0.0, |p| p.x);
        // Refused by the board, which logs it.
        let _ = board.pointer_down(item.id, DragKind::Move, x);
    }

    paint_project_bar(painter, &geometry, item, response.hovered());

    if response.hovered() {
        egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), Id::new(("project-tip", item.id)), |ui| {
            let [name, dates, progress, duration] = tooltip_lines(item);
            ui.strong(name);
            ui.label(dates);
            ui.label(progress);
            ui.label(duration);
        });
    }
}
