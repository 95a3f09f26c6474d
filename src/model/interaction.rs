use chrono::{Duration, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

use super::item::ScheduleItem;
use super::timeline::ViewConfig;

/// Which part of a bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    Move,
    ResizeLeft,
    ResizeRight,
}

/// A start/end date pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn of(item: &ScheduleItem) -> Self {
        Self::new(item.start, item.end)
    }

    /// Apply a whole-day delta according to `kind`.
    ///
    /// Resizes never cross the opposite edge; they stop at it.
    pub fn adjusted(self, kind: DragKind, days: i64) -> Self {
        let delta = Duration::days(days);
        match kind {
            DragKind::Move => Self::new(self.start + delta, self.end + delta),
            DragKind::ResizeLeft => Self::new((self.start + delta).min(self.end), self.end),
            DragKind::ResizeRight => Self::new(self.start, (self.end + delta).max(self.start)),
        }
    }
}

/// An in-progress gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub item_id: Uuid,
    pub kind: DragKind,
    pub origin_pointer_x: f32,
    pub origin: DateSpan,
    pub candidate: DateSpan,
}

/// Dates to persist for one item once a gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub item_id: Uuid,
    pub kind: DragKind,
    pub dates: DateSpan,
    /// What was displayed before the gesture.
    pub previous: DateSpan,
}

#[derive(Debug, Error, PartialEq)]
pub enum InteractionError {
    #[error("a drag is already in progress for item {0}")]
    AlreadyDragging(Uuid),
    #[error("item {0} is not on the timeline")]
    UnknownItem(Uuid),
    #[error("project bars cannot be moved")]
    NotDraggable(Uuid),
}

/// Idle ⇄ Dragging. At most one gesture at a time.
#[derive(Debug, Default)]
pub struct DragController {
    state: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    /// Live candidate dates for `item_id`, if it is the one being dragged.
    pub fn candidate_for(&self, item_id: Uuid) -> Option<DateSpan> {
        self.state
            .as_ref()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.candidate)
    }

    pub fn pointer_down(
        &mut self,
        item: &ScheduleItem,
        kind: DragKind,
        pointer_x: f32,
    ) -> Result<(), InteractionError> {
        if let Some(active) = &self.state {
            return Err(InteractionError::AlreadyDragging(active.item_id));
        }
        let origin = DateSpan::of(item);
        tracing::debug!(item = %item.id, ?kind, "drag started");
        self.state = Some(DragState {
            item_id: item.id,
            kind,
            origin_pointer_x: pointer_x,
            origin,
            candidate: origin,
        });
        Ok(())
    }

    /// Recompute the candidate from the pointer position. Nothing is committed.
    pub fn pointer_move(&mut self, pointer_x: f32, config: &ViewConfig) -> Option<DateSpan> {
        let state = self.state.as_mut()?;
        let days = config.day_delta(pointer_x - state.origin_pointer_x);
        state.candidate = state.origin.adjusted(state.kind, days);
        Some(state.candidate)
    }

    /// End the gesture. Yields a request unless the dates did not change.
    pub fn pointer_up(&mut self, pointer_x: f32, config: &ViewConfig) -> Option<CommitRequest> {
        self.pointer_move(pointer_x, config);
        let state = self.state.take()?;
        if state.candidate == state.origin {
            tracing::debug!(item = %state.item_id, "drag ended without a date change");
            return None;
        }
        Some(CommitRequest {
            item_id: state.item_id,
            kind: state.kind,
            dates: state.candidate,
            previous: state.origin,
        })
    }

    /// Abort the gesture, discarding the candidate.
    pub fn cancel(&mut self) -> Option<DragState> {
        let state = self.state.take();
        if let Some(s) = &state {
            tracing::debug!(item = %s.item_id, "drag cancelled");
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Priority, Status};
    use crate::model::timeline::ViewMode;
    use egui::Color32;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bar(start: NaiveDate, end: NaiveDate) -> ScheduleItem {
        ScheduleItem {
            id: Uuid::new_v4(),
            name: "bar".into(),
            start,
            end,
            progress: 0.0,
            color: Color32::GRAY,
            assignee: String::new(),
            priority: Priority::Medium,
            status: Status::Todo,
            parent_id: None,
            project_id: None,
            dated: true,
        }
    }

    #[test]
    fn moving_three_units_in_day_mode_shifts_three_days() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let item = bar(d(2024, 4, 1), d(2024, 4, 5));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::Move, 200.0).unwrap();

        let live = drag.pointer_move(200.0 + 3.0 * config.unit_width, &config).unwrap();
        assert_eq!(live, DateSpan::new(d(2024, 4, 4), d(2024, 4, 8)));
        assert_eq!(drag.candidate_for(item.id), Some(live));

        let request = drag.pointer_up(200.0 + 3.0 * config.unit_width, &config).unwrap();
        assert_eq!(request.dates, DateSpan::new(d(2024, 4, 4), d(2024, 4, 8)));
        assert_eq!(request.previous, DateSpan::of(&item));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn move_then_reverse_restores_dates() {
        for mode in ViewMode::ALL {
            let config = ViewConfig::for_mode(mode);
            let mut item = bar(d(2024, 2, 10), d(2024, 2, 20));
            let original = DateSpan::of(&item);
            let mut drag = DragController::new();

            for delta in [137.0_f32, -137.0] {
                drag.pointer_down(&item, DragKind::Move, 500.0).unwrap();
                let request = drag.pointer_up(500.0 + delta, &config).unwrap();
                item.start = request.dates.start;
                item.end = request.dates.end;
            }
            assert_eq!(DateSpan::of(&item), original, "{mode:?}");
        }
    }

    #[test]
    fn resize_left_stops_at_end() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let item = bar(d(2024, 4, 1), d(2024, 4, 3));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::ResizeLeft, 0.0).unwrap();

        let live = drag.pointer_move(10.0 * config.unit_width, &config).unwrap();
        assert_eq!(live, DateSpan::new(d(2024, 4, 3), d(2024, 4, 3)));

        let live = drag.pointer_move(-config.unit_width, &config).unwrap();
        assert_eq!(live, DateSpan::new(d(2024, 3, 31), d(2024, 4, 3)));
    }

    #[test]
    fn resize_right_stops_at_start() {
        let config = ViewConfig::for_mode(ViewMode::Week);
        let item = bar(d(2024, 4, 1), d(2024, 4, 15));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::ResizeRight, 300.0).unwrap();

        let live = drag.pointer_move(-1000.0, &config).unwrap();
        assert_eq!(live, DateSpan::new(d(2024, 4, 1), d(2024, 4, 1)));

        let request = drag.pointer_up(400.0, &config).unwrap();
        assert_eq!(request.dates, DateSpan::new(d(2024, 4, 1), d(2024, 4, 22)));
    }

    #[test]
    fn only_one_gesture_at_a_time() {
        let item = bar(d(2024, 4, 1), d(2024, 4, 2));
        let other = bar(d(2024, 4, 1), d(2024, 4, 2));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::Move, 0.0).unwrap();
        assert_eq!(
            drag.pointer_down(&other, DragKind::Move, 0.0),
            Err(InteractionError::AlreadyDragging(item.id))
        );
        assert_eq!(drag.candidate_for(other.id), None);
    }

    #[test]
    fn cancel_discards_candidate_without_request() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let item = bar(d(2024, 4, 1), d(2024, 4, 2));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::Move, 0.0).unwrap();
        drag.pointer_move(250.0, &config);

        let aborted = drag.cancel().unwrap();
        assert_eq!(aborted.origin, DateSpan::of(&item));
        assert!(!drag.is_dragging());
        assert!(drag.pointer_up(250.0, &config).is_none());
    }

    #[test]
    fn click_without_movement_does_not_commit() {
        let config = ViewConfig::for_mode(ViewMode::Month);
        let item = bar(d(2024, 4, 1), d(2024, 4, 2));
        let mut drag = DragController::new();
        drag.pointer_down(&item, DragKind::Move, 10.0).unwrap();
        assert!(drag.pointer_up(11.0, &config).is_none());
    }
}
