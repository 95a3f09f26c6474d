//! State owned by the chart container.
//!
//! [`GanttBoard`] holds the view and display modes, the raw records, the
//! derived items/range/layout, the drag controller and everything needed to
//! reconcile speculative date edits with the backend: in-flight commits,
//! the pending fetch, row flashes and notifications. It never blocks; the
//! host calls [`GanttBoard::poll`] once per frame.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use egui::Color32;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::commit::{
    BackendError, CommitRejection, CommitResult, DateUpdate, FetchResult, Pending, Poll,
    ScheduleBackend,
};
use super::filter::TaskFilters;
use super::interaction::{CommitRequest, DateSpan, DragController, DragKind, DragState, InteractionError};
use super::item::{ScheduleItem, ScheduleSnapshot};
use super::layout::{DisplayMode, LayoutCache, ScheduleLayout};
use super::palette::{self, UNASSIGNED_COLOR};
use super::scroll::ScrollSync;
use super::timeline::{DateRange, ViewConfig, ViewMode};
use crate::settings::GanttSettings;

/// How often to re-poll while something is outstanding.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A user-facing message with an expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub detail: Option<String>,
    pub suggestion: Option<String>,
    /// The affected bar was put back to its last saved dates.
    pub rolled_back: bool,
    pub expires_at: Instant,
}

impl Notice {
    fn from_rejection(rejection: &CommitRejection, expires_at: Instant) -> Self {
        Self {
            message: rejection.message.clone(),
            detail: rejection.detail.clone(),
            suggestion: rejection.suggestion.clone(),
            rolled_back: true,
            expires_at,
        }
    }
}

/// Temporary highlight of a row whose edit was rolled back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFlash {
    pub item_id: Uuid,
    pub starts_at: Instant,
    pub ends_at: Instant,
}

impl RowFlash {
    pub fn is_visible(&self, now: Instant) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Initial,
    Requested,
    /// Issued after a rejected commit to resynchronize displayed dates.
    Forced,
}

#[derive(Debug, Clone, Copy)]
struct Timings {
    toast: Duration,
    error_surface: Duration,
    flash_delay: Duration,
    flash_duration: Duration,
}

impl From<&GanttSettings> for Timings {
    fn from(settings: &GanttSettings) -> Self {
        Self {
            toast: settings.toast_duration(),
            error_surface: settings.error_surface_duration(),
            flash_delay: settings.flash_delay(),
            flash_duration: settings.flash_duration(),
        }
    }
}

#[derive(Debug)]
struct Fetch {
    pending: Pending<FetchResult>,
    kind: RefreshKind,
    /// Sequence number when the request went out.
    issued: u64,
    /// Rows to flash once this fetch lands.
    flash: Vec<Uuid>,
}

#[derive(Debug)]
struct InFlight {
    request: CommitRequest,
    pending: Pending<CommitResult>,
}

#[derive(Debug)]
pub struct GanttBoard {
    view_mode: ViewMode,
    display_mode: DisplayMode,
    config: ViewConfig,
    filters: TaskFilters,
    snapshot: ScheduleSnapshot,
    loaded: bool,
    items: Vec<ScheduleItem>,
    colors: HashMap<Uuid, Color32>,
    range: DateRange,
    layout: LayoutCache,
    row_height: f32,
    today: NaiveDate,

    drag: DragController,
    in_flight: Vec<InFlight>,
    /// Dates shown for items whose commit has not been confirmed by a fetch.
    speculative: HashMap<Uuid, DateSpan>,
    /// Sequence number at which each item's latest commit was accepted.
    settled: HashMap<Uuid, u64>,
    /// Bumped whenever a fetch is issued or a commit settles.
    sequence: u64,
    fetch: Option<Fetch>,
    refresh_deferred: bool,

    flashes: Vec<RowFlash>,
    toasts: Vec<Notice>,
    error_surface: Option<Notice>,
    timings: Timings,

    pub scroll: ScrollSync,
}

impl GanttBoard {
    pub fn new(settings: &GanttSettings, today: NaiveDate) -> Self {
        let config = ViewConfig::for_mode(settings.view_mode);
        Self {
            view_mode: settings.view_mode,
            display_mode: settings.display_mode,
            config,
            filters: TaskFilters::default(),
            snapshot: ScheduleSnapshot::default(),
            loaded: false,
            items: Vec::new(),
            colors: HashMap::new(),
            range: DateRange::covering(std::iter::empty(), &config, today),
            layout: LayoutCache::default(),
            row_height: settings.row_height,
            today,
            drag: DragController::new(),
            in_flight: Vec::new(),
            speculative: HashMap::new(),
            settled: HashMap::new(),
            sequence: 0,
            fetch: None,
            refresh_deferred: false,
            flashes: Vec::new(),
            toasts: Vec::new(),
            error_surface: None,
            timings: Timings::from(settings),
            scroll: ScrollSync::default(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn item(&self, id: Uuid) -> Option<&ScheduleItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    pub fn layout(&self) -> &ScheduleLayout {
        self.layout.layout()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch.is_some()
    }

    pub fn commits_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.state()
    }

    pub fn toasts(&self) -> &[Notice] {
        &self.toasts
    }

    pub fn error_surface(&self) -> Option<&Notice> {
        self.error_surface.as_ref()
    }

    pub fn project_color(&self, project_id: Uuid) -> Color32 {
        self.colors
            .get(&project_id)
            .copied()
            .unwrap_or(UNASSIGNED_COLOR)
    }

    /// Dates to draw for `item`: the live drag candidate, else an unconfirmed
    /// commit, else the fetched dates.
    pub fn displayed_span(&self, item: &ScheduleItem) -> DateSpan {
        self.drag
            .candidate_for(item.id)
            .or_else(|| self.speculative.get(&item.id).copied())
            .unwrap_or_else(|| DateSpan::of(item))
    }

    pub fn is_flashing(&self, item_id: Uuid, now: Instant) -> bool {
        self.flashes
            .iter()
            .any(|f| f.item_id == item_id && f.is_visible(now))
    }

    // ── Modes and filters ───────────────────────────────────────

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.drag.cancel();
        self.view_mode = mode;
        self.config = ViewConfig::for_mode(mode);
        self.recompute_range();
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if mode == self.display_mode {
            return;
        }
        self.drag.cancel();
        self.display_mode = mode;
        self.scroll.reset();
        self.rebuild();
    }

    pub fn set_filters(&mut self, filters: TaskFilters) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        if self.display_mode == DisplayMode::Tasks {
            self.rebuild();
        }
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        if today == self.today {
            return;
        }
        self.today = today;
        self.rebuild();
    }

    // ── Data ────────────────────────────────────────────────────

    /// Ask for a fresh snapshot. Deferred while a drag or commit is
    /// outstanding; a fetch issued before a commit settled never replaces
    /// that commit's dates.
    pub fn refresh(&mut self, backend: &mut dyn ScheduleBackend) -> bool {
        if !self.is_idle() {
            debug!("refresh deferred until interaction settles");
            self.refresh_deferred = true;
            return false;
        }
        let kind = if self.loaded {
            RefreshKind::Requested
        } else {
            RefreshKind::Initial
        };
        self.issue_fetch(backend, kind, None);
        true
    }

    fn is_idle(&self) -> bool {
        !self.drag.is_dragging() && self.in_flight.is_empty() && self.fetch.is_none()
    }

    fn issue_fetch(&mut self, backend: &mut dyn ScheduleBackend, kind: RefreshKind, flash: Option<Uuid>) {
        // A superseded fetch still owes its flashes.
        let mut pending_flash = self.fetch.take().map(|f| f.flash).unwrap_or_default();
        pending_flash.extend(flash);
        let issued = self.next_sequence();
        debug!(?kind, issued, "fetching schedule");
        self.fetch = Some(Fetch {
            pending: backend.fetch(),
            kind,
            issued,
            flash: pending_flash,
        });
        self.refresh_deferred = false;
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Replace the records and re-derive items, range and layout. The
    /// snapshot is treated as current: only in-flight edits stay speculative.
    pub fn apply_snapshot(&mut self, snapshot: ScheduleSnapshot) {
        let issued = self.next_sequence();
        self.install_snapshot(snapshot, issued);
    }

    /// `issued` is the sequence number of the request that produced
    /// `snapshot`. Accepted commits that settled after it are not reflected
    /// yet, so their dates stay speculative until a later fetch.
    fn install_snapshot(&mut self, snapshot: ScheduleSnapshot, issued: u64) {
        let unconfirmed: HashSet<Uuid> = self.in_flight.iter().map(|c| c.request.item_id).collect();
        let settled = &self.settled;
        self.speculative.retain(|id, _| {
            unconfirmed.contains(id) || settled.get(id).is_some_and(|&at| at > issued)
        });
        let speculative = &self.speculative;
        self.settled.retain(|id, _| speculative.contains_key(id));
        info!(
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            "schedule loaded"
        );
        self.snapshot = snapshot;
        self.loaded = true;
        self.rebuild();

        let dragged_gone = self
            .drag
            .state()
            .is_some_and(|s| !self.items.iter().any(|i| i.id == s.item_id));
        if dragged_gone {
            self.drag.cancel();
        }
    }

    fn rebuild(&mut self) {
        self.colors = self
            .snapshot
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, palette::project_color(i)))
            .collect();

        let colors = &self.colors;
        let today = self.today;
        self.items = match self.display_mode {
            DisplayMode::Tasks => self
                .filters
                .apply(&self.snapshot.tasks)
                .map(|task| {
                    let color = task
                        .project_id
                        .and_then(|pid| colors.get(&pid).copied())
                        .unwrap_or(UNASSIGNED_COLOR);
                    ScheduleItem::from_task(task, color, today)
                })
                .collect(),
            DisplayMode::Projects => self
                .snapshot
                .projects
                .iter()
                .map(|project| {
                    let color = colors.get(&project.id).copied().unwrap_or(UNASSIGNED_COLOR);
                    ScheduleItem::from_project(project, color, today)
                })
                .collect(),
        };

        self.layout.ensure(
            &self.items,
            &self.snapshot.projects,
            self.display_mode,
            self.row_height,
            |pid| colors.get(&pid).copied().unwrap_or(UNASSIGNED_COLOR),
            UNASSIGNED_COLOR,
        );
        self.recompute_range();
    }

    fn recompute_range(&mut self) {
        let spans = self
            .items
            .iter()
            .filter(|i| i.dated)
            .map(|i| (i.start, i.end));
        self.range = DateRange::covering(spans, &self.config, self.today);
    }

    // ── Pointer routing ─────────────────────────────────────────

    pub fn pointer_down(&mut self, item_id: Uuid, kind: DragKind, pointer_x: f32) -> Result<(), InteractionError> {
        if self.display_mode == DisplayMode::Projects {
            warn!(project = %item_id, "project bars cannot be dragged; only tasks move");
            return Err(InteractionError::NotDraggable(item_id));
        }
        let origin = {
            let item = self.item(item_id).ok_or(InteractionError::UnknownItem(item_id))?;
            let span = self.displayed_span(item);
            ScheduleItem {
                start: span.start,
                end: span.end,
                ..item.clone()
            }
        };
        self.drag.pointer_down(&origin, kind, pointer_x)
    }

    pub fn pointer_move(&mut self, pointer_x: f32) -> Option<DateSpan> {
        self.drag.pointer_move(pointer_x, &self.config)
    }

    /// Finish the gesture and hand the dates to the backend. Returns
    /// immediately; the outcome arrives through [`GanttBoard::poll`].
    pub fn pointer_up(&mut self, pointer_x: f32, backend: &mut dyn ScheduleBackend, now: Instant) -> bool {
        match self.drag.pointer_up(pointer_x, &self.config) {
            Some(request) => {
                self.submit(request, backend, now);
                true
            }
            None => false,
        }
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel().is_some()
    }

    fn submit(&mut self, request: CommitRequest, backend: &mut dyn ScheduleBackend, now: Instant) {
        if let Err(rejection) = self.check_project_period(&request) {
            self.reject(&request, rejection, backend, now);
            return;
        }
        let update = DateUpdate::from(&request);
        info!(
            item = %update.item_id,
            start = %update.start_iso(),
            end = %update.end_iso(),
            "committing new dates"
        );
        self.speculative.insert(request.item_id, request.dates);
        let pending = backend.update_dates(&update);
        self.in_flight.push(InFlight { request, pending });
    }

    /// A task must stay inside its project's period.
    fn check_project_period(&self, request: &CommitRequest) -> Result<(), CommitRejection> {
        if self.display_mode != DisplayMode::Tasks {
            return Ok(());
        }
        let Some(project) = self
            .item(request.item_id)
            .and_then(|item| item.project_id)
            .and_then(|pid| self.snapshot.projects.iter().find(|p| p.id == pid))
        else {
            return Ok(());
        };
        let Some((project_start, project_end)) = project.period() else {
            return Ok(());
        };
        let dates = request.dates;
        if dates.start >= project_start && dates.end <= project_end {
            return Ok(());
        }
        Err(CommitRejection::new("The task must stay within its project's period")
            .with_detail(format!(
                "Project period: {} – {}; requested: {} – {}",
                project_start.format("%d/%m/%Y"),
                project_end.format("%d/%m/%Y"),
                dates.start.format("%d/%m/%Y"),
                dates.end.format("%d/%m/%Y"),
            ))
            .with_suggestion(format!(
                "Move the task inside the period of project \"{}\"",
                project.name
            )))
    }

    /// Roll back a refused edit: re-fetch, flash the row, notify.
    fn reject(&mut self, request: &CommitRequest, rejection: CommitRejection, backend: &mut dyn ScheduleBackend, now: Instant) {
        warn!(item = %request.item_id, error = %rejection, "date commit rejected");
        // A later commit for the same item keeps its own speculative dates.
        if !self.in_flight.iter().any(|c| c.request.item_id == request.item_id) {
            self.speculative.remove(&request.item_id);
            self.settled.remove(&request.item_id);
        }
        self.issue_fetch(backend, RefreshKind::Forced, Some(request.item_id));
        self.toasts
            .push(Notice::from_rejection(&rejection, now + self.timings.toast));
        self.error_surface = Some(Notice::from_rejection(&rejection, now + self.timings.error_surface));
    }

    // ── Per-frame reconciliation ────────────────────────────────

    pub fn poll(&mut self, backend: &mut dyn ScheduleBackend, now: Instant) {
        self.poll_commits(backend, now);
        self.poll_fetch(now);
        if self.refresh_deferred && self.is_idle() {
            self.refresh(backend);
        }
        self.expire(now);
    }

    fn poll_commits(&mut self, backend: &mut dyn ScheduleBackend, now: Instant) {
        let mut settled = Vec::new();
        self.in_flight.retain(|commit| match commit.pending.poll() {
            Poll::Waiting => true,
            Poll::Ready(result) => {
                settled.push((commit.request.clone(), result));
                false
            }
            Poll::Lost => {
                settled.push((
                    commit.request.clone(),
                    Err(CommitRejection::new("The schedule service stopped responding")
                        .with_suggestion("Try the change again in a moment")),
                ));
                false
            }
        });

        for (request, result) in settled {
            match result {
                Ok(()) => {
                    info!(item = %request.item_id, "dates committed");
                    let at = self.next_sequence();
                    self.settled.insert(request.item_id, at);
                    self.refresh_deferred = true;
                }
                Err(rejection) => self.reject(&request, rejection, backend, now),
            }
        }
    }

    fn poll_fetch(&mut self, now: Instant) {
        let outcome = match &self.fetch {
            Some(fetch) => fetch.pending.poll(),
            None => return,
        };
        let result = match outcome {
            Poll::Waiting => return,
            Poll::Ready(result) => result,
            Poll::Lost => Err(BackendError::Disconnected),
        };
        let Some(fetch) = self.fetch.take() else {
            return;
        };

        match result {
            Ok(snapshot) => {
                debug!(kind = ?fetch.kind, issued = fetch.issued, "fetch completed");
                self.install_snapshot(snapshot, fetch.issued);
                let starts_at = now + self.timings.flash_delay;
                for item_id in fetch.flash {
                    self.flashes.push(RowFlash {
                        item_id,
                        starts_at,
                        ends_at: starts_at + self.timings.flash_duration,
                    });
                }
            }
            Err(e) => {
                error!(kind = ?fetch.kind, error = %e, "schedule fetch failed");
                self.toasts.push(Notice {
                    message: "Could not load the schedule".to_string(),
                    detail: Some(e.to_string()),
                    suggestion: Some("Press Refresh to try again".to_string()),
                    rolled_back: false,
                    expires_at: now + self.timings.toast,
                });
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
        if self.error_surface.as_ref().is_some_and(|e| e.expires_at <= now) {
            self.error_surface = None;
        }
        self.flashes.retain(|f| f.ends_at > now);
    }

    pub fn dismiss_error_surface(&mut self) {
        self.error_surface = None;
    }

    pub fn dismiss_toast(&mut self, index: usize) {
        if index < self.toasts.len() {
            self.toasts.remove(index);
        }
    }

    /// How long the host may sleep before the board needs another frame.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        if !self.in_flight.is_empty() || self.fetch.is_some() || !self.flashes.is_empty() {
            return Some(POLL_INTERVAL);
        }
        self.toasts
            .iter()
            .map(|t| t.expires_at)
            .chain(self.error_surface.iter().map(|e| e.expires_at))
            .min()
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
