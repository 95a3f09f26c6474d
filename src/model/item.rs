use chrono::{NaiveDate, NaiveDateTime};
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task/project priority as reported by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

/// Workflow status shared by tasks and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    Planning,
    #[serde(alias = "active")]
    InProgress,
    Review,
    #[serde(alias = "on_hold")]
    Blocked,
    #[serde(alias = "completed")]
    Done,
    Cancelled,
    #[serde(other)]
    Other,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Todo,
        Status::Planning,
        Status::InProgress,
        Status::Review,
        Status::Blocked,
        Status::Done,
        Status::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "To do",
            Status::Planning => "Planning",
            Status::InProgress => "In progress",
            Status::Review => "Review",
            Status::Blocked => "Blocked",
            Status::Done => "Done",
            Status::Cancelled => "Cancelled",
            Status::Other => "Other",
        }
    }
}

/// A task as delivered by the host's data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "assigned_name")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// A project as delivered by the host's data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_project_status")]
    pub status: Status,
    #[serde(default)]
    pub manager_name: Option<String>,
}

fn default_project_status() -> Status {
    Status::Planning
}

impl ProjectRecord {
    /// The project's period, when both ends parse.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_iso_date(self.start_date.as_deref()?)?;
        let end = parse_iso_date(self.end_date.as_deref()?)?;
        Some((start, end))
    }
}

/// Everything one fetch returns. `projects` is in authoritative order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// A bar on the timeline: either a task or, in projects mode, a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Percent complete, 0–100.
    pub progress: f32,
    pub color: Color32,
    pub assignee: String,
    pub priority: Priority,
    pub status: Status,
    pub parent_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    /// False when a missing or malformed date was replaced by a fallback.
    pub dated: bool,
}

impl ScheduleItem {
    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn from_task(record: &TaskRecord, color: Color32, today: NaiveDate) -> Self {
        let (start, end, dated) = resolve_span(
            record.start_date.as_deref(),
            record.due_date.as_deref(),
            today,
        );
        if !dated {
            tracing::warn!(task = %record.id, "task has missing or invalid dates, using fallback");
        }
        Self {
            id: record.id,
            name: record.name.clone(),
            start,
            end,
            progress: clamp_progress(record.progress),
            color,
            assignee: record
                .assignee
                .clone()
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
            priority: record.priority,
            status: record.status,
            parent_id: record.parent_id,
            project_id: record.project_id,
            dated,
        }
    }

    pub fn from_project(record: &ProjectRecord, color: Color32, today: NaiveDate) -> Self {
        let (start, end, dated) = resolve_span(
            record.start_date.as_deref(),
            record.end_date.as_deref(),
            today,
        );
        Self {
            id: record.id,
            name: record.name.clone(),
            start,
            end,
            progress: clamp_progress(record.progress),
            color,
            assignee: record
                .manager_name
                .clone()
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
            priority: record.priority,
            status: record.status,
            parent_id: None,
            project_id: Some(record.id),
            dated,
        }
    }
}

pub const UNASSIGNED_LABEL: &str = "Unassigned";

fn clamp_progress(progress: Option<f32>) -> f32 {
    progress
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
}

/// Parse `YYYY-MM-DD`, or the date part of an ISO datetime.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Turn raw start/end strings into an ordered span.
///
/// A missing end collapses onto the start, a missing start onto the end, and
/// both missing fall back to `today`. A reversed pair is clamped to `start`.
fn resolve_span(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> (NaiveDate, NaiveDate, bool) {
    let start = start.and_then(parse_iso_date);
    let end = end.and_then(parse_iso_date);
    let dated = start.is_some() && end.is_some();
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s),
        (None, Some(e)) => (e, e),
        (None, None) => (today, today),
    };
    if end < start {
        tracing::warn!(%start, %end, "end date precedes start date, clamping");
        return (start, start, dated);
    }
    (start, end, dated)
}
