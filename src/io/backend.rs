//! File-backed stand-in for the external schedule service.
//!
//! Every call is answered from a worker thread after a fixed latency so the
//! UI sees the same asynchronous behavior a remote service would give it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use super::file::{load_snapshot, save_snapshot};
use crate::error::GanttError;
use crate::model::commit::{CommitResult, FetchResult};
use crate::model::item::parse_iso_date;
use crate::model::{
    BackendError, CommitRejection, DateUpdate, Pending, Priority, ProjectRecord, ScheduleBackend,
    ScheduleSnapshot, Status, TaskRecord,
};

pub struct LocalBackend {
    store: Arc<Mutex<ScheduleSnapshot>>,
    latency: Duration,
    path: Option<PathBuf>,
}

impl LocalBackend {
    pub fn new(snapshot: ScheduleSnapshot, latency: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(snapshot)),
            latency,
            path: None,
        }
    }

    /// Load the snapshot at `path` and write every accepted change back to it.
    pub fn open(path: PathBuf, latency: Duration) -> Result<Self, GanttError> {
        let snapshot = load_snapshot(&path)?;
        match task_span(&snapshot) {
            Some((first, last)) => tracing::info!(
                path = %path.display(),
                tasks = snapshot.tasks.len(),
                %first,
                %last,
                "opened schedule file"
            ),
            None => tracing::info!(path = %path.display(), tasks = snapshot.tasks.len(), "opened schedule file"),
        }
        Ok(Self::new(snapshot, latency).persist_to(path))
    }

    pub fn persist_to(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    fn spawn<T, F>(&self, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ScheduleSnapshot) -> T + Send + 'static,
    {
        let (resolver, pending) = Pending::channel();
        let store = Arc::clone(&self.store);
        let latency = self.latency;
        thread::spawn(move || {
            if !latency.is_zero() {
                thread::sleep(latency);
            }
            match store.lock() {
                Ok(mut snapshot) => resolver.resolve(job(&mut snapshot)),
                // Dropping the resolver reports the call as lost.
                Err(_) => tracing::error!("schedule store poisoned"),
            }
        });
        pending
    }
}

impl ScheduleBackend for LocalBackend {
    fn fetch(&mut self) -> Pending<FetchResult> {
        let path = self.path.clone();
        self.spawn(move |snapshot: &mut ScheduleSnapshot| -> FetchResult {
            if let Some(path) = path.filter(|p| p.exists()) {
                *snapshot = load_snapshot(&path).map_err(|e| BackendError::Fetch(e.to_string()))?;
            }
            Ok(snapshot.clone())
        })
    }

    fn update_dates(&mut self, update: &DateUpdate) -> Pending<CommitResult> {
        let update = update.clone();
        let path = self.path.clone();
        self.spawn(move |snapshot: &mut ScheduleSnapshot| -> CommitResult {
            apply_update(snapshot, &update)?;
            if let Some(path) = path {
                save_snapshot(snapshot, &path).map_err(|e| {
                    CommitRejection::new("The change could not be saved")
                        .with_detail(e.to_string())
                        .with_suggestion("Check that the schedule file is writable")
                })?;
            }
            Ok(())
        })
    }
}

/// Validate `update` against the stored records and apply it.
fn apply_update(snapshot: &mut ScheduleSnapshot, update: &DateUpdate) -> CommitResult {
    if update.end < update.start {
        return Err(CommitRejection::new("The end date is before the start date")
            .with_detail(format!("{} → {}", update.start_iso(), update.end_iso())));
    }

    if let Some(project) = snapshot.projects.iter_mut().find(|p| p.id == update.item_id) {
        project.start_date = Some(update.start_iso());
        project.end_date = Some(update.end_iso());
        return Ok(());
    }

    let Some(task_index) = snapshot.tasks.iter().position(|t| t.id == update.item_id) else {
        return Err(CommitRejection::new("This item no longer exists")
            .with_suggestion("Refresh the timeline"));
    };

    let period = snapshot.tasks[task_index]
        .project_id
        .and_then(|pid| snapshot.projects.iter().find(|p| p.id == pid))
        .and_then(|p| p.period().map(|period| (p.name.clone(), period)));
    if let Some((name, (start, end))) = period {
        if update.start < start || update.end > end {
            return Err(CommitRejection::new("The task must stay within its project's period")
                .with_detail(format!(
                    "Project period: {} – {}",
                    start.format("%d/%m/%Y"),
                    end.format("%d/%m/%Y")
                ))
                .with_suggestion(format!("Move the task inside the period of project \"{name}\"")));
        }
    }

    let task = &mut snapshot.tasks[task_index];
    task.start_date = Some(update.start_iso());
    task.due_date = Some(update.end_iso());
    tracing::debug!(task = %task.id, "stored new dates");
    Ok(())
}

/// A small demo schedule around `today`.
pub fn sample_snapshot(today: NaiveDate) -> ScheduleSnapshot {
    let day = |offset: i64| (today + chrono::Duration::days(offset)).format("%Y-%m-%d").to_string();

    let project = |name: &str, start: i64, end: i64, progress: f32, status: Status, manager: &str| ProjectRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        start_date: Some(day(start)),
        end_date: Some(day(end)),
        progress: Some(progress),
        priority: Priority::Medium,
        status,
        manager_name: Some(manager.to_string()),
    };
    let platform = project("Platform Migration", -20, 45, 0.0, Status::InProgress, "Maya Chen");
    let hiring = project("Spring Hiring", -5, 60, 25.0, Status::Planning, "Tom Okafor");

    let task = |name: &str, project: Option<Uuid>, parent: Option<Uuid>, start: i64, due: i64, progress: f32| TaskRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        start_date: Some(day(start)),
        due_date: Some(day(due)),
        progress: Some(progress),
        priority: Priority::Medium,
        status: if progress >= 100.0 {
            Status::Done
        } else if progress > 0.0 {
            Status::InProgress
        } else {
            Status::Todo
        },
        assignee: None,
        project_id: project,
        parent_id: parent,
    };

    let mut audit = task("Infrastructure audit", Some(platform.id), None, -18, -4, 100.0);
    audit.assignee = Some("Maya Chen".into());
    audit.priority = Priority::High;
    let inventory = task("Service inventory", Some(platform.id), Some(audit.id), -18, -10, 100.0);
    let risks = task("Risk register", Some(platform.id), Some(audit.id), -10, -4, 100.0);

    let mut cutover = task("Database cutover", Some(platform.id), None, -2, 20, 35.0);
    cutover.assignee = Some("Luis Ortega".into());
    cutover.priority = Priority::Urgent;
    let replicas = task("Replica setup", Some(platform.id), Some(cutover.id), -2, 6, 80.0);
    let dry_run = task("Dry run", Some(platform.id), Some(cutover.id), 7, 14, 0.0);

    let mut decommission = task("Decommission legacy hosts", Some(platform.id), None, 25, 42, 0.0);
    decommission.status = Status::Blocked;

    let mut postings = task("Publish job postings", Some(hiring.id), None, -4, 3, 60.0);
    postings.assignee = Some("Tom Okafor".into());
    let mut interviews = task("Interview loop", Some(hiring.id), None, 5, 40, 0.0);
    interviews.priority = Priority::High;
    let onboarding = task("Onboarding plan", Some(hiring.id), None, 35, 58, 0.0);

    let mut handbook = task("Update handbook", None, None, 0, 12, 10.0);
    handbook.priority = Priority::Low;
    handbook.status = Status::Review;

    ScheduleSnapshot {
        projects: vec![platform, hiring],
        tasks: vec![
            audit,
            inventory,
            risks,
            cutover,
            replicas,
            dry_run,
            decommission,
            postings,
            interviews,
            onboarding,
            handbook,
        ],
    }
}

/// Earliest task start and latest task due date in `snapshot`.
pub fn task_span(snapshot: &ScheduleSnapshot) -> Option<(NaiveDate, NaiveDate)> {
    let starts = snapshot.tasks.iter().filter_map(|t| parse_iso_date(t.start_date.as_deref()?));
    let ends = snapshot.tasks.iter().filter_map(|t| parse_iso_date(t.due_date.as_deref()?));
    Some((starts.min()?, ends.max()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Poll;

    fn wait<T>(pending: Pending<T>) -> T {
        for _ in 0..500 {
            match pending.poll() {
                Poll::Ready(value) => return value,
                Poll::Waiting => thread::sleep(Duration::from_millis(5)),
                Poll::Lost => panic!("backend dropped the call"),
            }
        }
        panic!("backend did not answer in time");
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn update(item_id: Uuid, start: NaiveDate, end: NaiveDate) -> DateUpdate {
        DateUpdate { item_id, start, end }
    }

    #[test]
    fn accepted_update_shows_up_in_next_fetch() {
        let snapshot = sample_snapshot(d(2024, 5, 1));
        let task = snapshot.tasks[3].clone();
        let mut backend = LocalBackend::new(snapshot, Duration::ZERO);

        let result = wait(backend.update_dates(&update(task.id, d(2024, 5, 2), d(2024, 5, 9))));
        assert_eq!(result, Ok(()));

        let fetched = wait(backend.fetch()).unwrap();
        let stored = fetched.tasks.iter().find(|t| t.id == task.id).unwrap();
        assert_eq!(stored.start_date.as_deref(), Some("2024-05-02"));
        assert_eq!(stored.due_date.as_deref(), Some("2024-05-09"));
    }

    #[test]
    fn refuses_unknown_items_and_inverted_spans() {
        let mut backend = LocalBackend::new(sample_snapshot(d(2024, 5, 1)), Duration::ZERO);
        let unknown = wait(backend.update_dates(&update(Uuid::new_v4(), d(2024, 5, 1), d(2024, 5, 2))));
        assert_eq!(unknown.unwrap_err().message, "This item no longer exists");

        let id = backend.store.lock().unwrap().tasks[0].id;
        let inverted = wait(backend.update_dates(&update(id, d(2024, 5, 3), d(2024, 5, 1))));
        assert!(inverted.is_err());
    }

    #[test]
    fn refuses_moves_outside_the_project() {
        let today = d(2024, 5, 1);
        let snapshot = sample_snapshot(today);
        let onboarding = snapshot.tasks.iter().find(|t| t.name == "Onboarding plan").unwrap().id;
        let mut backend = LocalBackend::new(snapshot, Duration::ZERO);

        let rejection = wait(backend.update_dates(&update(onboarding, d(2024, 6, 20), d(2024, 7, 20)))).unwrap_err();
        assert!(rejection.suggestion.unwrap().contains("Spring Hiring"));
    }

    #[test]
    fn writes_changes_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let snapshot = sample_snapshot(d(2024, 5, 1));
        save_snapshot(&snapshot, &path).unwrap();

        let task = snapshot.tasks.last().unwrap().id;
        let mut backend = LocalBackend::open(path.clone(), Duration::from_millis(1)).unwrap();
        wait(backend.update_dates(&update(task, d(2024, 5, 10), d(2024, 5, 11)))).unwrap();

        let on_disk = load_snapshot(&path).unwrap();
        let stored = on_disk.tasks.iter().find(|t| t.id == task).unwrap();
        assert_eq!(stored.start_date.as_deref(), Some("2024-05-10"));
    }

    #[test]
    fn sample_schedule_is_well_formed() {
        let today = d(2024, 5, 1);
        let snapshot = sample_snapshot(today);
        assert_eq!(snapshot.projects.len(), 2);
        for task in &snapshot.tasks {
            if let Some(pid) = task.project_id {
                let (start, end) = snapshot.projects.iter().find(|p| p.id == pid).unwrap().period().unwrap();
                let task_start = parse_iso_date(task.start_date.as_deref().unwrap()).unwrap();
                let task_end = parse_iso_date(task.due_date.as_deref().unwrap()).unwrap();
                assert!(start <= task_start && task_end <= end, "{}", task.name);
            }
        }
        assert_eq!(task_span(&snapshot), Some((d(2024, 4, 13), d(2024, 6, 28))));
    }
}
