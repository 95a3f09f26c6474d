use chrono::NaiveDate;
use uuid::Uuid;

use super::item::{parse_iso_date, Priority, Status, TaskRecord};

/// Task filters. Empty lists mean "any"; only applied in tasks mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub search: String,
    pub statuses: Vec<Status>,
    pub priorities: Vec<Priority>,
    pub assignees: Vec<String>,
    pub projects: Vec<Uuid>,
    /// Keep tasks ending on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Keep tasks starting on or before this date.
    pub date_to: Option<NaiveDate>,
}

impl TaskFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let in_name = task.name.to_lowercase().contains(&needle);
            let in_assignee = task
                .assignee
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle));
            if !in_name && !in_assignee {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        if !self.assignees.is_empty() {
            let Some(assignee) = task.assignee.as_deref() else {
                return false;
            };
            if !self.assignees.iter().any(|a| a == assignee) {
                return false;
            }
        }
        if !self.projects.is_empty() && !task.project_id.is_some_and(|p| self.projects.contains(&p)) {
            return false;
        }
        if let Some(from) = self.date_from {
            let due = task.due_date.as_deref().and_then(parse_iso_date);
            if due.is_some_and(|due| due < from) {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            let start = task.start_date.as_deref().and_then(parse_iso_date);
            if start.is_some_and(|start| start > to) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&'a self, tasks: &'a [TaskRecord]) -> impl Iterator<Item = &'a TaskRecord> + 'a {
        tasks.iter().filter(move |t| self.matches(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, assignee: Option<&str>) -> TaskRecord {
        TaskRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: Some("2024-05-01".into()),
            due_date: Some("2024-05-10".into()),
            progress: None,
            priority: Priority::Medium,
            status: Status::Todo,
            assignee: assignee.map(str::to_string),
            project_id: None,
            parent_id: None,
        }
    }

    #[test]
    fn empty_filters_keep_everything() {
        let filters = TaskFilters::default();
        assert!(filters.is_empty());
        assert!(filters.matches(&task("a", None)));
    }

    #[test]
    fn search_checks_name_and_assignee() {
        let filters = TaskFilters {
            search: "ines".into(),
            ..Default::default()
        };
        assert!(!filters.matches(&task("Review", Some("Inès"))));
        assert!(filters.matches(&task("Review", Some("Ines Diallo"))));
        assert!(filters.matches(&task("Business plan", None)));
        assert!(!filters.matches(&task("Budget", None)));
    }

    #[test]
    fn date_window_keeps_overlapping_tasks() {
        let t = task("a", None);
        let overlapping = TaskFilters {
            date_from: NaiveDate::from_ymd_opt(2024, 5, 5),
            date_to: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        };
        assert!(overlapping.matches(&t));

        let later = TaskFilters {
            date_from: NaiveDate::from_ymd_opt(2024, 5, 11),
            ..Default::default()
        };
        assert!(!later.matches(&t));
    }

    #[test]
    fn project_and_status_lists_restrict() {
        let pid = Uuid::new_v4();
        let mut t = task("a", Some("Kofi"));
        t.project_id = Some(pid);
        t.status = Status::Done;

        let filters = TaskFilters {
            projects: vec![pid],
            statuses: vec![Status::Done, Status::Review],
            assignees: vec!["Kofi".into()],
            ..Default::default()
        };
        assert!(filters.matches(&t));

        t.status = Status::Todo;
        assert!(!filters.matches(&t));
        assert_eq!(filters.apply(std::slice::from_ref(&t)).count(), 0);
    }
}
