use std::path::Path;

use crate::error::GanttError;
use crate::model::ScheduleSnapshot;

/// Save a schedule snapshot to a JSON file.
pub fn save_snapshot(snapshot: &ScheduleSnapshot, path: &Path) -> Result<(), GanttError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a schedule snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<ScheduleSnapshot, GanttError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, ProjectRecord, Status, TaskRecord};
    use uuid::Uuid;

    #[test]
    fn snapshot_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let project = ProjectRecord {
            id: Uuid::new_v4(),
            name: "Office move".into(),
            start_date: Some("2024-04-01".into()),
            end_date: Some("2024-06-30".into()),
            progress: Some(12.0),
            priority: Priority::High,
            status: Status::InProgress,
            manager_name: None,
        };
        let snapshot = ScheduleSnapshot {
            tasks: vec![TaskRecord {
                id: Uuid::new_v4(),
                name: "Pack archives".into(),
                start_date: Some("2024-04-02".into()),
                due_date: None,
                progress: None,
                priority: Priority::Low,
                status: Status::Todo,
                assignee: None,
                project_id: Some(project.id),
                parent_id: None,
            }],
            projects: vec![project],
        };

        save_snapshot(&snapshot, &path).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(load_snapshot(&path), Err(GanttError::Json(_))));
        assert!(matches!(
            load_snapshot(&dir.path().join("missing.json")),
            Err(GanttError::Io(_))
        ));
    }
}
