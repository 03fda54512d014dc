use crate::model::{
    Employee, LimitPhase, Phase, Project, Task, TaskPriority, TaskStatus, WorkHourSegment,
};
use crate::storage::json_store::{FloorState, JsonStore, save_state};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use time::macros::date;
use time::{Date, Time};

pub fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("prodplan-{nanos}-{file_name}"))
}

pub fn seeded_store(file_name: &str, state: &FloorState) -> JsonStore {
    let path = temp_path(file_name);
    save_state(&path, state).unwrap();
    JsonStore::new(path)
}

pub fn cleanup(store: &JsonStore) {
    std::fs::remove_file(store.path()).ok();
}

pub fn project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        name: format!("Project {id}"),
    }
}

pub fn phase(id: &str, project_id: &str, name: &str, progress: u8) -> Phase {
    Phase {
        id: id.to_string(),
        project_id: project_id.to_string(),
        name: name.to_string(),
        start_date: date!(2024 - 06 - 01),
        end_date: date!(2024 - 06 - 30),
        progress,
    }
}

pub fn limit(standard_task_id: &str, phase_name: &str) -> LimitPhase {
    LimitPhase {
        id: format!("limit-{standard_task_id}-{phase_name}"),
        standard_task_id: standard_task_id.to_string(),
        phase_name: phase_name.to_string(),
    }
}

pub fn task(id: &str, phase_id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        phase_id: phase_id.to_string(),
        standard_task_id: None,
        workstation: None,
        status,
        priority: TaskPriority::Medium,
        due_date: None,
        assignee: None,
        status_changed_at: None,
        completed_at: None,
        completed_by: None,
    }
}

pub fn employee(id: &str, role: &str, workstation: Option<&str>) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {id}"),
        role: role.to_string(),
        workstation: workstation.map(str::to_string),
    }
}

pub fn segment(id: &str, date: Date, start: Time, end: Time) -> WorkHourSegment {
    WorkHourSegment {
        id: id.to_string(),
        day_of_week: date.weekday().number_days_from_sunday(),
        start_time: start,
        end_time: end,
        segment_name: id.to_string(),
    }
}

pub fn status_of(store: &JsonStore, task_id: &str) -> TaskStatus {
    store
        .load()
        .unwrap()
        .tasks
        .into_iter()
        .find(|task| task.id == task_id)
        .unwrap()
        .status
}
