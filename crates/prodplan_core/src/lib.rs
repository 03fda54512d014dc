pub mod assignment_calendar;
pub mod config;
pub mod delivery;
pub mod dependency;
pub mod error;
pub mod model;
pub mod planner;
pub mod storage;
pub mod task_api;
pub mod work_calendar;
pub mod workstation;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Task, TaskPriority, TaskStatus};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "task-1".to_string(),
            title: "Cut side panels".to_string(),
            phase_id: "phase-1".to_string(),
            standard_task_id: Some("std-1".to_string()),
            workstation: Some("Saw".to_string()),
            status: TaskStatus::Todo,
            priority: TaskPriority::High,
            due_date: None,
            assignee: None,
            status_changed_at: None,
            completed_at: None,
            completed_by: None,
        };

        assert_eq!(task.id, "task-1");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.completed_by, None);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::validation("missing acting employee");
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.message(), "missing acting employee");
        assert_eq!(
            err.to_string(),
            "validation_error - missing acting employee"
        );
        assert_eq!(AppError::not_found("task").code(), "not_found");
    }
}
