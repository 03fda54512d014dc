use super::iso_date;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub phase_id: String,
    #[serde(default)]
    pub standard_task_id: Option<String>,
    #[serde(default)]
    pub workstation: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub status_changed_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub completed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Hold,
}

impl TaskStatus {
    /// Statuses the planner and dashboards treat as open work.
    pub const ASSIGNABLE: [TaskStatus; 2] = [TaskStatus::Todo, TaskStatus::InProgress];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Hold => "hold",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            "hold" => Ok(Self::Hold),
            _ => Err(AppError::validation(format!("unknown task status '{raw}'"))),
        }
    }
}

/// Variant order is significant: `Urgent` compares greatest.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Partial write against a stored task. `None` leaves the field untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub status_changed_at: Option<String>,
    pub completed_at: Option<String>,
    pub completed_by: Option<String>,
    pub assignee: Option<String>,
}

impl TaskUpdate {
    pub fn apply(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(value) = self.status_changed_at.as_ref() {
            task.status_changed_at = Some(value.clone());
        }
        if let Some(value) = self.completed_at.as_ref() {
            task.completed_at = Some(value.clone());
        }
        if let Some(value) = self.completed_by.as_ref() {
            task.completed_by = Some(value.clone());
        }
        if let Some(value) = self.assignee.as_ref() {
            task.assignee = Some(value.clone());
        }
    }
}
