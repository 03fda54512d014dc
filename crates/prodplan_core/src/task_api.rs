use crate::dependency;
use crate::error::AppError;
use crate::model::{Task, TaskStatus, TaskUpdate};
use crate::storage::{
    EmployeeRepository, LimitPhaseRepository, PhaseRepository, TaskRepository,
    WorkstationRepository,
};
use crate::workstation;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

/// A requested status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: TaskStatus,
    /// Employee performing the write; required to complete a task.
    pub acting_employee: Option<String>,
    pub assignee: Option<String>,
}

impl StatusChange {
    pub fn to(status: TaskStatus) -> Self {
        Self {
            status,
            acting_employee: None,
            assignee: None,
        }
    }

    pub fn by(mut self, employee_id: &str) -> Self {
        self.acting_employee = Some(employee_id.to_string());
        self
    }

    pub fn assigned_to(mut self, employee_id: &str) -> Self {
        self.assignee = Some(employee_id.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub task: Task,
    pub requested: TaskStatus,
}

impl TransitionOutcome {
    /// The write landed on HOLD although something else was asked for.
    pub fn downgraded(&self) -> bool {
        self.task.status == TaskStatus::Hold && self.requested != TaskStatus::Hold
    }
}

pub fn get_task<S: TaskRepository>(store: &S, id: &str) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::validation("id is required"));
    }

    store
        .task_by_id(trimmed_id)?
        .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))
}

/// Apply a status write.
///
/// Moving to TODO, or out of HOLD, consults the limit-phase gate; when the
/// gate is closed the task lands on HOLD instead and no error is raised.
/// Completing requires an acting employee. Every write stamps
/// `status_changed_at`.
pub fn transition_task<S>(
    store: &S,
    id: &str,
    change: &StatusChange,
) -> Result<TransitionOutcome, AppError>
where
    S: TaskRepository + PhaseRepository + LimitPhaseRepository,
{
    if change.status == TaskStatus::Hold {
        return Err(AppError::validation(
            "hold is applied automatically and cannot be requested",
        ));
    }

    let task = get_task(store, id)?;
    let acting_employee = non_blank(change.acting_employee.as_deref());
    let assignee = non_blank(change.assignee.as_deref());

    if change.status == TaskStatus::Completed && acting_employee.is_none() {
        return Err(AppError::validation(
            "acting employee is required to complete a task",
        ));
    }

    let leaving_hold = task.status == TaskStatus::Hold && change.status == TaskStatus::InProgress;
    let mut status = change.status;
    if (status == TaskStatus::Todo || leaving_hold)
        && let Some(standard_task_id) = task.standard_task_id.as_deref()
    {
        let project_id = project_of(store, &task)?;
        if !dependency::is_satisfied(store, standard_task_id, &project_id)? {
            warn!(
                task_id = %task.id,
                standard_task_id,
                project_id = %project_id,
                requested = change.status.as_str(),
                "limit phases incomplete, holding task"
            );
            status = TaskStatus::Hold;
        }
    }

    if status == TaskStatus::InProgress && assignee.is_none() && task.assignee.is_none() {
        warn!(task_id = %task.id, "task started without an assignee");
    }

    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    let mut update = TaskUpdate {
        status: Some(status),
        status_changed_at: Some(now.clone()),
        assignee,
        ..TaskUpdate::default()
    };
    if status == TaskStatus::Completed {
        update.completed_at = Some(now);
        update.completed_by = acting_employee;
    }

    let updated = store.update_task(&task.id, &update)?;
    info!(
        task_id = %updated.id,
        from = task.status.as_str(),
        to = updated.status.as_str(),
        "task status written"
    );

    Ok(TransitionOutcome {
        task: updated,
        requested: change.status,
    })
}

/// Open tasks an employee can pick up at their resolved workstations,
/// highest priority first.
pub fn tasks_for_employee<S>(store: &S, employee_id: &str) -> Result<Vec<Task>, AppError>
where
    S: TaskRepository + EmployeeRepository + WorkstationRepository,
{
    let workstations = workstation::workstations_for_employee(store, employee_id)?;
    if workstations.is_empty() {
        return Ok(Vec::new());
    }

    let mut tasks: Vec<Task> = store
        .tasks_by_status(&TaskStatus::ASSIGNABLE)?
        .into_iter()
        .filter(|task| {
            task.workstation.as_deref().is_some_and(|name| {
                workstations
                    .iter()
                    .any(|station| workstation::same_name(&station.name, name))
            })
        })
        .collect();
    tasks.sort_by(|a, b| b.priority.cmp(&a.priority));

    Ok(tasks)
}

fn project_of<S: PhaseRepository>(store: &S, task: &Task) -> Result<String, AppError> {
    store
        .phase_by_id(&task.phase_id)?
        .map(|phase| phase.project_id)
        .ok_or_else(|| AppError::not_found(format!("phase {} not found", task.phase_id)))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
