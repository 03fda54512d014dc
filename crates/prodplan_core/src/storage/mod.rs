//! Repository seams between the engine and whatever store holds the floor
//! data. Every call is one round trip; nothing is cached between calls.

pub mod json_store;

use crate::error::AppError;
use crate::model::{
    Employee, LimitPhase, Phase, Project, ScheduleEntry, Task, TaskStatus, TaskUpdate,
    TeamAssignment, TruckAssignment, WorkHourSegment, Workstation,
};
use time::Date;

pub trait TaskRepository {
    fn task_by_id(&self, id: &str) -> Result<Option<Task>, AppError>;

    fn tasks_by_status(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, AppError>;

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, AppError>;
}

pub trait PhaseRepository {
    fn phase_by_id(&self, id: &str) -> Result<Option<Phase>, AppError>;

    fn phases_by_project(&self, project_id: &str) -> Result<Vec<Phase>, AppError>;

    /// Phases whose `[start_date, end_date]` contains `date`.
    fn phases_active_on(&self, date: Date) -> Result<Vec<Phase>, AppError>;
}

pub trait ProjectRepository {
    fn project_by_id(&self, id: &str) -> Result<Option<Project>, AppError>;

    fn projects(&self) -> Result<Vec<Project>, AppError>;
}

pub trait LimitPhaseRepository {
    fn limit_phases_by_standard_task(
        &self,
        standard_task_id: &str,
    ) -> Result<Vec<LimitPhase>, AppError>;
}

pub trait EmployeeRepository {
    fn employee_by_id(&self, id: &str) -> Result<Option<Employee>, AppError>;

    /// Full roster in store order.
    fn employees(&self) -> Result<Vec<Employee>, AppError>;
}

pub trait WorkstationRepository {
    fn workstations(&self) -> Result<Vec<Workstation>, AppError>;

    /// Workstations reachable through the employee/workstation join rows.
    fn linked_workstations(&self, employee_id: &str) -> Result<Vec<Workstation>, AppError>;
}

pub trait WorkHourRepository {
    fn work_hours(&self) -> Result<Vec<WorkHourSegment>, AppError>;
}

pub trait ScheduleRepository {
    fn schedules_for_date(&self, date: Date) -> Result<Vec<ScheduleEntry>, AppError>;

    /// Returns the number of removed rows. Manual entries are never touched.
    fn delete_auto_generated_for_date(&self, date: Date) -> Result<usize, AppError>;

    fn bulk_insert(&self, entries: &[ScheduleEntry]) -> Result<(), AppError>;

    /// Swap the auto-generated rows of `date` for `entries`. Stores that can
    /// do this in one write should override it.
    fn replace_auto_generated_for_date(
        &self,
        date: Date,
        entries: &[ScheduleEntry],
    ) -> Result<usize, AppError> {
        let removed = self.delete_auto_generated_for_date(date)?;
        if !entries.is_empty() {
            self.bulk_insert(entries)?;
        }
        Ok(removed)
    }
}

pub trait TeamAssignmentRepository {
    fn team_assignment_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<TeamAssignment>, AppError>;

    fn team_assignments(&self) -> Result<Vec<TeamAssignment>, AppError>;

    /// Insert, or replace the row with the same id.
    fn upsert_team_assignment(&self, assignment: &TeamAssignment) -> Result<(), AppError>;

    fn delete_team_assignment(&self, project_id: &str) -> Result<bool, AppError>;
}

pub trait TruckAssignmentRepository {
    fn truck_assignment_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<TruckAssignment>, AppError>;

    /// Insert, or replace the row with the same id.
    fn upsert_truck_assignment(&self, assignment: &TruckAssignment) -> Result<(), AppError>;

    fn delete_truck_assignment(&self, project_id: &str) -> Result<bool, AppError>;
}

/// Record ids follow the `<prefix>-<unix nanos>` shape used across the store.
pub fn new_record_id(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        time::OffsetDateTime::now_utc().unix_timestamp_nanos()
    )
}
