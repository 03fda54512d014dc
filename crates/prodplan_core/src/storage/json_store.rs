use crate::error::AppError;
use crate::model::{
    Employee, EmployeeWorkstationLink, LimitPhase, Phase, Project, ScheduleEntry, StandardTask,
    Task, TaskStatus, TaskUpdate, TeamAssignment, TruckAssignment, WorkHourSegment, Workstation,
};
use crate::storage::{
    EmployeeRepository, LimitPhaseRepository, PhaseRepository, ProjectRepository,
    ScheduleRepository, TaskRepository, TeamAssignmentRepository, TruckAssignmentRepository,
    WorkHourRepository, WorkstationRepository,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Date;

pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "floor.json";
pub const STORE_ENV_VAR: &str = "PRODPLAN_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredFloor {
    schema_version: u32,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    phases: Vec<Phase>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    standard_tasks: Vec<StandardTask>,
    #[serde(default)]
    limit_phases: Vec<LimitPhase>,
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    workstations: Vec<Workstation>,
    #[serde(default)]
    employee_workstations: Vec<EmployeeWorkstationLink>,
    #[serde(default)]
    work_hours: Vec<WorkHourSegment>,
    #[serde(default)]
    schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    team_assignments: Vec<TeamAssignment>,
    #[serde(default)]
    truck_assignments: Vec<TruckAssignment>,
}

impl StoredFloor {
    fn from_state(state: &FloorState) -> Self {
        let state = state.clone();
        Self {
            schema_version: SCHEMA_VERSION,
            projects: state.projects,
            phases: state.phases,
            tasks: state.tasks,
            standard_tasks: state.standard_tasks,
            limit_phases: state.limit_phases,
            employees: state.employees,
            workstations: state.workstations,
            employee_workstations: state.employee_workstations,
            work_hours: state.work_hours,
            schedules: state.schedules,
            team_assignments: state.team_assignments,
            truck_assignments: state.truck_assignments,
        }
    }

    fn into_state(self) -> FloorState {
        FloorState {
            projects: self.projects,
            phases: self.phases,
            tasks: self.tasks,
            standard_tasks: self.standard_tasks,
            limit_phases: self.limit_phases,
            employees: self.employees,
            workstations: self.workstations,
            employee_workstations: self.employee_workstations,
            work_hours: self.work_hours,
            schedules: self.schedules,
            team_assignments: self.team_assignments,
            truck_assignments: self.truck_assignments,
        }
    }
}

/// Whole-document view of the floor store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorState {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub standard_tasks: Vec<StandardTask>,
    #[serde(default)]
    pub limit_phases: Vec<LimitPhase>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub workstations: Vec<Workstation>,
    #[serde(default)]
    pub employee_workstations: Vec<EmployeeWorkstationLink>,
    #[serde(default)]
    pub work_hours: Vec<WorkHourSegment>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub team_assignments: Vec<TeamAssignment>,
    #[serde(default)]
    pub truck_assignments: Vec<TruckAssignment>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("prodplan").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("prodplan")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<FloorState, AppError> {
    if !path.exists() {
        return Ok(FloorState::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredFloor =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    if stored.phases.iter().any(|phase| phase.progress > 100) {
        return Err(AppError::invalid_data("phase progress must be within 0..=100"));
    }
    if let Some(assignment) = stored
        .team_assignments
        .iter()
        .find(|assignment| assignment.duration_days == 0)
    {
        return Err(AppError::invalid_data(format!(
            "team assignment for project {} has a zero duration",
            assignment.project_id
        )));
    }

    Ok(stored.into_state())
}

pub fn save_state(path: &Path, state: &FloorState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredFloor::from_state(state);
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// File-backed store. Each repository call reads the document; writes read,
/// modify and rewrite it in one step.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<FloorState, AppError> {
        load_state(&self.path)
    }

    fn modify<T>(
        &self,
        change: impl FnOnce(&mut FloorState) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut state = self.load()?;
        let outcome = change(&mut state)?;
        save_state(&self.path, &state)?;
        Ok(outcome)
    }
}

impl TaskRepository for JsonStore {
    fn task_by_id(&self, id: &str) -> Result<Option<Task>, AppError> {
        Ok(self.load()?.tasks.into_iter().find(|task| task.id == id))
    }

    fn tasks_by_status(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, AppError> {
        Ok(self
            .load()?
            .tasks
            .into_iter()
            .filter(|task| statuses.contains(&task.status))
            .collect())
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, AppError> {
        self.modify(|state| {
            let task = state
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| AppError::not_found(format!("task {id} not found")))?;
            update.apply(task);
            Ok(task.clone())
        })
    }
}

impl PhaseRepository for JsonStore {
    fn phase_by_id(&self, id: &str) -> Result<Option<Phase>, AppError> {
        Ok(self.load()?.phases.into_iter().find(|phase| phase.id == id))
    }

    fn phases_by_project(&self, project_id: &str) -> Result<Vec<Phase>, AppError> {
        Ok(self
            .load()?
            .phases
            .into_iter()
            .filter(|phase| phase.project_id == project_id)
            .collect())
    }

    fn phases_active_on(&self, date: Date) -> Result<Vec<Phase>, AppError> {
        Ok(self
            .load()?
            .phases
            .into_iter()
            .filter(|phase| phase.is_active_on(date))
            .collect())
    }
}

impl ProjectRepository for JsonStore {
    fn project_by_id(&self, id: &str) -> Result<Option<Project>, AppError> {
        Ok(self
            .load()?
            .projects
            .into_iter()
            .find(|project| project.id == id))
    }

    fn projects(&self) -> Result<Vec<Project>, AppError> {
        Ok(self.load()?.projects)
    }
}

impl LimitPhaseRepository for JsonStore {
    fn limit_phases_by_standard_task(
        &self,
        standard_task_id: &str,
    ) -> Result<Vec<LimitPhase>, AppError> {
        Ok(self
            .load()?
            .limit_phases
            .into_iter()
            .filter(|limit| limit.standard_task_id == standard_task_id)
            .collect())
    }
}

impl EmployeeRepository for JsonStore {
    fn employee_by_id(&self, id: &str) -> Result<Option<Employee>, AppError> {
        Ok(self
            .load()?
            .employees
            .into_iter()
            .find(|employee| employee.id == id))
    }

    fn employees(&self) -> Result<Vec<Employee>, AppError> {
        Ok(self.load()?.employees)
    }
}

impl WorkstationRepository for JsonStore {
    fn workstations(&self) -> Result<Vec<Workstation>, AppError> {
        Ok(self.load()?.workstations)
    }

    fn linked_workstations(&self, employee_id: &str) -> Result<Vec<Workstation>, AppError> {
        let state = self.load()?;
        let linked = state
            .employee_workstations
            .iter()
            .filter(|link| link.employee_id == employee_id)
            .filter_map(|link| {
                state
                    .workstations
                    .iter()
                    .find(|workstation| workstation.id == link.workstation_id)
                    .cloned()
            })
            .collect();
        Ok(linked)
    }
}

impl WorkHourRepository for JsonStore {
    fn work_hours(&self) -> Result<Vec<WorkHourSegment>, AppError> {
        Ok(self.load()?.work_hours)
    }
}

impl ScheduleRepository for JsonStore {
    fn schedules_for_date(&self, date: Date) -> Result<Vec<ScheduleEntry>, AppError> {
        Ok(self
            .load()?
            .schedules
            .into_iter()
            .filter(|entry| entry.date == date)
            .collect())
    }

    fn delete_auto_generated_for_date(&self, date: Date) -> Result<usize, AppError> {
        self.modify(|state| Ok(remove_auto_generated(state, date)))
    }

    fn bulk_insert(&self, entries: &[ScheduleEntry]) -> Result<(), AppError> {
        self.modify(|state| {
            state.schedules.extend_from_slice(entries);
            Ok(())
        })
    }

    fn replace_auto_generated_for_date(
        &self,
        date: Date,
        entries: &[ScheduleEntry],
    ) -> Result<usize, AppError> {
        self.modify(|state| {
            let removed = remove_auto_generated(state, date);
            state.schedules.extend_from_slice(entries);
            Ok(removed)
        })
    }
}

fn remove_auto_generated(state: &mut FloorState, date: Date) -> usize {
    let before = state.schedules.len();
    state
        .schedules
        .retain(|entry| !(entry.date == date && entry.is_auto_generated));
    before - state.schedules.len()
}

impl TeamAssignmentRepository for JsonStore {
    fn team_assignment_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<TeamAssignment>, AppError> {
        Ok(self
            .load()?
            .team_assignments
            .into_iter()
            .find(|assignment| assignment.project_id == project_id))
    }

    fn team_assignments(&self) -> Result<Vec<TeamAssignment>, AppError> {
        Ok(self.load()?.team_assignments)
    }

    fn upsert_team_assignment(&self, assignment: &TeamAssignment) -> Result<(), AppError> {
        self.modify(|state| {
            match state
                .team_assignments
                .iter_mut()
                .find(|existing| existing.id == assignment.id)
            {
                Some(existing) => *existing = assignment.clone(),
                None => state.team_assignments.push(assignment.clone()),
            }
            Ok(())
        })
    }

    fn delete_team_assignment(&self, project_id: &str) -> Result<bool, AppError> {
        self.modify(|state| {
            let before = state.team_assignments.len();
            state
                .team_assignments
                .retain(|assignment| assignment.project_id != project_id);
            Ok(state.team_assignments.len() != before)
        })
    }
}

impl TruckAssignmentRepository for JsonStore {
    fn truck_assignment_by_project(
        &self,
        project_id: &str,
    ) -> Result<Option<TruckAssignment>, AppError> {
        Ok(self
            .load()?
            .truck_assignments
            .into_iter()
            .find(|assignment| assignment.project_id == project_id))
    }

    fn upsert_truck_assignment(&self, assignment: &TruckAssignment) -> Result<(), AppError> {
        self.modify(|state| {
            match state
                .truck_assignments
                .iter_mut()
                .find(|existing| existing.id == assignment.id)
            {
                Some(existing) => *existing = assignment.clone(),
                None => state.truck_assignments.push(assignment.clone()),
            }
            Ok(())
        })
    }

    fn delete_truck_assignment(&self, project_id: &str) -> Result<bool, AppError> {
        self.modify(|state| {
            let before = state.truck_assignments.len();
            state
                .truck_assignments
                .retain(|assignment| assignment.project_id != project_id);
            Ok(state.truck_assignments.len() != before)
        })
    }
}
