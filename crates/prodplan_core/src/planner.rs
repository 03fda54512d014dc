//! Daily auto-planner.
//!
//! For one date the planner walks the configured work windows and hands out
//! work greedily: first open tasks to employees whose workstation matches the
//! task, then active phases to whoever is still idle, paired by position.
//! Only auto-generated rows are replaced; manual schedule entries survive.

use crate::error::AppError;
use crate::model::{Employee, Phase, ScheduleEntry, Task, TaskStatus, WorkHourSegment};
use crate::storage::{
    EmployeeRepository, PhaseRepository, ScheduleRepository, TaskRepository, WorkHourRepository,
    new_record_id,
};
use crate::work_calendar::WorkCalendar;
use crate::workstation::same_name;
use std::collections::HashSet;
use time::Date;
use tracing::{debug, info};

const WORKSTATION_TAG: &str = "workstation:";

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub date: Date,
    pub segments: usize,
    pub entries: Vec<ScheduleEntry>,
    /// Auto-generated rows removed before the new plan was written.
    pub removed: usize,
}

/// Rebuild the auto-generated schedule of `date`.
///
/// Days without work hours are left untouched. Any store error aborts the
/// run; re-running is safe.
pub fn generate_daily_plan<S>(store: &S, date: Date) -> Result<PlanOutcome, AppError>
where
    S: WorkHourRepository
        + TaskRepository
        + PhaseRepository
        + EmployeeRepository
        + ScheduleRepository,
{
    let segments = WorkCalendar::load(store)?.segments_on(date);
    if segments.is_empty() {
        info!(%date, "no work hours configured, skipping plan");
        return Ok(PlanOutcome {
            date,
            segments: 0,
            entries: Vec::new(),
            removed: 0,
        });
    }

    let mut tasks = store.tasks_by_status(&TaskStatus::ASSIGNABLE)?;
    tasks.sort_by(|a, b| b.priority.cmp(&a.priority));

    let phases: Vec<Phase> = store
        .phases_active_on(date)?
        .into_iter()
        .filter(|phase| !phase.is_complete())
        .collect();
    let employees = store.employees()?;

    let entries = build_plan(date, &segments, &tasks, &phases, &employees);
    let removed = store.replace_auto_generated_for_date(date, &entries)?;

    info!(
        %date,
        segments = segments.len(),
        entries = entries.len(),
        removed,
        "daily plan written"
    );

    Ok(PlanOutcome {
        date,
        segments: segments.len(),
        entries,
        removed,
    })
}

pub fn schedule_for_date<S: ScheduleRepository>(
    store: &S,
    date: Date,
) -> Result<Vec<ScheduleEntry>, AppError> {
    let mut entries = store.schedules_for_date(date)?;
    entries.sort_by_key(|entry| entry.start_time);
    Ok(entries)
}

/// Pure planning step. `tasks` must already be in claim order.
pub fn build_plan(
    date: Date,
    segments: &[WorkHourSegment],
    tasks: &[Task],
    phases: &[Phase],
    employees: &[Employee],
) -> Vec<ScheduleEntry> {
    let batch = new_record_id("sched");
    let mut entries = Vec::new();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut busy: Vec<HashSet<&str>> = vec![HashSet::new(); segments.len()];

    for (index, segment) in segments.iter().enumerate() {
        for employee in employees {
            let Some(workstation) = employee.legacy_workstation() else {
                continue;
            };
            let Some(task) = tasks.iter().find(|task| {
                !claimed.contains(task.id.as_str())
                    && task.workstation.as_deref().map(str::trim) == Some(workstation)
            }) else {
                continue;
            };

            claimed.insert(task.id.as_str());
            busy[index].insert(employee.id.as_str());
            debug!(employee_id = %employee.id, task_id = %task.id, segment = %segment.segment_name, "task slot");
            entries.push(ScheduleEntry {
                id: format!("{batch}-{}", entries.len()),
                employee_id: employee.id.clone(),
                date,
                task_id: Some(task.id.clone()),
                phase_id: None,
                title: task.title.clone(),
                start_time: segment.start_time,
                end_time: segment.end_time,
                is_auto_generated: true,
            });
        }
    }

    for (index, segment) in segments.iter().enumerate() {
        let idle = employees
            .iter()
            .filter(|employee| !busy[index].contains(employee.id.as_str()));

        for (employee, phase) in idle.zip(phases.iter()) {
            if !phase_accepts(phase, employee) {
                continue;
            }

            debug!(employee_id = %employee.id, phase_id = %phase.id, segment = %segment.segment_name, "phase slot");
            entries.push(ScheduleEntry {
                id: format!("{batch}-{}", entries.len()),
                employee_id: employee.id.clone(),
                date,
                task_id: None,
                phase_id: Some(phase.id.clone()),
                title: format!("Phase: {}", phase.name),
                start_time: segment.start_time,
                end_time: segment.end_time,
                is_auto_generated: true,
            });
        }
    }

    entries
}

fn phase_accepts(phase: &Phase, employee: &Employee) -> bool {
    match employee.legacy_workstation() {
        None => true,
        Some(workstation) => phase_workstation_tag(&phase.name)
            .is_some_and(|tag| same_name(tag, workstation)),
    }
}

/// Extract `<NAME>` from a phase name carrying `workstation: <NAME>`.
pub fn phase_workstation_tag(name: &str) -> Option<&str> {
    let start = name.to_ascii_lowercase().find(WORKSTATION_TAG)? + WORKSTATION_TAG.len();
    let rest = &name[start..];
    let end = rest.find([',', ';', ')']).unwrap_or(rest.len());
    let tag = rest[..end].trim();
    (!tag.is_empty()).then_some(tag)
}
