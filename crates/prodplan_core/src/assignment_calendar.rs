//! Team lanes of the installation calendar.
//!
//! Each project holds at most one team assignment, written with
//! find-then-update-or-insert. Overlapping assignments on one team are
//! allowed.

use crate::error::AppError;
use crate::model::{Project, Team, TeamAssignment};
use crate::storage::{ProjectRepository, TeamAssignmentRepository, new_record_id};
use std::str::FromStr;
use time::{Date, Duration};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendDirection {
    /// Shrink from the front, keeping the end date.
    Start,
    /// Grow by one day at the back.
    End,
}

impl FromStr for ExtendDirection {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            _ => Err(AppError::validation(format!(
                "direction must be 'start' or 'end', got '{raw}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLane {
    pub team: Team,
    pub assignments: Vec<TeamAssignment>,
}

pub fn assign_project_to_team<S>(
    store: &S,
    project_id: &str,
    team: Team,
    start_date: Date,
    duration_days: Option<u32>,
) -> Result<TeamAssignment, AppError>
where
    S: ProjectRepository + TeamAssignmentRepository,
{
    if duration_days == Some(0) {
        return Err(AppError::validation("duration must be at least one day"));
    }
    let project_id = required_id(project_id)?;
    if store.project_by_id(project_id)?.is_none() {
        return Err(AppError::not_found(format!("project {project_id} not found")));
    }

    let assignment = match store.team_assignment_by_project(project_id)? {
        Some(mut existing) => {
            existing.team = team;
            existing.start_date = start_date;
            if let Some(duration_days) = duration_days {
                existing.duration_days = duration_days;
            }
            existing
        }
        None => TeamAssignment {
            id: new_record_id("team"),
            project_id: project_id.to_string(),
            team,
            start_date,
            duration_days: duration_days.unwrap_or(1),
        },
    };

    store.upsert_team_assignment(&assignment)?;
    info!(
        project_id,
        team = team.as_str(),
        %start_date,
        duration_days = assignment.duration_days,
        "team assignment written"
    );
    Ok(assignment)
}

/// Shift the start date; team and duration are kept.
pub fn move_project<S: TeamAssignmentRepository>(
    store: &S,
    project_id: &str,
    new_start_date: Date,
) -> Result<TeamAssignment, AppError> {
    let mut assignment = existing_assignment(store, project_id)?;
    assignment.start_date = new_start_date;
    store.upsert_team_assignment(&assignment)?;
    info!(project_id = %assignment.project_id, %new_start_date, "team assignment moved");
    Ok(assignment)
}

pub fn extend_project<S: TeamAssignmentRepository>(
    store: &S,
    project_id: &str,
    direction: ExtendDirection,
) -> Result<TeamAssignment, AppError> {
    let mut assignment = existing_assignment(store, project_id)?;
    match direction {
        ExtendDirection::End => {
            assignment.duration_days = assignment
                .duration_days
                .checked_add(1)
                .ok_or_else(|| AppError::validation("duration out of range"))?;
        }
        ExtendDirection::Start => {
            if assignment.duration_days <= 1 {
                return Ok(assignment);
            }
            assignment.duration_days -= 1;
            assignment.start_date = shift(assignment.start_date, 1)?;
        }
    }

    store.upsert_team_assignment(&assignment)?;
    info!(
        project_id = %assignment.project_id,
        start_date = %assignment.start_date,
        duration_days = assignment.duration_days,
        "team assignment extended"
    );
    Ok(assignment)
}

/// Persist `requested` clamped to `[1, max_columns]`.
pub fn resize<S: TeamAssignmentRepository>(
    store: &S,
    project_id: &str,
    requested: i64,
    max_columns: u32,
) -> Result<TeamAssignment, AppError> {
    if max_columns == 0 {
        return Err(AppError::validation("max columns must be at least one"));
    }

    let mut assignment = existing_assignment(store, project_id)?;
    let clamped = requested.clamp(1, i64::from(max_columns));
    assignment.duration_days = u32::try_from(clamped)
        .map_err(|_| AppError::validation("duration out of range"))?;
    store.upsert_team_assignment(&assignment)?;
    info!(
        project_id = %assignment.project_id,
        requested,
        duration_days = assignment.duration_days,
        "team assignment resized"
    );
    Ok(assignment)
}

/// Columns left in a rendered window from the column of `assignment_start`
/// to the window's last day. Starts before the window count from its first
/// column; the result never drops below one.
pub fn remaining_columns(window_start: Date, window_days: u32, assignment_start: Date) -> u32 {
    let offset = (assignment_start - window_start).whole_days().max(0);
    let remaining = i64::from(window_days) - offset;
    u32::try_from(remaining.max(1)).unwrap_or(1)
}

/// Assignments visible in `[window_start, window_start + window_days)`,
/// one lane per team, ordered by start date.
pub fn calendar_window<S: TeamAssignmentRepository>(
    store: &S,
    window_start: Date,
    window_days: u32,
) -> Result<Vec<TeamLane>, AppError> {
    if window_days == 0 {
        return Err(AppError::validation("window must span at least one day"));
    }
    let window_end = shift(window_start, i64::from(window_days) - 1)?;

    let mut visible = Vec::new();
    for assignment in store.team_assignments()? {
        if assignment.start_date <= window_end && assignment.end_date()? >= window_start {
            visible.push(assignment);
        }
    }
    visible.sort_by_key(|assignment| assignment.start_date);

    Ok(Team::ALL
        .iter()
        .map(|team| TeamLane {
            team: *team,
            assignments: visible
                .iter()
                .filter(|assignment| assignment.team == *team)
                .cloned()
                .collect(),
        })
        .collect())
}

/// Projects not yet placed on any team lane.
pub fn unassigned_projects<S>(store: &S) -> Result<Vec<Project>, AppError>
where
    S: ProjectRepository + TeamAssignmentRepository,
{
    let assigned = store.team_assignments()?;
    Ok(store
        .projects()?
        .into_iter()
        .filter(|project| {
            !assigned
                .iter()
                .any(|assignment| assignment.project_id == project.id)
        })
        .collect())
}

/// Take a project off its lane. Returns whether a row was removed; the
/// truck assignment, if any, is left in place.
pub fn unassign_project<S: TeamAssignmentRepository>(
    store: &S,
    project_id: &str,
) -> Result<bool, AppError> {
    let project_id = required_id(project_id)?;
    let removed = store.delete_team_assignment(project_id)?;
    info!(project_id, removed, "team assignment removed");
    Ok(removed)
}

fn existing_assignment<S: TeamAssignmentRepository>(
    store: &S,
    project_id: &str,
) -> Result<TeamAssignment, AppError> {
    let project_id = required_id(project_id)?;
    store
        .team_assignment_by_project(project_id)?
        .ok_or_else(|| AppError::not_found(format!("no team assignment for project {project_id}")))
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("project id is required"));
    }
    Ok(trimmed)
}

fn shift(date: Date, days: i64) -> Result<Date, AppError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| AppError::validation("date out of range"))
}
