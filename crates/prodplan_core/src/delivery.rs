use crate::error::AppError;
use crate::model::{TeamAssignment, TruckAssignment};
use crate::storage::{TeamAssignmentRepository, TruckAssignmentRepository, new_record_id};
use time::{Date, Duration, Weekday};
use tracing::info;

/// Truck id values that mean "take the truck off this project".
const UNASSIGN_SENTINELS: [&str; 2] = ["", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryDates {
    pub installation_date: Date,
    pub loading_date: Date,
}

/// Installation happens on the last assigned day; loading the working day
/// before, pulled back to Friday when it would land on a weekend.
pub fn compute_delivery_dates(assignment: &TeamAssignment) -> Result<DeliveryDates, AppError> {
    let installation_date = assignment.end_date()?;
    let day_before = shift(installation_date, -1)?;
    let loading_date = match day_before.weekday() {
        Weekday::Sunday => shift(day_before, -2)?,
        Weekday::Saturday => shift(day_before, -1)?,
        _ => day_before,
    };

    Ok(DeliveryDates {
        installation_date,
        loading_date,
    })
}

/// Assign `truck_id` to the project's delivery, or remove the truck
/// assignment when `truck_id` is blank or `none`. Returns the stored row,
/// or `None` after a removal.
pub fn upsert_truck_assignment<S>(
    store: &S,
    project_id: &str,
    truck_id: &str,
) -> Result<Option<TruckAssignment>, AppError>
where
    S: TeamAssignmentRepository + TruckAssignmentRepository,
{
    let project_id = project_id.trim();
    if project_id.is_empty() {
        return Err(AppError::validation("project id is required"));
    }

    let truck_id = truck_id.trim();
    if UNASSIGN_SENTINELS
        .iter()
        .any(|sentinel| truck_id.eq_ignore_ascii_case(sentinel))
    {
        let removed = store.delete_truck_assignment(project_id)?;
        info!(project_id, removed, "truck unassigned");
        return Ok(None);
    }

    let team_assignment = store
        .team_assignment_by_project(project_id)?
        .ok_or_else(|| AppError::not_found(format!("no team assignment for project {project_id}")))?;
    let dates = compute_delivery_dates(&team_assignment)?;

    let id = store
        .truck_assignment_by_project(project_id)?
        .map(|existing| existing.id)
        .unwrap_or_else(|| new_record_id("truck"));
    let assignment = TruckAssignment {
        id,
        project_id: project_id.to_string(),
        truck_id: truck_id.to_string(),
        loading_date: dates.loading_date,
        installation_date: dates.installation_date,
    };

    store.upsert_truck_assignment(&assignment)?;
    info!(
        project_id,
        truck_id,
        loading_date = %assignment.loading_date,
        installation_date = %assignment.installation_date,
        "truck assignment written"
    );
    Ok(Some(assignment))
}

fn shift(date: Date, days: i64) -> Result<Date, AppError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| AppError::validation("date out of range"))
}

#[cfg(test)]
mod tests {
    use super::{compute_delivery_dates, upsert_truck_assignment};
    use crate::assignment_calendar::move_project;
    use crate::model::{Team, TeamAssignment, TruckAssignment};
    use crate::storage::TruckAssignmentRepository;
    use crate::storage::json_store::FloorState;
    use crate::test_support::{cleanup, project, seeded_store};
    use time::macros::date;

    fn assignment(start: time::Date, days: u32) -> TeamAssignment {
        TeamAssignment {
            id: "team-1".to_string(),
            project_id: "p-1".to_string(),
            team: Team::Green,
            start_date: start,
            duration_days: days,
        }
    }

    #[test]
    fn sunday_loading_moves_to_friday() {
        let dates = compute_delivery_dates(&assignment(date!(2024 - 06 - 03), 1)).unwrap();

        assert_eq!(dates.installation_date, date!(2024 - 06 - 03));
        assert_eq!(dates.loading_date, date!(2024 - 05 - 31));
    }

    #[test]
    fn saturday_loading_moves_to_friday() {
        // Installation on Sunday 2024-06-09.
        let dates = compute_delivery_dates(&assignment(date!(2024 - 06 - 05), 5)).unwrap();

        assert_eq!(dates.installation_date, date!(2024 - 06 - 09));
        assert_eq!(dates.loading_date, date!(2024 - 06 - 07));
    }

    #[test]
    fn weekday_loading_is_the_day_before() {
        let dates = compute_delivery_dates(&assignment(date!(2024 - 06 - 03), 2)).unwrap();

        assert_eq!(dates.installation_date, date!(2024 - 06 - 04));
        assert_eq!(dates.loading_date, date!(2024 - 06 - 03));
    }

    #[test]
    fn installation_on_weekend_is_not_corrected() {
        let dates = compute_delivery_dates(&assignment(date!(2024 - 06 - 08), 1)).unwrap();

        assert_eq!(dates.installation_date, date!(2024 - 06 - 08));
        assert_eq!(dates.loading_date, date!(2024 - 06 - 07));
    }

    fn floor() -> FloorState {
        FloorState {
            projects: vec![project("p-1"), project("p-2")],
            team_assignments: vec![assignment(date!(2024 - 06 - 03), 3)],
            ..FloorState::default()
        }
    }

    #[test]
    fn upsert_inserts_then_updates_single_row() {
        let store = seeded_store("truck-upsert.json", &floor());

        let first = upsert_truck_assignment(&store, "p-1", "truck-a")
            .unwrap()
            .unwrap();
        let second = upsert_truck_assignment(&store, "p-1", "truck-b")
            .unwrap()
            .unwrap();
        let rows = store.load().unwrap().truck_assignments;
        cleanup(&store);

        assert_eq!(first.installation_date, date!(2024 - 06 - 05));
        assert_eq!(first.loading_date, date!(2024 - 06 - 04));
        assert_eq!(second.id, first.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].truck_id, "truck-b");
    }

    #[test]
    fn none_sentinel_deletes_assignment() {
        let mut state = floor();
        state.truck_assignments.push(TruckAssignment {
            id: "truck-row".to_string(),
            project_id: "p-1".to_string(),
            truck_id: "truck-a".to_string(),
            loading_date: date!(2024 - 06 - 04),
            installation_date: date!(2024 - 06 - 05),
        });
        let store = seeded_store("truck-none.json", &state);

        let removed = upsert_truck_assignment(&store, "p-1", "None").unwrap();
        let blank = upsert_truck_assignment(&store, "p-1", "  ").unwrap();
        let stored = store.truck_assignment_by_project("p-1").unwrap();
        cleanup(&store);

        assert!(removed.is_none());
        assert!(blank.is_none());
        assert!(stored.is_none());
    }

    #[test]
    fn truck_without_team_assignment_is_not_found() {
        let store = seeded_store("truck-missing.json", &floor());

        let err = upsert_truck_assignment(&store, "p-2", "truck-a").unwrap_err();
        cleanup(&store);

        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn moving_team_assignment_leaves_truck_dates_stale() {
        let store = seeded_store("truck-stale.json", &floor());

        let truck = upsert_truck_assignment(&store, "p-1", "truck-a")
            .unwrap()
            .unwrap();
        move_project(&store, "p-1", date!(2024 - 06 - 17)).unwrap();
        let stored = store.truck_assignment_by_project("p-1").unwrap().unwrap();
        cleanup(&store);

        assert_eq!(stored, truck);
    }
}
