use crate::error::AppError;
use crate::model::{Employee, Workstation};
use crate::storage::{EmployeeRepository, WorkstationRepository};

/// Workstations `employee` may staff.
///
/// Sources are consulted in order and accumulated:
/// 1. explicit employee/workstation links;
/// 2. only when there are no links, the legacy `workstation` name, matched
///    case-insensitively by exact name and then by substring;
/// 3. for workstation accounts, the workstation named like the account.
///
/// The result is de-duplicated by workstation id.
pub fn resolve_workstations(
    employee: &Employee,
    linked: &[Workstation],
    all: &[Workstation],
) -> Vec<Workstation> {
    let mut resolved: Vec<Workstation> = Vec::new();
    for workstation in linked {
        push_unique(&mut resolved, workstation);
    }

    if resolved.is_empty()
        && let Some(legacy) = employee.legacy_workstation()
        && let Some(workstation) = match_by_name(all, legacy)
    {
        push_unique(&mut resolved, workstation);
    }

    if employee.is_workstation_account()
        && let Some(workstation) = all
            .iter()
            .find(|workstation| same_name(&workstation.name, &employee.name))
    {
        push_unique(&mut resolved, workstation);
    }

    resolved
}

pub fn workstations_for_employee<S>(
    store: &S,
    employee_id: &str,
) -> Result<Vec<Workstation>, AppError>
where
    S: EmployeeRepository + WorkstationRepository,
{
    let employee = store
        .employee_by_id(employee_id)?
        .ok_or_else(|| AppError::not_found(format!("employee {employee_id} not found")))?;
    let linked = store.linked_workstations(&employee.id)?;
    let all = store.workstations()?;
    Ok(resolve_workstations(&employee, &linked, &all))
}

/// Workstation names compare trimmed and Unicode case-folded, so
/// `ÉBÉNISTERIE` and `ébénisterie` name the same station.
pub fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn match_by_name<'a>(all: &'a [Workstation], name: &str) -> Option<&'a Workstation> {
    let wanted = name.trim().to_lowercase();
    all.iter()
        .find(|workstation| same_name(&workstation.name, name))
        .or_else(|| {
            all.iter()
                .find(|workstation| workstation.name.to_lowercase().contains(&wanted))
        })
}

fn push_unique(resolved: &mut Vec<Workstation>, workstation: &Workstation) {
    if !resolved.iter().any(|existing| existing.id == workstation.id) {
        resolved.push(workstation.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_workstations, same_name, workstations_for_employee};
    use crate::model::{EmployeeWorkstationLink, WORKSTATION_ROLE, Workstation};
    use crate::storage::json_store::FloorState;
    use crate::test_support::{cleanup, employee, seeded_store};

    fn station(id: &str, name: &str) -> Workstation {
        Workstation {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn floor() -> Vec<Workstation> {
        vec![
            station("ws-1", "Saw Line"),
            station("ws-2", "Saw"),
            station("ws-3", "Edge Bander"),
            station("ws-4", "CNC"),
        ]
    }

    #[test]
    fn links_take_priority_over_legacy_field() {
        let worker = employee("emp-1", "worker", Some("CNC"));
        let linked = vec![station("ws-3", "Edge Bander")];

        let resolved = resolve_workstations(&worker, &linked, &floor());

        let ids: Vec<_> = resolved.iter().map(|ws| ws.id.as_str()).collect();
        assert_eq!(ids, vec!["ws-3"]);
    }

    #[test]
    fn legacy_field_prefers_exact_match() {
        let worker = employee("emp-1", "worker", Some("saw"));

        let resolved = resolve_workstations(&worker, &[], &floor());

        let ids: Vec<_> = resolved.iter().map(|ws| ws.id.as_str()).collect();
        assert_eq!(ids, vec!["ws-2"]);
    }

    #[test]
    fn legacy_field_falls_back_to_substring() {
        let worker = employee("emp-1", "worker", Some("bander"));

        let resolved = resolve_workstations(&worker, &[], &floor());

        let ids: Vec<_> = resolved.iter().map(|ws| ws.id.as_str()).collect();
        assert_eq!(ids, vec!["ws-3"]);
    }

    #[test]
    fn blank_legacy_field_resolves_nothing() {
        let worker = employee("emp-1", "worker", Some("  "));

        assert!(resolve_workstations(&worker, &[], &floor()).is_empty());
    }

    #[test]
    fn workstation_account_adds_own_station_once() {
        let mut terminal = employee("emp-9", WORKSTATION_ROLE, None);
        terminal.name = "cnc".to_string();

        let resolved = resolve_workstations(&terminal, &[station("ws-1", "Saw Line")], &floor());
        let ids: Vec<_> = resolved.iter().map(|ws| ws.id.as_str()).collect();
        assert_eq!(ids, vec!["ws-1", "ws-4"]);

        let already_linked =
            resolve_workstations(&terminal, &[station("ws-4", "CNC")], &floor());
        assert_eq!(already_linked.len(), 1);
    }

    #[test]
    fn accented_names_match_regardless_of_case() {
        let stations = vec![station("ws-5", "ébénisterie"), station("ws-6", "Découpe Numérique")];
        let mut terminal = employee("emp-7", WORKSTATION_ROLE, None);
        terminal.name = "ÉBÉNISTERIE".to_string();
        let worker = employee("emp-8", "worker", Some("DÉCOUPE"));

        let own = resolve_workstations(&terminal, &[], &stations);
        let legacy = resolve_workstations(&worker, &[], &stations);

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].id, "ws-5");
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].id, "ws-6");
        assert!(same_name(" Ébénisterie ", "ÉBÉNISTERIE"));
        assert!(!same_name("Ébénisterie", "Ebenisterie"));
    }

    #[test]
    fn workstations_for_employee_reads_links_from_store() {
        let store = seeded_store(
            "workstations.json",
            &FloorState {
                employees: vec![employee("emp-1", "worker", Some("CNC"))],
                workstations: floor(),
                employee_workstations: vec![
                    EmployeeWorkstationLink {
                        employee_id: "emp-1".to_string(),
                        workstation_id: "ws-1".to_string(),
                    },
                    EmployeeWorkstationLink {
                        employee_id: "emp-1".to_string(),
                        workstation_id: "ws-1".to_string(),
                    },
                ],
                ..FloorState::default()
            },
        );

        let resolved = workstations_for_employee(&store, "emp-1").unwrap();
        let missing = workstations_for_employee(&store, "emp-2").unwrap_err();
        cleanup(&store);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "ws-1");
        assert_eq!(missing.code(), "not_found");
    }
}
