//! Limit-phase gate: a task built from a standard task may only start once
//! every phase its template names has reached 100% in the same project.

use crate::error::AppError;
use crate::model::{LimitPhase, Phase};
use crate::storage::{LimitPhaseRepository, PhaseRepository};
use tracing::debug;

/// Whether every limit phase of `standard_task_id` is complete in
/// `project_id`. A limit phase naming a phase the project does not have
/// counts as unsatisfied.
pub fn is_satisfied<S>(store: &S, standard_task_id: &str, project_id: &str) -> Result<bool, AppError>
where
    S: LimitPhaseRepository + PhaseRepository,
{
    Ok(blocking_phases(store, standard_task_id, project_id)?.is_empty())
}

/// Names of the limit phases still holding `standard_task_id` back in
/// `project_id`, in declaration order.
pub fn blocking_phases<S>(
    store: &S,
    standard_task_id: &str,
    project_id: &str,
) -> Result<Vec<String>, AppError>
where
    S: LimitPhaseRepository + PhaseRepository,
{
    let limits = store.limit_phases_by_standard_task(standard_task_id)?;
    if limits.is_empty() {
        return Ok(Vec::new());
    }

    let phases = store.phases_by_project(project_id)?;
    let blocking = unmet_limits(&limits, &phases);
    debug!(
        standard_task_id,
        project_id,
        limits = limits.len(),
        blocking = blocking.len(),
        "limit phases checked"
    );
    Ok(blocking)
}

fn unmet_limits(limits: &[LimitPhase], phases: &[Phase]) -> Vec<String> {
    limits
        .iter()
        .filter(|limit| {
            !phases
                .iter()
                .find(|phase| phase.name == limit.phase_name)
                .is_some_and(Phase::is_complete)
        })
        .map(|limit| limit.phase_name.clone())
        .collect()
}
