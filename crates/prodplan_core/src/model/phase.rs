use super::iso_date;
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    /// Percentage in `0..=100`, written by the progress tracking screens.
    #[serde(default)]
    pub progress: u8,
}

impl Phase {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// Inclusive on both ends.
    pub fn is_active_on(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardTask {
    pub id: String,
    pub task_number: String,
    pub task_name: String,
    #[serde(default = "default_time_coefficient")]
    pub time_coefficient: f64,
}

fn default_time_coefficient() -> f64 {
    1.0
}

/// A standard task may not leave HOLD until the phase named here is at 100%
/// within the same project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPhase {
    pub id: String,
    pub standard_task_id: String,
    pub phase_name: String,
}
