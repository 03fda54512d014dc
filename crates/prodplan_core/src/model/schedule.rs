use super::{clock_time, iso_date};
use serde::{Deserialize, Serialize};
use time::{Date, Time};

/// Recurring weekly work window. `day_of_week` counts from Sunday (0) to
/// Saturday (6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHourSegment {
    pub id: String,
    pub day_of_week: u8,
    #[serde(with = "clock_time")]
    pub start_time: Time,
    #[serde(with = "clock_time")]
    pub end_time: Time,
    pub segment_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub employee_id: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub phase_id: Option<String>,
    pub title: String,
    #[serde(with = "clock_time")]
    pub start_time: Time,
    #[serde(with = "clock_time")]
    pub end_time: Time,
    #[serde(default)]
    pub is_auto_generated: bool,
}
