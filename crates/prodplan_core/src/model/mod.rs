mod assignment;
mod employee;
mod phase;
mod schedule;
mod task;

pub use assignment::{Team, TeamAssignment, TruckAssignment};
pub use employee::{Employee, EmployeeWorkstationLink, WORKSTATION_ROLE, Workstation};
pub use phase::{LimitPhase, Phase, Project, StandardTask};
pub use schedule::{ScheduleEntry, WorkHourSegment};
pub use task::{Task, TaskPriority, TaskStatus, TaskUpdate};

use time::{Date, Time};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");
