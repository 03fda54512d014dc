use super::iso_date;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Green,
    Blue,
    Orange,
}

impl Team {
    pub const ALL: [Team; 3] = [Team::Green, Team::Blue, Team::Orange];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Orange => "orange",
        }
    }
}

impl FromStr for Team {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "orange" => Ok(Self::Orange),
            _ => Err(AppError::validation(format!("unknown team '{raw}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub id: String,
    pub project_id: String,
    pub team: Team,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    pub duration_days: u32,
}

impl TeamAssignment {
    /// Last calendar day covered by the assignment.
    pub fn end_date(&self) -> Result<Date, AppError> {
        let span = i64::from(self.duration_days.max(1)) - 1;
        self.start_date
            .checked_add(Duration::days(span))
            .ok_or_else(|| AppError::invalid_data("assignment end date out of range"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckAssignment {
    pub id: String,
    pub project_id: String,
    pub truck_id: String,
    #[serde(with = "iso_date")]
    pub loading_date: Date,
    #[serde(with = "iso_date")]
    pub installation_date: Date,
}
