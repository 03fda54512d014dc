use serde::{Deserialize, Serialize};

/// Role value for accounts that represent a workstation terminal rather
/// than a person.
pub const WORKSTATION_ROLE: &str = "workstation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Legacy single-workstation field; superseded by explicit links but
    /// still populated on older rows.
    #[serde(default)]
    pub workstation: Option<String>,
}

impl Employee {
    pub fn is_workstation_account(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case(WORKSTATION_ROLE)
    }

    /// The legacy workstation name, ignoring blank values.
    pub fn legacy_workstation(&self) -> Option<&str> {
        self.workstation
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workstation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeWorkstationLink {
    pub employee_id: String,
    pub workstation_id: String,
}
