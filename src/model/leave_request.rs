use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Denied,
}

impl LeaveStatus {
    /// Parses the target of a status transition. Only the two terminal
    /// states are accepted, spelled exactly.
    pub fn parse_decision(value: &str) -> Option<Self> {
        match value {
            "Approved" => Some(LeaveStatus::Approved),
            "Denied" => Some(LeaveStatus::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[sqlx(default)]
    #[schema(example = "John Doe", nullable = true)]
    pub employee_name: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    #[schema(example = "Vacation")]
    pub leave_type: String,
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-05", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Pending")]
    pub status: String,
    #[schema(example = "Enjoy", nullable = true)]
    pub comment: Option<String>,
    #[schema(example = "2024-05-01T08:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_states_are_valid_decisions() {
        assert_eq!(LeaveStatus::parse_decision("Approved"), Some(LeaveStatus::Approved));
        assert_eq!(LeaveStatus::parse_decision("Denied"), Some(LeaveStatus::Denied));
        assert_eq!(LeaveStatus::parse_decision("Pending"), None);
        assert_eq!(LeaveStatus::parse_decision("approved"), None);
        assert_eq!(LeaveStatus::parse_decision(""), None);
    }
}
