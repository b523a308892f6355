use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    OnLeave,
}

/// Stored as three scalar columns, exposed as a nested object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmergencyContact {
    #[sqlx(rename = "emergency_contact_name")]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,

    #[sqlx(rename = "emergency_contact_phone")]
    #[schema(example = "+15550100")]
    pub phone: Option<String>,

    #[sqlx(rename = "emergency_contact_relationship")]
    #[schema(example = "Spouse")]
    pub relationship: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "phone": "+15550123",
        "address": "12 Main St",
        "department": "Engineering",
        "position": "Software Engineer",
        "dateHired": "2024-01-01",
        "salary": 85000.0,
        "status": "Active",
        "emergencyContact": {"name": "Jane Doe", "phone": "+15550100", "relationship": "Spouse"}
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+15550123", nullable = true)]
    pub phone: Option<String>,

    #[schema(nullable = true)]
    pub address: Option<String>,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "Software Engineer", nullable = true)]
    pub position: Option<String>,

    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub date_hired: Option<NaiveDate>,

    #[schema(example = 85000.0, nullable = true)]
    pub salary: Option<f64>,

    #[schema(example = "Active")]
    pub status: String,

    #[sqlx(flatten)]
    pub emergency_contact: EmergencyContact,
}
