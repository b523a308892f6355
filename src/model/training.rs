use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum TrainingStatus {
    #[default]
    Planned,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "Rust for backend engineers")]
    pub title: String,
    #[schema(example = "Acme Academy", nullable = true)]
    pub provider: Option<String>,
    #[schema(example = "2024-07-01", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(example = "In Progress")]
    pub status: String,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}
