use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "PMP")]
    pub name: String,
    #[schema(example = "PMI", nullable = true)]
    pub issued_by: Option<String>,
    #[schema(example = "2023-03-20", value_type = Option<String>, format = "date")]
    pub issue_date: Option<NaiveDate>,
    #[schema(example = "2026-03-20", value_type = Option<String>, format = "date")]
    pub expiry_date: Option<NaiveDate>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}
