use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[sqlx(default)]
    #[schema(example = "John Doe", nullable = true)]
    pub employee_name: Option<String>,
    #[schema(example = "2024-05-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:01:12", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
    #[schema(example = "Present")]
    pub status: String,
}
