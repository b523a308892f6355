use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReview {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "Alice Manager")]
    pub reviewer: String,
    #[schema(example = "2024-03-31", value_type = String, format = "date")]
    pub review_date: NaiveDate,
    #[schema(example = 4, minimum = 1, maximum = 5)]
    pub rating: u8,
    #[schema(example = "Consistently strong delivery", nullable = true)]
    pub comments: Option<String>,
}
