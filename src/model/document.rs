use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Documents expiring within this many days are flagged.
pub const EXPIRING_SOON_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum DocumentStatus {
    Valid,
    #[serde(rename = "Expiring Soon")]
    #[strum(serialize = "Expiring Soon")]
    ExpiringSoon,
    Expired,
}

/// Whole days from `now` until the start of `expiry`, rounded up.
pub fn days_until_expiry(expiry: NaiveDate, now: NaiveDateTime) -> i64 {
    let millis = (expiry.and_time(NaiveTime::MIN) - now).num_milliseconds();
    let days = millis / MILLIS_PER_DAY;
    // integer division truncates toward zero, which is already the ceiling for negatives
    if millis % MILLIS_PER_DAY > 0 { days + 1 } else { days }
}

/// Classifies a document against the clock. Only evaluated on write.
pub fn expiry_status(expiry: Option<NaiveDate>, now: NaiveDateTime) -> DocumentStatus {
    let Some(expiry) = expiry else {
        return DocumentStatus::Valid;
    };

    match days_until_expiry(expiry, now) {
        d if d < 0 => DocumentStatus::Expired,
        d if d <= EXPIRING_SOON_DAYS => DocumentStatus::ExpiringSoon,
        _ => DocumentStatus::Valid,
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    /// Filled by list queries that join the owning employee.
    #[sqlx(default)]
    #[schema(example = "John Doe", nullable = true)]
    pub employee_name: Option<String>,
    #[schema(example = "Contract")]
    pub document_type: String,
    #[schema(example = "Employment Contract")]
    pub title: String,
    #[schema(example = "contract.pdf")]
    pub file_name: String,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub upload_date: NaiveDate,
    #[schema(example = "2025-01-15", value_type = Option<String>, format = "date")]
    pub expiry_date: Option<NaiveDate>,
    #[schema(example = "2.5 MB")]
    pub file_size: String,
    #[schema(example = "Valid")]
    pub status: String,
    #[schema(example = "/uploads/0b8e6f0c-3f43-4b8e-9d0e-0f6f3c2b1a77.pdf")]
    pub file_path: String,
}

#[derive(Debug, Default, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    #[schema(example = 12)]
    pub total: i64,
    #[schema(example = 9)]
    pub valid: i64,
    #[schema(example = 2)]
    pub expiring_soon: i64,
    #[schema(example = 1)]
    pub expired: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_time(NaiveTime::MIN)
    }

    #[test]
    fn missing_expiry_is_valid() {
        assert_eq!(expiry_status(None, midnight(2024, 5, 1)), DocumentStatus::Valid);
    }

    #[test]
    fn classifies_around_the_thirty_day_boundary() {
        let now = midnight(2024, 5, 1);

        assert_eq!(expiry_status(Some(date(2024, 4, 30)), now), DocumentStatus::Expired);
        assert_eq!(expiry_status(Some(date(2024, 5, 1)), now), DocumentStatus::ExpiringSoon);
        assert_eq!(expiry_status(Some(date(2024, 5, 31)), now), DocumentStatus::ExpiringSoon);
        assert_eq!(expiry_status(Some(date(2024, 6, 1)), now), DocumentStatus::Valid);
    }

    #[test]
    fn partial_days_round_up() {
        let noon = date(2024, 5, 1).and_hms_opt(12, 0, 0).unwrap();

        // half a day in the past rounds up to zero
        assert_eq!(days_until_expiry(date(2024, 5, 1), noon), 0);
        assert_eq!(expiry_status(Some(date(2024, 5, 1)), noon), DocumentStatus::ExpiringSoon);

        assert_eq!(days_until_expiry(date(2024, 5, 2), noon), 1);
        assert_eq!(days_until_expiry(date(2024, 4, 30), noon), -1);
        assert_eq!(days_until_expiry(date(2024, 5, 31), noon), 30);
        // 30.5 days rounds up to 31
        assert_eq!(expiry_status(Some(date(2024, 6, 1)), noon), DocumentStatus::Valid);
    }

    #[test]
    fn status_display_matches_stored_text() {
        assert_eq!(DocumentStatus::ExpiringSoon.to_string(), "Expiring Soon");
        assert_eq!(DocumentStatus::Expired.to_string(), "Expired");
    }
}
