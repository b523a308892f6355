use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Credentials row used by the login flow; never serialized.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: u64,
    pub employee_id: u64,
    pub username: String,
    pub password: String,
    pub role: String,
}

/// A user joined with the owning employee's profile, without the hash.
///
/// `id` is the login account; every per-employee route (`/attendance/{id}`,
/// `/leave-requests/{id}`, `?employeeId=`) takes `employeeId` instead.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// users.id, not usable as an employee id
    #[schema(example = 1)]
    pub id: u64,
    /// Employee id to use on per-employee routes
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "employee")]
    pub role: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_hired: Option<NaiveDate>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_exposes_the_employee_id_next_to_the_account_id() {
        let profile = UserProfile {
            id: 1,
            employee_id: 7,
            username: "jdoe".into(),
            role: "employee".into(),
            name: "John Doe".into(),
            email: "john@company.com".into(),
            phone: None,
            department: None,
            position: None,
            date_hired: None,
            status: "Active".into(),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["employeeId"], 7);
        assert!(value.get("password").is_none());
    }
}
