use crate::{
    auth::password::hash_password,
    error::ApiError,
    model::{
        employee::{EmergencyContact, Employee, EmployeeStatus},
        role::Role,
    },
    utils::{
        db_utils::{PageQuery, TOTAL_COUNT_HEADER},
        usernames::UsernameRegistry,
    },
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::ToSchema;

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, address, department, position, date_hired, \
     salary, status, emergency_contact_name, emergency_contact_phone, emergency_contact_relationship";

/// Employee fields shared by create and full update.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+15550123")]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    #[schema(example = "Software Engineer")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_date")]
    #[schema(example = "2024-01-01", format = "date", value_type = Option<String>)]
    pub date_hired: Option<NaiveDate>,
    /// Same as `dateHired`; the web form sends this key
    #[serde(rename = "hireDate", default, deserialize_with = "crate::utils::lenient::optional_date")]
    #[schema(format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
    /// Same as `dateHired`; the web form sends this key too
    #[serde(rename = "date_hired", default, deserialize_with = "crate::utils::lenient::optional_date")]
    #[schema(format = "date", value_type = Option<String>)]
    pub date_hired_form: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_number")]
    #[schema(example = 85000.0)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

impl EmployeePayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ApiError::bad_request("Name and email are required"));
        }
        Ok(())
    }

    /// First hire date found among the accepted keys.
    fn hired_on(&self) -> Option<NaiveDate> {
        self.date_hired.or(self.hire_date).or(self.date_hired_form)
    }

    fn into_employee(self, id: u64) -> Employee {
        let date_hired = self.hired_on();
        Employee {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            department: self.department,
            position: self.position,
            date_hired,
            salary: self.salary,
            status: self.status.to_string(),
            emergency_contact: self.emergency_contact,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[serde(flatten)]
    pub employee: EmployeePayload,
    /// Provisions a login when given together with `password`
    #[schema(example = "jdoe")]
    pub username: Option<String>,
    #[schema(example = "s3cret!")]
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl CreateEmployee {
    /// `Some((username, password))` when a login must be provisioned.
    fn credentials(&self) -> Result<Option<(&str, &str)>, ApiError> {
        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let password = self.password.as_deref().filter(|p| !p.is_empty());

        match (username, password) {
            (Some(u), Some(p)) => Ok(Some((u, p))),
            (None, None) => Ok(None),
            _ => Err(ApiError::bad_request(
                "Both username and password are required to provision a login",
            )),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEmployee {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Only a UNIQUE clash; other integrity errors (NOT NULL, ...) stay 500s.
fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of employees in insertion order", body = [Employee],
            headers(("X-Total-Count" = i64, description = "Number of employees across all pages"))),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.resolve();

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id ASC LIMIT ? OFFSET ?");
    debug!(page = page.page, limit = page.limit, "Fetching employees");

    let employees = sqlx::query_as::<_, Employee>(&sql)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, total.to_string()))
        .json(employees))
}

/// Get employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(ApiError::NotFound("Employee not found".into())),
    }
}

/// Create employee
///
/// When `username` and `password` are given, a login is provisioned in the
/// same transaction with a salted Argon2 hash.
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = CreatedEmployee),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Username already taken", body = Object, example = json!({
            "error": "Username already taken"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    usernames: web::Data<UsernameRegistry>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    payload.employee.validate()?;

    let credentials = payload.credentials()?;
    let role = payload.role.unwrap_or_default();

    let hashed = match credentials {
        Some((username, password)) => {
            if !usernames.is_available(username, pool.get_ref()).await? {
                return Err(ApiError::Conflict("Username already taken".into()));
            }
            let hashed = hash_password(password).map_err(|e| {
                error!(error = %e, "Failed to hash password");
                ApiError::Storage(e.to_string())
            })?;
            Some((username.to_string(), hashed))
        }
        None => None,
    };

    let emp = &payload.employee;
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (name, email, phone, address, department, position, date_hired, salary, status,
         emergency_contact_name, emergency_contact_phone, emergency_contact_relationship)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&emp.name)
    .bind(&emp.email)
    .bind(&emp.phone)
    .bind(&emp.address)
    .bind(&emp.department)
    .bind(&emp.position)
    .bind(emp.hired_on())
    .bind(emp.salary)
    .bind(emp.status.to_string())
    .bind(&emp.emergency_contact.name)
    .bind(&emp.emergency_contact.phone)
    .bind(&emp.emergency_contact.relationship)
    .execute(&mut *tx)
    .await?;

    let employee_id = result.last_insert_id();

    if let Some((username, hashed)) = &hashed {
        sqlx::query("INSERT INTO users (employee_id, username, password, role) VALUES (?, ?, ?, ?)")
            .bind(employee_id)
            .bind(username)
            .bind(hashed)
            .bind(role.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    ApiError::Conflict("Username already taken".into())
                } else {
                    ApiError::from(e)
                }
            })?;
    }

    tx.commit().await?;

    let username = hashed.map(|(username, _)| username);
    if let Some(username) = &username {
        usernames.mark_taken(username).await;
    }

    info!(employee_id, with_login = username.is_some(), "Employee created");

    Ok(HttpResponse::Ok().json(CreatedEmployee {
        employee: payload.employee.into_employee(employee_id),
        role: username.as_ref().map(|_| role),
        username,
    }))
}

/// Update employee
///
/// Full update of every field; the input is echoed back with the id.
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    let emp = payload.into_inner();
    emp.validate()?;

    sqlx::query(
        r#"
        UPDATE employees
        SET name = ?, email = ?, phone = ?, address = ?, department = ?, position = ?,
            date_hired = ?, salary = ?, status = ?,
            emergency_contact_name = ?, emergency_contact_phone = ?, emergency_contact_relationship = ?
        WHERE id = ?
        "#,
    )
    .bind(&emp.name)
    .bind(&emp.email)
    .bind(&emp.phone)
    .bind(&emp.address)
    .bind(&emp.department)
    .bind(&emp.position)
    .bind(emp.hired_on())
    .bind(emp.salary)
    .bind(emp.status.to_string())
    .bind(&emp.emergency_contact.name)
    .bind(&emp.emergency_contact.phone)
    .bind(&emp.emergency_contact.relationship)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(emp.into_employee(employee_id)))
}

/// Delete employee
///
/// Dependent rows are left in place and a missing id is not an error.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    debug!(employee_id, rows = result.rows_affected(), "Employee delete executed");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted",
        "id": employee_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(body: serde_json::Value) -> CreateEmployee {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn accepts_the_snake_case_hire_date_sent_by_the_client() {
        let payload = create(json!({
            "name": "John Doe",
            "email": "john@company.com",
            "date_hired": "2024-01-01",
            "status": "On Leave",
            "emergencyContact": {"name": "Jane", "phone": "555", "relationship": "Spouse"}
        }));

        let emp = &payload.employee;
        assert_eq!(emp.hired_on(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(emp.status, EmployeeStatus::OnLeave);
        assert_eq!(emp.emergency_contact.relationship.as_deref(), Some("Spouse"));
        assert!(payload.credentials().unwrap().is_none());
    }

    #[test]
    fn credentials_require_both_parts() {
        let payload = create(json!({
            "name": "John", "email": "j@c.com", "username": "jdoe"
        }));
        assert!(payload.credentials().is_err());

        let payload = create(json!({
            "name": "John", "email": "j@c.com", "username": " jdoe ", "password": "pw"
        }));
        assert_eq!(payload.credentials().unwrap(), Some(("jdoe", "pw")));
    }

    #[test]
    fn echo_flattens_status_and_keeps_contact() {
        let payload = create(json!({
            "name": "John", "email": "j@c.com",
            "emergencyContact": {"name": "Jane"}
        }));
        let value = serde_json::to_value(payload.employee.into_employee(9)).unwrap();

        assert_eq!(value["id"], 9);
        assert_eq!(value["status"], "Active");
        assert_eq!(value["emergencyContact"]["name"], "Jane");
    }

    #[test]
    fn blank_name_is_rejected() {
        let payload = create(json!({"name": "  ", "email": "j@c.com"}));
        assert!(payload.employee.validate().is_err());
    }

    #[test]
    fn accepts_the_body_posted_by_the_employee_form() {
        // the form spreads its state and adds `date_hired` next to `hireDate`
        let payload = create(json!({
            "name": "John Doe",
            "email": "john@company.com",
            "phone": "555-0100",
            "address": "1 Main St",
            "department": "Engineering",
            "position": "Software Engineer",
            "hireDate": "2024-01-01",
            "salary": "85000",
            "status": "Active",
            "emergencyContact": {"name": "Jane", "phone": "555-0101", "relationship": "Spouse"},
            "date_hired": "2024-01-01"
        }));

        payload.employee.validate().unwrap();
        let emp = payload.employee.into_employee(1);
        assert_eq!(emp.date_hired, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(emp.salary, Some(85000.0));
    }

    #[test]
    fn edit_body_prefers_the_stored_hire_date() {
        // editing re-sends the fetched row, so `dateHired` arrives with blank form keys
        let payload: EmployeePayload = serde_json::from_value(json!({
            "id": 4,
            "name": "John Doe",
            "email": "john@company.com",
            "dateHired": "2023-05-02",
            "hireDate": "",
            "date_hired": "",
            "salary": 90000.0,
            "status": "On Leave",
            "emergencyContact": {"name": "", "phone": "", "relationship": ""}
        }))
        .unwrap();

        assert_eq!(payload.hired_on(), NaiveDate::from_ymd_opt(2023, 5, 2));
        assert_eq!(payload.salary, Some(90000.0));
    }

    #[test]
    fn blank_salary_is_stored_as_null() {
        let payload = create(json!({"name": "John", "email": "j@c.com", "salary": ""}));
        assert_eq!(payload.employee.salary, None);
    }
}
