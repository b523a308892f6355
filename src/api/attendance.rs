use crate::{
    error::ApiError,
    model::attendance::{Attendance, AttendanceStatus},
    utils::db_utils::{SqlFilter, bind_query_as},
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

const ATTENDANCE_SELECT: &str = "SELECT a.id, a.employee_id, e.name AS employee_name, a.date, \
     a.clock_in, a.clock_out, a.status \
     FROM attendance a LEFT JOIN employees e ON e.id = a.employee_id";

/// Insert-or-overwrite of today's clock-in; keyed on (employee_id, date).
const CLOCK_IN_SQL: &str = r#"
    INSERT INTO attendance (employee_id, date, clock_in, status)
    VALUES (?, ?, ?, 'Present')
    ON DUPLICATE KEY UPDATE clock_in = VALUES(clock_in), status = 'Present'
"#;

const CLOCK_OUT_SQL: &str = r#"
    UPDATE attendance
    SET clock_out = ?
    WHERE employee_id = ? AND date = ?
"#;

const ABSENT_SQL: &str = r#"
    INSERT INTO attendance (employee_id, date, status)
    VALUES (?, ?, 'Absent')
    ON DUPLICATE KEY UPDATE status = 'Absent'
"#;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceAction {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    /// Only this employee
    pub employee_id: Option<u64>,
    /// `Present` or `Absent`
    pub status: Option<String>,
}

/// Server-local time cut to whole seconds, the precision of a `TIME` column,
/// so the echoed clock time equals the stored one.
fn clock_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

async fn fetch_filtered(
    pool: &MySqlPool,
    filter: SqlFilter,
    order: &str,
) -> Result<Vec<Attendance>, ApiError> {
    let sql = format!("{ATTENDANCE_SELECT}{} ORDER BY {order}", filter.where_clause());
    debug!(sql = %sql, values = ?filter.values(), "Fetching attendance");

    let rows = bind_query_as(sqlx::query_as::<_, Attendance>(&sql), filter.values())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Clock in
///
/// Clocking in twice on the same day overwrites the clock-in time and
/// resets the status to Present.
#[utoipa::path(
    post,
    path = "/api/attendance/clockin",
    request_body = AttendanceAction,
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in successfully",
            "employeeId": 7,
            "date": "2024-05-01",
            "clockIn": "09:01:12"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AttendanceAction>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = payload.employee_id;
    let now = clock_now();
    let (date, time) = (now.date(), now.time());

    sqlx::query(CLOCK_IN_SQL)
        .bind(employee_id)
        .bind(date)
        .bind(time)
        .execute(pool.get_ref())
        .await?;

    info!(employee_id, %date, "Clocked in");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked in successfully",
        "employeeId": employee_id,
        "date": date,
        "clockIn": time.format("%H:%M:%S").to_string()
    })))
}

/// Clock out
///
/// Writes the clock-out time only when a row exists for today.
#[utoipa::path(
    post,
    path = "/api/attendance/clockout",
    request_body = AttendanceAction,
    responses(
        (status = 200, description = "Clocked out (no-op without a clock-in)", body = Object, example = json!({
            "message": "Clocked out successfully",
            "employeeId": 7,
            "date": "2024-05-01",
            "clockOut": "17:30:00"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AttendanceAction>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = payload.employee_id;
    let now = clock_now();
    let (date, time) = (now.date(), now.time());

    let result = sqlx::query(CLOCK_OUT_SQL)
        .bind(time)
        .bind(employee_id)
        .bind(date)
        .execute(pool.get_ref())
        .await?;

    info!(employee_id, %date, matched = result.rows_affected(), "Clocked out");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked out successfully",
        "employeeId": employee_id,
        "date": date,
        "clockOut": time.format("%H:%M:%S").to_string()
    })))
}

/// Mark absent for today
#[utoipa::path(
    post,
    path = "/api/attendance/absent",
    request_body = AttendanceAction,
    responses(
        (status = 200, description = "Marked absent", body = Object, example = json!({
            "message": "Marked as absent",
            "employeeId": 7,
            "date": "2024-05-01"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn mark_absent(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AttendanceAction>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = payload.employee_id;
    let date = Local::now().date_naive();

    sqlx::query(ABSENT_SQL)
        .bind(employee_id)
        .bind(date)
        .execute(pool.get_ref())
        .await?;

    info!(employee_id, %date, "Marked absent");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Marked as absent",
        "employeeId": employee_id,
        "date": date
    })))
}

/// All attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Every attendance row, newest first", body = [Attendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let rows = fetch_filtered(pool.get_ref(), SqlFilter::new(), "a.date DESC, a.id DESC").await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Today's attendance for all employees
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Rows dated today", body = [Attendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today_attendance(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let filter = SqlFilter::new().and("a.date = ?", Local::now().date_naive());
    let rows = fetch_filtered(pool.get_ref(), filter, "e.name ASC, a.id ASC").await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// One employee's attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "History, newest first", body = [Attendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let filter = SqlFilter::new().and("a.employee_id = ?", path.into_inner());
    let rows = fetch_filtered(pool.get_ref(), filter, "a.date DESC").await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Attendance on a given date
#[utoipa::path(
    get,
    path = "/api/attendance/date/{date}",
    params(
        ("date" = String, Path, description = "Date as YYYY-MM-DD"),
        AttendanceFilter
    ),
    responses(
        (status = 200, description = "Rows on that date", body = [Attendance]),
        (status = 400, description = "Malformed date or status"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_by_date(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    let date = NaiveDate::parse_from_str(&path, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("date must be YYYY-MM-DD"))?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            AttendanceStatus::from_str(raw)
                .map_err(|_| ApiError::bad_request("status must be Present or Absent"))?,
        ),
    };

    let filter = SqlFilter::new()
        .and("a.date = ?", date)
        .and_opt("a.employee_id = ?", query.employee_id)
        .and_opt("a.status = ?", status.map(|s| s.to_string()));

    let rows = fetch_filtered(pool.get_ref(), filter, "e.name ASC, a.id ASC").await?;
    Ok(HttpResponse::Ok().json(rows))
}
