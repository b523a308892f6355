use crate::{
    error::ApiError,
    model::leave_request::{LeaveRequest, LeaveStatus},
    utils::db_utils::{SqlFilter, bind_query_as},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

const LEAVE_SELECT: &str = "SELECT l.id, l.employee_id, e.name AS employee_name, l.`type`, \
     l.start_date, l.end_date, l.reason, l.status, l.comment, l.created_at \
     FROM leave_requests l LEFT JOIN employees e ON e.id = l.employee_id";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[serde(rename = "type")]
    #[schema(example = "Vacation")]
    pub leave_type: String,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
}

impl CreateLeave {
    fn validate(&self) -> Result<(), ApiError> {
        if self.leave_type.trim().is_empty() {
            return Err(ApiError::bad_request("type is required"));
        }
        if self.start_date > self.end_date {
            return Err(ApiError::bad_request("startDate cannot be after endDate"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaveDecision {
    /// Exactly `Approved` or `Denied`
    #[schema(example = "Approved")]
    pub status: String,
    #[schema(example = "Enjoy your holiday")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeaveFilter {
    /// Filter by leave status
    pub status: Option<String>,
    /// Filter by employee ID
    pub employee_id: Option<u64>,
}

async fn fetch_filtered(pool: &MySqlPool, filter: SqlFilter) -> Result<Vec<LeaveRequest>, ApiError> {
    let sql = format!(
        "{LEAVE_SELECT}{} ORDER BY l.created_at DESC, l.id DESC",
        filter.where_clause()
    );
    debug!(sql = %sql, values = ?filter.values(), "Fetching leave requests");

    let rows = bind_query_as(sqlx::query_as::<_, LeaveRequest>(&sql), filter.values())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-requests",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "id": 1,
            "status": "Pending"
        })),
        (status = 400, description = "Missing type or inverted dates"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, `type`, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.leave_type.trim())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .bind(LeaveStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await?;

    let id = result.last_insert_id();
    info!(leave_id = id, employee_id = payload.employee_id, "Leave request submitted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request submitted",
        "id": id,
        "status": LeaveStatus::Pending.to_string()
    })))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave requests, newest first", body = [LeaveRequest]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn list_leaves(
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filter = SqlFilter::new()
        .and_opt("l.status = ?", query.status.filter(|s| !s.is_empty()))
        .and_opt("l.employee_id = ?", query.employee_id);

    let rows = fetch_filtered(pool.get_ref(), filter).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/leave-requests/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "The employee's leave requests", body = [LeaveRequest]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn employee_leaves(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let filter = SqlFilter::new().and("l.employee_id = ?", path.into_inner());
    let rows = fetch_filtered(pool.get_ref(), filter).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/* =========================
Approve / deny
========================= */
#[utoipa::path(
    put,
    path = "/api/leave-requests/{leave_id}/status",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body = LeaveDecision,
    responses(
        (status = 200, description = "Decision recorded", body = Object, example = json!({
            "message": "Leave request approved",
            "id": 1,
            "status": "Approved",
            "comment": "Enjoy your holiday"
        })),
        (status = 400, description = "Invalid status, or request not pending", body = Object, example = json!({
            "error": "Leave request not found or already processed"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn set_leave_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDecision>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let status = LeaveStatus::parse_decision(&payload.status)
        .ok_or_else(|| ApiError::bad_request("Invalid status. Allowed: Approved, Denied"))?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, comment = ?
        WHERE id = ?
        AND status = 'Pending'
        "#,
    )
    .bind(status.to_string())
    .bind(&payload.comment)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::bad_request(
            "Leave request not found or already processed",
        ));
    }

    info!(leave_id, %status, "Leave request decided");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave request {}", status.to_string().to_lowercase()),
        "id": leave_id,
        "status": status.to_string(),
        "comment": payload.comment
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave(start: &str, end: &str) -> CreateLeave {
        serde_json::from_value(json!({
            "employeeId": 7,
            "type": "Sick",
            "startDate": start,
            "endDate": end
        }))
        .unwrap()
    }

    #[test]
    fn single_day_leave_is_valid() {
        assert!(leave("2024-06-01", "2024-06-01").validate().is_ok());
    }

    #[test]
    fn inverted_dates_are_rejected() {
        assert!(leave("2024-06-05", "2024-06-01").validate().is_err());
    }
}
