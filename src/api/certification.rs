use crate::{error::ApiError, model::certification::Certification, utils::db_utils::EmployeeFilter};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificationPayload {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[schema(example = "PMP")]
    pub name: String,
    #[schema(example = "PMI")]
    pub issued_by: Option<String>,
    #[schema(example = "2023-03-20", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_date")]
    pub issue_date: Option<NaiveDate>,
    #[schema(example = "2026-03-20", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_date")]
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn echo(id: u64, payload: &CertificationPayload) -> serde_json::Value {
    let mut value = json!(payload);
    value["id"] = json!(id);
    value
}

fn require_name(payload: &CertificationPayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/certifications",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Certifications, most recently issued first", body = [Certification]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn list_certifications(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let certifications = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, Certification>(
                "SELECT * FROM certifications WHERE employee_id = ? ORDER BY issue_date DESC, id DESC",
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Certification>(
                "SELECT * FROM certifications ORDER BY issue_date DESC, id DESC",
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(certifications))
}

#[utoipa::path(
    post,
    path = "/api/certifications",
    request_body = CertificationPayload,
    responses(
        (status = 200, description = "Certification created", body = Certification),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn create_certification(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CertificationPayload>,
) -> Result<HttpResponse, ApiError> {
    require_name(&payload)?;

    let result = sqlx::query(
        r#"
        INSERT INTO certifications (employee_id, name, issued_by, issue_date, expiry_date, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.name)
    .bind(&payload.issued_by)
    .bind(payload.issue_date)
    .bind(payload.expiry_date)
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await?;

    let id = result.last_insert_id();
    info!(certification_id = id, employee_id = payload.employee_id, "Certification created");

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    put,
    path = "/api/certifications/{id}",
    params(("id" = u64, Path, description = "Certification ID")),
    request_body = CertificationPayload,
    responses(
        (status = 200, description = "Certification updated", body = Certification),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn update_certification(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CertificationPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    require_name(&payload)?;

    sqlx::query(
        r#"
        UPDATE certifications
        SET employee_id = ?, name = ?, issued_by = ?, issue_date = ?, expiry_date = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.name)
    .bind(&payload.issued_by)
    .bind(payload.issue_date)
    .bind(payload.expiry_date)
    .bind(&payload.notes)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    delete,
    path = "/api/certifications/{id}",
    params(("id" = u64, Path, description = "Certification ID")),
    responses(
        (status = 200, description = "Certification deleted", body = Object, example = json!({
            "message": "Certification deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn delete_certification(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    sqlx::query("DELETE FROM certifications WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Certification deleted",
        "id": id
    })))
}
