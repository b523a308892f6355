use crate::{
    error::ApiError,
    model::training::{Training, TrainingStatus},
    utils::db_utils::EmployeeFilter,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPayload {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[schema(example = "Rust for backend engineers")]
    pub title: String,
    #[schema(example = "Acme Academy")]
    pub provider: Option<String>,
    #[schema(example = "2024-07-01", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TrainingStatus,
    pub notes: Option<String>,
}

fn echo(id: u64, payload: &TrainingPayload) -> serde_json::Value {
    let mut value = json!(payload);
    value["id"] = json!(id);
    value
}

fn require_title(payload: &TrainingPayload) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/trainings",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Trainings, most recent first", body = [Training]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn list_trainings(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let trainings = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, Training>(
                "SELECT * FROM trainings WHERE employee_id = ? ORDER BY date DESC, id DESC",
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Training>("SELECT * FROM trainings ORDER BY date DESC, id DESC")
                .fetch_all(pool.get_ref())
                .await?
        }
    };

    Ok(HttpResponse::Ok().json(trainings))
}

#[utoipa::path(
    post,
    path = "/api/trainings",
    request_body = TrainingPayload,
    responses(
        (status = 200, description = "Training created", body = Training),
        (status = 400, description = "Missing title or unknown status"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn create_training(
    pool: web::Data<MySqlPool>,
    payload: web::Json<TrainingPayload>,
) -> Result<HttpResponse, ApiError> {
    require_title(&payload)?;

    let result = sqlx::query(
        r#"
        INSERT INTO trainings (employee_id, title, provider, date, status, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.title)
    .bind(&payload.provider)
    .bind(payload.date)
    .bind(payload.status.to_string())
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await?;

    let id = result.last_insert_id();
    info!(training_id = id, employee_id = payload.employee_id, "Training created");

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    put,
    path = "/api/trainings/{id}",
    params(("id" = u64, Path, description = "Training ID")),
    request_body = TrainingPayload,
    responses(
        (status = 200, description = "Training updated", body = Training),
        (status = 400, description = "Missing title or unknown status"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn update_training(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<TrainingPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    require_title(&payload)?;

    sqlx::query(
        r#"
        UPDATE trainings
        SET employee_id = ?, title = ?, provider = ?, date = ?, status = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.title)
    .bind(&payload.provider)
    .bind(payload.date)
    .bind(payload.status.to_string())
    .bind(&payload.notes)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    delete,
    path = "/api/trainings/{id}",
    params(("id" = u64, Path, description = "Training ID")),
    responses(
        (status = 200, description = "Training deleted", body = Object, example = json!({
            "message": "Training deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn delete_training(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    sqlx::query("DELETE FROM trainings WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Training deleted",
        "id": id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_planned_and_rejects_unknown_values() {
        let payload: TrainingPayload =
            serde_json::from_value(json!({"employeeId": 1, "title": "Onboarding"})).unwrap();
        assert_eq!(payload.status, TrainingStatus::Planned);

        let in_progress: TrainingPayload = serde_json::from_value(
            json!({"employeeId": 1, "title": "Onboarding", "status": "In Progress"}),
        )
        .unwrap();
        assert_eq!(echo(2, &in_progress)["status"], "In Progress");

        let unknown = serde_json::from_value::<TrainingPayload>(
            json!({"employeeId": 1, "title": "Onboarding", "status": "Abandoned"}),
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn form_text_values_are_accepted() {
        let payload: TrainingPayload = serde_json::from_value(json!({
            "employeeId": "3",
            "title": "Safety",
            "provider": "",
            "date": "",
            "status": "Completed"
        }))
        .unwrap();

        assert_eq!(payload.employee_id, 3);
        assert_eq!(payload.date, None);
        assert_eq!(payload.status, TrainingStatus::Completed);
    }
}
