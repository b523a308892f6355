use crate::{
    error::ApiError,
    model::performance_review::{MAX_RATING, MIN_RATING, PerformanceReview},
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
pub struct ReviewPayload {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[schema(example = "Alice Manager")]
    pub reviewer: String,
    #[schema(example = "2024-03-31", format = "date", value_type = String)]
    pub review_date: NaiveDate,
    #[schema(example = 4, minimum = 1, maximum = 5)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub rating: u8,
    pub comments: Option<String>,
}

impl ReviewPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ApiError::bad_request("rating must be between 1 and 5"));
        }
        if self.reviewer.trim().is_empty() {
            return Err(ApiError::bad_request("reviewer is required"));
        }
        Ok(())
    }
}

fn echo(id: u64, payload: &ReviewPayload) -> serde_json::Value {
    let mut value = json!(payload);
    value["id"] = json!(id);
    value
}

#[utoipa::path(
    get,
    path = "/api/performance-reviews",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Reviews, most recent first", body = [PerformanceReview]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Performance"
)]
pub async fn list_reviews(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let reviews = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, PerformanceReview>(
                "SELECT * FROM performance_reviews WHERE employee_id = ? ORDER BY review_date DESC, id DESC",
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, PerformanceReview>(
                "SELECT * FROM performance_reviews ORDER BY review_date DESC, id DESC",
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(reviews))
}

#[utoipa::path(
    post,
    path = "/api/performance-reviews",
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Review created", body = PerformanceReview),
        (status = 400, description = "Rating out of range or missing reviewer"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Performance"
)]
pub async fn create_review(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO performance_reviews (employee_id, reviewer, review_date, rating, comments)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.reviewer)
    .bind(payload.review_date)
    .bind(payload.rating)
    .bind(&payload.comments)
    .execute(pool.get_ref())
    .await?;

    let id = result.last_insert_id();
    info!(review_id = id, employee_id = payload.employee_id, "Performance review created");

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    put,
    path = "/api/performance-reviews/{id}",
    params(("id" = u64, Path, description = "Review ID")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Review updated", body = PerformanceReview),
        (status = 400, description = "Rating out of range or missing reviewer"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Performance"
)]
pub async fn update_review(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    payload.validate()?;

    sqlx::query(
        r#"
        UPDATE performance_reviews
        SET employee_id = ?, reviewer = ?, review_date = ?, rating = ?, comments = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.reviewer)
    .bind(payload.review_date)
    .bind(payload.rating)
    .bind(&payload.comments)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    delete,
    path = "/api/performance-reviews/{id}",
    params(("id" = u64, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = Object, example = json!({
            "message": "Performance review deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Performance"
)]
pub async fn delete_review(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    sqlx::query("DELETE FROM performance_reviews WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Performance review deleted",
        "id": id
    })))
}
