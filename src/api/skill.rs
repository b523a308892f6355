use crate::{
    error::ApiError,
    model::skill::{Skill, SkillLevel},
    utils::db_utils::EmployeeFilter,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[schema(example = "Rust")]
    pub skill: String,
    pub level: SkillLevel,
    pub notes: Option<String>,
}

fn echo(id: u64, payload: &SkillPayload) -> serde_json::Value {
    let mut value = json!(payload);
    value["id"] = json!(id);
    value
}

/// Trims the skill name so the stored row and the echo agree.
fn normalize(mut payload: SkillPayload) -> Result<SkillPayload, ApiError> {
    payload.skill = payload.skill.trim().to_string();
    if payload.skill.is_empty() {
        return Err(ApiError::bad_request("skill is required"));
    }
    Ok(payload)
}

#[utoipa::path(
    get,
    path = "/api/skills",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Skills ordered by name", body = [Skill]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn list_skills(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let skills = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, Skill>(
                "SELECT * FROM skills WHERE employee_id = ? ORDER BY skill ASC, id ASC",
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY skill ASC, id ASC")
                .fetch_all(pool.get_ref())
                .await?
        }
    };

    Ok(HttpResponse::Ok().json(skills))
}

#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = SkillPayload,
    responses(
        (status = 200, description = "Skill created", body = Skill),
        (status = 400, description = "Missing skill or unknown level"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn create_skill(
    pool: web::Data<MySqlPool>,
    payload: web::Json<SkillPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = normalize(payload.into_inner())?;

    let result = sqlx::query("INSERT INTO skills (employee_id, skill, level, notes) VALUES (?, ?, ?, ?)")
        .bind(payload.employee_id)
        .bind(&payload.skill)
        .bind(payload.level.to_string())
        .bind(&payload.notes)
        .execute(pool.get_ref())
        .await?;

    let id = result.last_insert_id();
    info!(skill_id = id, employee_id = payload.employee_id, "Skill created");

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    put,
    path = "/api/skills/{id}",
    params(("id" = u64, Path, description = "Skill ID")),
    request_body = SkillPayload,
    responses(
        (status = 200, description = "Skill updated", body = Skill),
        (status = 400, description = "Missing skill or unknown level"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn update_skill(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<SkillPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let payload = normalize(payload.into_inner())?;

    sqlx::query("UPDATE skills SET employee_id = ?, skill = ?, level = ?, notes = ? WHERE id = ?")
        .bind(payload.employee_id)
        .bind(&payload.skill)
        .bind(payload.level.to_string())
        .bind(&payload.notes)
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(echo(id, &payload)))
}

#[utoipa::path(
    delete,
    path = "/api/skills/{id}",
    params(("id" = u64, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill deleted", body = Object, example = json!({
            "message": "Skill deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Training"
)]
pub async fn delete_skill(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    sqlx::query("DELETE FROM skills WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Skill deleted",
        "id": id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_matches_the_trimmed_stored_name() {
        let payload: SkillPayload = serde_json::from_value(json!({
            "employeeId": "7",
            "skill": "  Rust ",
            "level": "Advanced"
        }))
        .unwrap();

        let payload = normalize(payload).unwrap();
        let value = echo(4, &payload);
        assert_eq!(value["skill"], "Rust");
        assert_eq!(value["employeeId"], 7);
        assert_eq!(value["level"], "Advanced");
    }

    #[test]
    fn blank_skill_is_rejected() {
        let payload: SkillPayload =
            serde_json::from_value(json!({"employeeId": 7, "skill": "   ", "level": "Expert"}))
                .unwrap();
        assert!(normalize(payload).is_err());
    }
}
