use crate::{
    auth::password::verify_password,
    error::ApiError,
    model::user::{UserCredentials, UserProfile},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "s3cret!")]
    pub password: String,
}

/// Login
///
/// Verifies the credentials and returns the user joined with the employee
/// profile. No token is issued.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserProfile),
        (status = 400, description = "Missing username or password", body = Object, example = json!({
            "error": "Username and password are required"
        })),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Invalid credentials"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, payload), fields(username = %payload.username))]
pub async fn login(
    pool: web::Data<MySqlPool>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let Some(user) = sqlx::query_as::<_, UserCredentials>(
        r#"
        SELECT id, employee_id, username, password, role
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(payload.username.trim())
    .fetch_optional(pool.get_ref())
    .await?
    else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    debug!(user_id = user.id, "Verifying password");

    if !verify_password(&payload.password, &user.password) {
        info!(user_id = user.id, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT u.id, u.employee_id, u.username, u.role,
               e.name, e.email, e.phone, e.department, e.position, e.date_hired, e.status
        FROM users u
        JOIN employees e ON e.id = u.employee_id
        WHERE u.id = ?
        "#,
    )
    .bind(user.id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| {
        info!(user_id = user.id, "User has no employee profile");
        ApiError::Unauthorized(INVALID_CREDENTIALS.into())
    })?;

    // non-fatal
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(user_id = user.id, role = %user.role, "Login successful");

    Ok(HttpResponse::Ok().json(profile))
}
