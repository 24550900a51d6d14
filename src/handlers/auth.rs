//! Authentication HTTP handlers.
//!
//! - POST /auth/register - Create a customer or maid account
//! - POST /auth/login - Exchange credentials for a token pair
//! - POST /auth/refresh - Exchange a refresh token for a new token pair

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    app::AppState,
    config::Settings,
    db::DbPool,
    error::AppError,
    models::user::{
        LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, USER_COLUMNS, User,
        UserResponse,
    },
    services::auth_service::{self, TokenKind},
};

const MIN_PASSWORD_LENGTH: usize = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Lowercase and trim an email, rejecting values that cannot be an address.
fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::InvalidRequest("Invalid email address".to_string())),
    }
}

/// Register a new user.
///
/// # Response
///
/// - **Success (201 Created)**: the created user
/// - **Error (400)**: invalid email, blank name, or short password
/// - **Error (409)**: email already registered
pub async fn register(
    State(pool): State<DbPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = normalize_email(&request.email)?;

    let full_name = request.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::InvalidRequest(
            "full_name must not be empty".to_string(),
        ));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = auth_service::hash_password(&request.password)?;
    let phone_number = request
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, full_name, phone_number, role, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&email)
    .bind(full_name)
    .bind(phone_number)
    .bind(request.role.as_str())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            AppError::EmailAlreadyRegistered
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = %user.id, role = %request.role, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with email and password.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "token_type": "bearer",
///   "expires_in": 1800,
///   "user": { "id": "...", "email": "jane@example.com", "role": "customer", ... }
/// }
/// ```
///
/// Unknown email and wrong password both return 401 `invalid_credentials`.
pub async fn login(
    State(pool): State<DbPool>,
    State(settings): State<Arc<Settings>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = request.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(&email)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !auth_service::verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    token_response(&settings, user)
}

/// Exchange a refresh token for a new token pair.
///
/// The user is re-read so deleted accounts cannot keep refreshing.
pub async fn refresh(
    State(pool): State<DbPool>,
    State(settings): State<Arc<Settings>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let claims = auth_service::decode_token(&settings, &request.refresh_token, TokenKind::Refresh)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(claims.sub)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidToken)?;

    token_response(&settings, user)
}

fn token_response(settings: &Settings, user: User) -> Result<Json<TokenResponse>, AppError> {
    let pair = auth_service::issue_token_pair(settings, user.id, user.role()?)?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer",
        expires_in: pair.expires_in,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("jane@localhost").is_err());
    }
}
