//! Current-user HTTP handlers.
//!
//! - GET /users/me - Profile of the authenticated user, with maid profile
//!   fields for maid accounts
//! - PUT /users/me - Update name and phone number

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::get,
};

use crate::{
    app::AppState,
    db::DbPool,
    error::AppError,
    handlers::maids::fetch_profile,
    middleware::auth::{AuthContext, auth_middleware},
    models::user::{USER_COLUMNS, UpdateUserRequest, User, UserResponse, UserRole},
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me))
        .route_layer(middleware::from_fn_with_state(
            state.settings.clone(),
            auth_middleware,
        ))
}

/// Get the authenticated user.
///
/// # Response
///
/// - **Success (200 OK)**: the user; maids also get `bio`, `skills`,
///   `experience_years`, `hourly_rate_cents`, `is_available`,
///   `average_rating` and `review_count`
/// - **Error (401)**: missing or invalid token
/// - **Error (404)**: the account behind the token no longer exists
pub async fn get_me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(auth.user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    Ok(Json(user_response(&pool, user).await?))
}

/// Update the authenticated user's name and phone number.
///
/// # Request Body
///
/// ```json
/// { "full_name": "Jane Q. Doe", "phone_number": "+15550101" }
/// ```
///
/// Absent fields are left unchanged. An empty `phone_number` clears it.
pub async fn update_me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let full_name = request.full_name.as_deref().map(str::trim);
    if full_name.is_some_and(str::is_empty) {
        return Err(AppError::InvalidRequest(
            "full_name must not be empty".to_string(),
        ));
    }

    // Some("") clears the phone number, None leaves it alone.
    let phone_number = request.phone_number.as_deref().map(str::trim);

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET full_name = COALESCE($1, full_name),
            phone_number = CASE WHEN $2::TEXT IS NULL THEN phone_number ELSE NULLIF($2, '') END,
            updated_at = NOW()
        WHERE id = $3
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(full_name)
    .bind(phone_number)
    .bind(auth.user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    Ok(Json(user_response(&pool, user).await?))
}

async fn user_response(pool: &DbPool, user: User) -> Result<UserResponse, AppError> {
    let maid_id = (user.role()? == UserRole::Maid).then_some(user.id);
    let response = UserResponse::from(user);

    match maid_id {
        Some(id) => match fetch_profile(pool, id).await? {
            Some(profile) => Ok(response.with_maid_profile(profile)),
            None => Ok(response),
        },
        None => Ok(response),
    }
}
