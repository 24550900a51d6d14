//! Maid (service provider) HTTP handlers.
//!
//! - GET /maids - Available maids with rating aggregates
//! - GET /maids/{id} - One maid profile
//! - PUT /maids/me - Maid updates their own profile (authenticated)

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DbPool,
    error::AppError,
    middleware::auth::{AuthContext, auth_middleware},
    models::{
        maid::{MAID_PROFILE_SELECT, MaidProfile, UpdateMaidProfileRequest},
        user::UserRole,
    },
};

pub fn router(state: &AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/maids/me", put(update_my_profile))
        .route_layer(middleware::from_fn_with_state(
            state.settings.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/maids", get(list_maids))
        .route("/maids/{id}", get(get_maid))
        .merge(authenticated)
}

/// List maids currently accepting bookings.
///
/// # Ordering
///
/// Highest average rating first; unrated maids last, then by name.
pub async fn list_maids(State(pool): State<DbPool>) -> Result<Json<Vec<MaidProfile>>, AppError> {
    let maids = sqlx::query_as::<_, MaidProfile>(&format!(
        r#"
        {MAID_PROFILE_SELECT}
          AND u.is_available = TRUE
        GROUP BY u.id
        ORDER BY average_rating DESC NULLS LAST, u.full_name
        "#
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(maids))
}

/// Get one maid profile, available or not.
///
/// # Response
///
/// - **Success (200 OK)**: the profile
/// - **Error (404)**: no user with this ID, or the user is not a maid
pub async fn get_maid(
    State(pool): State<DbPool>,
    Path(maid_id): Path<Uuid>,
) -> Result<Json<MaidProfile>, AppError> {
    let maid = fetch_profile(&pool, maid_id)
        .await?
        .ok_or(AppError::MaidNotFound)?;

    Ok(Json(maid))
}

/// Update the authenticated maid's profile.
///
/// # Request Body
///
/// ```json
/// {
///   "bio": "Ten years of experience",
///   "skills": "cleaning, laundry",
///   "experience_years": 10,
///   "hourly_rate_cents": 2500,
///   "is_available": true
/// }
/// ```
///
/// Absent fields are left unchanged. Negative rate or experience is 400.
/// Customers receive 403.
pub async fn update_my_profile(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateMaidProfileRequest>,
) -> Result<Json<MaidProfile>, AppError> {
    auth.require_role(UserRole::Maid)?;

    request.validate()?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET bio = COALESCE($1, bio),
            skills = COALESCE($2, skills),
            experience_years = COALESCE($3, experience_years),
            hourly_rate_cents = COALESCE($4, hourly_rate_cents),
            is_available = COALESCE($5, is_available),
            updated_at = NOW()
        WHERE id = $6 AND role = 'maid'
        "#,
    )
    .bind(request.bio.as_deref().map(str::trim))
    .bind(request.skills.as_deref().map(str::trim))
    .bind(request.experience_years)
    .bind(request.hourly_rate_cents)
    .bind(request.is_available)
    .bind(auth.user_id)
    .execute(&pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::MaidNotFound);
    }

    let maid = fetch_profile(&pool, auth.user_id)
        .await?
        .ok_or(AppError::MaidNotFound)?;

    Ok(Json(maid))
}

pub(crate) async fn fetch_profile(
    pool: &DbPool,
    maid_id: Uuid,
) -> Result<Option<MaidProfile>, AppError> {
    let maid = sqlx::query_as::<_, MaidProfile>(&format!(
        r#"
        {MAID_PROFILE_SELECT}
          AND u.id = $1
        GROUP BY u.id
        "#
    ))
    .bind(maid_id)
    .fetch_optional(pool)
    .await?;

    Ok(maid)
}
