//! Review HTTP handlers.
//!
//! - POST /reviews - Customer reviews a completed booking (authenticated)
//! - GET /reviews/maid/{maid_id} - Reviews for a maid
//! - GET /reviews/booking/{booking_id}/exists - Whether a booking was reviewed (authenticated)

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DbPool,
    error::AppError,
    middleware::auth::{AuthContext, auth_middleware},
    models::{
        booking::{BOOKING_COLUMNS, Booking, BookingStatus},
        review::{
            CreateReviewRequest, MAX_RATING, MIN_RATING, REVIEW_COLUMNS, Review,
            ReviewExistsResponse,
        },
        user::UserRole,
    },
};

pub fn router(state: &AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/booking/{booking_id}/exists", get(review_exists))
        .route_layer(middleware::from_fn_with_state(
            state.settings.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/reviews/maid/{maid_id}", get(list_maid_reviews))
        .merge(authenticated)
}

/// Review a completed booking.
///
/// # Request Body
///
/// ```json
/// { "booking_id": "770e8400-...", "rating": 5, "comment": "Spotless" }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the review
/// - **Error (400)**: rating outside 1..=5, or booking not completed
/// - **Error (403)**: caller is not a customer
/// - **Error (404)**: booking not found or not the caller's
/// - **Error (409)**: booking already reviewed
pub async fn create_review(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    auth.require_role(UserRole::Customer)?;

    if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(AppError::InvalidRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND customer_id = $2"
    ))
    .bind(request.booking_id)
    .bind(auth.user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::BookingNotFound)?;

    if booking.status()? != BookingStatus::Completed {
        return Err(AppError::InvalidRequest(
            "Only completed bookings can be reviewed".to_string(),
        ));
    }

    let comment = request
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    // The unique index on booking_id settles concurrent duplicates.
    let review = sqlx::query_as::<_, Review>(&format!(
        r#"
        INSERT INTO reviews (booking_id, customer_id, maid_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {REVIEW_COLUMNS}
        "#
    ))
    .bind(booking.id)
    .bind(booking.customer_id)
    .bind(booking.maid_id)
    .bind(request.rating)
    .bind(comment)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            AppError::ReviewAlreadyExists
        } else {
            AppError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List reviews for a maid, newest first.
///
/// Returns an empty list for unknown IDs.
pub async fn list_maid_reviews(
    State(pool): State<DbPool>,
    Path(maid_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}
        FROM reviews
        WHERE maid_id = $1
        ORDER BY created_at DESC
        "#
    ))
    .bind(maid_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(reviews))
}

/// Whether a booking the caller is party to has been reviewed.
pub async fn review_exists(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ReviewExistsResponse>, AppError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM reviews
            WHERE booking_id = $1 AND (customer_id = $2 OR maid_id = $2)
        )
        "#,
    )
    .bind(booking_id)
    .bind(auth.user_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(ReviewExistsResponse { exists }))
}
