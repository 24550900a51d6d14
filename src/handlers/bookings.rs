//! Booking HTTP handlers. All routes require authentication.
//!
//! - POST /bookings - Customer books a maid
//! - GET /bookings/me - Customer's bookings
//! - GET /bookings/maid - Maid's assigned bookings
//! - GET /bookings/{id} - One booking, visible to its customer and maid
//! - PATCH /bookings/{id}/status - Accept, complete or cancel

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DbPool,
    error::AppError,
    middleware::auth::{AuthContext, auth_middleware},
    models::{
        booking::{BOOKING_COLUMNS, Booking, CreateBookingRequest, UpdateBookingStatusRequest},
        user::UserRole,
    },
    services::booking_service,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/me", get(list_my_bookings))
        .route("/bookings/maid", get(list_maid_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        .route_layer(middleware::from_fn_with_state(
            state.settings.clone(),
            auth_middleware,
        ))
}

/// Create a booking.
///
/// # Request Body
///
/// ```json
/// {
///   "maid_id": "550e8400-e29b-41d4-a716-446655440000",
///   "service_type": "deep_cleaning",
///   "booking_date": "2025-06-01",
///   "booking_time": "09:30:00",
///   "notes": "Two bedrooms"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the booking, status `pending`
/// - **Error (403)**: caller is not a customer
/// - **Error (404)**: maid not found
pub async fn create_booking(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    auth.require_role(UserRole::Customer)?;

    let booking = booking_service::create_booking(&pool, auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// List the authenticated customer's bookings, newest first.
pub async fn list_my_bookings(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = sqlx::query_as::<_, Booking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE customer_id = $1
        ORDER BY created_at DESC
        "#
    ))
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(bookings))
}

/// List bookings assigned to the authenticated maid, by date and time.
pub async fn list_maid_bookings(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Booking>>, AppError> {
    auth.require_role(UserRole::Maid)?;

    let bookings = sqlx::query_as::<_, Booking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE maid_id = $1
        ORDER BY booking_date, booking_time
        "#
    ))
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(bookings))
}

/// Get one booking.
///
/// Returns 404 both when the booking does not exist and when the caller is
/// not its customer or maid, so IDs cannot be probed.
pub async fn get_booking(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1 AND (customer_id = $2 OR maid_id = $2)
        "#
    ))
    .bind(booking_id)
    .bind(auth.user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::BookingNotFound)?;

    Ok(Json(booking))
}

/// Change a booking's status.
///
/// # Request Body
///
/// ```json
/// { "status": "accepted", "notes": "Will arrive in 30 mins" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: the updated booking
/// - **Error (403)**: the other party owns this transition
/// - **Error (404)**: booking not found
/// - **Error (422)**: transition not allowed from the current status
pub async fn update_booking_status(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking =
        booking_service::update_status(&pool, booking_id, auth.user_id, request).await?;

    Ok(Json(booking))
}
