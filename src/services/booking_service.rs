//! Booking service - creation and status changes.
//!
//! # Status rules
//!
//! | From     | To        | Who               |
//! |----------|-----------|-------------------|
//! | pending  | accepted  | maid              |
//! | pending  | canceled  | maid or customer  |
//! | accepted | completed | maid              |
//! | accepted | canceled  | maid or customer  |
//!
//! Status changes run inside a database transaction with the booking row
//! locked, so two parties updating at once cannot both succeed from the same
//! starting status.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        booking::{
            BOOKING_COLUMNS, Booking, BookingStatus, CreateBookingRequest,
            UpdateBookingStatusRequest, clean_notes,
        },
        user::UserRole,
    },
};

/// Check that `party` may move a booking from `current` to `requested`.
///
/// # Errors
///
/// - `InvalidStatusTransition`: the move is not in the table above
/// - `Forbidden`: the move exists but belongs to the other party
pub fn check_transition(
    current: BookingStatus,
    requested: BookingStatus,
    party: UserRole,
) -> Result<(), AppError> {
    use BookingStatus::*;

    let allowed: &[UserRole] = match (current, requested) {
        (Pending, Accepted) | (Accepted, Completed) => &[UserRole::Maid],
        (Pending, Canceled) | (Accepted, Canceled) => &[UserRole::Maid, UserRole::Customer],
        _ => {
            return Err(AppError::InvalidStatusTransition {
                from: current,
                to: requested,
            });
        }
    };

    if allowed.contains(&party) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Validate a new booking request without touching the database.
fn validate_new_booking(customer_id: Uuid, request: &CreateBookingRequest) -> Result<(), AppError> {
    if request.service_type.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "service_type must not be empty".to_string(),
        ));
    }
    if request.maid_id == customer_id {
        return Err(AppError::InvalidRequest(
            "You cannot book yourself".to_string(),
        ));
    }
    if request.booking_date < Utc::now().date_naive() {
        return Err(AppError::InvalidRequest(
            "booking_date must not be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Create a pending booking from a customer for an available maid.
///
/// # Errors
///
/// - `InvalidRequest`: blank service type, self-booking, or past date
/// - `MaidNotFound`: `maid_id` is not a maid
/// - `InvalidRequest`: the maid is not accepting bookings
pub async fn create_booking(
    pool: &DbPool,
    customer_id: Uuid,
    request: CreateBookingRequest,
) -> Result<Booking, AppError> {
    validate_new_booking(customer_id, &request)?;

    let is_available: bool =
        sqlx::query_scalar("SELECT is_available FROM users WHERE id = $1 AND role = 'maid'")
            .bind(request.maid_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::MaidNotFound)?;

    if !is_available {
        return Err(AppError::InvalidRequest(
            "This maid is not accepting bookings".to_string(),
        ));
    }

    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings (customer_id, maid_id, service_type, booking_date, booking_time, notes, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending')
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(customer_id)
    .bind(request.maid_id)
    .bind(request.service_type.trim())
    .bind(request.booking_date)
    .bind(request.booking_time)
    .bind(clean_notes(request.notes.as_deref()))
    .fetch_one(pool)
    .await?;

    tracing::info!(booking_id = %booking.id, maid_id = %booking.maid_id, "Booking created");

    Ok(booking)
}

/// Apply a status change requested by `user_id`.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Lock the booking row
/// 3. Resolve which party the caller is and check the transition
/// 4. Update status (and notes, when non-blank)
/// 5. Commit
///
/// # Errors
///
/// - `BookingNotFound`: no such booking, or the caller is not a party to it
/// - `InvalidStatusTransition` / `Forbidden`: see [`check_transition`]
pub async fn update_status(
    pool: &DbPool,
    booking_id: Uuid,
    user_id: Uuid,
    request: UpdateBookingStatusRequest,
) -> Result<Booking, AppError> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::BookingNotFound)?;

    let party = booking
        .party_of(user_id)
        .ok_or(AppError::BookingNotFound)?;

    check_transition(booking.status()?, request.status, party)?;

    let updated = sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings
        SET status = $1,
            notes = COALESCE($2, notes),
            updated_at = NOW()
        WHERE id = $3
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(request.status.as_str())
    .bind(clean_notes(request.notes.as_deref()))
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        from = %booking.status,
        to = %updated.status,
        "Booking status updated"
    );

    Ok(updated)
}
