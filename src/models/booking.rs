//! Booking data models and API request types.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, models::user::UserRole};

/// Lifecycle of a booking.
///
/// `pending` -> `accepted` -> `completed`, with `canceled` reachable from
/// either of the first two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Completed,
    Canceled,
}

impl BookingStatus {
    /// Value stored in the `bookings.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Completed => "completed",
            BookingStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "completed" => Ok(BookingStatus::Completed),
            "canceled" => Ok(BookingStatus::Canceled),
            other => Err(AppError::InvalidRequest(format!(
                "Invalid booking status `{other}`"
            ))),
        }
    }
}

/// Represents a booking record from the database.
///
/// # Database Table
///
/// Maps to the `bookings` table. Each booking links one customer to one maid
/// for a single date and time slot.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,

    pub customer_id: Uuid,

    pub maid_id: Uuid,

    /// Free-form service label, e.g. `deep_cleaning`
    pub service_type: String,

    pub booking_date: NaiveDate,

    pub booking_time: NaiveTime,

    pub notes: Option<String>,

    /// One of the [`BookingStatus`] values (enforced by CHECK constraint)
    pub status: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Which side of the booking `user_id` is on, if any.
    pub fn party_of(&self, user_id: Uuid) -> Option<UserRole> {
        if user_id == self.maid_id {
            Some(UserRole::Maid)
        } else if user_id == self.customer_id {
            Some(UserRole::Customer)
        } else {
            None
        }
    }

    pub fn status(&self) -> Result<BookingStatus, AppError> {
        self.status.parse()
    }
}

/// Column list shared by every query returning [`Booking`].
pub const BOOKING_COLUMNS: &str = "id, customer_id, maid_id, service_type, booking_date, \
     booking_time, notes, status, created_at, updated_at";

/// Request body for `POST /bookings`.
///
/// # JSON Example
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
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub maid_id: Uuid,

    pub service_type: String,

    pub booking_date: NaiveDate,

    pub booking_time: NaiveTime,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `PATCH /bookings/{id}/status`.
///
/// Blank `notes` are ignored rather than clearing existing notes.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Trim `notes` and drop it when nothing is left.
pub fn clean_notes(notes: Option<&str>) -> Option<&str> {
    notes.map(str::trim).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(customer_id: Uuid, maid_id: Uuid) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            customer_id,
            maid_id,
            service_type: "standard_cleaning".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            booking_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            notes: None,
            status: "pending".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_party_of() {
        let customer = Uuid::new_v4();
        let maid = Uuid::new_v4();
        let booking = booking(customer, maid);

        assert_eq!(booking.party_of(customer), Some(UserRole::Customer));
        assert_eq!(booking.party_of(maid), Some(UserRole::Maid));
        assert_eq!(booking.party_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_status_parsing_rejects_legacy_spellings() {
        assert_eq!(
            "canceled".parse::<BookingStatus>().unwrap(),
            BookingStatus::Canceled
        );
        assert!("cancelled".parse::<BookingStatus>().is_err());
        assert!("confirmed".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_update_request_deserializes() {
        let request: UpdateBookingStatusRequest =
            serde_json::from_str(r#"{"status":"accepted","notes":"Will arrive in 30 mins"}"#)
                .unwrap();
        assert_eq!(request.status, BookingStatus::Accepted);
        assert_eq!(
            clean_notes(request.notes.as_deref()),
            Some("Will arrive in 30 mins")
        );
    }

    #[test]
    fn test_clean_notes() {
        assert_eq!(clean_notes(None), None);
        assert_eq!(clean_notes(Some("")), None);
        assert_eq!(clean_notes(Some("   ")), None);
        assert_eq!(clean_notes(Some("  gate code 42 ")), Some("gate code 42"));
    }
}
