//! Review data models and API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a review record from the database.
///
/// # Database Table
///
/// Maps to the `reviews` table. `booking_id` is unique, so a booking can be
/// reviewed at most once.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Review {
    pub id: Uuid,

    pub booking_id: Uuid,

    pub customer_id: Uuid,

    pub maid_id: Uuid,

    /// 1 to 5 inclusive (enforced by CHECK constraint)
    pub rating: i32,

    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Column list shared by every query returning [`Review`].
pub const REVIEW_COLUMNS: &str =
    "id, booking_id, customer_id, maid_id, rating, comment, created_at";

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Request body for `POST /reviews`.
///
/// # JSON Example
///
/// ```json
/// {
///   "booking_id": "770e8400-e29b-41d4-a716-446655440000",
///   "rating": 5,
///   "comment": "Spotless"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,

    pub rating: i32,

    #[serde(default)]
    pub comment: Option<String>,
}

/// Response body for `GET /reviews/booking/{id}/exists`.
#[derive(Debug, Serialize)]
pub struct ReviewExistsResponse {
    pub exists: bool,
}
