//! Maid profile models.
//!
//! A maid profile is a `users` row with role `maid`, joined with the
//! aggregate of the reviews left for that maid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Public view of a maid, with review aggregates.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct MaidProfile {
    pub id: Uuid,

    pub full_name: String,

    pub email: String,

    pub phone_number: Option<String>,

    pub bio: Option<String>,

    /// Free text, e.g. `cleaning, laundry, cooking`
    pub skills: Option<String>,

    pub experience_years: Option<i32>,

    pub hourly_rate_cents: Option<i64>,

    pub is_available: bool,

    /// Mean rating, `None` until the first review
    pub average_rating: Option<f64>,

    pub review_count: i64,

    pub created_at: DateTime<Utc>,
}

/// Aggregating select shared by the maid queries.
///
/// Callers append their own `WHERE` conditions on `u` before the grouping.
pub const MAID_PROFILE_SELECT: &str = r#"
    SELECT u.id, u.full_name, u.email, u.phone_number, u.bio, u.skills,
           u.experience_years, u.hourly_rate_cents, u.is_available, u.created_at,
           AVG(r.rating)::DOUBLE PRECISION AS average_rating,
           COUNT(r.id) AS review_count
    FROM users u
    LEFT JOIN reviews r ON r.maid_id = u.id
    WHERE u.role = 'maid'
"#;

/// Request body for `PUT /maids/me`. Absent fields are left unchanged.
///
/// # JSON Example
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
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMaidProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub skills: Option<String>,

    #[serde(default)]
    pub experience_years: Option<i32>,

    #[serde(default)]
    pub hourly_rate_cents: Option<i64>,

    #[serde(default)]
    pub is_available: Option<bool>,
}

impl UpdateMaidProfileRequest {
    /// Reject negative rates and experience before touching the database.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.hourly_rate_cents.is_some_and(|rate| rate < 0) {
            return Err(AppError::InvalidRequest(
                "hourly_rate_cents must not be negative".to_string(),
            ));
        }
        if self.experience_years.is_some_and(|years| years < 0) {
            return Err(AppError::InvalidRequest(
                "experience_years must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Maid-only fields merged into the `/users/me` response for maid accounts.
#[derive(Debug, Clone, Serialize)]
pub struct MaidProfileFields {
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub hourly_rate_cents: Option<i64>,
    pub is_available: bool,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

impl From<MaidProfile> for MaidProfileFields {
    fn from(profile: MaidProfile) -> Self {
        Self {
            bio: profile.bio,
            skills: profile.skills,
            experience_years: profile.experience_years,
            hourly_rate_cents: profile.hourly_rate_cents,
            is_available: profile.is_available,
            average_rating: profile.average_rating,
            review_count: profile.review_count,
        }
    }
}
