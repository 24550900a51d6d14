//! User data models and API request/response types.
//!
//! Customers and maids are both users; `role` tells them apart.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, models::maid::MaidProfileFields};

/// Role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Maid,
}

impl UserRole {
    /// Value stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Maid => "maid",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "maid" => Ok(UserRole::Maid),
            other => Err(AppError::InvalidRequest(format!("Unknown role `{other}`"))),
        }
    }
}

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. The maid profile columns are read through
/// [`crate::models::maid::MaidProfile`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Stored trimmed and lowercased; unique.
    pub email: String,

    pub full_name: String,

    pub phone_number: Option<String>,

    /// `customer` or `maid` (enforced by CHECK constraint)
    pub role: String,

    /// Argon2 PHC string, never returned to clients
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role of this user.
    pub fn role(&self) -> Result<UserRole, AppError> {
        self.role.parse()
    }
}

/// Column list shared by every query returning [`User`].
pub const USER_COLUMNS: &str =
    "id, email, full_name, phone_number, role, password_hash, created_at";

/// Request body for `POST /auth/register`.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "jane@example.com",
///   "full_name": "Jane Doe",
///   "phone_number": "+15550100",
///   "role": "customer",
///   "password": "correct horse"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,

    pub full_name: String,

    #[serde(default)]
    pub phone_number: Option<String>,

    pub role: UserRole,

    /// At least 8 characters
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `PUT /users/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Token pair returned by login and refresh.
///
/// # JSON Example
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "token_type": "bearer",
///   "expires_in": 1800,
///   "user": { "id": "...", "email": "jane@example.com", ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,

    pub refresh_token: String,

    /// Always `bearer`
    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    pub user: UserResponse,
}

/// Response body for user endpoints. Omits the password hash.
///
/// For maid accounts, `/users/me` also carries the profile fields
/// (`bio`, `skills`, `experience_years`, `hourly_rate_cents`, `is_available`,
/// `average_rating`, `review_count`) at the top level.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub maid_profile: Option<MaidProfileFields>,
}

impl UserResponse {
    pub fn with_maid_profile(mut self, profile: impl Into<MaidProfileFields>) -> Self {
        self.maid_profile = Some(profile.into());
        self
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            role: user.role,
            created_at: user.created_at,
            maid_profile: None,
        }
    }
}
