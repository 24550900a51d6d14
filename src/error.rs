//! Error types and HTTP error response handling.
//!
//! This module defines all request-time errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//! Startup errors live in [`crate::config::ConfigError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::booking::BookingStatus;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed. Details are logged, never returned.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Hashing or token signing failed. Details are logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Email and password do not match a user.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Bearer token is missing, malformed, expired, or of the wrong kind.
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Authenticated, but not allowed to perform this action.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Maid not found")]
    MaidNotFound,

    /// Booking does not exist or the caller is not a party to it.
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Booking has already been reviewed")]
    ReviewAlreadyExists,

    #[error("Cannot change booking status from {from} to {to}")]
    InvalidStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidCredentials`, `InvalidToken` → 401 Unauthorized
/// - `Forbidden` → 403 Forbidden
/// - `*NotFound` → 404 Not Found
/// - `EmailAlreadyRegistered`, `ReviewAlreadyExists` → 409 Conflict
/// - `InvalidStatusTransition` → 422 Unprocessable Entity
/// - `InvalidRequest` → 400 Bad Request
/// - `Database`, `Internal` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            AppError::MaidNotFound => (StatusCode::NOT_FOUND, "maid_not_found", self.to_string()),
            AppError::BookingNotFound => {
                (StatusCode::NOT_FOUND, "booking_not_found", self.to_string())
            }
            AppError::EmailAlreadyRegistered => {
                (StatusCode::CONFLICT, "email_taken", self.to_string())
            }
            AppError::ReviewAlreadyExists => {
                (StatusCode::CONFLICT, "review_exists", self.to_string())
            }
            AppError::InvalidStatusTransition { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_status_transition",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut response = (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message
                }
            })),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_transition_error_response() {
        let response = AppError::InvalidStatusTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Pending,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "invalid_status_transition");
        assert_eq!(
            body["error"]["message"],
            "Cannot change booking status from completed to pending"
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("argon2 exploded".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = AppError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::WWW_AUTHENTICATE)
                .unwrap(),
            "Bearer"
        );
    }
}
