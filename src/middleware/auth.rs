//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Verify signature, expiry and that it is an access token
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Validation is purely cryptographic; no database lookup happens here.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    config::Settings,
    error::AppError,
    models::user::UserRole,
    services::auth_service::{self, TokenKind},
};

/// Authentication context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    /// Fail with `Forbidden` unless the caller has `role`.
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Bearer token authentication middleware function.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer eyJhbGciOi...
/// ```
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::InvalidToken)` otherwise (returns 401)
pub async fn auth_middleware(
    State(settings): State<Arc<Settings>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let claims = auth_service::decode_token(&settings, token, TokenKind::Access)?;

    request.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(request).await)
}
