//! Authentication service - password hashing and bearer tokens.
//!
//! Tokens are JWTs signed with the configured `SECRET_KEY` and `ALGORITHM`.
//! Two kinds are issued:
//! - **access**: short lived (`ACCESS_TOKEN_EXPIRE_MINUTES`), accepted by protected routes
//! - **refresh**: long lived (`REFRESH_TOKEN_EXPIRE_DAYS`), accepted only by `/auth/refresh`

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Settings, error::AppError, models::user::UserRole};

/// Kind of token, carried in the claims so one cannot stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub role: UserRole,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Freshly issued access and refresh tokens.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Hash a password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// Check `password` against a stored Argon2 hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("invalid stored password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Issue a single token of `kind` for a user.
pub fn issue_token(
    settings: &Settings,
    user_id: Uuid,
    role: UserRole,
    kind: TokenKind,
) -> Result<String, AppError> {
    let now = Utc::now();
    let lifetime = match kind {
        TokenKind::Access => Duration::minutes(settings.token_expiry_minutes),
        TokenKind::Refresh => Duration::days(settings.refresh_token_expiry_days),
    };

    let claims = Claims {
        sub: user_id,
        role,
        kind,
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(
        &Header::new(settings.token_algorithm),
        &claims,
        &EncodingKey::from_secret(settings.secret_key_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

/// Issue an access/refresh pair for a user.
pub fn issue_token_pair(
    settings: &Settings,
    user_id: Uuid,
    role: UserRole,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: issue_token(settings, user_id, role, TokenKind::Access)?,
        refresh_token: issue_token(settings, user_id, role, TokenKind::Refresh)?,
        expires_in: settings.token_expiry_minutes * 60,
    })
}

/// Validate a token's signature, expiry and kind.
///
/// # Errors
///
/// `InvalidToken` for any failure; the cause is only logged at debug level.
pub fn decode_token(
    settings: &Settings,
    token: &str,
    expected: TokenKind,
) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret_key_bytes()),
        &Validation::new(settings.token_algorithm),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::InvalidToken
    })?
    .claims;

    if claims.kind != expected {
        tracing::debug!(kind = ?claims.kind, expected = ?expected, "Wrong token kind");
        return Err(AppError::InvalidToken);
    }

    Ok(claims)
}
