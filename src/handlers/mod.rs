//! HTTP request handlers (route handlers).
//!
//! Each API module exposes a `router` that the app nests under the
//! configured API prefix.

/// Registration, login and token refresh
pub mod auth;
/// Booking lifecycle endpoints
pub mod bookings;
/// Root and liveness endpoints
pub mod health;
/// Maid listing and profile endpoints
pub mod maids;
/// Review endpoints
pub mod reviews;
/// Current-user endpoints
pub mod users;
