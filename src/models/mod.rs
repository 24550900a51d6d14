//! Data models representing database entities and API bodies.

/// Booking model and status lifecycle
pub mod booking;
/// Maid profile view
pub mod maid;
/// Review model
pub mod review;
/// User model and roles
pub mod user;
