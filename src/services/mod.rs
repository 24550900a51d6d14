//! Business logic services.
//!
//! Services contain logic separated from HTTP handlers: credential and token
//! handling, and booking rules that run inside database transactions.

pub mod auth_service;
pub mod booking_service;
