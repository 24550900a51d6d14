//! Root and health check endpoints for liveness probing.
//!
//! Both are static: they do not touch the database, so a probe only reports
//! whether the process is serving HTTP.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::config::Settings;

/// Response body for `GET /`.
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Root handler.
///
/// # Response (200 OK)
///
/// ```json
/// { "message": "Welcome to MaidEase API" }
/// ```
pub async fn root(State(settings): State<Arc<Settings>>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {} API", settings.app_name),
    })
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// { "status": "healthy" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
