//! MaidEase API - Main Application Entry Point
//!
//! REST API for a marketplace where customers book household service
//! providers ("maids") and review them afterwards.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: JWT bearer tokens, Argon2 password hashes
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Initialize logging
//! 2. Resolve settings from `.env` and environment variables (fatal on error)
//! 3. Create database connection pool
//! 4. Run database migrations
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured address

mod app;
mod config;
mod cors;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Missing DATABASE_URL or SECRET_KEY stops the process here
    let settings = Arc::new(config::Settings::from_env()?);
    tracing::info!(
        app_name = %settings.app_name,
        debug = settings.debug,
        api_prefix = %settings.api_prefix,
        cors_source = ?settings.cors_source,
        "Configuration loaded"
    );
    tracing::debug!(?settings, "Resolved settings");

    let pool = db::create_pool(&settings.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let addr = settings.server_addr();
    let app = app::build_router(app::AppState::new(pool, settings));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
