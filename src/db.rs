//! Database connection pool and migration management.
//!
//! The persistence layer is created once at startup: connect the pool, then
//! create the `users`, `bookings` and `reviews` tables through migrations
//! before the listener is bound.

use sqlx::{Pool, Postgres};

/// PostgreSQL connection pool shared by all handlers.
pub type DbPool = Pool<Postgres>;

/// Maximum concurrent connections held by the pool.
const MAX_CONNECTIONS: u32 = 5;

/// Create a new PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server
/// cannot be reached or rejects authentication.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so each runs once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
