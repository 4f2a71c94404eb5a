//! Database operations for the `PlantNet` `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `plantnet.users` - Accounts keyed by email, with role and seller status
//! - `plantnet.plants` - Inventory listings and their stock
//! - `plantnet.orders` - Purchases, referencing a plant that may since be deleted
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p plantnet-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod orders;
pub mod plants;
pub mod stats;
pub mod users;

pub use orders::OrderRepository;
pub use plants::PlantRepository;
pub use stats::StatsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A business rule or constraint refused the write.
    #[error("{0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Round-trip a trivial query to prove the database is reachable.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn check_health(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// A value past its column's range (SQLSTATE 22003) refuses the write with
/// `message` instead of surfacing as a storage failure.
pub(crate) fn out_of_range(
    message: impl ToString,
) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("22003") => {
            RepositoryError::Conflict(message.to_string())
        }
        other => RepositoryError::Database(other),
    }
}
