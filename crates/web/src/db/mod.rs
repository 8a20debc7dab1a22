//! Database operations for `PostgreSQL`.
//!
//! All tables live in the `outpost` schema:
//!
//! - `users` - accounts and argon2 password hashes
//! - `content_record` - bilingual JSONB documents keyed by content type
//! - `maintenance` - single-row maintenance switch
//! - `products`, `coupons`, `orders` - the store
//! - `jobs`, `applications`, `rules`, `messages` - community features
//!
//! Sessions live in `tower_sessions.session`, created by the session store's
//! own migration.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p outpost-cli -- migrate
//! ```
//!
//! Repository tests run against a scratch database per test and need
//! `DATABASE_URL`:
//! ```bash
//! cargo test -p outpost-web -- --ignored
//! ```

pub mod applications;
pub mod content;
pub mod coupons;
pub mod jobs;
pub mod maintenance;
pub mod messages;
pub mod orders;
pub mod products;
pub mod rules;
pub mod users;

#[cfg(test)]
pub(crate) mod fixtures;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use applications::ApplicationRepository;
pub use content::ContentRepository;
pub use coupons::CouponRepository;
pub use jobs::JobRepository;
pub use maintenance::MaintenanceRepository;
pub use messages::MessageRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use rules::RuleRepository;
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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict(message)`.
    pub(crate) fn unique(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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
