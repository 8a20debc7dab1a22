//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! outpost-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `OUTPOST_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Application migrations live in `crates/web/migrations/`. The session
//! table is created by the session store's own migration.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run the application and session store migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running application migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
