//! CLI command implementations.

pub mod maintenance;
pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error from the web crate.
    #[error(transparent)]
    Repository(#[from] outpost_web::db::RepositoryError),

    /// Invalid argument.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Read `OUTPOST_DATABASE_URL` (or `DATABASE_URL`) from the environment.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();
    std::env::var("OUTPOST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("OUTPOST_DATABASE_URL"))
}

/// Connect to the application database.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(outpost_web::db::create_pool(&url).await?)
}
