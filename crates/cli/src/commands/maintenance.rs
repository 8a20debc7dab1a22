//! Maintenance mode commands.
//!
//! Lets an operator switch maintenance mode without signing in, e.g. during
//! a deploy. Running servers pick the change up within their cache window.

use outpost_web::db::MaintenanceRepository;

use super::{CommandError, connect};

/// Turn maintenance mode on or off.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable.
pub async fn set(enabled: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let state = MaintenanceRepository::new(&pool).set_enabled(enabled).await?;
    tracing::info!(enabled = state.enabled, "Maintenance mode updated");
    Ok(())
}

/// Print whether maintenance mode is on.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable.
pub async fn status() -> Result<(), CommandError> {
    let pool = connect().await?;
    let state = MaintenanceRepository::new(&pool).get().await?;
    tracing::info!(enabled = state.enabled, "Maintenance mode status");
    Ok(())
}
