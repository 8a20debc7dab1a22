//! Maintenance switch repository.

use serde_json::Value;
use sqlx::PgPool;

use outpost_core::Locale;

use super::RepositoryError;
use crate::models::MaintenanceState;

/// Repository for the single-row `outpost.maintenance` table.
pub struct MaintenanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MaintenanceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read the current state. A missing row reads as off.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<MaintenanceState, RepositoryError> {
        let state = sqlx::query_as::<_, MaintenanceState>(
            "SELECT enabled, content FROM outpost.maintenance WHERE id = 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(state.unwrap_or_else(MaintenanceState::off))
    }

    /// Turn maintenance mode on or off.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_enabled(&self, enabled: bool) -> Result<MaintenanceState, RepositoryError> {
        let state = sqlx::query_as::<_, MaintenanceState>(
            r"
            INSERT INTO outpost.maintenance (id, enabled) VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET enabled = EXCLUDED.enabled, updated_at = NOW()
            RETURNING enabled, content
            ",
        )
        .bind(enabled)
        .fetch_one(self.pool)
        .await?;

        Ok(state)
    }

    /// Flip the switch atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn toggle(&self) -> Result<MaintenanceState, RepositoryError> {
        let state = sqlx::query_as::<_, MaintenanceState>(
            r"
            INSERT INTO outpost.maintenance (id, enabled) VALUES (1, TRUE)
            ON CONFLICT (id) DO UPDATE
                SET enabled = NOT outpost.maintenance.enabled, updated_at = NOW()
            RETURNING enabled, content
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(state)
    }

    /// Replace one locale of the page text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_content(
        &self,
        locale: Locale,
        payload: &Value,
    ) -> Result<MaintenanceState, RepositoryError> {
        let state = sqlx::query_as::<_, MaintenanceState>(
            r"
            INSERT INTO outpost.maintenance (id, content)
            VALUES (1, jsonb_build_object($1::text, $2::jsonb))
            ON CONFLICT (id) DO UPDATE
                SET content = outpost.maintenance.content || jsonb_build_object($1::text, $2::jsonb),
                    updated_at = NOW()
            RETURNING enabled, content
            ",
        )
        .bind(locale.code())
        .bind(payload)
        .fetch_one(self.pool)
        .await?;

        Ok(state)
    }
}
