//! Job application repository.

use serde_json::Value;
use sqlx::PgPool;

use outpost_core::{ApplicationId, ApplicationStatus, JobId, UserId};

use super::RepositoryError;
use crate::models::Application;

const APPLICATION_COLUMNS: &str =
    "id, user_id, job_id, answers, status, reviewed_by, created_at, updated_at";

/// Repository for `outpost.applications`.
pub struct ApplicationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit an application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already applied to this job.
    pub async fn create(
        &self,
        user_id: UserId,
        job_id: JobId,
        answers: &Value,
    ) -> Result<Application, RepositoryError> {
        sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO outpost.applications (user_id, job_id, answers)
             VALUES ($1, $2, $3)
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(job_id)
        .bind(answers)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "already applied to this job"))
    }

    /// Get an application by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM outpost.applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(application)
    }

    /// List a user's applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Application>, RepositoryError> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM outpost.applications
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(applications)
    }

    /// List applications for review, oldest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, RepositoryError> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM outpost.applications
             WHERE $1::outpost.application_status IS NULL OR status = $1
             ORDER BY created_at"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(applications)
    }

    /// Record a decision on a pending application.
    ///
    /// Returns `None` if the application was not pending any more.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decide(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewer: UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "UPDATE outpost.applications
             SET status = $2, reviewed_by = $3, updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .fetch_optional(self.pool)
        .await?;

        Ok(application)
    }
}
