//! Job repository.

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::types::Json;

use outpost_core::{Bilingual, JobId};

use super::RepositoryError;
use crate::models::Job;

const JOB_COLUMNS: &str = "id, title, description, requirements, open, created_at";

/// Fields an admin sets on a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub title: Bilingual<String>,
    #[serde(default)]
    pub description: Bilingual<String>,
    #[serde(default)]
    pub requirements: Bilingual<String>,
    #[serde(default = "default_open")]
    pub open: bool,
}

const fn default_open() -> bool {
    true
}

/// Repository for `outpost.jobs`.
pub struct JobRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JobRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List jobs, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_closed: bool) -> Result<Vec<Job>, RepositoryError> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM outpost.jobs
             WHERE open OR $1
             ORDER BY created_at DESC"
        ))
        .bind(include_closed)
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }

    /// Get a job by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM outpost.jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(job)
    }

    /// Create a job.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &JobInput) -> Result<Job, RepositoryError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO outpost.jobs (title, description, requirements, open)
             VALUES ($1, $2, $3, $4)
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(Json(&input.title))
        .bind(Json(&input.description))
        .bind(Json(&input.requirements))
        .bind(input.open)
        .fetch_one(self.pool)
        .await?;

        Ok(job)
    }

    /// Replace a job's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the job doesn't exist.
    pub async fn update(&self, id: JobId, input: &JobInput) -> Result<Job, RepositoryError> {
        sqlx::query_as::<_, Job>(&format!(
            "UPDATE outpost.jobs
             SET title = $2, description = $3, requirements = $4, open = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(&input.title))
        .bind(Json(&input.description))
        .bind(Json(&input.requirements))
        .bind(input.open)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a job and its applications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the job doesn't exist.
    pub async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM outpost.jobs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
