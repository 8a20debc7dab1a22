//! Content record repository.
//!
//! Each row holds one content type's locale-keyed JSONB document. Writes
//! for a single locale are a JSONB `||` merge at the top level, so the
//! other locale's payload is never touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use outpost_core::Locale;

use super::RepositoryError;

/// Summary of a stored content type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub content_type: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for `outpost.content_record`.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the stored document for a content type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, content_type: &str) -> Result<Option<Value>, RepositoryError> {
        let data = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM outpost.content_record WHERE content_type = $1",
        )
        .bind(content_type)
        .fetch_optional(self.pool)
        .await?;

        Ok(data)
    }

    /// Replace one locale's payload, creating the record if needed.
    ///
    /// Returns the full stored document after the write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_locale(
        &self,
        content_type: &str,
        locale: Locale,
        payload: &Value,
    ) -> Result<Value, RepositoryError> {
        let data = sqlx::query_scalar::<_, Value>(
            r"
            INSERT INTO outpost.content_record (content_type, data)
            VALUES ($1, jsonb_build_object($2::text, $3::jsonb))
            ON CONFLICT (content_type) DO UPDATE
                SET data = outpost.content_record.data || jsonb_build_object($2::text, $3::jsonb),
                    updated_at = NOW()
            RETURNING data
            ",
        )
        .bind(content_type)
        .bind(locale.code())
        .bind(payload)
        .fetch_one(self.pool)
        .await?;

        Ok(data)
    }

    /// Replace the whole document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace(&self, content_type: &str, data: &Value) -> Result<Value, RepositoryError> {
        let data = sqlx::query_scalar::<_, Value>(
            r"
            INSERT INTO outpost.content_record (content_type, data)
            VALUES ($1, $2)
            ON CONFLICT (content_type) DO UPDATE
                SET data = EXCLUDED.data, updated_at = NOW()
            RETURNING data
            ",
        )
        .bind(content_type)
        .bind(data)
        .fetch_one(self.pool)
        .await?;

        Ok(data)
    }

    /// List stored content types.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContentSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContentSummary>(
            "SELECT content_type, updated_at FROM outpost.content_record ORDER BY content_type",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_locale_upsert_keeps_other_locale(pool: PgPool) {
        let content = ContentRepository::new(&pool);

        content
            .upsert_locale("hero", Locale::En, &json!({ "title": "Season 4" }))
            .await
            .unwrap();
        content
            .upsert_locale("hero", Locale::Ar, &json!({ "title": "الموسم الرابع" }))
            .await
            .unwrap();
        let data = content
            .upsert_locale("hero", Locale::En, &json!({ "title": "Season 5" }))
            .await
            .unwrap();

        assert_eq!(
            data,
            json!({ "en": { "title": "Season 5" }, "ar": { "title": "الموسم الرابع" } })
        );
        assert_eq!(content.get("hero").await.unwrap(), Some(data));
    }
}
