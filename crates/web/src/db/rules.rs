//! Rule repository.

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::types::Json;

use outpost_core::{Bilingual, RuleCategory, RuleId};

use super::RepositoryError;
use crate::models::Rule;

const RULE_COLUMNS: &str = "id, title, content, category, sort_order";

/// Fields an admin sets on a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInput {
    pub title: Bilingual<String>,
    pub content: Bilingual<String>,
    pub category: RuleCategory,
    #[serde(default)]
    pub sort_order: i32,
}

/// Repository for `outpost.rules`.
pub struct RuleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RuleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List rules in display order, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<RuleCategory>) -> Result<Vec<Rule>, RepositoryError> {
        let rules = sqlx::query_as::<_, Rule>(&format!(
            "SELECT {RULE_COLUMNS} FROM outpost.rules
             WHERE $1::outpost.rule_category IS NULL OR category = $1
             ORDER BY category, sort_order, id"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rules)
    }

    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &RuleInput) -> Result<Rule, RepositoryError> {
        let rule = sqlx::query_as::<_, Rule>(&format!(
            "INSERT INTO outpost.rules (title, content, category, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(Json(&input.title))
        .bind(Json(&input.content))
        .bind(input.category)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(rule)
    }

    /// Replace a rule's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the rule doesn't exist.
    pub async fn update(&self, id: RuleId, input: &RuleInput) -> Result<Rule, RepositoryError> {
        sqlx::query_as::<_, Rule>(&format!(
            "UPDATE outpost.rules
             SET title = $2, content = $3, category = $4, sort_order = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(&input.title))
        .bind(Json(&input.content))
        .bind(input.category)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a rule.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the rule doesn't exist.
    pub async fn delete(&self, id: RuleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM outpost.rules WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set `sort_order` from each rule's position in `ids`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (and rolls back) if any ID is unknown.
    pub async fn reorder(&self, ids: &[RuleId]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (position, id) in ids.iter().enumerate() {
            let sort_order = i32::try_from(position)
                .map_err(|_| RepositoryError::Conflict("too many rules".to_owned()))?;
            let result = sqlx::query(
                "UPDATE outpost.rules SET sort_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(*id)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
