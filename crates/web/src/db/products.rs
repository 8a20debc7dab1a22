//! Product repository.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use outpost_core::{Bilingual, ProductId};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, available, image_url, sort_order";

/// Fields an admin sets when creating or editing a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Bilingual<String>,
    #[serde(default)]
    pub description: Bilingual<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    #[serde(default = "default_true")]
    pub available: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_true() -> bool {
    true
}

/// Repository for `outpost.products`.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_unavailable: bool) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM outpost.products
             WHERE available OR $1
             ORDER BY sort_order, id"
        ))
        .bind(include_unavailable)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM outpost.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get every product whose ID is in `ids`. Unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM outpost.products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO outpost.products
                (name, description, price, stock, available, image_url, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(sqlx::types::Json(&input.name))
        .bind(sqlx::types::Json(&input.description))
        .bind(input.price)
        .bind(input.stock)
        .bind(input.available)
        .bind(input.image_url.as_deref())
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE outpost.products
             SET name = $2, description = $3, price = $4, stock = $5,
                 available = $6, image_url = $7, sort_order = $8, updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(sqlx::types::Json(&input.name))
        .bind(sqlx::types::Json(&input.description))
        .bind(input.price)
        .bind(input.stock)
        .bind(input.available)
        .bind(input.image_url.as_deref())
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM outpost.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
