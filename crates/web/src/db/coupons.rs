//! Coupon repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use outpost_core::{CouponId, CouponKind};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str =
    "id, code, kind, value, min_subtotal, max_uses, uses, active, expires_at, created_at";

/// A coupon ready to insert. `code` is already normalised.
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_subtotal: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for `outpost.coupons`.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by its normalised code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM outpost.coupons WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// List all coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM outpost.coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(coupons)
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is already taken.
    pub async fn create(&self, coupon: &NewCoupon) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO outpost.coupons (code, kind, value, min_subtotal, max_uses, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(&coupon.code)
        .bind(coupon.kind)
        .bind(coupon.value)
        .bind(coupon.min_subtotal)
        .bind(coupon.max_uses)
        .bind(coupon.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "coupon code already exists"))
    }

    /// Deactivate a coupon. Used coupons are referenced by orders, so they
    /// are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    pub async fn deactivate(&self, id: CouponId) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE outpost.coupons SET active = FALSE WHERE id = $1 RETURNING {COUPON_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
