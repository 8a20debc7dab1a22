//! Order repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use outpost_core::{DeliveryMethod, OrderId, OrderStatus, PaymentMethod, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, items, subtotal, discount, total, coupon_code, status, \
     payment_method, delivery_method, paypal_order_id, notes, created_at, updated_at";

/// A priced order ready to insert as `pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub notes: Option<String>,
}

/// Repository for `outpost.orders`.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO outpost.orders
                (user_id, items, subtotal, discount, total, coupon_code,
                 payment_method, delivery_method, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.discount)
        .bind(order.total)
        .bind(order.coupon_code.as_deref())
        .bind(order.payment_method)
        .bind(order.delivery_method)
        .bind(order.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM outpost.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM outpost.orders
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List all orders, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM outpost.orders
             WHERE $1::outpost.order_status IS NULL OR status = $1
             ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Record the PayPal order created for this order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_paypal_order_id(
        &self,
        id: OrderId,
        paypal_order_id: &str,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE outpost.orders SET paypal_order_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(paypal_order_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Move an order from `from` to `to`.
    ///
    /// The update only applies while the stored status still equals `from`;
    /// `None` means another writer got there first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn transition(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE outpost.orders SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Mark a pending order paid, decrement stock and count the coupon use,
    /// all in one transaction.
    ///
    /// Stock never drops below zero. Returns `None` (and changes nothing) if
    /// the order was no longer pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn mark_paid(&self, order: &Order) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let paid = sqlx::query_as::<_, Order>(&format!(
            "UPDATE outpost.orders SET status = 'paid', updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(paid) = paid else {
            tx.rollback().await?;
            return Ok(None);
        };

        for item in &paid.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity out of range: {}", item.quantity))
            })?;
            sqlx::query(
                "UPDATE outpost.products
                 SET stock = GREATEST(stock - $2, 0), updated_at = NOW()
                 WHERE id = $1 AND stock IS NOT NULL",
            )
            .bind(item.product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(code) = &paid.coupon_code {
            sqlx::query("UPDATE outpost.coupons SET uses = uses + 1 WHERE code = $1")
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(paid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_core::CouponKind;

    use super::*;
    use crate::db::fixtures::{coupon, customer, new_order, product};
    use crate::db::{CouponRepository, ProductRepository};

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_mark_paid_takes_stock_and_counts_coupon(pool: PgPool) {
        let user = customer(&pool, "buyer").await;
        let limited = product(&pool, Decimal::new(500, 2), Some(2)).await;
        coupon(&pool, "SUMMER", CouponKind::Percent, Decimal::new(10, 0)).await;

        let orders = OrderRepository::new(&pool);
        let order = orders
            .create(&new_order(user, &limited, 3, Some("SUMMER")))
            .await
            .unwrap();

        let paid = orders.mark_paid(&order).await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        let stock = ProductRepository::new(&pool).get(limited.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, Some(0));
        let uses = CouponRepository::new(&pool)
            .get_by_code("SUMMER")
            .await
            .unwrap()
            .unwrap()
            .uses;
        assert_eq!(uses, 1);

        assert!(orders.mark_paid(&order).await.unwrap().is_none());
        let uses = CouponRepository::new(&pool)
            .get_by_code("SUMMER")
            .await
            .unwrap()
            .unwrap()
            .uses;
        assert_eq!(uses, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unlimited_stock_stays_unlimited(pool: PgPool) {
        let user = customer(&pool, "buyer").await;
        let unlimited = product(&pool, Decimal::new(500, 2), None).await;

        let orders = OrderRepository::new(&pool);
        let order = orders.create(&new_order(user, &unlimited, 5, None)).await.unwrap();
        orders.mark_paid(&order).await.unwrap().unwrap();

        let stock = ProductRepository::new(&pool).get(unlimited.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_transition_requires_expected_status(pool: PgPool) {
        let user = customer(&pool, "buyer").await;
        let item = product(&pool, Decimal::new(500, 2), None).await;

        let orders = OrderRepository::new(&pool);
        let order = orders.create(&new_order(user, &item, 1, None)).await.unwrap();

        let cancelled = orders
            .transition(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.map(|o| o.status), Some(OrderStatus::Cancelled));
        assert!(orders.mark_paid(&order).await.unwrap().is_none());
        assert!(
            orders
                .transition(order.id, OrderStatus::Pending, OrderStatus::Paid)
                .await
                .unwrap()
                .is_none()
        );
    }
}
