//! Order routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use outpost_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireUser, RequireRole};
use crate::models::Order;
use crate::services::CheckoutService;
use crate::services::checkout::CheckoutOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// `GET /api/orders` - the signed-in user's orders.
pub async fn mine(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(user.id)
            .await?,
    ))
}

/// `GET /api/orders/{id}` - visible to the owner and to staff.
pub async fn show(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|order| order.user_id == user.id || user.role.is_staff())
        .map(Json)
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))
}

/// `POST /api/orders/{id}/capture` - capture the PayPal payment for an order.
pub async fn capture(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<CheckoutOutcome>> {
    let outcome = CheckoutService::new(state.pool(), state.paypal())
        .capture(user.id, id)
        .await?;

    let order_id = id.to_string();
    add_breadcrumb(
        "checkout",
        "Payment captured",
        Some(&[("order_id", order_id.as_str())]),
    );

    Ok(Json(outcome))
}

/// `GET /api/admin/orders?status=`
pub async fn index(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list(filter.status)
            .await?,
    ))
}

/// `PATCH /api/admin/orders/{id}/status`
///
/// Only moves along the order lifecycle: `pending → paid | cancelled`,
/// `paid → completed | cancelled`. Terminal orders never change. Marking a
/// pending order paid takes stock and counts the coupon use, as a captured
/// payment does.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, order_id = %id))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Order>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;

    ensure_transition(order.status, change.status)?;

    let updated = if settles_payment(order.status, change.status) {
        orders.mark_paid(&order).await?
    } else {
        orders.transition(id, order.status, change.status).await?
    };
    let updated = updated.ok_or_else(|| AppError::Conflict("order status changed concurrently".to_owned()))?;

    tracing::info!(from = %order.status, to = %updated.status, "Order status changed");
    Ok(Json(updated))
}

fn ensure_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "cannot move an order from {from} to {to}"
        )))
    }
}

/// Whether a status change records a payment.
const fn settles_payment(from: OrderStatus, to: OrderStatus) -> bool {
    matches!((from, to), (OrderStatus::Pending, OrderStatus::Paid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_guard() {
        assert!(ensure_transition(OrderStatus::Pending, OrderStatus::Paid).is_ok());
        assert!(ensure_transition(OrderStatus::Paid, OrderStatus::Completed).is_ok());
        assert!(matches!(
            ensure_transition(OrderStatus::Completed, OrderStatus::Pending),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_transition(OrderStatus::Cancelled, OrderStatus::Paid),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_manual_payment_settles_stock_and_coupon() {
        assert!(settles_payment(OrderStatus::Pending, OrderStatus::Paid));
        assert!(!settles_payment(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(!settles_payment(OrderStatus::Paid, OrderStatus::Completed));
        assert!(!settles_payment(OrderStatus::Paid, OrderStatus::Cancelled));
    }
}
