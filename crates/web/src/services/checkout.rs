//! Checkout and PayPal capture.
//!
//! # Flow
//!
//! 1. The browser submits its cart lines, an optional coupon code and the
//!    payment/delivery choice.
//! 2. Lines are normalised and priced from the database; client prices are
//!    never trusted.
//! 3. A `pending` order is inserted. For PayPal a provider order is created
//!    for the total and its id returned so the browser can show the
//!    approval popup. A zero total is marked paid right away.
//! 4. After approval the browser asks for a capture; a `COMPLETED` capture
//!    moves the order to `paid` together with the stock and coupon updates.
//!    If PayPal already holds the funds from an earlier attempt, the capture
//!    is skipped and the order is settled directly.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use outpost_core::coupon::normalize_code;
use outpost_core::{
    AppliedDiscount, Cart, CartLine, CouponRejection, DeliveryMethod, Locale, OrderId,
    OrderStatus, PaymentMethod, Price, ProductId, UserId,
};

use crate::db::RepositoryError;
use crate::db::coupons::CouponRepository;
use crate::db::orders::{NewOrder, OrderRepository};
use crate::db::products::ProductRepository;
use crate::models::{Order, OrderItem, Product};
use crate::services::paypal::{PayPalClient, PayPalError, STATUS_COMPLETED};

/// Longest accepted order note, in characters.
const MAX_NOTES_LENGTH: usize = 1000;

/// Errors that can occur during checkout or capture.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    #[error("{0} is not available")]
    Unavailable(String),

    #[error("only {available} of {name} left in stock")]
    InsufficientStock { name: String, available: i32 },

    #[error("coupon code not found")]
    UnknownCoupon,

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error("notes are too long")]
    NotesTooLong,

    #[error("order not found")]
    OrderNotFound,

    #[error("order is not awaiting a PayPal payment")]
    NotPayable,

    #[error("order has been cancelled")]
    Cancelled,

    #[error("payment was not completed (status {0})")]
    CaptureIncomplete(String),

    #[error("payment provider error: {0}")]
    Payment(#[from] PayPalError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// `POST /api/checkout` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of a checkout or capture.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paypal_order_id: Option<String>,
    /// Whether the browser should empty its stored cart.
    pub clear_cart: bool,
}

/// A validated coupon applied to a subtotal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub code: String,
    #[serde(flatten)]
    pub applied: AppliedDiscount,
}

/// Cart lines priced from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
}

/// Price a normalised cart against the loaded products.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart`, `UnknownProduct`, `Unavailable` or
/// `InsufficientStock`.
pub fn price_cart(cart: &Cart, products: &[Product]) -> Result<PricedCart, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut items = Vec::with_capacity(cart.len());
    let mut subtotal = Decimal::ZERO;

    for line in cart.lines() {
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or(CheckoutError::UnknownProduct(line.product_id))?;
        let name = product.name.text(Locale::En).to_owned();

        if !product.available {
            return Err(CheckoutError::Unavailable(name));
        }
        if !product.can_supply(line.quantity) {
            return Err(CheckoutError::InsufficientStock {
                name,
                available: product.stock.unwrap_or(0).max(0),
            });
        }

        let item = OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: line.quantity,
        };
        subtotal += item.line_total();
        items.push(item);
    }

    Ok(PricedCart { items, subtotal })
}

/// Checkout operations for one request.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    paypal: &'a PayPalClient,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, paypal: &'a PayPalClient) -> Self {
        Self { pool, paypal }
    }

    /// Check a coupon code against a subtotal.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::UnknownCoupon` or `CheckoutError::Coupon` if
    /// the code cannot be applied.
    pub async fn quote_coupon(
        &self,
        code: &str,
        subtotal: Decimal,
    ) -> Result<CouponQuote, CheckoutError> {
        let code = normalize_code(code);
        let coupon = CouponRepository::new(self.pool)
            .get_by_code(&code)
            .await?
            .ok_or(CheckoutError::UnknownCoupon)?;
        let applied = coupon.rules().apply(subtotal, Utc::now())?;
        Ok(CouponQuote { code, applied })
    }

    /// Create an order from a submitted cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for an invalid cart or coupon (no order is
    /// created), or `CheckoutError::Payment` if PayPal rejects the order
    /// (the order stays `pending`).
    #[instrument(skip(self, request), fields(user_id = %user_id, lines = request.items.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let notes = normalize_notes(request.notes)?;
        let cart = Cart::from_lines(request.items);
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let products = ProductRepository::new(self.pool)
            .get_many(&cart.product_ids())
            .await?;
        let priced = price_cart(&cart, &products)?;

        let (applied, coupon_code) = match request
            .coupon_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
        {
            Some(code) => {
                let quote = self.quote_coupon(code, priced.subtotal).await?;
                (quote.applied, Some(quote.code))
            }
            None => (AppliedDiscount::none(priced.subtotal), None),
        };

        let orders = OrderRepository::new(self.pool);
        let order = orders
            .create(&NewOrder {
                user_id,
                items: priced.items,
                subtotal: applied.subtotal,
                discount: applied.discount,
                total: applied.total,
                coupon_code,
                payment_method: request.payment_method,
                delivery_method: request.delivery_method,
                notes,
            })
            .await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Order created");

        match order.payment_method {
            PaymentMethod::Manual => Ok(CheckoutOutcome {
                order,
                paypal_order_id: None,
                clear_cart: true,
            }),
            PaymentMethod::Paypal if order.total.is_zero() => {
                let order = orders.mark_paid(&order).await?.unwrap_or(order);
                Ok(CheckoutOutcome {
                    order,
                    paypal_order_id: None,
                    clear_cart: true,
                })
            }
            PaymentMethod::Paypal => {
                let amount = Price::new(order.total, self.paypal.config().currency);
                let paypal_order_id = match self.paypal.create_order(order.id, amount).await {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::error!(order_id = %order.id, error = %e, "PayPal order creation failed");
                        return Err(e.into());
                    }
                };
                let order = orders
                    .set_paypal_order_id(order.id, &paypal_order_id)
                    .await?;
                Ok(CheckoutOutcome {
                    order,
                    paypal_order_id: Some(paypal_order_id),
                    clear_cart: false,
                })
            }
        }
    }

    /// Capture the PayPal payment for a user's order.
    ///
    /// Capturing an order that is already paid returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if the order doesn't exist or
    /// belongs to someone else, `CheckoutError::Cancelled` for a cancelled
    /// order, and `CheckoutError::Payment` / `CaptureIncomplete` if PayPal
    /// does not complete the capture (the order is not modified).
    #[instrument(skip(self), fields(user_id = %user_id, order_id = %order_id))]
    pub async fn capture(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let orders = OrderRepository::new(self.pool);
        let order = orders
            .get(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or(CheckoutError::OrderNotFound)?;

        let paypal_order_id = match capture_step(&order)? {
            CaptureStep::Settled => return Ok(settled(order)),
            CaptureStep::Capture(id) => id.to_owned(),
        };
        self.confirm_capture(&paypal_order_id).await?;

        if let Some(paid) = orders.mark_paid(&order).await? {
            tracing::info!(order_id = %paid.id, "Order paid");
            return Ok(settled(paid));
        }

        // Another request settled or cancelled it between our read and write.
        let current = orders
            .get(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;
        match current.status {
            OrderStatus::Paid | OrderStatus::Completed => Ok(settled(current)),
            _ => Err(CheckoutError::Cancelled),
        }
    }

    /// Make sure PayPal holds the funds for an approved order.
    ///
    /// An earlier attempt may already have captured them, in which case no
    /// second capture is made.
    async fn confirm_capture(&self, paypal_order_id: &str) -> Result<(), CheckoutError> {
        let current = self.paypal.get_order(paypal_order_id).await?;
        if current == STATUS_COMPLETED {
            tracing::info!(%paypal_order_id, "PayPal order already captured");
            return Ok(());
        }

        let status = match self.paypal.capture_order(paypal_order_id).await {
            Ok(status) => status,
            Err(e) if e.is_already_captured() => {
                tracing::info!(%paypal_order_id, "PayPal reports the order already captured");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(%paypal_order_id, error = %e, "PayPal capture failed");
                return Err(e.into());
            }
        };

        if status == STATUS_COMPLETED {
            Ok(())
        } else {
            tracing::warn!(%paypal_order_id, %status, "PayPal capture not completed");
            Err(CheckoutError::CaptureIncomplete(status))
        }
    }
}

/// What a capture request has to do for an order.
#[derive(Debug, PartialEq, Eq)]
enum CaptureStep<'o> {
    /// Already paid; answer with the order as it is.
    Settled,
    /// Capture the PayPal order with this id.
    Capture(&'o str),
}

fn capture_step(order: &Order) -> Result<CaptureStep<'_>, CheckoutError> {
    match order.status {
        OrderStatus::Paid | OrderStatus::Completed => Ok(CaptureStep::Settled),
        OrderStatus::Cancelled => Err(CheckoutError::Cancelled),
        OrderStatus::Pending => order
            .paypal_order_id
            .as_deref()
            .map(CaptureStep::Capture)
            .ok_or(CheckoutError::NotPayable),
    }
}

fn settled(order: Order) -> CheckoutOutcome {
    CheckoutOutcome {
        order,
        paypal_order_id: None,
        clear_cart: true,
    }
}

fn normalize_notes(notes: Option<String>) -> Result<Option<String>, CheckoutError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LENGTH {
        return Err(CheckoutError::NotesTooLong);
    }
    Ok(Some(trimmed.to_owned()))
}
