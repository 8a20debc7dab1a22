//! Store catalogue, coupon and order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use outpost_core::{
    Bilingual, CouponId, CouponKind, CouponRules, DeliveryMethod, OrderId, OrderStatus,
    PaymentMethod, ProductId, UserId,
};

/// A purchasable item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[sqlx(json)]
    pub name: Bilingual<String>,
    #[sqlx(json)]
    pub description: Bilingual<String>,
    pub price: Decimal,
    /// `None` means unlimited stock.
    pub stock: Option<i32>,
    pub available: bool,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

impl Product {
    /// Whether `quantity` units can be sold right now.
    #[must_use]
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.stock
            .is_none_or(|stock| i64::from(stock) >= i64::from(quantity))
    }
}

/// A discount code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_subtotal: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    #[must_use]
    pub fn rules(&self) -> CouponRules {
        CouponRules {
            kind: self.kind,
            value: self.value,
            min_subtotal: self.min_subtotal,
            max_uses: self.max_uses,
            uses: self.uses,
            active: self.active,
            expires_at: self.expires_at,
        }
    }
}

/// A priced order line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: Bilingual<String>,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A store order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub paypal_order_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
