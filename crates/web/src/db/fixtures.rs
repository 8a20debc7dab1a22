//! Rows for repository and service tests.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use outpost_core::{Bilingual, CouponKind, DeliveryMethod, Email, PaymentMethod, UserId};

use super::coupons::NewCoupon;
use super::orders::NewOrder;
use super::products::ProductInput;
use super::{CouponRepository, ProductRepository, UserRepository};
use crate::models::{OrderItem, Product};

pub(crate) async fn customer(pool: &PgPool, name: &str) -> UserId {
    let email = Email::parse(&format!("{name}@example.com")).unwrap();
    UserRepository::new(pool)
        .create(&email, name, "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
        .await
        .unwrap()
        .id
}

pub(crate) async fn product(pool: &PgPool, price: Decimal, stock: Option<i32>) -> Product {
    ProductRepository::new(pool)
        .create(&ProductInput {
            name: Bilingual::new("Supporter Pack".to_owned(), "حزمة الداعم".to_owned()),
            description: Bilingual::default(),
            price,
            stock,
            available: true,
            image_url: None,
            sort_order: 0,
        })
        .await
        .unwrap()
}

pub(crate) async fn coupon(pool: &PgPool, code: &str, kind: CouponKind, value: Decimal) {
    CouponRepository::new(pool)
        .create(&NewCoupon {
            code: code.to_owned(),
            kind,
            value,
            min_subtotal: None,
            max_uses: None,
            expires_at: None,
        })
        .await
        .unwrap();
}

/// A pending order for `quantity` of `product`.
pub(crate) fn new_order(
    user_id: UserId,
    product: &Product,
    quantity: u32,
    coupon_code: Option<&str>,
) -> NewOrder {
    let total = product.price * Decimal::from(quantity);
    NewOrder {
        user_id,
        items: vec![OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        }],
        subtotal: total,
        discount: Decimal::ZERO,
        total,
        coupon_code: coupon_code.map(str::to_owned),
        payment_method: PaymentMethod::Paypal,
        delivery_method: DeliveryMethod::InGame,
        notes: None,
    }
}

pub(crate) async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM outpost.orders")
        .fetch_one(pool)
        .await
        .unwrap()
}
