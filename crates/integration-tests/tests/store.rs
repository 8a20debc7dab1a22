//! Store rules across crates, plus live checkout checks.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use outpost_core::{Bilingual, Cart, CartLine, ProductId};
use outpost_integration_tests::{client, registered_client, url};
use outpost_web::models::Product;
use outpost_web::services::checkout::{CheckoutError, price_cart};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn product(id: i32, price: &str, stock: Option<i32>) -> Product {
    Product {
        id: ProductId::new(id),
        name: Bilingual::new(format!("Item {id}"), format!("عنصر {id}")),
        description: Bilingual::default(),
        price: Decimal::from_str(price).unwrap(),
        stock,
        available: true,
        image_url: None,
        sort_order: 0,
    }
}

fn line(id: i32, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(id),
        quantity,
    }
}

#[test]
fn test_submitted_cart_is_priced_from_catalogue() {
    let cart = Cart::from_lines([line(1, 2), line(2, 1), line(1, 1)]);
    let priced = price_cart(&cart, &[product(1, "4.50", None), product(2, "10", Some(5))]).unwrap();

    assert_eq!(priced.items.len(), 2);
    assert_eq!(priced.subtotal, Decimal::from_str("23.50").unwrap());
}

#[test]
fn test_stock_limit_names_the_product() {
    let cart = Cart::from_lines([line(2, 6)]);
    let err = price_cart(&cart, &[product(2, "10", Some(5))]).unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::InsufficientStock { ref name, available: 5 } if name == "Item 2"
    ));
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_checkout_requires_login() {
    let resp = client()
        .post(url("/api/checkout"))
        .json(&json!({
            "items": [{ "productId": 1, "quantity": 1 }],
            "paymentMethod": "manual",
            "deliveryMethod": "discord",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_empty_cart_and_unknown_coupon_are_rejected() {
    let (client, _) = registered_client().await;

    let resp = client
        .post(url("/api/checkout"))
        .json(&json!({
            "items": [],
            "paymentMethod": "manual",
            "deliveryMethod": "in_game",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/coupons/validate"))
        .json(&json!({ "code": "NO-SUCH-CODE", "subtotal": "10.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_product_listing_is_public() {
    let resp = client().get(url("/api/products")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.unwrap();
    assert!(products.iter().all(|p| p["available"] == true));
}
