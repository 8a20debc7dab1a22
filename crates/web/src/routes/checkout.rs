//! Checkout routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireUser, RequireRole};
use crate::services::CheckoutService;
use crate::services::checkout::{CheckoutOutcome, CheckoutRequest};
use crate::state::AppState;

/// Public settings the browser needs to load the PayPal SDK.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalSettings {
    pub client_id: String,
    pub currency: &'static str,
    pub mode: &'static str,
}

/// `POST /api/checkout`
///
/// Manual orders come back with `clearCart: true`. PayPal orders carry the
/// `paypalOrderId` the browser hands to the PayPal buttons; the cart is only
/// cleared once the capture succeeds.
pub async fn checkout(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutOutcome>)> {
    let outcome = CheckoutService::new(state.pool(), state.paypal())
        .place_order(user.id, request)
        .await?;

    let order_id = outcome.order.id.to_string();
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[
            ("order_id", order_id.as_str()),
            ("status", outcome.order.status.as_str()),
        ]),
    );

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /api/paypal/config`
pub async fn paypal_config(State(state): State<AppState>) -> Json<PayPalSettings> {
    let config = state.paypal().config();
    Json(PayPalSettings {
        client_id: config.client_id.clone(),
        currency: config.currency.as_str(),
        mode: config.mode.as_str(),
    })
}
