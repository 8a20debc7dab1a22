//! Coupon routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use outpost_core::coupon::normalize_code;
use outpost_core::{CouponId, CouponKind};

use crate::db::CouponRepository;
use crate::db::coupons::NewCoupon;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRole};
use crate::models::Coupon;
use crate::services::CheckoutService;
use crate::services::checkout::CouponQuote;
use crate::state::AppState;

/// Characters used for generated codes; no `0/O` or `1/I` lookalikes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const GENERATED_CODE_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: Option<String>,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_subtotal: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A random code from [`CODE_ALPHABET`].
#[must_use]
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET.get(index).copied().unwrap_or(b'X'))
        })
        .collect()
}

fn new_coupon(request: CreateCouponRequest) -> Result<NewCoupon> {
    let code = match request.code.as_deref().map(normalize_code) {
        Some(code) if !code.is_empty() => code,
        _ => generate_code(),
    };
    if code.len() > 32
        || !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(
            "code must be up to 32 letters, digits, '-' or '_'".to_owned(),
        ));
    }

    let value_ok = match request.kind {
        CouponKind::Percent => request.value > Decimal::ZERO && request.value <= Decimal::ONE_HUNDRED,
        CouponKind::Fixed => request.value > Decimal::ZERO,
    };
    if !value_ok {
        return Err(AppError::BadRequest("coupon value is out of range".to_owned()));
    }
    if request.max_uses.is_some_and(|max| max <= 0) {
        return Err(AppError::BadRequest("maxUses must be positive".to_owned()));
    }
    if request.min_subtotal.is_some_and(|min| min < Decimal::ZERO) {
        return Err(AppError::BadRequest("minSubtotal cannot be negative".to_owned()));
    }

    Ok(NewCoupon {
        code,
        kind: request.kind,
        value: request.value,
        min_subtotal: request.min_subtotal,
        max_uses: request.max_uses,
        expires_at: request.expires_at,
    })
}

/// `POST /api/coupons/validate`
pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<CouponQuote>> {
    if body.subtotal < Decimal::ZERO {
        return Err(AppError::BadRequest("subtotal cannot be negative".to_owned()));
    }
    let quote = CheckoutService::new(state.pool(), state.paypal())
        .quote_coupon(&body.code, body.subtotal)
        .await?;
    Ok(Json(quote))
}

/// `GET /api/admin/coupons`
pub async fn index(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(CouponRepository::new(state.pool()).list().await?))
}

/// `POST /api/admin/coupons`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Json(body): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let coupon = new_coupon(body)?;
    let coupon = CouponRepository::new(state.pool()).create(&coupon).await?;
    tracing::info!(code = %coupon.code, "Coupon created");
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// `DELETE /api/admin/coupons/{id}` - deactivates the coupon.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<CouponId>,
) -> Result<Json<Coupon>> {
    Ok(Json(CouponRepository::new(state.pool()).deactivate(id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateCouponRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_generated_codes() {
        let code = generate_code();
        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_code_is_normalised_or_generated() {
        let coupon = new_coupon(request(r#"{"code": " summer10 ", "kind": "percent", "value": "10"}"#))
            .unwrap();
        assert_eq!(coupon.code, "SUMMER10");

        let coupon = new_coupon(request(r#"{"kind": "fixed", "value": "5"}"#)).unwrap();
        assert_eq!(coupon.code.len(), GENERATED_CODE_LENGTH);
    }

    #[test]
    fn test_invalid_coupons_rejected() {
        for json in [
            r#"{"kind": "percent", "value": "120"}"#,
            r#"{"kind": "fixed", "value": "0"}"#,
            r#"{"kind": "fixed", "value": "5", "maxUses": 0}"#,
            r#"{"code": "no spaces", "kind": "fixed", "value": "5"}"#,
        ] {
            assert!(new_coupon(request(json)).is_err(), "{json}");
        }
    }
}
