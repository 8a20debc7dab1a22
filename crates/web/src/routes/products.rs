//! Product catalogue routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use tracing::instrument;

use outpost_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::ProductInput;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireAdmin, RequireRole};
use crate::models::Product;
use crate::state::AppState;

fn is_staff(user: Option<&crate::models::CurrentUser>) -> bool {
    user.is_some_and(|u| u.role.is_staff())
}

fn validate(input: &ProductInput) -> Result<()> {
    if !input.name.is_complete() {
        return Err(AppError::BadRequest(
            "product name is required in both languages".to_owned(),
        ));
    }
    if input.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }
    if input.stock.is_some_and(|stock| stock < 0) {
        return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
    }
    Ok(())
}

/// `GET /api/products` - available products; staff also see hidden ones.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(is_staff(user.as_ref()))
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|p| p.available || is_staff(user.as_ref()))
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))
}

/// `POST /api/admin/products`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    validate(&input)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/admin/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate(&input)?;
    Ok(Json(
        ProductRepository::new(state.pool()).update(id, &input).await?,
    ))
}

/// `DELETE /api/admin/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
