//! Server rules.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use outpost_core::{RuleCategory, RuleId};

use crate::db::RuleRepository;
use crate::db::rules::RuleInput;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRole};
use crate::models::Rule;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<RuleCategory>,
}

#[derive(Debug, Deserialize)]
pub struct Reorder {
    pub ids: Vec<RuleId>,
}

fn validate(input: &RuleInput) -> Result<()> {
    if input.title.is_complete() && input.content.is_complete() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "rule title and content are required in both languages".to_owned(),
        ))
    }
}

/// `GET /api/rules?category=`
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<Rule>>> {
    Ok(Json(
        RuleRepository::new(state.pool())
            .list(filter.category)
            .await?,
    ))
}

/// `POST /api/admin/rules`
pub async fn create(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Json(input): Json<RuleInput>,
) -> Result<(StatusCode, Json<Rule>)> {
    validate(&input)?;
    let rule = RuleRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// `PUT /api/admin/rules/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<RuleId>,
    Json(input): Json<RuleInput>,
) -> Result<Json<Rule>> {
    validate(&input)?;
    Ok(Json(RuleRepository::new(state.pool()).update(id, &input).await?))
}

/// `DELETE /api/admin/rules/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<RuleId>,
) -> Result<StatusCode> {
    RuleRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/rules/reorder` - `sortOrder` follows the position in `ids`.
pub async fn reorder(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Json(body): Json<Reorder>,
) -> Result<StatusCode> {
    let mut seen = std::collections::HashSet::new();
    if !body.ids.iter().all(|id| seen.insert(*id)) {
        return Err(AppError::BadRequest("duplicate rule id".to_owned()));
    }
    RuleRepository::new(state.pool()).reorder(&body.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
