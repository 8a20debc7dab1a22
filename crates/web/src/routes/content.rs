//! Content and translation routes.
//!
//! Public reads go through the resolver, so a page always receives a full
//! document even when an editor has only changed a few fields. Admin writes
//! replace a single locale's payload unless the whole document is sent.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use outpost_core::content::is_valid_content_type;

use super::parse_language;
use crate::db::content::ContentSummary;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRole};
use crate::services::content::TRANSLATIONS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentUpdate {
    pub language: Option<String>,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsUpdate {
    pub language: String,
    pub translations: Value,
}

fn checked_type(content_type: &str) -> Result<&str> {
    if is_valid_content_type(content_type) {
        Ok(content_type)
    } else {
        Err(AppError::BadRequest(format!(
            "invalid content type: {content_type}"
        )))
    }
}

async fn resolve(state: &AppState, content_type: &str, language: Option<&str>) -> Result<Value> {
    let resolved = match language {
        Some(code) => {
            let locale = parse_language(code)?;
            state.content().resolve(content_type, locale).await
        }
        None => state.content().resolve_all(content_type).await,
    };
    resolved.ok_or_else(|| AppError::NotFound(format!("no content for {content_type}")))
}

/// `GET /api/content/{type}?language=`
pub async fn show(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Value>> {
    let content_type = checked_type(&content_type)?;
    let data = resolve(&state, content_type, query.language.as_deref()).await?;
    Ok(Json(data))
}

/// `PUT /api/content/{type}` - admin edit of one locale or the whole record.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Path(content_type): Path<String>,
    Json(body): Json<ContentUpdate>,
) -> Result<Json<Value>> {
    let content_type = checked_type(&content_type)?;

    let stored = match body.language.as_deref() {
        Some(code) => {
            let locale = parse_language(code)?;
            state
                .content()
                .update_locale(content_type, locale, &body.data)
                .await?
        }
        None => {
            let complete = body
                .data
                .as_object()
                .is_some_and(|map| map.contains_key("en") && map.contains_key("ar"));
            if !complete {
                return Err(AppError::BadRequest(
                    "data must contain both en and ar when no language is given".to_owned(),
                ));
            }
            state.content().replace(content_type, &body.data).await?
        }
    };

    Ok(Json(json!({ "type": content_type, "data": stored })))
}

/// `GET /api/admin/content` - stored content types.
pub async fn list(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
) -> Result<Json<Vec<ContentSummary>>> {
    Ok(Json(state.content().list().await?))
}

/// `GET /api/admin/content/{type}` - the raw stored record.
pub async fn raw(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(content_type): Path<String>,
) -> Result<Json<Value>> {
    let content_type = checked_type(&content_type)?;
    let record = state.content().record(content_type).await?;
    Ok(Json(json!({ "type": content_type, "data": record })))
}

/// `GET /api/translations?language=`
pub async fn translations(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Value>> {
    let data = resolve(&state, TRANSLATIONS, query.language.as_deref()).await?;
    Ok(Json(data))
}

/// `POST /api/translations` - admin override for one locale.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id, language = %body.language))]
pub async fn update_translations(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Json(body): Json<TranslationsUpdate>,
) -> Result<Json<Value>> {
    let locale = parse_language(&body.language)?;
    if !body.translations.is_object() {
        return Err(AppError::BadRequest(
            "translations must be an object".to_owned(),
        ));
    }
    let stored = state
        .content()
        .update_locale(TRANSLATIONS, locale, &body.translations)
        .await?;
    Ok(Json(stored))
}

/// `GET /api/admin/translations` - stored overrides, both locales.
pub async fn raw_translations(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
) -> Result<Json<Value>> {
    let record = state.content().record(TRANSLATIONS).await?;
    Ok(Json(record.unwrap_or_else(|| json!({}))))
}
