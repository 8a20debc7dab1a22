//! Maintenance page and switch.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::cookie::Cookie;
use tracing::instrument;

use outpost_core::Locale;

use super::parse_language;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRole};
use crate::services::maintenance::MaintenanceStatus;
use crate::state::AppState;

/// Cookie the client sets when the visitor picks a language.
const LANG_COOKIE: &str = "lang";

#[derive(Template, WebTemplate)]
#[template(path = "maintenance.html")]
pub struct MaintenanceTemplate {
    pub lang: &'static str,
    pub dir: &'static str,
    pub title: String,
    pub message: String,
    pub discord_label: Option<String>,
    pub other_lang: &'static str,
    pub other_lang_name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnableRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceContentUpdate {
    pub language: String,
    pub data: Value,
}

/// Pick the page locale: `?lang=`, then the `lang` cookie, then
/// `Accept-Language`, then English.
#[must_use]
pub fn page_locale(query: Option<&str>, headers: &HeaderMap) -> Locale {
    if let Some(locale) = query.and_then(Locale::parse) {
        return locale;
    }

    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|c| c.name() == LANG_COOKIE)
        .and_then(|c| Locale::parse(c.value()));
    if let Some(locale) = from_cookie {
        return locale;
    }

    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or_default()
}

fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

/// `GET /maintenance`
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> MaintenanceTemplate {
    let locale = page_locale(query.lang.as_deref(), &headers);
    let content = state.maintenance().page_text(locale).await;
    let other = locale.other();

    MaintenanceTemplate {
        lang: locale.code(),
        dir: locale.dir(),
        title: text(&content, "title").unwrap_or_default(),
        message: text(&content, "message").unwrap_or_default(),
        discord_label: text(&content, "discordLabel"),
        other_lang: other.code(),
        other_lang_name: match other {
            Locale::En => "English",
            Locale::Ar => "العربية",
        },
    }
}

/// `GET /api/maintenance`
pub async fn status(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    Json(state.maintenance().status().await)
}

/// `POST /api/admin/maintenance/toggle`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
) -> Result<Json<MaintenanceStatus>> {
    Ok(Json(state.maintenance().toggle().await?))
}

/// `POST /api/admin/maintenance/enable`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn enable(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
) -> Result<Json<MaintenanceStatus>> {
    Ok(Json(state.maintenance().set_enabled(true).await?))
}

/// `POST /api/admin/maintenance/disable`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn disable(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
) -> Result<Json<MaintenanceStatus>> {
    Ok(Json(state.maintenance().set_enabled(false).await?))
}

/// `PUT /api/admin/maintenance` `{ enabled }`
pub async fn set(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Json(body): Json<EnableRequest>,
) -> Result<Json<MaintenanceStatus>> {
    Ok(Json(state.maintenance().set_enabled(body.enabled).await?))
}

/// `PUT /api/admin/maintenance/content` `{ language, data }`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_content(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Json(body): Json<MaintenanceContentUpdate>,
) -> Result<Json<MaintenanceStatus>> {
    let locale = parse_language(&body.language)?;
    if !body.data.is_object() {
        return Err(AppError::BadRequest("data must be an object".to_owned()));
    }
    Ok(Json(
        state.maintenance().update_content(locale, &body.data).await?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_locale_precedence() {
        let all = headers(&[
            (header::COOKIE, "outpost_session=abc; lang=ar"),
            (header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"),
        ]);
        assert_eq!(page_locale(Some("en"), &all), Locale::En);
        assert_eq!(page_locale(None, &all), Locale::Ar);
        assert_eq!(page_locale(Some("fr"), &all), Locale::Ar);

        let accept = headers(&[(header::ACCEPT_LANGUAGE, "fr;q=0.9, ar-SA;q=0.8")]);
        assert_eq!(page_locale(None, &accept), Locale::Ar);

        assert_eq!(page_locale(None, &HeaderMap::new()), Locale::En);
    }

    #[test]
    fn test_arabic_page_is_rtl() {
        let page = MaintenanceTemplate {
            lang: Locale::Ar.code(),
            dir: Locale::Ar.dir(),
            title: "سنعود قريباً".to_owned(),
            message: "صيانة".to_owned(),
            discord_label: None,
            other_lang: "en",
            other_lang_name: "English",
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
        assert!(html.contains("سنعود قريباً"));
        assert!(html.contains(r#"href="/maintenance?lang=en""#));
    }
}
