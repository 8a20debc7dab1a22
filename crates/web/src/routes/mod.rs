//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /maintenance                       - Maintenance page (HTML)
//! GET  /admin[/*]                         - Client bundle (admin)
//! GET  /checkout, /orders[/*], /inbox     - Client bundle (signed in)
//!
//! # Auth
//! POST /api/auth/register                 - Create account (rate limited)
//! POST /api/auth/login                    - Sign in (rate limited)
//! POST /api/auth/logout                   - Sign out
//! GET  /api/auth/me                       - Current user
//! GET  /api/flash                         - Pop the pending notice
//!
//! # Content
//! GET  /api/content/{type}                - Resolved content (?language=)
//! PUT  /api/content/{type}                - Edit content (admin)
//! GET  /api/translations                  - Resolved UI strings (?language=)
//! POST /api/translations                  - Override UI strings (admin)
//! GET  /api/admin/content[/{type}]        - Stored records (admin)
//! GET  /api/admin/translations            - Stored overrides (admin)
//!
//! # Maintenance
//! GET  /api/maintenance                   - Public status
//! POST /api/admin/maintenance/{toggle,enable,disable}
//! PUT  /api/admin/maintenance[/content]
//!
//! # Store
//! GET  /api/products[/{id}]
//! POST /api/coupons/validate
//! POST /api/checkout
//! GET  /api/paypal/config
//! GET  /api/orders[/{id}]
//! POST /api/orders/{id}/capture
//! /api/admin/{products,coupons,orders}... - Store management
//!
//! # Community
//! GET  /api/jobs[/{id}], POST /api/jobs/{id}/apply
//! GET  /api/applications
//! GET  /api/rules
//! /api/inbox...                           - The signed-in user's messages
//! /api/admin/{jobs,applications,rules,messages,users}...
//! ```
//!
//! Unmatched `/api` paths answer with a JSON 404 so they never fall through
//! to the client bundle.

pub mod auth;
pub mod checkout;
pub mod content;
pub mod coupons;
pub mod inbox;
pub mod jobs;
pub mod maintenance;
pub mod orders;
pub mod pages;
pub mod products;
pub mod rules;
pub mod users;

use axum::{
    Router,
    routing::{any, delete, get, patch, post, put},
};

use outpost_core::Locale;

use crate::config::WebConfig;
use crate::error::{AppError, Result};
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Parse a `language` parameter.
pub(crate) fn parse_language(code: &str) -> Result<Locale> {
    Locale::parse(code).ok_or_else(|| AppError::BadRequest(format!("unsupported language: {code}")))
}

/// Account routes, nested under `/api/auth`.
pub fn auth_routes(config: &WebConfig) -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route_layer(auth_rate_limiter(config.trust_proxy_headers));

    Router::new()
        .merge(limited)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Content and translation routes.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/content/{type}", get(content::show).put(content::update))
        .route(
            "/translations",
            get(content::translations).post(content::update_translations),
        )
        .route("/admin/content", get(content::list))
        .route("/admin/content/{type}", get(content::raw))
        .route("/admin/translations", get(content::raw_translations))
}

/// Maintenance status and admin switches.
pub fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/maintenance", get(maintenance::status))
        .route("/admin/maintenance", put(maintenance::set))
        .route("/admin/maintenance/toggle", post(maintenance::toggle))
        .route("/admin/maintenance/enable", post(maintenance::enable))
        .route("/admin/maintenance/disable", post(maintenance::disable))
        .route("/admin/maintenance/content", put(maintenance::update_content))
}

/// Products, coupons, checkout and orders.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/coupons/validate", post(coupons::validate))
        .route("/checkout", post(checkout::checkout))
        .route("/paypal/config", get(checkout::paypal_config))
        .route("/orders", get(orders::mine))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/capture", post(orders::capture))
        .route("/admin/products", post(products::create))
        .route(
            "/admin/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route(
            "/admin/coupons",
            get(coupons::index).post(coupons::create),
        )
        .route("/admin/coupons/{id}", delete(coupons::deactivate))
        .route("/admin/orders", get(orders::index))
        .route("/admin/orders/{id}/status", patch(orders::set_status))
}

/// Jobs, applications, rules, inbox and user management.
pub fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::index))
        .route("/jobs/{id}", get(jobs::show))
        .route("/jobs/{id}/apply", post(jobs::apply))
        .route("/applications", get(jobs::my_applications))
        .route("/rules", get(rules::index))
        .route("/inbox", get(inbox::index))
        .route("/inbox/unread-count", get(inbox::unread_count))
        .route("/inbox/{id}", delete(inbox::delete))
        .route("/inbox/{id}/read", post(inbox::mark_read))
        .route("/admin/jobs", post(jobs::create))
        .route("/admin/jobs/{id}", put(jobs::update).delete(jobs::delete))
        .route("/admin/applications", get(jobs::applications))
        .route("/admin/applications/{id}/status", patch(jobs::decide))
        .route("/admin/rules", post(rules::create))
        .route("/admin/rules/reorder", post(rules::reorder))
        .route("/admin/rules/{id}", put(rules::update).delete(rules::delete))
        .route("/admin/messages", post(inbox::send))
        .route("/admin/users", get(users::index))
        .route("/admin/users/{id}/role", patch(users::set_role))
}

async fn api_not_found() -> AppError {
    AppError::NotFound("no such endpoint".to_owned())
}

/// Create all routes.
pub fn routes(config: &WebConfig) -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes(config))
        .route("/flash", get(auth::flash))
        .merge(content_routes())
        .merge(maintenance_routes())
        .merge(store_routes())
        .merge(community_routes())
        .route("/{*rest}", any(api_not_found));

    Router::new()
        .route("/maintenance", get(maintenance::page))
        .merge(pages::page_routes())
        .nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("ar").ok(), Some(Locale::Ar));
        assert!(matches!(parse_language("fr"), Err(AppError::BadRequest(_))));
    }
}
