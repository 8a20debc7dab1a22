//! Maintenance gate.
//!
//! While maintenance mode is on, page requests from anyone but an admin are
//! sent to `/maintenance`. The API, the admin area, the login page, health
//! checks and static assets stay reachable so admins can sign in and turn
//! the switch back off. While it is off, `/maintenance` itself redirects
//! home.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use outpost_core::Role;

use super::auth::verified_user;
use crate::services::{MaintenanceService, UserDirectory};

/// Path prefixes that stay reachable during maintenance.
const EXEMPT_PREFIXES: [&str; 6] = ["/api", "/admin", "/maintenance", "/login", "/health", "/assets"];

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect(&'static str),
}

/// Whether `path` is `prefix` or lies below it (`/admin`, `/admin/x`, but
/// not `/adminx`).
#[must_use]
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decide a request's fate given the switch and the session user's role.
#[must_use]
pub fn decide(path: &str, enabled: bool, role: Option<Role>) -> GateDecision {
    if !enabled {
        return if has_segment_prefix(path, "/maintenance") {
            GateDecision::Redirect("/")
        } else {
            GateDecision::Pass
        };
    }

    match role {
        Some(role) if role.is_admin() => GateDecision::Pass,
        Some(_) if has_segment_prefix(path, "/admin") => GateDecision::Redirect("/maintenance"),
        _ if EXEMPT_PREFIXES
            .iter()
            .any(|prefix| has_segment_prefix(path, prefix)) =>
        {
            GateDecision::Pass
        }
        _ => GateDecision::Redirect("/maintenance"),
    }
}

/// Middleware applying [`decide`] to every request.
///
/// Must run inside the session layer. The bypass uses the stored role of
/// the session user; if it cannot be checked the user is treated as
/// anonymous.
pub async fn maintenance_gate(
    State(maintenance): State<MaintenanceService>,
    State(users): State<UserDirectory>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let enabled = maintenance.is_enabled().await;

    let role = if enabled {
        match verified_user(&users, request.extensions().get::<Session>()).await {
            Ok(user) => user.map(|user| user.role),
            Err(e) => {
                tracing::warn!(error = %e, "Could not verify session user at the gate");
                None
            }
        }
    } else {
        None
    };

    match decide(&path, enabled, role) {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(%path, to, "Maintenance gate redirect");
            Redirect::to(to).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router, body::Body, extract::FromRef, http::StatusCode, middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::models::MaintenanceState;
    use crate::services::directory::tests::offline_directory;
    use crate::services::maintenance::tests::offline_service;

    #[derive(Clone)]
    struct GateState {
        maintenance: MaintenanceService,
        users: UserDirectory,
    }

    impl FromRef<GateState> for MaintenanceService {
        fn from_ref(state: &GateState) -> Self {
            state.maintenance.clone()
        }
    }

    impl FromRef<GateState> for UserDirectory {
        fn from_ref(state: &GateState) -> Self {
            state.users.clone()
        }
    }

    #[test]
    fn test_off_passes_everything_but_maintenance_page() {
        for path in ["/", "/store", "/admin", "/api/products"] {
            assert_eq!(decide(path, false, None), GateDecision::Pass, "{path}");
        }
        assert_eq!(decide("/maintenance", false, None), GateDecision::Redirect("/"));
        assert_eq!(
            decide("/maintenance", false, Some(Role::Admin)),
            GateDecision::Redirect("/")
        );
        assert_eq!(decide("/maintenancex", false, None), GateDecision::Pass);
    }

    #[test]
    fn test_on_redirects_public_pages() {
        for role in [None, Some(Role::User), Some(Role::Moderator)] {
            for path in ["/", "/store", "/jobs/3", "/adminx", "/apiary"] {
                assert_eq!(
                    decide(path, true, role),
                    GateDecision::Redirect("/maintenance"),
                    "{path} {role:?}"
                );
            }
        }
    }

    #[test]
    fn test_on_keeps_exempt_paths_open() {
        for path in [
            "/api/maintenance",
            "/maintenance",
            "/login",
            "/health/ready",
            "/assets/app.js",
            "/admin",
        ] {
            assert_eq!(decide(path, true, None), GateDecision::Pass, "{path}");
        }
    }

    #[test]
    fn test_on_non_admin_cannot_reach_admin_area() {
        assert_eq!(
            decide("/admin/content", true, Some(Role::Moderator)),
            GateDecision::Redirect("/maintenance")
        );
        assert_eq!(decide("/api/admin/users", true, Some(Role::User)), GateDecision::Pass);
    }

    #[test]
    fn test_on_admin_passes() {
        for path in ["/", "/store", "/admin/content"] {
            assert_eq!(decide(path, true, Some(Role::Admin)), GateDecision::Pass);
        }
    }

    fn app(service: MaintenanceService) -> Router {
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/store", get(|| async { "store" }))
            .route("/maintenance", get(|| async { "down" }))
            .route("/api/maintenance", get(|| async { "status" }))
            .layer(from_fn_with_state(
                GateState {
                    maintenance: service,
                    users: offline_directory(),
                },
                maintenance_gate,
            ))
    }

    async fn get_status(app: &Router, path: &str) -> (StatusCode, Option<String>) {
        let response = app
            .clone()
            .oneshot(axum::http::Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let location = response
            .headers()
            .get("location")
            .map(|v| v.to_str().unwrap().to_owned());
        (response.status(), location)
    }

    #[tokio::test]
    async fn test_on_then_off_restores_routing() {
        let service = offline_service();
        let app = app(service.clone());

        service
            .prime(MaintenanceState {
                enabled: true,
                ..MaintenanceState::off()
            })
            .await;
        assert_eq!(
            get_status(&app, "/store").await,
            (StatusCode::SEE_OTHER, Some("/maintenance".to_owned()))
        );
        assert_eq!(get_status(&app, "/api/maintenance").await.0, StatusCode::OK);
        assert_eq!(get_status(&app, "/maintenance").await.0, StatusCode::OK);

        service.prime(MaintenanceState::off()).await;
        assert_eq!(get_status(&app, "/store").await, (StatusCode::OK, None));
        assert_eq!(
            get_status(&app, "/maintenance").await,
            (StatusCode::SEE_OTHER, Some("/".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_unreadable_state_fails_open() {
        let app = app(offline_service());
        assert_eq!(get_status(&app, "/").await, (StatusCode::OK, None));
    }
}
