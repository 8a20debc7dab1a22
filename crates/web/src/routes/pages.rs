//! Guarded client pages.
//!
//! The client bundle renders every page, but the admin area and the
//! account pages are only handed out after the role guard passes. Anyone
//! else is redirected with a flash notice waiting at `/api/flash`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireUser, RequireRole};
use crate::services::UserDirectory;

/// The client bundle's `index.html`.
#[derive(Clone)]
pub struct ClientIndex(Arc<PathBuf>);

impl ClientIndex {
    #[must_use]
    pub fn new(client_dir: &Path) -> Self {
        Self(Arc::new(client_dir.join("index.html")))
    }

    async fn serve(&self) -> Response {
        match tokio::fs::read_to_string(self.0.as_ref()).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!(error = %e, path = %self.0.display(), "Client index unreadable");
                AppError::Internal("client bundle missing".to_owned()).into_response()
            }
        }
    }
}

/// `GET /admin[/*]`
pub async fn admin(RequireRole(..): RequireAdmin, State(index): State<ClientIndex>) -> Response {
    index.serve().await
}

/// `GET /checkout`, `/orders[/*]`, `/inbox`
pub async fn account(RequireRole(..): RequireUser, State(index): State<ClientIndex>) -> Response {
    index.serve().await
}

/// Page routes that need a signed-in user.
pub fn page_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ClientIndex: FromRef<S>,
    UserDirectory: FromRef<S>,
{
    Router::new()
        .route("/admin", get(admin))
        .route("/admin/{*rest}", get(admin))
        .route("/checkout", get(account))
        .route("/orders", get(account))
        .route("/orders/{*rest}", get(account))
        .route("/inbox", get(account))
}
