//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::WebConfig;
use crate::routes::pages::ClientIndex;
use crate::services::paypal::{PayPalClient, PayPalError};
use crate::services::{ContentService, MaintenanceService, UserDirectory};

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    content: ContentService,
    maintenance: MaintenanceService,
    users: UserDirectory,
    client_index: ClientIndex,
    paypal: PayPalClient,
}

impl AppState {
    /// Build the state, loading the translation bundles from
    /// `config.locales_dir`.
    ///
    /// # Errors
    ///
    /// Returns `PayPalError::Http` if the PayPal HTTP client cannot be built.
    pub fn new(config: WebConfig, pool: PgPool) -> Result<Self, PayPalError> {
        let translations = crate::services::translations::load_bundle(&config.locales_dir);
        let content = ContentService::new(pool.clone(), translations);
        let maintenance = MaintenanceService::new(pool.clone());
        let users = UserDirectory::new(pool.clone());
        let client_index = ClientIndex::new(&config.client_dir);
        let paypal = PayPalClient::new(config.paypal.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                maintenance,
                users,
                client_index,
                paypal,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    #[must_use]
    pub fn maintenance(&self) -> &MaintenanceService {
        &self.inner.maintenance
    }

    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.inner.users
    }

    #[must_use]
    pub fn paypal(&self) -> &PayPalClient {
        &self.inner.paypal
    }
}

impl FromRef<AppState> for MaintenanceService {
    fn from_ref(state: &AppState) -> Self {
        state.inner.maintenance.clone()
    }
}

impl FromRef<AppState> for UserDirectory {
    fn from_ref(state: &AppState) -> Self {
        state.inner.users.clone()
    }
}

impl FromRef<AppState> for ClientIndex {
    fn from_ref(state: &AppState) -> Self {
        state.inner.client_index.clone()
    }
}
