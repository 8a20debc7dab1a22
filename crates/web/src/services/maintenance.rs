//! Maintenance mode switch.
//!
//! The gate middleware asks [`MaintenanceService::is_enabled`] on every
//! request, so the stored state is cached for five seconds. Writes through
//! this service clear the cache immediately; other server instances pick the
//! change up when their cache entry expires.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::PgPool;

use outpost_core::{Locale, content};

use crate::db::RepositoryError;
use crate::db::maintenance::MaintenanceRepository;
use crate::models::MaintenanceState;

/// Maintenance state as served to clients, with page text resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceStatus {
    pub enabled: bool,
    pub content: Value,
}

/// Page text used when none has been stored.
#[must_use]
pub fn default_content() -> Value {
    json!({
        "en": {
            "title": "We'll be right back",
            "message": "The site is down for scheduled maintenance. Please check back soon.",
            "discordLabel": "Follow updates on Discord"
        },
        "ar": {
            "title": "سنعود قريباً",
            "message": "الموقع متوقف للصيانة المجدولة. يرجى العودة لاحقاً.",
            "discordLabel": "تابع التحديثات على ديسكورد"
        }
    })
}

/// Reads and flips the maintenance switch.
#[derive(Clone)]
pub struct MaintenanceService {
    inner: Arc<MaintenanceServiceInner>,
}

struct MaintenanceServiceInner {
    pool: PgPool,
    cache: Cache<(), MaintenanceState>,
}

impl MaintenanceService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(5))
            .build();

        Self {
            inner: Arc::new(MaintenanceServiceInner { pool, cache }),
        }
    }

    /// Current stored state, through the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the state cannot be loaded.
    pub async fn state(&self) -> Result<MaintenanceState, RepositoryError> {
        if let Some(state) = self.inner.cache.get(&()).await {
            return Ok(state);
        }
        let state = MaintenanceRepository::new(&self.inner.pool).get().await?;
        self.inner.cache.insert((), state.clone()).await;
        Ok(state)
    }

    /// Whether the gate should be closed.
    ///
    /// Fails open: if the state cannot be read the site stays reachable.
    pub async fn is_enabled(&self) -> bool {
        match self.state().await {
            Ok(state) => state.enabled,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read maintenance state, treating as off");
                false
            }
        }
    }

    /// State with page text resolved for both locales. Reports the switch
    /// as off with the default text if the state cannot be read.
    pub async fn status(&self) -> MaintenanceStatus {
        match self.state().await {
            Ok(state) => MaintenanceStatus {
                enabled: state.enabled,
                content: content::resolve_all(&default_content(), Some(&state.content)),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Could not read maintenance state, reporting off");
                MaintenanceStatus {
                    enabled: false,
                    content: content::resolve_all(&default_content(), None),
                }
            }
        }
    }

    /// Page text for one locale. Falls back to the defaults if the state
    /// cannot be read.
    pub async fn page_text(&self, locale: Locale) -> Value {
        let stored = match self.state().await {
            Ok(state) => Some(state.content),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read maintenance text, using defaults");
                None
            }
        };
        content::resolve_locale(&default_content(), stored.as_ref(), locale)
    }

    /// Turn maintenance mode on or off.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn set_enabled(&self, enabled: bool) -> Result<MaintenanceStatus, RepositoryError> {
        let state = MaintenanceRepository::new(&self.inner.pool)
            .set_enabled(enabled)
            .await?;
        self.store(state, "set").await
    }

    /// Flip the switch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn toggle(&self) -> Result<MaintenanceStatus, RepositoryError> {
        let state = MaintenanceRepository::new(&self.inner.pool).toggle().await?;
        self.store(state, "toggled").await
    }

    /// Replace one locale of the page text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn update_content(
        &self,
        locale: Locale,
        payload: &Value,
    ) -> Result<MaintenanceStatus, RepositoryError> {
        let state = MaintenanceRepository::new(&self.inner.pool)
            .update_content(locale, payload)
            .await?;
        self.store(state, "content updated").await
    }

    async fn store(
        &self,
        state: MaintenanceState,
        action: &str,
    ) -> Result<MaintenanceStatus, RepositoryError> {
        self.inner.cache.invalidate(&()).await;
        tracing::info!(enabled = state.enabled, action, "Maintenance mode changed");
        Ok(MaintenanceStatus {
            enabled: state.enabled,
            content: content::resolve_all(&default_content(), Some(&state.content)),
        })
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, state: MaintenanceState) {
        self.inner.cache.insert((), state).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    /// A service whose database is unreachable, answering from the cache.
    pub(crate) fn offline_service() -> MaintenanceService {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://outpost@127.0.0.1:1/outpost_test")
            .unwrap();
        MaintenanceService::new(pool)
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_open() {
        let service = offline_service();
        assert!(!service.is_enabled().await);

        let text = service.page_text(Locale::Ar).await;
        assert_eq!(text, default_content()["ar"]);

        let status = service.status().await;
        assert!(!status.enabled);
        assert_eq!(status.content, default_content());
    }

    #[tokio::test]
    async fn test_status_resolves_stored_text() {
        let service = offline_service();
        service
            .prime(MaintenanceState {
                enabled: true,
                content: json!({ "en": { "message": "Back at 18:00 UTC" } }),
            })
            .await;

        assert!(service.is_enabled().await);
        let status = service.status().await;
        assert_eq!(status.content["en"]["message"], "Back at 18:00 UTC");
        assert_eq!(status.content["en"]["title"], "We'll be right back");
        assert_eq!(status.content["ar"], default_content()["ar"]);
    }
}
