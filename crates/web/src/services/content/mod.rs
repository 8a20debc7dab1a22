//! Content resolution with in-process caching.
//!
//! Public pages read bilingual documents through [`ContentService`], which
//! overlays the stored record for a content type onto its built-in default.
//! Records are cached for 30 seconds and dropped from the cache on every
//! write made through this service. Reads fail open: if a record cannot be
//! loaded the built-in default is served.

mod defaults;

pub use defaults::KNOWN_TYPES;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use sqlx::PgPool;

use outpost_core::{Locale, content};

use crate::db::RepositoryError;
use crate::db::content::{ContentRepository, ContentSummary};

/// Content type holding translation overrides.
pub const TRANSLATIONS: &str = "translations";

/// Resolves and edits content records.
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<ContentServiceInner>,
}

struct ContentServiceInner {
    pool: PgPool,
    /// Stored records by content type; `None` caches a missing record.
    cache: Cache<String, Option<Value>>,
    /// Default translation bundle, `{"en": {...}, "ar": {...}}`.
    translations: Value,
}

impl ContentService {
    #[must_use]
    pub fn new(pool: PgPool, translations: Value) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(30))
            .build();

        Self {
            inner: Arc::new(ContentServiceInner {
                pool,
                cache,
                translations,
            }),
        }
    }

    /// The default document for a content type, if it has one.
    #[must_use]
    pub fn default_for(&self, content_type: &str) -> Option<Value> {
        if content_type == TRANSLATIONS {
            return Some(self.inner.translations.clone());
        }
        defaults::builtin(content_type)
    }

    /// The stored record for a content type, through the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the record cannot be loaded.
    pub async fn record(&self, content_type: &str) -> Result<Option<Value>, RepositoryError> {
        if let Some(cached) = self.inner.cache.get(content_type).await {
            return Ok(cached);
        }

        let record = ContentRepository::new(&self.inner.pool)
            .get(content_type)
            .await?;
        self.inner
            .cache
            .insert(content_type.to_owned(), record.clone())
            .await;
        Ok(record)
    }

    /// The stored record, or `None` if it cannot be loaded.
    async fn record_or_default(&self, content_type: &str) -> Option<Value> {
        match self.record(content_type).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, content_type, "Could not load content, using defaults");
                None
            }
        }
    }

    /// Resolve one locale. `None` means the type has neither a default nor
    /// a stored record.
    pub async fn resolve(&self, content_type: &str, locale: Locale) -> Option<Value> {
        let default = self.default_for(content_type);
        let record = self.record_or_default(content_type).await;
        if default.is_none() && record.is_none() {
            return None;
        }
        Some(content::resolve_locale(
            default.as_ref().unwrap_or(&Value::Null),
            record.as_ref(),
            locale,
        ))
    }

    /// Resolve both locales into `{"en": .., "ar": ..}`.
    pub async fn resolve_all(&self, content_type: &str) -> Option<Value> {
        let default = self.default_for(content_type);
        let record = self.record_or_default(content_type).await;
        if default.is_none() && record.is_none() {
            return None;
        }
        Some(content::resolve_all(
            default.as_ref().unwrap_or(&Value::Null),
            record.as_ref(),
        ))
    }

    /// Store one locale's payload, leaving the other locale untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn update_locale(
        &self,
        content_type: &str,
        locale: Locale,
        payload: &Value,
    ) -> Result<Value, RepositoryError> {
        let data = ContentRepository::new(&self.inner.pool)
            .upsert_locale(content_type, locale, payload)
            .await?;
        self.inner.cache.invalidate(content_type).await;
        tracing::info!(content_type, locale = %locale, "Content locale updated");
        Ok(data)
    }

    /// Replace the whole stored document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn replace(&self, content_type: &str, data: &Value) -> Result<Value, RepositoryError> {
        let data = ContentRepository::new(&self.inner.pool)
            .replace(content_type, data)
            .await?;
        self.inner.cache.invalidate(content_type).await;
        tracing::info!(content_type, "Content record replaced");
        Ok(data)
    }

    /// Stored content types.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContentSummary>, RepositoryError> {
        ContentRepository::new(&self.inner.pool).list().await
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, content_type: &str, record: Option<Value>) {
        self.inner
            .cache
            .insert(content_type.to_owned(), record)
            .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn service(translations: Value) -> ContentService {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://outpost@127.0.0.1:1/outpost_test")
            .unwrap();
        ContentService::new(pool, translations)
    }

    #[tokio::test]
    async fn test_missing_record_resolves_to_default() {
        let service = service(json!({}));
        for content_type in KNOWN_TYPES {
            service.prime(content_type, None).await;
            let default = service.default_for(content_type).unwrap();
            for locale in Locale::ALL {
                let resolved = service.resolve(content_type, locale).await;
                assert_eq!(resolved.as_ref(), default.get(locale.code()));
            }
        }
    }

    #[tokio::test]
    async fn test_stored_locale_wins() {
        let service = service(json!({}));
        service
            .prime(
                "hero",
                Some(json!({ "en": { "title": "Season 4" }, "ar": { "title": "الموسم الرابع" } })),
            )
            .await;

        let en = service.resolve("hero", Locale::En).await.unwrap();
        assert_eq!(en["title"], "Season 4");
        assert_eq!(en["subtitle"], "A roleplay community built by its players.");

        let ar = service.resolve("hero", Locale::Ar).await.unwrap();
        assert_eq!(ar["title"], "الموسم الرابع");
    }

    #[tokio::test]
    async fn test_unknown_type_without_record_is_none() {
        let service = service(json!({}));
        service.prime("motd", None).await;
        assert!(service.resolve("motd", Locale::En).await.is_none());
        assert!(service.resolve_all("motd").await.is_none());

        service.prime("motd", Some(json!({ "en": { "text": "hi" } }))).await;
        let all = service.resolve_all("motd").await.unwrap();
        assert_eq!(all["en"], json!({ "text": "hi" }));
        assert_eq!(all["ar"], Value::Null);
    }

    #[tokio::test]
    async fn test_translations_overlay_bundle() {
        let bundle = json!({
            "en": { "nav": { "home": "Home", "store": "Store" } },
            "ar": { "nav": { "home": "الرئيسية", "store": "المتجر" } }
        });
        let service = service(bundle);
        service
            .prime(TRANSLATIONS, Some(json!({ "en": { "nav": { "store": "Shop" } } })))
            .await;

        let en = service.resolve(TRANSLATIONS, Locale::En).await.unwrap();
        assert_eq!(en, json!({ "nav": { "home": "Home", "store": "Shop" } }));
        let ar = service.resolve(TRANSLATIONS, Locale::Ar).await.unwrap();
        assert_eq!(ar["nav"]["store"], "المتجر");
    }

    #[tokio::test]
    async fn test_unreachable_database_serves_defaults() {
        let bundle = json!({ "en": { "nav": { "home": "Home" } }, "ar": { "nav": { "home": "الرئيسية" } } });
        let service = service(bundle.clone());

        let hero = service.default_for("hero").unwrap();
        assert_eq!(service.resolve("hero", Locale::Ar).await.as_ref(), hero.get("ar"));
        assert_eq!(
            service.resolve_all("hero").await,
            Some(content::resolve_all(&hero, None))
        );
        assert_eq!(service.resolve(TRANSLATIONS, Locale::En).await, Some(bundle["en"].clone()));
        assert!(service.resolve("motd", Locale::En).await.is_none());
        assert!(service.record("hero").await.is_err());
    }
}
