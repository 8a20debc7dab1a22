//! Session layer.
//!
//! Sessions are stored server-side in `PostgreSQL`; the cookie only carries a
//! signed session id.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "outpost_session";

/// Sessions expire after 7 days without a request.
const SESSION_INACTIVITY_DAYS: i64 = 7;

/// Build the session layer. The store's table is created by
/// `outpost-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &WebConfig,
) -> SessionManagerLayer<PostgresStore, tower_sessions::service::SignedCookie> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(SESSION_INACTIVITY_DAYS),
        ))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config.session_secret.expose_secret()))
}

/// Stretch the configured secret to the 64 bytes cookie signing needs.
fn signing_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_stable_per_secret() {
        let a = signing_key("a-long-enough-session-secret-value-123");
        let b = signing_key("a-long-enough-session-secret-value-123");
        let c = signing_key("another-long-enough-session-secret-456");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
