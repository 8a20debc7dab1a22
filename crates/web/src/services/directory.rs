//! Stored roles for signed-in users.
//!
//! The session only remembers who signed in. Every guarded request checks
//! the account against the database so that a role change or a deleted
//! account takes effect on the next request, not the next login. Lookups
//! are cached for ten seconds; role changes made through this service drop
//! the entry at once.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use outpost_core::{Role, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::models::CurrentUser;

/// Looks up the stored role of session users.
#[derive(Clone)]
pub struct UserDirectory {
    inner: Arc<UserDirectoryInner>,
}

struct UserDirectoryInner {
    pool: PgPool,
    /// Stored role by user; `None` caches a missing account.
    cache: Cache<UserId, Option<Role>>,
}

/// Apply the stored role to a session user. A missing account signs the
/// user out.
#[must_use]
pub fn reconcile(user: CurrentUser, stored: Option<Role>) -> Option<CurrentUser> {
    stored.map(|role| CurrentUser { role, ..user })
}

impl UserDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(10))
            .build();

        Self {
            inner: Arc::new(UserDirectoryInner { pool, cache }),
        }
    }

    /// The stored role, or `None` if the account no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the user cannot be loaded.
    pub async fn role(&self, id: UserId) -> Result<Option<Role>, RepositoryError> {
        if let Some(cached) = self.inner.cache.get(&id).await {
            return Ok(cached);
        }

        let role = UserRepository::new(&self.inner.pool)
            .get_by_id(id)
            .await?
            .map(|user| user.role);
        self.inner.cache.insert(id, role).await;
        Ok(role)
    }

    /// Bring a session user in line with the stored account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the user cannot be loaded.
    pub async fn refresh(&self, user: CurrentUser) -> Result<Option<CurrentUser>, RepositoryError> {
        let stored = self.role(user.id).await?;
        Ok(reconcile(user, stored))
    }

    /// Drop a cached entry after the account changed.
    pub async fn forget(&self, id: UserId) {
        self.inner.cache.invalidate(&id).await;
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, id: UserId, role: Option<Role>) {
        self.inner.cache.insert(id, role).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use sqlx::postgres::PgPoolOptions;

    use outpost_core::Email;

    use super::*;

    /// A directory whose database is unreachable, answering from the cache.
    pub(crate) fn offline_directory() -> UserDirectory {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://outpost@127.0.0.1:1/outpost_test")
            .unwrap();
        UserDirectory::new(pool)
    }

    fn session_user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("mod@example.com").unwrap(),
            username: "mod".to_owned(),
            role,
        }
    }

    #[test]
    fn test_stored_role_replaces_session_role() {
        let user = reconcile(session_user(Role::Admin), Some(Role::User)).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.username, "mod");

        assert!(reconcile(session_user(Role::Admin), None).is_none());
    }

    #[tokio::test]
    async fn test_forget_drops_cached_role() {
        let directory = offline_directory();
        directory.prime(UserId::new(7), Some(Role::Moderator)).await;

        let user = directory.refresh(session_user(Role::Admin)).await.unwrap();
        assert_eq!(user.map(|u| u.role), Some(Role::Moderator));

        directory.forget(UserId::new(7)).await;
        assert!(matches!(
            directory.role(UserId::new(7)).await,
            Err(RepositoryError::Database(_))
        ));
    }
}
