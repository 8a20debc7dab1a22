//! Authentication extractors and session helpers.
//!
//! Handlers declare who may call them through the extractor they take:
//!
//! ```rust,ignore
//! async fn list_users(RequireAdmin(admin, _): RequireAdmin) -> Result<Json<Vec<User>>> { ... }
//! ```
//!
//! The signed-in user lives in the session; its role is checked against the
//! stored account on every guarded request. A rejected API request gets a
//! JSON 401/403; a rejected page request is redirected and a one-time
//! flash notice is left in the session for the client to show.

use std::marker::PhantomData;

use axum::{
    Json,
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use outpost_core::Role;

use crate::db::RepositoryError;
use crate::models::{CurrentUser, Flash, session_keys};
use crate::services::UserDirectory;

/// A set of roles an extractor admits.
pub trait AllowedRoles: Send + Sync + 'static {
    const ROLES: &'static [Role];
}

/// Any signed-in user.
pub struct AnyUser;

/// Moderators and admins.
pub struct Staff;

/// Admins only.
pub struct AdminOnly;

impl AllowedRoles for AnyUser {
    const ROLES: &'static [Role] = &[Role::User, Role::Moderator, Role::Admin];
}

impl AllowedRoles for Staff {
    const ROLES: &'static [Role] = &[Role::Moderator, Role::Admin];
}

impl AllowedRoles for AdminOnly {
    const ROLES: &'static [Role] = &[Role::Admin];
}

/// Extractor that admits only users whose role is in `A::ROLES`.
pub struct RequireRole<A: AllowedRoles>(pub CurrentUser, pub PhantomData<A>);

pub type RequireUser = RequireRole<AnyUser>;
pub type RequireStaff = RequireRole<Staff>;
pub type RequireAdmin = RequireRole<AdminOnly>;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
    /// The account could not be checked.
    Unavailable,
}

impl Denial {
    /// Notice left for the next page after a redirect.
    const fn notice(self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated => Some("Please sign in to continue."),
            Self::Forbidden => Some("You do not have access to that page."),
            Self::Unavailable => None,
        }
    }
}

/// Check a session user against an allowed-role set.
///
/// # Errors
///
/// Returns the [`Denial`] that applies.
pub fn check(user: Option<&CurrentUser>, allowed: &[Role]) -> Result<(), Denial> {
    match user {
        None => Err(Denial::Unauthenticated),
        Some(user) if allowed.contains(&user.role) => Ok(()),
        Some(_) => Err(Denial::Forbidden),
    }
}

/// Rejection for [`RequireRole`].
#[derive(Debug)]
pub struct RoleRejection {
    denial: Denial,
    api: bool,
}

impl IntoResponse for RoleRejection {
    fn into_response(self) -> Response {
        match (self.denial, self.api) {
            (Denial::Unauthenticated, true) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            (Denial::Forbidden, true) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Insufficient permissions" })),
            )
                .into_response(),
            (Denial::Unavailable, _) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Service temporarily unavailable" })),
            )
                .into_response(),
            (Denial::Unauthenticated, false) => Redirect::to("/login").into_response(),
            (Denial::Forbidden, false) => Redirect::to("/").into_response(),
        }
    }
}

/// Whether `path` addresses the JSON API.
#[must_use]
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.0.path())
}

async fn session_user(session: &Session) -> Option<CurrentUser> {
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable session user, treating as signed out");
            None
        }
    }
}

/// The session user with the stored role applied.
///
/// A session whose account no longer exists is ended.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the account cannot be loaded.
pub async fn verified_user(
    directory: &UserDirectory,
    session: Option<&Session>,
) -> Result<Option<CurrentUser>, RepositoryError> {
    let Some(session) = session else {
        return Ok(None);
    };
    let Some(user) = session_user(session).await else {
        return Ok(None);
    };

    let id = user.id;
    let user = directory.refresh(user).await?;
    if user.is_none() {
        tracing::info!(user_id = %id, "Account no longer exists, ending session");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to end stale session");
        }
    }
    Ok(user)
}

impl<S, A> FromRequestParts<S> for RequireRole<A>
where
    UserDirectory: FromRef<S>,
    S: Send + Sync,
    A: AllowedRoles,
{
    type Rejection = RoleRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api = is_api_path(request_path(parts));
        let session = parts.extensions.get::<Session>().cloned();
        let directory = UserDirectory::from_ref(state);

        let denial = match verified_user(&directory, session.as_ref()).await {
            Ok(user) => match (check(user.as_ref(), A::ROLES), user) {
                (Ok(()), Some(user)) => return Ok(Self(user, PhantomData)),
                (Ok(()), None) => Denial::Unauthenticated,
                (Err(denial), _) => denial,
            },
            Err(e) => {
                tracing::error!(error = %e, "Could not verify session user");
                Denial::Unavailable
            }
        };

        if !api
            && let Some(session) = &session
            && let Some(message) = denial.notice()
            && let Err(e) = set_flash(session, &Flash::error(message)).await
        {
            tracing::warn!(error = %e, "Failed to store flash notice");
        }
        Err(RoleRejection { denial, api })
    }
}

/// Extractor that yields the signed-in user, if any.
///
/// If the account cannot be checked the request is treated as anonymous.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    UserDirectory: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let directory = UserDirectory::from_ref(state);
        let user = match verified_user(&directory, parts.extensions.get::<Session>()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Could not verify session user, treating as anonymous");
                None
            }
        };
        Ok(Self(user))
    }
}

/// Store the signed-in user, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// End the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Leave a one-time notice for the next page the client renders.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: &Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Remove and return the pending notice.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(session_keys::FLASH).await
}
