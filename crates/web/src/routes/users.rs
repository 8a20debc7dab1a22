//! Admin user management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use outpost_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireRole};
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

/// `GET /api/admin/users`
pub async fn index(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

/// `PATCH /api/admin/users/{id}/role`
///
/// The new role applies from the user's next request.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, user_id = %id))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Path(id): Path<UserId>,
    Json(change): Json<RoleChange>,
) -> Result<Json<User>> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "you cannot change your own role".to_owned(),
        ));
    }
    let user = UserRepository::new(state.pool())
        .set_role(id, change.role)
        .await?;
    state.users().forget(id).await;
    tracing::info!(role = %user.role, "User role changed");
    Ok(Json(user))
}
