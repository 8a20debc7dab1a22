//! Inbox routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use outpost_core::{MessageId, UserId};

use crate::db::MessageRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireStaff, RequireUser, RequireRole};
use crate::models::Message;
use crate::state::AppState;

const MAX_SUBJECT_LENGTH: usize = 200;
const MAX_BODY_LENGTH: usize = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub recipient_id: Option<UserId>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

impl NewMessage {
    fn validate(&self) -> Result<()> {
        let subject = self.subject.trim();
        if subject.is_empty() || subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(AppError::BadRequest(format!(
                "subject must be 1-{MAX_SUBJECT_LENGTH} characters"
            )));
        }
        let body = self.body.trim();
        if body.is_empty() || body.chars().count() > MAX_BODY_LENGTH {
            return Err(AppError::BadRequest(format!(
                "body must be 1-{MAX_BODY_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// `GET /api/inbox`
pub async fn index(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(
        MessageRepository::new(state.pool()).list_for(user.id).await?,
    ))
}

/// `GET /api/inbox/unread-count`
pub async fn unread_count(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
) -> Result<Json<UnreadCount>> {
    let count = MessageRepository::new(state.pool())
        .unread_count(user.id)
        .await?;
    Ok(Json(UnreadCount { count }))
}

/// `POST /api/inbox/{id}/read`
pub async fn mark_read(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Path(id): Path<MessageId>,
) -> Result<Json<Message>> {
    Ok(Json(
        MessageRepository::new(state.pool())
            .mark_read(id, user.id)
            .await?,
    ))
}

/// `DELETE /api/inbox/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Path(id): Path<MessageId>,
) -> Result<StatusCode> {
    MessageRepository::new(state.pool())
        .delete(id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/messages` - direct message, or a broadcast without a recipient.
#[instrument(skip(state, sender, message), fields(sender_id = %sender.id))]
pub async fn send(
    State(state): State<AppState>,
    RequireRole(sender, _): RequireStaff,
    Json(message): Json<NewMessage>,
) -> Result<(StatusCode, Json<Value>)> {
    message.validate()?;
    let repo = MessageRepository::new(state.pool());
    let subject = message.subject.trim();
    let body = message.body.trim();

    let delivered = match message.recipient_id {
        Some(recipient) => {
            repo.send(recipient, Some(sender.id), subject, body)
                .await
                .map_err(|e| match e {
                    crate::db::RepositoryError::NotFound => {
                        AppError::NotFound("recipient not found".to_owned())
                    }
                    other => other.into(),
                })?;
            1
        }
        None => repo.broadcast(Some(sender.id), subject, body).await?,
    };

    tracing::info!(delivered, broadcast = message.recipient_id.is_none(), "Message sent");
    Ok((StatusCode::CREATED, Json(json!({ "delivered": delivered }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str, body: &str) -> NewMessage {
        NewMessage {
            recipient_id: None,
            subject: subject.to_owned(),
            body: body.to_owned(),
        }
    }

    #[test]
    fn test_message_validation() {
        assert!(message("Welcome", "Server restarts at 6pm").validate().is_ok());
        assert!(message("  ", "body").validate().is_err());
        assert!(message("subject", "").validate().is_err());
        assert!(message(&"s".repeat(201), "body").validate().is_err());
    }
}
