//! Inbox message repository.

use sqlx::PgPool;

use outpost_core::{MessageId, UserId};

use super::RepositoryError;
use crate::models::Message;

const MESSAGE_COLUMNS: &str = "id, recipient_id, sender_id, subject, body, read, created_at";

/// Repository for `outpost.messages`.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's inbox, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for(&self, recipient: UserId) -> Result<Vec<Message>, RepositoryError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM outpost.messages
             WHERE recipient_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(recipient)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Number of unread messages for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, recipient: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM outpost.messages WHERE recipient_id = $1 AND NOT read",
        )
        .bind(recipient)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one of the recipient's messages as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist or
    /// belongs to someone else.
    pub async fn mark_read(
        &self,
        id: MessageId,
        recipient: UserId,
    ) -> Result<Message, RepositoryError> {
        sqlx::query_as::<_, Message>(&format!(
            "UPDATE outpost.messages SET read = TRUE
             WHERE id = $1 AND recipient_id = $2
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(recipient)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete one of the recipient's messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist or
    /// belongs to someone else.
    pub async fn delete(&self, id: MessageId, recipient: UserId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM outpost.messages WHERE id = $1 AND recipient_id = $2")
                .bind(id)
                .bind(recipient)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Send a message to one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipient doesn't exist.
    pub async fn send(
        &self,
        recipient: UserId,
        sender: Option<UserId>,
        subject: &str,
        body: &str,
    ) -> Result<Message, RepositoryError> {
        sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO outpost.messages (recipient_id, sender_id, subject, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(recipient)
        .bind(sender)
        .bind(subject)
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })
    }

    /// Send the same message to every user. Returns how many were delivered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn broadcast(
        &self,
        sender: Option<UserId>,
        subject: &str,
        body: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO outpost.messages (recipient_id, sender_id, subject, body)
             SELECT id, $1, $2, $3 FROM outpost.users",
        )
        .bind(sender)
        .bind(subject)
        .bind(body)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
