//! Jobs, applications, rules and inbox messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use outpost_core::{
    ApplicationId, ApplicationStatus, Bilingual, JobId, MessageId, RuleCategory, RuleId, UserId,
};

/// An open (or closed) staff position.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[sqlx(json)]
    pub title: Bilingual<String>,
    #[sqlx(json)]
    pub description: Bilingual<String>,
    #[sqlx(json)]
    pub requirements: Bilingual<String>,
    pub open: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's application to a job.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub job_id: JobId,
    /// Free-form answers keyed by question.
    pub answers: Value,
    pub status: ApplicationStatus,
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A server rule.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    #[sqlx(json)]
    pub title: Bilingual<String>,
    #[sqlx(json)]
    pub content: Bilingual<String>,
    pub category: RuleCategory,
    pub sort_order: i32,
}

/// An inbox message.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub recipient_id: UserId,
    pub sender_id: Option<UserId>,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
