//! Job listings and applications.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use outpost_core::{ApplicationId, ApplicationStatus, JobId};

use crate::db::jobs::JobInput;
use crate::db::{ApplicationRepository, JobRepository, MessageRepository};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireAdmin, RequireStaff, RequireUser, RequireRole};
use crate::models::{Application, Job};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub answers: Value,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Decision {
    pub status: ApplicationStatus,
}

fn validate(input: &JobInput) -> Result<()> {
    if input.title.is_complete() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "job title is required in both languages".to_owned(),
        ))
    }
}

/// `GET /api/jobs` - open jobs; staff also see closed ones.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Vec<Job>>> {
    let include_closed = user.is_some_and(|u| u.role.is_staff());
    Ok(Json(
        JobRepository::new(state.pool())
            .list(include_closed)
            .await?,
    ))
}

/// `GET /api/jobs/{id}`
pub async fn show(State(state): State<AppState>, Path(id): Path<JobId>) -> Result<Json<Job>> {
    JobRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("job not found".to_owned()))
}

/// `POST /api/admin/jobs`
pub async fn create(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Json(input): Json<JobInput>,
) -> Result<(StatusCode, Json<Job>)> {
    validate(&input)?;
    let job = JobRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// `PUT /api/admin/jobs/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<JobId>,
    Json(input): Json<JobInput>,
) -> Result<Json<Job>> {
    validate(&input)?;
    Ok(Json(JobRepository::new(state.pool()).update(id, &input).await?))
}

/// `DELETE /api/admin/jobs/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireRole(..): RequireAdmin,
    Path(id): Path<JobId>,
) -> Result<StatusCode> {
    JobRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/jobs/{id}/apply`
#[instrument(skip(state, user, body), fields(user_id = %user.id, job_id = %id))]
pub async fn apply(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
    Path(id): Path<JobId>,
    Json(body): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    if !body.answers.is_object() {
        return Err(AppError::BadRequest("answers must be an object".to_owned()));
    }

    let job = JobRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("job not found".to_owned()))?;
    if !job.open {
        return Err(AppError::BadRequest(
            "this job is not accepting applications".to_owned(),
        ));
    }

    let application = ApplicationRepository::new(state.pool())
        .create(user.id, job.id, &body.answers)
        .await?;
    tracing::info!(application_id = %application.id, "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// `GET /api/applications` - the signed-in user's applications.
pub async fn my_applications(
    State(state): State<AppState>,
    RequireRole(user, _): RequireUser,
) -> Result<Json<Vec<Application>>> {
    Ok(Json(
        ApplicationRepository::new(state.pool())
            .list_for_user(user.id)
            .await?,
    ))
}

/// `GET /api/admin/applications?status=`
pub async fn applications(
    State(state): State<AppState>,
    RequireRole(..): RequireStaff,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Application>>> {
    Ok(Json(
        ApplicationRepository::new(state.pool())
            .list(filter.status)
            .await?,
    ))
}

/// `PATCH /api/admin/applications/{id}/status`
///
/// Approves or rejects a pending application and notifies the applicant.
#[instrument(skip(state, reviewer), fields(reviewer_id = %reviewer.id, application_id = %id))]
pub async fn decide(
    State(state): State<AppState>,
    RequireRole(reviewer, _): RequireStaff,
    Path(id): Path<ApplicationId>,
    Json(decision): Json<Decision>,
) -> Result<Json<Application>> {
    let repo = ApplicationRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("application not found".to_owned()))?;

    if !current.status.can_transition_to(decision.status) {
        return Err(AppError::Conflict(format!(
            "cannot move an application from {} to {}",
            current.status, decision.status
        )));
    }

    let decided = repo
        .decide(id, decision.status, reviewer.id)
        .await?
        .ok_or_else(|| AppError::Conflict("application was already decided".to_owned()))?;

    let job_title = JobRepository::new(state.pool())
        .get(decided.job_id)
        .await?
        .map_or_else(|| format!("job #{}", decided.job_id), |job| job.title.en);
    let (subject, body) = decision_message(&job_title, decided.status);

    // The decision stands even if the notice cannot be delivered.
    if let Err(e) = MessageRepository::new(state.pool())
        .send(decided.user_id, Some(reviewer.id), &subject, &body)
        .await
    {
        tracing::warn!(error = %e, "Failed to notify applicant");
    }

    Ok(Json(decided))
}

fn decision_message(job_title: &str, status: ApplicationStatus) -> (String, String) {
    let subject = format!("Application {}: {job_title}", status.as_str());
    let body = match status {
        ApplicationStatus::Approved => format!(
            "Your application for {job_title} was approved. A staff member will contact you with next steps."
        ),
        ApplicationStatus::Rejected => format!(
            "Your application for {job_title} was not accepted this time. Thank you for applying."
        ),
        ApplicationStatus::Pending => format!("Your application for {job_title} is pending review."),
    };
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_message() {
        let (subject, body) = decision_message("Moderator", ApplicationStatus::Approved);
        assert_eq!(subject, "Application approved: Moderator");
        assert!(body.contains("approved"));

        let (subject, _) = decision_message("Moderator", ApplicationStatus::Rejected);
        assert_eq!(subject, "Application rejected: Moderator");
    }
}
