//! Birth data onboarding handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::models::BirthRecord;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::BirthDataSubmission;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub record: BirthRecord,

    /// False when the record was computed but the profile store write
    /// failed; the caller should offer a retry.
    pub saved: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

/// Submit birth data for a user
pub async fn submit_birth_data(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(submission): Json<BirthDataSubmission>,
) -> AppResult<Json<SubmissionResponse>> {
    let outcome = state
        .onboarding
        .submit_birth_data(user_id, submission)
        .await?;

    Ok(Json(SubmissionResponse {
        saved: outcome.save_error.is_none(),
        save_error: outcome.save_error.map(|e| e.to_string()),
        record: outcome.record,
    }))
}

/// Load a user's birth record and re-populate the session state
pub async fn get_birth_data(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<BirthRecord>> {
    let record = state
        .onboarding
        .load_session(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Birth record".to_string()))?;

    Ok(Json(record))
}
