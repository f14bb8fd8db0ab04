//! Watch progress and completion endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use course_core::model::{CourseCompletion, ProgressRecord, SegmentId};
use serde::Serialize;
use services::WatchOutcome;
use tracing::debug;

use crate::AppState;
use crate::api::auth::SessionUser;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub segment_id: SegmentId,
}

impl From<ProgressRecord> for ProgressEntry {
    fn from(record: ProgressRecord) -> Self {
        Self {
            segment_id: record.segment_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCompletionResponse {
    pub segment_id: SegmentId,
    pub completed: u64,
    pub eligible: u64,
    pub percentage: f64,
}

/// POST /api/progress/:segmentId
///
/// Succeeds with 204 whether or not the segment was already watched.
pub async fn mark_watched(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(segment_id): Path<SegmentId>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .services
        .progress()
        .mark_as_watched(&user, segment_id)
        .await?;
    if outcome == WatchOutcome::AlreadyWatched {
        debug!(user_id = %user.id(), segment_id = %segment_id, "segment already watched");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/progress
pub async fn list_progress(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> Result<Json<Vec<ProgressEntry>>, ApiError> {
    let records = state
        .services
        .progress()
        .get_all_progress_for_user(user.id())
        .await?;
    Ok(Json(records.into_iter().map(ProgressEntry::from).collect()))
}

/// GET /api/progress/summary
pub async fn progress_summary(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> Result<Json<CourseCompletion>, ApiError> {
    let completion = state.services.progress().course_completion(user.id()).await?;
    Ok(Json(completion))
}

/// GET /api/segments/:segmentId/completion
pub async fn segment_completion(
    State(state): State<AppState>,
    Path(segment_id): Path<SegmentId>,
) -> Result<Json<SegmentCompletionResponse>, ApiError> {
    let stats = state.services.stats().segment_completion(segment_id).await?;
    Ok(Json(SegmentCompletionResponse {
        segment_id: stats.segment_id,
        completed: stats.completed,
        eligible: stats.eligible,
        percentage: stats.percentage,
    }))
}

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/api/progress", get(list_progress))
        .route("/api/progress/summary", get(progress_summary))
        .route("/api/progress/:segment_id", post(mark_watched))
        .route("/api/segments/:segment_id/completion", get(segment_completion))
}
