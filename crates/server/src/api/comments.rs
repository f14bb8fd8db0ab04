use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use course_core::model::{Comment, CommentId, SegmentId, UserId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::api::CreatedResponse;
use crate::api::auth::SessionUser;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: CommentId,
    pub segment_id: SegmentId,
    pub user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            segment_id: comment.segment_id,
            user_id: comment.user_id,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub body: String,
}

/// GET /api/segments/:segmentId/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(segment_id): Path<SegmentId>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state.services.comments().list_comments(segment_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// POST /api/segments/:segmentId/comments
pub async fn post_comment(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(segment_id): Path<SegmentId>,
    Json(input): Json<NewComment>,
) -> Result<(StatusCode, Json<CreatedResponse<CommentId>>), ApiError> {
    let id = state
        .services
        .comments()
        .post_comment(&user, segment_id, input.body)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/api/segments/:segment_id/comments",
        get(list_comments).post(post_comment),
    )
}
