//! Course authoring and entitlement endpoints. Every handler takes `AdminUser`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use course_core::model::{ModuleId, SegmentDraft, SegmentId, UserId};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::api::CreatedResponse;
use crate::api::auth::AdminUser;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct NewModule {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSegment {
    pub module_id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub video_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentOrder {
    pub segment_ids: Vec<SegmentId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumFlag {
    pub is_premium: bool,
}

/// POST /api/admin/modules
pub async fn create_module(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<NewModule>,
) -> Result<(StatusCode, Json<CreatedResponse<ModuleId>>), ApiError> {
    let id = state.services.course().create_module(input.title).await?;
    info!(admin_id = %admin.id(), module_id = %id, "module created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/admin/segments
pub async fn create_segment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<NewSegment>,
) -> Result<(StatusCode, Json<CreatedResponse<SegmentId>>), ApiError> {
    let draft = SegmentDraft {
        module_id: input.module_id,
        title: input.title,
        is_premium: input.is_premium,
        video_key: input.video_key,
    };
    let id = state.services.course().create_segment(draft).await?;
    info!(admin_id = %admin.id(), segment_id = %id, "segment created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/admin/modules/:moduleId/order
pub async fn reorder_segments(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(module_id): Path<ModuleId>,
    Json(input): Json<SegmentOrder>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .course()
        .reorder_segments(module_id, &input.segment_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/users/:userId/premium
pub async fn set_premium(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<UserId>,
    Json(input): Json<PremiumFlag>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .users()
        .set_premium(user_id, input.is_premium)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/modules", post(create_module))
        .route("/api/admin/segments", post(create_segment))
        .route("/api/admin/modules/:module_id/order", put(reorder_segments))
        .route("/api/admin/users/:user_id/premium", put(set_premium))
}
