use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use course_core::model::{CourseModule, ModuleId, Segment, SegmentId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub id: ModuleId,
    pub title: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl From<CourseModule> for ModuleResponse {
    fn from(module: CourseModule) -> Self {
        Self {
            id: module.id(),
            title: module.title().to_owned(),
            position: module.position(),
            created_at: module.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResponse {
    pub id: SegmentId,
    pub module_id: ModuleId,
    pub title: String,
    pub position: u32,
    pub is_premium: bool,
    pub video_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Segment> for SegmentResponse {
    fn from(segment: Segment) -> Self {
        Self {
            id: segment.id(),
            module_id: segment.module_id(),
            title: segment.title().to_owned(),
            position: segment.position(),
            is_premium: segment.is_premium(),
            video_key: segment.video_key().map(str::to_owned),
            created_at: segment.created_at(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentFilter {
    pub module_id: Option<ModuleId>,
}

/// GET /api/modules
pub async fn list_modules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModuleResponse>>, ApiError> {
    let modules = state.services.course().list_modules().await?;
    Ok(Json(modules.into_iter().map(ModuleResponse::from).collect()))
}

/// GET /api/segments?moduleId=
pub async fn list_segments(
    State(state): State<AppState>,
    Query(filter): Query<SegmentFilter>,
) -> Result<Json<Vec<SegmentResponse>>, ApiError> {
    let segments = state.services.course().list_segments(filter.module_id).await?;
    Ok(Json(segments.into_iter().map(SegmentResponse::from).collect()))
}

/// GET /api/segments/:segmentId
pub async fn get_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<SegmentId>,
) -> Result<Json<SegmentResponse>, ApiError> {
    state
        .services
        .course()
        .get_segment(segment_id)
        .await?
        .map(|segment| Json(segment.into()))
        .ok_or_else(|| ApiError::NotFound(format!("segment {segment_id} not found")))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/api/modules", get(list_modules))
        .route("/api/segments", get(list_segments))
        .route("/api/segments/:segment_id", get(get_segment))
}
