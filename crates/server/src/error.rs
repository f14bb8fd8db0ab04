//! HTTP error mapping for the course API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use services::{
    CommentServiceError, CourseServiceError, ProgressServiceError, StatsServiceError,
    UserServiceError,
};

/// API error type
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 400
    #[error("{0}")]
    BadRequest(String),

    /// 401
    #[error("{0}")]
    Unauthorized(String),

    /// 403
    #[error("{0}")]
    Forbidden(String),

    /// 500, message is logged and never sent to the client
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound(_) => Self::NotFound(err.to_string()),
            UserServiceError::User(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CourseServiceError> for ApiError {
    fn from(err: CourseServiceError) -> Self {
        match err {
            CourseServiceError::ModuleNotFound(_) => Self::NotFound(err.to_string()),
            CourseServiceError::InvalidOrder | CourseServiceError::Segment(_) => {
                Self::BadRequest(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::SegmentNotFound(_) => Self::NotFound(err.to_string()),
            ProgressServiceError::PremiumRequired(_) => Self::Forbidden(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StatsServiceError> for ApiError {
    fn from(err: StatsServiceError) -> Self {
        match err {
            StatsServiceError::SegmentNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::SegmentNotFound(_) => Self::NotFound(err.to_string()),
            CommentServiceError::Comment(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
