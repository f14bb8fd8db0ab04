//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CommentError, ModuleId, SegmentError, SegmentId, UserError, UserId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error("segment order must list every segment of the module exactly once")]
    InvalidOrder,
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("segment {0} not found")]
    SegmentNotFound(SegmentId),
    #[error("segment {0} requires a premium entitlement")]
    PremiumRequired(SegmentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error("segment {0} not found")]
    SegmentNotFound(SegmentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CommentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CommentServiceError {
    #[error("segment {0} not found")]
    SegmentNotFound(SegmentId),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    User(#[from] UserServiceError),
}
