#![forbid(unsafe_code)]

pub mod app_services;
pub mod comment_service;
pub mod course_service;
pub mod error;
pub mod progress_service;
pub mod stats_service;
pub mod user_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use comment_service::CommentService;
pub use course_service::CourseService;
pub use error::{
    AppServicesError, CommentServiceError, CourseServiceError, ProgressServiceError,
    StatsServiceError, UserServiceError,
};
pub use progress_service::{ProgressService, WatchOutcome};
pub use stats_service::{SegmentCompletion, StatsService};
pub use user_service::UserService;
