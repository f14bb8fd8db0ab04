use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::comment_service::CommentService;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::stats_service::StatsService;
use crate::user_service::UserService;

/// Assembles every request-facing service over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    users: Arc<UserService>,
    course: Arc<CourseService>,
    progress: Arc<ProgressService>,
    stats: Arc<StatsService>,
    comments: Arc<CommentService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let users = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let course = Arc::new(CourseService::new(clock, Arc::clone(&storage.course)));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.course),
            Arc::clone(&storage.progress),
        ));
        let stats = Arc::new(StatsService::new(
            Arc::clone(&storage.course),
            Arc::clone(&storage.users),
            Arc::clone(&storage.progress),
        ));
        let comments = Arc::new(CommentService::new(
            clock,
            Arc::clone(&storage.course),
            Arc::clone(&storage.comments),
        ));

        Self {
            users,
            course,
            progress,
            stats,
            comments,
        }
    }

    /// Create an admin named `display_name` if no users exist yet.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::User` if the admin cannot be created.
    pub async fn bootstrap_admin(
        &self,
        display_name: &str,
    ) -> Result<Option<course_core::model::UserId>, AppServicesError> {
        Ok(self.users.ensure_admin(display_name.to_owned()).await?)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn course(&self) -> Arc<CourseService> {
        Arc::clone(&self.course)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn comments(&self) -> Arc<CommentService> {
        Arc::clone(&self.comments)
    }
}
