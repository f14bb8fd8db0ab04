use std::sync::Arc;

use course_core::model::{CourseCompletion, ProgressRecord, SegmentId, User, UserId};
use storage::repository::{CourseRepository, ProgressRepository, StorageError};
use tracing::debug;

use crate::error::ProgressServiceError;

/// What a mark-as-watched call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Recorded,
    AlreadyWatched,
}

/// Per-user watch log over segments.
#[derive(Clone)]
pub struct ProgressService {
    course: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(course: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { course, progress }
    }

    /// Record that `viewer` watched the segment. Idempotent.
    ///
    /// The existence check and the insert are not atomic: a concurrent call for
    /// the same pair surfaces as a unique violation, which is treated as
    /// `AlreadyWatched`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::SegmentNotFound` if the segment is missing,
    /// `ProgressServiceError::PremiumRequired` for a premium segment and a
    /// non-premium viewer, and `ProgressServiceError::Storage` for any other
    /// storage failure.
    pub async fn mark_as_watched(
        &self,
        viewer: &User,
        segment_id: SegmentId,
    ) -> Result<WatchOutcome, ProgressServiceError> {
        let segment = self
            .course
            .get_segment(segment_id)
            .await?
            .ok_or(ProgressServiceError::SegmentNotFound(segment_id))?;
        if segment.is_premium() && !viewer.is_premium() {
            return Err(ProgressServiceError::PremiumRequired(segment_id));
        }

        let user_id = viewer.id();
        if self.progress.get_progress(user_id, segment_id).await?.is_some() {
            return Ok(WatchOutcome::AlreadyWatched);
        }

        match self.progress.mark_as_watched(user_id, segment_id).await {
            Ok(()) => Ok(WatchOutcome::Recorded),
            Err(StorageError::UniqueViolation) => {
                debug!(user_id = %user_id, segment_id = %segment_id, "concurrent watch mark ignored");
                Ok(WatchOutcome::AlreadyWatched)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every segment the user has watched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn get_all_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, ProgressServiceError> {
        Ok(self.progress.get_all_progress_for_user(user_id).await?)
    }

    /// Number of distinct users who watched the segment.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn get_segment_completed_progress(
        &self,
        segment_id: SegmentId,
    ) -> Result<u64, ProgressServiceError> {
        Ok(self.progress.get_segment_completed_progress(segment_id).await?)
    }

    /// The user's share of watched segments across the whole course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn course_completion(
        &self,
        user_id: UserId,
    ) -> Result<CourseCompletion, ProgressServiceError> {
        let (progress, segments) = tokio::try_join!(
            self.progress.get_all_progress_for_user(user_id),
            self.course.list_segments(None),
        )?;
        Ok(CourseCompletion::compute(&progress, &segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use course_core::model::{SegmentDraft, UserDraft};
    use course_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewModuleRecord, UserRepository};

    async fn seed_segment(repo: &InMemoryRepository, is_premium: bool) -> SegmentId {
        let module = repo
            .insert_new_module(NewModuleRecord {
                title: "Basics".into(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let draft = SegmentDraft {
            module_id: module,
            title: "Intro".into(),
            is_premium,
            video_key: None,
        };
        repo.insert_new_segment(&draft.validate(fixed_now()).unwrap())
            .await
            .unwrap()
    }

    async fn seed_user(repo: &InMemoryRepository, premium: bool) -> User {
        let id = repo
            .insert_new_user(&UserDraft::member("Viewer").validate(fixed_now()).unwrap())
            .await
            .unwrap();
        if premium {
            repo.set_premium(id, true).await.unwrap();
        }
        repo.get_user(id).await.unwrap().unwrap()
    }

    fn service(repo: &InMemoryRepository) -> ProgressService {
        ProgressService::new(Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    /// Never sees existing rows, so every call takes the insert path.
    #[derive(Clone)]
    struct StaleReads(InMemoryRepository);

    #[async_trait]
    impl ProgressRepository for StaleReads {
        async fn get_progress(
            &self,
            _user_id: UserId,
            _segment_id: SegmentId,
        ) -> Result<Option<ProgressRecord>, StorageError> {
            Ok(None)
        }

        async fn get_all_progress_for_user(
            &self,
            user_id: UserId,
        ) -> Result<Vec<ProgressRecord>, StorageError> {
            self.0.get_all_progress_for_user(user_id).await
        }

        async fn mark_as_watched(
            &self,
            user_id: UserId,
            segment_id: SegmentId,
        ) -> Result<(), StorageError> {
            self.0.mark_as_watched(user_id, segment_id).await
        }

        async fn get_segment_completed_progress(
            &self,
            segment_id: SegmentId,
        ) -> Result<u64, StorageError> {
            self.0.get_segment_completed_progress(segment_id).await
        }
    }

    #[tokio::test]
    async fn marking_twice_keeps_one_record() {
        let repo = InMemoryRepository::new();
        let segment = seed_segment(&repo, false).await;
        let viewer = seed_user(&repo, false).await;
        let service = service(&repo);

        assert_eq!(
            service.mark_as_watched(&viewer, segment).await.unwrap(),
            WatchOutcome::Recorded
        );
        assert_eq!(
            service.mark_as_watched(&viewer, segment).await.unwrap(),
            WatchOutcome::AlreadyWatched
        );
        let all = service.get_all_progress_for_user(viewer.id()).await.unwrap();
        assert_eq!(all, vec![ProgressRecord::new(viewer.id(), segment)]);
    }

    #[tokio::test]
    async fn racing_insert_is_treated_as_watched() {
        let repo = InMemoryRepository::new();
        let segment = seed_segment(&repo, false).await;
        let viewer = seed_user(&repo, false).await;
        let service = ProgressService::new(Arc::new(repo.clone()), Arc::new(StaleReads(repo.clone())));

        service.mark_as_watched(&viewer, segment).await.unwrap();
        let second = service.mark_as_watched(&viewer, segment).await.unwrap();
        assert_eq!(second, WatchOutcome::AlreadyWatched);
        assert_eq!(service.get_segment_completed_progress(segment).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn premium_segment_requires_entitlement() {
        let repo = InMemoryRepository::new();
        let segment = seed_segment(&repo, true).await;
        let free = seed_user(&repo, false).await;
        let paid = seed_user(&repo, true).await;
        let service = service(&repo);

        let err = service.mark_as_watched(&free, segment).await.unwrap_err();
        assert!(matches!(err, ProgressServiceError::PremiumRequired(id) if id == segment));
        service.mark_as_watched(&paid, segment).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_segment_is_not_found() {
        let repo = InMemoryRepository::new();
        let viewer = seed_user(&repo, false).await;
        let err = service(&repo)
            .mark_as_watched(&viewer, SegmentId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::SegmentNotFound(_)));
    }

    #[tokio::test]
    async fn course_completion_counts_watched_share() {
        let repo = InMemoryRepository::new();
        let first = seed_segment(&repo, false).await;
        seed_segment(&repo, false).await;
        let viewer = seed_user(&repo, false).await;
        let service = service(&repo);

        service.mark_as_watched(&viewer, first).await.unwrap();
        let completion = service.course_completion(viewer.id()).await.unwrap();
        assert_eq!((completion.watched, completion.total), (1, 2));
        assert!((completion.percentage - 50.0).abs() < 1e-9);
    }
}
