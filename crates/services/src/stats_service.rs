use std::sync::Arc;

use course_core::model::SegmentId;
use course_core::stats::{Audience, completion_percentage};
use serde::Serialize;
use storage::repository::{CourseRepository, ProgressRepository, UserRepository};

use crate::error::StatsServiceError;

/// How many eligible users finished a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCompletion {
    pub segment_id: SegmentId,
    pub audience: Audience,
    pub completed: u64,
    pub eligible: u64,
    pub percentage: f64,
}

/// Read-only completion statistics.
#[derive(Clone)]
pub struct StatsService {
    course: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        course: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            course,
            users,
            progress,
        }
    }

    /// Percentage of eligible users who watched the segment.
    ///
    /// Premium segments are measured against premium users, free segments
    /// against everyone. Completed and eligible counts are fetched
    /// concurrently; the first failure aborts the call.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::SegmentNotFound` if the segment is missing.
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn segment_completion(
        &self,
        segment_id: SegmentId,
    ) -> Result<SegmentCompletion, StatsServiceError> {
        let segment = self
            .course
            .get_segment(segment_id)
            .await?
            .ok_or(StatsServiceError::SegmentNotFound(segment_id))?;
        let audience = Audience::for_segment(&segment);

        let (completed, eligible) = tokio::try_join!(
            self.progress.get_segment_completed_progress(segment_id),
            self.users.count_users(audience),
        )?;

        Ok(SegmentCompletion {
            segment_id,
            audience,
            completed,
            eligible,
            percentage: completion_percentage(completed, eligible),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use course_core::model::{SegmentDraft, UserDraft, UserId};
    use course_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewModuleRecord};

    fn service(repo: &InMemoryRepository) -> StatsService {
        StatsService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    async fn users(repo: &InMemoryRepository, n: usize) -> Vec<UserId> {
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            let draft = UserDraft::member(format!("user {i}"));
            ids.push(
                repo.insert_new_user(&draft.validate(fixed_now()).unwrap())
                    .await
                    .unwrap(),
            );
        }
        ids
    }

    async fn segment(repo: &InMemoryRepository, is_premium: bool) -> SegmentId {
        let module = repo
            .insert_new_module(NewModuleRecord {
                title: "M".into(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let draft = SegmentDraft {
            module_id: module,
            title: "S".into(),
            is_premium,
            video_key: None,
        };
        repo.insert_new_segment(&draft.validate(fixed_now()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn free_segment_three_of_ten() {
        let repo = InMemoryRepository::new();
        let ids = users(&repo, 10).await;
        let seg = segment(&repo, false).await;
        for id in &ids[..3] {
            repo.mark_as_watched(*id, seg).await.unwrap();
        }

        let stats = service(&repo).segment_completion(seg).await.unwrap();
        assert_eq!(stats.audience, Audience::AllUsers);
        assert_eq!((stats.completed, stats.eligible), (3, 10));
        assert!((stats.percentage - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn premium_segment_counts_premium_users_only() {
        let repo = InMemoryRepository::new();
        let ids = users(&repo, 5).await;
        for id in &ids[..4] {
            repo.set_premium(*id, true).await.unwrap();
        }
        let seg = segment(&repo, true).await;
        repo.mark_as_watched(ids[0], seg).await.unwrap();

        let stats = service(&repo).segment_completion(seg).await.unwrap();
        assert_eq!(stats.eligible, 4);
        assert!((stats.percentage - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn no_eligible_users_yields_zero() {
        let repo = InMemoryRepository::new();
        users(&repo, 2).await;
        let seg = segment(&repo, true).await;

        let stats = service(&repo).segment_completion(seg).await.unwrap();
        assert_eq!(stats.eligible, 0);
        assert!(stats.percentage.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn revoked_premium_viewers_cap_at_hundred() {
        let repo = InMemoryRepository::new();
        let ids = users(&repo, 2).await;
        let seg = segment(&repo, true).await;
        for id in &ids {
            repo.set_premium(*id, true).await.unwrap();
            repo.mark_as_watched(*id, seg).await.unwrap();
        }
        repo.set_premium(ids[0], false).await.unwrap();

        let stats = service(&repo).segment_completion(seg).await.unwrap();
        assert_eq!((stats.completed, stats.eligible), (2, 1));
        assert!((stats.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_segment_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = service(&repo)
            .segment_completion(SegmentId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StatsServiceError::SegmentNotFound(_)));
    }
}
