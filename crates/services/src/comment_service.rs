use std::sync::Arc;

use course_core::model::{Comment, CommentDraft, CommentId, SegmentId, User};
use storage::repository::{CommentRepository, CourseRepository, StorageError};

use crate::Clock;
use crate::error::CommentServiceError;

#[derive(Clone)]
pub struct CommentService {
    clock: Clock,
    course: Arc<dyn CourseRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        course: Arc<dyn CourseRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            clock,
            course,
            comments,
        }
    }

    /// Post a comment on a segment as `author`.
    ///
    /// # Errors
    ///
    /// Returns `CommentServiceError::SegmentNotFound` if the segment is missing,
    /// `CommentServiceError::Comment` for an invalid body.
    pub async fn post_comment(
        &self,
        author: &User,
        segment_id: SegmentId,
        body: String,
    ) -> Result<CommentId, CommentServiceError> {
        if self.course.get_segment(segment_id).await?.is_none() {
            return Err(CommentServiceError::SegmentNotFound(segment_id));
        }

        let comment = CommentDraft {
            segment_id,
            user_id: author.id(),
            body,
        }
        .validate(self.clock.now())?;

        match self.comments.insert_new_comment(&comment).await {
            Ok(id) => Ok(id),
            Err(StorageError::Conflict) => Err(CommentServiceError::SegmentNotFound(segment_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommentServiceError::SegmentNotFound` if the segment is missing.
    pub async fn list_comments(
        &self,
        segment_id: SegmentId,
    ) -> Result<Vec<Comment>, CommentServiceError> {
        if self.course.get_segment(segment_id).await?.is_none() {
            return Err(CommentServiceError::SegmentNotFound(segment_id));
        }
        Ok(self.comments.list_comments(segment_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use course_core::model::{SegmentDraft, UserDraft};
    use course_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, NewModuleRecord, UserRepository};

    async fn setup(repo: &InMemoryRepository) -> (User, SegmentId) {
        let id = repo
            .insert_new_user(&UserDraft::member("Ada").validate(fixed_now()).unwrap())
            .await
            .unwrap();
        let user = repo.get_user(id).await.unwrap().unwrap();
        let module = repo
            .insert_new_module(NewModuleRecord {
                title: "M".into(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let segment = repo
            .insert_new_segment(
                &SegmentDraft {
                    module_id: module,
                    title: "S".into(),
                    is_premium: false,
                    video_key: None,
                }
                .validate(fixed_now())
                .unwrap(),
            )
            .await
            .unwrap();
        (user, segment)
    }

    #[tokio::test]
    async fn comments_are_listed_newest_first() {
        let repo = InMemoryRepository::new();
        let (user, segment) = setup(&repo).await;

        let early = CommentService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()));
        let late = CommentService::new(
            fixed_clock().advanced(Duration::minutes(1)),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        early.post_comment(&user, segment, "first".into()).await.unwrap();
        late.post_comment(&user, segment, "second".into()).await.unwrap();

        let bodies: Vec<_> = early
            .list_comments(segment)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.body)
            .collect();
        assert_eq!(bodies, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn comment_on_missing_segment_fails() {
        let repo = InMemoryRepository::new();
        let (user, _) = setup(&repo).await;
        let service = CommentService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo));

        let err = service
            .post_comment(&user, SegmentId::new(404), "hello".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CommentServiceError::SegmentNotFound(_)));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let repo = InMemoryRepository::new();
        let (user, segment) = setup(&repo).await;
        let service = CommentService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo));

        let err = service
            .post_comment(&user, segment, "   ".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CommentServiceError::Comment(_)));
    }
}
